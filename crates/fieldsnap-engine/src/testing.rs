//! In-memory fakes of every platform service, for tests.

use crate::io::StorageError;
use crate::models::{
    Coordinates, ImageSource, LocationError, LocationErrorCode, LocationOptions, Permission,
    PermissionStatus, PickerOptions, PickerResponse, Position, Rationale,
};
use crate::platform::{
    Clock, FileStore, Geolocation, ImagePicker, PermissionService, PlatformError,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Scriptable platform that records every call made to it.
///
/// Defaults: no permission held, every request denied, picker cancelled,
/// position unavailable, clock frozen at zero.
pub struct FakePlatform {
    granted: RefCell<HashSet<Permission>>,
    answers: HashMap<Permission, PermissionStatus>,
    api_level: Option<u32>,
    permissions_fail: bool,
    picker_responses: RefCell<VecDeque<PickerResponse>>,
    fixes: RefCell<VecDeque<Result<Coordinates, LocationError>>>,
    sources: HashMap<String, Vec<u8>>,
    files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    now: Cell<i64>,
    clock_step: i64,
    yielding: bool,
    checks: RefCell<Vec<Permission>>,
    requests: RefCell<Vec<Permission>>,
    rationale: RefCell<Option<Rationale>>,
    launches: RefCell<Vec<ImageSource>>,
    location_requests: RefCell<Vec<LocationOptions>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            granted: RefCell::new(HashSet::new()),
            answers: HashMap::new(),
            api_level: None,
            permissions_fail: false,
            picker_responses: RefCell::new(VecDeque::new()),
            fixes: RefCell::new(VecDeque::new()),
            sources: HashMap::new(),
            files: RefCell::new(HashMap::new()),
            now: Cell::new(0),
            clock_step: 0,
            yielding: false,
            checks: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
            rationale: RefCell::new(None),
            launches: RefCell::new(Vec::new()),
            location_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_granted(self, permission: Permission) -> Self {
        self.granted.borrow_mut().insert(permission);
        self
    }

    /// What the user answers when prompted for `permission`
    pub fn with_request_answer(mut self, permission: Permission, answer: PermissionStatus) -> Self {
        self.answers.insert(permission, answer);
        self
    }

    pub fn with_api_level(mut self, api_level: u32) -> Self {
        self.api_level = Some(api_level);
        self
    }

    /// Every permission call errors
    pub fn with_failing_permissions(mut self) -> Self {
        self.permissions_fail = true;
        self
    }

    /// Queue a picker response. Launches past the end of the queue are cancelled.
    pub fn with_picker_response(self, response: PickerResponse) -> Self {
        self.picker_responses.borrow_mut().push_back(response);
        self
    }

    /// Queue a fix. The last queued result repeats once the queue runs dry.
    pub fn with_fix(self, coords: Coordinates) -> Self {
        self.fixes.borrow_mut().push_back(Ok(coords));
        self
    }

    pub fn with_fix_error(self, error: LocationError) -> Self {
        self.fixes.borrow_mut().push_back(Err(error));
        self
    }

    /// Make `uri` readable by `copy_file`
    pub fn with_source_file(mut self, uri: &str, bytes: &[u8]) -> Self {
        self.sources.insert(uri.to_string(), bytes.to_vec());
        self
    }

    /// Freeze the clock at `epoch_millis`
    pub fn with_clock(self, epoch_millis: i64) -> Self {
        self.now.set(epoch_millis);
        self
    }

    /// Advance the clock by `step` milliseconds after every reading
    pub fn with_clock_step(mut self, step: i64) -> Self {
        self.clock_step = step;
        self
    }

    /// Suspend once inside every picker and location call so concurrent flows interleave
    pub fn with_yielding(mut self) -> Self {
        self.yielding = true;
        self
    }

    pub fn permission_checks(&self) -> Vec<Permission> {
        self.checks.borrow().clone()
    }

    pub fn permission_requests(&self) -> Vec<Permission> {
        self.requests.borrow().clone()
    }

    pub fn last_rationale(&self) -> Option<Rationale> {
        self.rationale.borrow().clone()
    }

    pub fn picker_launches(&self) -> Vec<ImageSource> {
        self.launches.borrow().clone()
    }

    pub fn location_requests(&self) -> Vec<LocationOptions> {
        self.location_requests.borrow().clone()
    }

    pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    pub fn text_file(&self, path: &Path) -> Option<String> {
        self.file(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn file_count(&self) -> usize {
        self.files.borrow().len()
    }

    /// Every written path, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.borrow().keys().cloned().collect();
        paths.sort();
        paths
    }

    async fn maybe_yield(&self) {
        if self.yielding {
            YieldNow(false).await;
        }
    }
}

struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

impl PermissionService for FakePlatform {
    async fn check(&self, permission: Permission) -> Result<bool, PlatformError> {
        self.checks.borrow_mut().push(permission);
        if self.permissions_fail {
            return Err(PlatformError::Call("check failed".to_string()));
        }
        Ok(self.granted.borrow().contains(&permission))
    }

    async fn request(
        &self,
        permission: Permission,
        rationale: Option<&Rationale>,
    ) -> Result<PermissionStatus, PlatformError> {
        self.requests.borrow_mut().push(permission);
        *self.rationale.borrow_mut() = rationale.cloned();
        if self.permissions_fail {
            return Err(PlatformError::Call("request failed".to_string()));
        }
        let answer = self
            .answers
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::Denied);
        if answer == PermissionStatus::Granted {
            self.granted.borrow_mut().insert(permission);
        }
        Ok(answer)
    }

    fn api_level(&self) -> Option<u32> {
        self.api_level
    }
}

impl ImagePicker for FakePlatform {
    async fn launch(&self, source: ImageSource, _options: &PickerOptions) -> PickerResponse {
        self.launches.borrow_mut().push(source);
        self.maybe_yield().await;
        self.picker_responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(PickerResponse::Cancelled)
    }
}

impl Geolocation for FakePlatform {
    async fn current_position(&self, options: &LocationOptions) -> Result<Position, LocationError> {
        self.location_requests.borrow_mut().push(options.clone());
        self.maybe_yield().await;
        let next = {
            let mut fixes = self.fixes.borrow_mut();
            if fixes.len() > 1 {
                fixes.pop_front()
            } else {
                fixes.front().cloned()
            }
        };
        let fix = next.unwrap_or_else(|| {
            Err(LocationError::new(
                LocationErrorCode::PositionUnavailable,
                "No location provider available.",
            ))
        });
        fix.map(|coords| Position {
            coords,
            timestamp: self.now.get(),
        })
    }
}

impl FileStore for FakePlatform {
    async fn copy_file(&self, source: &str, destination: &Path) -> Result<(), StorageError> {
        let bytes = self
            .sources
            .get(source)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(PathBuf::from(source)))?;
        self.files
            .borrow_mut()
            .insert(destination.to_path_buf(), bytes);
        Ok(())
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.as_bytes().to_vec());
        Ok(())
    }

    fn pictures_dir(&self) -> PathBuf {
        PathBuf::from("/storage/emulated/0/Pictures")
    }

    fn downloads_dir(&self) -> PathBuf {
        PathBuf::from("/storage/emulated/0/Download")
    }
}

impl Clock for FakePlatform {
    fn now_millis(&self) -> i64 {
        let now = self.now.get();
        self.now.set(now + self.clock_step);
        now
    }
}
