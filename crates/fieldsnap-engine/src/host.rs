//! Building blocks for real hosts.
//!
//! [`HostPlatform`] bundles a picker, a permission service, a location
//! provider and a file store with the wall clock. The store defaults to the
//! local filesystem.

use crate::io::{StdFileStore, StorageError};
use crate::models::{
    Coordinates, ImageSource, LocationError, LocationErrorCode, LocationOptions, Permission,
    PermissionStatus, PickerOptions, PickerResponse, Position, Rationale,
};
use crate::platform::{
    Clock, FileStore, Geolocation, ImagePicker, PermissionService, PlatformError,
};
use std::path::{Path, PathBuf};

/// Wall clock backed by chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// For hosts with no runtime permission model (desktop, terminal).
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedPermissions;

impl PermissionService for GrantedPermissions {
    async fn check(&self, _permission: Permission) -> Result<bool, PlatformError> {
        Ok(true)
    }

    async fn request(
        &self,
        _permission: Permission,
        _rationale: Option<&Rationale>,
    ) -> Result<PermissionStatus, PlatformError> {
        Ok(PermissionStatus::Granted)
    }
}

/// Location provider for hosts without one: answers with a configured
/// position, or `PositionUnavailable` when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocation {
    coords: Option<Coordinates>,
}

impl FixedGeolocation {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self { coords }
    }
}

impl Geolocation for FixedGeolocation {
    async fn current_position(
        &self,
        _options: &LocationOptions,
    ) -> Result<Position, LocationError> {
        match self.coords {
            Some(coords) => Ok(Position {
                coords,
                timestamp: SystemClock.now_millis(),
            }),
            None => Err(LocationError::new(
                LocationErrorCode::PositionUnavailable,
                "No location provider available.",
            )),
        }
    }
}

/// A picker that always reports the camera as missing and offers no library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl ImagePicker for NoCamera {
    async fn launch(&self, source: ImageSource, _options: &PickerOptions) -> PickerResponse {
        camera_unavailable(source)
    }
}

/// Standard answer for hosts without a capture device
pub fn camera_unavailable(source: ImageSource) -> PickerResponse {
    let message = match source {
        ImageSource::Camera => "Camera not available on device",
        ImageSource::Library => "Photo library not available on device",
    };
    PickerResponse::Failed {
        code: crate::models::PickerErrorCode::CameraUnavailable,
        message: message.to_string(),
    }
}

/// A complete [`crate::Platform`] from host-specific parts.
pub struct HostPlatform<K, M, G, S = StdFileStore> {
    pub picker: K,
    pub permissions: M,
    pub geolocation: G,
    pub store: S,
    pub clock: SystemClock,
}

impl<K, M, G, S> HostPlatform<K, M, G, S> {
    pub fn new(picker: K, permissions: M, geolocation: G, store: S) -> Self {
        Self {
            picker,
            permissions,
            geolocation,
            store,
            clock: SystemClock,
        }
    }
}

impl<K: ImagePicker, M, G, S> ImagePicker for HostPlatform<K, M, G, S> {
    async fn launch(&self, source: ImageSource, options: &PickerOptions) -> PickerResponse {
        self.picker.launch(source, options).await
    }
}

impl<K, M: PermissionService, G, S> PermissionService for HostPlatform<K, M, G, S> {
    async fn check(&self, permission: Permission) -> Result<bool, PlatformError> {
        self.permissions.check(permission).await
    }

    async fn request(
        &self,
        permission: Permission,
        rationale: Option<&Rationale>,
    ) -> Result<PermissionStatus, PlatformError> {
        self.permissions.request(permission, rationale).await
    }

    fn api_level(&self) -> Option<u32> {
        self.permissions.api_level()
    }
}

impl<K, M, G, S: FileStore> FileStore for HostPlatform<K, M, G, S> {
    async fn copy_file(&self, source: &str, destination: &Path) -> Result<(), StorageError> {
        self.store.copy_file(source, destination).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.store.write_file(path, contents).await
    }

    fn pictures_dir(&self) -> PathBuf {
        self.store.pictures_dir()
    }

    fn downloads_dir(&self) -> PathBuf {
        self.store.downloads_dir()
    }
}

impl<K, M, G: Geolocation, S> Geolocation for HostPlatform<K, M, G, S> {
    async fn current_position(&self, options: &LocationOptions) -> Result<Position, LocationError> {
        self.geolocation.current_position(options).await
    }
}

impl<K, M, G, S> Clock for HostPlatform<K, M, G, S> {
    fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_system_clock_is_epoch_millis() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_granted_permissions() {
        assert!(block_on(GrantedPermissions.check(Permission::Camera)).unwrap());
        assert_eq!(GrantedPermissions.api_level(), None);
    }

    #[test]
    fn test_fixed_geolocation_without_position() {
        let err = block_on(FixedGeolocation::default().current_position(&LocationOptions::one_shot()))
            .unwrap_err();
        assert_eq!(err.code, LocationErrorCode::PositionUnavailable);
    }

    #[test]
    fn test_fixed_geolocation_with_position() {
        let geolocation = FixedGeolocation::new(Some(Coordinates::new(12.34, 56.78)));
        let position = block_on(geolocation.current_position(&LocationOptions::one_shot())).unwrap();
        assert_eq!(position.coords, Coordinates::new(12.34, 56.78));
    }

    #[test]
    fn test_no_camera_reports_unavailable() {
        let response = block_on(NoCamera.launch(ImageSource::Camera, &PickerOptions::default()));
        assert!(matches!(
            response,
            PickerResponse::Failed {
                code: crate::models::PickerErrorCode::CameraUnavailable,
                ..
            }
        ));
    }
}
