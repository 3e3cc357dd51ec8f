//! Seams to the host platform.
//!
//! Every capability the screen needs from the device sits behind one of these
//! traits. Calls are async and settle exactly once; the engine never cancels
//! them. Hosts that only offer blocking or callback APIs complete a
//! [`futures::channel::oneshot`] from a helper thread.

#![allow(async_fn_in_trait)]

use crate::io::StorageError;
use crate::models::{
    ImageSource, LocationError, LocationOptions, Permission, PermissionStatus, PickerOptions,
    PickerResponse, Position, Rationale,
};
use std::path::{Path, PathBuf};

/// Failure inside the host's permission subsystem
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("platform call failed: {0}")]
    Call(String),
    #[error("platform service unavailable: {0}")]
    Unavailable(String),
}

/// Native camera / photo library dialog
pub trait ImagePicker {
    async fn launch(&self, source: ImageSource, options: &PickerOptions) -> PickerResponse;
}

pub trait PermissionService {
    /// Whether the process currently holds `permission`
    async fn check(&self, permission: Permission) -> Result<bool, PlatformError>;

    /// Prompt the user. May show a native dialog.
    async fn request(
        &self,
        permission: Permission,
        rationale: Option<&Rationale>,
    ) -> Result<PermissionStatus, PlatformError>;

    /// Android API level of the running OS, `None` on hosts without one
    fn api_level(&self) -> Option<u32> {
        None
    }
}

/// Durable storage in the well-known user directories
pub trait FileStore {
    async fn copy_file(&self, source: &str, destination: &Path) -> Result<(), StorageError>;

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), StorageError>;

    fn pictures_dir(&self) -> PathBuf;

    fn downloads_dir(&self) -> PathBuf;
}

/// Reads the bytes behind an opaque `content://` reference
pub trait ContentReader {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, StorageError>;
}

pub trait Geolocation {
    async fn current_position(&self, options: &LocationOptions) -> Result<Position, LocationError>;
}

/// Wall clock used to name saved files
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Everything a [`crate::Screen`] drives.
pub trait Platform: ImagePicker + PermissionService + FileStore + Geolocation + Clock {}

impl<T> Platform for T where T: ImagePicker + PermissionService + FileStore + Geolocation + Clock {}
