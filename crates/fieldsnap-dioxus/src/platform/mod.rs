//! Platform-specific functionality
//!
//! Builds the [`fieldsnap_engine::Platform`] the screen runs against. Android
//! talks to the OS through JNI; every other target uses the desktop adapters.

#[cfg(any(target_os = "android", test))]
mod activity_result;
#[cfg(target_os = "android")]
mod android;
#[cfg(not(target_os = "android"))]
mod desktop;

use fieldsnap_config::Config;
use fieldsnap_engine::Coordinates;
use fieldsnap_engine::StdFileStore;
use fieldsnap_engine::host::HostPlatform;
use std::path::PathBuf;

#[cfg(target_os = "android")]
pub type AppPlatform = HostPlatform<
    android::AndroidPicker,
    android::AndroidPermissions,
    android::AndroidGeolocation,
    fieldsnap_engine::ContentFileStore<android::AndroidContentReader>,
>;

#[cfg(not(target_os = "android"))]
pub type AppPlatform = HostPlatform<
    desktop::DialogPicker,
    fieldsnap_engine::host::GrantedPermissions,
    fieldsnap_engine::host::FixedGeolocation,
>;

/// Where files go and where the fix comes from, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct HostSettings {
    pub pictures_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub fixed_position: Option<Coordinates>,
}

impl HostSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pictures_dir: config
                .pictures_path
                .clone()
                .unwrap_or_else(default_pictures_dir),
            downloads_dir: config
                .downloads_path
                .clone()
                .unwrap_or_else(default_downloads_dir),
            fixed_position: config
                .position
                .map(|p| Coordinates::new(p.longitude, p.latitude)),
        }
    }

    fn file_store(&self) -> StdFileStore {
        StdFileStore::new(self.pictures_dir.clone(), self.downloads_dir.clone())
    }
}

#[cfg(target_os = "android")]
pub fn host_platform(settings: &HostSettings) -> AppPlatform {
    HostPlatform::new(
        android::AndroidPicker,
        android::AndroidPermissions::new(),
        android::AndroidGeolocation,
        fieldsnap_engine::ContentFileStore::new(
            settings.file_store(),
            android::AndroidContentReader,
        ),
    )
}

#[cfg(not(target_os = "android"))]
pub fn host_platform(settings: &HostSettings) -> AppPlatform {
    HostPlatform::new(
        desktop::DialogPicker,
        fieldsnap_engine::host::GrantedPermissions,
        fieldsnap_engine::host::FixedGeolocation::new(settings.fixed_position),
        settings.file_store(),
    )
}

#[cfg(target_os = "android")]
fn default_pictures_dir() -> PathBuf {
    android::public_directory("DIRECTORY_PICTURES")
        .unwrap_or_else(|| PathBuf::from("/storage/emulated/0/Pictures"))
}

#[cfg(target_os = "android")]
fn default_downloads_dir() -> PathBuf {
    android::public_directory("DIRECTORY_DOWNLOADS")
        .unwrap_or_else(|| PathBuf::from("/storage/emulated/0/Download"))
}

#[cfg(not(target_os = "android"))]
fn default_pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("Pictures"))
}

#[cfg(not(target_os = "android"))]
fn default_downloads_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}
