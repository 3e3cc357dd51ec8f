//! End-to-end flows against the real filesystem with the shared host adapters.

use fieldsnap_engine::host::{FixedGeolocation, GrantedPermissions, HostPlatform, NoCamera};
use fieldsnap_engine::{
    Asset, CaptureOutcome, ContentFileStore, ContentReader, Coordinates, ImagePicker, ImageRef,
    ImageSource, LocationErrorCode, LocationOutcome, PickerOptions, PickerResponse, Screen,
    StdFileStore, StorageError,
};
use futures::executor::block_on;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Picker that hands back a fixed list of files
struct ListPicker(Vec<String>);

impl ImagePicker for ListPicker {
    async fn launch(&self, _source: ImageSource, _options: &PickerOptions) -> PickerResponse {
        PickerResponse::Picked {
            assets: self.0.iter().map(Asset::from_uri).collect(),
        }
    }
}

/// Provider with a single photo entry, like the Android media store
struct OnePhoto {
    uri: &'static str,
    bytes: &'static [u8],
}

impl ContentReader for OnePhoto {
    async fn read(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
        if uri == self.uri {
            Ok(self.bytes.to_vec())
        } else {
            Err(StorageError::Unreadable {
                uri: uri.to_string(),
                message: "not found".to_string(),
            })
        }
    }
}

fn store(root: &Path) -> StdFileStore {
    StdFileStore::new(root.join("Pictures"), root.join("Download"))
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn test_gallery_pick_copies_first_image_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.jpg");
    let second = temp_dir.path().join("second.jpg");
    fs::write(&first, b"first image").unwrap();
    fs::write(&second, b"second image").unwrap();

    let first_uri = format!("file://{}", first.display());
    let picker = ListPicker(vec![first_uri.clone(), second.display().to_string()]);
    let platform = HostPlatform::new(
        picker,
        GrantedPermissions,
        FixedGeolocation::default(),
        store(temp_dir.path()),
    );
    let screen = Screen::new(platform);

    let outcome = block_on(screen.open_gallery());

    let CaptureOutcome::Selected { image, saved_to } = outcome else {
        panic!("expected a selection, got {outcome:?}");
    };
    assert_eq!(image, ImageRef::new(first_uri));
    let saved_to = saved_to.expect("image should have been copied");
    assert_eq!(fs::read(&saved_to).unwrap(), b"first image");

    let names = files_in(&temp_dir.path().join("Pictures"));
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("image_") && names[0].ends_with(".jpg"));
}

#[test]
fn test_location_file_written_to_downloads() {
    let temp_dir = TempDir::new().unwrap();
    let platform = HostPlatform::new(
        NoCamera,
        GrantedPermissions,
        FixedGeolocation::new(Some(Coordinates::new(12.34, 56.78))),
        store(temp_dir.path()),
    );
    let screen = Screen::new(platform);

    let outcome = block_on(screen.get_location());

    let LocationOutcome::Located {
        saved_to: Some(path),
        ..
    } = outcome
    else {
        panic!("expected a saved fix, got {outcome:?}");
    };
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Longitude: 12.34\nLatitude: 56.78"
    );
    assert_eq!(path.parent(), Some(temp_dir.path().join("Download").as_path()));
}

#[test]
fn test_unavailable_provider_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let platform = HostPlatform::new(
        NoCamera,
        GrantedPermissions,
        FixedGeolocation::default(),
        store(temp_dir.path()),
    );
    let screen = Screen::new(platform);

    let outcome = block_on(screen.get_location());

    assert!(matches!(
        outcome,
        LocationOutcome::Failed(ref e) if e.code == LocationErrorCode::PositionUnavailable
    ));
    assert_eq!(screen.state().position, None);
    assert!(!temp_dir.path().join("Download").exists());
}

#[test]
fn test_camera_unavailable_keeps_state() {
    let temp_dir = TempDir::new().unwrap();
    let platform = HostPlatform::new(
        NoCamera,
        GrantedPermissions,
        FixedGeolocation::default(),
        store(temp_dir.path()),
    );
    let screen = Screen::new(platform);

    let outcome = block_on(screen.open_camera());

    assert!(matches!(outcome, CaptureOutcome::Failed { .. }));
    assert_eq!(screen.state().image, None);
}

#[test]
fn test_saves_at_least_a_millisecond_apart_do_not_collide() {
    let temp_dir = TempDir::new().unwrap();
    let platform = HostPlatform::new(
        NoCamera,
        GrantedPermissions,
        FixedGeolocation::new(Some(Coordinates::new(1.0, 2.0))),
        store(temp_dir.path()),
    );
    let screen = Screen::new(platform);

    block_on(screen.get_location());
    std::thread::sleep(std::time::Duration::from_millis(2));
    block_on(screen.get_location());

    assert_eq!(files_in(&temp_dir.path().join("Download")).len(), 2);
}

#[test]
fn test_content_uri_pick_is_copied_through_provider() {
    let temp_dir = TempDir::new().unwrap();
    let uri = "content://media/external/images/media/42";
    let platform = HostPlatform::new(
        ListPicker(vec![uri.to_string()]),
        GrantedPermissions,
        FixedGeolocation::default(),
        ContentFileStore::new(
            store(temp_dir.path()),
            OnePhoto {
                uri,
                bytes: b"provider image",
            },
        ),
    );
    let screen = Screen::new(platform);

    let outcome = block_on(screen.open_camera());

    let CaptureOutcome::Selected { image, saved_to } = outcome else {
        panic!("expected a selection, got {outcome:?}");
    };
    assert_eq!(image, ImageRef::new(uri));
    let saved_to = saved_to.expect("content entry should have been copied");
    assert_eq!(fs::read(&saved_to).unwrap(), b"provider image");
    assert_eq!(saved_to.parent(), Some(temp_dir.path().join("Pictures").as_path()));
}

#[test]
fn test_plain_store_cannot_copy_content_uri() {
    let temp_dir = TempDir::new().unwrap();
    let uri = "content://media/external/images/media/42";
    let platform = HostPlatform::new(
        ListPicker(vec![uri.to_string()]),
        GrantedPermissions,
        FixedGeolocation::default(),
        store(temp_dir.path()),
    );
    let screen = Screen::new(platform);

    let outcome = block_on(screen.open_gallery());

    assert_eq!(
        outcome,
        CaptureOutcome::Selected {
            image: ImageRef::new(uri),
            saved_to: None,
        }
    );
    assert!(!temp_dir.path().join("Pictures").exists());
}
