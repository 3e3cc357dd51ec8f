//! Desktop adapters: a native file dialog stands in for the photo library.

use fieldsnap_engine::host::camera_unavailable;
use fieldsnap_engine::{Asset, ImagePicker, ImageSource, PickerOptions, PickerResponse};
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];

/// Library picker backed by `rfd`. Desktops have no capture intent, so the
/// camera reports itself unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPicker;

impl ImagePicker for DialogPicker {
    async fn launch(&self, source: ImageSource, _options: &PickerOptions) -> PickerResponse {
        if source == ImageSource::Camera {
            return camera_unavailable(source);
        }

        let picked = rfd::AsyncFileDialog::new()
            .set_title("Open Gallery")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
            .await;

        match picked {
            Some(file) => PickerResponse::Picked {
                assets: vec![asset_for(file.path())],
            },
            None => PickerResponse::Cancelled,
        }
    }
}

fn asset_for(path: &Path) -> Asset {
    let mime_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg".to_string(),
            other => format!("image/{other}"),
        });

    Asset {
        uri: format!("file://{}", path.display()),
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        mime_type,
        width: None,
        height: None,
        file_size: std::fs::metadata(path).ok().map(|meta| meta.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_asset_for_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Holiday.JPG");
        std::fs::write(&path, b"12345").unwrap();

        let asset = asset_for(&path);

        assert_eq!(asset.uri, format!("file://{}", path.display()));
        assert_eq!(asset.file_name.as_deref(), Some("Holiday.JPG"));
        assert_eq!(asset.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(asset.file_size, Some(5));
    }

    #[test]
    fn test_camera_is_unavailable() {
        let response = block_on(DialogPicker.launch(ImageSource::Camera, &PickerOptions::default()));
        assert!(matches!(response, PickerResponse::Failed { .. }));
    }
}
