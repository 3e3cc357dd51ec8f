use crate::models::{Coordinates, ImageRef};
use crate::platform::{Clock, FileStore};
use std::path::PathBuf;

pub fn image_file_name(epoch_millis: i64) -> String {
    format!("image_{epoch_millis}.jpg")
}

pub fn location_file_name(epoch_millis: i64) -> String {
    format!("location_{epoch_millis}.txt")
}

/// Body of a saved location file. No trailing newline.
pub fn location_file_contents(coords: &Coordinates) -> String {
    format!(
        "Longitude: {}\nLatitude: {}",
        coords.longitude, coords.latitude
    )
}

/// Copy the image into the pictures directory under a timestamped name.
///
/// Two saves in the same millisecond land on the same name and the later one
/// wins. Returns the destination on success; failures are only logged.
pub async fn save_image<S>(store: &S, image: &ImageRef) -> Option<PathBuf>
where
    S: FileStore + Clock + ?Sized,
{
    let path = store
        .pictures_dir()
        .join(image_file_name(store.now_millis()));
    match store.copy_file(image.as_str(), &path).await {
        Ok(()) => {
            log::info!("File copied to: {}", path.display());
            Some(path)
        }
        Err(e) => {
            log::error!("Error copying file: {e}");
            None
        }
    }
}

/// Write the coordinates to a timestamped text file in the downloads directory.
pub async fn save_location<S>(store: &S, coords: &Coordinates) -> Option<PathBuf>
where
    S: FileStore + Clock + ?Sized,
{
    let path = store
        .downloads_dir()
        .join(location_file_name(store.now_millis()));
    match store
        .write_file(&path, &location_file_contents(coords))
        .await
    {
        Ok(()) => {
            log::info!("Location saved to: {}", path.display());
            Some(path)
        }
        Err(e) => {
            log::error!("Error saving location: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_names() {
        assert_eq!(image_file_name(1700000000123), "image_1700000000123.jpg");
        assert_eq!(
            location_file_name(1700000000123),
            "location_1700000000123.txt"
        );
    }

    #[test]
    fn test_location_contents_exact() {
        let coords = Coordinates::new(12.34, 56.78);
        assert_eq!(
            location_file_contents(&coords),
            "Longitude: 12.34\nLatitude: 56.78"
        );
    }

    #[test]
    fn test_negative_and_whole_coordinates() {
        let coords = Coordinates::new(-0.5, 51.0);
        assert_eq!(location_file_contents(&coords), "Longitude: -0.5\nLatitude: 51");
    }

    #[test]
    fn test_save_image_uses_pictures_dir() {
        let platform = FakePlatform::new()
            .with_clock(42)
            .with_source_file("file:///cache/a.jpg", b"pixels");

        let saved = block_on(save_image(&platform, &ImageRef::new("file:///cache/a.jpg")));

        let expected = platform.pictures_dir().join("image_42.jpg");
        assert_eq!(saved, Some(expected.clone()));
        assert_eq!(platform.file(&expected), Some(b"pixels".to_vec()));
    }

    #[test]
    fn test_failed_copy_returns_none() {
        let platform = FakePlatform::new().with_clock(42);

        let saved = block_on(save_image(&platform, &ImageRef::new("file:///cache/gone.jpg")));

        assert_eq!(saved, None);
        assert_eq!(platform.file_count(), 0);
    }

    #[test]
    fn test_save_location_uses_downloads_dir() {
        let platform = FakePlatform::new().with_clock(7);

        let saved = block_on(save_location(&platform, &Coordinates::new(1.5, 2.5)));

        let expected = platform.downloads_dir().join("location_7.txt");
        assert_eq!(saved, Some(expected.clone()));
        assert_eq!(
            platform.text_file(&expected).as_deref(),
            Some("Longitude: 1.5\nLatitude: 2.5")
        );
    }
}
