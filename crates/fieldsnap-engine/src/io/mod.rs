use crate::platform::{ContentReader, FileStore};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Unsupported URI: {0}")]
    UnsupportedUri(String),
    #[error("Could not read {uri}: {message}")]
    Unreadable { uri: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve a picker URI to a local path. Plain paths pass through.
pub fn uri_to_path(uri: &str) -> Result<PathBuf, StorageError> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if uri.contains("://") {
        return Err(StorageError::UnsupportedUri(uri.to_string()));
    }
    Ok(PathBuf::from(uri))
}

/// Whether `uri` names a content provider entry rather than a file
pub fn is_content_uri(uri: &str) -> bool {
    uri.starts_with("content://")
}

/// Copy `source` to `destination`, creating parent directories first.
/// An existing destination is overwritten.
pub fn copy_file(source: &Path, destination: &Path) -> Result<(), StorageError> {
    if !source.exists() {
        return Err(StorageError::NotFound(source.to_path_buf()));
    }
    create_parent(destination)?;
    fs::copy(source, destination)?;
    Ok(())
}

/// Write UTF-8 text, creating parent directories first
pub fn write_file(path: &Path, contents: &str) -> Result<(), StorageError> {
    create_parent(path)?;
    fs::write(path, contents).map_err(StorageError::Io)
}

/// Write raw bytes, creating parent directories first
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    create_parent(path)?;
    fs::write(path, bytes).map_err(StorageError::Io)
}

fn create_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StorageError::Io)?;
    }
    Ok(())
}

/// File store over the local filesystem
#[derive(Debug, Clone)]
pub struct StdFileStore {
    pictures: PathBuf,
    downloads: PathBuf,
}

impl StdFileStore {
    pub fn new(pictures: PathBuf, downloads: PathBuf) -> Self {
        Self {
            pictures,
            downloads,
        }
    }
}

impl FileStore for StdFileStore {
    async fn copy_file(&self, source: &str, destination: &Path) -> Result<(), StorageError> {
        let source = uri_to_path(source)?;
        copy_file(&source, destination)
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        write_file(path, contents)
    }

    fn pictures_dir(&self) -> PathBuf {
        self.pictures.clone()
    }

    fn downloads_dir(&self) -> PathBuf {
        self.downloads.clone()
    }
}

/// [`StdFileStore`] that also accepts `content://` sources, reading them
/// through `reader` and writing the bytes to the destination.
#[derive(Debug, Clone)]
pub struct ContentFileStore<R> {
    files: StdFileStore,
    reader: R,
}

impl<R> ContentFileStore<R> {
    pub fn new(files: StdFileStore, reader: R) -> Self {
        Self { files, reader }
    }
}

impl<R: ContentReader> FileStore for ContentFileStore<R> {
    async fn copy_file(&self, source: &str, destination: &Path) -> Result<(), StorageError> {
        if !is_content_uri(source) {
            return self.files.copy_file(source, destination).await;
        }
        let bytes = self.reader.read(source).await?;
        write_bytes(destination, &bytes)
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), StorageError> {
        self.files.write_file(path, contents).await
    }

    fn pictures_dir(&self) -> PathBuf {
        self.files.pictures_dir()
    }

    fn downloads_dir(&self) -> PathBuf {
        self.files.downloads_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use rstest::rstest;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Content provider backed by a map of uri to bytes
    struct MapReader(HashMap<String, Vec<u8>>);

    impl ContentReader for MapReader {
        async fn read(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
            self.0
                .get(uri)
                .cloned()
                .ok_or_else(|| StorageError::Unreadable {
                    uri: uri.to_string(),
                    message: "no such entry".to_string(),
                })
        }
    }

    fn content_store(root: &Path, entries: &[(&str, &[u8])]) -> ContentFileStore<MapReader> {
        let entries = entries
            .iter()
            .map(|(uri, bytes)| (uri.to_string(), bytes.to_vec()))
            .collect();
        ContentFileStore::new(
            StdFileStore::new(root.join("Pictures"), root.join("Download")),
            MapReader(entries),
        )
    }

    #[rstest]
    #[case("file:///tmp/photo.jpg", "/tmp/photo.jpg")]
    #[case("/tmp/photo.jpg", "/tmp/photo.jpg")]
    #[case("relative/photo.jpg", "relative/photo.jpg")]
    fn test_uri_to_path(#[case] uri: &str, #[case] expected: &str) {
        assert_eq!(uri_to_path(uri).unwrap(), PathBuf::from(expected));
    }

    #[test]
    fn test_content_uri_is_unsupported() {
        let result = uri_to_path("content://media/external/images/42");
        assert!(matches!(result, Err(StorageError::UnsupportedUri(_))));
    }

    #[test]
    fn test_copy_creates_destination_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("in.jpg");
        fs::write(&source, [0xff, 0xd8, 0xff, 0xe0]).unwrap();
        let destination = temp_dir.path().join("Pictures/nested/out.jpg");

        copy_file(&source, &destination).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), vec![0xff, 0xd8, 0xff, 0xe0]);
    }

    #[test]
    fn test_copy_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let result = copy_file(
            &temp_dir.path().join("missing.jpg"),
            &temp_dir.path().join("out.jpg"),
        );
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Download/location_1.txt");

        write_file(&path, "first").unwrap();
        write_file(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_std_store_copies_file_uri() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("picked.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let store = StdFileStore::new(
            temp_dir.path().join("Pictures"),
            temp_dir.path().join("Download"),
        );
        let destination = store.pictures_dir().join("image_1.jpg");

        let uri = format!("file://{}", source.display());
        block_on(store.copy_file(&uri, &destination)).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"jpeg bytes");
    }

    #[rstest]
    #[case("content://media/external/images/media/42", true)]
    #[case("file:///tmp/photo.jpg", false)]
    #[case("/tmp/photo.jpg", false)]
    fn test_is_content_uri(#[case] uri: &str, #[case] expected: bool) {
        assert_eq!(is_content_uri(uri), expected);
    }

    #[test]
    fn test_content_store_copies_provider_entry() {
        let temp_dir = TempDir::new().unwrap();
        let uri = "content://media/external/images/media/42";
        let store = content_store(temp_dir.path(), &[(uri, b"camera bytes")]);
        let destination = store.pictures_dir().join("image_7.jpg");

        block_on(store.copy_file(uri, &destination)).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"camera bytes");
    }

    #[test]
    fn test_content_store_still_copies_plain_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("picked.jpg");
        fs::write(&source, b"file bytes").unwrap();
        let store = content_store(temp_dir.path(), &[]);
        let destination = store.pictures_dir().join("image_8.jpg");

        block_on(store.copy_file(&source.display().to_string(), &destination)).unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"file bytes");
    }

    #[test]
    fn test_content_store_unreadable_entry_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = content_store(temp_dir.path(), &[]);
        let destination = store.pictures_dir().join("image_9.jpg");

        let result = block_on(store.copy_file("content://media/gone/1", &destination));

        assert!(matches!(result, Err(StorageError::Unreadable { .. })));
        assert!(!destination.exists());
    }
}
