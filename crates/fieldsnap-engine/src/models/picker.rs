use std::fmt;

/// Largest edge, in pixels, the picker is asked to return
pub const MAX_IMAGE_DIMENSION: u32 = 2000;

/// Which native dialog to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Library,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Photo,
}

/// Options handed to the image picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    pub media_type: MediaType,
    pub include_base64: bool,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            media_type: MediaType::Photo,
            include_base64: false,
            max_width: MAX_IMAGE_DIMENSION,
            max_height: MAX_IMAGE_DIMENSION,
        }
    }
}

/// Error codes reported by the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerErrorCode {
    CameraUnavailable,
    Permission,
    Others,
}

impl fmt::Display for PickerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            PickerErrorCode::CameraUnavailable => "camera_unavailable",
            PickerErrorCode::Permission => "permission",
            PickerErrorCode::Others => "others",
        };
        f.write_str(code)
    }
}

/// One image returned by the picker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Asset {
    pub uri: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: Option<u64>,
}

impl Asset {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }
}

/// Everything the picker can come back with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerResponse {
    Cancelled,
    Failed {
        code: PickerErrorCode,
        message: String,
    },
    Picked {
        assets: Vec<Asset>,
    },
}

/// Opaque handle to a picked or captured image, usually a URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_picker_options() {
        let options = PickerOptions::default();
        assert_eq!(options.media_type, MediaType::Photo);
        assert!(!options.include_base64);
        assert_eq!(options.max_width, 2000);
        assert_eq!(options.max_height, 2000);
    }

    #[test]
    fn test_error_codes_use_picker_spelling() {
        assert_eq!(
            PickerErrorCode::CameraUnavailable.to_string(),
            "camera_unavailable"
        );
        assert_eq!(PickerErrorCode::Others.to_string(), "others");
    }
}
