use std::fmt;

/// Runtime permissions the app asks the host for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Camera,
    FineLocation,
}

impl Permission {
    /// The Android manifest identifier for this permission
    pub fn android_name(self) -> &'static str {
        match self {
            Permission::Camera => "android.permission.CAMERA",
            Permission::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Camera => write!(f, "camera"),
            Permission::FineLocation => write!(f, "location"),
        }
    }
}

/// Answer to a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied and the user asked not to be prompted again
    NeverAskAgain,
}

/// Prompt copy shown alongside a permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rationale {
    pub title: String,
    pub message: String,
    pub button_neutral: Option<String>,
    pub button_negative: Option<String>,
    pub button_positive: String,
}

impl Rationale {
    pub fn camera() -> Self {
        Self {
            title: "Camera Permission".to_string(),
            message: "This app needs access to your camera to take photos.".to_string(),
            button_neutral: Some("Ask Me Later".to_string()),
            button_negative: Some("Cancel".to_string()),
            button_positive: "OK".to_string(),
        }
    }
}
