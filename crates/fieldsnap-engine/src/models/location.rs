use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A resolved longitude/latitude pair plus whatever extras the provider gave us
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            accuracy: None,
            altitude: None,
        }
    }
}

/// A single fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coords: Coordinates,
    /// Epoch milliseconds at which the provider produced the fix
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAccuracy {
    High,
    Balanced,
    Low,
    Passive,
}

/// How a one-shot fix should be obtained
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOptions {
    pub accuracy: LocationAccuracy,
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh one
    pub maximum_age: Duration,
    /// Metres; zero reports every change
    pub distance_filter: f32,
    pub force_request_location: bool,
    pub force_location_manager: bool,
    pub show_location_dialog: bool,
}

impl LocationOptions {
    /// The configuration every "Get Geo Location" press uses
    pub fn one_shot() -> Self {
        Self {
            accuracy: LocationAccuracy::High,
            enable_high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(10),
            distance_filter: 0.0,
            force_request_location: true,
            force_location_manager: true,
            show_location_dialog: true,
        }
    }
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self::one_shot()
    }
}

/// Failure categories reported by geolocation providers, numbered as on Android
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    PlayServiceNotAvailable,
    SettingsNotSatisfied,
    InternalError,
}

impl LocationErrorCode {
    pub fn code(self) -> i32 {
        match self {
            LocationErrorCode::PermissionDenied => 1,
            LocationErrorCode::PositionUnavailable => 2,
            LocationErrorCode::Timeout => 3,
            LocationErrorCode::PlayServiceNotAvailable => 4,
            LocationErrorCode::SettingsNotSatisfied => 5,
            LocationErrorCode::InternalError => -1,
        }
    }
}

impl fmt::Display for LocationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("location error {code}: {message}")]
pub struct LocationError {
    pub code: LocationErrorCode,
    pub message: String,
}

impl LocationError {
    pub fn new(code: LocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(LocationErrorCode::Timeout, "Location request timed out")
    }
}
