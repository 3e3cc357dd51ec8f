//! View-model for the single screen.
//!
//! [`Screen`] owns the platform and the displayed [`ScreenState`]. Each button
//! maps to one async method. Methods take `&self`, so a second press while a
//! flow is still pending simply starts another flow on the same executor;
//! nothing is queued, deduplicated or cancelled. State is written by replacing
//! a whole field and no borrow of it is held across an await.

use crate::flows::capture::{launch_picker, selected_image};
use crate::flows::location::fetch_position;
use crate::flows::permission::ensure_permission;
use crate::flows::storage::{save_image, save_location};
use crate::models::{
    ImageRef, ImageSource, LocationError, Permission, PickerErrorCode, PickerResponse, Position,
    Rationale, ScreenState,
};
use crate::platform::Platform;
use std::cell::RefCell;
use std::path::PathBuf;

/// How a camera or gallery press ended
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    PermissionDenied,
    Cancelled,
    Failed {
        code: PickerErrorCode,
        message: String,
    },
    NoAssets,
    Selected {
        image: ImageRef,
        /// `None` when the copy into the pictures directory failed
        saved_to: Option<PathBuf>,
    },
}

/// How a location press ended
#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    PermissionDenied,
    Failed(LocationError),
    Located {
        position: Position,
        saved_to: Option<PathBuf>,
    },
}

type Observer = Box<dyn Fn(&ScreenState)>;

pub struct Screen<P> {
    platform: P,
    state: RefCell<ScreenState>,
    observer: Option<Observer>,
}

impl<P: Platform> Screen<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            state: RefCell::new(ScreenState::default()),
            observer: None,
        }
    }

    /// Call `observer` with the new state every time a field is replaced
    pub fn with_observer(mut self, observer: impl Fn(&ScreenState) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Copy of what should be on screen right now
    pub fn state(&self) -> ScreenState {
        self.state.borrow().clone()
    }

    /// "Open Camera": permission gate, then the camera dialog.
    pub async fn open_camera(&self) -> CaptureOutcome {
        let rationale = Rationale::camera();
        if !ensure_permission(&self.platform, Permission::Camera, Some(&rationale)).await {
            return CaptureOutcome::PermissionDenied;
        }
        self.pick(ImageSource::Camera).await
    }

    /// "Open Gallery": the library picker, no permission step.
    pub async fn open_gallery(&self) -> CaptureOutcome {
        self.pick(ImageSource::Library).await
    }

    /// "Get Geo Location": permission gate, one fix, then the text file.
    pub async fn get_location(&self) -> LocationOutcome {
        if !ensure_permission(&self.platform, Permission::FineLocation, None).await {
            return LocationOutcome::PermissionDenied;
        }

        let position = match fetch_position(&self.platform).await {
            Ok(position) => position,
            Err(e) => return LocationOutcome::Failed(e),
        };

        self.replace(|state| state.position = Some(position.coords));
        let saved_to = save_location(&self.platform, &position.coords).await;
        LocationOutcome::Located { position, saved_to }
    }

    async fn pick(&self, source: ImageSource) -> CaptureOutcome {
        let response = launch_picker(&self.platform, source).await;
        let Some(image) = selected_image(&response) else {
            return match response {
                PickerResponse::Cancelled => CaptureOutcome::Cancelled,
                PickerResponse::Failed { code, message } => {
                    CaptureOutcome::Failed { code, message }
                }
                PickerResponse::Picked { .. } => CaptureOutcome::NoAssets,
            };
        };

        self.replace(|state| state.image = Some(image.clone()));
        let saved_to = save_image(&self.platform, &image).await;
        CaptureOutcome::Selected { image, saved_to }
    }

    fn replace(&self, update: impl FnOnce(&mut ScreenState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            update(&mut state);
            state.clone()
        };
        if let Some(observer) = &self.observer {
            observer(&snapshot);
        }
    }
}
