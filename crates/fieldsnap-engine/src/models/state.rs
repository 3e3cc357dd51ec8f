use crate::models::{Coordinates, ImageRef};

/// What the screen displays. Fields are only ever replaced as whole values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    pub image: Option<ImageRef>,
    pub position: Option<Coordinates>,
}

impl ScreenState {
    /// The two lines shown under the title once a fix is known
    pub fn coordinate_lines(&self) -> Option<[String; 2]> {
        self.position.map(|coords| {
            [
                format!("Longitude: {}", coords.longitude),
                format!("Latitude: {}", coords.latitude),
            ]
        })
    }
}
