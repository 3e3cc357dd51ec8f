pub mod action_buttons;
pub mod coordinates_view;
pub mod error_screen;
pub mod photo_preview;

pub use action_buttons::ActionButtons;
pub use coordinates_view::CoordinatesView;
pub use error_screen::ErrorScreen;
pub use photo_preview::PhotoPreview;
