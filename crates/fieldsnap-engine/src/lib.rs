pub mod flows;
pub mod host;
pub mod io;
pub mod models;
pub mod platform;
pub mod screen;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types for easier usage
pub use flows::{capture::*, location::*, permission::*, storage::*};
pub use io::*;
pub use models::{location::*, permission::*, picker::*, state::*};
pub use platform::*;
pub use screen::*;
