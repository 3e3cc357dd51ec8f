pub mod location;
pub mod permission;
pub mod picker;
pub mod state;

pub use location::*;
pub use permission::*;
pub use picker::*;
pub use state::*;
