//! The three user-initiated flows and the permission gate in front of them.
//!
//! Each flow logs its own failures and never returns an error to the screen.

pub mod capture;
pub mod location;
pub mod permission;
pub mod storage;
