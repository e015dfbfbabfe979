//! # Domain Models
//!
//! Pure data shared across the workspace: configuration, the submitted form bag with its
//! typed records, wizard step identifiers and the slice registry types.
//! Keep it lean: no I/O, networking, or heavy logic here.

pub mod config;
pub mod constants;
pub mod registry;
pub mod step;
pub mod submission;
