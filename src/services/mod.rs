//! Services layer for Terrace
//!
//! Business logic that coordinates the hierarchy engine with the content
//! collections: listing content through the visibility filters, and the
//! write-time targeting checks that guard content creation.

pub mod listing;

pub use listing::{ensure_targets_exist, ContentService, Tagged};
