//! Terrace - hierarchy-scoped content visibility and membership core
//!
//! Terrace is the targeting and visibility engine for a multi-branch
//! organizational platform. Members and content both sit on one of three
//! hierarchy branches (the five-level original tree, the flat expatriate
//! region list, or the sector tree mirrored per expatriate region), and
//! every content listing is filtered by matching the viewer's resolved
//! position against the content's targeting.
//!
//! ## Modules
//!
//! - **hierarchy**: targeting classification, user position resolution,
//!   visibility and management filter builders
//! - **db**: MongoDB collection wrapper and document schemas
//! - **services**: content listing and authoring orchestration
//!
//! The crate exposes no network surface; embedding services apply the
//! predicates it builds against their own content collections.

pub mod config;
pub mod db;
pub mod hierarchy;
pub mod logging;
pub mod services;
pub mod types;

pub use config::Args;
pub use types::{Result, TerraceError};
