//! Shared types for Terrace

mod error;

pub use error::{Result, TerraceError};
