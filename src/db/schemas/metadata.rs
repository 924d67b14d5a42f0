//! Document lifecycle metadata
//!
//! Every stored document embeds the same lifecycle block: creation and
//! update timestamps plus the soft-deletion pair. Retirement is always a
//! soft delete so hierarchy node ids referenced from member positions and
//! content targeting stay resolvable afterwards; reads filter on
//! `is_deleted` instead.

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle block embedded in every document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Metadata {
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Metadata {
    /// Fresh metadata for a document about to be persisted
    pub fn new() -> Self {
        let now = DateTime::now();
        Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: Some(now),
            created_at: Some(now),
        }
    }

    /// Refresh the update timestamp on a mutation
    pub fn touch(&mut self) {
        self.updated_at = Some(DateTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metadata_is_live_and_stamped() {
        let metadata = Metadata::new();
        assert!(!metadata.is_deleted);
        assert!(metadata.deleted_at.is_none());
        assert!(metadata.created_at.is_some());
        assert_eq!(metadata.updated_at, metadata.created_at);
    }
}
