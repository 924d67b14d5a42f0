//! Member document schema
//!
//! A member's hierarchy position mirrors the content target fields. The
//! position is written at account creation or admin assignment; the
//! visibility engine only reads it, deriving missing ancestors at
//! resolution time rather than trusting them to be stored.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::hierarchy::branch::{AdminLevel, Branch};
use crate::hierarchy::targeting::TargetFields;

/// Collection name for members
pub const USER_COLLECTION: &str = "users";

/// Member document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Member identifier (email or username)
    pub identifier: String,

    /// Display name
    #[serde(default)]
    pub display_name: String,

    /// Administrative level; `User` for ordinary members
    #[serde(default)]
    pub admin_level: AdminLevel,

    /// Which branch the member acts on; auto-detected when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_hierarchy: Option<Branch>,

    /// Hierarchy position, same eleven columns as content targeting
    #[serde(flatten)]
    pub position: TargetFields,

    /// Whether the member account is active
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl UserDoc {
    /// Create a new member document
    pub fn new(identifier: String, display_name: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            identifier,
            display_name,
            admin_level: AdminLevel::User,
            active_hierarchy: None,
            position: TargetFields::default(),
            is_active: true,
        }
    }

    /// Hex id of a persisted member
    pub fn id_hex(&self) -> Option<String> {
        self._id.map(|oid| oid.to_hex())
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on identifier
            (
                doc! { "identifier": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("identifier_unique".to_string())
                        .build(),
                ),
            ),
            // Position lookups during membership reporting
            (
                doc! { "district_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("district_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "admin_level": 1 },
                Some(
                    IndexOptions::builder()
                        .name("admin_level_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
