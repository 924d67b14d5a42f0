//! Hierarchy reference-data schemas
//!
//! Reference nodes are administrator-managed and effectively read-only
//! during normal operation. Each of the two mirrored trees is stored in a
//! single collection with a `level` discriminator rather than five parallel
//! collections; parent references are hex object-id strings so the core
//! resolver never touches bson.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::hierarchy::branch::{OriginalLevel, SectorType};

/// Collection name for original-tree nodes
pub const ORIGINAL_NODE_COLLECTION: &str = "original_nodes";

/// Collection name for sector-tree nodes
pub const SECTOR_NODE_COLLECTION: &str = "sector_nodes";

/// Collection name for expatriate regions
pub const EXPATRIATE_REGION_COLLECTION: &str = "expatriate_regions";

/// Node of the five-level original tree
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OriginalNodeDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    /// Short administrative code, unique within a parent
    pub code: String,

    #[serde(default = "default_true")]
    pub active: bool,

    pub level: OriginalLevel,

    /// Parent node id (hex), `None` only at the national level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Default for OriginalNodeDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            name: String::new(),
            code: String::new(),
            active: true,
            level: OriginalLevel::NationalLevel,
            parent_id: None,
        }
    }
}

impl OriginalNodeDoc {
    pub fn new(
        name: String,
        code: String,
        level: OriginalLevel,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            code,
            active: true,
            level,
            parent_id,
        }
    }

    /// Hex id of a persisted node
    pub fn id_hex(&self) -> Option<String> {
        self._id.map(|oid| oid.to_hex())
    }
}

/// Node of the sector tree mirrored under an expatriate region
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SectorNodeDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    pub code: String,

    #[serde(default = "default_true")]
    pub active: bool,

    pub level: OriginalLevel,

    /// Parent sector node id (hex), `None` at the sector national level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// The expatriate region this sector subtree belongs to (hex id).
    /// Every node resolves to exactly one region, inherited from its parent.
    pub expatriate_region_id: String,

    pub sector_type: SectorType,
}

impl Default for SectorNodeDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            name: String::new(),
            code: String::new(),
            active: true,
            level: OriginalLevel::NationalLevel,
            parent_id: None,
            expatriate_region_id: String::new(),
            sector_type: SectorType::Social,
        }
    }
}

impl SectorNodeDoc {
    pub fn id_hex(&self) -> Option<String> {
        self._id.map(|oid| oid.to_hex())
    }
}

/// Flat, parent-less expatriate region
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExpatriateRegionDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    pub code: String,

    #[serde(default = "default_true")]
    pub active: bool,
}

impl Default for ExpatriateRegionDoc {
    fn default() -> Self {
        Self {
            _id: None,
            metadata: Metadata::default(),
            name: String::new(),
            code: String::new(),
            active: true,
        }
    }
}

impl ExpatriateRegionDoc {
    pub fn new(name: String, code: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            code,
            active: true,
        }
    }

    pub fn id_hex(&self) -> Option<String> {
        self._id.map(|oid| oid.to_hex())
    }
}

fn default_true() -> bool {
    true
}

impl IntoIndexes for OriginalNodeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "parent_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("parent_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "level": 1 },
                Some(
                    IndexOptions::builder()
                        .name("level_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl IntoIndexes for SectorNodeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "parent_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("parent_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "expatriate_region_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("expatriate_region_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl IntoIndexes for ExpatriateRegionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "code": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("code_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for OriginalNodeDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for SectorNodeDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for ExpatriateRegionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
