//! Hierarchy reference-data access and administration
//!
//! The resolver and the filter builders only ever read the graph, through
//! [`HierarchyStore`]. Reference-data writes go through the create
//! operations here, which enforce the structural invariants (typed parent
//! levels, sector region inheritance, the four fixed sector roots per
//! expatriate region) before anything is persisted.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::schemas::{ExpatriateRegionDoc, OriginalNodeDoc, SectorNodeDoc, UserDoc};
use crate::hierarchy::branch::{OriginalLevel, SectorType};
use crate::types::{Result, TerraceError};

pub use memory::MemoryHierarchy;
pub use mongo::MongoHierarchy;

/// Read access to the hierarchy graph and member records
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn load_user(&self, user_id: &str) -> Result<Option<UserDoc>>;

    async fn original_node(&self, id: &str) -> Result<Option<OriginalNodeDoc>>;

    async fn sector_node(&self, id: &str) -> Result<Option<SectorNodeDoc>>;

    async fn expatriate_region(&self, id: &str) -> Result<Option<ExpatriateRegionDoc>>;

    /// Direct children of an original-tree node
    async fn original_children(&self, parent_id: &str) -> Result<Vec<OriginalNodeDoc>>;

    /// Direct children of a sector-tree node
    async fn sector_children(&self, parent_id: &str) -> Result<Vec<SectorNodeDoc>>;

    /// Parent-less sector nodes of one expatriate region (the four roots)
    async fn sector_roots(&self, expatriate_region_id: &str) -> Result<Vec<SectorNodeDoc>>;
}

/// Write access, used by the administration operations below
#[async_trait]
pub trait HierarchyStoreMut: HierarchyStore {
    async fn insert_original(&self, node: OriginalNodeDoc) -> Result<String>;

    async fn insert_sector(&self, node: SectorNodeDoc) -> Result<String>;

    async fn insert_expatriate_region(&self, region: ExpatriateRegionDoc) -> Result<String>;
}

/// Input for creating an original-tree node
#[derive(Debug, Clone)]
pub struct NewOriginalNode {
    pub name: String,
    pub code: String,
    pub level: OriginalLevel,
    pub parent_id: Option<String>,
}

/// Input for creating a sector-tree node
#[derive(Debug, Clone)]
pub struct NewSectorNode {
    pub name: String,
    pub code: String,
    pub level: OriginalLevel,
    pub parent_id: Option<String>,
    /// Required for roots; inherited from the parent otherwise. An explicit
    /// value conflicting with the parent's region is rejected.
    pub expatriate_region_id: Option<String>,
    /// Required for roots; inherited from the parent otherwise
    pub sector_type: Option<SectorType>,
}

/// Input for creating an expatriate region
#[derive(Debug, Clone)]
pub struct NewExpatriateRegion {
    pub name: String,
    pub code: String,
}

/// Create an original-tree node, validating the parent reference.
///
/// The parent must exist and sit exactly one level above the new node;
/// only national-level nodes are parent-less.
pub async fn create_original_node(
    store: &impl HierarchyStoreMut,
    input: NewOriginalNode,
) -> Result<String> {
    match (input.level.parent(), input.parent_id.as_deref()) {
        (None, None) => {}
        (None, Some(_)) => {
            return Err(TerraceError::Validation(
                "national level nodes cannot have a parent".to_string(),
            ))
        }
        (Some(expected), None) => {
            return Err(TerraceError::Validation(format!(
                "{:?} nodes require a {:?} parent",
                input.level, expected
            )))
        }
        (Some(expected), Some(parent_id)) => {
            let parent = store.original_node(parent_id).await?.ok_or_else(|| {
                TerraceError::NotFound(format!("parent node '{}' does not exist", parent_id))
            })?;
            if parent.level != expected {
                return Err(TerraceError::Validation(format!(
                    "parent of a {:?} node must be a {:?}, '{}' is a {:?}",
                    input.level, expected, parent_id, parent.level
                )));
            }
        }
    }

    store
        .insert_original(OriginalNodeDoc::new(
            input.name,
            input.code,
            input.level,
            input.parent_id,
        ))
        .await
}

/// Create a sector-tree node.
///
/// The expatriate region is inherited from the parent when one is given;
/// supplying an explicit region that conflicts with the parent's is
/// rejected, so every sector node resolves to exactly one region.
pub async fn create_sector_node(
    store: &impl HierarchyStoreMut,
    input: NewSectorNode,
) -> Result<String> {
    let (expatriate_region_id, sector_type) = match (input.level.parent(), input.parent_id.as_deref())
    {
        (None, Some(_)) => {
            return Err(TerraceError::Validation(
                "sector national level nodes cannot have a parent".to_string(),
            ))
        }
        (Some(expected), None) => {
            return Err(TerraceError::Validation(format!(
                "sector {:?} nodes require a sector {:?} parent",
                input.level, expected
            )))
        }
        (None, None) => {
            let region_id = input.expatriate_region_id.clone().ok_or_else(|| {
                TerraceError::Validation(
                    "sector roots must name their expatriate region".to_string(),
                )
            })?;
            if store.expatriate_region(&region_id).await?.is_none() {
                return Err(TerraceError::NotFound(format!(
                    "expatriate region '{}' does not exist",
                    region_id
                )));
            }
            let sector_type = input.sector_type.ok_or_else(|| {
                TerraceError::Validation("sector roots must name their sector type".to_string())
            })?;
            (region_id, sector_type)
        }
        (Some(expected), Some(parent_id)) => {
            let parent = store.sector_node(parent_id).await?.ok_or_else(|| {
                TerraceError::NotFound(format!("parent sector node '{}' does not exist", parent_id))
            })?;
            if parent.level != expected {
                return Err(TerraceError::Validation(format!(
                    "parent of a sector {:?} node must be a sector {:?}",
                    input.level, expected
                )));
            }
            if let Some(explicit) = input.expatriate_region_id.as_deref() {
                if explicit != parent.expatriate_region_id {
                    return Err(TerraceError::Validation(
                        "explicit expatriate region conflicts with the parent's".to_string(),
                    ));
                }
            }
            if let Some(explicit) = input.sector_type {
                if explicit != parent.sector_type {
                    return Err(TerraceError::Validation(
                        "explicit sector type conflicts with the parent's".to_string(),
                    ));
                }
            }
            (parent.expatriate_region_id.clone(), parent.sector_type)
        }
    };

    store
        .insert_sector(SectorNodeDoc {
            _id: None,
            metadata: crate::db::schemas::Metadata::new(),
            name: input.name,
            code: input.code,
            active: true,
            level: input.level,
            parent_id: input.parent_id,
            expatriate_region_id,
            sector_type,
        })
        .await
}

/// Create an expatriate region and its four fixed sector roots.
///
/// Two-step orchestration: the region is inserted first, then one sector
/// national-level root per [`SectorType`]. A failed root insert is logged
/// and skipped; it never rolls back the region.
pub async fn create_expatriate_region(
    store: &impl HierarchyStoreMut,
    input: NewExpatriateRegion,
) -> Result<String> {
    let region_id = store
        .insert_expatriate_region(ExpatriateRegionDoc::new(
            input.name.clone(),
            input.code.clone(),
        ))
        .await?;

    for sector_type in SectorType::ALL {
        let root = SectorNodeDoc {
            _id: None,
            metadata: crate::db::schemas::Metadata::new(),
            name: format!("{} {}", input.name, sector_type.label()),
            code: format!("{}-{}", input.code, sector_type.label().to_lowercase()),
            active: true,
            level: OriginalLevel::NationalLevel,
            parent_id: None,
            expatriate_region_id: region_id.clone(),
            sector_type,
        };
        match store.insert_sector(root).await {
            Ok(root_id) => {
                info!(
                    region = %region_id,
                    sector = ?sector_type,
                    root = %root_id,
                    "created sector root"
                );
            }
            Err(e) => {
                warn!(
                    region = %region_id,
                    sector = ?sector_type,
                    "failed to create sector root, continuing: {}",
                    e
                );
            }
        }
    }

    Ok(region_id)
}
