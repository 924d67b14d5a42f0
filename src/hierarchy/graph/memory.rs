//! In-memory hierarchy store
//!
//! Dashmap-backed implementation of the store traits. Used as the fixture
//! store in tests and by embedders that preload reference data instead of
//! running MongoDB (seed tooling, offline checks).

use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::DashMap;

use crate::db::schemas::{ExpatriateRegionDoc, OriginalNodeDoc, SectorNodeDoc, UserDoc};
use crate::hierarchy::graph::{HierarchyStore, HierarchyStoreMut};
use crate::types::Result;

/// In-memory hierarchy store indexed by hex object id
#[derive(Default)]
pub struct MemoryHierarchy {
    users: DashMap<String, UserDoc>,
    original: DashMap<String, OriginalNodeDoc>,
    sector: DashMap<String, SectorNodeDoc>,
    expatriate: DashMap<String, ExpatriateRegionDoc>,
}

impl MemoryHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member record, assigning an id when missing
    pub fn add_user(&self, mut user: UserDoc) -> String {
        let id = user._id.unwrap_or_else(ObjectId::new);
        user._id = Some(id);
        let hex = id.to_hex();
        self.users.insert(hex.clone(), user);
        hex
    }

    /// Seed an original-tree node directly, bypassing create validation.
    /// Test fixtures use this to build known chains.
    pub fn add_original(&self, mut node: OriginalNodeDoc) -> String {
        let id = node._id.unwrap_or_else(ObjectId::new);
        node._id = Some(id);
        let hex = id.to_hex();
        self.original.insert(hex.clone(), node);
        hex
    }

    /// Seed a sector-tree node directly, bypassing create validation
    pub fn add_sector(&self, mut node: SectorNodeDoc) -> String {
        let id = node._id.unwrap_or_else(ObjectId::new);
        node._id = Some(id);
        let hex = id.to_hex();
        self.sector.insert(hex.clone(), node);
        hex
    }

    /// Seed an expatriate region directly, without the sector-root fan-out
    pub fn add_expatriate_region(&self, mut region: ExpatriateRegionDoc) -> String {
        let id = region._id.unwrap_or_else(ObjectId::new);
        region._id = Some(id);
        let hex = id.to_hex();
        self.expatriate.insert(hex.clone(), region);
        hex
    }

    /// Remove an original-tree node, simulating a deleted/orphaned record
    pub fn remove_original(&self, id: &str) {
        self.original.remove(id);
    }
}

#[async_trait]
impl HierarchyStore for MemoryHierarchy {
    async fn load_user(&self, user_id: &str) -> Result<Option<UserDoc>> {
        Ok(self.users.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn original_node(&self, id: &str) -> Result<Option<OriginalNodeDoc>> {
        Ok(self.original.get(id).map(|entry| entry.value().clone()))
    }

    async fn sector_node(&self, id: &str) -> Result<Option<SectorNodeDoc>> {
        Ok(self.sector.get(id).map(|entry| entry.value().clone()))
    }

    async fn expatriate_region(&self, id: &str) -> Result<Option<ExpatriateRegionDoc>> {
        Ok(self.expatriate.get(id).map(|entry| entry.value().clone()))
    }

    async fn original_children(&self, parent_id: &str) -> Result<Vec<OriginalNodeDoc>> {
        Ok(self
            .original
            .iter()
            .filter(|entry| entry.parent_id.as_deref() == Some(parent_id))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn sector_children(&self, parent_id: &str) -> Result<Vec<SectorNodeDoc>> {
        Ok(self
            .sector
            .iter()
            .filter(|entry| entry.parent_id.as_deref() == Some(parent_id))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn sector_roots(&self, expatriate_region_id: &str) -> Result<Vec<SectorNodeDoc>> {
        Ok(self
            .sector
            .iter()
            .filter(|entry| {
                entry.parent_id.is_none() && entry.expatriate_region_id == expatriate_region_id
            })
            .map(|entry| entry.value().clone())
            .collect())
    }
}

#[async_trait]
impl HierarchyStoreMut for MemoryHierarchy {
    async fn insert_original(&self, mut node: OriginalNodeDoc) -> Result<String> {
        let id = ObjectId::new();
        node._id = Some(id);
        let hex = id.to_hex();
        self.original.insert(hex.clone(), node);
        Ok(hex)
    }

    async fn insert_sector(&self, mut node: SectorNodeDoc) -> Result<String> {
        let id = ObjectId::new();
        node._id = Some(id);
        let hex = id.to_hex();
        self.sector.insert(hex.clone(), node);
        Ok(hex)
    }

    async fn insert_expatriate_region(&self, mut region: ExpatriateRegionDoc) -> Result<String> {
        let id = ObjectId::new();
        region._id = Some(id);
        let hex = id.to_hex();
        self.expatriate.insert(hex.clone(), region);
        Ok(hex)
    }
}
