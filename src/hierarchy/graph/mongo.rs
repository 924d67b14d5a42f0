//! MongoDB-backed hierarchy store

use async_trait::async_trait;
use bson::{doc, Bson};

use crate::db::mongo::{parse_object_id, MongoClient, MongoCollection};
use crate::db::schemas::{
    ExpatriateRegionDoc, OriginalNodeDoc, SectorNodeDoc, UserDoc, EXPATRIATE_REGION_COLLECTION,
    ORIGINAL_NODE_COLLECTION, SECTOR_NODE_COLLECTION, USER_COLLECTION,
};
use crate::hierarchy::graph::{HierarchyStore, HierarchyStoreMut};
use crate::types::Result;

/// Hierarchy store backed by the MongoDB collections
#[derive(Clone)]
pub struct MongoHierarchy {
    users: MongoCollection<UserDoc>,
    original: MongoCollection<OriginalNodeDoc>,
    sector: MongoCollection<SectorNodeDoc>,
    expatriate: MongoCollection<ExpatriateRegionDoc>,
}

impl MongoHierarchy {
    /// Open the hierarchy collections, applying their indexes
    pub async fn connect(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            users: client.collection(USER_COLLECTION).await?,
            original: client.collection(ORIGINAL_NODE_COLLECTION).await?,
            sector: client.collection(SECTOR_NODE_COLLECTION).await?,
            expatriate: client.collection(EXPATRIATE_REGION_COLLECTION).await?,
        })
    }

    pub fn users(&self) -> &MongoCollection<UserDoc> {
        &self.users
    }
}

#[async_trait]
impl HierarchyStore for MongoHierarchy {
    async fn load_user(&self, user_id: &str) -> Result<Option<UserDoc>> {
        // A malformed id means the record cannot exist
        let Some(oid) = parse_object_id(user_id) else {
            return Ok(None);
        };
        self.users.find_one(doc! { "_id": oid }).await
    }

    async fn original_node(&self, id: &str) -> Result<Option<OriginalNodeDoc>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        self.original.find_one(doc! { "_id": oid }).await
    }

    async fn sector_node(&self, id: &str) -> Result<Option<SectorNodeDoc>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        self.sector.find_one(doc! { "_id": oid }).await
    }

    async fn expatriate_region(&self, id: &str) -> Result<Option<ExpatriateRegionDoc>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        self.expatriate.find_one(doc! { "_id": oid }).await
    }

    async fn original_children(&self, parent_id: &str) -> Result<Vec<OriginalNodeDoc>> {
        self.original
            .find_many(doc! { "parent_id": parent_id })
            .await
    }

    async fn sector_children(&self, parent_id: &str) -> Result<Vec<SectorNodeDoc>> {
        self.sector.find_many(doc! { "parent_id": parent_id }).await
    }

    async fn sector_roots(&self, expatriate_region_id: &str) -> Result<Vec<SectorNodeDoc>> {
        self.sector
            .find_many(doc! {
                "expatriate_region_id": expatriate_region_id,
                "parent_id": Bson::Null,
            })
            .await
    }
}

#[async_trait]
impl HierarchyStoreMut for MongoHierarchy {
    async fn insert_original(&self, node: OriginalNodeDoc) -> Result<String> {
        Ok(self.original.insert_one(node).await?.to_hex())
    }

    async fn insert_sector(&self, node: SectorNodeDoc) -> Result<String> {
        Ok(self.sector.insert_one(node).await?.to_hex())
    }

    async fn insert_expatriate_region(&self, region: ExpatriateRegionDoc) -> Result<String> {
        Ok(self.expatriate.insert_one(region).await?.to_hex())
    }
}
