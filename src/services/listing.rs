//! Content listing and authoring service
//!
//! Read path: resolve the requesting member, build the filter for the
//! content kind, run it against the collection, and annotate every row
//! with its classified targeting for display. Write path: targeting is
//! validated (exclusivity plus referenced-node existence) before anything
//! is persisted.

use bson::{doc, DateTime, Document};
use tracing::{debug, info};

use crate::db::mongo::{parse_object_id, MongoClient, MongoCollection};
use crate::db::schemas::{
    ArchiveDocumentDoc, BulletinDoc, ContentKind, ReportDoc, SurveyDoc, VotingItemDoc,
    ARCHIVE_DOCUMENT_COLLECTION, BULLETIN_COLLECTION, REPORT_COLLECTION, SURVEY_COLLECTION,
    VOTING_ITEM_COLLECTION,
};
use crate::hierarchy::branch::Branch;
use crate::hierarchy::graph::{HierarchyStore, MongoHierarchy};
use crate::hierarchy::targeting::{classify, validate_exclusive, TargetFields, TargetKind};
use crate::hierarchy::{admin_scope, resolver, visibility};
use crate::types::{Result, TerraceError};

/// A content row annotated with its classified targeting
#[derive(Debug, Clone)]
pub struct Tagged<T> {
    pub item: T,
    pub kind: TargetKind,
}

/// Content listing and authoring over the MongoDB collections
#[derive(Clone)]
pub struct ContentService {
    hierarchy: MongoHierarchy,
    bulletins: MongoCollection<BulletinDoc>,
    surveys: MongoCollection<SurveyDoc>,
    voting_items: MongoCollection<VotingItemDoc>,
    reports: MongoCollection<ReportDoc>,
    archive_documents: MongoCollection<ArchiveDocumentDoc>,
}

impl ContentService {
    /// Open the content collections alongside the hierarchy store
    pub async fn connect(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            hierarchy: MongoHierarchy::connect(client).await?,
            bulletins: client.collection(BULLETIN_COLLECTION).await?,
            surveys: client.collection(SURVEY_COLLECTION).await?,
            voting_items: client.collection(VOTING_ITEM_COLLECTION).await?,
            reports: client.collection(REPORT_COLLECTION).await?,
            archive_documents: client.collection(ARCHIVE_DOCUMENT_COLLECTION).await?,
        })
    }

    pub fn hierarchy(&self) -> &MongoHierarchy {
        &self.hierarchy
    }

    /// Bulletins visible to the requesting member (or to an anonymous
    /// caller when the id is unknown: published global content only)
    pub async fn visible_bulletins(&self, user_id: &str) -> Result<Vec<Tagged<BulletinDoc>>> {
        let resolved = resolver::resolve(&self.hierarchy, user_id).await?;
        let filter = visibility::listing_filter(ContentKind::Bulletin, &resolved);
        let docs = self.bulletins.find_many(filter.to_document()).await?;
        Ok(docs
            .into_iter()
            .map(|d| Tagged {
                kind: classify(&d.targeting),
                item: d,
            })
            .collect())
    }

    pub async fn visible_surveys(&self, user_id: &str) -> Result<Vec<Tagged<SurveyDoc>>> {
        let resolved = resolver::resolve(&self.hierarchy, user_id).await?;
        let filter = visibility::listing_filter(ContentKind::Survey, &resolved);
        let docs = self.surveys.find_many(filter.to_document()).await?;
        Ok(docs
            .into_iter()
            .map(|d| Tagged {
                kind: classify(&d.targeting),
                item: d,
            })
            .collect())
    }

    pub async fn visible_voting_items(&self, user_id: &str) -> Result<Vec<Tagged<VotingItemDoc>>> {
        let resolved = resolver::resolve(&self.hierarchy, user_id).await?;
        let filter = visibility::listing_filter(ContentKind::VotingItem, &resolved);
        let docs = self.voting_items.find_many(filter.to_document()).await?;
        Ok(docs
            .into_iter()
            .map(|d| Tagged {
                kind: classify(&d.targeting),
                item: d,
            })
            .collect())
    }

    /// Archive documents are never hierarchy targeted; everyone sees the
    /// published set
    pub async fn visible_archive_documents(
        &self,
        user_id: &str,
    ) -> Result<Vec<ArchiveDocumentDoc>> {
        let resolved = resolver::resolve(&self.hierarchy, user_id).await?;
        let filter = visibility::listing_filter(ContentKind::ArchiveDocument, &resolved);
        self.archive_documents.find_many(filter.to_document()).await
    }

    /// Reports visible to a member: their management scope plus their own
    /// submissions. Unknown members see no reports at all.
    pub async fn visible_reports(&self, user_id: &str) -> Result<Vec<Tagged<ReportDoc>>> {
        let Some(user) = self.hierarchy.load_user(user_id).await? else {
            return Ok(Vec::new());
        };
        let filter = admin_scope::build_report_filter(&self.hierarchy, &user).await?;
        let docs = self.reports.find_many(filter.to_document()).await?;
        Ok(docs
            .into_iter()
            .map(|d| Tagged {
                kind: classify(&d.targeting),
                item: d,
            })
            .collect())
    }

    /// Bulletins an administrator may manage: their node and all
    /// descendants. Unknown administrators manage nothing.
    pub async fn manageable_bulletins(&self, admin_id: &str) -> Result<Vec<Tagged<BulletinDoc>>> {
        let Some(admin) = self.hierarchy.load_user(admin_id).await? else {
            return Ok(Vec::new());
        };
        let filter = admin_scope::build_management_filter(&self.hierarchy, &admin).await?;
        let docs = self.bulletins.find_many(filter.to_document()).await?;
        Ok(docs
            .into_iter()
            .map(|d| Tagged {
                kind: classify(&d.targeting),
                item: d,
            })
            .collect())
    }

    pub async fn create_bulletin(&self, doc: BulletinDoc) -> Result<String> {
        let kind = self.validate_targeting(&doc.targeting).await?;
        debug!(kind = %kind, title = %doc.title, "creating bulletin");
        Ok(self.bulletins.insert_one(doc).await?.to_hex())
    }

    pub async fn create_survey(&self, doc: SurveyDoc) -> Result<String> {
        let kind = self.validate_targeting(&doc.targeting).await?;
        debug!(kind = %kind, title = %doc.title, "creating survey");
        Ok(self.surveys.insert_one(doc).await?.to_hex())
    }

    pub async fn create_voting_item(&self, doc: VotingItemDoc) -> Result<String> {
        let kind = self.validate_targeting(&doc.targeting).await?;
        debug!(kind = %kind, title = %doc.title, "creating voting item");
        Ok(self.voting_items.insert_one(doc).await?.to_hex())
    }

    pub async fn create_report(&self, doc: ReportDoc) -> Result<String> {
        let kind = self.validate_targeting(&doc.targeting).await?;
        debug!(kind = %kind, title = %doc.title, "creating report");
        Ok(self.reports.insert_one(doc).await?.to_hex())
    }

    /// Flip a bulletin to published, stamping the publication time
    pub async fn publish_bulletin(&self, id: &str) -> Result<()> {
        let oid = parse_object_id(id)
            .ok_or_else(|| TerraceError::NotFound(format!("bulletin '{}' does not exist", id)))?;
        let result = self
            .bulletins
            .update_one(doc! { "_id": oid }, publish_update())
            .await?;
        if result.matched_count == 0 {
            return Err(TerraceError::NotFound(format!(
                "bulletin '{}' does not exist",
                id
            )));
        }
        info!(bulletin = %id, "published bulletin");
        Ok(())
    }

    /// Retire a bulletin. Soft deletion: the row disappears from every
    /// listing but stays stored.
    pub async fn retire_bulletin(&self, id: &str) -> Result<()> {
        let oid = parse_object_id(id)
            .ok_or_else(|| TerraceError::NotFound(format!("bulletin '{}' does not exist", id)))?;
        let result = self.bulletins.soft_delete(doc! { "_id": oid }).await?;
        if result.matched_count == 0 {
            return Err(TerraceError::NotFound(format!(
                "bulletin '{}' does not exist",
                id
            )));
        }
        info!(bulletin = %id, "retired bulletin");
        Ok(())
    }

    /// The write-time precondition: exclusive targeting and existing
    /// nodes. Update flows re-validate retargeted payloads through this
    /// before persisting.
    pub async fn validate_targeting(&self, targeting: &TargetFields) -> Result<TargetKind> {
        let kind = validate_exclusive(targeting)?;
        ensure_targets_exist(&self.hierarchy, targeting).await?;
        Ok(kind)
    }
}

/// Update document flipping content to published with a timestamp
fn publish_update() -> Document {
    doc! {
        "$set": {
            "published": true,
            "published_at": DateTime::now(),
            "metadata.updated_at": DateTime::now(),
        }
    }
}

/// Reject targeting that references hierarchy nodes which do not exist
pub async fn ensure_targets_exist(
    store: &impl HierarchyStore,
    targeting: &TargetFields,
) -> Result<()> {
    for (field, id) in targeting.populated() {
        let exists = match field.branch() {
            Branch::Original => store.original_node(id).await?.is_some(),
            Branch::Expatriate => store.expatriate_region(id).await?.is_some(),
            Branch::Sector => store.sector_node(id).await?.is_some(),
        };
        if !exists {
            return Err(TerraceError::NotFound(format!(
                "target node '{}' ({}) does not exist",
                id,
                field.column()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::branch::TargetField;
    use crate::hierarchy::fixtures::original_chain;
    use crate::hierarchy::graph::MemoryHierarchy;

    #[test]
    fn test_publish_update_sets_flag_and_timestamps() {
        let update = publish_update();
        let set = update.get_document("$set").unwrap();
        assert!(set.get_bool("published").unwrap());
        assert!(set.get_datetime("published_at").is_ok());
        // The lifecycle block is stamped alongside the payload change
        assert!(set.get_datetime("metadata.updated_at").is_ok());
    }

    #[tokio::test]
    async fn test_ensure_targets_exist_accepts_known_nodes() {
        let store = MemoryHierarchy::new();
        let chain = original_chain(&store);

        let mut targeting = TargetFields::default();
        targeting.set(TargetField::Region, Some(chain.region));
        assert!(ensure_targets_exist(&store, &targeting).await.is_ok());

        // Untargeted payloads always pass
        assert!(ensure_targets_exist(&store, &TargetFields::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_ensure_targets_exist_rejects_unknown_nodes() {
        let store = MemoryHierarchy::new();
        original_chain(&store);

        let mut targeting = TargetFields::default();
        targeting.set(TargetField::District, Some("ffffffffffffffffffffffff".into()));
        let err = ensure_targets_exist(&store, &targeting).await.unwrap_err();
        assert!(matches!(err, TerraceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ensure_targets_exist_checks_the_right_branch() {
        let store = MemoryHierarchy::new();
        let chain = original_chain(&store);

        // An original node id supplied as a sector target must not pass
        let mut targeting = TargetFields::default();
        targeting.set(TargetField::SectorRegion, Some(chain.region));
        let err = ensure_targets_exist(&store, &targeting).await.unwrap_err();
        assert!(matches!(err, TerraceError::NotFound(_)));
    }
}
