//! Targetable content schemas
//!
//! Bulletins, surveys, voting items, and reports all carry the same
//! flattened target fields and flow through the same visibility engine;
//! archive documents are listed alongside them but are never hierarchy
//! targeted. Kind-specific payload fields stay minimal here - rendering
//! and attachment storage live outside this crate.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::hierarchy::predicate::ContentFacets;
use crate::hierarchy::targeting::TargetFields;

pub const BULLETIN_COLLECTION: &str = "bulletins";
pub const SURVEY_COLLECTION: &str = "surveys";
pub const VOTING_ITEM_COLLECTION: &str = "voting_items";
pub const REPORT_COLLECTION: &str = "reports";
pub const ARCHIVE_DOCUMENT_COLLECTION: &str = "archive_documents";

/// The content kinds the visibility engine serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Bulletin,
    Survey,
    VotingItem,
    Report,
    ArchiveDocument,
}

impl ContentKind {
    pub fn collection(&self) -> &'static str {
        match self {
            ContentKind::Bulletin => BULLETIN_COLLECTION,
            ContentKind::Survey => SURVEY_COLLECTION,
            ContentKind::VotingItem => VOTING_ITEM_COLLECTION,
            ContentKind::Report => REPORT_COLLECTION,
            ContentKind::ArchiveDocument => ARCHIVE_DOCUMENT_COLLECTION,
        }
    }

    /// Reports have no published flag; their base condition is omitted
    pub fn has_published_flag(&self) -> bool {
        !matches!(self, ContentKind::Report)
    }
}

/// Bulletin (announcement) document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BulletinDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub published: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime>,

    #[serde(flatten)]
    pub targeting: TargetFields,
}

impl BulletinDoc {
    pub fn facets(&self) -> ContentFacets<'_> {
        ContentFacets::new(&self.targeting).published(self.published)
    }
}

/// One survey question with free-form or fixed choices
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SurveyQuestion {
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Survey document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SurveyDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,

    #[serde(default)]
    pub published: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<DateTime>,

    #[serde(flatten)]
    pub targeting: TargetFields,
}

impl SurveyDoc {
    pub fn facets(&self) -> ContentFacets<'_> {
        ContentFacets::new(&self.targeting).published(self.published)
    }
}

/// One voting option with a simple counter (simple counting only; no
/// percentage math lives in this crate)
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VoteOption {
    pub label: String,
    #[serde(default)]
    pub vote_count: i64,
}

/// Voting item document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VotingItemDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub options: Vec<VoteOption>,

    #[serde(default)]
    pub published: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<DateTime>,

    #[serde(flatten)]
    pub targeting: TargetFields,
}

impl VotingItemDoc {
    pub fn facets(&self) -> ContentFacets<'_> {
        ContentFacets::new(&self.targeting).published(self.published)
    }
}

/// Report document. Reports are member-authored; visibility for
/// non-privileged members falls back to their own submissions.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ReportDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub body: String,

    /// Identifier of the authoring member
    pub submitted_by: String,

    #[serde(flatten)]
    pub targeting: TargetFields,
}

impl ReportDoc {
    pub fn facets(&self) -> ContentFacets<'_> {
        ContentFacets::new(&self.targeting).submitted_by(&self.submitted_by)
    }
}

/// Archive document reference (file storage is external). Never hierarchy
/// targeted; its empty target fields classify it GLOBAL.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ArchiveDocumentDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    /// Storage key of the uploaded file, resolved by the blob service
    pub file_key: String,

    #[serde(default)]
    pub published: bool,
}

fn title_index() -> Vec<(Document, Option<IndexOptions>)> {
    vec![(
        doc! { "title": 1 },
        Some(
            IndexOptions::builder()
                .name("title_index".to_string())
                .build(),
        ),
    )]
}

fn published_index() -> (Document, Option<IndexOptions>) {
    (
        doc! { "published": 1 },
        Some(
            IndexOptions::builder()
                .name("published_index".to_string())
                .build(),
        ),
    )
}

impl IntoIndexes for BulletinDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let mut indices = title_index();
        indices.push(published_index());
        indices
    }
}

impl IntoIndexes for SurveyDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let mut indices = title_index();
        indices.push(published_index());
        indices
    }
}

impl IntoIndexes for VotingItemDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let mut indices = title_index();
        indices.push(published_index());
        indices
    }
}

impl IntoIndexes for ReportDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "submitted_by": 1 },
            Some(
                IndexOptions::builder()
                    .name("submitted_by_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl IntoIndexes for ArchiveDocumentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        let mut indices = title_index();
        indices.push(published_index());
        indices
    }
}

impl MutMetadata for BulletinDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for SurveyDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for VotingItemDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for ReportDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for ArchiveDocumentDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::branch::TargetField;
    use crate::hierarchy::predicate::Predicate;

    #[test]
    fn test_facets_expose_the_kind_specific_fields() {
        let mut bulletin = BulletinDoc::default();
        bulletin.published = true;
        bulletin.targeting.set(TargetField::Region, Some("r1".into()));

        let facets = bulletin.facets();
        assert!(Predicate::Published(true).matches(&facets));
        assert!(Predicate::Eq(TargetField::Region, "r1".into()).matches(&facets));

        let mut report = ReportDoc::default();
        report.submitted_by = "member@example.org".to_string();

        let facets = report.facets();
        // Reports carry no published flag at all
        assert!(!Predicate::Published(true).matches(&facets));
        assert!(!Predicate::Published(false).matches(&facets));
        assert!(Predicate::SubmittedBy("member@example.org".into()).matches(&facets));
    }

    #[test]
    fn test_only_reports_lack_the_published_flag() {
        for kind in [
            ContentKind::Bulletin,
            ContentKind::Survey,
            ContentKind::VotingItem,
            ContentKind::ArchiveDocument,
        ] {
            assert!(kind.has_published_flag(), "{:?}", kind);
        }
        assert!(!ContentKind::Report.has_published_flag());
    }
}
