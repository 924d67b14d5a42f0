//! Database schemas for Terrace
//!
//! Defines MongoDB document structures for hierarchy reference data,
//! members, and targetable content.

mod content;
mod metadata;
mod node;
mod user;

pub use content::{
    ArchiveDocumentDoc, BulletinDoc, ContentKind, ReportDoc, SurveyDoc, SurveyQuestion,
    VoteOption, VotingItemDoc, ARCHIVE_DOCUMENT_COLLECTION, BULLETIN_COLLECTION,
    REPORT_COLLECTION, SURVEY_COLLECTION, VOTING_ITEM_COLLECTION,
};
pub use metadata::Metadata;
pub use node::{
    ExpatriateRegionDoc, OriginalNodeDoc, SectorNodeDoc, EXPATRIATE_REGION_COLLECTION,
    ORIGINAL_NODE_COLLECTION, SECTOR_NODE_COLLECTION,
};
pub use user::{UserDoc, USER_COLLECTION};
