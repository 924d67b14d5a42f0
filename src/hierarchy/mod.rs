//! Hierarchy targeting and visibility engine
//!
//! The core of Terrace: classify a content payload's targeting into one
//! branch (`targeting`), resolve a member's position with ancestors filled
//! in (`resolver`), and build the filter predicates content listings run
//! under (`visibility` for end users, `admin_scope` for management views).
//! All graph access goes through the `graph` store traits.

pub mod admin_scope;
pub mod branch;
pub mod graph;
pub mod predicate;
pub mod resolver;
pub mod targeting;
pub mod visibility;

pub use admin_scope::{build_management_filter, build_report_filter};
pub use branch::{AdminLevel, Branch, OriginalLevel, SectorType, TargetField};
pub use graph::{HierarchyStore, HierarchyStoreMut, MemoryHierarchy, MongoHierarchy};
pub use predicate::{ContentFacets, Predicate};
pub use resolver::{resolve, resolve_user, ResolvedHierarchy};
pub use targeting::{classify, validate_exclusive, TargetFields, TargetKind};
pub use visibility::{build_content_filter, listing_filter};
