//! Member hierarchy resolution
//!
//! A member's stored position is treated as authoritative but incomplete:
//! the most specific populated id implies every strict ancestor, and those
//! ancestors are derived from the graph whenever they are missing. Stored
//! values are never overwritten, and a failed or missing node lookup
//! degrades to the stored position rather than failing the read - this
//! path serves anonymous and public callers.

use tracing::{debug, warn};

use crate::db::schemas::UserDoc;
use crate::hierarchy::branch::{AdminLevel, Branch, TargetField, ORIGINAL_FIELDS, SECTOR_FIELDS};
use crate::hierarchy::graph::HierarchyStore;
use crate::hierarchy::targeting::TargetFields;
use crate::types::Result;

/// A member's fully-resolved hierarchy position
#[derive(Debug, Clone)]
pub struct ResolvedHierarchy {
    /// Position with derivable ancestors filled in
    pub position: TargetFields,
    /// The branch the member acts on, auto-detected when not stored
    pub branch: Branch,
    pub admin_level: AdminLevel,
}

impl ResolvedHierarchy {
    /// True when hierarchy filtering does not apply to this member
    pub fn bypasses_hierarchy(&self) -> bool {
        self.admin_level.bypasses_hierarchy()
    }

    /// Maximally-restrictive resolution for unknown or anonymous callers:
    /// no position, so downstream filters match global content only.
    pub fn restricted() -> Self {
        Self {
            position: TargetFields::default(),
            branch: Branch::Original,
            admin_level: AdminLevel::User,
        }
    }
}

/// Resolve a member by id.
///
/// An unknown member id resolves to the restricted position instead of
/// failing; only infrastructure errors propagate.
pub async fn resolve(store: &impl HierarchyStore, user_id: &str) -> Result<ResolvedHierarchy> {
    match store.load_user(user_id).await? {
        Some(user) => Ok(resolve_user(store, &user).await),
        None => {
            debug!(user = %user_id, "unknown member, resolving to restricted position");
            Ok(ResolvedHierarchy::restricted())
        }
    }
}

/// Resolve an already-loaded member record.
pub async fn resolve_user(store: &impl HierarchyStore, user: &UserDoc) -> ResolvedHierarchy {
    if user.admin_level.bypasses_hierarchy() {
        // No derivation needed, filtering is bypassed entirely
        return ResolvedHierarchy {
            position: user.position.clone(),
            branch: user.active_hierarchy.unwrap_or_default(),
            admin_level: user.admin_level,
        };
    }

    let mut position = user.position.clone();
    derive_original_ancestors(store, &mut position).await;
    derive_sector_ancestors(store, &mut position).await;

    let branch = user.active_hierarchy.unwrap_or_else(|| detect_branch(&position));

    ResolvedHierarchy {
        position,
        branch,
        admin_level: user.admin_level,
    }
}

/// Auto-detect the active branch from the populated position fields
fn detect_branch(position: &TargetFields) -> Branch {
    if position.has_any(&ORIGINAL_FIELDS) {
        Branch::Original
    } else if position.has_any(&SECTOR_FIELDS) {
        Branch::Sector
    } else if position.get(TargetField::ExpatriateRegion).is_some() {
        Branch::Expatriate
    } else {
        Branch::Original
    }
}

/// Fill missing original-branch ancestors by walking parent links from the
/// most specific populated node.
async fn derive_original_ancestors(store: &impl HierarchyStore, position: &mut TargetFields) {
    let Some((start, start_id)) = ORIGINAL_FIELDS
        .iter()
        .enumerate()
        .find_map(|(idx, f)| position.get(*f).map(|id| (idx, id.to_string())))
    else {
        return;
    };
    let ancestors = &ORIGINAL_FIELDS[start + 1..];
    if ancestors.iter().all(|f| position.get(*f).is_some()) {
        return;
    }

    let mut current = match store.original_node(&start_id).await {
        Ok(Some(node)) => node,
        Ok(None) => {
            warn!(node = %start_id, "original node missing, keeping stored position");
            return;
        }
        Err(e) => {
            warn!(node = %start_id, "ancestor lookup failed, keeping stored position: {}", e);
            return;
        }
    };

    while let Some(parent_id) = current.parent_id.clone() {
        let parent = match store.original_node(&parent_id).await {
            Ok(Some(node)) => node,
            Ok(None) => {
                warn!(node = %parent_id, "parent chain broken, keeping partial position");
                return;
            }
            Err(e) => {
                warn!(node = %parent_id, "parent lookup failed, keeping partial position: {}", e);
                return;
            }
        };
        let field = parent.level.original_field();
        // Stored values win over derived ones
        if position.get(field).is_none() {
            position.set(field, parent.id_hex());
        }
        current = parent;
    }
}

/// Sector-branch counterpart of the original ancestor derivation. Also
/// fills the member's expatriate region from the sector subtree, since
/// every sector node belongs to exactly one region.
async fn derive_sector_ancestors(store: &impl HierarchyStore, position: &mut TargetFields) {
    let Some((start, start_id)) = SECTOR_FIELDS
        .iter()
        .enumerate()
        .find_map(|(idx, f)| position.get(*f).map(|id| (idx, id.to_string())))
    else {
        return;
    };
    let ancestors = &SECTOR_FIELDS[start + 1..];
    let region_missing = position.get(TargetField::ExpatriateRegion).is_none();
    if ancestors.iter().all(|f| position.get(*f).is_some()) && !region_missing {
        return;
    }

    let mut current = match store.sector_node(&start_id).await {
        Ok(Some(node)) => node,
        Ok(None) => {
            warn!(node = %start_id, "sector node missing, keeping stored position");
            return;
        }
        Err(e) => {
            warn!(node = %start_id, "sector lookup failed, keeping stored position: {}", e);
            return;
        }
    };

    if position.get(TargetField::ExpatriateRegion).is_none() {
        position.set(
            TargetField::ExpatriateRegion,
            Some(current.expatriate_region_id.clone()),
        );
    }

    while let Some(parent_id) = current.parent_id.clone() {
        let parent = match store.sector_node(&parent_id).await {
            Ok(Some(node)) => node,
            Ok(None) => {
                warn!(node = %parent_id, "sector parent chain broken, keeping partial position");
                return;
            }
            Err(e) => {
                warn!(node = %parent_id, "sector parent lookup failed, keeping partial position: {}", e);
                return;
            }
        };
        let field = parent.level.sector_field();
        if position.get(field).is_none() {
            position.set(field, parent.id_hex());
        }
        current = parent;
    }
}
