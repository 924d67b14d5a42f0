//! Management-scope filter building
//!
//! The inverse cascade: an administrator manages content at their own node
//! and at every descendant node, collected by a recursive walk of the
//! graph level by level. Where the end-user builder degrades to
//! "global content only", the management builder degrades to "nothing" -
//! a management view must never silently broaden its scope.

use tracing::warn;

use crate::db::schemas::UserDoc;
use crate::hierarchy::branch::{AdminLevel, OriginalLevel, TargetField, SECTOR_FIELDS};
use crate::hierarchy::graph::HierarchyStore;
use crate::hierarchy::predicate::Predicate;
use crate::hierarchy::{resolver, visibility};
use crate::types::Result;

/// Build the management predicate for an administrator.
///
/// `Admin` and `GeneralSecretariat` manage everything; a plain `User`
/// falls back to the end-user visibility filter; node-scoped levels get
/// their own node plus all transitive descendants.
pub async fn build_management_filter(
    store: &impl HierarchyStore,
    admin: &UserDoc,
) -> Result<Predicate> {
    if admin.admin_level.bypasses_hierarchy() {
        return Ok(Predicate::All);
    }

    match admin.admin_level {
        AdminLevel::User => {
            let resolved = resolver::resolve_user(store, admin).await;
            Ok(visibility::build_content_filter(&resolved))
        }
        AdminLevel::ExpatriateGeneral => {
            // The whole expatriate side: any expatriate or sector targeting
            let mut parts = vec![Predicate::NotNull(TargetField::ExpatriateRegion)];
            parts.extend(SECTOR_FIELDS.iter().map(|f| Predicate::NotNull(*f)));
            Ok(Predicate::Or(parts))
        }
        AdminLevel::ExpatriateRegion => {
            let Some(region_id) = admin.position.get(TargetField::ExpatriateRegion) else {
                warn!(
                    admin = %admin.identifier,
                    "expatriate region admin without a region, management scope empty"
                );
                return Ok(Predicate::Nothing);
            };
            let mut pred = Predicate::Eq(TargetField::ExpatriateRegion, region_id.to_string());

            // The region's sector subtrees are its descendants
            let roots = store.sector_roots(region_id).await?;
            let mut frontier: Vec<String> =
                roots.iter().filter_map(|node| node.id_hex()).collect();
            let mut level = OriginalLevel::NationalLevel;
            loop {
                if frontier.is_empty() {
                    break;
                }
                pred = pred.or(Predicate::In(level.sector_field(), frontier.clone()));
                let Some(next_level) = level.child() else {
                    break;
                };
                let mut next = Vec::new();
                for id in &frontier {
                    next.extend(
                        store
                            .sector_children(id)
                            .await?
                            .iter()
                            .filter_map(|node| node.id_hex()),
                    );
                }
                frontier = next;
                level = next_level;
            }
            Ok(pred)
        }
        _ => {
            // Node-scoped original-tree admins
            let Some(level) = admin.admin_level.original_level() else {
                warn!(
                    admin = %admin.identifier,
                    level = ?admin.admin_level,
                    "admin level carries no management scope"
                );
                return Ok(Predicate::Nothing);
            };
            let field = level.original_field();
            let Some(own_id) = admin.position.get(field) else {
                warn!(
                    admin = %admin.identifier,
                    level = ?level,
                    "admin has no node at their level, management scope empty"
                );
                return Ok(Predicate::Nothing);
            };

            let mut pred = Predicate::Eq(field, own_id.to_string());

            // Walk every level below the admin's own, not just the next one
            let mut frontier = vec![own_id.to_string()];
            let mut current = level;
            while let Some(child_level) = current.child() {
                let mut next = Vec::new();
                for id in &frontier {
                    next.extend(
                        store
                            .original_children(id)
                            .await?
                            .iter()
                            .filter_map(|node| node.id_hex()),
                    );
                }
                if next.is_empty() {
                    break;
                }
                pred = pred.or(Predicate::In(child_level.original_field(), next.clone()));
                frontier = next;
                current = child_level;
            }
            Ok(pred)
        }
    }
}

/// Build the report-listing predicate.
///
/// Reports carry no published flag, so there is no base condition. An
/// administrator sees their management scope plus their own submissions; a
/// member with no scope sees exactly their own submissions - never nothing
/// and never everything.
pub async fn build_report_filter(store: &impl HierarchyStore, user: &UserDoc) -> Result<Predicate> {
    if user.admin_level.bypasses_hierarchy() {
        return Ok(Predicate::All);
    }

    let own_submissions = Predicate::SubmittedBy(user.identifier.clone());
    if user.admin_level == AdminLevel::User {
        return Ok(own_submissions);
    }

    let scope = build_management_filter(store, user).await?;
    Ok(scope.or(own_submissions))
}
