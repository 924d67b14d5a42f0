//! End-user visibility filter building
//!
//! Visibility cascades downward: content pinned at a node is visible to
//! members at that node and at every strict descendant, which from the
//! member's side means "my exact node, or any strict ancestor of it, or
//! global". The builder emits one clause per populated level of the
//! member's active branch - an equality on that level plus null assertions
//! on every more specific level - and always appends the fully-untargeted
//! clause so global content reaches everyone.
//!
//! One builder serves every content kind; there is no per-kind variant of
//! this algorithm.

use crate::db::schemas::ContentKind;
use crate::hierarchy::branch::ALL_TARGET_FIELDS;
use crate::hierarchy::predicate::Predicate;
use crate::hierarchy::resolver::ResolvedHierarchy;

/// Build the cascading visibility predicate for a resolved member.
///
/// Members who bypass hierarchy filtering get `All`; the caller's base
/// conditions (published flag, date ranges) are then the only filter.
pub fn build_content_filter(resolved: &ResolvedHierarchy) -> Predicate {
    if resolved.bypasses_hierarchy() {
        return Predicate::All;
    }

    let fields = resolved.branch.level_fields();
    let mut clauses: Vec<Predicate> = Vec::new();

    // Most specific populated level first; each clause pins an exact level
    // and asserts every more specific level is untargeted on the content.
    for (idx, field) in fields.iter().enumerate() {
        if let Some(id) = resolved.position.get(*field) {
            let mut parts = vec![Predicate::Eq(*field, id.to_string())];
            parts.extend(fields[..idx].iter().map(|f| Predicate::IsNull(*f)));
            clauses.push(Predicate::And(parts));
        }
    }

    // Untargeted content is visible regardless of branch or position
    clauses.push(Predicate::all_null(&ALL_TARGET_FIELDS));

    Predicate::Or(clauses)
}

/// Visibility filter for one content kind, with the published base
/// condition conjoined when the kind carries one.
pub fn listing_filter(kind: ContentKind, resolved: &ResolvedHierarchy) -> Predicate {
    let base = if kind.has_published_flag() {
        Predicate::Published(true)
    } else {
        Predicate::All
    };
    base.and(build_content_filter(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::branch::{AdminLevel, Branch, TargetField};
    use crate::hierarchy::predicate::ContentFacets;
    use crate::hierarchy::targeting::TargetFields;

    fn resolved(branch: Branch, fields: &[(TargetField, &str)]) -> ResolvedHierarchy {
        let mut position = TargetFields::default();
        for (f, id) in fields {
            position.set(*f, Some(id.to_string()));
        }
        ResolvedHierarchy {
            position,
            branch,
            admin_level: AdminLevel::User,
        }
    }

    fn content(fields: &[(TargetField, &str)]) -> TargetFields {
        let mut t = TargetFields::default();
        for (f, id) in fields {
            t.set(*f, Some(id.to_string()));
        }
        t
    }

    fn full_original_user() -> ResolvedHierarchy {
        resolved(
            Branch::Original,
            &[
                (TargetField::NationalLevel, "n1"),
                (TargetField::Region, "r1"),
                (TargetField::Locality, "l1"),
                (TargetField::AdminUnit, "au1"),
                (TargetField::District, "d1"),
            ],
        )
    }

    #[test]
    fn test_region_content_cascades_to_descendants() {
        let filter = build_content_filter(&full_original_user());

        // Region-wide item: region set, everything more specific null
        let region_item = content(&[(TargetField::Region, "r1")]);
        assert!(filter.matches(&ContentFacets::new(&region_item)));

        // Same shape, different region
        let other_region = content(&[(TargetField::Region, "r2")]);
        assert!(!filter.matches(&ContentFacets::new(&other_region)));
    }

    #[test]
    fn test_sibling_district_is_excluded() {
        // Same region, locality, and admin unit - sibling district d2
        let user = resolved(
            Branch::Original,
            &[
                (TargetField::Region, "r1"),
                (TargetField::Locality, "l1"),
                (TargetField::AdminUnit, "au1"),
                (TargetField::District, "d2"),
            ],
        );
        let filter = build_content_filter(&user);

        let d1_item = content(&[(TargetField::District, "d1")]);
        assert!(!filter.matches(&ContentFacets::new(&d1_item)));

        let d2_item = content(&[(TargetField::District, "d2")]);
        assert!(filter.matches(&ContentFacets::new(&d2_item)));
    }

    #[test]
    fn test_descendant_content_is_not_visible_upward() {
        // Member pinned at region level only
        let user = resolved(Branch::Original, &[(TargetField::Region, "r1")]);
        let filter = build_content_filter(&user);

        // District item under their region is NOT visible to them
        let district_item = content(&[(TargetField::District, "d1")]);
        assert!(!filter.matches(&ContentFacets::new(&district_item)));
    }

    #[test]
    fn test_global_content_reaches_everyone() {
        let global = TargetFields::default();

        for user in [
            full_original_user(),
            resolved(Branch::Sector, &[(TargetField::SectorRegion, "sr1")]),
            resolved(Branch::Expatriate, &[(TargetField::ExpatriateRegion, "e1")]),
            ResolvedHierarchy::restricted(),
        ] {
            let filter = build_content_filter(&user);
            assert!(
                filter.matches(&ContentFacets::new(&global)),
                "global content must reach {:?}",
                user.branch
            );
        }
    }

    #[test]
    fn test_restricted_member_sees_global_only() {
        let filter = build_content_filter(&ResolvedHierarchy::restricted());

        assert!(filter.matches(&ContentFacets::new(&TargetFields::default())));
        let region_item = content(&[(TargetField::Region, "r1")]);
        assert!(!filter.matches(&ContentFacets::new(&region_item)));
    }

    #[test]
    fn test_other_branches_contribute_nothing_but_global() {
        // Original-branch member must not see sector or expatriate content
        let filter = build_content_filter(&full_original_user());

        let sector_item = content(&[(TargetField::SectorRegion, "sr1")]);
        let expatriate_item = content(&[(TargetField::ExpatriateRegion, "e1")]);
        assert!(!filter.matches(&ContentFacets::new(&sector_item)));
        assert!(!filter.matches(&ContentFacets::new(&expatriate_item)));
    }

    #[test]
    fn test_expatriate_branch_is_single_equality() {
        let user = resolved(Branch::Expatriate, &[(TargetField::ExpatriateRegion, "e1")]);
        let filter = build_content_filter(&user);

        let own = content(&[(TargetField::ExpatriateRegion, "e1")]);
        let other = content(&[(TargetField::ExpatriateRegion, "e2")]);
        assert!(filter.matches(&ContentFacets::new(&own)));
        assert!(!filter.matches(&ContentFacets::new(&other)));
    }

    #[test]
    fn test_bypass_levels_see_everything() {
        let mut user = full_original_user();
        user.admin_level = AdminLevel::Admin;
        let filter = build_content_filter(&user);
        assert_eq!(filter, Predicate::All);

        // Content from two different branches in one predicate
        let sector_item = content(&[(TargetField::SectorDistrict, "sd9")]);
        let original_item = content(&[(TargetField::District, "d9")]);
        assert!(filter.matches(&ContentFacets::new(&sector_item)));
        assert!(filter.matches(&ContentFacets::new(&original_item)));
    }

    #[test]
    fn test_clause_count_tracks_populated_levels() {
        // Partially populated member: region and district only
        let user = resolved(
            Branch::Original,
            &[(TargetField::Region, "r1"), (TargetField::District, "d1")],
        );
        match build_content_filter(&user) {
            Predicate::Or(clauses) => assert_eq!(clauses.len(), 3), // 2 levels + global
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_listing_filter_published_base() {
        let user = full_original_user();
        let region_item = content(&[(TargetField::Region, "r1")]);

        let filter = listing_filter(ContentKind::Bulletin, &user);
        assert!(filter.matches(&ContentFacets::new(&region_item).published(true)));
        assert!(!filter.matches(&ContentFacets::new(&region_item).published(false)));

        // Reports carry no published flag
        let report_filter = listing_filter(ContentKind::Report, &user);
        assert!(report_filter.matches(&ContentFacets::new(&region_item).submitted_by("u1")));
    }

    #[test]
    fn test_bypass_listing_filter_is_published_only() {
        let mut user = full_original_user();
        user.admin_level = AdminLevel::GeneralSecretariat;
        assert_eq!(
            listing_filter(ContentKind::Survey, &user),
            Predicate::Published(true)
        );
    }
}
