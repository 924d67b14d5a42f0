//! Immutable filter predicates
//!
//! Filter builders return `Predicate` values instead of mutating an ad-hoc
//! where-clause in place. A predicate can be evaluated two ways: against an
//! in-memory view of a document ([`Predicate::matches`]) or rendered to a
//! MongoDB filter document ([`Predicate::to_document`]). Both evaluations
//! agree on the operator subset used here, which the tests pin down.

use bson::{doc, Bson, Document};

use crate::hierarchy::branch::TargetField;
use crate::hierarchy::targeting::TargetFields;

/// The facets of a content document a predicate can see
#[derive(Debug, Clone, Copy)]
pub struct ContentFacets<'a> {
    pub targeting: &'a TargetFields,
    /// `None` for kinds without a published flag (reports)
    pub published: Option<bool>,
    pub submitted_by: Option<&'a str>,
}

impl<'a> ContentFacets<'a> {
    pub fn new(targeting: &'a TargetFields) -> Self {
        Self {
            targeting,
            published: None,
            submitted_by: None,
        }
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    pub fn submitted_by(mut self, submitter: &'a str) -> Self {
        self.submitted_by = Some(submitter);
        self
    }
}

/// An immutable filter over targetable content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every document
    All,
    /// Matches no document
    Nothing,
    /// Target field equals the given node id
    Eq(TargetField, String),
    /// Target field is absent or null
    IsNull(TargetField),
    /// Target field is populated
    NotNull(TargetField),
    /// Target field is one of the given node ids
    In(TargetField, Vec<String>),
    /// Published flag equals the given value
    Published(bool),
    /// Report submitter equals the given member id
    SubmittedBy(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjoin two predicates, folding the `All`/`Nothing` identities
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::Nothing, _) | (_, Predicate::Nothing) => Predicate::Nothing,
            (Predicate::And(mut a), Predicate::And(b)) => {
                a.extend(b);
                Predicate::And(a)
            }
            (Predicate::And(mut a), p) => {
                a.push(p);
                Predicate::And(a)
            }
            (p, q) => Predicate::And(vec![p, q]),
        }
    }

    /// Disjoin two predicates, folding the `All`/`Nothing` identities
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Nothing, p) | (p, Predicate::Nothing) => p,
            (Predicate::All, _) | (_, Predicate::All) => Predicate::All,
            (Predicate::Or(mut a), Predicate::Or(b)) => {
                a.extend(b);
                Predicate::Or(a)
            }
            (Predicate::Or(mut a), p) => {
                a.push(p);
                Predicate::Or(a)
            }
            (p, q) => Predicate::Or(vec![p, q]),
        }
    }

    /// Conjunction asserting every listed field is null
    pub fn all_null(fields: &[TargetField]) -> Predicate {
        Predicate::And(fields.iter().map(|f| Predicate::IsNull(*f)).collect())
    }

    /// Evaluate against an in-memory document view
    pub fn matches(&self, facets: &ContentFacets<'_>) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Eq(field, id) => facets.targeting.get(*field) == Some(id.as_str()),
            Predicate::IsNull(field) => facets.targeting.get(*field).is_none(),
            Predicate::NotNull(field) => facets.targeting.get(*field).is_some(),
            Predicate::In(field, ids) => facets
                .targeting
                .get(*field)
                .is_some_and(|id| ids.iter().any(|candidate| candidate == id)),
            Predicate::Published(value) => facets.published == Some(*value),
            Predicate::SubmittedBy(member) => facets.submitted_by == Some(member.as_str()),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(facets)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(facets)),
        }
    }

    /// Render to a MongoDB filter document.
    ///
    /// `IsNull` renders as `{field: null}`, which matches absent fields too;
    /// documents serialize populated fields only, so absent and null are the
    /// same state.
    pub fn to_document(&self) -> Document {
        match self {
            Predicate::All => Document::new(),
            // No stored document lacks an _id
            Predicate::Nothing => doc! { "_id": { "$exists": false } },
            Predicate::Eq(field, id) => doc! { field.column(): id.as_str() },
            Predicate::IsNull(field) => doc! { field.column(): Bson::Null },
            Predicate::NotNull(field) => doc! { field.column(): { "$ne": Bson::Null } },
            Predicate::In(field, ids) => doc! { field.column(): { "$in": ids.clone() } },
            Predicate::Published(value) => doc! { "published": *value },
            Predicate::SubmittedBy(member) => doc! { "submitted_by": member.as_str() },
            Predicate::And(parts) => {
                if parts.is_empty() {
                    return Document::new();
                }
                let docs: Vec<Document> = parts.iter().map(|p| p.to_document()).collect();
                doc! { "$and": docs }
            }
            Predicate::Or(parts) => {
                if parts.is_empty() {
                    return Predicate::Nothing.to_document();
                }
                let docs: Vec<Document> = parts.iter().map(|p| p.to_document()).collect();
                doc! { "$or": docs }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targeting(fields: &[(TargetField, &str)]) -> TargetFields {
        let mut t = TargetFields::default();
        for (f, id) in fields {
            t.set(*f, Some(id.to_string()));
        }
        t
    }

    #[test]
    fn test_eq_and_null_matching() {
        let t = targeting(&[(TargetField::Region, "r1")]);
        let facets = ContentFacets::new(&t);

        assert!(Predicate::Eq(TargetField::Region, "r1".into()).matches(&facets));
        assert!(!Predicate::Eq(TargetField::Region, "r2".into()).matches(&facets));
        assert!(Predicate::IsNull(TargetField::District).matches(&facets));
        assert!(!Predicate::IsNull(TargetField::Region).matches(&facets));
        assert!(Predicate::NotNull(TargetField::Region).matches(&facets));
    }

    #[test]
    fn test_in_matching() {
        let t = targeting(&[(TargetField::Locality, "l2")]);
        let facets = ContentFacets::new(&t);

        let hit = Predicate::In(TargetField::Locality, vec!["l1".into(), "l2".into()]);
        let miss = Predicate::In(TargetField::Locality, vec!["l3".into()]);
        let empty = Predicate::In(TargetField::Locality, vec![]);
        assert!(hit.matches(&facets));
        assert!(!miss.matches(&facets));
        assert!(!empty.matches(&facets));
    }

    #[test]
    fn test_and_or_identities() {
        let p = Predicate::Eq(TargetField::Region, "r1".into());

        assert_eq!(Predicate::All.and(p.clone()), p);
        assert_eq!(p.clone().and(Predicate::Nothing), Predicate::Nothing);
        assert_eq!(Predicate::Nothing.or(p.clone()), p);
        assert_eq!(p.clone().or(Predicate::All), Predicate::All);
    }

    #[test]
    fn test_published_and_submitter_facets() {
        let t = TargetFields::default();
        let published = ContentFacets::new(&t).published(true);
        let unpublished = ContentFacets::new(&t).published(false);
        let report = ContentFacets::new(&t).submitted_by("u1");

        assert!(Predicate::Published(true).matches(&published));
        assert!(!Predicate::Published(true).matches(&unpublished));
        // Kinds without a published flag never match a published clause
        assert!(!Predicate::Published(true).matches(&report));
        assert!(Predicate::SubmittedBy("u1".into()).matches(&report));
        assert!(!Predicate::SubmittedBy("u2".into()).matches(&report));
    }

    #[test]
    fn test_document_rendering() {
        let pred = Predicate::Or(vec![
            Predicate::And(vec![
                Predicate::Eq(TargetField::Region, "r1".into()),
                Predicate::IsNull(TargetField::District),
            ]),
            Predicate::In(TargetField::District, vec!["d1".into(), "d2".into()]),
        ]);
        let doc = pred.to_document();
        let ors = doc.get_array("$or").unwrap();
        assert_eq!(ors.len(), 2);

        // All renders as the empty filter, Nothing matches no stored doc
        assert!(Predicate::All.to_document().is_empty());
        assert!(!Predicate::Nothing.to_document().is_empty());
    }

    #[test]
    fn test_matches_and_rendering_agree_per_operator() {
        // One fixture per operator: the rendered document is pinned exactly,
        // and the same predicate is evaluated in memory against a matching
        // and a non-matching document view. A drift on either side of the
        // dual evaluation breaks this test.
        let a = targeting(&[(TargetField::Region, "r1")]);
        let b = targeting(&[(TargetField::Region, "r2"), (TargetField::District, "d2")]);

        let cases: Vec<(Predicate, Document, bool, bool)> = vec![
            (
                Predicate::Eq(TargetField::Region, "r1".into()),
                doc! { "region_id": "r1" },
                true,
                false,
            ),
            (
                Predicate::IsNull(TargetField::District),
                doc! { "district_id": Bson::Null },
                true,
                false,
            ),
            (
                Predicate::NotNull(TargetField::District),
                doc! { "district_id": { "$ne": Bson::Null } },
                false,
                true,
            ),
            (
                Predicate::In(TargetField::Region, vec!["r1".into(), "r3".into()]),
                doc! { "region_id": { "$in": ["r1", "r3"] } },
                true,
                false,
            ),
            (
                Predicate::And(vec![
                    Predicate::Eq(TargetField::Region, "r1".into()),
                    Predicate::IsNull(TargetField::District),
                ]),
                doc! { "$and": [ { "region_id": "r1" }, { "district_id": Bson::Null } ] },
                true,
                false,
            ),
            (
                Predicate::Or(vec![
                    Predicate::Eq(TargetField::Region, "r1".into()),
                    Predicate::Eq(TargetField::District, "d9".into()),
                ]),
                doc! { "$or": [ { "region_id": "r1" }, { "district_id": "d9" } ] },
                true,
                false,
            ),
        ];

        for (pred, expected, on_a, on_b) in cases {
            assert_eq!(pred.to_document(), expected, "{:?}", pred);
            assert_eq!(pred.matches(&ContentFacets::new(&a)), on_a, "{:?}", pred);
            assert_eq!(pred.matches(&ContentFacets::new(&b)), on_b, "{:?}", pred);
        }

        // Published and SubmittedBy read non-targeting facets
        let published = ContentFacets::new(&a).published(true);
        let report = ContentFacets::new(&b).submitted_by("m1");

        let pred = Predicate::Published(true);
        assert_eq!(pred.to_document(), doc! { "published": true });
        assert!(pred.matches(&published));
        assert!(!pred.matches(&report));

        let pred = Predicate::SubmittedBy("m1".into());
        assert_eq!(pred.to_document(), doc! { "submitted_by": "m1" });
        assert!(pred.matches(&report));
        assert!(!pred.matches(&published));
    }

    #[test]
    fn test_empty_connectives_render_safely() {
        // An empty $and / $or array is invalid in MongoDB
        assert!(Predicate::And(vec![]).to_document().is_empty());
        assert_eq!(
            Predicate::Or(vec![]).to_document(),
            Predicate::Nothing.to_document()
        );
    }
}
