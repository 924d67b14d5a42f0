//! Targeting classification for content payloads
//!
//! Every targetable document carries the same eleven optional node ids,
//! at most one branch of which may be populated. Classification derives the
//! branch from "any field in the group is set", never from a single
//! canonical field, so partially-filled groups classify the same as fully
//! chained ones.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hierarchy::branch::{
    Branch, TargetField, ALL_TARGET_FIELDS, EXPATRIATE_FIELDS, ORIGINAL_FIELDS, SECTOR_FIELDS,
};
use crate::types::{Result, TerraceError};

/// The eleven optional node references shared by content targeting and
/// member positions. Flattened into the owning document, so the serde
/// names here are the BSON column names predicates are built against.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_level_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expatriate_region_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_national_level_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_locality_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_admin_unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_district_id: Option<String>,
}

impl TargetFields {
    /// Read one field through the typed accessor table
    pub fn get(&self, field: TargetField) -> Option<&str> {
        let slot = match field {
            TargetField::NationalLevel => &self.national_level_id,
            TargetField::Region => &self.region_id,
            TargetField::Locality => &self.locality_id,
            TargetField::AdminUnit => &self.admin_unit_id,
            TargetField::District => &self.district_id,
            TargetField::ExpatriateRegion => &self.expatriate_region_id,
            TargetField::SectorNationalLevel => &self.sector_national_level_id,
            TargetField::SectorRegion => &self.sector_region_id,
            TargetField::SectorLocality => &self.sector_locality_id,
            TargetField::SectorAdminUnit => &self.sector_admin_unit_id,
            TargetField::SectorDistrict => &self.sector_district_id,
        };
        slot.as_deref()
    }

    /// Write one field through the typed accessor table
    pub fn set(&mut self, field: TargetField, value: Option<String>) {
        let slot = match field {
            TargetField::NationalLevel => &mut self.national_level_id,
            TargetField::Region => &mut self.region_id,
            TargetField::Locality => &mut self.locality_id,
            TargetField::AdminUnit => &mut self.admin_unit_id,
            TargetField::District => &mut self.district_id,
            TargetField::ExpatriateRegion => &mut self.expatriate_region_id,
            TargetField::SectorNationalLevel => &mut self.sector_national_level_id,
            TargetField::SectorRegion => &mut self.sector_region_id,
            TargetField::SectorLocality => &mut self.sector_locality_id,
            TargetField::SectorAdminUnit => &mut self.sector_admin_unit_id,
            TargetField::SectorDistrict => &mut self.sector_district_id,
        };
        *slot = value;
    }

    /// True when any of the given fields is populated
    pub fn has_any(&self, fields: &[TargetField]) -> bool {
        fields.iter().any(|f| self.get(*f).is_some())
    }

    /// True when all eleven fields are empty (untargeted / global)
    pub fn is_empty(&self) -> bool {
        !self.has_any(&ALL_TARGET_FIELDS)
    }

    /// Populated fields paired with their ids, across all branches
    pub fn populated(&self) -> Vec<(TargetField, &str)> {
        ALL_TARGET_FIELDS
            .iter()
            .filter_map(|f| self.get(*f).map(|id| (*f, id)))
            .collect()
    }
}

/// Derived targeting classification of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    Original,
    Expatriate,
    Sector,
    Mixed,
    Global,
}

impl TargetKind {
    /// The branch a cleanly-classified payload belongs to
    pub fn branch(&self) -> Option<Branch> {
        match self {
            TargetKind::Original => Some(Branch::Original),
            TargetKind::Expatriate => Some(Branch::Expatriate),
            TargetKind::Sector => Some(Branch::Sector),
            TargetKind::Mixed | TargetKind::Global => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Original => write!(f, "ORIGINAL"),
            TargetKind::Expatriate => write!(f, "EXPATRIATE"),
            TargetKind::Sector => write!(f, "SECTOR"),
            TargetKind::Mixed => write!(f, "MIXED"),
            TargetKind::Global => write!(f, "GLOBAL"),
        }
    }
}

/// Classify a payload's targeting.
///
/// More than one branch populated is `Mixed`; nothing populated is
/// `Global`. Expatriate wins over sector wins over original when exactly
/// one group is set (the order is immaterial at that point, but kept
/// explicit).
pub fn classify(fields: &TargetFields) -> TargetKind {
    let has_original = fields.has_any(&ORIGINAL_FIELDS);
    let has_expatriate = fields.has_any(&EXPATRIATE_FIELDS);
    let has_sector = fields.has_any(&SECTOR_FIELDS);

    let groups = [has_original, has_expatriate, has_sector]
        .iter()
        .filter(|b| **b)
        .count();

    if groups > 1 {
        TargetKind::Mixed
    } else if has_expatriate {
        TargetKind::Expatriate
    } else if has_sector {
        TargetKind::Sector
    } else if has_original {
        TargetKind::Original
    } else {
        TargetKind::Global
    }
}

/// Classify and reject mixed-branch targeting.
///
/// Hard precondition for every content create or update; a `Mixed` payload
/// must never be persisted.
pub fn validate_exclusive(fields: &TargetFields) -> Result<TargetKind> {
    match classify(fields) {
        TargetKind::Mixed => Err(TerraceError::Validation(
            "cannot mix hierarchies: targeting must stay within one branch".to_string(),
        )),
        kind => Ok(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(fields: &[(TargetField, &str)]) -> TargetFields {
        let mut t = TargetFields::default();
        for (f, id) in fields {
            t.set(*f, Some(id.to_string()));
        }
        t
    }

    #[test]
    fn test_classify_all_group_combinations() {
        // One representative field per group; exercise all 2^3 presence
        // combinations of the three groups.
        for mask in 0u8..8 {
            let mut fields = Vec::new();
            if mask & 1 != 0 {
                fields.push((TargetField::Locality, "l1"));
            }
            if mask & 2 != 0 {
                fields.push((TargetField::ExpatriateRegion, "e1"));
            }
            if mask & 4 != 0 {
                fields.push((TargetField::SectorRegion, "sr1"));
            }
            let kind = classify(&with(&fields));
            let expected = match mask.count_ones() {
                0 => TargetKind::Global,
                1 => match mask {
                    1 => TargetKind::Original,
                    2 => TargetKind::Expatriate,
                    _ => TargetKind::Sector,
                },
                _ => TargetKind::Mixed,
            };
            assert_eq!(kind, expected, "mask {:#05b}", mask);
        }
    }

    #[test]
    fn test_classify_uses_any_field_in_group() {
        // The group is detected from any populated field, not a canonical one
        assert_eq!(
            classify(&with(&[(TargetField::NationalLevel, "n1")])),
            TargetKind::Original
        );
        assert_eq!(
            classify(&with(&[(TargetField::District, "d1")])),
            TargetKind::Original
        );
        assert_eq!(
            classify(&with(&[(TargetField::SectorDistrict, "sd1")])),
            TargetKind::Sector
        );
    }

    #[test]
    fn test_classify_partially_chained_group_is_not_mixed() {
        // region + district without the levels in between is still ORIGINAL
        let t = with(&[(TargetField::Region, "r1"), (TargetField::District, "d1")]);
        assert_eq!(classify(&t), TargetKind::Original);
    }

    #[test]
    fn test_validate_exclusive_rejects_cross_branch() {
        let t = with(&[
            (TargetField::Region, "r1"),
            (TargetField::ExpatriateRegion, "e1"),
        ]);
        let err = validate_exclusive(&t).unwrap_err();
        assert!(matches!(err, TerraceError::Validation(_)));
        assert!(err.to_string().contains("cannot mix hierarchies"));
    }

    #[test]
    fn test_validate_exclusive_passes_clean_payloads() {
        assert_eq!(
            validate_exclusive(&TargetFields::default()).unwrap(),
            TargetKind::Global
        );
        assert_eq!(
            validate_exclusive(&with(&[(TargetField::AdminUnit, "au1")])).unwrap(),
            TargetKind::Original
        );
    }

    #[test]
    fn test_is_empty_and_populated() {
        let t = TargetFields::default();
        assert!(t.is_empty());
        assert!(t.populated().is_empty());

        let t = with(&[(TargetField::SectorLocality, "sl1")]);
        assert!(!t.is_empty());
        assert_eq!(t.populated(), vec![(TargetField::SectorLocality, "sl1")]);
    }
}
