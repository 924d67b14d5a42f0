//! Hierarchy branches, levels, and typed target-field tables
//!
//! Content and members can sit on one of three branches: the five-level
//! original tree, the flat expatriate region list, or the sector tree
//! mirrored under each expatriate region. Filter building iterates an
//! ordered per-branch field table instead of addressing struct fields by
//! computed name, so every level-walk in the crate goes through the tables
//! defined here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three independent hierarchy branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Branch {
    #[default]
    Original,
    Expatriate,
    Sector,
}

impl Branch {
    /// Target fields of this branch, ordered most specific to least.
    ///
    /// The expatriate branch has a single level, so its table is one entry.
    pub fn level_fields(&self) -> &'static [TargetField] {
        match self {
            Branch::Original => &ORIGINAL_FIELDS,
            Branch::Expatriate => &EXPATRIATE_FIELDS,
            Branch::Sector => &SECTOR_FIELDS,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Original => write!(f, "ORIGINAL"),
            Branch::Expatriate => write!(f, "EXPATRIATE"),
            Branch::Sector => write!(f, "SECTOR"),
        }
    }
}

/// Levels of the original tree (and its sector mirror), root first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginalLevel {
    NationalLevel,
    Region,
    Locality,
    AdminUnit,
    District,
}

impl OriginalLevel {
    /// All levels, root first
    pub const ALL: [OriginalLevel; 5] = [
        OriginalLevel::NationalLevel,
        OriginalLevel::Region,
        OriginalLevel::Locality,
        OriginalLevel::AdminUnit,
        OriginalLevel::District,
    ];

    /// The level a node's parent must sit at, `None` for the root level
    pub fn parent(&self) -> Option<OriginalLevel> {
        match self {
            OriginalLevel::NationalLevel => None,
            OriginalLevel::Region => Some(OriginalLevel::NationalLevel),
            OriginalLevel::Locality => Some(OriginalLevel::Region),
            OriginalLevel::AdminUnit => Some(OriginalLevel::Locality),
            OriginalLevel::District => Some(OriginalLevel::AdminUnit),
        }
    }

    /// The next level down, `None` at the leaf level
    pub fn child(&self) -> Option<OriginalLevel> {
        match self {
            OriginalLevel::NationalLevel => Some(OriginalLevel::Region),
            OriginalLevel::Region => Some(OriginalLevel::Locality),
            OriginalLevel::Locality => Some(OriginalLevel::AdminUnit),
            OriginalLevel::AdminUnit => Some(OriginalLevel::District),
            OriginalLevel::District => None,
        }
    }

    /// Target field for this level on the original branch
    pub fn original_field(&self) -> TargetField {
        match self {
            OriginalLevel::NationalLevel => TargetField::NationalLevel,
            OriginalLevel::Region => TargetField::Region,
            OriginalLevel::Locality => TargetField::Locality,
            OriginalLevel::AdminUnit => TargetField::AdminUnit,
            OriginalLevel::District => TargetField::District,
        }
    }

    /// Target field for this level on the sector branch
    pub fn sector_field(&self) -> TargetField {
        match self {
            OriginalLevel::NationalLevel => TargetField::SectorNationalLevel,
            OriginalLevel::Region => TargetField::SectorRegion,
            OriginalLevel::Locality => TargetField::SectorLocality,
            OriginalLevel::AdminUnit => TargetField::SectorAdminUnit,
            OriginalLevel::District => TargetField::SectorDistrict,
        }
    }
}

/// The four fixed sector types mirrored under every expatriate region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectorType {
    Social,
    Economic,
    Organizational,
    Political,
}

impl SectorType {
    pub const ALL: [SectorType; 4] = [
        SectorType::Social,
        SectorType::Economic,
        SectorType::Organizational,
        SectorType::Political,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SectorType::Social => "Social",
            SectorType::Economic => "Economic",
            SectorType::Organizational => "Organizational",
            SectorType::Political => "Political",
        }
    }
}

/// The eleven target-id columns shared by content and member positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    NationalLevel,
    Region,
    Locality,
    AdminUnit,
    District,
    ExpatriateRegion,
    SectorNationalLevel,
    SectorRegion,
    SectorLocality,
    SectorAdminUnit,
    SectorDistrict,
}

impl TargetField {
    /// BSON/serde column name, matching the flattened document layout
    pub fn column(&self) -> &'static str {
        match self {
            TargetField::NationalLevel => "national_level_id",
            TargetField::Region => "region_id",
            TargetField::Locality => "locality_id",
            TargetField::AdminUnit => "admin_unit_id",
            TargetField::District => "district_id",
            TargetField::ExpatriateRegion => "expatriate_region_id",
            TargetField::SectorNationalLevel => "sector_national_level_id",
            TargetField::SectorRegion => "sector_region_id",
            TargetField::SectorLocality => "sector_locality_id",
            TargetField::SectorAdminUnit => "sector_admin_unit_id",
            TargetField::SectorDistrict => "sector_district_id",
        }
    }

    /// Branch this field belongs to
    pub fn branch(&self) -> Branch {
        match self {
            TargetField::NationalLevel
            | TargetField::Region
            | TargetField::Locality
            | TargetField::AdminUnit
            | TargetField::District => Branch::Original,
            TargetField::ExpatriateRegion => Branch::Expatriate,
            TargetField::SectorNationalLevel
            | TargetField::SectorRegion
            | TargetField::SectorLocality
            | TargetField::SectorAdminUnit
            | TargetField::SectorDistrict => Branch::Sector,
        }
    }
}

/// Original-branch fields, most specific first
pub const ORIGINAL_FIELDS: [TargetField; 5] = [
    TargetField::District,
    TargetField::AdminUnit,
    TargetField::Locality,
    TargetField::Region,
    TargetField::NationalLevel,
];

/// Expatriate branch has a single level
pub const EXPATRIATE_FIELDS: [TargetField; 1] = [TargetField::ExpatriateRegion];

/// Sector-branch fields, most specific first
pub const SECTOR_FIELDS: [TargetField; 5] = [
    TargetField::SectorDistrict,
    TargetField::SectorAdminUnit,
    TargetField::SectorLocality,
    TargetField::SectorRegion,
    TargetField::SectorNationalLevel,
];

/// Every target field across all three branches
pub const ALL_TARGET_FIELDS: [TargetField; 11] = [
    TargetField::District,
    TargetField::AdminUnit,
    TargetField::Locality,
    TargetField::Region,
    TargetField::NationalLevel,
    TargetField::ExpatriateRegion,
    TargetField::SectorDistrict,
    TargetField::SectorAdminUnit,
    TargetField::SectorLocality,
    TargetField::SectorRegion,
    TargetField::SectorNationalLevel,
];

/// Administrative level of a member account
///
/// `Admin` and `GeneralSecretariat` bypass hierarchy filtering entirely.
/// The node-scoped levels (`District` through `NationalLevel`, plus the two
/// expatriate levels) drive the management-scope filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminLevel {
    #[default]
    User,
    District,
    AdminUnit,
    Locality,
    Region,
    NationalLevel,
    ExpatriateRegion,
    ExpatriateGeneral,
    GeneralSecretariat,
    Admin,
}

impl AdminLevel {
    /// True when hierarchy filtering does not apply at all
    pub fn bypasses_hierarchy(&self) -> bool {
        matches!(self, AdminLevel::Admin | AdminLevel::GeneralSecretariat)
    }

    /// The original-tree level this admin is scoped to, if any
    pub fn original_level(&self) -> Option<OriginalLevel> {
        match self {
            AdminLevel::NationalLevel => Some(OriginalLevel::NationalLevel),
            AdminLevel::Region => Some(OriginalLevel::Region),
            AdminLevel::Locality => Some(OriginalLevel::Locality),
            AdminLevel::AdminUnit => Some(OriginalLevel::AdminUnit),
            AdminLevel::District => Some(OriginalLevel::District),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order_round_trip() {
        for level in OriginalLevel::ALL {
            if let Some(parent) = level.parent() {
                assert_eq!(parent.child(), Some(level));
            }
            if let Some(child) = level.child() {
                assert_eq!(child.parent(), Some(level));
            }
        }
    }

    #[test]
    fn test_branch_field_tables_are_branch_pure() {
        for field in Branch::Original.level_fields() {
            assert_eq!(field.branch(), Branch::Original);
        }
        for field in Branch::Sector.level_fields() {
            assert_eq!(field.branch(), Branch::Sector);
        }
        assert_eq!(Branch::Expatriate.level_fields().len(), 1);
    }

    #[test]
    fn test_all_target_fields_cover_every_branch() {
        assert_eq!(ALL_TARGET_FIELDS.len(), 11);
        let originals = ALL_TARGET_FIELDS
            .iter()
            .filter(|f| f.branch() == Branch::Original)
            .count();
        let sectors = ALL_TARGET_FIELDS
            .iter()
            .filter(|f| f.branch() == Branch::Sector)
            .count();
        assert_eq!(originals, 5);
        assert_eq!(sectors, 5);
    }

    #[test]
    fn test_bypass_levels() {
        assert!(AdminLevel::Admin.bypasses_hierarchy());
        assert!(AdminLevel::GeneralSecretariat.bypasses_hierarchy());
        assert!(!AdminLevel::NationalLevel.bypasses_hierarchy());
        assert!(!AdminLevel::User.bypasses_hierarchy());
    }

    #[test]
    fn test_exactly_four_sector_types() {
        assert_eq!(SectorType::ALL.len(), 4);
    }
}
