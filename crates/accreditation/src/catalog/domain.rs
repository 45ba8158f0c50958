use serde::{Deserialize, Serialize};

use crate::facility::FacilityKind;

/// Identifier wrapper for catalog criteria.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CriterionId(pub String);

impl CriterionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One weighted compliance requirement.
///
/// Criteria are never deleted once created; `active = false` removes them from
/// scoring while evaluation details keep resolving them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub code: String,
    pub label: String,
    pub description: Option<String>,
    pub category: String,
    /// `None` applies to every facility kind.
    pub facility_kind: Option<FacilityKind>,
    pub weight: u32,
    pub mandatory: bool,
    pub active: bool,
}

impl Criterion {
    pub fn applies_to(&self, kind: FacilityKind) -> bool {
        self.facility_kind.map_or(true, |scope| scope == kind)
    }

    pub fn is_scorable_for(&self, kind: FacilityKind) -> bool {
        self.active && self.applies_to(kind)
    }
}

/// Administrator input for a new catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCriterion {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub facility_kind: Option<FacilityKind>,
    pub weight: u32,
    #[serde(default)]
    pub mandatory: bool,
}

/// Store-level criterion selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriterionQuery {
    /// Matches criteria scoped to this kind plus unrestricted ones.
    pub facility_kind: Option<FacilityKind>,
    pub active_only: bool,
    pub category: Option<String>,
    pub mandatory: Option<bool>,
}

impl CriterionQuery {
    /// Active criteria that take part in scoring a facility of `kind`.
    pub fn scorable_for(kind: FacilityKind) -> Self {
        Self {
            facility_kind: Some(kind),
            active_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, criterion: &Criterion) -> bool {
        if self.active_only && !criterion.active {
            return false;
        }
        if let Some(kind) = self.facility_kind {
            if !criterion.applies_to(kind) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &criterion.category != category {
                return false;
            }
        }
        if let Some(mandatory) = self.mandatory {
            if criterion.mandatory != mandatory {
                return false;
            }
        }
        true
    }
}

/// Optional filters accepted by the catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CriteriaFilter {
    #[serde(default)]
    pub category: Option<String>,
    /// `Some(true)` lists mandatory criteria only, `Some(false)` optional ones only.
    #[serde(default)]
    pub mandatory: Option<bool>,
}
