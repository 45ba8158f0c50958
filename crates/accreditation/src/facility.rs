use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geography::AreaId;

/// Identifier wrapper for registered facilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacilityId(pub String);

impl FacilityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FacilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two regulated facility kinds.
///
/// `Ess` covers health-care establishments (hospitals, clinics, health centres);
/// `Epvg` covers pharmaceutical wholesale distributors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FacilityKind {
    Ess,
    Epvg,
}

impl FacilityKind {
    pub const ALL: [FacilityKind; 2] = [FacilityKind::Ess, FacilityKind::Epvg];

    pub const fn code(self) -> &'static str {
        match self {
            FacilityKind::Ess => "ESS",
            FacilityKind::Epvg => "EPVG",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ESS" => Some(Self::Ess),
            "EPVG" => Some(Self::Epvg),
            _ => None,
        }
    }
}

/// Operational lifecycle of a facility, managed outside the scoring workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

impl OperationalStatus {
    pub const ALL: [OperationalStatus; 4] = [
        OperationalStatus::Active,
        OperationalStatus::Inactive,
        OperationalStatus::Suspended,
        OperationalStatus::Pending,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            OperationalStatus::Active => "active",
            OperationalStatus::Inactive => "inactive",
            OperationalStatus::Suspended => "suspended",
            OperationalStatus::Pending => "pending",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == value)
    }
}

/// Cached accreditation state. Rewritten every time an evaluation is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccreditationStatus {
    NotAccredited,
    InProgress,
    Accredited,
    Expired,
    Refused,
}

impl AccreditationStatus {
    pub const ALL: [AccreditationStatus; 5] = [
        AccreditationStatus::NotAccredited,
        AccreditationStatus::InProgress,
        AccreditationStatus::Accredited,
        AccreditationStatus::Expired,
        AccreditationStatus::Refused,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AccreditationStatus::NotAccredited => "not_accredited",
            AccreditationStatus::InProgress => "in_progress",
            AccreditationStatus::Accredited => "accredited",
            AccreditationStatus::Expired => "expired",
            AccreditationStatus::Refused => "refused",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == value)
    }
}

impl Default for AccreditationStatus {
    fn default() -> Self {
        Self::NotAccredited
    }
}

/// A regulated establishment. Only the fields the scoring and reporting
/// layers read are modelled; registration details live with the facility registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub code: String,
    pub name: String,
    pub kind: FacilityKind,
    pub operational_status: OperationalStatus,
    pub accreditation_status: AccreditationStatus,
    pub area_id: Option<AreaId>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub capacity: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Per-kind counters shared by the reporting views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTotals {
    pub ess: usize,
    pub epvg: usize,
    pub total: usize,
}

impl KindTotals {
    pub fn record(&mut self, kind: FacilityKind) {
        match kind {
            FacilityKind::Ess => self.ess += 1,
            FacilityKind::Epvg => self.epvg += 1,
        }
        self.total += 1;
    }

    pub fn get(&self, kind: FacilityKind) -> usize {
        match kind {
            FacilityKind::Ess => self.ess,
            FacilityKind::Epvg => self.epvg,
        }
    }
}
