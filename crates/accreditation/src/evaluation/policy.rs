use serde::{Deserialize, Serialize};

use crate::facility::AccreditationStatus;

/// Minimum percentage for a conforming evaluation. Not configurable per call.
pub const PASS_THRESHOLD: f64 = 80.0;

/// How checked criterion ids that do not resolve to an active, applicable
/// criterion are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionResolution {
    /// Unknown ids contribute nothing and are dropped.
    #[default]
    Lenient,
    /// Unknown ids reject the submission before anything is written.
    Strict,
}

impl CriterionResolution {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Whether rescoring overwrites the facility's evaluation or appends a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    #[default]
    Overwrite,
    Append,
}

impl HistoryPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Some(Self::Overwrite),
            "append" => Some(Self::Append),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub criterion_resolution: CriterionResolution,
    pub history: HistoryPolicy,
}

/// Conformity is an iff: every mandatory criterion satisfied and the pass line reached.
pub(crate) fn is_conforming(mandatory_satisfied: bool, percentage: f64) -> bool {
    mandatory_satisfied && percentage >= PASS_THRESHOLD
}

/// Status written to the facility by an automatic scoring run. `Expired` and
/// `Refused` are administrative and never produced here.
pub(crate) fn accreditation_status(conforming: bool, percentage: f64) -> AccreditationStatus {
    if conforming {
        AccreditationStatus::Accredited
    } else if percentage > 0.0 {
        AccreditationStatus::InProgress
    } else {
        AccreditationStatus::NotAccredited
    }
}
