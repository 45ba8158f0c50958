use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::HistoryPolicy;
use crate::catalog::CriterionId;
use crate::facility::{AccreditationStatus, FacilityId};

/// Identifier wrapper for persisted evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// Per-criterion outcome recorded with an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationDetail {
    pub criterion_id: CriterionId,
    /// The criterion weight when satisfied, otherwise zero.
    pub score: u32,
    pub satisfied: bool,
}

/// A scored evaluation of one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub reference: String,
    pub facility_id: FacilityId,
    pub evaluated_at: DateTime<Utc>,
    pub score_total: u32,
    pub score_maximum: u32,
    pub percentage: f64,
    pub conforming: bool,
    pub observations: Option<String>,
    pub details: Vec<EvaluationDetail>,
}

impl Evaluation {
    pub fn checked_criterion_ids(&self) -> BTreeSet<CriterionId> {
        self.details
            .iter()
            .filter(|detail| detail.satisfied)
            .map(|detail| detail.criterion_id.clone())
            .collect()
    }
}

/// Everything a store needs to persist a scoring run.
///
/// Stores own identifier and reference allocation so the sequence number is
/// read inside the same transaction as the write.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationWrite {
    pub facility_id: FacilityId,
    pub facility_code: String,
    pub evaluated_at: DateTime<Utc>,
    pub score_total: u32,
    pub score_maximum: u32,
    pub percentage: f64,
    pub conforming: bool,
    pub observations: Option<String>,
    pub details: Vec<EvaluationDetail>,
    pub accreditation_status: AccreditationStatus,
    pub history: HistoryPolicy,
}

impl EvaluationWrite {
    /// `EVAL-<facility code>-<sequence, zero padded to 3>`.
    pub fn reference(&self, sequence: usize) -> String {
        format!("EVAL-{}-{:03}", self.facility_code, sequence)
    }

    pub fn into_evaluation(self, id: EvaluationId, reference: String) -> Evaluation {
        Evaluation {
            id,
            reference,
            facility_id: self.facility_id,
            evaluated_at: self.evaluated_at,
            score_total: self.score_total,
            score_maximum: self.score_maximum,
            percentage: self.percentage,
            conforming: self.conforming,
            observations: self.observations,
            details: self.details,
        }
    }
}

/// Form submission for a scoring run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub checked_criterion_ids: BTreeSet<CriterionId>,
    #[serde(default)]
    pub observations: Option<String>,
}

impl ScoreSubmission {
    pub fn checked<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            checked_criterion_ids: ids.into_iter().map(|id| CriterionId(id.into())).collect(),
            observations: None,
        }
    }
}

/// Result of `score_facility`, returned to the caller after the write commits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub evaluation: Evaluation,
    pub percentage: f64,
    pub score_total: u32,
    pub score_maximum: u32,
    pub conforming: bool,
    pub accreditation_status: AccreditationStatus,
}

/// Header of the latest evaluation, used to pre-fill the scoring form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub id: EvaluationId,
    pub reference: String,
    pub evaluated_at: DateTime<Utc>,
    pub conforming: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationSummary>,
    pub checked_criterion_ids: BTreeSet<CriterionId>,
    pub percentage: f64,
    pub score_total: u32,
    pub score_maximum: u32,
}

impl FacilityScore {
    pub fn unevaluated() -> Self {
        Self {
            evaluation: None,
            checked_criterion_ids: BTreeSet::new(),
            percentage: 0.0,
            score_total: 0,
            score_maximum: 0,
        }
    }

    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self {
            evaluation: Some(EvaluationSummary {
                id: evaluation.id.clone(),
                reference: evaluation.reference.clone(),
                evaluated_at: evaluation.evaluated_at,
                conforming: evaluation.conforming,
            }),
            checked_criterion_ids: evaluation.checked_criterion_ids(),
            percentage: evaluation.percentage,
            score_total: evaluation.score_total,
            score_maximum: evaluation.score_maximum,
        }
    }
}
