//! Accreditation scoring: turns a facility's checked criteria into a weighted
//! score, a conformity verdict, and a persisted evaluation.

mod certificate;
mod domain;
mod policy;
pub mod router;
mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use certificate::CertificateData;
pub use domain::{
    Evaluation, EvaluationDetail, EvaluationId, EvaluationResult, EvaluationSummary,
    EvaluationWrite, FacilityScore, ScoreSubmission,
};
pub use policy::{CriterionResolution, HistoryPolicy, ScoringPolicy, PASS_THRESHOLD};
pub use router::scoring_router;
pub use service::{AccreditationService, ScoringError};

use std::collections::BTreeSet;

use crate::catalog::{Criterion, CriterionId};
use crate::facility::{AccreditationStatus, FacilityKind};
use serde::Serialize;

/// Stateless evaluator over a criterion set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationEngine;

impl EvaluationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score `checked` against the criteria scorable for `kind`. Criteria that
    /// are inactive or scoped to the other kind are skipped, so the full catalog
    /// can be passed in.
    pub fn score(
        &self,
        kind: FacilityKind,
        criteria: &[Criterion],
        checked: &BTreeSet<CriterionId>,
    ) -> ScoreSheet {
        let tally = rules::tally(kind, criteria, checked);
        let percentage = rules::percentage(tally.score_total, tally.score_maximum);
        let conforming = policy::is_conforming(tally.mandatory_satisfied, percentage);
        let accreditation_status = policy::accreditation_status(conforming, percentage);

        ScoreSheet {
            score_total: tally.score_total,
            score_maximum: tally.score_maximum,
            percentage,
            mandatory_satisfied: tally.mandatory_satisfied,
            conforming,
            accreditation_status,
            details: tally.details,
            unresolved: tally.unresolved,
        }
    }
}

/// Pure scoring output, before anything is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSheet {
    pub score_total: u32,
    pub score_maximum: u32,
    pub percentage: f64,
    pub mandatory_satisfied: bool,
    pub conforming: bool,
    pub accreditation_status: AccreditationStatus,
    pub details: Vec<EvaluationDetail>,
    pub unresolved: Vec<CriterionId>,
}
