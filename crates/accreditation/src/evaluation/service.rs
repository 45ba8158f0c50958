use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::certificate::{self, CertificateData};
use super::domain::{EvaluationResult, EvaluationWrite, FacilityScore, ScoreSubmission};
use super::policy::{CriterionResolution, ScoringPolicy};
use super::EvaluationEngine;
use crate::catalog::{CriterionId, CriterionQuery};
use crate::facility::{AccreditationStatus, FacilityId};
use crate::storage::{AccreditationStore, RepositoryError};

/// Service composing the store, the evaluation engine, and the scoring policy.
pub struct AccreditationService<S> {
    store: Arc<S>,
    engine: EvaluationEngine,
    policy: ScoringPolicy,
}

impl<S> AccreditationService<S>
where
    S: AccreditationStore + 'static,
{
    pub fn new(store: Arc<S>, policy: ScoringPolicy) -> Self {
        Self {
            store,
            engine: EvaluationEngine::new(),
            policy,
        }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Score a facility and persist the evaluation, stamped with the current time.
    pub fn score_facility(
        &self,
        facility_id: &FacilityId,
        submission: &ScoreSubmission,
    ) -> Result<EvaluationResult, ScoringError> {
        self.score_facility_at(facility_id, submission, Utc::now())
    }

    pub fn score_facility_at(
        &self,
        facility_id: &FacilityId,
        submission: &ScoreSubmission,
        evaluated_at: DateTime<Utc>,
    ) -> Result<EvaluationResult, ScoringError> {
        if facility_id.as_str().trim().is_empty() {
            return Err(ScoringError::MissingFacilityId);
        }

        let facility = self
            .store
            .facility(facility_id)?
            .ok_or_else(|| ScoringError::FacilityNotFound(facility_id.clone()))?;

        let criteria = self
            .store
            .criteria(&CriterionQuery::scorable_for(facility.kind))?;
        let sheet = self
            .engine
            .score(facility.kind, &criteria, &submission.checked_criterion_ids);

        if !sheet.unresolved.is_empty() {
            match self.policy.criterion_resolution {
                CriterionResolution::Strict => {
                    warn!(
                        facility_id = %facility.id,
                        unresolved = sheet.unresolved.len(),
                        "rejecting submission with unknown criteria"
                    );
                    return Err(ScoringError::UnknownCriteria(sheet.unresolved));
                }
                CriterionResolution::Lenient => {
                    debug!(
                        facility_id = %facility.id,
                        unresolved = ?sheet.unresolved,
                        "ignoring checked ids outside the applicable catalog"
                    );
                }
            }
        }

        let observations = submission
            .observations
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let evaluation = self.store.record_evaluation(EvaluationWrite {
            facility_id: facility.id.clone(),
            facility_code: facility.code.clone(),
            evaluated_at,
            score_total: sheet.score_total,
            score_maximum: sheet.score_maximum,
            percentage: sheet.percentage,
            conforming: sheet.conforming,
            observations,
            details: sheet.details,
            accreditation_status: sheet.accreditation_status,
            history: self.policy.history,
        })?;

        info!(
            facility_id = %facility.id,
            reference = %evaluation.reference,
            percentage = sheet.percentage,
            conforming = sheet.conforming,
            status = sheet.accreditation_status.label(),
            "evaluation recorded"
        );

        Ok(EvaluationResult {
            percentage: evaluation.percentage,
            score_total: evaluation.score_total,
            score_maximum: evaluation.score_maximum,
            conforming: evaluation.conforming,
            accreditation_status: sheet.accreditation_status,
            evaluation,
        })
    }

    /// Checked set and scores of the latest evaluation; zeros when none exists.
    pub fn facility_score(&self, facility_id: &FacilityId) -> Result<FacilityScore, ScoringError> {
        let score = match self.store.latest_evaluation(facility_id)? {
            Some(evaluation) => FacilityScore::from_evaluation(&evaluation),
            None => FacilityScore::unevaluated(),
        };
        Ok(score)
    }

    /// Certificate data for an accredited facility, issued on `issued_on`.
    pub fn certificate(
        &self,
        facility_id: &FacilityId,
        issued_on: NaiveDate,
    ) -> Result<CertificateData, ScoringError> {
        let facility = self
            .store
            .facility(facility_id)?
            .ok_or_else(|| ScoringError::FacilityNotFound(facility_id.clone()))?;

        if facility.accreditation_status != AccreditationStatus::Accredited {
            return Err(ScoringError::NotAccredited(facility.accreditation_status));
        }

        let evaluation = self
            .store
            .facility_evaluations(facility_id)?
            .into_iter()
            .find(|evaluation| evaluation.conforming)
            .ok_or(ScoringError::NoConformingEvaluation)?;

        let placement = match &facility.area_id {
            Some(area_id) => self.store.placement(area_id)?,
            None => None,
        };

        Ok(certificate::build(
            &facility,
            &evaluation,
            placement,
            issued_on,
        ))
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("facility {0} not found")]
    FacilityNotFound(FacilityId),
    #[error("a facility identifier is required")]
    MissingFacilityId,
    #[error("unknown or inapplicable criteria: {}", join_ids(.0))]
    UnknownCriteria(Vec<CriterionId>),
    #[error("facility is not accredited (status {})", .0.label())]
    NotAccredited(AccreditationStatus),
    #[error("no conforming evaluation found")]
    NoConformingEvaluation,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn join_ids(ids: &[CriterionId]) -> String {
    ids.iter()
        .map(CriterionId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
