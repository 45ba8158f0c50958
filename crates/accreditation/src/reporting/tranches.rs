use std::collections::HashMap;

use serde::Serialize;

use crate::evaluation::Evaluation;
use crate::facility::{Facility, FacilityId};

/// Lowest percentage in the `excellent` tranche.
pub const EXCELLENT_THRESHOLD: f64 = 80.0;
/// Lowest percentage in the `good` tranche.
pub const GOOD_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTranche {
    Excellent,
    Good,
    Weak,
    Unevaluated,
}

impl ScoreTranche {
    /// A facility with no evaluation, or one scored exactly zero, is unevaluated.
    pub fn classify(percentage: Option<f64>) -> Self {
        match percentage {
            Some(value) if value >= EXCELLENT_THRESHOLD => Self::Excellent,
            Some(value) if value >= GOOD_THRESHOLD => Self::Good,
            Some(value) if value > 0.0 => Self::Weak,
            _ => Self::Unevaluated,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoreTranche::Excellent => "excellent",
            ScoreTranche::Good => "good",
            ScoreTranche::Weak => "weak",
            ScoreTranche::Unevaluated => "unevaluated",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrancheCounts {
    pub excellent: usize,
    pub good: usize,
    pub weak: usize,
    pub unevaluated: usize,
}

impl TrancheCounts {
    pub fn record(&mut self, tranche: ScoreTranche) {
        match tranche {
            ScoreTranche::Excellent => self.excellent += 1,
            ScoreTranche::Good => self.good += 1,
            ScoreTranche::Weak => self.weak += 1,
            ScoreTranche::Unevaluated => self.unevaluated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.weak + self.unevaluated
    }
}

/// Most recent evaluation per facility. On equal timestamps the later entry wins.
pub(crate) fn latest_by_facility(evaluations: &[Evaluation]) -> HashMap<&FacilityId, &Evaluation> {
    let mut latest: HashMap<&FacilityId, &Evaluation> = HashMap::new();
    for evaluation in evaluations {
        latest
            .entry(&evaluation.facility_id)
            .and_modify(|current| {
                if evaluation.evaluated_at >= current.evaluated_at {
                    *current = evaluation;
                }
            })
            .or_insert(evaluation);
    }
    latest
}

/// Every facility lands in exactly one tranche.
pub(crate) fn score_tranches(facilities: &[Facility], evaluations: &[Evaluation]) -> TrancheCounts {
    let latest = latest_by_facility(evaluations);
    let mut counts = TrancheCounts::default();
    for facility in facilities {
        let percentage = latest
            .get(&facility.id)
            .map(|evaluation| evaluation.percentage);
        counts.record(ScoreTranche::classify(percentage));
    }
    counts
}
