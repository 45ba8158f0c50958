use std::collections::HashMap;

use super::views::{EvolutionBucket, EvolutionCounts, KindSplit, RegistrationBucket};
use super::window::{filter_range, DateRange, MonthWindow};
use super::average_percentage;
use crate::evaluation::Evaluation;
use crate::facility::{Facility, FacilityId, FacilityKind, KindTotals};

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    evaluations: usize,
    percentage_sum: f64,
    conforming: usize,
    partial: usize,
    zero: usize,
}

impl Accumulator {
    fn record(&mut self, evaluation: &Evaluation) {
        self.evaluations += 1;
        self.percentage_sum += evaluation.percentage;
        if evaluation.conforming {
            self.conforming += 1;
        } else if evaluation.percentage > 0.0 {
            self.partial += 1;
        } else {
            self.zero += 1;
        }
    }

    fn finish(&self) -> EvolutionCounts {
        EvolutionCounts {
            evaluations: self.evaluations,
            average_percentage: average_percentage(self.percentage_sum, self.evaluations),
            conforming: self.conforming,
            partial: self.partial,
            zero: self.zero,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthAccumulator {
    all: Accumulator,
    ess: Accumulator,
    epvg: Accumulator,
}

/// One bucket per month of `window`, in order, zero-filled where nothing was
/// evaluated. Evaluations of unknown facilities are left out.
pub(crate) fn evolution(
    facilities: &[Facility],
    evaluations: &[Evaluation],
    window: &MonthWindow,
    range: Option<&DateRange>,
    split_by_type: bool,
) -> Vec<EvolutionBucket> {
    let kinds: HashMap<&FacilityId, FacilityKind> = facilities
        .iter()
        .map(|facility| (&facility.id, facility.kind))
        .collect();
    let mut months = vec![MonthAccumulator::default(); window.len()];

    for evaluation in evaluations {
        let Some(kind) = kinds.get(&evaluation.facility_id) else {
            continue;
        };
        if !filter_range(range, evaluation.evaluated_at) {
            continue;
        }
        let Some(index) = window.position(evaluation.evaluated_at) else {
            continue;
        };
        let bucket = &mut months[index];
        bucket.all.record(evaluation);
        match kind {
            FacilityKind::Ess => bucket.ess.record(evaluation),
            FacilityKind::Epvg => bucket.epvg.record(evaluation),
        }
    }

    window
        .months()
        .iter()
        .zip(months)
        .map(|(month, accumulated)| EvolutionBucket {
            month: month.key(),
            label: month.label(),
            counts: accumulated.all.finish(),
            by_kind: split_by_type.then(|| KindSplit {
                ess: accumulated.ess.finish(),
                epvg: accumulated.epvg.finish(),
            }),
        })
        .collect()
}

/// Monthly count of newly registered facilities over `window`.
pub(crate) fn registrations(
    facilities: &[Facility],
    window: &MonthWindow,
    range: Option<&DateRange>,
) -> Vec<RegistrationBucket> {
    let mut months = vec![KindTotals::default(); window.len()];
    for facility in facilities {
        if !filter_range(range, facility.created_at) {
            continue;
        }
        if let Some(index) = window.position(facility.created_at) {
            months[index].record(facility.kind);
        }
    }

    window
        .months()
        .iter()
        .zip(months)
        .map(|(month, facilities)| RegistrationBucket {
            month: month.key(),
            label: month.label(),
            facilities,
        })
        .collect()
}
