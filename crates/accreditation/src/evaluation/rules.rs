use std::collections::BTreeSet;

use super::domain::EvaluationDetail;
use crate::catalog::{Criterion, CriterionId};
use crate::facility::FacilityKind;

pub(crate) struct Tally {
    pub score_total: u32,
    pub score_maximum: u32,
    pub mandatory_satisfied: bool,
    pub details: Vec<EvaluationDetail>,
    /// Checked ids that matched no scorable criterion, in id order.
    pub unresolved: Vec<CriterionId>,
}

pub(crate) fn tally(
    kind: FacilityKind,
    criteria: &[Criterion],
    checked: &BTreeSet<CriterionId>,
) -> Tally {
    let mut score_total = 0;
    let mut score_maximum = 0;
    let mut mandatory_satisfied = true;
    let mut details = Vec::new();
    let mut resolved = BTreeSet::new();

    for criterion in criteria.iter().filter(|c| c.is_scorable_for(kind)) {
        let satisfied = checked.contains(&criterion.id);
        score_maximum += criterion.weight;
        if satisfied {
            score_total += criterion.weight;
            resolved.insert(&criterion.id);
        } else if criterion.mandatory {
            mandatory_satisfied = false;
        }
        details.push(EvaluationDetail {
            criterion_id: criterion.id.clone(),
            score: if satisfied { criterion.weight } else { 0 },
            satisfied,
        });
    }

    let unresolved = checked
        .iter()
        .filter(|id| !resolved.contains(id))
        .cloned()
        .collect();

    Tally {
        score_total,
        score_maximum,
        mandatory_satisfied,
        details,
        unresolved,
    }
}

/// `total / maximum * 100` rounded to two decimals; zero when nothing is scorable.
pub(crate) fn percentage(score_total: u32, score_maximum: u32) -> f64 {
    if score_maximum == 0 {
        return 0.0;
    }
    let raw = f64::from(score_total) / f64::from(score_maximum) * 100.0;
    (raw * 100.0).round() / 100.0
}
