use serde::Serialize;

use super::tranches::TrancheCounts;
use crate::facility::KindTotals;
use crate::geography::ProvinceId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCountEntry {
    pub status: &'static str,
    pub counts: KindTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCounts {
    pub totals: KindTotals,
    pub operational: Vec<StatusCountEntry>,
    pub accreditation: Vec<StatusCountEntry>,
}

impl StatusCounts {
    pub fn operational_count(&self, label: &str) -> KindTotals {
        lookup(&self.operational, label)
    }

    pub fn accreditation_count(&self, label: &str) -> KindTotals {
        lookup(&self.accreditation, label)
    }
}

fn lookup(entries: &[StatusCountEntry], label: &str) -> KindTotals {
    entries
        .iter()
        .find(|entry| entry.status == label)
        .map(|entry| entry.counts)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccreditationOverview {
    pub evaluated_facilities: usize,
    pub unevaluated_facilities: usize,
    /// Mean over every evaluation, one decimal.
    pub average_percentage: f64,
    pub total_evaluations: usize,
    pub tranches: TrancheCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EvolutionCounts {
    pub evaluations: usize,
    pub average_percentage: f64,
    pub conforming: usize,
    /// Non-conforming with a score above zero.
    pub partial: usize,
    pub zero: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KindSplit {
    pub ess: EvolutionCounts,
    pub epvg: EvolutionCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionBucket {
    /// `YYYY-MM`.
    pub month: String,
    pub label: String,
    #[serde(flatten)]
    pub counts: EvolutionCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_kind: Option<KindSplit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationBucket {
    pub month: String,
    pub label: String,
    pub facilities: KindTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceRollupEntry {
    pub province_id: ProvinceId,
    pub code: String,
    pub name: String,
    pub facilities: KindTotals,
    pub accredited: KindTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceRollup {
    /// Provinces with at least one facility, most facilities first.
    pub provinces: Vec<ProvinceRollupEntry>,
    /// Provinces with at least one accredited facility, most accredited first.
    pub accredited_ranking: Vec<ProvinceRollupEntry>,
    /// Facilities whose area does not resolve to a province.
    pub unplaced: KindTotals,
}
