//! Cross-facility statistics: status counts, score tranches, monthly evolution
//! and provincial rollups. Reads the cached accreditation status and the
//! evaluation history; never re-derives scoring rules.

mod evolution;
mod provinces;
pub mod router;
pub mod service;
mod status;
mod tranches;
pub mod views;
mod window;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;

pub use router::reports_router;
pub use service::ReportingService;
pub use status::StatusCountQuery;
pub use tranches::{ScoreTranche, TrancheCounts, EXCELLENT_THRESHOLD, GOOD_THRESHOLD};
pub use views::{
    AccreditationOverview, EvolutionBucket, EvolutionCounts, KindSplit, ProvinceRollup,
    ProvinceRollupEntry, RegistrationBucket, StatusCountEntry, StatusCounts,
};
pub use window::{DateRange, MonthKey, MonthWindow, TRAILING_MONTHS};

use crate::storage::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("range start {start} is after its end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Aggregate averages are reported to one decimal; zero when there is nothing to average.
pub(crate) fn average_percentage(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((sum / count as f64) * 10.0).round() / 10.0
}
