use std::collections::HashMap;

use super::views::{StatusCountEntry, StatusCounts};
use super::window::{filter_range, DateRange};
use crate::facility::{AccreditationStatus, Facility, KindTotals, OperationalStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCountQuery {
    /// Filters on facility creation date.
    pub range: Option<DateRange>,
    /// Leave facilities still pending registration out of the totals and the
    /// accreditation counts. The operational table always lists them.
    pub exclude_pending: bool,
}

pub(crate) fn status_counts(facilities: &[Facility], query: &StatusCountQuery) -> StatusCounts {
    let mut totals = KindTotals::default();
    let mut operational: HashMap<OperationalStatus, KindTotals> = HashMap::new();
    let mut accreditation: HashMap<AccreditationStatus, KindTotals> = HashMap::new();

    for facility in facilities {
        if !filter_range(query.range.as_ref(), facility.created_at) {
            continue;
        }
        operational
            .entry(facility.operational_status)
            .or_default()
            .record(facility.kind);
        if query.exclude_pending && facility.operational_status == OperationalStatus::Pending {
            continue;
        }
        totals.record(facility.kind);
        accreditation
            .entry(facility.accreditation_status)
            .or_default()
            .record(facility.kind);
    }

    StatusCounts {
        totals,
        operational: OperationalStatus::ALL
            .into_iter()
            .map(|status| StatusCountEntry {
                status: status.label(),
                counts: operational.get(&status).copied().unwrap_or_default(),
            })
            .collect(),
        accreditation: AccreditationStatus::ALL
            .into_iter()
            .map(|status| StatusCountEntry {
                status: status.label(),
                counts: accreditation.get(&status).copied().unwrap_or_default(),
            })
            .collect(),
    }
}
