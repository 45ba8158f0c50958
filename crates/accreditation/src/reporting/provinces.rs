use std::collections::HashMap;

use super::views::{ProvinceRollup, ProvinceRollupEntry};
use super::window::{filter_range, DateRange};
use crate::facility::{AccreditationStatus, Facility, KindTotals};
use crate::geography::{Province, ProvinceId};

/// Facility and accredited counts per province. `province_of` resolves a
/// facility to its province through area and zone.
pub(crate) fn province_rollup<F>(
    provinces: &[Province],
    facilities: &[Facility],
    range: Option<&DateRange>,
    mut province_of: F,
) -> ProvinceRollup
where
    F: FnMut(&Facility) -> Option<ProvinceId>,
{
    let mut totals: HashMap<ProvinceId, (KindTotals, KindTotals)> = HashMap::new();
    let mut unplaced = KindTotals::default();

    for facility in facilities {
        if !filter_range(range, facility.created_at) {
            continue;
        }
        let Some(province_id) = province_of(facility) else {
            unplaced.record(facility.kind);
            continue;
        };
        let (all, accredited) = totals.entry(province_id).or_default();
        all.record(facility.kind);
        if facility.accreditation_status == AccreditationStatus::Accredited {
            accredited.record(facility.kind);
        }
    }

    let mut entries: Vec<ProvinceRollupEntry> = provinces
        .iter()
        .filter_map(|province| {
            let (facilities, accredited) = totals.get(&province.id).copied()?;
            (facilities.total > 0).then(|| ProvinceRollupEntry {
                province_id: province.id.clone(),
                code: province.code.clone(),
                name: province.name.clone(),
                facilities,
                accredited,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        b.facilities
            .total
            .cmp(&a.facilities.total)
            .then_with(|| a.code.cmp(&b.code))
    });

    let mut accredited_ranking: Vec<ProvinceRollupEntry> = entries
        .iter()
        .filter(|entry| entry.accredited.total > 0)
        .cloned()
        .collect();
    accredited_ranking.sort_by(|a, b| {
        b.accredited
            .total
            .cmp(&a.accredited.total)
            .then_with(|| a.code.cmp(&b.code))
    });

    ProvinceRollup {
        provinces: entries,
        accredited_ranking,
        unplaced,
    }
}
