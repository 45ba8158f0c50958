use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;

use super::evolution;
use super::provinces;
use super::status::{self, StatusCountQuery};
use super::tranches::{self, TrancheCounts};
use super::views::{
    AccreditationOverview, EvolutionBucket, ProvinceRollup, RegistrationBucket, StatusCounts,
};
use super::window::{DateRange, MonthWindow};
use super::{average_percentage, ReportingError};
use crate::evaluation::Evaluation;
use crate::facility::{Facility, FacilityId};
use crate::geography::{AreaId, ProvinceId};
use crate::storage::AccreditationStore;

/// Read-only aggregation over what the scoring workflow has already written.
pub struct ReportingService<S> {
    store: Arc<S>,
}

impl<S> ReportingService<S>
where
    S: AccreditationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn status_counts(&self, query: &StatusCountQuery) -> Result<StatusCounts, ReportingError> {
        let facilities = self.store.facilities()?;
        Ok(status::status_counts(&facilities, query))
    }

    pub fn score_tranches(&self) -> Result<TrancheCounts, ReportingError> {
        let facilities = self.store.facilities()?;
        let evaluations = self.known_evaluations(&facilities)?;
        Ok(tranches::score_tranches(&facilities, &evaluations))
    }

    pub fn accreditation_overview(&self) -> Result<AccreditationOverview, ReportingError> {
        let facilities = self.store.facilities()?;
        let evaluations = self.known_evaluations(&facilities)?;

        let evaluated = tranches::latest_by_facility(&evaluations).len();
        let percentage_sum: f64 = evaluations.iter().map(|e| e.percentage).sum();

        Ok(AccreditationOverview {
            evaluated_facilities: evaluated,
            unevaluated_facilities: facilities.len().saturating_sub(evaluated),
            average_percentage: average_percentage(percentage_sum, evaluations.len()),
            total_evaluations: evaluations.len(),
            tranches: tranches::score_tranches(&facilities, &evaluations),
        })
    }

    /// Monthly evaluation series over `range`, or the trailing twelve months
    /// ending with `today`'s month.
    pub fn evolution(
        &self,
        range: Option<DateRange>,
        split_by_type: bool,
        today: NaiveDate,
    ) -> Result<Vec<EvolutionBucket>, ReportingError> {
        let window = MonthWindow::for_range(range.as_ref(), today)?;
        let facilities = self.store.facilities()?;
        let evaluations = self.store.evaluations()?;
        Ok(evolution::evolution(
            &facilities,
            &evaluations,
            &window,
            range.as_ref(),
            split_by_type,
        ))
    }

    pub fn registrations(
        &self,
        range: Option<DateRange>,
        today: NaiveDate,
    ) -> Result<Vec<RegistrationBucket>, ReportingError> {
        let window = MonthWindow::for_range(range.as_ref(), today)?;
        let facilities = self.store.facilities()?;
        Ok(evolution::registrations(&facilities, &window, range.as_ref()))
    }

    pub fn province_rollup(
        &self,
        range: Option<DateRange>,
    ) -> Result<ProvinceRollup, ReportingError> {
        let known_provinces = self.store.provinces()?;
        let facilities = self.store.facilities()?;

        let mut area_provinces: HashMap<AreaId, Option<ProvinceId>> = HashMap::new();
        for area_id in facilities.iter().filter_map(|f| f.area_id.as_ref()) {
            if area_provinces.contains_key(area_id) {
                continue;
            }
            let province = self
                .store
                .placement(area_id)?
                .map(|placement| placement.province.id);
            area_provinces.insert(area_id.clone(), province);
        }

        Ok(provinces::province_rollup(
            &known_provinces,
            &facilities,
            range.as_ref(),
            |facility| {
                facility
                    .area_id
                    .as_ref()
                    .and_then(|area_id| area_provinces.get(area_id).cloned().flatten())
            },
        ))
    }

    /// Evaluations whose facility is still registered.
    fn known_evaluations(&self, facilities: &[Facility]) -> Result<Vec<Evaluation>, ReportingError> {
        let known: HashSet<&FacilityId> = facilities.iter().map(|facility| &facility.id).collect();
        let mut evaluations = self.store.evaluations()?;
        evaluations.retain(|evaluation| known.contains(&evaluation.facility_id));
        Ok(evaluations)
    }
}
