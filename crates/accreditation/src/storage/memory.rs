use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use super::{CriterionStore, EvaluationStore, FacilityStore, GeographyStore, RepositoryError};
use crate::catalog::{Criterion, CriterionId, CriterionQuery};
use crate::evaluation::{Evaluation, EvaluationId, EvaluationWrite, HistoryPolicy};
use crate::facility::{Facility, FacilityId};
use crate::geography::{Area, AreaId, Placement, Province, ProvinceId, Zone, ZoneId};

#[derive(Default)]
struct Tables {
    criteria: BTreeMap<CriterionId, Criterion>,
    facilities: BTreeMap<FacilityId, Facility>,
    evaluations: Vec<Evaluation>,
    provinces: BTreeMap<ProvinceId, Province>,
    zones: BTreeMap<ZoneId, Zone>,
    areas: BTreeMap<AreaId, Area>,
}

/// Process-local store. Every call takes the single table lock, so each
/// operation observes and writes a consistent snapshot.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".into()))
    }
}

/// Newest first; among equal timestamps the later write wins.
fn newest_first(evaluations: &mut [Evaluation]) {
    evaluations.reverse();
    evaluations.sort_by(|a, b| b.evaluated_at.cmp(&a.evaluated_at));
}

impl CriterionStore for MemoryStore {
    fn criteria(&self, query: &CriterionQuery) -> Result<Vec<Criterion>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .criteria
            .values()
            .filter(|criterion| query.matches(criterion))
            .cloned()
            .collect())
    }

    fn criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, RepositoryError> {
        Ok(self.tables()?.criteria.get(id).cloned())
    }

    fn insert_criterion(&self, criterion: Criterion) -> Result<Criterion, RepositoryError> {
        let mut tables = self.tables()?;
        if tables
            .criteria
            .values()
            .any(|existing| existing.code == criterion.code)
        {
            return Err(RepositoryError::Conflict(criterion.code));
        }
        if tables.criteria.contains_key(&criterion.id) {
            return Err(RepositoryError::Conflict(criterion.id.0));
        }
        tables
            .criteria
            .insert(criterion.id.clone(), criterion.clone());
        Ok(criterion)
    }

    fn set_criterion_active(
        &self,
        id: &CriterionId,
        active: bool,
    ) -> Result<Criterion, RepositoryError> {
        let mut tables = self.tables()?;
        let criterion = tables
            .criteria
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        criterion.active = active;
        Ok(criterion.clone())
    }
}

impl FacilityStore for MemoryStore {
    fn facility(&self, id: &FacilityId) -> Result<Option<Facility>, RepositoryError> {
        Ok(self.tables()?.facilities.get(id).cloned())
    }

    fn facilities(&self) -> Result<Vec<Facility>, RepositoryError> {
        Ok(self.tables()?.facilities.values().cloned().collect())
    }

    fn insert_facility(&self, facility: Facility) -> Result<Facility, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.facilities.contains_key(&facility.id) {
            return Err(RepositoryError::Conflict(facility.id.0));
        }
        tables
            .facilities
            .insert(facility.id.clone(), facility.clone());
        Ok(facility)
    }
}

impl EvaluationStore for MemoryStore {
    fn latest_evaluation(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        Ok(self.facility_evaluations(facility_id)?.into_iter().next())
    }

    fn facility_evaluations(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        let tables = self.tables()?;
        let mut evaluations: Vec<Evaluation> = tables
            .evaluations
            .iter()
            .filter(|evaluation| &evaluation.facility_id == facility_id)
            .cloned()
            .collect();
        newest_first(&mut evaluations);
        Ok(evaluations)
    }

    fn evaluations(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self.tables()?.evaluations.clone())
    }

    fn record_evaluation(&self, write: EvaluationWrite) -> Result<Evaluation, RepositoryError> {
        let mut tables = self.tables()?;
        if !tables.facilities.contains_key(&write.facility_id) {
            return Err(RepositoryError::NotFound);
        }
        if write
            .details
            .iter()
            .any(|detail| !tables.criteria.contains_key(&detail.criterion_id))
        {
            return Err(RepositoryError::NotFound);
        }

        let status = write.accreditation_status;
        let facility_id = write.facility_id.clone();

        let existing = match write.history {
            HistoryPolicy::Overwrite => tables
                .evaluations
                .iter()
                .enumerate()
                .filter(|(_, evaluation)| evaluation.facility_id == facility_id)
                .max_by_key(|(_, evaluation)| evaluation.evaluated_at)
                .map(|(index, _)| index),
            HistoryPolicy::Append => None,
        };

        let evaluation = match existing {
            Some(index) => {
                let previous = &tables.evaluations[index];
                let evaluation =
                    write.into_evaluation(previous.id.clone(), previous.reference.clone());
                tables.evaluations[index] = evaluation.clone();
                evaluation
            }
            None => {
                let prior = tables
                    .evaluations
                    .iter()
                    .filter(|evaluation| evaluation.facility_id == facility_id)
                    .count();
                let reference = write.reference(prior + 1);
                let evaluation = write.into_evaluation(
                    EvaluationId(format!("eval-{}", Uuid::new_v4())),
                    reference,
                );
                tables.evaluations.push(evaluation.clone());
                evaluation
            }
        };

        if let Some(facility) = tables.facilities.get_mut(&facility_id) {
            facility.accreditation_status = status;
        }

        Ok(evaluation)
    }
}

impl GeographyStore for MemoryStore {
    fn provinces(&self) -> Result<Vec<Province>, RepositoryError> {
        Ok(self.tables()?.provinces.values().cloned().collect())
    }

    fn placement(&self, area_id: &AreaId) -> Result<Option<Placement>, RepositoryError> {
        let tables = self.tables()?;
        let placement = tables.areas.get(area_id).and_then(|area| {
            let zone = tables.zones.get(&area.zone_id)?;
            let province = tables.provinces.get(&zone.province_id)?;
            Some(Placement {
                province: province.clone(),
                zone: zone.clone(),
                area: area.clone(),
            })
        });
        Ok(placement)
    }

    fn insert_province(&self, province: Province) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.provinces.contains_key(&province.id) {
            return Err(RepositoryError::Conflict(province.id.0));
        }
        tables.provinces.insert(province.id.clone(), province);
        Ok(())
    }

    fn insert_zone(&self, zone: Zone) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.zones.contains_key(&zone.id) {
            return Err(RepositoryError::Conflict(zone.id.0));
        }
        if !tables.provinces.contains_key(&zone.province_id) {
            return Err(RepositoryError::NotFound);
        }
        tables.zones.insert(zone.id.clone(), zone);
        Ok(())
    }

    fn insert_area(&self, area: Area) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.areas.contains_key(&area.id) {
            return Err(RepositoryError::Conflict(area.id.0));
        }
        if !tables.zones.contains_key(&area.zone_id) {
            return Err(RepositoryError::NotFound);
        }
        tables.areas.insert(area.id.clone(), area);
        Ok(())
    }
}
