use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::domain::{CriteriaFilter, Criterion, CriterionId, CriterionQuery, NewCriterion};
use super::import::{self, CatalogImportError, REFERENCE_CATALOG};
use crate::facility::FacilityKind;
use crate::storage::{CriterionStore, RepositoryError};

/// Administration and lookup over the criterion catalog.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> CatalogService<S>
where
    S: CriterionStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Active criteria applicable to `kind`, grouped by category.
    pub fn list_criteria(
        &self,
        kind: FacilityKind,
        filter: &CriteriaFilter,
    ) -> Result<CriteriaListing, CatalogError> {
        let query = CriterionQuery {
            category: filter.category.clone(),
            mandatory: filter.mandatory,
            ..CriterionQuery::scorable_for(kind)
        };
        let criteria = self.store.criteria(&query)?;
        Ok(CriteriaListing::new(kind, criteria))
    }

    pub fn criterion(&self, id: &CriterionId) -> Result<Criterion, CatalogError> {
        self.store
            .criterion(id)?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    pub fn create_criterion(&self, input: NewCriterion) -> Result<Criterion, CatalogError> {
        let criterion = validate(input)?;
        let stored = self.store.insert_criterion(criterion)?;
        info!(
            criterion_id = %stored.id,
            code = %stored.code,
            weight = stored.weight,
            mandatory = stored.mandatory,
            "criterion created"
        );
        Ok(stored)
    }

    /// Remove a criterion from future scoring. Existing evaluation details keep
    /// resolving it.
    pub fn deactivate_criterion(&self, id: &CriterionId) -> Result<Criterion, CatalogError> {
        let criterion = self.toggle(id, false)?;
        info!(criterion_id = %criterion.id, code = %criterion.code, "criterion deactivated");
        Ok(criterion)
    }

    pub fn reactivate_criterion(&self, id: &CriterionId) -> Result<Criterion, CatalogError> {
        let criterion = self.toggle(id, true)?;
        info!(criterion_id = %criterion.id, code = %criterion.code, "criterion reactivated");
        Ok(criterion)
    }

    /// Load criteria from CSV, skipping codes the catalog already holds. Every
    /// row is validated before the first insert, so a bad row imports nothing.
    pub fn import_criteria<R: Read>(&self, reader: R) -> Result<ImportSummary, CatalogError> {
        let rows = import::parse_criteria(reader)?;
        let mut known: BTreeSet<String> = self
            .store
            .criteria(&CriterionQuery::default())?
            .into_iter()
            .map(|criterion| criterion.code)
            .collect();

        let mut summary = ImportSummary::default();
        let mut pending = Vec::with_capacity(rows.len());
        for row in rows {
            if known.contains(row.code.trim()) {
                summary.skipped += 1;
                continue;
            }
            let criterion = validate(row)?;
            known.insert(criterion.code.clone());
            pending.push(criterion);
        }

        for criterion in pending {
            self.store.insert_criterion(criterion)?;
            summary.inserted += 1;
        }

        info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "criterion import finished"
        );
        Ok(summary)
    }

    pub fn seed_reference_catalog(&self) -> Result<ImportSummary, CatalogError> {
        self.import_criteria(REFERENCE_CATALOG.as_bytes())
    }

    fn toggle(&self, id: &CriterionId, active: bool) -> Result<Criterion, CatalogError> {
        match self.store.set_criterion_active(id, active) {
            Ok(criterion) => Ok(criterion),
            Err(RepositoryError::NotFound) => Err(CatalogError::NotFound(id.clone())),
            Err(other) => Err(other.into()),
        }
    }
}

fn validate(input: NewCriterion) -> Result<Criterion, CatalogError> {
    let code = input.code.trim().to_string();
    if code.is_empty() {
        return Err(CatalogError::Validation("criterion code is required".into()));
    }
    let label = input.label.trim().to_string();
    if label.is_empty() {
        return Err(CatalogError::Validation(format!(
            "criterion {code} needs a label"
        )));
    }
    if input.weight == 0 {
        return Err(CatalogError::Validation(format!(
            "criterion {code} must weigh at least 1"
        )));
    }
    let category = match input.category.trim() {
        "" => "General".to_string(),
        category => category.to_string(),
    };

    Ok(Criterion {
        id: CriterionId(format!("crit-{}", Uuid::new_v4())),
        code,
        label,
        description: input
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()),
        category,
        facility_kind: input.facility_kind,
        weight: input.weight,
        mandatory: input.mandatory,
        active: true,
    })
}

/// Criteria for one facility kind, ordered for display and grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriteriaListing {
    pub facility_kind: FacilityKind,
    pub criteria: Vec<Criterion>,
    pub grouped: BTreeMap<String, Vec<Criterion>>,
    pub total: usize,
    pub mandatory_count: usize,
}

impl CriteriaListing {
    fn new(facility_kind: FacilityKind, mut criteria: Vec<Criterion>) -> Self {
        criteria.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| b.mandatory.cmp(&a.mandatory))
                .then_with(|| b.weight.cmp(&a.weight))
                .then_with(|| a.code.cmp(&b.code))
        });

        let mut grouped: BTreeMap<String, Vec<Criterion>> = BTreeMap::new();
        for criterion in &criteria {
            grouped
                .entry(criterion.category.clone())
                .or_default()
                .push(criterion.clone());
        }

        Self {
            facility_kind,
            total: criteria.len(),
            mandatory_count: criteria.iter().filter(|c| c.mandatory).count(),
            criteria,
            grouped,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("criterion {0} not found")]
    NotFound(CriterionId),
    #[error("criterion code already exists: {0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Import(#[from] CatalogImportError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(code) => CatalogError::Conflict(code),
            other => CatalogError::Repository(other),
        }
    }
}
