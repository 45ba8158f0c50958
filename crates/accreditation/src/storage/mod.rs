//! Persistence seam for the accreditation core.
//!
//! Services are generic over [`AccreditationStore`] so they can run against the
//! in-memory backend in tests and demos and against SQLite in deployments.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::catalog::{Criterion, CriterionId, CriterionQuery};
use crate::evaluation::{Evaluation, EvaluationWrite};
use crate::facility::{Facility, FacilityId};
use crate::geography::{Area, AreaId, Placement, Province, Zone};

pub trait CriterionStore: Send + Sync {
    fn criteria(&self, query: &CriterionQuery) -> Result<Vec<Criterion>, RepositoryError>;
    fn criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the code is already taken.
    fn insert_criterion(&self, criterion: Criterion) -> Result<Criterion, RepositoryError>;
    fn set_criterion_active(
        &self,
        id: &CriterionId,
        active: bool,
    ) -> Result<Criterion, RepositoryError>;
}

pub trait FacilityStore: Send + Sync {
    fn facility(&self, id: &FacilityId) -> Result<Option<Facility>, RepositoryError>;
    fn facilities(&self) -> Result<Vec<Facility>, RepositoryError>;
    fn insert_facility(&self, facility: Facility) -> Result<Facility, RepositoryError>;
}

pub trait EvaluationStore: Send + Sync {
    /// Most recent evaluation by timestamp.
    fn latest_evaluation(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Evaluation>, RepositoryError>;
    /// Every evaluation of one facility, newest first.
    fn facility_evaluations(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Vec<Evaluation>, RepositoryError>;
    fn evaluations(&self) -> Result<Vec<Evaluation>, RepositoryError>;
    /// Persist the evaluation, its detail rows and the facility's cached
    /// accreditation status as one unit.
    fn record_evaluation(&self, write: EvaluationWrite) -> Result<Evaluation, RepositoryError>;
}

pub trait GeographyStore: Send + Sync {
    fn provinces(&self) -> Result<Vec<Province>, RepositoryError>;
    fn placement(&self, area_id: &AreaId) -> Result<Option<Placement>, RepositoryError>;
    fn insert_province(&self, province: Province) -> Result<(), RepositoryError>;
    fn insert_zone(&self, zone: Zone) -> Result<(), RepositoryError>;
    fn insert_area(&self, area: Area) -> Result<(), RepositoryError>;
}

/// Everything the accreditation services need from a backend.
pub trait AccreditationStore: CriterionStore + FacilityStore + EvaluationStore + GeographyStore {}

impl<T> AccreditationStore for T where
    T: CriterionStore + FacilityStore + EvaluationStore + GeographyStore
{
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
