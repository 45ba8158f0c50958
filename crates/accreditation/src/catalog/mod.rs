//! Criterion catalog: the weighted compliance requirements facilities are
//! scored against.

mod domain;
mod import;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{CriteriaFilter, Criterion, CriterionId, CriterionQuery, NewCriterion};
pub use import::CatalogImportError;
pub use router::catalog_router;
pub use service::{CatalogError, CatalogService, CriteriaListing, ImportSummary};

