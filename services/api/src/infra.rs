use accreditation::catalog::{CatalogService, ImportSummary};
use accreditation::error::AppError;
use accreditation::geography::GeographySeed;
use accreditation::storage::AccreditationStore;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Install the reference geography and criterion catalog. Existing rows are kept.
pub(crate) fn seed_reference_data<S>(store: &Arc<S>) -> Result<ImportSummary, AppError>
where
    S: AccreditationStore + 'static,
{
    GeographySeed::reference().install(store.as_ref())?;
    let summary = CatalogService::new(store.clone()).seed_reference_catalog()?;
    Ok(summary)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
