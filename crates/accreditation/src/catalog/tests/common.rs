use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::catalog::{CatalogService, Criterion, NewCriterion};
use crate::facility::FacilityKind;
use crate::storage::{CriterionStore, MemoryStore};
use crate::testing;

pub(super) fn new_criterion(
    code: &str,
    category: &str,
    weight: u32,
    mandatory: bool,
) -> NewCriterion {
    NewCriterion {
        code: code.to_string(),
        label: format!("Requirement {code}"),
        description: None,
        category: category.to_string(),
        facility_kind: Some(FacilityKind::Ess),
        weight,
        mandatory,
    }
}

fn categorised(
    id: &str,
    category: &str,
    kind: Option<FacilityKind>,
    weight: u32,
    mandatory: bool,
) -> Criterion {
    Criterion {
        category: category.to_string(),
        ..testing::criterion(id, kind, weight, mandatory)
    }
}

/// A small mixed catalog: two categories for health establishments, one
/// distributor criterion, one unrestricted criterion and one inactive entry.
pub(super) fn seeded_service() -> (CatalogService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let rows = [
        categorised("hyg-02", "Hygiene", Some(FacilityKind::Ess), 5, false),
        categorised("hyg-01", "Hygiene", Some(FacilityKind::Ess), 10, true),
        categorised("hyg-03", "Hygiene", Some(FacilityKind::Ess), 10, false),
        categorised("adm-01", "Administration", Some(FacilityKind::Ess), 5, true),
        categorised("adm-02", "Administration", None, 3, false),
        categorised("dist-01", "Storage", Some(FacilityKind::Epvg), 10, true),
        Criterion {
            active: false,
            ..categorised("hyg-99", "Hygiene", Some(FacilityKind::Ess), 10, true)
        },
    ];
    for criterion in rows {
        store.insert_criterion(criterion).expect("criterion");
    }
    (CatalogService::new(store.clone()), store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
