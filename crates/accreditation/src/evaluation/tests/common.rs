use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::catalog::Criterion;
use crate::evaluation::{
    scoring_router, AccreditationService, CriterionResolution, HistoryPolicy, ScoringPolicy,
};
use crate::facility::FacilityKind;
use crate::geography::GeographySeed;
use crate::storage::{CriterionStore, FacilityStore, MemoryStore};
use crate::testing;

pub(super) const ESS_FACILITY: &str = "fac-ess-001";
pub(super) const EPVG_FACILITY: &str = "fac-epvg-001";
pub(super) const CAPITAL_AREA: &str = "zs-kin-gom-as1";

/// Three mandatory criteria of weight 10 and two optional of weight 5 for
/// health establishments (maximum 40), plus one distributor-only criterion.
pub(super) fn scenario_criteria() -> Vec<Criterion> {
    vec![
        testing::criterion("ess-m1", Some(FacilityKind::Ess), 10, true),
        testing::criterion("ess-m2", Some(FacilityKind::Ess), 10, true),
        testing::criterion("ess-m3", Some(FacilityKind::Ess), 10, true),
        testing::criterion("ess-o1", Some(FacilityKind::Ess), 5, false),
        testing::criterion("ess-o2", Some(FacilityKind::Ess), 5, false),
        testing::criterion("epvg-m1", Some(FacilityKind::Epvg), 8, true),
    ]
}

pub(super) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for criterion in scenario_criteria() {
        store.insert_criterion(criterion).expect("criterion");
    }
    GeographySeed::reference()
        .install(store.as_ref())
        .expect("geography");
    store
        .insert_facility(testing::facility_in_area(
            ESS_FACILITY,
            "ESS-001",
            FacilityKind::Ess,
            CAPITAL_AREA,
        ))
        .expect("ess facility");
    store
        .insert_facility(testing::facility(
            EPVG_FACILITY,
            "EPVG-001",
            FacilityKind::Epvg,
        ))
        .expect("epvg facility");
    store
}

pub(super) fn policy(
    criterion_resolution: CriterionResolution,
    history: HistoryPolicy,
) -> ScoringPolicy {
    ScoringPolicy {
        criterion_resolution,
        history,
    }
}

pub(super) fn build_service(
    scoring: ScoringPolicy,
) -> (AccreditationService<MemoryStore>, Arc<MemoryStore>) {
    let store = seeded_store();
    (AccreditationService::new(store.clone(), scoring), store)
}

pub(super) fn lenient_service() -> (AccreditationService<MemoryStore>, Arc<MemoryStore>) {
    build_service(ScoringPolicy::default())
}

pub(super) fn scoring_router_with_service(
    service: AccreditationService<MemoryStore>,
) -> axum::Router {
    scoring_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
