use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::evaluation::HistoryPolicy;
use crate::facility::{FacilityKind, OperationalStatus};
use crate::geography::{Area, AreaId, GeographySeed, ProvinceId, Zone, ZoneId};
use crate::reporting::ReportingService;
use crate::storage::{CriterionStore, EvaluationStore, FacilityStore, GeographyStore, MemoryStore};
use crate::testing;

/// Fixed "today" for window computations.
pub(super) fn today() -> chrono::NaiveDate {
    testing::date(2024, 3, 31)
}

fn extra_zone(store: &MemoryStore, province: &str, code: &str, name: &str) {
    let zone_id = ZoneId(code.to_ascii_lowercase());
    store
        .insert_zone(Zone {
            id: zone_id.clone(),
            code: code.to_string(),
            name: name.to_string(),
            province_id: ProvinceId(province.to_string()),
        })
        .expect("zone");
    store
        .insert_area(Area {
            id: AreaId(format!("{}-as1", code.to_ascii_lowercase())),
            code: format!("{code}-AS1"),
            name: format!("{name} Centre"),
            zone_id,
        })
        .expect("area");
}

fn record(
    store: &MemoryStore,
    facility_id: &str,
    code: &str,
    percentage: f64,
    conforming: bool,
    at: DateTime<Utc>,
) {
    let mut write = testing::evaluation_write(facility_id, code, percentage, conforming);
    write.evaluated_at = at;
    write.history = HistoryPolicy::Append;
    store.record_evaluation(write).expect("evaluation");
}

/// Eight facilities:
///
/// | id | kind | province | latest % | status |
/// |----|------|----------|----------|--------|
/// | f1 | ESS  | KIN | 90 (after 40) | accredited |
/// | f2 | ESS  | KIN | 60  | in progress |
/// | f3 | EPVG | KIN | -   | pending, created March 2024 |
/// | f4 | EPVG | HKA | 85  | accredited |
/// | f5 | ESS  | HKA | 20  | in progress |
/// | f6 | ESS  | NOK | 100 | accredited |
/// | f7 | ESS  | NOK | 95  | accredited |
/// | f8 | ESS  | none | 0  | not accredited, created June 2023 |
pub(super) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    GeographySeed::reference()
        .install(store.as_ref())
        .expect("geography");
    extra_zone(&store, "prov-hka", "ZS-HKA-LUB", "Lubumbashi");
    extra_zone(&store, "prov-nok", "ZS-NOK-GOM", "Goma");
    store
        .insert_criterion(testing::criterion("crit-a", None, 10, false))
        .expect("criterion");

    let placed = [
        ("f1", "ESS-001", FacilityKind::Ess, "zs-kin-gom-as1"),
        ("f2", "ESS-002", FacilityKind::Ess, "zs-kin-lim-as2"),
        ("f4", "EPVG-004", FacilityKind::Epvg, "zs-hka-lub-as1"),
        ("f5", "ESS-005", FacilityKind::Ess, "zs-hka-lub-as1"),
        ("f6", "ESS-006", FacilityKind::Ess, "zs-nok-gom-as1"),
        ("f7", "ESS-007", FacilityKind::Ess, "zs-nok-gom-as1"),
    ];
    for (id, code, kind, area) in placed {
        store
            .insert_facility(testing::facility_in_area(id, code, kind, area))
            .expect("facility");
    }

    let mut pending =
        testing::facility_in_area("f3", "EPVG-003", FacilityKind::Epvg, "zs-kin-gom-as1");
    pending.operational_status = OperationalStatus::Pending;
    pending.created_at = testing::timestamp(2024, 3, 2);
    store.insert_facility(pending).expect("facility");

    let mut unplaced = testing::facility("f8", "ESS-008", FacilityKind::Ess);
    unplaced.created_at = testing::timestamp(2023, 6, 1);
    store.insert_facility(unplaced).expect("facility");

    record(&store, "f1", "ESS-001", 40.0, false, testing::timestamp(2023, 12, 1));
    record(&store, "f1", "ESS-001", 90.0, true, testing::timestamp(2024, 1, 15));
    record(&store, "f2", "ESS-002", 60.0, false, testing::timestamp(2024, 2, 10));
    record(&store, "f4", "EPVG-004", 85.0, true, testing::timestamp(2024, 2, 20));
    record(&store, "f5", "ESS-005", 20.0, false, testing::timestamp(2024, 3, 5));
    record(&store, "f6", "ESS-006", 100.0, true, testing::timestamp(2024, 3, 15));
    record(&store, "f7", "ESS-007", 95.0, true, testing::timestamp(2024, 3, 15));
    record(&store, "f8", "ESS-008", 0.0, false, testing::timestamp(2024, 3, 20));

    store
}

pub(super) fn service() -> ReportingService<MemoryStore> {
    ReportingService::new(seeded_store())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

