use std::collections::BTreeSet;
use std::sync::Arc;

use accreditation::catalog::{CatalogService, CriteriaFilter, CriterionId};
use accreditation::evaluation::{AccreditationService, ScoreSubmission, ScoringPolicy};
use accreditation::facility::{
    AccreditationStatus, Facility, FacilityId, FacilityKind, OperationalStatus,
};
use accreditation::geography::{AreaId, GeographySeed};
use accreditation::reporting::{ReportingService, StatusCountQuery};
use accreditation::storage::{AccreditationStore, FacilityStore, MemoryStore, SqliteStore};
use chrono::{NaiveDate, TimeZone, Utc};

fn registered(id: &str, code: &str, kind: FacilityKind, area: Option<&str>) -> Facility {
    Facility {
        id: FacilityId::new(id),
        code: code.to_string(),
        name: format!("{code} registered facility"),
        kind,
        operational_status: OperationalStatus::Active,
        accreditation_status: AccreditationStatus::NotAccredited,
        area_id: area.map(|area| AreaId(area.to_string())),
        address: None,
        contact: None,
        capacity: None,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 8, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

fn seed<S: AccreditationStore + 'static>(store: &Arc<S>) {
    GeographySeed::reference()
        .install(store.as_ref())
        .expect("geography installs");
    let summary = CatalogService::new(store.clone())
        .seed_reference_catalog()
        .expect("catalog seeds");
    assert!(summary.inserted > 0);
    store
        .insert_facility(registered(
            "fac-hgr-gombe",
            "ESS-KIN-001",
            FacilityKind::Ess,
            Some("zs-kin-gom-as1"),
        ))
        .expect("health facility registers");
    store
        .insert_facility(registered(
            "fac-depot-matadi",
            "EPVG-KOC-001",
            FacilityKind::Epvg,
            None,
        ))
        .expect("distributor registers");
}

/// Seeds a store, scores both facilities and checks every downstream view.
fn exercise_workflow<S: AccreditationStore + 'static>(store: Arc<S>) {
    seed(&store);

    let catalog = CatalogService::new(store.clone());
    let listing = catalog
        .list_criteria(FacilityKind::Ess, &CriteriaFilter::default())
        .expect("criteria list");
    assert!(listing.mandatory_count > 0);
    assert!(listing
        .criteria
        .iter()
        .all(|criterion| criterion.applies_to(FacilityKind::Ess)));

    let every_criterion: BTreeSet<CriterionId> = listing
        .criteria
        .iter()
        .map(|criterion| criterion.id.clone())
        .collect();

    let scoring = AccreditationService::new(store.clone(), ScoringPolicy::default());
    let hospital = FacilityId::new("fac-hgr-gombe");
    let result = scoring
        .score_facility(
            &hospital,
            &ScoreSubmission {
                checked_criterion_ids: every_criterion.clone(),
                observations: Some("Full inspection".to_string()),
            },
        )
        .expect("hospital scored");
    assert_eq!(result.percentage, 100.0);
    assert_eq!(result.accreditation_status, AccreditationStatus::Accredited);
    assert_eq!(result.evaluation.reference, "EVAL-ESS-KIN-001-001");

    let depot = FacilityId::new("fac-depot-matadi");
    let refused = scoring
        .score_facility(&depot, &ScoreSubmission::default())
        .expect("depot scored");
    assert_eq!(refused.percentage, 0.0);
    assert!(!refused.conforming);

    let score = scoring.facility_score(&hospital).expect("score lookup");
    assert_eq!(score.checked_criterion_ids, every_criterion);

    let issued_on = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
    let certificate = scoring
        .certificate(&hospital, issued_on)
        .expect("certificate issued");
    assert_eq!(certificate.accreditation_number, "ARC-CSU/ESS/2024/ESS-KIN-001");
    assert_eq!(certificate.province.as_deref(), Some("Kinshasa"));
    assert!(scoring.certificate(&depot, issued_on).is_err());

    let reporting = ReportingService::new(store.clone());
    let counts = reporting
        .status_counts(&StatusCountQuery::default())
        .expect("status counts");
    assert_eq!(counts.totals.total, 2);
    assert_eq!(counts.accreditation_count("accredited").ess, 1);
    assert_eq!(counts.accreditation_count("not_accredited").epvg, 1);

    let tranches = reporting.score_tranches().expect("tranches");
    assert_eq!(tranches.excellent, 1);
    assert_eq!(tranches.unevaluated, 1);

    let rollup = reporting.province_rollup(None).expect("province rollup");
    assert_eq!(rollup.provinces.len(), 1);
    assert_eq!(rollup.provinces[0].code, "KIN");
    assert_eq!(rollup.accredited_ranking.len(), 1);
    assert_eq!(rollup.unplaced.epvg, 1);

    let today = Utc::now().date_naive();
    let evolution = reporting
        .evolution(None, true, today)
        .expect("evolution");
    assert_eq!(evolution.len(), 12);
    let recorded: usize = evolution
        .iter()
        .map(|bucket| bucket.counts.evaluations)
        .sum();
    assert_eq!(recorded, 2);
}

#[test]
fn workflow_runs_against_the_memory_store() {
    exercise_workflow(Arc::new(MemoryStore::new()));
}

#[test]
fn workflow_runs_against_sqlite() {
    exercise_workflow(Arc::new(
        SqliteStore::open_in_memory().expect("sqlite opens"),
    ));
}

#[test]
fn sqlite_keeps_evaluations_across_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("accreditation.db");

    {
        let store = Arc::new(SqliteStore::open(&path).expect("sqlite opens"));
        seed(&store);
        let scoring = AccreditationService::new(store.clone(), ScoringPolicy::default());
        scoring
            .score_facility(
                &FacilityId::new("fac-hgr-gombe"),
                &ScoreSubmission::checked(["not-a-criterion"]),
            )
            .expect("scored");
    }

    let reopened = Arc::new(SqliteStore::open(&path).expect("sqlite reopens"));
    let facility = reopened
        .facility(&FacilityId::new("fac-hgr-gombe"))
        .expect("lookup")
        .expect("facility persisted");
    assert_eq!(
        facility.accreditation_status,
        AccreditationStatus::NotAccredited
    );

    let scoring = AccreditationService::new(reopened.clone(), ScoringPolicy::default());
    let score = scoring
        .facility_score(&facility.id)
        .expect("score lookup");
    assert_eq!(
        score.evaluation.map(|summary| summary.reference),
        Some("EVAL-ESS-KIN-001-001".to_string())
    );
    assert!(score.score_maximum > 0);

    let summary = CatalogService::new(reopened)
        .seed_reference_catalog()
        .expect("reseed");
    assert_eq!(summary.inserted, 0);
}
