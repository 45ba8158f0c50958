use std::sync::Arc;

use super::common::*;
use crate::catalog::{
    CatalogError, CatalogImportError, CatalogService, CriteriaFilter, Criterion, CriterionId,
    CriterionQuery,
};
use crate::facility::FacilityKind;
use crate::storage::{CriterionStore, MemoryStore};

fn codes(criteria: &[Criterion]) -> Vec<&str> {
    criteria.iter().map(|c| c.code.as_str()).collect()
}

#[test]
fn listing_orders_by_category_then_mandatory_then_weight() {
    let (service, _) = seeded_service();

    let listing = service
        .list_criteria(FacilityKind::Ess, &CriteriaFilter::default())
        .expect("listing");

    assert_eq!(
        codes(&listing.criteria),
        ["adm-01", "adm-02", "hyg-01", "hyg-03", "hyg-02"]
    );
    assert_eq!(listing.total, 5);
    assert_eq!(listing.mandatory_count, 2);
    assert_eq!(
        listing.grouped.keys().collect::<Vec<_>>(),
        ["Administration", "Hygiene"]
    );
    assert_eq!(codes(&listing.grouped["Hygiene"]), ["hyg-01", "hyg-03", "hyg-02"]);
}

#[test]
fn listing_applies_kind_and_filters() {
    let (service, _) = seeded_service();

    let distributors = service
        .list_criteria(FacilityKind::Epvg, &CriteriaFilter::default())
        .expect("listing");
    assert_eq!(codes(&distributors.criteria), ["adm-02", "dist-01"]);

    let mandatory_hygiene = service
        .list_criteria(
            FacilityKind::Ess,
            &CriteriaFilter {
                category: Some("Hygiene".to_string()),
                mandatory: Some(true),
            },
        )
        .expect("listing");
    assert_eq!(codes(&mandatory_hygiene.criteria), ["hyg-01"]);

    let optional = service
        .list_criteria(
            FacilityKind::Ess,
            &CriteriaFilter {
                category: None,
                mandatory: Some(false),
            },
        )
        .expect("listing");
    assert_eq!(codes(&optional.criteria), ["adm-02", "hyg-03", "hyg-02"]);
}

#[test]
fn created_criteria_get_a_fresh_id_and_are_active() {
    let (service, _) = seeded_service();

    let mut input = new_criterion("  fire-01 ", "  ", 4, true);
    input.description = Some("   ".to_string());
    let created = service.create_criterion(input).expect("create");

    assert!(created.id.as_str().starts_with("crit-"));
    assert_eq!(created.code, "fire-01");
    assert_eq!(created.category, "General");
    assert_eq!(created.description, None);
    assert!(created.active);
    assert_eq!(service.criterion(&created.id).expect("criterion lookup"), created);
}

#[test]
fn invalid_input_is_rejected() {
    let (service, _) = seeded_service();

    let weightless = service.create_criterion(new_criterion("w-0", "Hygiene", 0, false));
    assert!(matches!(weightless, Err(CatalogError::Validation(_))));

    let nameless = service.create_criterion(new_criterion(" ", "Hygiene", 1, false));
    assert!(matches!(nameless, Err(CatalogError::Validation(_))));

    let mut unlabeled = new_criterion("lbl-0", "Hygiene", 1, false);
    unlabeled.label = String::new();
    assert!(matches!(
        service.create_criterion(unlabeled),
        Err(CatalogError::Validation(_))
    ));
}

#[test]
fn duplicate_codes_conflict() {
    let (service, _) = seeded_service();
    let error = service
        .create_criterion(new_criterion("hyg-01", "Hygiene", 2, false))
        .expect_err("creation fails");
    assert!(matches!(error, CatalogError::Conflict(code) if code.contains("hyg-01")));
}

#[test]
fn deactivation_hides_and_reactivation_restores() {
    let (service, store) = seeded_service();
    let id = CriterionId::new("hyg-01");

    let deactivated = service.deactivate_criterion(&id).expect("deactivate");
    assert!(!deactivated.active);
    let listing = service
        .list_criteria(FacilityKind::Ess, &CriteriaFilter::default())
        .expect("listing");
    assert!(!codes(&listing.criteria).contains(&"hyg-01"));
    assert!(store.criterion(&id).expect("criterion lookup").is_some());

    let restored = service.reactivate_criterion(&id).expect("reactivate");
    assert!(restored.active);
    let listing = service
        .list_criteria(FacilityKind::Ess, &CriteriaFilter::default())
        .expect("listing");
    assert!(codes(&listing.criteria).contains(&"hyg-01"));
}

#[test]
fn toggling_an_unknown_criterion_is_not_found() {
    let (service, _) = seeded_service();
    let error = service
        .deactivate_criterion(&CriterionId::new("nothing"))
        .expect_err("toggle fails");
    assert!(matches!(error, CatalogError::NotFound(_)));
}

#[test]
fn import_skips_codes_already_in_the_catalog() {
    let (service, _) = seeded_service();
    let csv = "\
code,label,description,category,applicability,weight,mandatory
hyg-01,Hand washing,,Hygiene,ESS,10,true
sto-01,Cold chain,Fridge log kept,Storage,EPVG,8,true
sto-01,Cold chain again,,Storage,EPVG,8,true
gen-01,Fire extinguisher,,Safety,ANY,2,false
";

    let summary = service.import_criteria(csv.as_bytes()).expect("import");
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.skipped, 2);

    let listing = service
        .list_criteria(FacilityKind::Epvg, &CriteriaFilter::default())
        .expect("listing");
    assert_eq!(
        codes(&listing.criteria),
        ["adm-02", "gen-01", "dist-01", "sto-01"]
    );
}

#[test]
fn import_rejects_unknown_applicability() {
    let (service, _) = seeded_service();
    let csv = "\
code,label,description,category,applicability,weight,mandatory
bad-01,Something,,Hygiene,HOSPITAL,3,false
";

    let error = service.import_criteria(csv.as_bytes()).expect_err("import fails");
    assert!(matches!(
        error,
        CatalogError::Import(CatalogImportError::InvalidApplicability { .. })
    ));
}

#[test]
fn import_with_a_bad_row_inserts_nothing() {
    let (service, store) = seeded_service();
    let before = store
        .criteria(&CriterionQuery::default())
        .expect("criteria before import");
    let csv = "\
code,label,description,category,applicability,weight,mandatory
new-01,First new row,,Hygiene,ESS,4,false
new-02,Second new row,,Storage,EPVG,6,true
new-03,Weightless row,,Hygiene,ESS,0,false
";

    let error = service
        .import_criteria(csv.as_bytes())
        .expect_err("zero weight is rejected");
    assert!(matches!(error, CatalogError::Validation(message) if message.contains("new-03")));

    let after = store
        .criteria(&CriterionQuery::default())
        .expect("criteria after import");
    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|c| !c.code.starts_with("new-")));
}

#[test]
fn reference_catalog_seeds_once() {
    let store = Arc::new(MemoryStore::new());
    let service = CatalogService::new(store.clone());

    let first = service.seed_reference_catalog().expect("seed");
    assert_eq!(first.inserted, 40);
    assert_eq!(first.skipped, 0);

    let second = service.seed_reference_catalog().expect("seed");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 40);

    let health = service
        .list_criteria(FacilityKind::Ess, &CriteriaFilter::default())
        .expect("listing");
    let distributors = service
        .list_criteria(FacilityKind::Epvg, &CriteriaFilter::default())
        .expect("listing");
    assert_eq!(health.total, 23);
    assert_eq!(distributors.total, 17);
    assert!(store
        .criteria(&Default::default())
        .expect("criteria")
        .iter()
        .all(|criterion| criterion.weight >= 1));
}
