use std::collections::BTreeSet;

use super::common::*;
use crate::catalog::CriterionId;
use crate::evaluation::{EvaluationEngine, PASS_THRESHOLD};
use crate::facility::{AccreditationStatus, FacilityKind};
use crate::testing;

fn checked(ids: &[&str]) -> BTreeSet<CriterionId> {
    ids.iter().map(|id| CriterionId::new(*id)).collect()
}

#[test]
fn all_mandatory_plus_one_optional_is_accredited() {
    let sheet = EvaluationEngine::new().score(
        FacilityKind::Ess,
        &scenario_criteria(),
        &checked(&["ess-m1", "ess-m2", "ess-m3", "ess-o1"]),
    );

    assert_eq!(sheet.score_total, 35);
    assert_eq!(sheet.score_maximum, 40);
    assert_eq!(sheet.percentage, 87.5);
    assert!(sheet.mandatory_satisfied);
    assert!(sheet.conforming);
    assert_eq!(sheet.accreditation_status, AccreditationStatus::Accredited);
}

#[test]
fn missing_mandatory_blocks_conformity_regardless_of_percentage() {
    let sheet = EvaluationEngine::new().score(
        FacilityKind::Ess,
        &scenario_criteria(),
        &checked(&["ess-m1", "ess-m2", "ess-o1", "ess-o2"]),
    );

    assert_eq!(sheet.score_total, 30);
    assert!(!sheet.mandatory_satisfied);
    assert!(!sheet.conforming);
    assert_eq!(sheet.accreditation_status, AccreditationStatus::InProgress);
}

#[test]
fn nothing_checked_scores_zero_and_is_not_accredited() {
    let sheet =
        EvaluationEngine::new().score(FacilityKind::Ess, &scenario_criteria(), &BTreeSet::new());

    assert_eq!(sheet.score_total, 0);
    assert_eq!(sheet.percentage, 0.0);
    assert_eq!(sheet.accreditation_status, AccreditationStatus::NotAccredited);
    assert_eq!(sheet.details.len(), 5);
    assert!(sheet.details.iter().all(|detail| !detail.satisfied));
}

#[test]
fn empty_catalog_yields_zero_without_failing() {
    let sheet = EvaluationEngine::new().score(FacilityKind::Ess, &[], &checked(&["ess-m1"]));

    assert_eq!(sheet.score_maximum, 0);
    assert_eq!(sheet.percentage, 0.0);
    assert!(sheet.mandatory_satisfied);
    assert!(!sheet.conforming);
    assert_eq!(sheet.unresolved, vec![CriterionId::new("ess-m1")]);
}

#[test]
fn criteria_for_the_other_kind_are_excluded_from_both_sides() {
    let sheet = EvaluationEngine::new().score(
        FacilityKind::Epvg,
        &scenario_criteria(),
        &checked(&["epvg-m1", "ess-m1"]),
    );

    assert_eq!(sheet.score_total, 8);
    assert_eq!(sheet.score_maximum, 8);
    assert_eq!(sheet.percentage, 100.0);
    assert!(sheet.conforming);
    assert_eq!(sheet.unresolved, vec![CriterionId::new("ess-m1")]);
    assert_eq!(sheet.details.len(), 1);
}

#[test]
fn unrestricted_criteria_apply_to_every_kind() {
    let mut criteria = scenario_criteria();
    criteria.push(testing::criterion("any-o1", None, 2, false));

    let ess = EvaluationEngine::new().score(FacilityKind::Ess, &criteria, &BTreeSet::new());
    let epvg = EvaluationEngine::new().score(FacilityKind::Epvg, &criteria, &BTreeSet::new());

    assert_eq!(ess.score_maximum, 42);
    assert_eq!(epvg.score_maximum, 10);
}

#[test]
fn inactive_criteria_do_not_count() {
    let mut criteria = scenario_criteria();
    criteria[3].active = false;

    let sheet = EvaluationEngine::new().score(
        FacilityKind::Ess,
        &criteria,
        &checked(&["ess-m1", "ess-m2", "ess-m3", "ess-o1"]),
    );

    assert_eq!(sheet.score_maximum, 35);
    assert_eq!(sheet.score_total, 30);
    assert_eq!(sheet.unresolved, vec![CriterionId::new("ess-o1")]);
}

#[test]
fn details_cover_exactly_the_scorable_set() {
    let sheet = EvaluationEngine::new().score(
        FacilityKind::Ess,
        &scenario_criteria(),
        &checked(&["ess-m2", "ess-o2"]),
    );

    let ids: Vec<&str> = sheet
        .details
        .iter()
        .map(|detail| detail.criterion_id.as_str())
        .collect();
    assert_eq!(ids, ["ess-m1", "ess-m2", "ess-m3", "ess-o1", "ess-o2"]);
    for detail in &sheet.details {
        let expected = match detail.criterion_id.as_str() {
            "ess-m2" => 10,
            "ess-o2" => 5,
            _ => 0,
        };
        assert_eq!(detail.score, expected);
        assert_eq!(detail.satisfied, expected > 0);
    }
}

#[test]
fn every_checked_subset_respects_bounds_and_the_conformity_rule() {
    let criteria = scenario_criteria();
    let ids = ["ess-m1", "ess-m2", "ess-m3", "ess-o1", "ess-o2"];
    let engine = EvaluationEngine::new();

    for mask in 0u32..(1 << ids.len()) {
        let subset: BTreeSet<CriterionId> = ids
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, id)| CriterionId::new(*id))
            .collect();
        let sheet = engine.score(FacilityKind::Ess, &criteria, &subset);

        assert!(sheet.score_total <= sheet.score_maximum);
        assert!((0.0..=100.0).contains(&sheet.percentage));

        let all_mandatory = ["ess-m1", "ess-m2", "ess-m3"]
            .iter()
            .all(|id| subset.contains(&CriterionId::new(*id)));
        assert_eq!(
            sheet.conforming,
            all_mandatory && sheet.percentage >= PASS_THRESHOLD,
            "mask {mask:05b}"
        );
    }
}
