//! Builders shared by the unit test modules.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::catalog::{Criterion, CriterionId};
use crate::evaluation::{EvaluationDetail, EvaluationWrite, HistoryPolicy};
use crate::facility::{
    AccreditationStatus, Facility, FacilityId, FacilityKind, OperationalStatus,
};
use crate::geography::AreaId;

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn timestamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

/// An active criterion whose code equals its id.
pub(crate) fn criterion(
    id: &str,
    kind: Option<FacilityKind>,
    weight: u32,
    mandatory: bool,
) -> Criterion {
    Criterion {
        id: CriterionId::new(id),
        code: id.to_string(),
        label: format!("Requirement {id}"),
        description: None,
        category: "General".to_string(),
        facility_kind: kind,
        weight,
        mandatory,
        active: true,
    }
}

pub(crate) fn facility(id: &str, code: &str, kind: FacilityKind) -> Facility {
    Facility {
        id: FacilityId::new(id),
        code: code.to_string(),
        name: format!("Facility {code}"),
        kind,
        operational_status: OperationalStatus::Active,
        accreditation_status: AccreditationStatus::NotAccredited,
        area_id: None,
        address: Some("12 Avenue de la Paix".to_string()),
        contact: Some("+243 810 000 000".to_string()),
        capacity: Some(40),
        created_at: timestamp(2024, 1, 10),
    }
}

pub(crate) fn facility_in_area(
    id: &str,
    code: &str,
    kind: FacilityKind,
    area: &str,
) -> Facility {
    Facility {
        area_id: Some(AreaId(area.to_string())),
        ..facility(id, code, kind)
    }
}

/// A write with one satisfied detail on `crit-a`.
pub(crate) fn evaluation_write(
    facility_id: &str,
    facility_code: &str,
    percentage: f64,
    conforming: bool,
) -> EvaluationWrite {
    let status = if conforming {
        AccreditationStatus::Accredited
    } else if percentage > 0.0 {
        AccreditationStatus::InProgress
    } else {
        AccreditationStatus::NotAccredited
    };

    EvaluationWrite {
        facility_id: FacilityId::new(facility_id),
        facility_code: facility_code.to_string(),
        evaluated_at: timestamp(2024, 3, 15),
        score_total: 10,
        score_maximum: 10,
        percentage,
        conforming,
        observations: None,
        details: vec![EvaluationDetail {
            criterion_id: CriterionId::new("crit-a"),
            score: 10,
            satisfied: true,
        }],
        accreditation_status: status,
        history: HistoryPolicy::Overwrite,
    }
}
