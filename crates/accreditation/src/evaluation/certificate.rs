use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use super::domain::Evaluation;
use crate::facility::{Facility, FacilityId, FacilityKind};
use crate::geography::Placement;

/// Accreditation stays valid for three years from the conforming evaluation.
const VALIDITY_MONTHS: u32 = 36;

/// What certificate rendering needs about an accredited facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateData {
    pub facility_id: FacilityId,
    pub facility_code: String,
    pub facility_name: String,
    pub kind: FacilityKind,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub accreditation_number: String,
    pub evaluation_reference: String,
    pub percentage: f64,
    pub accredited_on: DateTime<Utc>,
    pub expires_on: DateTime<Utc>,
    pub province: Option<String>,
    pub zone: Option<String>,
    pub area: Option<String>,
}

pub(crate) fn build(
    facility: &Facility,
    evaluation: &Evaluation,
    placement: Option<Placement>,
    issued_on: NaiveDate,
) -> CertificateData {
    let accredited_on = evaluation.evaluated_at;
    let expires_on = accredited_on
        .checked_add_months(Months::new(VALIDITY_MONTHS))
        .unwrap_or(accredited_on);

    let (province, zone, area) = match placement {
        Some(placement) => (
            Some(placement.province.name),
            Some(placement.zone.name),
            Some(placement.area.name),
        ),
        None => (None, None, None),
    };

    CertificateData {
        facility_id: facility.id.clone(),
        facility_code: facility.code.clone(),
        facility_name: facility.name.clone(),
        kind: facility.kind,
        address: facility.address.clone(),
        contact: facility.contact.clone(),
        accreditation_number: format!(
            "ARC-CSU/{}/{}/{}",
            facility.kind.code(),
            issued_on.year(),
            facility.code
        ),
        evaluation_reference: evaluation.reference.clone(),
        percentage: evaluation.percentage,
        accredited_on,
        expires_on,
        province,
        zone,
        area,
    }
}
