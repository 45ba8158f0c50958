use std::io::Read;

use serde::Deserialize;

use super::domain::NewCriterion;
use crate::facility::FacilityKind;

/// Reference catalog shipped with the service.
pub(crate) const REFERENCE_CATALOG: &str = include_str!("../../data/criteria.csv");

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidApplicability { code: String, value: String },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read criteria file: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid criteria CSV data: {}", err),
            CatalogImportError::InvalidApplicability { code, value } => write!(
                f,
                "criterion {} has applicability '{}' (expected ESS, EPVG or ANY)",
                code, value
            ),
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidApplicability { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct CriterionRow {
    code: String,
    label: String,
    #[serde(default)]
    description: String,
    category: String,
    #[serde(default)]
    applicability: String,
    weight: u32,
    mandatory: bool,
}

impl CriterionRow {
    fn into_new_criterion(self) -> Result<NewCriterion, CatalogImportError> {
        let facility_kind = match self.applicability.trim() {
            "" => None,
            value if value.eq_ignore_ascii_case("any") => None,
            value => Some(FacilityKind::parse(value).ok_or_else(|| {
                CatalogImportError::InvalidApplicability {
                    code: self.code.clone(),
                    value: value.to_string(),
                }
            })?),
        };

        let description = Some(self.description).filter(|text| !text.trim().is_empty());

        Ok(NewCriterion {
            code: self.code,
            label: self.label,
            description,
            category: self.category,
            facility_kind,
            weight: self.weight,
            mandatory: self.mandatory,
        })
    }
}

/// Parse `code,label,description,category,applicability,weight,mandatory` rows.
pub(crate) fn parse_criteria<R: Read>(reader: R) -> Result<Vec<NewCriterion>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut criteria = Vec::new();

    for record in csv_reader.deserialize::<CriterionRow>() {
        criteria.push(record?.into_new_criterion()?);
    }

    Ok(criteria)
}
