//! Province → health zone → health area hierarchy.
//!
//! The hierarchy itself is administered elsewhere; the accreditation core only
//! resolves a facility's area up to its province for rollups and certificates.

use serde::{Deserialize, Serialize};

use crate::storage::{GeographyStore, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProvinceId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub code: String,
    pub name: String,
    pub province_id: ProvinceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub code: String,
    pub name: String,
    pub zone_id: ZoneId,
}

/// Fully resolved location of a health area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub province: Province,
    pub zone: Zone,
    pub area: Area,
}

const PROVINCES: [(&str, &str); 26] = [
    ("KIN", "Kinshasa"),
    ("KOC", "Kongo-Central"),
    ("KWO", "Kwango"),
    ("KWL", "Kwilu"),
    ("MAI", "Mai-Ndombe"),
    ("EQU", "Équateur"),
    ("SUD", "Sud-Ubangi"),
    ("NOR", "Nord-Ubangi"),
    ("MON", "Mongala"),
    ("TSH", "Tshuapa"),
    ("TAN", "Tanganyika"),
    ("HLO", "Haut-Lomami"),
    ("LUA", "Lualaba"),
    ("HKA", "Haut-Katanga"),
    ("KAS", "Kasaï"),
    ("KAC", "Kasaï-Central"),
    ("KAO", "Kasaï-Oriental"),
    ("LOM", "Lomami"),
    ("SAN", "Sankuru"),
    ("MAN", "Maniema"),
    ("SUK", "Sud-Kivu"),
    ("NOK", "Nord-Kivu"),
    ("ITO", "Ituri"),
    ("HUE", "Haut-Uélé"),
    ("BUE", "Bas-Uélé"),
    ("TSO", "Tshopo"),
];

const CAPITAL_ZONES: [(&str, &str); 8] = [
    ("ZS-KIN-BAN", "Bandalungwa"),
    ("ZS-KIN-BAR", "Barumbu"),
    ("ZS-KIN-GOM", "Gombe"),
    ("ZS-KIN-KAL", "Kalamu"),
    ("ZS-KIN-LEM", "Lemba"),
    ("ZS-KIN-LIM", "Limete"),
    ("ZS-KIN-MAS", "Masina"),
    ("ZS-KIN-NGA2", "Ngaliema"),
];

/// Reference geography: every province, plus zones and areas for the capital.
#[derive(Debug, Clone, Default)]
pub struct GeographySeed {
    pub provinces: Vec<Province>,
    pub zones: Vec<Zone>,
    pub areas: Vec<Area>,
}

impl GeographySeed {
    pub fn reference() -> Self {
        let provinces: Vec<Province> = PROVINCES
            .iter()
            .map(|(code, name)| Province {
                id: ProvinceId(format!("prov-{}", code.to_ascii_lowercase())),
                code: (*code).to_string(),
                name: (*name).to_string(),
            })
            .collect();

        let capital = ProvinceId("prov-kin".to_string());
        let mut zones = Vec::new();
        let mut areas = Vec::new();
        for (code, name) in CAPITAL_ZONES {
            let zone_id = ZoneId(code.to_ascii_lowercase());
            for (suffix, quarter) in [("AS1", "Centre"), ("AS2", "Nord"), ("AS3", "Sud")] {
                let area_code = format!("{code}-{suffix}");
                areas.push(Area {
                    id: AreaId(area_code.to_ascii_lowercase()),
                    code: area_code,
                    name: format!("{name} {quarter}"),
                    zone_id: zone_id.clone(),
                });
            }
            zones.push(Zone {
                id: zone_id,
                code: code.to_string(),
                name: name.to_string(),
                province_id: capital.clone(),
            });
        }

        Self {
            provinces,
            zones,
            areas,
        }
    }

    /// Write the seed into `store`. Rows that already exist are left alone, so
    /// seeding twice is harmless.
    pub fn install<S>(&self, store: &S) -> Result<(), RepositoryError>
    where
        S: GeographyStore + ?Sized,
    {
        for province in &self.provinces {
            tolerate_existing(store.insert_province(province.clone()))?;
        }
        for zone in &self.zones {
            tolerate_existing(store.insert_zone(zone.clone()))?;
        }
        for area in &self.areas {
            tolerate_existing(store.insert_area(area.clone()))?;
        }
        Ok(())
    }
}

fn tolerate_existing(result: Result<(), RepositoryError>) -> Result<(), RepositoryError> {
    match result {
        Err(RepositoryError::Conflict(_)) => Ok(()),
        other => other,
    }
}
