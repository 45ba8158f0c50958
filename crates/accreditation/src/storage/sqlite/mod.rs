//! SQLite backend. One connection behind a mutex; every multi-row write runs
//! inside a single transaction.

mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{CriterionStore, EvaluationStore, FacilityStore, GeographyStore, RepositoryError};
use crate::catalog::{Criterion, CriterionId, CriterionQuery};
use crate::evaluation::{Evaluation, EvaluationDetail, EvaluationId, EvaluationWrite, HistoryPolicy};
use crate::facility::{AccreditationStatus, Facility, FacilityId, FacilityKind, OperationalStatus};
use crate::geography::{Area, AreaId, Placement, Province, ProvinceId, Zone, ZoneId};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path.as_ref()).map_err(|e| storage_err("open database", e))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| storage_err("open in-memory database", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Unavailable("sqlite connection lock poisoned".into()))
    }
}

pub(super) fn storage_err(context: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{context}: {err}"))
}

/// Constraint failures become domain errors; anything else is an outage.
fn classify(context: &str, key: &str, err: rusqlite::Error) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return RepositoryError::Conflict(key.to_string());
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return RepositoryError::NotFound,
            _ => {}
        }
    }
    storage_err(context, err)
}

fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| storage_err("decode timestamp", e))
}

fn decode_kind(raw: &str) -> Result<FacilityKind, RepositoryError> {
    FacilityKind::parse(raw)
        .ok_or_else(|| storage_err("decode facility kind", format!("unknown kind '{raw}'")))
}

const CRITERION_COLUMNS: &str =
    "id, code, label, description, category, facility_kind, weight, mandatory, active";

struct CriterionRow {
    id: String,
    code: String,
    label: String,
    description: Option<String>,
    category: String,
    facility_kind: Option<String>,
    weight: u32,
    mandatory: bool,
    active: bool,
}

impl CriterionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            label: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            facility_kind: row.get(5)?,
            weight: row.get(6)?,
            mandatory: row.get(7)?,
            active: row.get(8)?,
        })
    }

    fn into_criterion(self) -> Result<Criterion, RepositoryError> {
        let facility_kind = self.facility_kind.as_deref().map(decode_kind).transpose()?;
        Ok(Criterion {
            id: CriterionId(self.id),
            code: self.code,
            label: self.label,
            description: self.description,
            category: self.category,
            facility_kind,
            weight: self.weight,
            mandatory: self.mandatory,
            active: self.active,
        })
    }
}

fn select_criterion(
    conn: &Connection,
    id: &CriterionId,
) -> Result<Option<Criterion>, RepositoryError> {
    let sql = format!("SELECT {CRITERION_COLUMNS} FROM criteria WHERE id = ?1");
    conn.query_row(&sql, params![id.as_str()], CriterionRow::read)
        .optional()
        .map_err(|e| storage_err("load criterion", e))?
        .map(CriterionRow::into_criterion)
        .transpose()
}

impl CriterionStore for SqliteStore {
    fn criteria(&self, query: &CriterionQuery) -> Result<Vec<Criterion>, RepositoryError> {
        let mut sql = format!("SELECT {CRITERION_COLUMNS} FROM criteria WHERE 1 = 1");
        let mut values: Vec<Value> = Vec::new();
        if query.active_only {
            sql.push_str(" AND active = 1");
        }
        if let Some(kind) = query.facility_kind {
            sql.push_str(" AND (facility_kind IS NULL OR facility_kind = ?)");
            values.push(Value::Text(kind.code().to_string()));
        }
        if let Some(category) = &query.category {
            sql.push_str(" AND category = ?");
            values.push(Value::Text(category.clone()));
        }
        if let Some(mandatory) = query.mandatory {
            sql.push_str(" AND mandatory = ?");
            values.push(Value::Integer(i64::from(mandatory)));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| storage_err("prepare criteria query", e))?;
        let rows = stmt
            .query_map(params_from_iter(values), CriterionRow::read)
            .map_err(|e| storage_err("query criteria", e))?;
        let criteria = rows
            .map(|row| {
                row.map_err(|e| storage_err("read criterion", e))
                    .and_then(CriterionRow::into_criterion)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(criteria)
    }

    fn criterion(&self, id: &CriterionId) -> Result<Option<Criterion>, RepositoryError> {
        let conn = self.conn()?;
        select_criterion(&conn, id)
    }

    fn insert_criterion(&self, criterion: Criterion) -> Result<Criterion, RepositoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO criteria (
                id, code, label, description, category, facility_kind, weight, mandatory, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                criterion.id.as_str(),
                criterion.code,
                criterion.label,
                criterion.description,
                criterion.category,
                criterion.facility_kind.map(FacilityKind::code),
                criterion.weight,
                criterion.mandatory,
                criterion.active,
            ],
        )
        .map_err(|e| classify("insert criterion", &criterion.code, e))?;
        Ok(criterion)
    }

    fn set_criterion_active(
        &self,
        id: &CriterionId,
        active: bool,
    ) -> Result<Criterion, RepositoryError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE criteria SET active = ?2 WHERE id = ?1",
                params![id.as_str(), active],
            )
            .map_err(|e| storage_err("toggle criterion", e))?;
        if changed == 0 {
            return Err(RepositoryError::NotFound);
        }
        select_criterion(&conn, id)?.ok_or(RepositoryError::NotFound)
    }
}

const FACILITY_COLUMNS: &str = "id, code, name, kind, operational_status, accreditation_status, \
     area_id, address, contact, capacity, created_at";

struct FacilityRow {
    id: String,
    code: String,
    name: String,
    kind: String,
    operational_status: String,
    accreditation_status: String,
    area_id: Option<String>,
    address: Option<String>,
    contact: Option<String>,
    capacity: Option<u32>,
    created_at: String,
}

impl FacilityRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            kind: row.get(3)?,
            operational_status: row.get(4)?,
            accreditation_status: row.get(5)?,
            area_id: row.get(6)?,
            address: row.get(7)?,
            contact: row.get(8)?,
            capacity: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn into_facility(self) -> Result<Facility, RepositoryError> {
        let operational_status = OperationalStatus::from_label(&self.operational_status)
            .ok_or_else(|| {
                storage_err(
                    "decode facility",
                    format!("unknown operational status '{}'", self.operational_status),
                )
            })?;
        let accreditation_status = AccreditationStatus::from_label(&self.accreditation_status)
            .ok_or_else(|| {
                storage_err(
                    "decode facility",
                    format!("unknown accreditation status '{}'", self.accreditation_status),
                )
            })?;

        Ok(Facility {
            id: FacilityId(self.id),
            code: self.code,
            name: self.name,
            kind: decode_kind(&self.kind)?,
            operational_status,
            accreditation_status,
            area_id: self.area_id.map(AreaId),
            address: self.address,
            contact: self.contact,
            capacity: self.capacity,
            created_at: decode_time(&self.created_at)?,
        })
    }
}

impl FacilityStore for SqliteStore {
    fn facility(&self, id: &FacilityId) -> Result<Option<Facility>, RepositoryError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = ?1");
        conn.query_row(&sql, params![id.as_str()], FacilityRow::read)
            .optional()
            .map_err(|e| storage_err("load facility", e))?
            .map(FacilityRow::into_facility)
            .transpose()
    }

    fn facilities(&self) -> Result<Vec<Facility>, RepositoryError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {FACILITY_COLUMNS} FROM facilities ORDER BY id");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| storage_err("prepare facility query", e))?;
        let rows = stmt
            .query_map([], FacilityRow::read)
            .map_err(|e| storage_err("query facilities", e))?;
        let facilities = rows
            .map(|row| {
                row.map_err(|e| storage_err("read facility", e))
                    .and_then(FacilityRow::into_facility)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(facilities)
    }

    fn insert_facility(&self, facility: Facility) -> Result<Facility, RepositoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO facilities (
                id, code, name, kind, operational_status, accreditation_status,
                area_id, address, contact, capacity, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                facility.id.as_str(),
                facility.code,
                facility.name,
                facility.kind.code(),
                facility.operational_status.label(),
                facility.accreditation_status.label(),
                facility.area_id.as_ref().map(|area| area.0.as_str()),
                facility.address,
                facility.contact,
                facility.capacity,
                encode_time(&facility.created_at),
            ],
        )
        .map_err(|e| classify("insert facility", facility.id.as_str(), e))?;
        Ok(facility)
    }
}

const EVALUATION_COLUMNS: &str = "id, reference, facility_id, evaluated_at, score_total, \
     score_maximum, percentage, conforming, observations";

struct EvaluationRow {
    id: String,
    reference: String,
    facility_id: String,
    evaluated_at: String,
    score_total: u32,
    score_maximum: u32,
    percentage: f64,
    conforming: bool,
    observations: Option<String>,
}

impl EvaluationRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            reference: row.get(1)?,
            facility_id: row.get(2)?,
            evaluated_at: row.get(3)?,
            score_total: row.get(4)?,
            score_maximum: row.get(5)?,
            percentage: row.get(6)?,
            conforming: row.get(7)?,
            observations: row.get(8)?,
        })
    }
}

/// Evaluations matching `filter` (a trailing SQL clause), details attached.
fn select_evaluations(
    conn: &Connection,
    filter: &str,
    values: Vec<Value>,
) -> Result<Vec<Evaluation>, RepositoryError> {
    let sql = format!("SELECT {EVALUATION_COLUMNS} FROM evaluations {filter}");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| storage_err("prepare evaluation query", e))?;
    let rows = stmt
        .query_map(params_from_iter(values), EvaluationRow::read)
        .map_err(|e| storage_err("query evaluations", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| storage_err("read evaluation", e))?;

    let mut details = conn
        .prepare(
            "SELECT criterion_id, score, satisfied FROM evaluation_details
             WHERE evaluation_id = ?1 ORDER BY position",
        )
        .map_err(|e| storage_err("prepare detail query", e))?;

    let mut evaluations = Vec::with_capacity(rows.len());
    for row in rows {
        let detail_rows = details
            .query_map(params![row.id], |detail| {
                Ok(EvaluationDetail {
                    criterion_id: CriterionId(detail.get(0)?),
                    score: detail.get(1)?,
                    satisfied: detail.get(2)?,
                })
            })
            .map_err(|e| storage_err("query evaluation details", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_err("read evaluation detail", e))?;

        evaluations.push(Evaluation {
            id: EvaluationId(row.id),
            reference: row.reference,
            facility_id: FacilityId(row.facility_id),
            evaluated_at: decode_time(&row.evaluated_at)?,
            score_total: row.score_total,
            score_maximum: row.score_maximum,
            percentage: row.percentage,
            conforming: row.conforming,
            observations: row.observations,
            details: detail_rows,
        });
    }
    Ok(evaluations)
}

fn write_evaluation(
    conn: &Connection,
    write: EvaluationWrite,
) -> Result<Evaluation, RepositoryError> {
    let facility_id = write.facility_id.as_str().to_string();
    let known = conn
        .query_row(
            "SELECT 1 FROM facilities WHERE id = ?1",
            params![facility_id],
            |_| Ok(()),
        )
        .optional()
        .map_err(|e| storage_err("check facility", e))?;
    if known.is_none() {
        return Err(RepositoryError::NotFound);
    }

    let existing: Option<(String, String)> = match write.history {
        HistoryPolicy::Overwrite => conn
            .query_row(
                "SELECT id, reference FROM evaluations WHERE facility_id = ?1
                 ORDER BY evaluated_at DESC, rowid DESC LIMIT 1",
                params![facility_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| storage_err("load current evaluation", e))?,
        HistoryPolicy::Append => None,
    };

    let evaluated_at = encode_time(&write.evaluated_at);
    let (id, reference) = match existing {
        Some((id, reference)) => {
            conn.execute(
                "UPDATE evaluations SET evaluated_at = ?2, score_total = ?3, score_maximum = ?4,
                    percentage = ?5, conforming = ?6, observations = ?7
                 WHERE id = ?1",
                params![
                    id,
                    evaluated_at,
                    write.score_total,
                    write.score_maximum,
                    write.percentage,
                    write.conforming,
                    write.observations,
                ],
            )
            .map_err(|e| storage_err("overwrite evaluation", e))?;
            conn.execute(
                "DELETE FROM evaluation_details WHERE evaluation_id = ?1",
                params![id],
            )
            .map_err(|e| storage_err("clear evaluation details", e))?;
            (id, reference)
        }
        None => {
            let prior: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM evaluations WHERE facility_id = ?1",
                    params![facility_id],
                    |row| row.get(0),
                )
                .map_err(|e| storage_err("count evaluations", e))?;
            let id = format!("eval-{}", Uuid::new_v4());
            let reference = write.reference(usize::try_from(prior).unwrap_or(0) + 1);
            conn.execute(
                "INSERT INTO evaluations (
                    id, reference, facility_id, evaluated_at, score_total, score_maximum,
                    percentage, conforming, observations
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    reference,
                    facility_id,
                    evaluated_at,
                    write.score_total,
                    write.score_maximum,
                    write.percentage,
                    write.conforming,
                    write.observations,
                ],
            )
            .map_err(|e| classify("insert evaluation", &reference, e))?;
            (id, reference)
        }
    };

    {
        let mut insert = conn
            .prepare(
                "INSERT INTO evaluation_details (
                    evaluation_id, criterion_id, position, score, satisfied
                ) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(|e| storage_err("prepare detail insert", e))?;
        for (position, detail) in write.details.iter().enumerate() {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            insert
                .execute(params![
                    id,
                    detail.criterion_id.as_str(),
                    position,
                    detail.score,
                    detail.satisfied,
                ])
                .map_err(|e| {
                    classify("insert evaluation detail", detail.criterion_id.as_str(), e)
                })?;
        }
    }

    conn.execute(
        "UPDATE facilities SET accreditation_status = ?2 WHERE id = ?1",
        params![facility_id, write.accreditation_status.label()],
    )
    .map_err(|e| storage_err("update accreditation status", e))?;

    Ok(write.into_evaluation(EvaluationId(id), reference))
}

impl EvaluationStore for SqliteStore {
    fn latest_evaluation(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        let conn = self.conn()?;
        let mut evaluations = select_evaluations(
            &conn,
            "WHERE facility_id = ? ORDER BY evaluated_at DESC, rowid DESC LIMIT 1",
            vec![Value::Text(facility_id.as_str().to_string())],
        )?;
        Ok(evaluations.pop())
    }

    fn facility_evaluations(
        &self,
        facility_id: &FacilityId,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        let conn = self.conn()?;
        select_evaluations(
            &conn,
            "WHERE facility_id = ? ORDER BY evaluated_at DESC, rowid DESC",
            vec![Value::Text(facility_id.as_str().to_string())],
        )
    }

    fn evaluations(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        let conn = self.conn()?;
        select_evaluations(&conn, "ORDER BY rowid", Vec::new())
    }

    fn record_evaluation(&self, write: EvaluationWrite) -> Result<Evaluation, RepositoryError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| storage_err("begin evaluation write", e))?;
        // Dropping `tx` on an early return rolls every statement back.
        let evaluation = write_evaluation(&tx, write)?;
        tx.commit()
            .map_err(|e| storage_err("commit evaluation write", e))?;
        Ok(evaluation)
    }
}

impl GeographyStore for SqliteStore {
    fn provinces(&self) -> Result<Vec<Province>, RepositoryError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, code, name FROM provinces ORDER BY id")
            .map_err(|e| storage_err("prepare province query", e))?;
        let provinces = stmt
            .query_map([], |row| {
                Ok(Province {
                    id: ProvinceId(row.get(0)?),
                    code: row.get(1)?,
                    name: row.get(2)?,
                })
            })
            .map_err(|e| storage_err("query provinces", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_err("read province", e))?;
        Ok(provinces)
    }

    fn placement(&self, area_id: &AreaId) -> Result<Option<Placement>, RepositoryError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT a.id, a.code, a.name, z.id, z.code, z.name, p.id, p.code, p.name
             FROM areas a
             JOIN zones z ON z.id = a.zone_id
             JOIN provinces p ON p.id = z.province_id
             WHERE a.id = ?1",
            params![area_id.0],
            |row| {
                let zone_id = ZoneId(row.get(3)?);
                let province_id = ProvinceId(row.get(6)?);
                Ok(Placement {
                    area: Area {
                        id: AreaId(row.get(0)?),
                        code: row.get(1)?,
                        name: row.get(2)?,
                        zone_id: zone_id.clone(),
                    },
                    zone: Zone {
                        id: zone_id,
                        code: row.get(4)?,
                        name: row.get(5)?,
                        province_id: province_id.clone(),
                    },
                    province: Province {
                        id: province_id,
                        code: row.get(7)?,
                        name: row.get(8)?,
                    },
                })
            },
        )
        .optional()
        .map_err(|e| storage_err("resolve placement", e))
    }

    fn insert_province(&self, province: Province) -> Result<(), RepositoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO provinces (id, code, name) VALUES (?1, ?2, ?3)",
            params![province.id.0, province.code, province.name],
        )
        .map_err(|e| classify("insert province", &province.id.0, e))?;
        Ok(())
    }

    fn insert_zone(&self, zone: Zone) -> Result<(), RepositoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO zones (id, code, name, province_id) VALUES (?1, ?2, ?3, ?4)",
            params![zone.id.0, zone.code, zone.name, zone.province_id.0],
        )
        .map_err(|e| classify("insert zone", &zone.id.0, e))?;
        Ok(())
    }

    fn insert_area(&self, area: Area) -> Result<(), RepositoryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO areas (id, code, name, zone_id) VALUES (?1, ?2, ?3, ?4)",
            params![area.id.0, area.code, area.name, area.zone_id.0],
        )
        .map_err(|e| classify("insert area", &area.id.0, e))?;
        Ok(())
    }
}
