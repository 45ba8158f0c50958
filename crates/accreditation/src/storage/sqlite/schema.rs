//! Relational layout: geography, criteria, facilities, evaluations and their
//! detail rows. Criteria are never deleted, so detail rows always resolve.

use rusqlite::Connection;

use super::storage_err;
use crate::storage::RepositoryError;

const SCHEMA_VERSION: i64 = 1;

pub(super) fn migrate(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| storage_err("enable foreign keys", e))?;

    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| storage_err("read schema version", e))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS provinces (
            id      TEXT PRIMARY KEY,
            code    TEXT NOT NULL UNIQUE,
            name    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS zones (
            id          TEXT PRIMARY KEY,
            code        TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL,
            province_id TEXT NOT NULL REFERENCES provinces(id)
        );

        CREATE TABLE IF NOT EXISTS areas (
            id      TEXT PRIMARY KEY,
            code    TEXT NOT NULL UNIQUE,
            name    TEXT NOT NULL,
            zone_id TEXT NOT NULL REFERENCES zones(id)
        );

        CREATE TABLE IF NOT EXISTS criteria (
            id            TEXT PRIMARY KEY,
            code          TEXT NOT NULL UNIQUE,
            label         TEXT NOT NULL,
            description   TEXT,
            category      TEXT NOT NULL,
            facility_kind TEXT,
            weight        INTEGER NOT NULL CHECK (weight > 0),
            mandatory     INTEGER NOT NULL DEFAULT 0,
            active        INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS facilities (
            id                   TEXT PRIMARY KEY,
            code                 TEXT NOT NULL,
            name                 TEXT NOT NULL,
            kind                 TEXT NOT NULL,
            operational_status   TEXT NOT NULL,
            accreditation_status TEXT NOT NULL DEFAULT 'not_accredited',
            area_id              TEXT,
            address              TEXT,
            contact              TEXT,
            capacity             INTEGER,
            created_at           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_facilities_area ON facilities(area_id);

        CREATE TABLE IF NOT EXISTS evaluations (
            id            TEXT PRIMARY KEY,
            reference     TEXT NOT NULL,
            facility_id   TEXT NOT NULL REFERENCES facilities(id),
            evaluated_at  TEXT NOT NULL,
            score_total   INTEGER NOT NULL,
            score_maximum INTEGER NOT NULL,
            percentage    REAL NOT NULL,
            conforming    INTEGER NOT NULL,
            observations  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_evaluations_facility
            ON evaluations(facility_id, evaluated_at);
        CREATE INDEX IF NOT EXISTS idx_evaluations_date ON evaluations(evaluated_at);

        CREATE TABLE IF NOT EXISTS evaluation_details (
            evaluation_id TEXT NOT NULL REFERENCES evaluations(id) ON DELETE CASCADE,
            criterion_id  TEXT NOT NULL REFERENCES criteria(id),
            position      INTEGER NOT NULL,
            score         INTEGER NOT NULL,
            satisfied     INTEGER NOT NULL,
            PRIMARY KEY (evaluation_id, criterion_id)
        );
        ",
    )
    .map_err(|e| storage_err("create schema", e))?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(|e| storage_err("record schema version", e))?;

    Ok(())
}
