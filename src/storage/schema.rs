//! Schema creation for the relational store (spec section 6).

use rusqlite::Connection;

use crate::error::CoreError;

pub fn ensure_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            name      TEXT NOT NULL,
            parent_id INTEGER NULL REFERENCES projects(id),
            UNIQUE(name, parent_id)
        );

        CREATE TABLE IF NOT EXISTS days (
            date               TEXT PRIMARY KEY,
            year               INTEGER NOT NULL,
            month              INTEGER NOT NULL,
            status             INTEGER NOT NULL,
            sleep              INTEGER NOT NULL,
            remark             TEXT NOT NULL,
            getup_time         TEXT NULL,
            exercise           INTEGER NOT NULL,
            total_exercise_time INTEGER NOT NULL,
            cardio_time        INTEGER NOT NULL,
            anaerobic_time     INTEGER NOT NULL,
            exercise_both_time INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS time_records (
            logical_id       INTEGER NOT NULL,
            start_timestamp  INTEGER NOT NULL,
            end_timestamp    INTEGER NOT NULL,
            date             TEXT NOT NULL REFERENCES days(date),
            start            TEXT NOT NULL,
            end              TEXT NOT NULL,
            project_id       INTEGER NOT NULL REFERENCES projects(id),
            duration_seconds INTEGER NOT NULL,
            activity_remark  TEXT NULL,
            UNIQUE(date, logical_id)
        );

        CREATE INDEX IF NOT EXISTS idx_time_records_date ON time_records(date);
        CREATE INDEX IF NOT EXISTS idx_time_records_project ON time_records(project_id);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }
}
