//! Repository (C6, spec section 4.6): a transactional DAO over the
//! relational store. Grounded on the teacher's prepared-statement style
//! in its persistence layer, generalized to the interval/project-path
//! schema and to `rusqlite`'s transaction API.

pub mod schema;

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, instrument};

use crate::domain::{Day, ProjectPathCache};
use crate::error::CoreError;

/// A time record pending insertion: identical in shape to the persisted
/// `TimeRecord`, except it carries the project's full `_`-joined path
/// instead of an already-resolved id. The repository resolves the path
/// to an id via the project path cache inside the same transaction as
/// the insert (spec section 4.2).
#[derive(Debug, Clone)]
pub struct PendingRecord {
    pub date: NaiveDate,
    pub logical_id: u32,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub start: String,
    pub end: String,
    pub project_path: String,
    pub duration_seconds: i64,
    pub activity_remark: Option<String>,
}

/// The date predicate a query reduces to (spec section 4.8 point 1).
#[derive(Debug, Clone)]
pub enum DatePredicate {
    Day(NaiveDate),
    MonthPrefix(String),
    YearPrefix(String),
    Range(NaiveDate, NaiveDate),
    All,
}

impl DatePredicate {
    fn sql_clause(&self) -> &'static str {
        match self {
            DatePredicate::Day(_) => "date = ?1",
            DatePredicate::MonthPrefix(_) => "substr(date, 1, 7) = ?1",
            DatePredicate::YearPrefix(_) => "substr(date, 1, 4) = ?1",
            DatePredicate::Range(_, _) => "date BETWEEN ?1 AND ?2",
            DatePredicate::All => "1 = 1",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregateRow {
    pub project_id: i64,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct DetailedRow {
    pub start: String,
    pub end: String,
    pub duration_seconds: i64,
    pub project_id: i64,
    pub activity_remark: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub aggregates: Vec<AggregateRow>,
    pub actual_days: i64,
    pub total_duration: i64,
}

pub struct Repository {
    conn: Connection,
    project_cache: ProjectPathCache,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn, project_cache: ProjectPathCache::new() })
    }

    #[must_use]
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn, project_cache: ProjectPathCache::new() })
    }

    /// A `Repository` value always wraps a live connection; this mirrors
    /// the spec's `is_open()` operation for callers that probe state
    /// before issuing a query.
    #[must_use]
    pub fn is_open(&self) -> bool {
        true
    }

    #[instrument(skip(self, days, records), fields(day_count = days.len(), record_count = records.len()))]
    pub fn import_data(&mut self, days: &[Day], records: &[PendingRecord]) -> Result<(), CoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;

        for day in days {
            insert_day(&tx, day).map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        }
        for record in records {
            let project_id = self
                .project_cache
                .resolve_or_create(&tx, &record.project_path)
                .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
            insert_time_record(&tx, record, project_id)
                .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        }

        tx.commit().map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        info!(days = days.len(), records = records.len(), "import_data committed");
        Ok(())
    }

    #[instrument(skip(self, days, records), fields(%year, %month))]
    pub fn replace_month(
        &mut self,
        year: i32,
        month: u32,
        days: &[Day],
        records: &[PendingRecord],
    ) -> Result<(), CoreError> {
        let scope = format!("{year:04}-{month:02}");
        let tx = self
            .conn
            .transaction()
            .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;

        tx.execute(
            "DELETE FROM time_records WHERE substr(date, 1, 7) = ?1",
            params![scope],
        )
        .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        tx.execute("DELETE FROM days WHERE substr(date, 1, 7) = ?1", params![scope])
            .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;

        for day in days {
            insert_day(&tx, day).map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        }
        for record in records {
            let project_id = self
                .project_cache
                .resolve_or_create(&tx, &record.project_path)
                .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
            insert_time_record(&tx, record, project_id)
                .map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        }

        tx.commit().map_err(|e| CoreError::Database(format!("TxFailed: {e}")))?;
        info!(%scope, "replace_month committed");
        Ok(())
    }

    pub fn latest_activity_tail_before(
        &mut self,
        date: NaiveDate,
    ) -> Result<Option<(i64, String)>, CoreError> {
        let row: Option<(i64, i64)> = self
            .conn
            .query_row(
                "SELECT end_timestamp, project_id FROM time_records
                 WHERE date < ?1 ORDER BY date DESC, logical_id DESC LIMIT 1",
                params![date.format("%Y-%m-%d").to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((end_ts, project_id)) = row else { return Ok(None) };
        self.project_cache.ensure_loaded(&self.conn)?;
        let path = self
            .project_cache
            .path_string_for(project_id)
            .ok_or_else(|| CoreError::Logic(format!("unknown project id {project_id}")))?;
        Ok(Some((end_ts, path)))
    }

    pub fn query_aggregate(&mut self, predicate: &DatePredicate) -> Result<AggregateResult, CoreError> {
        let aggregates = self.run_aggregate_query(predicate)?;
        let actual_days = self.run_actual_days_query(predicate)?;
        let total_duration = aggregates.iter().map(|r| r.duration_seconds).sum();
        Ok(AggregateResult { aggregates, actual_days, total_duration })
    }

    pub fn query_detailed(&mut self, predicate: &DatePredicate) -> Result<Vec<DetailedRow>, CoreError> {
        let sql = format!(
            "SELECT start, end, duration_seconds, project_id, activity_remark
             FROM time_records WHERE {} ORDER BY logical_id ASC",
            predicate.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = bind_and_query(&mut stmt, predicate, |row| {
            Ok(DetailedRow {
                start: row.get(0)?,
                end: row.get(1)?,
                duration_seconds: row.get(2)?,
                project_id: row.get(3)?,
                activity_remark: row.get(4)?,
            })
        })?;
        Ok(rows)
    }

    #[must_use]
    pub fn project_path_for(&self, project_id: i64) -> Option<String> {
        self.project_cache.path_string_for(project_id)
    }

    pub fn ensure_project_cache_loaded(&mut self) -> Result<(), CoreError> {
        self.project_cache.ensure_loaded(&self.conn)
    }

    pub fn project_roots(&mut self) -> Result<Vec<(i64, String)>, CoreError> {
        self.project_cache.roots(&self.conn)
    }

    /// All known `days.date` values in ascending order, used by
    /// `RunDataQuery` to enumerate years/months/days without loading the
    /// whole store into memory.
    pub fn distinct_dates(&self) -> Result<Vec<String>, CoreError> {
        let mut stmt = self.conn.prepare("SELECT date FROM days ORDER BY date ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn run_aggregate_query(&mut self, predicate: &DatePredicate) -> Result<Vec<AggregateRow>, CoreError> {
        let sql = format!(
            "SELECT project_id, sum(duration_seconds) FROM time_records
             WHERE {} GROUP BY project_id",
            predicate.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        bind_and_query(&mut stmt, predicate, |row| {
            Ok(AggregateRow { project_id: row.get(0)?, duration_seconds: row.get(1)? })
        })
    }

    fn run_actual_days_query(&mut self, predicate: &DatePredicate) -> Result<i64, CoreError> {
        let sql = format!(
            "SELECT count(distinct date) FROM time_records WHERE {}",
            predicate.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows: Vec<i64> = bind_and_query(&mut stmt, predicate, |row| row.get(0))?;
        Ok(rows.into_iter().next().unwrap_or(0))
    }
}

fn bind_and_query<T, F>(
    stmt: &mut rusqlite::Statement<'_>,
    predicate: &DatePredicate,
    mut row_fn: F,
) -> Result<Vec<T>, CoreError>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let rows = match predicate {
        DatePredicate::Day(d) => {
            stmt.query_map(params![d.format("%Y-%m-%d").to_string()], &mut row_fn)?
        }
        DatePredicate::MonthPrefix(m) => stmt.query_map(params![m], &mut row_fn)?,
        DatePredicate::YearPrefix(y) => stmt.query_map(params![y], &mut row_fn)?,
        DatePredicate::Range(s, e) => stmt.query_map(
            params![s.format("%Y-%m-%d").to_string(), e.format("%Y-%m-%d").to_string()],
            &mut row_fn,
        )?,
        DatePredicate::All => stmt.query_map(params![], &mut row_fn)?,
    };
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn insert_day(tx: &rusqlite::Transaction, day: &Day) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO days (date, year, month, status, sleep, remark, getup_time, exercise,
                            total_exercise_time, cardio_time, anaerobic_time, exercise_both_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            day.date.format("%Y-%m-%d").to_string(),
            day.date.year(),
            day.date.month(),
            day.status,
            day.sleep,
            day.remark,
            day.getup_time,
            day.exercise,
            day.total_exercise_time,
            day.cardio_time,
            day.anaerobic_time,
            day.exercise_both_time,
        ],
    )?;
    Ok(())
}

fn insert_time_record(
    tx: &rusqlite::Transaction,
    record: &PendingRecord,
    project_id: i64,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO time_records (logical_id, start_timestamp, end_timestamp, date, start, end,
                                    project_id, duration_seconds, activity_remark)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.logical_id,
            record.start_timestamp,
            record.end_timestamp,
            record.date.format("%Y-%m-%d").to_string(),
            record.start,
            record.end,
            project_id,
            record.duration_seconds,
            record.activity_remark,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyLog;

    fn sample_day(date: NaiveDate) -> Day {
        Day::from_daily_log(&DailyLog::new(date))
    }

    #[test]
    fn import_then_replace_month_only_touches_target_scope() {
        let mut repo = Repository::open_in_memory().unwrap();
        let jan1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let feb1 = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let days = vec![sample_day(jan1), sample_day(feb1)];
        let records = vec![
            PendingRecord {
                date: jan1,
                logical_id: 1,
                start_timestamp: 0,
                end_timestamp: 3600,
                start: "00:00".into(),
                end: "01:00".into(),
                project_path: "study_math".into(),
                duration_seconds: 3600,
                activity_remark: None,
            },
            PendingRecord {
                date: feb1,
                logical_id: 1,
                start_timestamp: 0,
                end_timestamp: 7200,
                start: "00:00".into(),
                end: "02:00".into(),
                project_path: "recreation".into(),
                duration_seconds: 7200,
                activity_remark: None,
            },
        ];
        repo.import_data(&days, &records).unwrap();

        let new_feb_day = sample_day(feb1);
        let new_feb_record = PendingRecord {
            date: feb1,
            logical_id: 1,
            start_timestamp: 0,
            end_timestamp: 1800,
            start: "00:00".into(),
            end: "00:30".into(),
            project_path: "recreation".into(),
            duration_seconds: 1800,
            activity_remark: None,
        };
        repo.replace_month(2026, 2, &[new_feb_day], &[new_feb_record]).unwrap();

        let jan_agg = repo.query_aggregate(&DatePredicate::MonthPrefix("2026-01".into())).unwrap();
        assert_eq!(jan_agg.total_duration, 3600);

        let feb_agg = repo.query_aggregate(&DatePredicate::MonthPrefix("2026-02".into())).unwrap();
        assert_eq!(feb_agg.total_duration, 1800);
    }
}
