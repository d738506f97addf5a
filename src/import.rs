//! Import Service (C7, spec section 4.7): orchestrates parse -> aggregate
//! -> repository insert, with timing and failure stats.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::domain::{ConvertedDay, Day, DailyLog};
use crate::error::CoreError;
use crate::storage::{PendingRecord, Repository};

#[derive(Debug, Clone, Default)]
pub struct ImportStats {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub parse_duration_ms: u128,
    pub insert_duration_ms: u128,
    pub db_open_success: bool,
    pub transaction_success: bool,
    pub replaced_month: Option<String>,
    pub error_message: Option<String>,
}

pub struct ImportService<'a> {
    repository: &'a mut Repository,
}

impl<'a> ImportService<'a> {
    pub fn new(repository: &'a mut Repository) -> Self {
        Self { repository }
    }

    /// Parses each JSON-encoded month file, concatenates across files,
    /// then imports in append mode (or replace-month mode when exactly
    /// one target `YYYY-MM` is given).
    pub fn import_from_files(
        &mut self,
        paths: &[impl AsRef<Path>],
        replace_target: Option<(i32, u32)>,
    ) -> ImportStats {
        let mut stats = ImportStats { total_files: paths.len(), db_open_success: true, ..Default::default() };
        let parse_start = Instant::now();

        let mut days: Vec<Day> = Vec::new();
        let mut records: Vec<PendingRecord> = Vec::new();

        for path in paths {
            match parse_month_file(path.as_ref()) {
                Ok((mut d, mut r)) => {
                    stats.successful_files += 1;
                    days.append(&mut d);
                    records.append(&mut r);
                }
                Err(e) => {
                    stats.failed_files += 1;
                    warn!(path = %path.as_ref().display(), error = %e, "failed to parse converted-day file");
                }
            }
        }
        stats.parse_duration_ms = parse_start.elapsed().as_millis();

        let insert_start = Instant::now();
        let result = match replace_target {
            Some((year, month)) => {
                stats.replaced_month = Some(format!("{year:04}-{month:02}"));
                self.repository.replace_month(year, month, &days, &records)
            }
            None => self.repository.import_data(&days, &records),
        };
        stats.insert_duration_ms = insert_start.elapsed().as_millis();

        match result {
            Ok(()) => {
                stats.transaction_success = true;
                info!(files = stats.total_files, days = days.len(), "import completed");
            }
            Err(e) => {
                stats.transaction_success = false;
                stats.error_message = Some(e.to_string());
            }
        }

        stats
    }

    /// Bypasses file IO: flattens already-converted `DailyLog`s (grouped
    /// by `YYYY-MM`) using the same day/record adapter `import_from_files`
    /// uses, then imports.
    pub fn import_from_memory(
        &mut self,
        processed: &HashMap<String, Vec<DailyLog>>,
        replace_target: Option<(i32, u32)>,
    ) -> ImportStats {
        let mut stats = ImportStats { db_open_success: true, ..Default::default() };
        let parse_start = Instant::now();

        let mut days = Vec::new();
        let mut records = Vec::new();
        for month_logs in processed.values() {
            for log in month_logs {
                let (d, mut r) = daily_log_to_rows(log);
                days.push(d);
                records.append(&mut r);
            }
        }
        stats.parse_duration_ms = parse_start.elapsed().as_millis();

        let insert_start = Instant::now();
        let result = match replace_target {
            Some((year, month)) => {
                stats.replaced_month = Some(format!("{year:04}-{month:02}"));
                self.repository.replace_month(year, month, &days, &records)
            }
            None => self.repository.import_data(&days, &records),
        };
        stats.insert_duration_ms = insert_start.elapsed().as_millis();

        match result {
            Ok(()) => stats.transaction_success = true,
            Err(e) => {
                stats.transaction_success = false;
                stats.error_message = Some(e.to_string());
            }
        }
        stats
    }
}

fn parse_month_file(path: &Path) -> Result<(Vec<Day>, Vec<PendingRecord>), CoreError> {
    let raw = fs::read_to_string(path)?;
    let converted: Vec<ConvertedDay> = serde_json::from_str(&raw)?;

    let mut days = Vec::with_capacity(converted.len());
    let mut records = Vec::new();
    for day in &converted {
        let date = crate::domain::calendar::parse_date(&day.headers.date)?;
        days.push(converted_day_to_day(date, day));
        for activity in &day.activities {
            records.push(PendingRecord {
                date,
                logical_id: activity.logical_id,
                start_timestamp: activity.start_timestamp,
                end_timestamp: activity.end_timestamp,
                start: activity.start_time.clone(),
                end: activity.end_time.clone(),
                project_path: activity.activity.project_path.clone(),
                duration_seconds: activity.duration_seconds,
                activity_remark: activity.activity_remark.clone(),
            });
        }
    }
    Ok((days, records))
}

fn converted_day_to_day(date: chrono::NaiveDate, converted: &ConvertedDay) -> Day {
    use chrono::Datelike;
    let s = &converted.generated_stats;
    Day {
        date,
        year: date.year(),
        month: date.month(),
        status: converted.headers.status != 0,
        sleep: converted.headers.sleep != 0,
        remark: converted.headers.remark.clone(),
        getup_time: if converted.headers.getup == "Null" { None } else { Some(converted.headers.getup.clone()) },
        exercise: converted.headers.exercise != 0,
        total_exercise_time: s.total_exercise_time,
        cardio_time: s.cardio_time,
        anaerobic_time: s.anaerobic_time,
        exercise_both_time: 0,
        activity_count: converted.headers.activity_count,
        stats: crate::domain::DayStats {
            sleep_night_time: s.sleep_night_time,
            sleep_day_time: s.sleep_day_time,
            total_exercise_time: s.total_exercise_time,
            cardio_time: s.cardio_time,
            anaerobic_time: s.anaerobic_time,
            exercise_both_time: 0,
            grooming_time: s.grooming_time,
            toilet_time: s.toilet_time,
            gaming_time: s.gaming_time,
            recreation_time: s.recreation_time,
            recreation_zhihu_time: s.recreation_zhihu_time,
            recreation_bilibili_time: s.recreation_bilibili_time,
            recreation_douyin_time: s.recreation_douyin_time,
            total_study_time: s.total_study_time,
        },
    }
}

fn daily_log_to_rows(log: &DailyLog) -> (Day, Vec<PendingRecord>) {
    let day = Day::from_daily_log(log);
    let records = log
        .processed_activities
        .iter()
        .map(|activity| PendingRecord {
            date: log.date,
            logical_id: activity.logical_id,
            start_timestamp: activity.start_ts,
            end_timestamp: activity.end_ts,
            start: activity.start_str.clone(),
            end: activity.end_str.clone(),
            project_path: activity.project_path.clone(),
            duration_seconds: activity.duration_seconds,
            activity_remark: activity.remark.clone(),
        })
        .collect();
    (day, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn import_from_memory_round_trips_a_single_day() {
        let mut repo = Repository::open_in_memory().unwrap();
        let mut log = DailyLog::new(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        log.processed_activities.push(crate::domain::ProcessedActivity {
            logical_id: 1,
            start_ts: 0,
            end_ts: 3600,
            start_str: "00:00".into(),
            end_str: "01:00".into(),
            project_path: "study_math".into(),
            duration_seconds: 3600,
            remark: None,
        });

        let mut processed = HashMap::new();
        processed.insert("2026-02".to_string(), vec![log]);

        let mut service = ImportService::new(&mut repo);
        let stats = service.import_from_memory(&processed, None);
        assert!(stats.transaction_success);
    }
}
