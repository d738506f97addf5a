//! Query Service (C8, spec section 4.8): turns a period request into a
//! `ReportData` DTO via the repository's aggregation SQL plus a
//! project-tree rollup through the path cache.

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::{calendar, Clock, ProjectTree};
use crate::error::CoreError;
use crate::reporting::{DetailedRecord, ProjectDuration, ReportBody, ReportData, ReportKind, ReportStats};
use crate::storage::{DatePredicate, Repository};

pub struct QueryService<'a> {
    repository: &'a mut Repository,
    clock: Clock,
}

impl<'a> QueryService<'a> {
    pub fn new(repository: &'a mut Repository, clock: Clock) -> Self {
        Self { repository, clock }
    }

    #[instrument(skip(self))]
    pub fn query_daily(&mut self, date: &str) -> Result<ReportData, CoreError> {
        let Ok(date) = calendar::parse_date(date) else {
            return Ok(ReportData::Invalid { kind: ReportKind::Day, identifier: date.to_string() });
        };
        let predicate = DatePredicate::Day(date);
        let body = self.build_body(&predicate, true)?;
        Ok(ReportData::Daily { date: calendar::format_date(date), body })
    }

    #[instrument(skip(self))]
    pub fn query_monthly(&mut self, year_month: &str) -> Result<ReportData, CoreError> {
        let Ok(_) = calendar::parse_month(year_month) else {
            return Ok(ReportData::Invalid { kind: ReportKind::Month, identifier: year_month.to_string() });
        };
        let predicate = DatePredicate::MonthPrefix(year_month.to_string());
        let body = self.build_body(&predicate, false)?;
        Ok(ReportData::Monthly { year_month: year_month.to_string(), body })
    }

    #[instrument(skip(self))]
    pub fn query_weekly(&mut self, iso_week: &str) -> Result<ReportData, CoreError> {
        let Ok((start, end)) = calendar::parse_iso_week(iso_week) else {
            return Ok(ReportData::Invalid { kind: ReportKind::Week, identifier: iso_week.to_string() });
        };
        let predicate = DatePredicate::Range(start, end);
        let body = self.build_body(&predicate, false)?;
        Ok(ReportData::Weekly { iso_week: iso_week.to_string(), body })
    }

    #[instrument(skip(self))]
    pub fn query_yearly(&mut self, year: &str) -> Result<ReportData, CoreError> {
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Ok(ReportData::Invalid { kind: ReportKind::Year, identifier: year.to_string() });
        }
        let predicate = DatePredicate::YearPrefix(year.to_string());
        let body = self.build_body(&predicate, false)?;
        Ok(ReportData::Yearly { year: year.to_string(), body })
    }

    #[instrument(skip(self))]
    pub fn query_period(&mut self, days_to_query: u32) -> Result<ReportData, CoreError> {
        if days_to_query == 0 {
            return Ok(ReportData::Invalid { kind: ReportKind::Period, identifier: days_to_query.to_string() });
        }
        let today = self.clock.today();
        let (start, end) = calendar::last_n_days(today, days_to_query);
        let predicate = DatePredicate::Range(start, end);
        let body = self.build_body(&predicate, false)?;
        Ok(ReportData::Period {
            days_to_query,
            start_date: calendar::format_date(start),
            end_date: calendar::format_date(end),
            body,
        })
    }

    #[instrument(skip(self))]
    pub fn query_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<ReportData, CoreError> {
        if start > end {
            return Ok(ReportData::Invalid {
                kind: ReportKind::Range,
                identifier: format!("{start}..{end}"),
            });
        }
        let predicate = DatePredicate::Range(start, end);
        let body = self.build_body(&predicate, false)?;
        Ok(ReportData::Range {
            start_date: calendar::format_date(start),
            end_date: calendar::format_date(end),
            body,
        })
    }

    fn build_body(&mut self, predicate: &DatePredicate, with_detail: bool) -> Result<ReportBody, CoreError> {
        self.repository.ensure_project_cache_loaded()?;
        let aggregate = self.repository.query_aggregate(predicate)?;

        let mut tree = ProjectTree::root();
        let mut records = Vec::with_capacity(aggregate.aggregates.len());
        let mut stats = ReportStats::default();
        for row in &aggregate.aggregates {
            let path = self
                .repository
                .project_path_for(row.project_id)
                .ok_or_else(|| CoreError::Logic(format!("unknown project id {}", row.project_id)))?;
            tree.insert_path(&path, row.duration_seconds);
            match path.split(crate::domain::PATH_SEPARATOR).next().unwrap_or(&path) {
                "sleep" | "nap" => stats.sleep_total_time += row.duration_seconds,
                "exercise" => stats.total_exercise_time += row.duration_seconds,
                "study" => stats.total_study_time += row.duration_seconds,
                _ => {}
            }
            records.push(ProjectDuration { project_path: path, duration_seconds: row.duration_seconds });
        }

        let detailed_records = if with_detail {
            self.repository
                .query_detailed(predicate)?
                .into_iter()
                .map(|row| {
                    let path = self.repository.project_path_for(row.project_id).unwrap_or_default();
                    DetailedRecord {
                        start_str: row.start,
                        end_str: row.end,
                        duration_seconds: row.duration_seconds,
                        project_path: path,
                        remark: row.activity_remark,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(ReportBody {
            total_duration: aggregate.total_duration,
            actual_days: aggregate.actual_days,
            records,
            project_tree: tree,
            stats,
            detailed_records,
        })
    }
}
