//! Report DTOs, the formatter trait, and the formatter registry (C9, spec
//! sections 3, 4.9, 4.10).
//!
//! Grounded on the teacher's `reporting::Report` + `Formatter` split: a
//! closed DTO produced by the query layer, rendered by small pure
//! functions registered once at startup. The three concrete formatters
//! live in sibling modules.

mod latex;
mod markdown;
mod registry;
mod typst;

pub use registry::{FormatterRegistry, RegistryBuildError};

use std::fmt;

use crate::domain::ProjectTree;

/// The five user-facing report shapes, plus the internal `Range` variant
/// used for explicit start..end queries (spec section 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Day,
    Month,
    Week,
    Year,
    Period,
    Range,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportKind::Day => "day",
            ReportKind::Month => "month",
            ReportKind::Week => "week",
            ReportKind::Year => "year",
            ReportKind::Period => "period",
            ReportKind::Range => "range",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Markdown,
    Latex,
    Typst,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Markdown => "markdown",
            Format::Latex => "latex",
            Format::Typst => "typst",
        };
        f.write_str(s)
    }
}

/// A single detailed activity row, used by the daily report's
/// "detailed activities" section (spec section 4.8 point 3).
#[derive(Debug, Clone)]
pub struct DetailedRecord {
    pub start_str: String,
    pub end_str: String,
    pub duration_seconds: i64,
    pub project_path: String,
    pub remark: Option<String>,
}

/// A flat `(project_path, duration)` row prior to tree rollup.
#[derive(Debug, Clone)]
pub struct ProjectDuration {
    pub project_path: String,
    pub duration_seconds: i64,
}

/// Aggregate category stats carried alongside a report, mirroring `Day`'s
/// per-category buckets for periods wider than a single day.
#[derive(Debug, Clone, Default)]
pub struct ReportStats {
    pub sleep_total_time: i64,
    pub total_exercise_time: i64,
    pub total_study_time: i64,
}

/// Common fields every non-invalid, non-empty report carries.
#[derive(Debug, Clone)]
pub struct ReportBody {
    pub total_duration: i64,
    pub actual_days: i64,
    pub records: Vec<ProjectDuration>,
    pub project_tree: ProjectTree,
    pub stats: ReportStats,
    pub detailed_records: Vec<DetailedRecord>,
}

impl ReportBody {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_duration == 0
    }
}

/// The closed sum type every query returns (spec section 3, REDESIGN
/// FLAGS: "variant report payloads"). `Invalid` is a first-class state,
/// not an error: callers pass malformed identifiers through unchanged.
#[derive(Debug, Clone)]
pub enum ReportData {
    Daily { date: String, body: ReportBody },
    Monthly { year_month: String, body: ReportBody },
    Weekly { iso_week: String, body: ReportBody },
    Yearly { year: String, body: ReportBody },
    Period { days_to_query: u32, start_date: String, end_date: String, body: ReportBody },
    Range { start_date: String, end_date: String, body: ReportBody },
    Invalid { kind: ReportKind, identifier: String },
}

impl ReportData {
    #[must_use]
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportData::Daily { .. } => ReportKind::Day,
            ReportData::Monthly { .. } => ReportKind::Month,
            ReportData::Weekly { .. } => ReportKind::Week,
            ReportData::Yearly { .. } => ReportKind::Year,
            ReportData::Period { .. } => ReportKind::Period,
            ReportData::Range { .. } => ReportKind::Range,
            ReportData::Invalid { kind, .. } => *kind,
        }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, ReportData::Invalid { .. })
    }

    #[must_use]
    pub fn body(&self) -> Option<&ReportBody> {
        match self {
            ReportData::Daily { body, .. }
            | ReportData::Monthly { body, .. }
            | ReportData::Weekly { body, .. }
            | ReportData::Yearly { body, .. }
            | ReportData::Period { body, .. }
            | ReportData::Range { body, .. } => Some(body),
            ReportData::Invalid { .. } => None,
        }
    }
}

/// A pure rendering function for one format (spec section 4.10).
pub trait Formatter: Send + Sync {
    fn render(&self, data: &ReportData) -> String;
}

pub(crate) const NO_RECORDS_SENTENCE: &str = "No records for this period.";
pub(crate) const INVALID_SENTENCE: &str = "Invalid query.";

pub(crate) fn format_hm(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

/// Renders a duration alongside its per-day average, used for `Period`
/// reports where `actual_days` is the averaging divisor (spec section 4.8
/// point 4).
pub(crate) fn format_hm_with_average(seconds: i64, actual_days: i64) -> String {
    if actual_days > 0 {
        format!("{} (avg {}/day)", format_hm(seconds), format_hm(seconds / actual_days))
    } else {
        format_hm(seconds)
    }
}

pub(crate) fn escape_latex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
