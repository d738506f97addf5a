//! Command-line surface (spec section 12): a `clap`-derive `Args`/
//! `Subcommand` tree mapped 1:1 onto the facade operations (C12).
//!
//! Mirrors the teacher's flat `cli::Args` shape, generalized into a verb
//! tree since this pipeline exposes many more operations than the
//! teacher's single-report CLI did.

pub mod statistics;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::CoreError;
use crate::facade::{DataGranularity, ReportRequest};
use crate::reporting::Format;
use crate::validation::DateCheckMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personal time-tracking pipeline")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse raw daily logs into normalized day/activity records, without importing.
    Convert {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        save_processed: bool,
    },
    /// Convert then import in one pass.
    #[command(alias = "blink")]
    Ingest {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_name = "none|continuity|full")]
        date_check: Option<String>,
        #[arg(long)]
        save_processed: bool,
    },
    /// Import already-converted JSON day files.
    Import {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_name = "YYYY-MM")]
        replace_month: Option<String>,
    },
    /// Parse and report issues in raw daily logs without converting.
    ValidateStructure {
        #[arg(long)]
        input: PathBuf,
    },
    /// Check invariants (durations, contiguity, ordering) on converted days.
    ValidateLogic {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_name = "none|continuity|full")]
        date_check: Option<String>,
    },
    /// Render a single report.
    Query {
        #[command(subcommand)]
        kind: QueryCommand,
        #[arg(long, value_name = "text|markdown|latex|typst", default_value = "text")]
        format: String,
    },
    /// Render a report (or every registered format for "all-period") to a file.
    Export {
        #[command(subcommand)]
        kind: ExportCommand,
        #[arg(long, value_name = "text|markdown|latex|typst", default_value = "text")]
        format: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Inspect the project taxonomy.
    Tree {
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// List distinct calendar labels present in the store.
    Data {
        #[command(subcommand)]
        granularity: DataCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommand {
    Day { date: String },
    Month { year_month: String },
    Week { iso_week: String },
    Year { year: String },
    Period { days: u32 },
    Range { start: String, end: String },
}

impl QueryCommand {
    /// Converts to the facade's request DTO. `Range`'s dates are parsed
    /// eagerly here; a malformed date becomes an `InvalidArguments` error
    /// rather than a silent `ReportData::Invalid` (the latter is reserved
    /// for identifiers that parse syntactically but name nothing, e.g. an
    /// out-of-range ISO week).
    pub fn into_request(self) -> Result<ReportRequest, CoreError> {
        Ok(match self {
            QueryCommand::Day { date } => ReportRequest::Day(date),
            QueryCommand::Month { year_month } => ReportRequest::Month(year_month),
            QueryCommand::Week { iso_week } => ReportRequest::Week(iso_week),
            QueryCommand::Year { year } => ReportRequest::Year(year),
            QueryCommand::Period { days } => ReportRequest::Period(days),
            QueryCommand::Range { start, end } => {
                let start = parse_cli_date(&start)?;
                let end = parse_cli_date(&end)?;
                ReportRequest::Range(start, end)
            }
        })
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExportCommand {
    Day { date: String },
    Month { year_month: String },
    Week { iso_week: String },
    Year { year: String },
    Period { days: u32 },
    Range { start: String, end: String },
    /// Renders every registered `(kind, format)` pair for a batch of rolling
    /// periods in one call (the "export all periods" supplemented feature).
    AllPeriod { days: Vec<u32> },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum DataCommand {
    Years,
    Months,
    Days,
}

impl From<DataCommand> for DataGranularity {
    fn from(value: DataCommand) -> Self {
        match value {
            DataCommand::Years => DataGranularity::Years,
            DataCommand::Months => DataGranularity::Months,
            DataCommand::Days => DataGranularity::Days,
        }
    }
}

/// Parses `--format`; unknown values are an `InvalidArguments` error (exit
/// code 3 per spec section 6), not a silent fallback to `text`.
pub fn parse_format(s: &str) -> Result<Format, CoreError> {
    match s {
        "markdown" | "text" => Ok(Format::Markdown),
        "latex" => Ok(Format::Latex),
        "typst" => Ok(Format::Typst),
        other => Err(CoreError::InvalidArguments(format!("unknown format '{other}'"))),
    }
}

pub fn parse_date_check(s: Option<&str>) -> DateCheckMode {
    crate::facade::date_check_mode_from_str(s.unwrap_or("none"))
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CoreError::InvalidArguments(format!("invalid date '{s}'")))
}
