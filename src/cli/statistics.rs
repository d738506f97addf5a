//! Per-flag CLI usage statistics (SPEC_FULL section 11): a JSONL record of
//! which flags were used on each invocation, appended to `stats.jsonl`.
//!
//! Adapted from the teacher's `cli::statistics` module to this crate's verb
//! tree; the record shape and storage convention (`$TT_STATS_DIR` or
//! `$HOME/.time-tracker/stats.jsonl`) are unchanged.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRecord {
    pub timestamp: String,
    pub command: String,
    pub flags_used: Vec<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagStat {
    pub name: String,
    pub count: u32,
    pub success_count: u32,
    pub failure_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagStatistics {
    pub flags: Vec<FlagStat>,
    pub total_executions: u32,
    pub successful_executions: u32,
    pub failed_executions: u32,
}

pub struct StatisticsCollector;

impl StatisticsCollector {
    #[must_use]
    pub fn from_command(command: &Command) -> StatRecord {
        let (name, flags_used) = describe(command);
        StatRecord {
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            command: name,
            flags_used,
            success: true,
            error_type: None,
        }
    }

    #[must_use]
    pub fn with_failure(mut record: StatRecord, error_type: String) -> StatRecord {
        record.success = false;
        record.error_type = Some(error_type);
        record
    }
}

fn describe(command: &Command) -> (String, Vec<String>) {
    let mut flags = Vec::new();
    let name = match command {
        Command::Convert { save_processed, .. } => {
            if *save_processed {
                flags.push("save-processed".to_string());
            }
            "convert"
        }
        Command::Ingest { date_check, save_processed, .. } => {
            if date_check.is_some() {
                flags.push("date-check".to_string());
            }
            if *save_processed {
                flags.push("save-processed".to_string());
            }
            "ingest"
        }
        Command::Import { replace_month, .. } => {
            if replace_month.is_some() {
                flags.push("replace-month".to_string());
            }
            "import"
        }
        Command::ValidateStructure { .. } => "validate-structure",
        Command::ValidateLogic { date_check, .. } => {
            if date_check.is_some() {
                flags.push("date-check".to_string());
            }
            "validate-logic"
        }
        Command::Query { format, .. } => {
            if format != "text" {
                flags.push("format".to_string());
            }
            "query"
        }
        Command::Export { format, .. } => {
            if format != "text" {
                flags.push("format".to_string());
            }
            "export"
        }
        Command::Tree { path, max_depth } => {
            if path.is_some() {
                flags.push("path".to_string());
            }
            if max_depth.is_some() {
                flags.push("max-depth".to_string());
            }
            "tree"
        }
        Command::Data { .. } => "data",
    };
    (name.to_string(), flags)
}

pub fn write_stat_record(record: &StatRecord) -> std::io::Result<()> {
    let stats_dir = get_stats_dir();
    fs::create_dir_all(&stats_dir)?;

    let stats_file = stats_dir.join("stats.jsonl");
    let json_line = serde_json::to_string(record)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut content = if stats_file.exists() { fs::read_to_string(&stats_file)? } else { String::new() };

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&json_line);
    content.push('\n');

    fs::write(&stats_file, content)
}

fn get_stats_dir() -> PathBuf {
    if let Ok(stats_dir) = std::env::var("TT_STATS_DIR") {
        PathBuf::from(stats_dir)
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".time-tracker")
    }
}

#[must_use]
pub fn read_flag_statistics() -> FlagStatistics {
    let stats_file = get_stats_dir().join("stats.jsonl");
    let default = FlagStatistics { flags: Vec::new(), total_executions: 0, successful_executions: 0, failed_executions: 0 };

    let Ok(content) = fs::read_to_string(&stats_file) else {
        return default;
    };

    let mut flag_counts: HashMap<String, (u32, u32, u32)> = HashMap::new();
    let mut total = 0;
    let mut successful = 0;
    let mut failed = 0;

    for line in content.lines() {
        if line.is_empty() {
            continue;
        }
        let Ok(record) = serde_json::from_str::<StatRecord>(line) else { continue };
        total += 1;
        if record.success {
            successful += 1;
        } else {
            failed += 1;
        }
        for flag in &record.flags_used {
            let entry = flag_counts.entry(flag.clone()).or_insert((0, 0, 0));
            entry.0 += 1;
            if record.success {
                entry.1 += 1;
            } else {
                entry.2 += 1;
            }
        }
    }

    let mut flags: Vec<FlagStat> = flag_counts
        .into_iter()
        .map(|(name, (count, success_count, failure_count))| FlagStat { name, count, success_count, failure_count })
        .collect();
    flags.sort_by(|a, b| b.count.cmp(&a.count));

    FlagStatistics { flags, total_executions: total, successful_executions: successful, failed_executions: failed }
}
