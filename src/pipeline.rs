//! Pipeline Orchestrator (C11, spec section 4.11): collect -> validate
//! source -> convert -> validate output -> optional import.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::convert;
use crate::domain::{calendar, ConvertedDay, DailyLog};
use crate::error::CoreError;
use crate::import::{ImportService, ImportStats};
use crate::storage::Repository;
use crate::validation::{self, DateCheckMode};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub validate_source: bool,
    pub convert: bool,
    pub validate_output: bool,
    pub import: bool,
    pub save_processed_output: bool,
    pub date_check_mode: DateCheckMode,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub replace_target: Option<(i32, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub source_files: Vec<PathBuf>,
    pub generated_files: Vec<PathBuf>,
    pub source_issues: Vec<String>,
    pub output_issues: Vec<String>,
    pub import_stats: Option<ImportStats>,
    pub ok: bool,
}

pub struct Pipeline<'a> {
    config: &'a AppConfig,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, options, repository))]
    pub fn run(
        &self,
        options: &PipelineOptions,
        repository: Option<&mut Repository>,
    ) -> Result<PipelineReport, CoreError> {
        let mut report = PipelineReport { ok: true, ..Default::default() };

        let extension = if options.convert || options.validate_source { "txt" } else { "json" };
        report.source_files = collect_files(&options.input_root, extension)?;

        let mut processed: HashMap<String, Vec<DailyLog>> = HashMap::new();

        if options.validate_source || options.convert {
            let mut tail = None;
            for file in &report.source_files {
                let text = fs::read_to_string(file)?;
                let (blocks, validation_report) = validation::parse_and_validate(&text, &self.config.interval);
                if !validation_report.ok() {
                    for issue in validation_report.issues() {
                        report.source_issues.push(issue.to_string());
                    }
                    if options.validate_source && !options.convert {
                        report.ok = false;
                        continue;
                    }
                }

                if options.convert {
                    let days = convert::convert(&blocks, &self.config.interval, tail.clone())?;
                    if let Some(last) = days.last() {
                        tail = last.last_end_ts().zip(last.processed_activities.last().map(|a| a.project_path.clone()));
                    }
                    for day in days {
                        let key = calendar::month_prefix(day.date);
                        processed.entry(key).or_default().push(day);
                    }
                }
            }
        }

        if options.convert && options.save_processed_output {
            for (year_month, days) in &processed {
                let year = &year_month[0..4];
                let out_dir = options.output_root.join("Processed_Date").join(year);
                fs::create_dir_all(&out_dir)?;
                let out_path = out_dir.join(format!("{year_month}.json"));
                let converted: Vec<ConvertedDay> = days.iter().map(ConvertedDay::from_daily_log).collect();
                fs::write(&out_path, serde_json::to_string_pretty(&converted)?)?;
                report.generated_files.push(out_path);
            }
        }

        if options.validate_output {
            for days in processed.values() {
                let validation_report = validation::validate_output(days, options.date_check_mode);
                for issue in validation_report.issues() {
                    report.output_issues.push(issue.to_string());
                }
                if !validation_report.ok() {
                    report.ok = false;
                }
            }
        }

        if options.import {
            let Some(repository) = repository else {
                return Err(CoreError::Logic("import requested without an open repository".into()));
            };
            let mut import_service = ImportService::new(repository);
            if options.convert {
                if !options.validate_output || report.ok {
                    let stats = import_service.import_from_memory(&processed, options.replace_target);
                    report.ok = report.ok && stats.transaction_success;
                    report.import_stats = Some(stats);
                } else {
                    // converted in memory but failed output validation: the source
                    // files are raw `.txt`, not importable JSON, so there is no
                    // valid fallback. Skip the import rather than feed bad data in.
                    report.ok = false;
                }
            } else {
                let stats = import_service.import_from_files(&report.source_files, options.replace_target);
                report.ok = report.ok && stats.transaction_success;
                report.import_stats = Some(stats);
            }
        }

        info!(ok = report.ok, files = report.source_files.len(), "pipeline run finished");
        Ok(report)
    }
}

fn collect_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, CoreError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
