//! Core Facade (C12, spec section 4.12): the single surface every
//! front-end uses. Every operation catches all non-fatal failures and
//! converts them to a tagged result DTO; the facade never throws across
//! its public surface.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{error, instrument};

use crate::config::AppConfig;
use crate::domain::{Clock, ProjectTree};
use crate::error::CoreError;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::query::QueryService;
use crate::reporting::{Format, FormatterRegistry, ReportData, ReportKind};
use crate::storage::Repository;
use crate::validation::DateCheckMode;

#[derive(Debug, Clone)]
pub struct OperationAck {
    pub ok: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TextOutput {
    pub ok: bool,
    pub content: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub path: String,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TreeQueryResponse {
    pub ok: bool,
    pub found: bool,
    pub roots: Vec<String>,
    pub nodes: Vec<TreeNode>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StructuredReportOutput {
    pub ok: bool,
    pub kind: ReportKind,
    pub report: Option<ReportData>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PeriodBatchItem {
    pub days: u32,
    pub ok: bool,
    pub report: Option<ReportData>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StructuredPeriodBatchOutput {
    pub ok: bool,
    pub items: Vec<PeriodBatchItem>,
    pub error_message: Option<String>,
}

/// The facade owns no state of its own: it is a thin, error-converting
/// wrapper over the repository, formatter registry, and pipeline that
/// `bootstrap` (C13) wires together.
pub struct CoreFacade<'a> {
    pub config: &'a AppConfig,
    pub repository: &'a mut Repository,
    pub formatters: &'a FormatterRegistry,
    pub clock: Clock,
}

impl<'a> CoreFacade<'a> {
    #[instrument(skip(self, options))]
    pub fn run_convert(&mut self, options: PipelineOptions) -> OperationAck {
        self.run_pipeline_ack(options)
    }

    #[instrument(skip(self, options))]
    pub fn run_ingest(&mut self, options: PipelineOptions) -> OperationAck {
        self.run_pipeline_ack(options)
    }

    #[instrument(skip(self, options))]
    pub fn run_import(&mut self, options: PipelineOptions) -> OperationAck {
        self.run_pipeline_ack(options)
    }

    #[instrument(skip(self, options))]
    pub fn run_validate_structure(&mut self, options: PipelineOptions) -> OperationAck {
        self.run_pipeline_ack(options)
    }

    #[instrument(skip(self, options))]
    pub fn run_validate_logic(&mut self, options: PipelineOptions) -> OperationAck {
        self.run_pipeline_ack(options)
    }

    fn run_pipeline_ack(&mut self, options: PipelineOptions) -> OperationAck {
        let pipeline = Pipeline::new(self.config);
        match pipeline.run(&options, Some(self.repository)) {
            Ok(report) if report.ok => OperationAck { ok: true, error_message: None },
            Ok(report) => OperationAck {
                ok: false,
                error_message: Some(
                    report
                        .source_issues
                        .into_iter()
                        .chain(report.output_issues)
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
            },
            Err(e) => {
                error!(error = %e, "pipeline run failed");
                OperationAck { ok: false, error_message: Some(e.to_string()) }
            }
        }
    }

    #[instrument(skip(self))]
    pub fn run_report_query(&mut self, request: &ReportRequest, format: Format) -> TextOutput {
        match self.run_structured_report_query(request) {
            StructuredReportOutput { ok: true, report: Some(data), .. } => {
                match self.formatters.render(&data, format) {
                    Ok(content) => TextOutput { ok: true, content, error_message: None },
                    Err(e) => TextOutput { ok: false, content: String::new(), error_message: Some(e.to_string()) },
                }
            }
            StructuredReportOutput { error_message, .. } => {
                TextOutput { ok: false, content: String::new(), error_message }
            }
        }
    }

    #[instrument(skip(self))]
    pub fn run_structured_report_query(&mut self, request: &ReportRequest) -> StructuredReportOutput {
        let mut query = QueryService::new(self.repository, self.clock.clone());
        let result = match request {
            ReportRequest::Day(date) => query.query_daily(date),
            ReportRequest::Month(ym) => query.query_monthly(ym),
            ReportRequest::Week(iso) => query.query_weekly(iso),
            ReportRequest::Year(y) => query.query_yearly(y),
            ReportRequest::Period(n) => query.query_period(*n),
            ReportRequest::Range(s, e) => query.query_range(*s, *e),
        };
        match result {
            Ok(data) => StructuredReportOutput { ok: true, kind: data.kind(), report: Some(data), error_message: None },
            Err(e) => StructuredReportOutput { ok: false, kind: request.kind(), report: None, error_message: Some(e.to_string()) },
        }
    }

    #[instrument(skip(self, day_counts))]
    pub fn run_period_batch_query(&mut self, day_counts: &[u32], format: Format) -> StructuredPeriodBatchOutput {
        let structured = self.run_structured_period_batch_query(day_counts);
        let items = structured
            .items
            .into_iter()
            .map(|item| {
                if let Some(data) = &item.report {
                    match self.formatters.render(data, format) {
                        Ok(_) => item,
                        Err(e) => PeriodBatchItem { ok: false, error_message: Some(e.to_string()), ..item },
                    }
                } else {
                    item
                }
            })
            .collect();
        StructuredPeriodBatchOutput { ok: structured.ok, items, error_message: structured.error_message }
    }

    #[instrument(skip(self, day_counts))]
    pub fn run_structured_period_batch_query(&mut self, day_counts: &[u32]) -> StructuredPeriodBatchOutput {
        let mut items = Vec::with_capacity(day_counts.len());
        let mut all_ok = true;
        for &days in day_counts {
            let mut query = QueryService::new(self.repository, self.clock.clone());
            match query.query_period(days) {
                Ok(data) => items.push(PeriodBatchItem { days, ok: true, report: Some(data), error_message: None }),
                Err(e) => {
                    all_ok = false;
                    items.push(PeriodBatchItem { days, ok: false, report: None, error_message: Some(e.to_string()) });
                }
            }
        }
        StructuredPeriodBatchOutput { ok: all_ok, items, error_message: None }
    }

    /// "Export all periods" (SPEC_FULL.md section 11): for each requested
    /// rolling-period day-count, renders every `(Period, format)` pair the
    /// formatter registry declares, writing one file per count/format pair
    /// into `out_dir`. Unlike `run_period_batch_query`, the format is never
    /// caller-supplied: it iterates the registry's declared matrix.
    #[instrument(skip(self, day_counts, out_dir))]
    pub fn run_all_period_export(&mut self, day_counts: &[u32], out_dir: &PathBuf) -> OperationAck {
        let structured = self.run_structured_period_batch_query(day_counts);
        if !structured.ok {
            return OperationAck { ok: false, error_message: structured.error_message };
        }

        if let Err(e) = std::fs::create_dir_all(out_dir) {
            return OperationAck { ok: false, error_message: Some(CoreError::from(e).to_string()) };
        }

        let formats = self.formatters.formats_for(ReportKind::Period);
        for item in &structured.items {
            let Some(data) = &item.report else { continue };
            for format in &formats {
                match self.formatters.render(data, *format) {
                    Ok(content) => {
                        let path = out_dir.join(format!("period-{}-{}.txt", item.days, format));
                        if let Err(e) = std::fs::write(&path, content) {
                            return OperationAck { ok: false, error_message: Some(CoreError::from(e).to_string()) };
                        }
                    }
                    Err(e) => return OperationAck { ok: false, error_message: Some(e.to_string()) },
                }
            }
        }
        OperationAck { ok: true, error_message: None }
    }

    #[instrument(skip(self))]
    pub fn run_report_export(&mut self, request: &ReportRequest, format: Format, out_path: &PathBuf) -> OperationAck {
        let output = self.run_report_query(request, format);
        if !output.ok {
            return OperationAck { ok: false, error_message: output.error_message };
        }
        match std::fs::write(out_path, output.content) {
            Ok(()) => OperationAck { ok: true, error_message: None },
            Err(e) => OperationAck { ok: false, error_message: Some(CoreError::from(e).to_string()) },
        }
    }

    #[instrument(skip(self))]
    pub fn run_data_query(&mut self, granularity: DataGranularity) -> Vec<String> {
        let dates = self.repository.distinct_dates().unwrap_or_default();
        let slice_len = match granularity {
            DataGranularity::Years => 4,
            DataGranularity::Months => 7,
            DataGranularity::Days => 10,
        };
        let mut out: Vec<String> = dates.iter().map(|d| d[..slice_len].to_string()).collect();
        out.dedup();
        out
    }

    #[instrument(skip(self))]
    pub fn run_tree_query(&mut self, path: Option<&str>, max_depth: Option<usize>) -> TreeQueryResponse {
        if self.repository.ensure_project_cache_loaded().is_err() {
            return TreeQueryResponse {
                ok: false,
                error_message: Some("failed to load project cache".to_string()),
                ..Default::default()
            };
        }
        let roots: Vec<String> = match self.repository.project_roots() {
            Ok(roots) => roots.into_iter().map(|(_, name)| name).collect(),
            Err(e) => {
                return TreeQueryResponse { ok: false, error_message: Some(e.to_string()), ..Default::default() };
            }
        };

        let Some(path) = path else {
            return TreeQueryResponse { ok: true, found: true, roots, nodes: Vec::new(), error_message: None };
        };

        let tree = match self.build_full_tree() {
            Ok(tree) => tree,
            Err(e) => {
                return TreeQueryResponse { ok: false, error_message: Some(e.to_string()), ..Default::default() };
            }
        };

        let Some(subtree) = tree.find(path) else {
            return TreeQueryResponse { ok: true, found: false, roots, nodes: Vec::new(), error_message: None };
        };

        let mut nodes = vec![TreeNode { path: path.to_string(), duration_seconds: subtree.duration_seconds }];
        collect_nodes(subtree, path, max_depth.unwrap_or(usize::MAX), &mut nodes);
        TreeQueryResponse { ok: true, found: true, roots, nodes, error_message: None }
    }

    /// Builds the whole-store `ProjectTree` (no date restriction), used
    /// by `run_tree_query` to answer subtree lookups.
    fn build_full_tree(&mut self) -> Result<ProjectTree, CoreError> {
        self.repository.ensure_project_cache_loaded()?;
        let aggregate = self.repository.query_aggregate(&crate::storage::DatePredicate::All)?;
        let mut tree = ProjectTree::root();
        for row in &aggregate.aggregates {
            if let Some(path) = self.repository.project_path_for(row.project_id) {
                tree.insert_path(&path, row.duration_seconds);
            }
        }
        Ok(tree)
    }
}

fn collect_nodes(node: &ProjectTree, prefix: &str, max_depth: usize, out: &mut Vec<TreeNode>) {
    if max_depth == 0 {
        return;
    }
    for child in node.sorted_children() {
        let child_path = format!("{prefix}{}{}", crate::domain::PATH_SEPARATOR, child.name);
        out.push(TreeNode { path: child_path.clone(), duration_seconds: child.duration_seconds });
        collect_nodes(child, &child_path, max_depth - 1, out);
    }
}

/// Date check mode defaults carried from `commands.<cmd>` into a pipeline
/// run; exposed here so front-ends can build a `PipelineOptions` without
/// reaching into `config` directly.
#[must_use]
pub fn date_check_mode_from_str(s: &str) -> DateCheckMode {
    match s {
        "continuity" => DateCheckMode::Continuity,
        "full" => DateCheckMode::Full,
        _ => DateCheckMode::None,
    }
}

#[derive(Debug, Clone)]
pub enum ReportRequest {
    Day(String),
    Month(String),
    Week(String),
    Year(String),
    Period(u32),
    Range(NaiveDate, NaiveDate),
}

impl ReportRequest {
    #[must_use]
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRequest::Day(_) => ReportKind::Day,
            ReportRequest::Month(_) => ReportKind::Month,
            ReportRequest::Week(_) => ReportKind::Week,
            ReportRequest::Year(_) => ReportKind::Year,
            ReportRequest::Period(_) => ReportKind::Period,
            ReportRequest::Range(_, _) => ReportKind::Range,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DataGranularity {
    Years,
    Months,
    Days,
}
