//! End-to-end acceptance scenarios from the spec's worked examples and
//! properties (P4, P5, P6, P7, P8; scenarios 3-6). Scenarios 1 and 2
//! (simple day, midnight crossing) are covered at the converter's own
//! unit-test level in `src/convert.rs`; replace-month idempotence (P5,
//! scenario 3) is covered in `src/storage/mod.rs`.

use chrono::NaiveDate;

use time_tracker_core::domain::Clock;
use time_tracker_core::facade::{CoreFacade, ReportRequest};
use time_tracker_core::reporting::{Format, ReportData};
use time_tracker_core::storage::Repository;

use crate::common::{app_config, seed, single_activity_day};

/// Scenario 4 (range query) + P6 (rollup): seven days each carrying one
/// hour under `study_math`; querying `2026-01-30..2026-02-02` picks up
/// exactly the four days within range.
#[test]
fn range_query_sums_only_the_requested_days() {
    let mut repo = Repository::open_in_memory().unwrap();
    let days = [
        "2026-01-28", "2026-01-29", "2026-01-30", "2026-01-31", "2026-02-01", "2026-02-02", "2026-02-03",
    ]
    .iter()
    .map(|d| single_activity_day(d, "study_math", 3600))
    .collect();
    seed(&mut repo, days);

    let config = app_config(&[]);
    let formatters = time_tracker_core::reporting::FormatterRegistry::from_declared(&[]);
    let mut facade = CoreFacade { config: &config, repository: &mut repo, formatters: &formatters, clock: Clock::system() };

    let start = NaiveDate::parse_from_str("2026-01-30", "%Y-%m-%d").unwrap();
    let end = NaiveDate::parse_from_str("2026-02-02", "%Y-%m-%d").unwrap();
    let output = facade.run_structured_report_query(&ReportRequest::Range(start, end));
    assert!(output.ok);
    let ReportData::Range { body, .. } = output.report.unwrap() else {
        panic!("expected a Range report");
    };
    assert_eq!(body.actual_days, 4);
    assert_eq!(body.total_duration, 4 * 3600);

    let study = body.project_tree.find("study").expect("study root present");
    assert_eq!(study.duration_seconds, 4 * 3600);
}

/// Scenario 5 (tree query): `study { math { calc }, cs }`; `max_depth=1`
/// returns `math` and `cs` but omits the `calc` grandchild.
#[test]
fn tree_query_respects_max_depth() {
    let mut repo = Repository::open_in_memory().unwrap();
    let days = vec![
        single_activity_day("2026-03-01", "study_math_calc", 1800),
        single_activity_day("2026-03-02", "study_cs", 3600),
    ];
    seed(&mut repo, days);

    let config = app_config(&[]);
    let formatters = time_tracker_core::reporting::FormatterRegistry::from_declared(&[]);
    let mut facade = CoreFacade { config: &config, repository: &mut repo, formatters: &formatters, clock: Clock::system() };

    let response = facade.run_tree_query(Some("study"), Some(1));
    assert!(response.ok);
    assert!(response.found);
    let names: Vec<&str> = response.nodes.iter().map(|n| n.path.as_str()).collect();
    assert!(names.contains(&"study_math"));
    assert!(names.contains(&"study_cs"));
    assert!(!names.contains(&"study_math_calc"));
}

/// Scenario 6 + P8: a bundle that only declares `Day`/`Markdown` must
/// report `FormatterMissing`, not crash, when asked for `Day`/`LaTeX`.
#[test]
fn missing_formatter_is_reported_not_crashed() {
    let mut repo = Repository::open_in_memory().unwrap();
    seed(&mut repo, vec![single_activity_day("2026-04-01", "study_math", 3600)]);

    let declared = vec![(time_tracker_core::reporting::ReportKind::Day, Format::Markdown)];
    let config = app_config(&declared);
    let formatters = time_tracker_core::reporting::FormatterRegistry::from_declared(&config.declared_formatters);
    let mut facade = CoreFacade { config: &config, repository: &mut repo, formatters: &formatters, clock: Clock::system() };

    let output = facade.run_report_query(&ReportRequest::Day("2026-04-01".to_string()), Format::Latex);
    assert!(!output.ok);
    assert!(output.error_message.unwrap().contains("formatter missing"));

    let ok_output = facade.run_report_query(&ReportRequest::Day("2026-04-01".to_string()), Format::Markdown);
    assert!(ok_output.ok);
    assert!(ok_output.content.contains("study"));
}

/// P7 (ordering): siblings render in descending duration, ties broken by
/// ascending name.
#[test]
fn sibling_projects_sort_by_duration_then_name() {
    let mut repo = Repository::open_in_memory().unwrap();
    let mut a = single_activity_day("2026-05-01", "study_cs", 1800);
    a.processed_activities.push(time_tracker_core::domain::ProcessedActivity {
        logical_id: 2,
        start_ts: a.processed_activities[0].end_ts,
        end_ts: a.processed_activities[0].end_ts + 1800,
        start_str: "00:30".to_string(),
        end_str: "01:00".to_string(),
        project_path: "study_math".to_string(),
        duration_seconds: 1800,
        remark: None,
    });
    seed(&mut repo, vec![a]);

    let config = app_config(&[]);
    let formatters = time_tracker_core::reporting::FormatterRegistry::from_declared(&[]);
    let mut facade = CoreFacade { config: &config, repository: &mut repo, formatters: &formatters, clock: Clock::system() };

    let output = facade.run_structured_report_query(&ReportRequest::Day("2026-05-01".to_string()));
    assert!(output.ok);
    let ReportData::Daily { body, .. } = output.report.unwrap() else {
        panic!("expected a Daily report");
    };
    let study = body.project_tree.find("study").expect("study root present");
    let names: Vec<&str> = study.sorted_children().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["cs", "math"], "equal-duration siblings should sort alphabetically, got {names:?}");
}

/// P4 (roundtrip): convert -> serialize JSON -> parse -> import -> query
/// yields a total duration equal to the day's processed activity sum.
#[test]
fn json_roundtrip_preserves_total_duration() {
    use time_tracker_core::domain::ConvertedDay;

    let day = single_activity_day("2026-06-01", "study_math", 5400);
    let converted = ConvertedDay::from_daily_log(&day);
    let json = serde_json::to_string(&converted).unwrap();
    let parsed_back: ConvertedDay = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed_back.activities.len(), 1);
    assert_eq!(parsed_back.activities[0].duration_seconds, 5400);

    let mut repo = Repository::open_in_memory().unwrap();
    seed(&mut repo, vec![day]);

    let config = app_config(&[]);
    let formatters = time_tracker_core::reporting::FormatterRegistry::from_declared(&[]);
    let mut facade = CoreFacade { config: &config, repository: &mut repo, formatters: &formatters, clock: Clock::system() };
    let output = facade.run_structured_report_query(&ReportRequest::Day("2026-06-01".to_string()));
    assert!(output.ok);
    let ReportData::Daily { body, .. } = output.report.unwrap() else {
        panic!("expected a Daily report");
    };
    assert_eq!(body.total_duration, 5400);
}
