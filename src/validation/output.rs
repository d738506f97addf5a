//! Output Validator (C5, spec section 4.5): post-conversion structural
//! checks on the normalized day vector.

use crate::domain::DailyLog;
use crate::error::{ValidationIssue, ValidationKind, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateCheckMode {
    #[default]
    None,
    Continuity,
    Full,
}

/// Sanity cap on a single activity's duration (spec section 9 design
/// notes, "no explicit limit ... adopt 16 hours"). Exceeding it is a
/// warning, not a hard failure: it is reported as `ValidationKind::Warning`,
/// which `ValidationReport::ok()` ignores.
pub const MAX_ACTIVITY_DURATION_SECONDS: i64 = 16 * 3600;

pub fn validate(days: &[DailyLog], mode: DateCheckMode) -> ValidationReport {
    let mut report = ValidationReport::new();

    for day in days {
        check_invariants_1_to_3(day, &mut report);
    }

    match mode {
        DateCheckMode::None => {}
        DateCheckMode::Continuity => check_continuity(days, &mut report),
        DateCheckMode::Full => {
            check_continuity(days, &mut report);
            check_no_duplicates_and_sorted(days, &mut report);
        }
    }

    report
}

fn check_invariants_1_to_3(day: &DailyLog, report: &mut ValidationReport) {
    let mut expected_logical_id = 1u32;
    let mut prev_end: Option<i64> = None;

    for activity in &day.processed_activities {
        if activity.duration_seconds <= 0 {
            report.push(ValidationIssue {
                line_number: None,
                message: format!(
                    "day {}: activity {} has non-positive duration",
                    day.date, activity.logical_id
                ),
                kind: ValidationKind::Logical,
            });
        }
        if activity.duration_seconds > MAX_ACTIVITY_DURATION_SECONDS {
            report.push(ValidationIssue {
                line_number: None,
                message: format!(
                    "day {}: activity {} exceeds the 16-hour sanity cap ({}s)",
                    day.date, activity.logical_id, activity.duration_seconds
                ),
                kind: ValidationKind::Warning,
            });
        }
        if activity.logical_id != expected_logical_id {
            report.push(ValidationIssue {
                line_number: None,
                message: format!(
                    "day {}: logical_id {} out of sequence, expected {}",
                    day.date, activity.logical_id, expected_logical_id
                ),
                kind: ValidationKind::Logical,
            });
        }
        expected_logical_id += 1;

        if let Some(prev) = prev_end {
            if activity.start_ts != prev {
                report.push(ValidationIssue {
                    line_number: None,
                    message: format!(
                        "day {}: activity {} does not start where the previous one ended",
                        day.date, activity.logical_id
                    ),
                    kind: ValidationKind::Logical,
                });
            }
        }
        prev_end = Some(activity.end_ts);
    }
}

fn check_continuity(days: &[DailyLog], report: &mut ValidationReport) {
    for pair in days.windows(2) {
        let expected = pair[0].date.succ_opt();
        if expected != Some(pair[1].date) {
            report.push(ValidationIssue {
                line_number: None,
                message: format!("gap between day {} and day {}", pair[0].date, pair[1].date),
                kind: ValidationKind::Logical,
            });
        }
    }
}

fn check_no_duplicates_and_sorted(days: &[DailyLog], report: &mut ValidationReport) {
    for pair in days.windows(2) {
        if pair[0].date >= pair[1].date {
            report.push(ValidationIssue {
                line_number: None,
                message: format!("days are not strictly sorted ascending at {} / {}", pair[0].date, pair[1].date),
                kind: ValidationKind::Logical,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::ProcessedActivity;

    fn day_with_activities(date: &str, activities: Vec<ProcessedActivity>) -> DailyLog {
        let mut log = DailyLog::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap());
        log.processed_activities = activities;
        log
    }

    fn activity(id: u32, start: i64, end: i64) -> ProcessedActivity {
        ProcessedActivity {
            logical_id: id,
            start_ts: start,
            end_ts: end,
            start_str: String::new(),
            end_str: String::new(),
            project_path: "study".into(),
            duration_seconds: end - start,
            remark: None,
        }
    }

    #[test]
    fn flags_non_contiguous_activities() {
        let day = day_with_activities("2026-02-01", vec![activity(1, 0, 100), activity(2, 200, 300)]);
        let report = validate(&[day], DateCheckMode::None);
        assert!(!report.ok());
    }

    #[test]
    fn accepts_contiguous_activities() {
        let day = day_with_activities("2026-02-01", vec![activity(1, 0, 100), activity(2, 100, 300)]);
        let report = validate(&[day], DateCheckMode::None);
        assert!(report.ok());
    }

    #[test]
    fn continuity_mode_flags_gaps() {
        let day1 = day_with_activities("2026-02-01", vec![activity(1, 0, 100)]);
        let day2 = day_with_activities("2026-02-03", vec![activity(1, 0, 100)]);
        let report = validate(&[day1, day2], DateCheckMode::Continuity);
        assert!(!report.ok());
    }
}
