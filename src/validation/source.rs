//! Source Validator (C3, spec section 4.3).
//!
//! Parses raw text into day blocks while accumulating structural/logical
//! issues. Never fails with `Result::Err`: callers read `ValidationReport`
//! to decide whether to proceed. The same parse also produces the
//! `RawDayBlock`s the converter (C4) consumes, so the pipeline only walks
//! the raw text once.

use chrono::NaiveDate;

use crate::config::IntervalConfig;
use crate::domain::RawEvent;
use crate::error::{ValidationIssue, ValidationKind, ValidationReport};

/// One day's worth of unconverted lines: a header date plus its ordered
/// raw events and day-level remark lines.
#[derive(Debug, Clone)]
pub struct RawDayBlock {
    pub date: NaiveDate,
    pub events: Vec<RawEvent>,
    pub day_remarks: Vec<String>,
}

/// Parses `text` into day blocks and validates it in the same pass
/// (spec section 4.3). Returns the best-effort blocks alongside the
/// report; callers must check `report.ok()` before trusting the blocks
/// for conversion.
pub fn parse_and_validate(text: &str, config: &IntervalConfig) -> (Vec<RawDayBlock>, ValidationReport) {
    let mut report = ValidationReport::new();
    let mut blocks: Vec<RawDayBlock> = Vec::new();
    let mut last_date: Option<NaiveDate> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw_line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Ok(date) = NaiveDate::parse_from_str(line.trim(), "%Y-%m-%d") {
            if let Some(prev) = last_date {
                if date <= prev {
                    report.push(ValidationIssue {
                        line_number: Some(line_number),
                        message: format!("day header '{date}' does not strictly increase after '{prev}'"),
                        kind: ValidationKind::Logical,
                    });
                }
            }
            last_date = Some(date);
            blocks.push(RawDayBlock { date, events: Vec::new(), day_remarks: Vec::new() });
            continue;
        }

        let Some(current) = blocks.last_mut() else {
            report.push(ValidationIssue {
                line_number: Some(line_number),
                message: "content line appears before any day header".to_string(),
                kind: ValidationKind::Structural,
            });
            continue;
        };

        if line.starts_with(&config.day_remark_prefix) {
            current
                .day_remarks
                .push(line[config.day_remark_prefix.len()..].trim().to_string());
            continue;
        }

        match parse_event_line(line, config) {
            Ok(event) => {
                if let Some(last) = current.events.last() {
                    if event.minutes_since_midnight < last.minutes_since_midnight {
                        report.push(ValidationIssue {
                            line_number: Some(line_number),
                            message: "event times must be non-decreasing within a day".to_string(),
                            kind: ValidationKind::Logical,
                        });
                    }
                }
                if !config.is_wake_keyword(&event.text)
                    && config.resolve_alias(&event.text).is_none()
                    && config.duration_for(&event.text).is_none()
                {
                    report.push(ValidationIssue {
                        line_number: Some(line_number),
                        message: format!("'{}' is neither a declared alias nor a duration-rule keyword", event.text),
                        kind: ValidationKind::Logical,
                    });
                }
                current.events.push(event);
            }
            Err(reason) => {
                report.push(ValidationIssue {
                    line_number: Some(line_number),
                    message: reason,
                    kind: ValidationKind::Structural,
                });
            }
        }
    }

    for block in &blocks {
        if block.events.is_empty() && block.day_remarks.is_empty() {
            report.push(ValidationIssue {
                line_number: None,
                message: format!("day '{}' has no events and is not marked a continuation", block.date),
                kind: ValidationKind::Logical,
            });
        }
    }

    (blocks, report)
}

fn parse_event_line(line: &str, config: &IntervalConfig) -> Result<RawEvent, String> {
    if line.len() < 4 || !line.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return Err(format!("malformed event line: '{line}'"));
    }
    let hh: u32 = line[0..2].parse().map_err(|_| format!("malformed hour in '{line}'"))?;
    let mm: u32 = line[2..4].parse().map_err(|_| format!("malformed minute in '{line}'"))?;
    if hh > 23 || mm > 59 {
        return Err(format!("time out of range in '{line}'"));
    }
    let rest = line[4..].trim_start();
    if rest.is_empty() {
        return Err(format!("event line missing text: '{line}'"));
    }

    let (text, remark) = split_remark(rest, &config.remark_prefixes);
    Ok(RawEvent {
        minutes_since_midnight: hh * 60 + mm,
        text: text.trim().to_string(),
        remark,
    })
}

fn split_remark(rest: &str, remark_prefixes: &[String]) -> (String, Option<String>) {
    for prefix in remark_prefixes {
        if let Some(pos) = rest.find(prefix.as_str()) {
            let text = rest[..pos].trim_end().to_string();
            let remark = rest[pos + prefix.len()..].trim().to_string();
            let remark = if remark.is_empty() { None } else { Some(remark) };
            return (text, remark);
        }
    }
    (rest.trim().to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> IntervalConfig {
        let mut aliases = HashMap::new();
        aliases.insert("study_math".to_string(), "study_math".to_string());
        aliases.insert("meal".to_string(), "meal".to_string());
        aliases.insert("sleep".to_string(), "sleep".to_string());
        IntervalConfig {
            wake_keywords: vec!["起床".to_string()],
            aliases,
            duration_rules: HashMap::new(),
            remark_prefixes: vec!["//".into(), "#".into(), ";".into()],
            day_remark_prefix: "@".into(),
        }
    }

    #[test]
    fn parses_simple_day() {
        let text = "2026-02-01\n0700起床\n0900study_math\n1200meal\n2330sleep\n";
        let (blocks, report) = parse_and_validate(text, &config());
        assert!(report.ok(), "{:?}", report.issues());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].events.len(), 4);
    }

    #[test]
    fn flags_non_increasing_time() {
        let text = "2026-02-01\n0900study_math\n0700起床\n";
        let (_, report) = parse_and_validate(text, &config());
        assert!(!report.ok());
    }

    #[test]
    fn flags_unknown_event_text() {
        let text = "2026-02-01\n0700起床\n0900unknown_activity\n";
        let (_, report) = parse_and_validate(text, &config());
        assert!(!report.ok());
    }

    #[test]
    fn splits_inline_remark() {
        let text = "2026-02-01\n0700起床 // woke up early\n";
        let (blocks, _) = parse_and_validate(text, &config());
        assert_eq!(blocks[0].events[0].remark.as_deref(), Some("woke up early"));
    }
}
