//! Converter (C4, spec section 4.4): turns validated `RawDayBlock`s into
//! `DailyLog`s with materialized intervals, carrying the last unfinished
//! activity across the midnight boundary.
//!
//! Grounded in shape on the original `IntervalConverter.cpp` (see
//! `original_source/`) for the wake/continuation/midnight-crossing rules
//! and the cross-year placeholder collapse; re-expressed as a single
//! forward pass with an explicit running cursor instead of the source's
//! mutable mode-stack.

use chrono::Datelike;

use crate::config::IntervalConfig;
use crate::domain::{DailyLog, ProcessedActivity, RawEvent};
use crate::error::CoreError;
use crate::validation::RawDayBlock;

/// `(end_ts, project_path)` of the last processed activity seen so far,
/// threaded across days so a continuation day can stitch to it.
pub type Tail = Option<(i64, String)>;

pub fn convert(
    blocks: &[RawDayBlock],
    config: &IntervalConfig,
    initial_tail: Tail,
) -> Result<Vec<DailyLog>, CoreError> {
    let mut days = Vec::with_capacity(blocks.len());
    let mut tail = initial_tail;

    for block in blocks {
        let (day, new_tail) = convert_one_day(block, config, tail)?;
        tail = new_tail;
        days.push(day);
    }

    collapse_cross_year_placeholder(&mut days);
    Ok(days)
}

fn convert_one_day(
    block: &RawDayBlock,
    config: &IntervalConfig,
    previous_tail: Tail,
) -> Result<(DailyLog, Tail), CoreError> {
    let mut log = DailyLog::new(block.date);
    log.raw_events = block.events.clone();
    log.general_remarks = block.day_remarks.clone();
    let midnight = log.midnight_epoch();

    let wake_idx = block
        .events
        .iter()
        .position(|e| config.is_wake_keyword(&e.text));
    log.is_continuation = wake_idx.is_none();
    log.getup_time = wake_idx.map(|idx| block.events[idx].minutes_since_midnight);

    if block.events.is_empty() {
        finalize_stats(&mut log);
        return Ok((log, previous_tail));
    }

    let start_index = wake_idx.unwrap_or(0);
    let mut logical_id = 1u32;
    let mut cursor_ts = epoch_for(midnight, block.events[start_index].minutes_since_midnight);

    if log.is_continuation {
        if let Some((prev_end, prev_path)) = &previous_tail {
            let first_ts = epoch_for(midnight, block.events[0].minutes_since_midnight);
            if first_ts > *prev_end {
                push_activity(&mut log, &mut logical_id, *prev_end, first_ts, prev_path.clone(), None);
            }
        }
    }

    let mut i = start_index;
    while i < block.events.len() {
        let event = &block.events[i];
        let path = resolve_project_path(&event.text, config)?;

        if let Some(duration) = config.duration_for(&event.text) {
            let end_ts = cursor_ts + i64::from(duration);
            push_activity(&mut log, &mut logical_id, cursor_ts, end_ts, path, event.remark.clone());
            cursor_ts = end_ts;
            i += 1;
            continue;
        }

        if i + 1 >= block.events.len() {
            break;
        }
        let next = &block.events[i + 1];
        let mut end_ts = epoch_for(midnight, next.minutes_since_midnight);
        if end_ts < cursor_ts {
            end_ts += 86_400;
        }
        if end_ts > cursor_ts {
            push_activity(&mut log, &mut logical_id, cursor_ts, end_ts, path, event.remark.clone());
        }
        cursor_ts = end_ts;
        i += 1;
    }

    let last_event = block.events.last().expect("checked non-empty above");
    let tail_path = resolve_project_path(&last_event.text, config)?;
    let new_tail = Some((cursor_ts, tail_path));

    finalize_stats(&mut log);
    Ok((log, new_tail))
}

fn resolve_project_path(text: &str, config: &IntervalConfig) -> Result<String, CoreError> {
    if config.is_wake_keyword(text) {
        return Ok("sleep".to_string());
    }
    if let Some(path) = config.resolve_alias(text) {
        return Ok(path.to_string());
    }
    if config.duration_for(text).is_some() {
        return Ok(text.to_string());
    }
    Err(CoreError::Logic(format!(
        "convert: '{text}' matches neither an alias, a duration-rule keyword, nor a wake keyword"
    )))
}

fn epoch_for(midnight: i64, minutes_since_midnight: u32) -> i64 {
    midnight + i64::from(minutes_since_midnight) * 60
}

fn push_activity(
    log: &mut DailyLog,
    logical_id: &mut u32,
    start_ts: i64,
    end_ts: i64,
    project_path: String,
    remark: Option<String>,
) {
    let activity = ProcessedActivity {
        logical_id: *logical_id,
        start_ts,
        end_ts,
        start_str: hm_from_epoch(start_ts),
        end_str: hm_from_epoch(end_ts),
        project_path,
        duration_seconds: end_ts - start_ts,
        remark,
    };
    log.processed_activities.push(activity);
    *logical_id += 1;
}

fn hm_from_epoch(ts: i64) -> String {
    let seconds_of_day = ts.rem_euclid(86_400);
    format!("{:02}:{:02}", seconds_of_day / 3600, (seconds_of_day % 3600) / 60)
}

fn finalize_stats(log: &mut DailyLog) {
    for activity in &log.processed_activities {
        accumulate_category(log, activity);
    }
}

fn accumulate_category(log: &mut DailyLog, activity: &ProcessedActivity) {
    let root = activity.root();
    let duration = activity.duration_seconds;
    match root {
        "sleep" => {
            log.has_sleep_activity = true;
            log.stats.sleep_night_time += duration;
        }
        "nap" => {
            log.has_sleep_activity = true;
            log.stats.sleep_day_time += duration;
        }
        "exercise" => {
            log.has_exercise_activity = true;
            log.stats.total_exercise_time += duration;
            match activity.project_path.split('_').nth(1) {
                Some("cardio") => log.stats.cardio_time += duration,
                Some("anaerobic") => log.stats.anaerobic_time += duration,
                Some("both") => log.stats.exercise_both_time += duration,
                _ => {}
            }
        }
        "grooming" => log.stats.grooming_time += duration,
        "toilet" => log.stats.toilet_time += duration,
        "gaming" => log.stats.gaming_time += duration,
        "recreation" => {
            log.stats.recreation_time += duration;
            match activity.project_path.split('_').nth(1) {
                Some("zhihu") => log.stats.recreation_zhihu_time += duration,
                Some("bilibili") => log.stats.recreation_bilibili_time += duration,
                Some("douyin") => log.stats.recreation_douyin_time += duration,
                _ => {}
            }
        }
        "study" => {
            log.has_study_activity = true;
            log.stats.total_study_time += duration;
        }
        _ => {}
    }
}

/// Drops an empty placeholder day seeding continuity across a year
/// boundary (spec section 4.4 point 7): the first two days of the batch
/// are `YYYY-12` then `(YYYY+1)-01`, and the first carries no activities.
fn collapse_cross_year_placeholder(days: &mut Vec<DailyLog>) {
    if days.len() < 2 {
        return;
    }
    let first_is_empty_placeholder = days[0].processed_activities.is_empty() && days[0].raw_events.is_empty();
    let crosses_year = days[0].date.month() == 12
        && days[1].date.year() == days[0].date.year() + 1
        && days[1].date.month() == 1;
    if first_is_empty_placeholder && crosses_year {
        days.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn config() -> IntervalConfig {
        let mut aliases = HashMap::new();
        aliases.insert("study_math".to_string(), "study_math".to_string());
        aliases.insert("meal".to_string(), "meal".to_string());
        aliases.insert("sleep".to_string(), "sleep".to_string());
        aliases.insert("study_cpp".to_string(), "study_cpp".to_string());
        IntervalConfig {
            wake_keywords: vec!["起床".to_string()],
            aliases,
            duration_rules: HashMap::new(),
            remark_prefixes: vec!["//".into(), "#".into(), ";".into()],
            day_remark_prefix: "@".into(),
        }
    }

    fn event(minutes: u32, text: &str) -> RawEvent {
        RawEvent { minutes_since_midnight: minutes, text: text.to_string(), remark: None }
    }

    fn block(date: &str, events: Vec<RawEvent>) -> RawDayBlock {
        RawDayBlock { date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), events, day_remarks: vec![] }
    }

    #[test]
    fn simple_day_scenario() {
        let blocks = vec![block(
            "2026-02-01",
            vec![event(420, "起床"), event(540, "study_math"), event(720, "meal"), event(1410, "sleep")],
        )];
        let (days, _) = (convert(&blocks, &config(), None).unwrap(), ());
        let day = &days[0];
        assert_eq!(day.getup_time_str().unwrap(), "07:00");
        assert_eq!(day.processed_activities.len(), 3);
        assert_eq!(day.stats.total_study_time, 10_800);
    }

    #[test]
    fn midnight_crossing_scenario() {
        let blocks = vec![
            block("2026-02-01", vec![event(1380, "study_cpp"), event(60, "sleep")]),
            block("2026-02-02", vec![event(420, "起床"), event(600, "meal")]),
        ];
        let days = convert(&blocks, &config(), None).unwrap();
        assert_eq!(days[0].processed_activities.len(), 1);
        let only = &days[0].processed_activities[0];
        assert_eq!(only.duration_seconds, 7200);
        assert!(!days[1].is_continuation);
    }

    #[test]
    fn identical_consecutive_times_drop_the_zero_length_interval() {
        let blocks = vec![block(
            "2026-02-01",
            vec![event(420, "起床"), event(540, "study_math"), event(540, "meal"), event(720, "sleep")],
        )];
        let days = convert(&blocks, &config(), None).unwrap();
        let day = &days[0];

        assert!(
            day.processed_activities.iter().all(|a| a.project_path != "study_math"),
            "zero-length interval at the repeated timestamp must not be inserted: {:?}",
            day.processed_activities
        );
        assert_eq!(day.processed_activities.len(), 2);
        let meal = day.processed_activities.iter().find(|a| a.project_path == "meal").unwrap();
        assert_eq!(meal.duration_seconds, 10_800, "cursor must not drift forward by a spurious 24h");
    }

    #[test]
    fn continuation_stitches_previous_tail() {
        let blocks = vec![block("2026-02-02", vec![event(60, "meal"), event(480, "study_math")])];
        let tail = Some((
            NaiveDate::parse_from_str("2026-02-02", "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
                .timestamp(),
            "sleep".to_string(),
        ));
        let days = convert(&blocks, &config(), tail).unwrap();
        assert!(days[0].is_continuation);
        let first = &days[0].processed_activities[0];
        assert_eq!(first.project_path, "sleep");
        assert_eq!(first.end_ts - first.start_ts, 3600);
    }
}
