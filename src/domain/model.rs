//! Core entities of the pipeline (spec section 3): raw events, the
//! transient `DailyLog`/`ProcessedActivity` produced by the converter, and
//! the persisted `Day`/`TimeRecord`/`Project` rows. Grounded in shape on the
//! teacher's `domain::TimeEntry`/`domain::reporting::TrackedTime`, expanded
//! to the richer hierarchical/interval model the spec requires.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Path separator for hierarchical project paths (invariant 4: segments
/// never contain this character).
pub const PATH_SEPARATOR: char = '_';

/// A single raw line's worth of parsed data, before interval materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Minutes since local midnight, `0..=1439`.
    pub minutes_since_midnight: u32,
    pub text: String,
    pub remark: Option<String>,
}

impl RawEvent {
    #[must_use]
    pub fn time_str(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.minutes_since_midnight / 60,
            self.minutes_since_midnight % 60
        )
    }
}

/// A day as seen right after parsing, before the converter materializes
/// intervals.
#[derive(Debug, Clone)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub getup_time: Option<u32>,
    pub is_continuation: bool,
    pub raw_events: Vec<RawEvent>,
    pub general_remarks: Vec<String>,
    pub processed_activities: Vec<ProcessedActivity>,
    pub stats: DayStats,
    pub has_study_activity: bool,
    pub has_exercise_activity: bool,
    pub has_sleep_activity: bool,
}

impl DailyLog {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            getup_time: None,
            is_continuation: false,
            raw_events: Vec::new(),
            general_remarks: Vec::new(),
            processed_activities: Vec::new(),
            stats: DayStats::default(),
            has_study_activity: false,
            has_exercise_activity: false,
            has_sleep_activity: false,
        }
    }

    #[must_use]
    pub fn getup_time_str(&self) -> Option<String> {
        self.getup_time
            .map(|minutes| format!("{:02}:{:02}", minutes / 60, minutes % 60))
    }

    /// Epoch seconds of the last processed activity's end, used to stitch
    /// continuation days (invariant 3).
    #[must_use]
    pub fn last_end_ts(&self) -> Option<i64> {
        self.processed_activities.last().map(|a| a.end_ts)
    }

    /// Epoch seconds of local midnight for this day, the arbitrary anchor
    /// all `ProcessedActivity` timestamps within the day are offset from.
    #[must_use]
    pub fn midnight_epoch(&self) -> i64 {
        self.date
            .and_hms_opt(0, 0, 0)
            .expect("midnight always valid")
            .and_utc()
            .timestamp()
    }
}

/// Aggregate time-by-category buckets for a single day (spec section 3,
/// `Day` persisted counters).
#[derive(Debug, Clone, Default)]
pub struct DayStats {
    pub sleep_night_time: i64,
    pub sleep_day_time: i64,
    pub total_exercise_time: i64,
    pub cardio_time: i64,
    pub anaerobic_time: i64,
    pub exercise_both_time: i64,
    pub grooming_time: i64,
    pub toilet_time: i64,
    pub gaming_time: i64,
    pub recreation_time: i64,
    pub recreation_zhihu_time: i64,
    pub recreation_bilibili_time: i64,
    pub recreation_douyin_time: i64,
    pub total_study_time: i64,
}

impl DayStats {
    #[must_use]
    pub fn sleep_total_time(&self) -> i64 {
        self.sleep_night_time + self.sleep_day_time
    }
}

/// A materialized, contiguous time interval (spec section 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedActivity {
    pub logical_id: u32,
    pub start_ts: i64,
    pub end_ts: i64,
    pub start_str: String,
    pub end_str: String,
    pub project_path: String,
    pub duration_seconds: i64,
    pub remark: Option<String>,
}

impl ProcessedActivity {
    /// Root segment of the project path, used for category rollups.
    #[must_use]
    pub fn root(&self) -> &str {
        self.project_path
            .split(PATH_SEPARATOR)
            .next()
            .unwrap_or(&self.project_path)
    }
}

/// A persisted day row (spec section 6 schema).
#[derive(Debug, Clone)]
pub struct Day {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub status: bool,
    pub sleep: bool,
    pub remark: String,
    pub getup_time: Option<String>,
    pub exercise: bool,
    pub total_exercise_time: i64,
    pub cardio_time: i64,
    pub anaerobic_time: i64,
    pub exercise_both_time: i64,
    pub activity_count: u32,
    pub stats: DayStats,
}

impl Day {
    #[must_use]
    pub fn from_daily_log(log: &DailyLog) -> Self {
        Self {
            date: log.date,
            year: log.date.format("%Y").to_string().parse().unwrap_or(0),
            month: log.date.format("%m").to_string().parse().unwrap_or(0),
            status: log.getup_time.is_some(),
            sleep: log.has_sleep_activity,
            remark: log.general_remarks.join(" "),
            getup_time: log.getup_time_str(),
            exercise: log.has_exercise_activity,
            total_exercise_time: log.stats.total_exercise_time,
            cardio_time: log.stats.cardio_time,
            anaerobic_time: log.stats.anaerobic_time,
            exercise_both_time: log.stats.exercise_both_time,
            activity_count: u32::try_from(log.processed_activities.len()).unwrap_or(u32::MAX),
            stats: log.stats.clone(),
        }
    }
}

/// A persisted time-record row (spec section 6 schema). `project_id` is
/// resolved from `ProcessedActivity::project_path` via the project path
/// cache at import time.
#[derive(Debug, Clone)]
pub struct TimeRecord {
    pub date: NaiveDate,
    pub logical_id: u32,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub start: String,
    pub end: String,
    pub project_id: i64,
    pub duration_seconds: i64,
    pub activity_remark: Option<String>,
}

/// JSON-serializable converted-day artifact (spec section 6 "Converted-day
/// file format"). This is what `save_processed_output` writes to disk and
/// what `import_from_files` reads back in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedDay {
    pub headers: ConvertedHeaders,
    pub activities: Vec<ConvertedActivity>,
    pub generated_stats: ConvertedStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedHeaders {
    pub date: String,
    pub status: u8,
    pub exercise: u8,
    pub sleep: u8,
    pub getup: String,
    pub activity_count: u32,
    pub remark: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedActivity {
    pub logical_id: u32,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: i64,
    pub activity_remark: Option<String>,
    pub activity: ConvertedActivityBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedActivityBody {
    pub project_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertedStats {
    pub sleep_night_time: i64,
    pub sleep_day_time: i64,
    pub sleep_total_time: i64,
    pub total_exercise_time: i64,
    pub cardio_time: i64,
    pub anaerobic_time: i64,
    pub grooming_time: i64,
    pub toilet_time: i64,
    pub gaming_time: i64,
    pub recreation_time: i64,
    pub recreation_zhihu_time: i64,
    pub recreation_bilibili_time: i64,
    pub recreation_douyin_time: i64,
    pub total_study_time: i64,
}

impl ConvertedDay {
    #[must_use]
    pub fn from_daily_log(log: &DailyLog) -> Self {
        let headers = ConvertedHeaders {
            date: log.date.format("%Y-%m-%d").to_string(),
            status: u8::from(log.getup_time.is_some()),
            exercise: u8::from(log.has_exercise_activity),
            sleep: u8::from(log.has_sleep_activity),
            getup: log.getup_time_str().unwrap_or_else(|| "Null".to_string()),
            activity_count: u32::try_from(log.processed_activities.len()).unwrap_or(u32::MAX),
            remark: log.general_remarks.join(" "),
        };
        let activities = log
            .processed_activities
            .iter()
            .map(|a| ConvertedActivity {
                logical_id: a.logical_id,
                start_timestamp: a.start_ts,
                end_timestamp: a.end_ts,
                start_time: a.start_str.clone(),
                end_time: a.end_str.clone(),
                duration_seconds: a.duration_seconds,
                activity_remark: a.remark.clone(),
                activity: ConvertedActivityBody {
                    project_path: a.project_path.clone(),
                },
            })
            .collect();
        let s = &log.stats;
        let generated_stats = ConvertedStats {
            sleep_night_time: s.sleep_night_time,
            sleep_day_time: s.sleep_day_time,
            sleep_total_time: s.sleep_total_time(),
            total_exercise_time: s.total_exercise_time,
            cardio_time: s.cardio_time,
            anaerobic_time: s.anaerobic_time,
            grooming_time: s.grooming_time,
            toilet_time: s.toilet_time,
            gaming_time: s.gaming_time,
            recreation_time: s.recreation_time,
            recreation_zhihu_time: s.recreation_zhihu_time,
            recreation_bilibili_time: s.recreation_bilibili_time,
            recreation_douyin_time: s.recreation_douyin_time,
            total_study_time: s.total_study_time,
        };
        Self {
            headers,
            activities,
            generated_stats,
        }
    }
}

/// A recursive rollup node for project-tree reports (spec section 3).
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    pub name: String,
    pub duration_seconds: i64,
    pub children: Vec<ProjectTree>,
}

impl ProjectTree {
    #[must_use]
    pub fn root() -> Self {
        Self {
            name: String::new(),
            duration_seconds: 0,
            children: Vec::new(),
        }
    }

    /// Inserts `duration` at every prefix node of `path`, creating nodes as
    /// needed (invariant: a leaf's duration contributes to all ancestors).
    pub fn insert_path(&mut self, path: &str, duration: i64) {
        self.duration_seconds += duration;
        let mut node = self;
        for segment in path.split(PATH_SEPARATOR) {
            let idx = match node.children.iter().position(|c| c.name == segment) {
                Some(idx) => idx,
                None => {
                    node.children.push(ProjectTree {
                        name: segment.to_string(),
                        duration_seconds: 0,
                        children: Vec::new(),
                    });
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
            node.duration_seconds += duration;
        }
    }

    /// Children sorted by descending duration, ties broken by ascending
    /// name (spec section 4.10 / property P7), applied recursively.
    #[must_use]
    pub fn sorted_children(&self) -> Vec<&ProjectTree> {
        let mut children: Vec<&ProjectTree> = self.children.iter().collect();
        children.sort_by(|a, b| b.duration_seconds.cmp(&a.duration_seconds).then(a.name.cmp(&b.name)));
        children
    }

    /// Finds the subtree rooted at `path` (`_`-joined), if present.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ProjectTree> {
        let mut node = self;
        for segment in path.split(PATH_SEPARATOR) {
            node = node.children.iter().find(|c| c.name == segment)?;
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_tree_rollup_sums_ancestors() {
        let mut tree = ProjectTree::root();
        tree.insert_path("study_math_calculus", 600);
        tree.insert_path("study_math_algebra", 300);
        tree.insert_path("study_cs", 200);

        let study = tree.find("study").unwrap();
        assert_eq!(study.duration_seconds, 1100);
        let math = tree.find("study_math").unwrap();
        assert_eq!(math.duration_seconds, 900);
        let calc = tree.find("study_math_calculus").unwrap();
        assert_eq!(calc.duration_seconds, 600);
    }

    #[test]
    fn sorted_children_breaks_ties_by_name() {
        let mut tree = ProjectTree::root();
        tree.insert_path("b", 100);
        tree.insert_path("a", 100);
        tree.insert_path("c", 200);

        let names: Vec<_> = tree.sorted_children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
