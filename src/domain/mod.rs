pub mod calendar;
pub mod model;
pub mod project_cache;

pub use calendar::Clock;
pub use model::{
    ConvertedActivity, ConvertedActivityBody, ConvertedDay, ConvertedHeaders, ConvertedStats, Day,
    DailyLog, DayStats, ProcessedActivity, ProjectTree, RawEvent, TimeRecord, PATH_SEPARATOR,
};
pub use project_cache::ProjectPathCache;
