pub mod output;
pub mod source;

pub use output::{validate as validate_output, DateCheckMode, MAX_ACTIVITY_DURATION_SECONDS};
pub use source::{parse_and_validate, RawDayBlock};
