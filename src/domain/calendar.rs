//! Clock & Calendar utilities (C1).
//!
//! Pure, total operations on `YYYY-MM-DD` strings and `NaiveDate` values:
//! day arithmetic, month/week/year labels, and an injectable clock so the
//! rest of the pipeline never calls `Utc::now()` directly. Mirrors the
//! teacher's `domain::time::Clock` and `domain::dates` newtypes, generalized
//! to the ISO-week and month/year label helpers spec section 4.1 requires.

use chrono::{Datelike, Duration, IsoWeek, NaiveDate};

use crate::error::InvalidDate;

/// Injectable "now" so date-relative queries (Period, "this week") are
/// deterministic in tests.
#[derive(Clone, Debug)]
pub enum Clock {
    System,
    Fixed(NaiveDate),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Clock::System
    }

    #[must_use]
    pub fn fixed(today: NaiveDate) -> Self {
        Clock::Fixed(today)
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => chrono::Utc::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// Parses `YYYY-MM-DD`, the sole canonical date shape (spec section 9: the
/// source mixes `YYYYMMDD` and `YYYY-MM-DD`; this crate accepts only the
/// latter at every boundary).
pub fn parse_date(s: &str) -> Result<NaiveDate, InvalidDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| InvalidDate::Malformed(s.to_string()))
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[must_use]
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// `YYYY-MM` prefix of a date.
#[must_use]
pub fn month_prefix(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parses a `YYYY-MM` month key back to its first day.
pub fn parse_month(s: &str) -> Result<NaiveDate, InvalidDate> {
    let full = format!("{s}-01");
    parse_date(&full)
}

#[must_use]
pub fn year_label(date: NaiveDate) -> String {
    date.format("%Y").to_string()
}

/// ISO-8601 week label `GGGG-Www` (week containing the year's first
/// Thursday is week 1; weeks start Monday).
#[must_use]
pub fn iso_week_label(date: NaiveDate) -> String {
    format_iso_week(date.iso_week())
}

#[must_use]
pub fn format_iso_week(week: IsoWeek) -> String {
    format!("{}-W{:02}", week.year(), week.week())
}

/// Parses `GGGG-Www` into the Monday..Sunday inclusive date bounds.
pub fn parse_iso_week(s: &str) -> Result<(NaiveDate, NaiveDate), InvalidDate> {
    let (year_str, week_str) = s
        .split_once("-W")
        .ok_or_else(|| InvalidDate::Malformed(s.to_string()))?;
    let year: i32 = year_str
        .parse()
        .map_err(|_| InvalidDate::Malformed(s.to_string()))?;
    let week: u32 = week_str
        .parse()
        .map_err(|_| InvalidDate::Malformed(s.to_string()))?;
    if week == 0 || week > 53 {
        return Err(InvalidDate::Malformed(s.to_string()));
    }
    // ISO week 1 is the week with Jan 4th in it.
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4).ok_or_else(|| InvalidDate::Malformed(s.to_string()))?;
    let week1_monday = jan4 - Duration::days(i64::from(jan4.weekday().num_days_from_monday()));
    let monday = week1_monday + Duration::weeks(i64::from(week) - 1);
    let sunday = monday + Duration::days(6);
    Ok((monday, sunday))
}

/// Monday..Sunday inclusive bounds of the ISO week containing `date`.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    let sunday = monday + Duration::days(6);
    (monday, sunday)
}

/// First..last day bounds of the calendar month containing `date`.
#[must_use]
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).expect("day 1 always valid");
    let next_month_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1).expect("valid date")
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1).expect("valid date")
    };
    (first, next_month_first.pred_opt().expect("valid date"))
}

/// "N days ago" anchor: the inclusive range `[today-(n-1), today]`.
#[must_use]
pub fn last_n_days(today: NaiveDate, n: u32) -> (NaiveDate, NaiveDate) {
    let n = n.max(1);
    (add_days(today, -(i64::from(n) - 1)), today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_canonical_date() {
        assert_eq!(
            parse_date("2026-02-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
        );
    }

    #[test]
    fn rejects_non_canonical_shape() {
        assert!(parse_date("20260201").is_err());
        assert!(parse_date("02-01-2026").is_err());
    }

    #[rstest]
    #[case(2020, 12, 28, 2020, 53)] // Monday, last week of 2020
    #[case(2020, 12, 31, 2020, 53)] // Thursday, still week 53 of 2020
    #[case(2021, 1, 1, 2020, 53)]   // Friday, belongs to previous year's week
    #[case(2021, 1, 4, 2021, 1)]    // Monday, first day of 2021's week 1
    fn iso_week_edge_cases(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] expected_year: i32,
        #[case] expected_week: u32,
    ) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(iso_week_label(date), format!("{expected_year}-W{expected_week:02}"));
    }

    #[test]
    fn parse_iso_week_roundtrips_week_bounds() {
        let (monday, sunday) = parse_iso_week("2021-W01").unwrap();
        assert_eq!(monday, NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
        assert_eq!(sunday, NaiveDate::from_ymd_opt(2021, 1, 10).unwrap());
    }

    #[test]
    fn month_bounds_handles_december() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 15).unwrap();
        let (first, last) = month_bounds(date);
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn last_n_days_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let (start, end) = last_n_days(today, 7);
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 4).unwrap());
        assert_eq!(end, today);
    }
}
