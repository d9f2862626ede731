use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::types::Period;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a calendar date in any of the layouts found in ledger and MES exports.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Canonical `YYYY-MM` label for a date.
pub fn period_of(date: NaiveDate) -> Period {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Normalize a period or date string to `YYYY-MM`.
///
/// Accepts `YYYY-MM`, `YYYY-M`, `YYYYMM` and every full date layout understood
/// by [`parse_date`]. Returns `None` for anything else, including month 0 or 13+.
pub fn normalize_period(raw: &str) -> Option<Period> {
    let s = raw.trim();
    if let Some(date) = parse_date(s) {
        return Some(period_of(date));
    }

    let (year, month) = if let Some((y, m)) = s.split_once('-') {
        (y, m)
    } else if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.split_at(4)
    } else {
        return None;
    };

    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(period_of)
}
