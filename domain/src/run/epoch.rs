//! Daily numbering epoch
//!
//! Ordinals are unique per mobile prefix within one calendar day. A run
//! whose last recorded date is before today starts a fresh epoch at 1.

use crate::config::keys::RUN_DATE_FORMAT;
use chrono::NaiveDate;

/// Parse a persisted run date (`dd-MM-yyyy`).
///
/// Characters other than digits and `-` are stripped first, so decorated
/// values written by older tooling still parse.
pub fn parse_run_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    NaiveDate::parse_from_str(&cleaned, RUN_DATE_FORMAT).ok()
}

pub fn format_run_date(date: NaiveDate) -> String {
    date.format(RUN_DATE_FORMAT).to_string()
}

/// Whether a run on `today` begins a new epoch
pub fn starts_new_epoch(last_run_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match last_run_date {
        Some(date) => date < today,
        None => true,
    }
}

/// First ordinal to attempt on `today`
pub fn resume_index(
    last_processed: u32,
    last_run_date: Option<NaiveDate>,
    today: NaiveDate,
) -> u32 {
    if starts_new_epoch(last_run_date, today) {
        1
    } else {
        last_processed.saturating_add(1)
    }
}
