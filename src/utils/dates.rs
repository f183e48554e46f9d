use chrono::{Duration, Local, NaiveDate, NaiveTime};

use crate::utils::constants::{DATE_FORMAT, TIME_FORMAT};

/// `days` consecutive dates in ascending order, ending the day before `today`.
pub fn date_window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=i64::from(days))
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Window ending yesterday in local time.
pub fn date_window_until_yesterday(days: u32) -> Vec<NaiveDate> {
    date_window(Local::now().date_naive(), days)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// `YYYYMMDD` of the day before `date`, or `None` if `date` does not parse.
pub fn previous_day(date: &str) -> Option<String> {
    parse_date(date)
        .and_then(|d| d.pred_opt())
        .map(format_date)
}

/// Strict zero-padded `HH:MM`.
pub fn is_valid_hhmm(text: &str) -> bool {
    text.len() == 5 && NaiveTime::parse_from_str(text, TIME_FORMAT).is_ok()
}
