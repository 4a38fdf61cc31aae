//! Natural-language date resolution
//!
//! Resolves phrases like "tomorrow", "next Monday", "December 25th" or
//! "in 3 days" against an injected reference date, always preferring
//! future dates. Resolution never reads the system clock.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso pattern compiles"));

static SLASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("slash pattern compiles"));

static IN_DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d{1,3})\s+days?\b").expect("in-days pattern compiles"));

static NEXT_WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:next\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday pattern compiles")
});

static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?\b",
    )
    .expect("month-day pattern compiles")
});

static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec)\.?(?:,?\s+(\d{4}))?\b",
    )
    .expect("day-month pattern compiles")
});

fn month_number(name: &str) -> Option<u32> {
    let n = match &name[..3.min(name.len())] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next future occurrence of a weekday. When the reference date already
/// falls on that weekday the result is a week out, never the same day.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let delta = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let delta = if delta == 0 { 7 } else { delta };
    today + Days::new(delta as u64)
}

/// Pick a year for a year-less calendar date, preferring the future.
fn with_preferred_year(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

/// Resolve the first date mention in `text` against `today`.
///
/// Relative phrases are tried before absolute forms; a resolved date
/// strictly before `today` yields `None`.
pub fn resolve_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.trim().to_lowercase();

    let resolved = resolve_relative(&lower, today).or_else(|| resolve_absolute(&lower, today));

    resolved.filter(|date| *date >= today)
}

fn resolve_relative(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    if contains_word(lower, "today") {
        return Some(today);
    }
    if contains_word(lower, "tomorrow") {
        return Some(today + Days::new(1));
    }
    if lower.contains("next week") {
        return Some(today + Days::new(7));
    }
    if let Some(caps) = IN_DAYS_RE.captures(lower) {
        let days: u64 = caps[1].parse().ok()?;
        return Some(today + Days::new(days));
    }
    if let Some(caps) = NEXT_WEEKDAY_RE.captures(lower) {
        let weekday = weekday_from_name(&caps[1])?;
        return Some(next_weekday(today, weekday));
    }
    None
}

fn resolve_absolute(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = ISO_RE.captures(lower) {
        let (y, m, d) = (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    // Numeric slash dates read as month/day/year
    if let Some(caps) = SLASH_RE.captures(lower) {
        let (m, d, y) = (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?);
        return NaiveDate::from_ymd_opt(y, m, d);
    }
    if let Some(caps) = MONTH_DAY_RE.captures(lower) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        return match caps.get(3) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
            None => with_preferred_year(month, day, today),
        };
    }
    if let Some(caps) = DAY_MONTH_RE.captures(lower) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        return match caps.get(3) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
            None => with_preferred_year(month, day, today),
        };
    }
    None
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2024-06-10 is a Monday
    const Y: i32 = 2024;

    #[test]
    fn test_today_and_tomorrow() {
        let today = d(Y, 6, 10);
        assert_eq!(resolve_date("today", today), Some(today));
        assert_eq!(resolve_date("tomorrow", today), Some(d(Y, 6, 11)));
        assert_eq!(resolve_date("how about tomorrow?", today), Some(d(Y, 6, 11)));
    }

    #[test]
    fn test_next_weekday_never_resolves_to_same_day() {
        // Reference Wednesday: "next Monday" is five days out
        let wednesday = d(Y, 6, 12);
        assert_eq!(resolve_date("next monday", wednesday), Some(d(Y, 6, 17)));
        // Same weekday rolls a full week, not zero days
        let monday = d(Y, 6, 10);
        assert_eq!(resolve_date("next monday", monday), Some(d(Y, 6, 17)));
        assert_eq!(resolve_date("next Friday", monday), Some(d(Y, 6, 14)));
    }

    #[test]
    fn test_in_n_days_and_next_week() {
        let today = d(Y, 6, 10);
        assert_eq!(resolve_date("in 3 days", today), Some(d(Y, 6, 13)));
        assert_eq!(resolve_date("next week", today), Some(d(Y, 6, 17)));
    }

    #[test]
    fn test_iso_and_slash_forms() {
        let today = d(Y, 6, 10);
        assert_eq!(resolve_date("2024-12-25", today), Some(d(Y, 12, 25)));
        assert_eq!(resolve_date("12/25/2024", today), Some(d(Y, 12, 25)));
    }

    #[test]
    fn test_month_name_prefers_future_year() {
        let today = d(Y, 6, 10);
        assert_eq!(resolve_date("December 25th", today), Some(d(Y, 12, 25)));
        // A date earlier in the calendar year lands in the next year
        assert_eq!(resolve_date("January 5", today), Some(d(Y + 1, 1, 5)));
        assert_eq!(resolve_date("25 December", today), Some(d(Y, 12, 25)));
        assert_eq!(resolve_date("March 1, 2025", today), Some(d(2025, 3, 1)));
    }

    #[test]
    fn test_past_dates_rejected() {
        let today = d(Y, 6, 10);
        assert_eq!(resolve_date("2024-06-09", today), None);
        assert_eq!(resolve_date("2020-01-01", today), None);
    }

    #[test]
    fn test_no_date_mention() {
        let today = d(Y, 6, 10);
        assert_eq!(resolve_date("I like machine learning", today), None);
    }
}
