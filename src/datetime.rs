//! Natural-language date/time resolution
//!
//! Resolves one date/time expression relative to a reference instant,
//! preferring the future: a bare clock time that has already passed today
//! means tomorrow, and a weekday name means its next occurrence.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+(\d{1,6})\s+(minutes?|mins?|hours?|hrs?|days?|weeks?)\b")
        .expect("Invalid relative time regex")
});

static DAY_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(day after tomorrow|tomorrow|today|tonight)\b").expect("Invalid day regex")
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("Invalid ISO date regex")
});

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("Invalid weekday regex")
});

static MERIDIEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})(?::([0-5]\d))?\s*(am|pm)\b").expect("Invalid am/pm regex")
});

static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("Invalid clock regex"));

static NAMED_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(noon|midnight)\b").expect("Invalid named time regex"));

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Resolve the first date/time expression in `text` relative to `now`
pub fn resolve(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = text.to_lowercase();

    if let Some(caps) = RELATIVE.captures(&text) {
        let amount: i64 = caps[1].parse().ok()?;
        let delta = match caps[2].chars().next() {
            Some('m') => Duration::try_minutes(amount),
            Some('h') => Duration::try_hours(amount),
            Some('d') => Duration::try_days(amount),
            _ => Duration::try_weeks(amount),
        }?;
        return now.checked_add_signed(delta);
    }

    let date = resolve_date(&text, now.date());
    let time = resolve_time(&text);

    match (date, time) {
        (Some(date), Some(time)) => Some(date.and_time(time)),
        (Some(date), None) => {
            let time = if text.contains("tonight") {
                NaiveTime::from_hms_opt(20, 0, 0)?
            } else {
                now.time()
            };
            Some(date.and_time(time))
        }
        (None, Some(time)) => {
            let today = now.date().and_time(time);
            if today > now {
                Some(today)
            } else {
                today.checked_add_signed(Duration::days(1))
            }
        }
        (None, None) => None,
    }
}

fn resolve_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(caps) = DAY_WORD.captures(text) {
        let offset = match &caps[1] {
            "day after tomorrow" => 2,
            "tomorrow" => 1,
            _ => 0,
        };
        return today.checked_add_signed(Duration::days(offset));
    }

    if let Some(caps) = ISO_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let caps = WEEKDAY.captures(text)?;
    let target = WEEKDAYS.iter().position(|d| *d == &caps[1])? as i64;
    let current = today.weekday().num_days_from_monday() as i64;
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today.checked_add_signed(Duration::days(ahead))
}

fn resolve_time(text: &str) -> Option<NaiveTime> {
    if let Some(caps) = MERIDIEM.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if (1..=12).contains(&hour) {
            let hour = match (&caps[3], hour) {
                ("am", 12) => 0,
                ("am", h) => h,
                ("pm", 12) => 12,
                (_, h) => h + 12,
            };
            return NaiveTime::from_hms_opt(hour, minute, 0);
        }
    }

    if let Some(caps) = CLOCK.captures(text) {
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    match NAMED_TIME.captures(text)?.get(1)?.as_str() {
        "noon" => NaiveTime::from_hms_opt(12, 0, 0),
        _ => NaiveTime::from_hms_opt(0, 0, 0),
    }
}
