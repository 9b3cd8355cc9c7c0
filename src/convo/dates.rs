//! Due-date phrase parsing
//!
//! Focused, high-precision catcher for the date phrases users actually say
//! when creating a task: today/tomorrow, explicit ISO dates, month-name
//! days, and weekdays with an optional "next".

use std::sync::LazyLock;

use chrono::{Datelike, Days, FixedOffset, NaiveDate, Utc, Weekday};
use regex::Regex;

static TODAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btoday\b").expect("valid regex"));

static TOMORROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btomorrow\b").expect("valid regex"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid regex"));

static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z]{3,9})\s+(\d{1,2})\b").expect("valid regex"));

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(next\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("valid regex")
});

/// Today's date in the configured UTC offset
#[must_use]
pub fn local_today(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

/// Parse a due date out of free text, relative to `today`
///
/// Recognizes, in order: "today"/"tomorrow", `YYYY-MM-DD`, month-name day
/// ("Oct 26" rolls to next year once passed), and weekday phrases ("friday"
/// means the next occurrence; "next friday" adds a further week).
#[must_use]
pub fn parse_due_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if text.trim().is_empty() {
        return None;
    }
    let t = text.to_lowercase();

    if TODAY.is_match(&t) {
        return Some(today);
    }
    if TOMORROW.is_match(&t) {
        return today.checked_add_days(Days::new(1));
    }

    iso_date(&t)
        .or_else(|| month_day(&t, today))
        .or_else(|| weekday(&t, today))
}

/// Explicit `YYYY-MM-DD`
fn iso_date(t: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(t)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month-name + day ("Oct 26", "october 5"); past dates roll to next year
fn month_day(t: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = MONTH_DAY.captures(t)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;

    let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if candidate < today {
        return Some(NaiveDate::from_ymd_opt(today.year() + 1, month, day).unwrap_or(candidate));
    }
    Some(candidate)
}

/// Weekday phrases; a bare weekday means the next occurrence (a week out if
/// said on that same weekday), "next" pushes one week further
fn weekday(t: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = WEEKDAY.captures(t)?;
    let target = match &caps[2] {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        _ => Weekday::Sun,
    };

    let mut delta =
        u64::from((target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7);
    if delta == 0 {
        delta = 7;
    }
    if caps.get(1).is_some() {
        delta += 7;
    }
    today.checked_add_days(Days::new(delta))
}

fn month_number(word: &str) -> Option<u32> {
    let full = match word {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" | "sept" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    };
    if full.is_some() {
        return full;
    }

    match word.get(..3)? {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}
