// * Free-text date resolution for order cards.
// * Three strategies, tried by shape of the input:
// *   1. "today"-relative ("Aujourd'hui à 12h30") against an injected date
// *   2. delivery interval ("Mardi, 12/03/2024 (10h30 - 12h00)") collapsed
// *      to its midpoint
// *   3. standard ("Monday, 03/12/2024 at 12h30")
// * Day/month order follows the detected locale; unknown locale reads as
// * French (day first).

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::extract::locale::{detect_locale, DetectedLocale};

static TODAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Aujourd'hui|today)\s+(?:à|at)\s+(\d{1,2})h(\d{2})").unwrap()
});

static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:[A-Za-zéûèà]+,\s+)?(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\s+\((\d{1,2})h(\d{2})\s*-\s*(\d{1,2})h(\d{2})\)",
    )
    .unwrap()
});

static STANDARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:[A-Za-zéûèà]+,?\s+)?(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\s+(?:à|at)\s+(\d{1,2})h(\d{2})",
    )
    .unwrap()
});

/// A resolved absolute timestamp with its calendar components.
/// `full_date` and the components always agree; both are derivable
/// from one another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    pub full_date: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl ResolvedDate {
    pub fn from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            full_date: format_full_date(year, month, day, hour, minute),
            year,
            month,
            day,
            hour,
            minute,
        }
    }

    /// Re-splits a canonical `YYYY-MM-DD HH:MM` string into components.
    pub fn parse(full_date: &str) -> Option<Self> {
        let (date_part, time_part) = full_date.split_once(' ')?;
        let mut date_fields = date_part.splitn(3, '-');
        let year = date_fields.next()?.parse().ok()?;
        let month = date_fields.next()?.parse().ok()?;
        let day = date_fields.next()?.parse().ok()?;
        let (hour_str, minute_str) = time_part.split_once(':')?;
        let hour = hour_str.parse().ok()?;
        let minute = minute_str.parse().ok()?;
        Some(Self::from_parts(year, month, day, hour, minute))
    }

    /// `HH:MM` label used on the order record.
    pub fn hour_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Formats the canonical `YYYY-MM-DD HH:MM` representation.
pub fn format_full_date(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> String {
    format!("{year}-{month:02}-{day:02} {hour:02}:{minute:02}")
}

/// Resolves one free-text card date against an injected reference date.
///
/// Returns `None` on any failure to match the selected strategy's
/// sub-pattern; there is no partial result.
pub fn resolve_date(text: &str, today: NaiveDate) -> Option<ResolvedDate> {
    let text = text.trim();
    let locale = detect_locale(text);
    let lowered = text.to_lowercase();

    if lowered.starts_with("today") || lowered.starts_with("aujourd'hui") {
        resolve_today(text, today)
    } else if text.contains('(') {
        resolve_interval(text, locale)
    } else {
        resolve_standard(text, locale)
    }
}

// * "Aujourd'hui à 12h30" / "Today at 12h30": calendar date comes from
// * the caller, only the time is read from the text.
fn resolve_today(text: &str, today: NaiveDate) -> Option<ResolvedDate> {
    let caps = TODAY_RE.captures(text)?;
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    Some(ResolvedDate::from_parts(
        today.year(),
        today.month(),
        today.day(),
        hour,
        minute,
    ))
}

// * "Mardi, 12/03/2024 (10h30 - 12h00)": the displayed delivery window is
// * collapsed to its midpoint in minutes, rounded half-up. Windows that
// * span midnight normalize the end by +24h first, then reduce the hour
// * modulo 24.
fn resolve_interval(text: &str, locale: DetectedLocale) -> Option<ResolvedDate> {
    let caps = INTERVAL_RE.captures(text)?;
    let (day, month) = day_month_order(&caps[1], &caps[2], locale)?;
    let year = caps[3].parse().ok()?;

    let start_hour: u32 = caps[4].parse().ok()?;
    let start_minute: u32 = caps[5].parse().ok()?;
    let end_hour: u32 = caps[6].parse().ok()?;
    let end_minute: u32 = caps[7].parse().ok()?;

    let start_total = start_hour * 60 + start_minute;
    let mut end_total = end_hour * 60 + end_minute;
    if end_total < start_total {
        end_total += 24 * 60;
    }

    // * Half-up, pinned by tests; sums are non-negative so f64::round
    // * matches the original behavior exactly
    let midpoint = ((start_total + end_total) as f64 / 2.0).round() as u32;
    let hour = (midpoint / 60) % 24;
    let minute = midpoint % 60;

    Some(ResolvedDate::from_parts(year, month, day, hour, minute))
}

// * "Lundi, 12-03-2024 à 10h30": single explicit time, no interval.
fn resolve_standard(text: &str, locale: DetectedLocale) -> Option<ResolvedDate> {
    let caps = STANDARD_RE.captures(text)?;
    let (day, month) = day_month_order(&caps[1], &caps[2], locale)?;
    let year = caps[3].parse().ok()?;
    let hour = caps[4].parse().ok()?;
    let minute = caps[5].parse().ok()?;
    Some(ResolvedDate::from_parts(year, month, day, hour, minute))
}

// * English orders the group month-then-day; French and the unknown
// * default both read day-then-month.
fn day_month_order(first: &str, second: &str, locale: DetectedLocale) -> Option<(u32, u32)> {
    let a: u32 = first.parse().ok()?;
    let b: u32 = second.parse().ok()?;
    if locale.is_english {
        Some((b, a))
    } else {
        Some((a, b))
    }
}
