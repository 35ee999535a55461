// * Locale detection from the leading weekday token of a date string.
// * Only the two site locales exist; anything else is "unknown" and
// * callers fall back to the French day/month order.

use regex::Regex;
use std::sync::LazyLock;

const ENGLISH_DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const FRENCH_DAYS: [&str; 7] = [
    "lundi",
    "mardi",
    "mercredi",
    "jeudi",
    "vendredi",
    "samedi",
    "dimanche",
];

// * Leading word token, optionally followed by a comma
static DAY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-zéûèà]+),?").unwrap());

/// Outcome of weekday-based locale detection. Both flags false is the
/// ambiguous "unknown locale" case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectedLocale {
    pub is_english: bool,
    pub is_french: bool,
}

/// Detects the locale of a date string from its leading weekday name.
pub fn detect_locale(text: &str) -> DetectedLocale {
    let mut detected = DetectedLocale::default();

    if let Some(caps) = DAY_TOKEN.captures(text) {
        let day_name = caps[1].to_lowercase();
        if ENGLISH_DAYS.contains(&day_name.as_str()) {
            detected.is_english = true;
        } else if FRENCH_DAYS.contains(&day_name.as_str()) {
            detected.is_french = true;
        }
    }

    detected
}
