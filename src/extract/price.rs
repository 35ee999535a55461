// * Price text normalizer.
// * The site renders prices as "€3,00", "-€2,50" or the word "Free";
// * this parser is total: any input yields a finite number.

use regex::Regex;
use std::sync::LazyLock;

static FREE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)free").unwrap());

/// Parses a rendered price string into a signed amount.
///
/// Rules, in order:
/// - a case-insensitive "free" token anywhere yields 0.0
/// - a leading "-€" yields the negated magnitude
/// - otherwise the currency symbol is stripped, the decimal comma
///   converted to a dot, and the remainder parsed as a float
/// - anything unparsable (or non-finite) yields 0.0
pub fn parse_price(text: &str) -> f64 {
    if FREE_TOKEN.is_match(text) {
        return 0.0;
    }

    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("-€") {
        let magnitude = parse_float(rest);
        return -magnitude;
    }

    parse_float(trimmed)
}

// * Shared numeric tail: strip the euro sign, comma to dot, default 0.
fn parse_float(text: &str) -> f64 {
    let cleaned = text.replace('€', "").replace(',', ".");
    match cleaned.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
