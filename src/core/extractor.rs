use regex::Regex;
use std::sync::OnceLock;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Starts on a digit so a period or comma before the number ("Rs.45") is not part of it
    PATTERN.get_or_init(|| Regex::new(r"\d[\d.,]*").expect("valid number pattern"))
}

/// Reads the first number-like token in `text` as a price.
///
/// Leftmost match wins, so a crossed-out list price shown before the sale
/// price is read instead of it.
pub fn extract_number(text: Option<&str>) -> Option<f64> {
    let text = text?;
    if text.is_empty() {
        return None;
    }

    let normalized = text.replace('\u{a0}', " ");
    let token = number_pattern().find(&normalized)?.as_str();
    let digits = token.replace(',', "");

    digits.parse::<f64>().ok().filter(|n| n.is_finite())
}
