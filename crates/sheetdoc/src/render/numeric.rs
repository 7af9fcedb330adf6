//! Numeric text detection

use once_cell::sync::Lazy;
use regex::Regex;

/// Currency words stripped before matching, longest first
const CURRENCY_TOKENS: [&str; 4] = ["جنيه", "مصري", "ج", "م"];

const ARABIC_MONTHS: [&str; 13] = [
    "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يونيه", "يوليو", "أغسطس", "سبتمبر",
    "أكتوبر", "نوفمبر", "ديسمبر",
];

static PLAIN_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+|\d+\.\d+|\d+\.\d+%|-?\d+)$").expect("valid regex")
});

static GROUPED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?\d{1,3}(?:,\d{3})+(?:\.\d+)?%?$").expect("valid regex")
});

/// Whether `text` reads as an amount, a percentage or a long figure
///
/// ```
/// use sheetdoc::render::numeric::is_numeric_text;
///
/// assert!(is_numeric_text("1,234.50"));
/// assert!(is_numeric_text("1500 جنيه"));
/// assert!(!is_numeric_text("30/06/2025"));
/// ```
pub fn is_numeric_text(text: &str) -> bool {
    let mut stripped = text.to_string();
    for token in CURRENCY_TOKENS {
        stripped = stripped.replace(token, "");
    }
    let trimmed = stripped.trim();
    let without_commas = trimmed.replace(',', "");

    if PLAIN_NUMBER.is_match(&without_commas) || GROUPED_NUMBER.is_match(trimmed) {
        return true;
    }

    let digits = text.chars().filter(char::is_ascii_digit).count();
    digits >= 6 && !looks_like_date(text)
}

fn looks_like_date(text: &str) -> bool {
    text.contains('/') || ARABIC_MONTHS.iter().any(|m| text.contains(m))
}
