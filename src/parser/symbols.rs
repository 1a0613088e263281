//! Formula symbol normalization.
//!
//! Manuscripts drafted in plain text spell model terms out in ASCII
//! (`R-squared`, `beta_1`). This pass rewrites them to the typographic
//! forms journals expect and NFC-normalizes the result.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

static R_SQUARED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bR-[sS]quared\b").expect("valid r-squared pattern"));

static BETA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\bbeta_|β)(\d+)").expect("valid beta pattern"));

/// Rewrite ASCII formula spellings and apply NFC normalization.
pub fn normalize_symbols(text: &str) -> String {
    let text = R_SQUARED.replace_all(text, "R²");
    let text = BETA.replace_all(&text, |caps: &Captures| {
        format!("β{}", subscript_digits(&caps[1]))
    });
    text.nfc().collect()
}

fn subscript_digits(digits: &str) -> String {
    digits
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x2080 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}
