use std::sync::OnceLock;

use regex::Regex;

use crate::errors::AppError;

/// Korean mobile numbers as the wizard formats them.
pub const CONTACT_PATTERN: &str = r"^010-[0-9]{4}-[0-9]{4}$";

fn contact_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CONTACT_PATTERN).expect("contact pattern is a valid regex"))
}

pub fn is_valid_contact(contact: &str) -> bool {
    contact_regex().is_match(contact)
}

/// Strict check used by the intake endpoint. The raw string must already be
/// formatted; no trimming or reformatting happens here.
pub fn validate_contact(contact: &str) -> Result<(), AppError> {
    if is_valid_contact(contact) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "contact '{contact}' must look like 010-1234-5678"
        )))
    }
}

/// Formats typed digits as `NNN-NNNN-NNNN`, the way the wizard input does.
///
/// Non-digits are dropped and at most 11 digits are kept; shorter inputs are
/// formatted as far as they go (`0101` → `010-1`).
pub fn format_phone_number(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(11)
        .collect();

    match digits.len() {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
    }
}
