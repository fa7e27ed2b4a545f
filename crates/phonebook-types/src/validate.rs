//! Contact field validation.
//!
//! Phone grammar, applied after trimming surrounding whitespace:
//! - The first character is `+` or a digit
//! - At least 5 more characters follow
//! - Every following character is a digit, `-`, a space, `(` or `)`
//!
//! A digit is any Unicode decimal digit (`Nd`), so Arabic-Indic and
//! fullwidth numerals are accepted alongside ASCII ones. The tail is not
//! required to contain any digits, so `"1-----"` is accepted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

/// `\d` is Unicode-aware in `regex` unless the `u` flag is cleared.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+\d][\d\- ()]{5,}$").expect("phone pattern is a valid regex"));

/// Trim a contact name, rejecting names that are empty afterwards.
///
/// # Examples
///
/// ```
/// use phonebook_types::validate_name;
///
/// assert_eq!(validate_name("  Alice ").unwrap(), "Alice");
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Trim a phone number and check it against the phone grammar.
///
/// # Examples
///
/// ```
/// use phonebook_types::validate_phone;
///
/// assert_eq!(validate_phone(" +1 (415) 555-0133 ").unwrap(), "+1 (415) 555-0133");
/// assert!(validate_phone("1234").is_err());
/// assert!(validate_phone("abc").is_err());
/// ```
pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let phone = raw.trim();
    if is_valid_phone(phone) {
        Ok(phone.to_string())
    } else {
        Err(ValidationError::InvalidPhone {
            phone: phone.to_string(),
        })
    }
}

/// Comments are free text; they are only trimmed.
pub fn normalize_comment(raw: &str) -> String {
    raw.trim().to_string()
}

fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}
