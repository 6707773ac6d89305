//! Input validation for user records
//!
//! Rules are checked in a fixed order and the first violation is reported.
//! Lengths are measured in bytes.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::NewUser;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

// Optional dial prefix, digit groups with separators, optional extension.
const PHONE_PATTERN: &str = r"^(?:(?:\(?(?:00|\+)([1-4][0-9][0-9]|[1-9][0-9]?)\)?)?[-. \\/]?)?((?:\(?[0-9]+\)?[-. \\/]?)*)(?:[-. \\/]?(?:#|ext\.?|extension|x)[-. \\/]?([0-9]+))?$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("Failed to compile email regex"))
}

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(PHONE_PATTERN).expect("Failed to compile phone regex"))
}

fn length_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len())
}

/// Validate a user record before it is persisted
///
/// Returns the reason of the first violated rule.
pub fn validate_user(user: &NewUser) -> Result<(), String> {
    if !length_between(&user.first_name, 2, 255) {
        return Err("Length of FirstName is not between 2-255 characters".to_string());
    }

    if !length_between(&user.last_name, 2, 255) {
        return Err("Length of LastName is not between 2-255 characters".to_string());
    }

    if !length_between(&user.password, 8, 255) {
        return Err("Length of Password is not between 8-255 characters".to_string());
    }

    validate_email(&user.email)?;
    validate_telephone(&user.telephone)
}

/// Validate email length and format
pub fn validate_email(email: &str) -> Result<(), String> {
    if !length_between(email, 5, 255) {
        return Err("Length of the email is not between 5-255 characters".to_string());
    }

    if !email_regex().is_match(email) {
        return Err("Email is not a valid address".to_string());
    }

    Ok(())
}

/// Validate telephone length and format
pub fn validate_telephone(telephone: &str) -> Result<(), String> {
    if !length_between(telephone, 5, 50) {
        return Err("Length of the telephone number is not between 5-50 characters".to_string());
    }

    if !phone_regex().is_match(telephone) {
        return Err("Telephone number is not a valid number".to_string());
    }

    Ok(())
}
