// File: src/validation/validators.rs
// Purpose: Basic field validators

use once_cell::sync::Lazy;
use regex::Regex;

// Email validation regex
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Check that a string has visible content after trimming
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Validate password length against a configured minimum
pub fn validate_password(password: &str, min_len: usize) -> Result<(), String> {
    if password.len() < min_len {
        return Err(format!("Password must be at least {} characters", min_len));
    }
    Ok(())
}
