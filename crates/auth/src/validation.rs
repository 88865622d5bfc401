//! Input validation for credentials and profile fields.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

/// Trim and lowercase an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a normalized email
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".into()));
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(AuthError::Validation("Email too long".into()));
    }

    let matches = EMAIL_RE
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false);
    if !matches {
        return Err(AuthError::Validation("Invalid email format".into()));
    }

    Ok(())
}

/// Validate password length requirements
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".into()));
    }

    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    if len > MAX_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters long"
        )));
    }

    Ok(())
}

/// Validate a display name; returns the trimmed value.
pub fn validate_name(name: &str) -> Result<String, AuthError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation("Name is required".into()));
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AuthError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters long"
        )));
    }

    Ok(trimmed.to_string())
}
