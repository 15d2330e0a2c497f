//! Input validation for user-facing requests.
//!
//! Validators return a human readable reason; callers collect them per field
//! into [`Violation`]s so both transports report the same problems.

use regex::Regex;
use std::fmt;

const MIN_USERNAME: usize = 3;
const MIN_PASSWORD: usize = 6;
const MIN_FULL_NAME: usize = 3;
const MIN_EMAIL: usize = 6;
const MAX_LENGTH: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Join violations into one message, e.g. `username: ...; password: ...`.
#[must_use]
pub fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn check_length(value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(format!("must contain {min}-{max} characters"));
    }
    Ok(())
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

/// # Errors
/// Returns the reason the username is rejected.
pub fn username(value: &str) -> Result<(), String> {
    check_length(value, MIN_USERNAME, MAX_LENGTH)?;
    if !matches(r"^[a-zA-Z0-9_]+$", value) {
        return Err("must contain only letters, digits, or underscore".to_string());
    }
    Ok(())
}

/// # Errors
/// Returns the reason the password is rejected.
pub fn password(value: &str) -> Result<(), String> {
    check_length(value, MIN_PASSWORD, MAX_LENGTH)
}

/// # Errors
/// Returns the reason the full name is rejected.
pub fn full_name(value: &str) -> Result<(), String> {
    check_length(value, MIN_FULL_NAME, MAX_LENGTH)?;
    if !matches(r"^[a-zA-Z]+( [a-zA-Z]+)*$", value) {
        return Err("must contain only letters or spaces".to_string());
    }
    Ok(())
}

/// # Errors
/// Returns the reason the email is rejected.
pub fn email(value: &str) -> Result<(), String> {
    check_length(value, MIN_EMAIL, MAX_LENGTH)?;
    if !matches(r"^[^@\s]+@[^@\s]+\.[^@\s]+$", value) {
        return Err("is not a valid email address".to_string());
    }
    Ok(())
}

/// Run each `(field, result)` pair and keep the failures.
#[must_use]
pub fn collect(checks: Vec<(&'static str, Result<(), String>)>) -> Vec<Violation> {
    checks
        .into_iter()
        .filter_map(|(field, result)| result.err().map(|reason| Violation { field, reason }))
        .collect()
}

/// Validate a login request.
#[must_use]
pub fn login(username_value: &str, password_value: &str) -> Vec<Violation> {
    collect(vec![
        ("username", username(username_value)),
        ("password", password(password_value)),
    ])
}

/// Validate a create-user request.
#[must_use]
pub fn create_user(
    username_value: &str,
    full_name_value: &str,
    email_value: &str,
    password_value: &str,
) -> Vec<Violation> {
    collect(vec![
        ("username", username(username_value)),
        ("full_name", full_name(full_name_value)),
        ("email", email(email_value)),
        ("password", password(password_value)),
    ])
}
