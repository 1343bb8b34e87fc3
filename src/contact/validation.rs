//! Sanitization and validation of contact form submissions.
//!
//! This rule set is the authoritative one. The browser runs a copy for instant
//! feedback, but nothing here assumes it did.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use super::model::{
    RawSubmission, FIELD_CONSENT, FIELD_DESCRIPTION, FIELD_EMAIL, FIELD_NAME, FIELD_PHONE,
    FIELD_REASON,
};

pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

pub const NAME_ERROR: &str = "Name is required and must be at least 2 characters long";
pub const PHONE_REQUIRED_ERROR: &str = "Phone number is required";
pub const PHONE_INVALID_ERROR: &str = "Please enter a valid phone number";
pub const EMAIL_REQUIRED_ERROR: &str = "Email address is required";
pub const EMAIL_INVALID_ERROR: &str = "Please enter a valid email address";
pub const REASON_ERROR: &str = "Please select a reason for contact";
pub const DESCRIPTION_ERROR: &str = "Message must be at least 10 characters long";
pub const CONSENT_ERROR: &str = "You must agree to be contacted";

lazy_static! {
    static ref PHONE_PATTERN: Regex = Regex::new(r"^[0-9\s+\-()]{8,}$").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Trim every string value and cap it at `max_length` characters.
///
/// Non-string values are left untouched so the validator can reject them.
pub fn sanitize_submission(raw: RawSubmission, max_length: usize) -> RawSubmission {
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(s.trim().chars().take(max_length).collect()),
                other => other,
            };
            (key, value)
        })
        .collect()
}

/// Check every field and return the violations in field order.
///
/// An empty list means the submission is valid.
pub fn validate_contact_form(data: &RawSubmission) -> Vec<String> {
    let mut errors = Vec::new();
    let text = |field: &str| data.get(field).and_then(Value::as_str).map(str::trim);

    if !text(FIELD_NAME).is_some_and(|name| name.chars().count() >= MIN_NAME_LENGTH) {
        errors.push(NAME_ERROR.to_string());
    }

    match text(FIELD_PHONE) {
        None | Some("") => errors.push(PHONE_REQUIRED_ERROR.to_string()),
        Some(phone) if !PHONE_PATTERN.is_match(phone) => {
            errors.push(PHONE_INVALID_ERROR.to_string())
        }
        Some(_) => {}
    }

    match text(FIELD_EMAIL) {
        None | Some("") => errors.push(EMAIL_REQUIRED_ERROR.to_string()),
        Some(email) if !EMAIL_PATTERN.is_match(email) => {
            errors.push(EMAIL_INVALID_ERROR.to_string())
        }
        Some(_) => {}
    }

    if text(FIELD_REASON).map_or(true, str::is_empty) {
        errors.push(REASON_ERROR.to_string());
    }

    if !text(FIELD_DESCRIPTION)
        .is_some_and(|description| description.chars().count() >= MIN_DESCRIPTION_LENGTH)
    {
        errors.push(DESCRIPTION_ERROR.to_string());
    }

    if !has_consent(data.get(FIELD_CONSENT)) {
        errors.push(CONSENT_ERROR.to_string());
    }

    errors
}

fn has_consent(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(consent)) => *consent,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("on") || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}
