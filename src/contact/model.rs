use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Untyped request body, keyed by form field name.
pub type RawSubmission = Map<String, Value>;

pub const FIELD_NAME: &str = "name";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_REASON: &str = "reason";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_CONSENT: &str = "consent";

/// Contact form body as sent by the website (documentation schema).
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ContactForm {
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    #[schema(example = "+1 555-123-4567")]
    pub phone: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[schema(example = "Sales")]
    pub reason: Option<String>,
    #[schema(example = "I would like a quote for your services.")]
    pub description: Option<String>,
    /// `"on"` from the HTML checkbox, or a JSON `true`.
    #[schema(value_type = Option<String>, example = "on")]
    pub consent: Option<Value>,
}

/// A submission that has passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub reason: String,
    pub description: String,
}

impl ContactSubmission {
    /// Extract the text fields from a sanitized, validated body.
    pub fn from_raw(raw: &RawSubmission) -> Self {
        let text = |field: &str| {
            raw.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            name: text(FIELD_NAME),
            phone: text(FIELD_PHONE),
            email: text(FIELD_EMAIL),
            reason: text(FIELD_REASON),
            description: text(FIELD_DESCRIPTION),
        }
    }
}

/// Request details the operator sees alongside the submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: String,
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self {
            client_ip: "Unknown".to_string(),
            user_agent: "Unknown".to_string(),
        }
    }
}

/// Opaque id returned to the submitter for follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference(String);

impl Reference {
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "JBR-{}-{}",
            Utc::now().timestamp_millis(),
            suffix[..8].to_uppercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
