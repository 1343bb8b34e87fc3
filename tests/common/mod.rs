//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jbr_website_server::config::{AppConfig, MailConfig, RuntimeMode};
use jbr_website_server::mailer::{Mailer, MailerError, OutboundMessage};
use jbr_website_server::AppState;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory mailer that records every message it is asked to send.
pub struct MockMailer {
    sent: tokio::sync::Mutex<Vec<OutboundMessage>>,
    calls: AtomicUsize,
    fail: bool,
}

impl MockMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: tokio::sync::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: tokio::sync::Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MailerError::Rejected {
                status: 535,
                message: "authentication failed".to_string(),
            });
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

pub const TEST_BODY_LIMIT: usize = 64 * 1024;

pub fn test_config() -> AppConfig {
    AppConfig::new(MailConfig::new(
        "http://mail.test/send",
        "website@jbr.example",
        "app-password",
    ))
}

pub fn test_config_with_mode(mode: RuntimeMode) -> AppConfig {
    let mut config = test_config();
    config.mode = mode;
    config
}

pub fn test_state(config: AppConfig, mailer: Arc<dyn Mailer>) -> actix_web::web::Data<AppState> {
    actix_web::web::Data::new(AppState::new_with_mailer(config, mailer))
}

pub fn valid_submission() -> Value {
    json!({
        "name": "Jane Doe",
        "phone": "+1 555-123-4567",
        "email": "jane@example.com",
        "reason": "Sales",
        "description": "I would like a quote for your services.",
        "consent": true
    })
}
