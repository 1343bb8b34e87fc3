//! Outbound email delivery.
//!
//! The contact handler only sees the [`Mailer`] trait. The production
//! implementation posts each message as JSON to an HTTP mail relay, using the
//! sender account credentials as basic auth.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MailConfig;

/// One composed email, ready for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("mail relay request timed out")]
    Timeout,

    #[error("mail relay transport error: {0}")]
    Transport(String),

    #[error("mail relay rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError>;
}

pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    username: String,
    password: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Client with the per-call timeout from `config`.
    pub fn build_client(config: &MailConfig) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("jbr-website-server/", env!("CARGO_PKG_VERSION")))
            .build()
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailerError> {
        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailerError::Timeout
                } else {
                    MailerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            log::debug!("Mail relay accepted message to {}", message.to);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailerError::Rejected {
            status: status.as_u16(),
            message: body,
        })
    }
}
