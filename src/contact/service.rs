//! Contact submission flow: sanitize, validate, compose, dispatch.

use chrono::Utc;
use std::sync::Arc;

use super::email::{format_submission_time, operator_notification, submitter_confirmation, EmailContext};
use super::error::ContactError;
use super::model::{ContactSubmission, RawSubmission, Reference, RequestMeta};
use super::validation::{sanitize_submission, validate_contact_form};
use crate::config::{AppConfig, MailConfig};
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    max_field_length: usize,
}

impl ContactService {
    pub fn new(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            mailer,
            mail: config.mail.clone(),
            max_field_length: config.contact.max_field_length,
        }
    }

    /// Process one submission and return its reference once every email has
    /// been handed to the mailer.
    pub async fn submit(
        &self,
        raw: RawSubmission,
        meta: RequestMeta,
    ) -> Result<Reference, ContactError> {
        let sanitized = sanitize_submission(raw, self.max_field_length);

        let errors = validate_contact_form(&sanitized);
        if !errors.is_empty() {
            log::warn!(
                "Contact form from {} failed validation: {:?}",
                meta.client_ip,
                errors
            );
            return Err(ContactError::Validation(errors));
        }

        let submission = ContactSubmission::from_raw(&sanitized);
        let reference = Reference::generate();
        let submitted_at = format_submission_time(Utc::now());
        let ctx = EmailContext {
            submission: &submission,
            meta: &meta,
            reference: &reference,
            submitted_at: &submitted_at,
        };

        let notification = operator_notification(&self.mail, &ctx);
        self.mailer.send(&notification).await.map_err(|e| {
            log::error!("Failed to send contact notification {}: {}", reference, e);
            ContactError::from(e)
        })?;
        log::info!("Contact notification {} sent to {}", reference, notification.to);

        if self.mail.send_confirmation {
            let confirmation = submitter_confirmation(&self.mail, &ctx);
            self.mailer.send(&confirmation).await.map_err(|e| {
                log::error!("Failed to send confirmation for {}: {}", reference, e);
                ContactError::from(e)
            })?;
            log::info!("Confirmation for {} sent to submitter", reference);
        }

        Ok(reference)
    }
}
