//! Shared application state, built once at startup and handed to actix as
//! `web::Data`.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::contact::service::ContactService;
use crate::mailer::{HttpMailer, Mailer};
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub contact: ContactService,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// State backed by the HTTP mail relay from `config`.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = HttpMailer::build_client(&config.mail)?;
        let mailer = Arc::new(HttpMailer::new(&config.mail, http_client));
        Ok(Self::new_with_mailer(config, mailer))
    }

    pub fn new_with_mailer(config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        let contact = ContactService::new(&config, mailer);
        let rate_limiter = RateLimiter::new(
            config.contact.rate_limit_max,
            config.contact.rate_limit_window,
        );

        AppState {
            config: Arc::new(config),
            contact,
            rate_limiter,
        }
    }
}
