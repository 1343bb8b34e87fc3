use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::config::RuntimeMode;
use crate::mailer::MailerError;
use crate::ApiResponse;

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("failed to dispatch email: {0}")]
    Dispatch(#[from] MailerError),
}

impl ContactError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContactError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON response for the caller. Dispatch detail only leaves the server in
    /// development mode.
    pub fn to_response(&self, mode: RuntimeMode) -> HttpResponse {
        let body = match self {
            ContactError::Validation(errors) => ApiResponse::validation_failed(errors.clone()),
            ContactError::RateLimited { retry_after_secs } => {
                ApiResponse::rate_limited(*retry_after_secs)
            }
            ContactError::Dispatch(e) => {
                let detail = mode.exposes_error_detail().then(|| e.to_string());
                ApiResponse::dispatch_failed(detail)
            }
        };

        let mut response = HttpResponse::build(self.status_code());
        if let ContactError::RateLimited { retry_after_secs } = self {
            response.insert_header(("Retry-After", retry_after_secs.to_string()));
        }
        response.json(body)
    }
}
