use actix_web::body::BoxBody;
use actix_web::http::header::USER_AGENT;
use actix_web::middleware::from_fn;
use actix_web::{error, web, Either, HttpRequest, HttpResponse, Responder};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::contact::model::{ContactForm, RawSubmission, RequestMeta};
use crate::rate_limit::{client_address, limit_contact_submissions};
use crate::{ApiResponse, AppState};

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactForm,
    responses(
        (status = 200, description = "Message sent", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 429, description = "Too many submissions from this client", body = ApiResponse),
        (status = 500, description = "Email could not be sent", body = ApiResponse)
    )
)]
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: Either<web::Json<Value>, web::Form<HashMap<String, String>>>,
) -> impl Responder {
    let raw: RawSubmission = match body {
        Either::Left(json) => match json.into_inner() {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        Either::Right(form) => form
            .into_inner()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    };

    let meta = RequestMeta {
        client_ip: client_address(&req, state.config.server.trust_proxy),
        user_agent: req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("Unknown")
            .to_string(),
    };
    log::info!("Contact form submission received from {}", meta.client_ip);

    match state.contact.submit(raw, meta).await {
        Ok(reference) => HttpResponse::Ok().json(ApiResponse::sent(reference.into_string())),
        Err(e) => e.to_response(state.config.mode),
    }
}

fn invalid_body(err: impl std::fmt::Display) -> actix_web::Error {
    log::warn!("Rejected unreadable contact form body: {}", err);
    error::InternalError::from_response(
        err.to_string(),
        HttpResponse::BadRequest().json(ApiResponse::failure("Invalid request body")),
    )
    .into()
}

pub fn config(cfg: &mut web::ServiceConfig, body_limit: usize) {
    cfg.service(
        web::resource("/contact")
            .app_data(web::PayloadConfig::new(body_limit))
            .app_data(
                web::JsonConfig::default()
                    .limit(body_limit)
                    .error_handler(|err, _req| invalid_body(err)),
            )
            .app_data(
                web::FormConfig::default()
                    .limit(body_limit)
                    .error_handler(|err, _req| invalid_body(err)),
            )
            .wrap(from_fn(limit_contact_submissions::<BoxBody>))
            .route(web::post().to(submit_contact)),
    );
}
