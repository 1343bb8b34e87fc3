use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod contact;
pub mod health;
pub mod mailer;
pub mod pages;
pub mod rate_limit;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str =
    "Your message has been sent successfully! We will get back to you within 24 hours.";
pub const VALIDATION_MESSAGE: &str = "Please fix the following errors:";
pub const DISPATCH_FAILED_MESSAGE: &str =
    "Sorry, there was an error sending your message. Please try again or contact us directly.";

/// JSON body shared by every API response.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            reference: None,
            errors: None,
            error: None,
        }
    }

    pub fn sent(reference: String) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            reference: Some(reference),
            errors: None,
            error: None,
        }
    }

    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::failure(VALIDATION_MESSAGE)
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        let minutes = retry_after_secs.div_ceil(60).max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        Self::failure(&format!(
            "Too many contact form submissions. Please try again in {} {}.",
            minutes, unit
        ))
    }

    pub fn dispatch_failed(detail: Option<String>) -> Self {
        Self {
            error: detail,
            ..Self::failure(DISPATCH_FAILED_MESSAGE)
        }
    }
}

/// Mount everything under `/api`.
pub fn configure_api(body_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("/api")
                .configure(health::config)
                .configure(|cfg| contact::handlers::config(cfg, body_limit)),
        );
    }
}

pub async fn run() -> anyhow::Result<()> {
    // Loads `.env` too, so RUST_LOG from that file reaches the logger below.
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::contact::handlers::submit_contact,
            crate::health::health_check
        ),
        components(
            schemas(
                contact::model::ContactForm,
                ApiResponse,
                health::HealthResponse,
            )
        ),
        tags(
            (name = "Contact", description = "Contact form relay."),
            (name = "Health", description = "Liveness check.")
        )
    )]
    struct ApiDoc;

    let app_state = web::Data::new(
        AppState::new(config.clone()).context("Failed to create mail relay client")?,
    );

    let prometheus = PrometheusMetricsBuilder::new("jbr_website")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    let server = config.server.clone();
    log::info!("Starting server at http://{}:{}", server.host, server.port);
    log::info!("Mode: {:?}", config.mode);
    if config.server.trust_proxy {
        log::info!("Client addresses taken from forwarding headers (TRUST_PROXY)");
    }
    log::info!("Mail sender: {}", config.mail.sender);
    log::info!("Notifications go to: {}", config.mail.company_email);
    log::info!(
        "Contact limit: {} per {}s per client",
        config.contact.rate_limit_max,
        config.contact.rate_limit_window.as_secs()
    );

    let bind_addr = (server.host.clone(), server.port);
    let bind_label = format!("{}:{}", server.host, server.port);
    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();

        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);
        for origin in &server.allowed_origins {
            cors = if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            };
        }

        let security_headers = DefaultHeaders::new()
            .add(("X-Content-Type-Options", "nosniff"))
            .add(("X-Frame-Options", "SAMEORIGIN"))
            .add(("Referrer-Policy", "no-referrer"));

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .wrap(security_headers)
            .wrap(Logger::default())
            .app_data(app_state)
            .configure(configure_api(server.body_limit_bytes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| pages::config(cfg, &server.static_dir))
            .default_service(web::to(pages::not_found))
    })
    .bind(bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_label))?
    .run()
    .await
    .context("Server terminated with an error")
}
