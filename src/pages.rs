//! Marketing pages and other static assets.

use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{web, HttpResponse};
use std::path::Path;

use crate::{ApiResponse, AppState};

async fn open_page(state: &AppState, page: &str) -> actix_web::Result<NamedFile> {
    let path = Path::new(&state.config.server.static_dir).join(page);
    Ok(NamedFile::open_async(path).await?)
}

pub async fn index(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    open_page(&state, "index.html").await
}

pub async fn about(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    open_page(&state, "about.html").await
}

pub async fn contact(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    open_page(&state, "contact.html").await
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::failure("Route not found"))
}

pub fn config(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/about").route(web::get().to(about)))
        .service(web::resource("/contact").route(web::get().to(contact)))
        .service(Files::new("/", static_dir).default_handler(fn_service(
            |req: ServiceRequest| async move {
                let (req, _) = req.into_parts();
                let response = not_found().await;
                Ok::<_, actix_web::Error>(ServiceResponse::new(req, response))
            },
        )));
}
