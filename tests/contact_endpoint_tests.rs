mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use jbr_website_server::config::RuntimeMode;
use jbr_website_server::contact::validation::{
    CONSENT_ERROR, DESCRIPTION_ERROR, EMAIL_REQUIRED_ERROR, NAME_ERROR, PHONE_INVALID_ERROR,
    PHONE_REQUIRED_ERROR, REASON_ERROR,
};
use jbr_website_server::rate_limit::{HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET};
use jbr_website_server::{configure_api, ApiResponse, SUCCESS_MESSAGE, VALIDATION_MESSAGE};
use serde_json::{json, Value};
use std::net::SocketAddr;

use common::{
    test_config, test_config_with_mode, test_state, valid_submission, MockMailer, TEST_BODY_LIMIT,
};

fn peer(addr: &str) -> SocketAddr {
    addr.parse().expect("valid socket address")
}

fn relaxed_config(mode: RuntimeMode) -> jbr_website_server::AppConfig {
    let mut config = test_config_with_mode(mode);
    config.contact.rate_limit_max = 100;
    config
}

#[actix_web::test]
async fn test_valid_submission_is_sent() {
    let mailer = MockMailer::new();
    let state = test_state(relaxed_config(RuntimeMode::Production), mailer.clone());
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .peer_addr(peer("203.0.113.1:51000"))
        .insert_header(("user-agent", "integration-test"))
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse = test::read_body_json(resp).await;
    assert!(body.success);
    assert_eq!(body.message, SUCCESS_MESSAGE);
    assert!(body.reference.as_deref().is_some_and(|r| !r.is_empty()));
    assert!(body.errors.is_none());

    let sent = mailer.sent().await;
    assert_eq!(mailer.calls(), 2);
    assert_eq!(sent[0].to, "journeybeyondresultspvtltd@gmail.com");
    assert_eq!(sent[0].reply_to.as_deref(), Some("jane@example.com"));
    assert!(sent[0].text.contains("203.0.113.1"));
    assert!(sent[0].html.contains("integration-test"));
    assert_eq!(sent[1].to, "jane@example.com");
    assert!(sent[1]
        .text
        .contains(body.reference.as_deref().unwrap_or_default()));
}

#[actix_web::test]
async fn test_confirmation_can_be_disabled() {
    let mut config = relaxed_config(RuntimeMode::Production);
    config.mail.send_confirmation = false;
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(config, mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(mailer.calls(), 1);
}

#[actix_web::test]
async fn test_missing_fields_are_rejected_without_sending() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let cases = [
        ("name", NAME_ERROR),
        ("phone", PHONE_REQUIRED_ERROR),
        ("email", EMAIL_REQUIRED_ERROR),
        ("reason", REASON_ERROR),
        ("description", DESCRIPTION_ERROR),
        ("consent", CONSENT_ERROR),
    ];

    for (field, message) in cases {
        let mut body = valid_submission();
        if let Some(map) = body.as_object_mut() {
            map.remove(field);
        }

        let req = test::TestRequest::post()
            .uri("/api/contact")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "missing {}", field);
        let body: ApiResponse = test::read_body_json(resp).await;
        assert!(!body.success);
        assert_eq!(body.message, VALIDATION_MESSAGE);
        assert_eq!(body.errors, Some(vec![message.to_string()]));
    }

    assert_eq!(mailer.calls(), 0);
}

#[actix_web::test]
async fn test_letters_in_phone_are_rejected() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let mut body = valid_submission();
    body["phone"] = json!("abc-defg");
    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ApiResponse = test::read_body_json(resp).await;
    assert_eq!(body.errors, Some(vec![PHONE_INVALID_ERROR.to_string()]));
    assert_eq!(mailer.calls(), 0);
}

#[actix_web::test]
async fn test_form_encoded_submission() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_form([
            ("name", "Jane Doe"),
            ("phone", "+1 555-123-4567"),
            ("email", "jane@example.com"),
            ("reason", "Partnership"),
            ("description", "Let us talk about a partnership."),
            ("consent", "on"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(mailer.calls(), 2);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_form([
            ("name", "Jane Doe"),
            ("phone", "+1 555-123-4567"),
            ("email", "jane@example.com"),
            ("reason", "Partnership"),
            ("description", "Let us talk about a partnership."),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ApiResponse = test::read_body_json(resp).await;
    assert_eq!(body.errors, Some(vec![CONSENT_ERROR.to_string()]));
    assert_eq!(mailer.calls(), 2);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ malformed json ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ApiResponse = test::read_body_json(resp).await;
    assert!(!body.success);
    assert_eq!(body.message, "Invalid request body");
    assert_eq!(mailer.calls(), 0);
}

#[actix_web::test]
async fn test_non_object_json_fails_every_field() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!(["Jane Doe", "jane@example.com"]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ApiResponse = test::read_body_json(resp).await;
    assert_eq!(body.errors.map(|e| e.len()), Some(6));
}

#[actix_web::test]
async fn test_long_fields_are_truncated_before_sending() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let mut body = valid_submission();
    body["description"] = json!("x".repeat(5000));
    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let sent = mailer.sent().await;
    assert!(sent[0].text.contains(&"x".repeat(1000)));
    assert!(!sent[0].text.contains(&"x".repeat(1001)));
}

#[actix_web::test]
async fn test_dispatch_failure_hides_detail_in_production() {
    let mailer = MockMailer::failing();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Production), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body.get("error").is_none());
    assert!(body.get("reference").is_none());
    assert_eq!(mailer.calls(), 1);
}

#[actix_web::test]
async fn test_dispatch_failure_shows_detail_in_development() {
    let mailer = MockMailer::failing();
    let app = test::init_service(
        App::new()
            .app_data(test_state(relaxed_config(RuntimeMode::Development), mailer))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("authentication failed")));
    assert!(body.get("reference").is_none());
}

#[actix_web::test]
async fn test_rate_limit_rejects_fourth_submission() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(test_config(), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    for expected_remaining in ["2", "1", "0"] {
        let req = test::TestRequest::post()
            .uri("/api/contact")
            .peer_addr(peer("198.51.100.20:40000"))
            .set_json(valid_submission())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(HEADER_REMAINING)
                .and_then(|v| v.to_str().ok()),
            Some(expected_remaining)
        );
    }

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .peer_addr(peer("198.51.100.20:40000"))
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));
    assert!(resp.headers().contains_key(HEADER_LIMIT));
    assert!(resp.headers().contains_key(HEADER_RESET));
    let body: ApiResponse = test::read_body_json(resp).await;
    assert!(!body.success);
    assert!(body.message.starts_with("Too many contact form submissions"));

    // three notifications plus three confirmations, nothing for the rejected one
    assert_eq!(mailer.calls(), 6);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .peer_addr(peer("198.51.100.21:40000"))
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_rate_limit_runs_before_validation() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(test_config(), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/contact")
            .peer_addr(peer("192.0.2.99:40000"))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .peer_addr(peer("192.0.2.99:40000"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: ApiResponse = test::read_body_json(resp).await;
    assert!(body.errors.is_none());
    assert_eq!(mailer.calls(), 0);
}

#[actix_web::test]
async fn test_rotating_forwarded_header_does_not_bypass_limit() {
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(test_config(), mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    let mut accepted = 0;
    for i in 1..=10 {
        let req = test::TestRequest::post()
            .uri("/api/contact")
            .peer_addr(peer("10.9.9.9:4000"))
            .insert_header(("x-forwarded-for", format!("203.0.113.{}", i)))
            .set_json(valid_submission())
            .to_request();
        let resp = test::call_service(&app, req).await;

        if resp.status() == StatusCode::OK {
            accepted += 1;
        } else {
            assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS, "request {}", i);
            assert!(i > 3);
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(mailer.calls(), 6);
}

#[actix_web::test]
async fn test_trusted_proxy_limits_by_forwarded_address() {
    let mut config = test_config();
    config.server.trust_proxy = true;
    let mailer = MockMailer::new();
    let app = test::init_service(
        App::new()
            .app_data(test_state(config, mailer.clone()))
            .configure(configure_api(TEST_BODY_LIMIT)),
    )
    .await;

    for forwarded in ["203.0.113.50", "203.0.113.50", "203.0.113.50", "203.0.113.51"] {
        let req = test::TestRequest::post()
            .uri("/api/contact")
            .peer_addr(peer("10.0.0.2:4000"))
            .insert_header(("x-forwarded-for", forwarded))
            .set_json(valid_submission())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "client {}", forwarded);
    }

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .peer_addr(peer("10.0.0.2:4000"))
        .insert_header(("x-forwarded-for", "203.0.113.50"))
        .set_json(valid_submission())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let sent = mailer.sent().await;
    assert!(sent[0].text.contains("203.0.113.50"));
}
