//! Fixed-window rate limiting for the contact endpoint.
//!
//! Each client address gets a counter that lives for one window. The counters
//! sit in a moka cache whose time-to-live equals the window, so stale windows
//! are evicted on their own.

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpRequest};
use moka::future::Cache;
use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::contact::error::ContactError;
use crate::AppState;

const MAX_TRACKED_CLIENTS: u64 = 100_000;

pub const HEADER_LIMIT: &str = "ratelimit-limit";
pub const HEADER_REMAINING: &str = "ratelimit-remaining";
pub const HEADER_RESET: &str = "ratelimit-reset";

struct WindowState {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Cache<String, Arc<Mutex<WindowState>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let windows = Cache::builder()
            .time_to_live(window)
            .max_capacity(MAX_TRACKED_CLIENTS)
            .build();

        Self {
            max_requests,
            window,
            windows,
        }
    }

    /// Count one request for `key` and report whether it fits in the window.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let entry = self
            .windows
            .get_with(key.to_string(), async {
                Arc::new(Mutex::new(WindowState {
                    started: Instant::now(),
                    count: 0,
                }))
            })
            .await;

        let mut state = entry.lock();
        let now = Instant::now();
        if now.duration_since(state.started) >= self.window {
            state.started = now;
            state.count = 0;
        }

        let remaining_window = self.window.saturating_sub(now.duration_since(state.started));
        let reset_secs = ceil_secs(remaining_window).max(1);

        if state.count >= self.max_requests {
            return RateLimitDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_secs,
            };
        }

        state.count += 1;
        RateLimitDecision {
            allowed: true,
            limit: self.max_requests,
            remaining: self.max_requests - state.count,
            reset_secs,
        }
    }
}

/// Middleware for `actix_web::middleware::from_fn`. Over-limit requests get a
/// 429 and never reach the handler.
pub async fn limit_contact_submissions<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
        log::warn!("Rate limiter has no application state; letting request through");
        return Ok(next.call(req).await?.map_into_left_body());
    };

    let client = client_address(req.request(), state.config.server.trust_proxy);
    let decision = state.rate_limiter.check(&client).await;

    if !decision.allowed {
        log::warn!("Contact rate limit exceeded for {}", client);
        let mut response = ContactError::RateLimited {
            retry_after_secs: decision.reset_secs,
        }
        .to_response(state.config.mode);
        attach_headers(response.headers_mut(), &decision);
        return Ok(req.into_response(response).map_into_right_body());
    }

    let mut response = next.call(req).await?;
    attach_headers(response.headers_mut(), &decision);
    Ok(response.map_into_left_body())
}

/// Client address without port. Forwarding headers are only consulted when
/// `trust_proxy` is set; otherwise the socket peer is used.
pub fn client_address(req: &HttpRequest, trust_proxy: bool) -> String {
    if !trust_proxy {
        return req
            .peer_addr()
            .map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string());
    }

    let info = req.connection_info();
    match info.realip_remote_addr() {
        Some(raw) => parse_ip(raw).map_or_else(|| raw.to_string(), |ip| ip.to_string()),
        None => "unknown".to_string(),
    }
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

fn attach_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(
        HeaderName::from_static(HEADER_LIMIT),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static(HEADER_REMAINING),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static(HEADER_RESET),
        HeaderValue::from(decision.reset_secs),
    );
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
