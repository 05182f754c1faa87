//! Request logging middleware with a runtime-selectable detail level.

use super::super::state::ServerState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::{error, info};

/// How much of each request and response gets logged.
#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Bodies above this size are only logged by size.
const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let level = state.config.requests_logging_level.clone();
    if level == RequestsLoggingLevel::None {
        return next.run(request).await;
    }

    let started = Instant::now();
    info!(">>> {} {}", request.method(), request.uri());

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Req Headers", request.headers());
    }
    let request = if level >= RequestsLoggingLevel::Body {
        let (parts, body) = request.into_parts();
        match logged_body("Req Body", &parts.headers, body).await {
            Ok(body) => Request::from_parts(parts, body),
            Err(err) => {
                error!("Failed to read request body: {:?}", err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    } else {
        request
    };

    let response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Resp Headers", response.headers());
    }
    let response = if level >= RequestsLoggingLevel::Body {
        let (parts, body) = response.into_parts();
        match logged_body("Resp Body", &parts.headers, body).await {
            Ok(body) => Response::from_parts(parts, body),
            Err(err) => {
                error!("Failed to read response body: {:?}", err);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    } else {
        response
    };

    info!(
        "<<< {} ({}ms)",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

fn log_headers(label: &str, headers: &HeaderMap) {
    info!("  {}:", label);
    for (name, value) in headers.iter() {
        info!("    {:?}: {:?}", name, value);
    }
}

/// Content-Length as a number, if the header is present and readable.
fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Logs the body when it is small enough, handing back an equivalent body
/// since reading consumes the original.
async fn logged_body(label: &str, headers: &HeaderMap, body: Body) -> Result<Body, axum::Error> {
    let length = match declared_length(headers) {
        Some(length) => length,
        None => {
            info!("  {}: no readable Content-Length", label);
            return Ok(body);
        }
    };
    if length >= MAX_LOGGABLE_BODY_LENGTH {
        info!(
            "  {}: too big to log ({:#})",
            label,
            byte_unit::Byte::from(length)
        );
        return Ok(body);
    }
    let bytes = axum::body::to_bytes(body, length).await?;
    info!("  {}:\n{}", label, String::from_utf8_lossy(&bytes));
    Ok(Body::from(bytes))
}
