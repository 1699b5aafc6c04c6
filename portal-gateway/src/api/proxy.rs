use crate::errors::ApiError;
use crate::state::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Method, Request, Response},
    response::IntoResponse,
};
use http::header::{HeaderName, CONTENT_LENGTH, HOST};
use http_body_util::LengthLimitError;
use reqwest::Client;
use std::error::Error as StdError;
use thiserror::Error;

/// Path prefix routed to the backend API
pub(super) const BACKEND_PREFIX: &str = "/api/backend";

/// Connection-level headers that must not be copied between hops
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(Method),
    #[error("Request body exceeds the {0} byte limit")]
    BodyTooLarge(usize),
    #[error("Failed to read request body")]
    RequestBody(#[source] axum::Error),
    #[error("Request timed out while connecting to {0} server")]
    Timeout(&'static str),
    #[error("Connection error occurred while connecting to {0} server")]
    Connect(&'static str),
    #[error("Failed to send request to {upstream} server: {source}")]
    Send {
        upstream: &'static str,
        source: reqwest::Error,
    },
    #[error("Failed to read response body from {upstream} server")]
    ResponseBody {
        upstream: &'static str,
        source: reqwest::Error,
    },
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::UnsupportedMethod(_) => ApiError::method_not_allowed(err),
            ProxyError::BodyTooLarge(_) => ApiError::payload_too_large(err),
            _ => ApiError::bad_gateway(err),
        }
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Forward a request to `url` and relay the upstream response unchanged.
///
/// Request bodies larger than `max_body_size` bytes are refused.
pub(crate) async fn forward_request(
    client: &Client,
    upstream: &'static str,
    url: &str,
    max_body_size: usize,
    req: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let method = match *req.method() {
        Method::GET
        | Method::POST
        | Method::PUT
        | Method::DELETE
        | Method::PATCH
        | Method::HEAD
        | Method::OPTIONS => req.method().clone(),
        _ => return Err(ProxyError::UnsupportedMethod(req.method().clone())),
    };

    log::debug!("Forwarding request to {}: {} {}", upstream, method, url);
    let mut req_builder = client.request(method, url);

    // Forward headers, the client sets Host and Content-Length itself
    for (key, value) in req.headers() {
        if *key == HOST || *key == CONTENT_LENGTH || is_hop_by_hop(key) {
            continue;
        }
        req_builder = req_builder.header(key, value);
    }

    let declared_length = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared_length.is_some_and(|length| length > max_body_size) {
        return Err(ProxyError::BodyTooLarge(max_body_size));
    }

    let body_bytes = to_bytes(req.into_body(), max_body_size)
        .await
        .map_err(|e| {
            if e.source().is_some_and(|source| source.is::<LengthLimitError>()) {
                ProxyError::BodyTooLarge(max_body_size)
            } else {
                ProxyError::RequestBody(e)
            }
        })?;
    if !body_bytes.is_empty() {
        req_builder = req_builder.body(body_bytes);
    }

    let response = req_builder.send().await.map_err(|e| {
        log::error!(
            "Failed to send request: {} ({:?})\nURL: {}\nSource error: {:?}",
            e,
            e.status(),
            url,
            e.source()
        );
        if e.is_timeout() {
            ProxyError::Timeout(upstream)
        } else if e.is_connect() {
            ProxyError::Connect(upstream)
        } else {
            ProxyError::Send {
                upstream,
                source: e,
            }
        }
    })?;

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.bytes().await.map_err(|e| {
        log::error!("Failed to read response body: {}", e);
        if e.is_timeout() {
            ProxyError::Timeout(upstream)
        } else {
            ProxyError::ResponseBody {
                upstream,
                source: e,
            }
        }
    })?;

    let mut resp = Response::new(Body::from(bytes));
    *resp.status_mut() = status;
    for (key, value) in headers.iter() {
        if *key == CONTENT_LENGTH || is_hop_by_hop(key) {
            continue;
        }
        // append keeps repeated headers such as Set-Cookie
        resp.headers_mut().append(key, value.clone());
    }

    Ok(resp)
}

/// Forward /api/backend/* to the backend API with the prefix stripped
pub(super) async fn proxy_to_backend(
    State(state): State<AppState>,
    req: Request<Body>,
) -> impl IntoResponse {
    let path = req
        .uri()
        .path()
        .strip_prefix(BACKEND_PREFIX)
        .unwrap_or_default()
        .to_string();
    let query = req
        .uri()
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let url = state.config.upstream.backend_url(format!("{path}{query}"));

    let limit = state.config.upstream.max_body_size;
    match forward_request(&state.upstream_client, "backend", &url, limit, req).await {
        Ok(resp) => resp,
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Forward everything else (pages, assets) to the frontend server
pub(super) async fn fallback_to_frontend(
    State(state): State<AppState>,
    req: Request<Body>,
) -> impl IntoResponse {
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_default();
    let url = state.config.upstream.frontend_url(path);

    let limit = state.config.upstream.max_body_size;
    match forward_request(&state.upstream_client, "frontend", &url, limit, req).await {
        Ok(resp) => resp,
        Err(e) => ApiError::from(e).into_response(),
    }
}
