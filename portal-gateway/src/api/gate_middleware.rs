use crate::errors::ApiError;
use crate::gate::{AuthCookies, GateDecision, GateRequest};
use crate::headers::presets;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use http::header::SET_COOKIE;
use http::HeaderValue;
use log::{debug, info, warn};

pub(super) async fn auth_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let path = request.uri().path();
    let decision = state.gate.evaluate(&GateRequest {
        path,
        original_url: state.gate.original_url(request.uri(), request.headers()),
        cookies: AuthCookies::from_jar(&jar),
    });

    match decision {
        GateDecision::Bypass => next.run(request).await,
        GateDecision::Allow => {
            debug!("Gate allowed {}", request.uri().path());
            let mut response = next.run(request).await;
            match HeaderValue::from_str(&state.gate.marker_cookie().to_string()) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => warn!("Failed to encode auth marker cookie: {e}"),
            }
            response
        }
        GateDecision::Redirect { location } => {
            info!(
                "No session for {}, redirecting to login",
                request.uri().path()
            );
            let mut response = Redirect::temporary(&location).into_response();
            presets::no_store().apply(&mut response);
            response
        }
        GateDecision::Reject => {
            warn!("Rejected path with dot segments: {}", request.uri().path());
            ApiError::bad_request("Invalid request path").into_response()
        }
    }
}
