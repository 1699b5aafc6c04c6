//! Token exchange endpoint handler

use crate::api::oauth::models::{RelayErrorBody, RelayReply, TokenExchangeRequest};
use crate::api::oauth::relay::{RelayError, TokenRelay};
use crate::openapi::AUTH_TAG;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use log::error;

/// Exchanges a Google authorization code for tokens
///
/// The token endpoint's JSON is relayed verbatim. Non-JSON upstream bodies are
/// wrapped in an `invalid_response` error.
#[utoipa::path(
    post,
    path = "/api/auth/google/token",
    tag = AUTH_TAG,
    request_body = TokenExchangeRequest,
    responses(
        (status = 200, description = "Token response from Google, relayed verbatim"),
        (status = 400, description = "Error response from Google, relayed verbatim"),
        (status = 500, description = "Missing server credentials or unexpected failure", body = RelayErrorBody),
    )
)]
pub async fn token_exchange(State(state): State<AppState>, body: Bytes) -> RelayReply {
    let relay = TokenRelay::new(&state.oauth_client, &state.config.google);
    match relay.exchange(&body).await {
        Ok(reply) => reply,
        Err(err) => {
            match &err {
                RelayError::MissingCredentials => {
                    error!("Token exchange refused: Google client credentials are not configured")
                }
                _ => error!("Token exchange failed: {err}"),
            }
            err.into()
        }
    }
}
