//! Google OAuth 2.0 token exchange relay
//!
//! The browser runs the Authorization Code flow with PKCE against Google and
//! posts the resulting code here. The client secret never leaves the server.

pub mod handlers;
pub mod models;
pub mod relay;

use crate::state::AppState;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::token_exchange))
}
