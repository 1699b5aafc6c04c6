//! Token exchange request/response structures

use crate::headers::presets;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Fixed message returned when the server has no Google client credentials
pub const MISSING_CREDENTIALS: &str = "Server missing Google credentials";

/// Authorization Code exchange request sent by the browser after the OAuth callback
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TokenExchangeRequest {
    /// Authorization code received on the redirect URI
    pub code: String,
    /// Redirect URI used in the authorization request
    pub redirect_uri: String,
    /// PKCE code verifier matching the original code challenge
    pub code_verifier: String,
}

/// Error body produced by the relay itself (upstream errors are relayed as-is)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RelayErrorBody {
    /// Error code
    pub error: String,
    /// Human-readable description of an unexpected failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Raw upstream body when it was not valid JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl RelayErrorBody {
    pub fn missing_credentials() -> Self {
        Self {
            error: MISSING_CREDENTIALS.to_string(),
            message: None,
            raw: None,
        }
    }

    pub fn invalid_response(raw: String) -> Self {
        Self {
            error: "invalid_response".to_string(),
            message: None,
            raw: Some(raw),
        }
    }

    pub fn unexpected<S: ToString>(message: S) -> Self {
        Self {
            error: "unexpected_error".to_string(),
            message: Some(message.to_string()),
            raw: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayBody {
    /// JSON body returned by the token endpoint
    Upstream(Value),
    Error(RelayErrorBody),
}

/// Response of the token exchange relay
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: StatusCode,
    pub body: RelayBody,
}

impl RelayReply {
    pub fn upstream(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: RelayBody::Upstream(body),
        }
    }

    pub fn error(status: StatusCode, body: RelayErrorBody) -> Self {
        Self {
            status,
            body: RelayBody::Error(body),
        }
    }
}

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            RelayBody::Upstream(body) => (self.status, Json(body)).into_response(),
            RelayBody::Error(body) => (self.status, Json(body)).into_response(),
        };
        presets::no_store().apply(&mut response);
        response
    }
}
