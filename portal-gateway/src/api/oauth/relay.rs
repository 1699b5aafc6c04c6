//! Google authorization code exchange
//!
//! Forwards the caller's code, redirect URI and PKCE verifier together with the
//! server-held client credentials to the token endpoint, then relays whatever
//! comes back. One outbound call per invocation, no retries.

use crate::api::oauth::models::{RelayErrorBody, RelayReply, TokenExchangeRequest};
use crate::config::GoogleOAuthConfig;
use http::StatusCode;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Server missing Google credentials")]
    MissingCredentials,
    #[error("invalid token exchange request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<RelayError> for RelayReply {
    fn from(err: RelayError) -> Self {
        let body = match &err {
            RelayError::MissingCredentials => RelayErrorBody::missing_credentials(),
            RelayError::InvalidRequest(_) | RelayError::Transport(_) => {
                RelayErrorBody::unexpected(&err)
            }
        };
        RelayReply::error(StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

pub struct TokenRelay<'a> {
    client: &'a Client,
    config: &'a GoogleOAuthConfig,
}

impl<'a> TokenRelay<'a> {
    pub fn new(client: &'a Client, config: &'a GoogleOAuthConfig) -> Self {
        Self { client, config }
    }

    /// Exchanges the code in `body` (JSON encoded [`TokenExchangeRequest`]).
    ///
    /// Credentials are checked before the body is parsed, so a misconfigured
    /// server never reaches the token endpoint.
    pub async fn exchange(&self, body: &[u8]) -> Result<RelayReply, RelayError> {
        let (client_id, client_secret) = self
            .config
            .credentials()
            .ok_or(RelayError::MissingCredentials)?;
        let request: TokenExchangeRequest = serde_json::from_slice(body)?;

        let form = [
            ("code", request.code.as_str()),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", request.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("code_verifier", request.code_verifier.as_str()),
        ];

        debug!("Exchanging authorization code at {}", self.config.token_url);
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        // Read as text first, error pages are not always JSON
        let text = response.text().await?;
        Ok(relay_upstream(status, text))
    }
}

/// Maps the token endpoint's status and raw body to the relay response
pub fn relay_upstream(status: StatusCode, text: String) -> RelayReply {
    match serde_json::from_str::<Value>(&text) {
        Err(e) => {
            warn!("Token endpoint returned a non-JSON body (status {status}): {e}");
            RelayReply::error(status, RelayErrorBody::invalid_response(text))
        }
        Ok(body) if !status.is_success() => {
            warn!("Token endpoint rejected the exchange with status {status}");
            RelayReply::upstream(status, body)
        }
        Ok(body) => RelayReply::upstream(StatusCode::OK, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::oauth::models::RelayBody;
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn config(token_url: String) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            token_url,
            timeout: 5,
        }
    }

    fn exchange_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "code": "4/0Ab-code",
            "redirect_uri": "https://app.portal.test/auth/callback",
            "code_verifier": "verifier-123",
        }))
        .unwrap()
    }

    #[test]
    fn test_relay_success_is_normalized_to_200() {
        let reply = relay_upstream(StatusCode::CREATED, r#"{"access_token":"a"}"#.to_string());
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, RelayBody::Upstream(json!({"access_token": "a"})));
    }

    #[test]
    fn test_relay_upstream_error_keeps_status() {
        let reply = relay_upstream(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid_client"}"#.to_string(),
        );
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body, RelayBody::Upstream(json!({"error": "invalid_client"})));
    }

    #[test]
    fn test_relay_non_json_body() {
        let reply = relay_upstream(StatusCode::BAD_GATEWAY, "<html>oops</html>".to_string());
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            reply.body,
            RelayBody::Error(RelayErrorBody::invalid_response("<html>oops</html>".to_string()))
        );

        let reply = relay_upstream(StatusCode::OK, String::new());
        assert_eq!(reply.status, StatusCode::OK);
        assert!(matches!(reply.body, RelayBody::Error(_)));
    }

    #[tokio::test]
    async fn test_exchange_sends_form_with_credentials() {
        let google_mock = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/token"))
            .and(matchers::header(
                "content-type",
                "application/x-www-form-urlencoded",
            ))
            .and(matchers::body_string_contains("grant_type=authorization_code"))
            .and(matchers::body_string_contains("client_id=client-id"))
            .and(matchers::body_string_contains("client_secret=client-secret"))
            .and(matchers::body_string_contains("code=4%2F0Ab-code"))
            .and(matchers::body_string_contains("code_verifier=verifier-123"))
            .and(matchers::body_string_contains(
                "redirect_uri=https%3A%2F%2Fapp.portal.test%2Fauth%2Fcallback",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&google_mock)
            .await;

        let client = Client::new();
        let config = config(format!("{}/token", google_mock.uri()));
        let reply = TokenRelay::new(&client, &config)
            .exchange(&exchange_body())
            .await
            .unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            reply.body,
            RelayBody::Upstream(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer",
            }))
        );
        google_mock.verify().await;
    }

    #[tokio::test]
    async fn test_exchange_without_credentials_makes_no_call() {
        let google_mock = MockServer::start().await;
        Mock::given(matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&google_mock)
            .await;

        let client = Client::new();
        let mut config = config(format!("{}/token", google_mock.uri()));
        config.client_secret = None;

        let err = TokenRelay::new(&client, &config)
            .exchange(&exchange_body())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingCredentials));

        let reply = RelayReply::from(err);
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            reply.body,
            RelayBody::Error(RelayErrorBody::missing_credentials())
        );
        google_mock.verify().await;
    }

    #[tokio::test]
    async fn test_exchange_rejects_malformed_body() {
        let client = Client::new();
        let config = config("http://127.0.0.1:1/token".to_string());

        let err = TokenRelay::new(&client, &config)
            .exchange(br#"{"code": "only-code"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));

        let reply = RelayReply::from(err);
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        match reply.body {
            RelayBody::Error(body) => {
                assert_eq!(body.error, "unexpected_error");
                assert!(body.message.unwrap().contains("redirect_uri"));
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_unreachable_endpoint() {
        let client = Client::new();
        // Port 1 should be unavailable
        let config = config("http://127.0.0.1:1/token".to_string());

        let err = TokenRelay::new(&client, &config)
            .exchange(&exchange_body())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
    }
}
