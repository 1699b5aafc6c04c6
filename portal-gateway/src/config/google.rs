//! Google OAuth 2.0 configuration

use confique::Config;

/// Google OAuth 2.0 configuration for the token exchange relay
#[derive(Debug, Config, Clone)]
pub struct GoogleOAuthConfig {
    /// OAuth client identifier
    #[config(env = "GATEWAY_GOOGLE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[config(env = "GATEWAY_GOOGLE_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Token endpoint (default: https://oauth2.googleapis.com/token)
    #[config(
        env = "GATEWAY_GOOGLE_TOKEN_URL",
        default = "https://oauth2.googleapis.com/token"
    )]
    pub token_url: String,

    /// The timeout for token endpoint requests in seconds (default: 30)
    #[config(env = "GATEWAY_GOOGLE_TIMEOUT", default = 30)]
    pub timeout: u64,
}

impl GoogleOAuthConfig {
    /// Returns the client id and secret, or None when either is missing or empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|s| !s.is_empty())?;
        let secret = self.client_secret.as_deref().filter(|s| !s.is_empty())?;
        Some((id, secret))
    }
}
