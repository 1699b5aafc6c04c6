pub(crate) use crate::config::gate::GateConfig;
pub(crate) use crate::config::google::GoogleOAuthConfig;
pub(crate) use crate::config::upstream::UpstreamConfig;
use confique::Config;
use thiserror::Error;
use url::Url;

pub mod gate;
pub mod google;
pub mod upstream;

/// Optional configuration file, read after the environment
pub const CONFIG_FILE: &str = "gateway.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] confique::Error),
    #[error("invalid URL in '{field}': {source}")]
    InvalidUrl {
        field: &'static str,
        source: url::ParseError,
    },
}

/// Main configuration structure for the gateway
#[derive(Debug, Config, Clone)]
pub struct GatewayConfig {
    /// The port the gateway will listen to (default: 3000)
    #[config(env = "GATEWAY_PORT", default = 3000)]
    pub port: u16,

    /// Mount the /debug-auth and /debug-cookies utilities (default: false)
    #[config(env = "GATEWAY_DEBUG", default = false)]
    pub debug: bool,

    /// Edge auth gate configuration
    #[config(nested)]
    pub gate: GateConfig,

    /// Google OAuth token exchange configuration
    #[config(nested)]
    pub google: GoogleOAuthConfig,

    /// Backend and frontend upstreams
    #[config(nested)]
    pub upstream: UpstreamConfig,
}

impl GatewayConfig {
    /// Loads the configuration from environment variables and the optional config file
    pub fn new() -> Result<Self, ConfigError> {
        let config = Self::builder().env().file(CONFIG_FILE).load()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every configured URL parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("gate.login_url", self.gate.login_url.as_str()),
            ("gate.public_origin", self.gate.public_origin.as_str()),
            ("google.token_url", self.google.token_url.as_str()),
            ("upstream.backend_url", self.upstream.backend_url.as_str()),
            ("upstream.frontend_url", self.upstream.frontend_url.as_str()),
        ];
        for (field, value) in urls {
            Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(
        google_mock: &wiremock::MockServer,
        backend_mock: &wiremock::MockServer,
        frontend_mock: &wiremock::MockServer,
    ) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            debug: true,
            gate: GateConfig::for_test(),
            google: GoogleOAuthConfig {
                client_id: Some("test-client-id".to_string()),
                client_secret: Some("test-client-secret".to_string()),
                token_url: format!("{}/token", google_mock.uri()),
                timeout: 5,
            },
            upstream: UpstreamConfig {
                backend_url: backend_mock.uri(),
                frontend_url: frontend_mock.uri(),
                timeout: 5,
                max_body_size: 64 * 1024,
            },
        }
    }
}
