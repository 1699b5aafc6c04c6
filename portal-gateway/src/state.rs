use crate::config::GatewayConfig;
use crate::gate::AuthGate;
use http::header::ACCEPT;
use http::{HeaderMap, HeaderValue};
use reqwest::{redirect, Client};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gate: Arc<AuthGate>,
    pub oauth_client: Arc<Client>,
    pub upstream_client: Arc<Client>,
}

impl AppState {
    fn create_oauth_client(timeout: u64) -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(5))
            .default_headers(headers)
            .build()
    }

    fn create_upstream_client(timeout: u64) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(Duration::from_secs(timeout))
            .connect_timeout(Duration::from_secs(2))
            // Upstream redirects are relayed to the browser, not followed
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
    }

    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            gate: Arc::new(AuthGate::new(&config.gate)),
            oauth_client: Arc::new(Self::create_oauth_client(config.google.timeout)?),
            upstream_client: Arc::new(Self::create_upstream_client(config.upstream.timeout)?),
            config: Arc::new(config),
        })
    }

    #[cfg(test)]
    pub fn for_testing(config: &GatewayConfig) -> Self {
        Self::new(config.clone()).expect("Failed to create test state")
    }
}
