use confique::Config;

/// Configuration for the services the gateway forwards to
#[derive(Debug, Config, Clone)]
pub struct UpstreamConfig {
    /// Backend API base URL, target of /api/backend/* (default: http://localhost:8000)
    #[config(env = "GATEWAY_UPSTREAM_BACKEND_URL", default = "http://localhost:8000")]
    pub backend_url: String,

    /// Frontend (UI) server base URL, target of gated page requests
    /// (default: http://localhost:3001)
    #[config(env = "GATEWAY_UPSTREAM_FRONTEND_URL", default = "http://localhost:3001")]
    pub frontend_url: String,

    /// The timeout for upstream requests in seconds (default: 60)
    #[config(env = "GATEWAY_UPSTREAM_TIMEOUT", default = 60)]
    pub timeout: u64,

    /// Largest request body, in bytes, forwarded upstream (default: 10 MiB)
    #[config(env = "GATEWAY_UPSTREAM_MAX_BODY_SIZE", default = 10485760)]
    pub max_body_size: usize,
}

impl UpstreamConfig {
    /// Returns the backend URL for the given path
    pub fn backend_url<S: AsRef<str>>(&self, path: S) -> String {
        join_url(&self.backend_url, path.as_ref())
    }

    /// Returns the frontend URL for the given path
    pub fn frontend_url<S: AsRef<str>>(&self, path: S) -> String {
        join_url(&self.frontend_url, path.as_ref())
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
