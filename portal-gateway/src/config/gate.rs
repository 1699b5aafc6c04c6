use confique::Config;

/// Configuration for the edge auth gate
#[derive(Debug, Config, Clone)]
pub struct GateConfig {
    /// Centralized login page users are redirected to
    /// (default: https://auth.example.com/login)
    #[config(env = "GATEWAY_GATE_LOGIN_URL", default = "https://auth.example.com/login")]
    pub login_url: String,

    /// Shared parent domain for the auth_valid marker cookie.
    /// When unset the cookie is host-only.
    #[config(env = "GATEWAY_GATE_COOKIE_DOMAIN")]
    pub cookie_domain: Option<String>,

    /// Scheme used to rebuild the original URL when X-Forwarded-Proto is absent
    #[config(env = "GATEWAY_GATE_DEFAULT_SCHEME", default = "https")]
    pub default_scheme: String,

    /// Origin used to rebuild the original URL when the request carries no host
    #[config(env = "GATEWAY_GATE_PUBLIC_ORIGIN", default = "http://localhost:3000")]
    pub public_origin: String,

    /// Extra hosts (with optional port) accepted from `X-Forwarded-Host` and
    /// `Host` when rebuilding the original URL. The public origin's host is
    /// always accepted. Comma-separated list in the environment.
    #[config(
        env = "GATEWAY_GATE_TRUSTED_HOSTS",
        parse_env = confique::env::parse::list_by_comma,
        default = []
    )]
    pub trusted_hosts: Vec<String>,

    /// Path prefixes that bypass the gate.
    /// Comma-separated list in the environment.
    #[config(
        env = "GATEWAY_GATE_BYPASS_PREFIXES",
        parse_env = confique::env::parse::list_by_comma,
        default = ["/auth", "/api", "/_next", "/static", "/favicon", "/debug-auth", "/debug-cookies"]
    )]
    pub bypass_prefixes: Vec<String>,
}

impl GateConfig {
    /// Bypass prefixes with surrounding whitespace removed and empty entries dropped
    pub fn bypass_list(&self) -> Vec<String> {
        trimmed(&self.bypass_prefixes)
    }

    /// Trusted hosts with surrounding whitespace removed and empty entries dropped
    pub fn trusted_host_list(&self) -> Vec<String> {
        trimmed(&self.trusted_hosts)
    }

    #[cfg(test)]
    pub fn for_test() -> Self {
        Self {
            login_url: "https://auth.portal.test/login".to_string(),
            cookie_domain: Some("portal.test".to_string()),
            default_scheme: "https".to_string(),
            public_origin: "https://app.portal.test".to_string(),
            trusted_hosts: vec!["pm.portal.test".to_string()],
            bypass_prefixes: [
                "/auth",
                "/api",
                "/_next",
                "/static",
                "/favicon",
                "/debug-auth",
                "/debug-cookies",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
