//! Edge auth gate
//!
//! Decides, per request, whether a page request may reach the frontend or must
//! be sent to the centralized login service. The decision only looks at the
//! path and at which auth cookies are present; token values are never
//! validated here, they are minted and revoked by the identity provider.

use crate::config::GateConfig;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;
use http::header::HOST;
use http::{HeaderMap, Uri};
use log::debug;

pub const ID_TOKEN_COOKIE: &str = "id_token";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const AUTH_VALID_COOKIE: &str = "auth_valid";

/// Lifetime of the auth_valid marker cookie
pub const AUTH_VALID_MAX_AGE_DAYS: i64 = 7;

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Auth cookies set by the identity provider. Empty values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCookies {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AuthCookies {
    pub fn from_jar(jar: &CookieJar) -> Self {
        Self {
            id_token: non_empty(jar, ID_TOKEN_COOKIE),
            access_token: non_empty(jar, ACCESS_TOKEN_COOKIE),
            refresh_token: non_empty(jar, REFRESH_TOKEN_COOKIE),
        }
    }

    pub fn has_id_token(&self) -> bool {
        self.id_token.is_some()
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Whether the request carries a token that lets it through the gate.
    ///
    /// A refresh token on its own does not count.
    pub fn has_session(&self) -> bool {
        self.has_id_token() || self.has_access_token()
    }
}

fn non_empty(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Everything the gate needs to know about one request
#[derive(Debug, Clone)]
pub struct GateRequest<'a> {
    pub path: &'a str,
    pub original_url: String,
    pub cookies: AuthCookies,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Path is allow-listed, pass the request through untouched
    Bypass,
    /// Session cookie present, pass through and set the marker cookie
    Allow,
    /// No session, send the user to the login service
    Redirect { location: String },
    /// Path contains `.` or `..` segments and is refused outright
    Reject,
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    login_url: String,
    cookie_domain: Option<String>,
    default_scheme: String,
    public_origin: String,
    trusted_hosts: Vec<String>,
    bypass_prefixes: Vec<String>,
}

impl AuthGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            login_url: config.login_url.clone(),
            cookie_domain: config.cookie_domain.clone().filter(|d| !d.is_empty()),
            default_scheme: config.default_scheme.clone(),
            public_origin: config.public_origin.trim_end_matches('/').to_string(),
            trusted_hosts: config.trusted_host_list(),
            bypass_prefixes: config.bypass_list(),
        }
    }

    /// Plain prefix match, so `/authors` is bypassed just like `/auth/callback`
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn evaluate(&self, request: &GateRequest<'_>) -> GateDecision {
        // Upstream URL parsing collapses dot segments, so `/api/../x` would be
        // checked as `/api` here but served as `/x`
        if has_dot_segments(request.path) {
            return GateDecision::Reject;
        }

        if self.is_bypassed(request.path) {
            return GateDecision::Bypass;
        }

        let cookies = &request.cookies;
        debug!(
            "Gate check for {}: id_token={}, access_token={}, refresh_token={}",
            request.path,
            cookies.has_id_token(),
            cookies.has_access_token(),
            cookies.has_refresh_token()
        );

        if cookies.has_session() {
            GateDecision::Allow
        } else {
            GateDecision::Redirect {
                location: self.login_redirect(&request.original_url),
            }
        }
    }

    /// Login URL carrying the percent-encoded original URL as `next`
    pub fn login_redirect(&self, original_url: &str) -> String {
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}next={}",
            self.login_url,
            separator,
            urlencoding::encode(original_url)
        )
    }

    /// Client-readable `auth_valid=1` marker. Not HttpOnly.
    pub fn marker_cookie(&self) -> Cookie<'static> {
        let mut builder = Cookie::build((AUTH_VALID_COOKIE, "1"))
            .path("/")
            .secure(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(AUTH_VALID_MAX_AGE_DAYS));
        if let Some(domain) = &self.cookie_domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }

    /// Rebuilds the full URL the client asked for.
    ///
    /// Absolute request URIs are used as-is. Otherwise the scheme comes from
    /// `X-Forwarded-Proto` and the host from `X-Forwarded-Host` or `Host`,
    /// falling back to the configured public origin. Hosts outside the public
    /// origin and the trusted host list are replaced by the public origin, so
    /// a client cannot point `next` at a site of its choosing.
    pub fn original_url(&self, uri: &Uri, headers: &HeaderMap) -> String {
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
            if is_web_scheme(scheme) && self.is_trusted_host(authority.as_str()) {
                return uri.to_string();
            }
            return format!("{}{}", self.public_origin, path_and_query);
        }

        let host = first_header_value(headers, X_FORWARDED_HOST)
            .or_else(|| first_header_value(headers, HOST.as_str()))
            .filter(|host| self.is_trusted_host(host));

        match host {
            Some(host) => {
                let scheme = first_header_value(headers, X_FORWARDED_PROTO)
                    .filter(|scheme| is_web_scheme(scheme))
                    .unwrap_or(self.default_scheme.as_str());
                format!("{scheme}://{host}{path_and_query}")
            }
            None => format!("{}{}", self.public_origin, path_and_query),
        }
    }

    /// Host (with optional port) of the public origin or one of the trusted hosts
    pub fn is_trusted_host(&self, host: &str) -> bool {
        let origin_host = self
            .public_origin
            .split_once("://")
            .map_or(self.public_origin.as_str(), |(_, rest)| rest);
        host.eq_ignore_ascii_case(origin_host)
            || self
                .trusted_hosts
                .iter()
                .any(|trusted| host.eq_ignore_ascii_case(trusted))
    }
}

fn is_web_scheme(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Whether any path segment resolves to `.` or `..`.
///
/// Percent-encoded dots count, and `\` is a separator, matching how URL
/// parsers normalize http paths.
pub fn has_dot_segments(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = urlencoding::decode(segment)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        decoded == "." || decoded == ".."
    })
}

/// First entry of a possibly comma-separated header, as set by proxy chains
fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
