//! Cookie and gate inspection utilities, mounted only in debug mode.
//! Token values are never echoed back, only their presence.

use crate::gate::{
    AuthCookies, GateDecision, GateRequest, ACCESS_TOKEN_COOKIE, AUTH_VALID_COOKIE,
    ID_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::state::AppState;
use axum::{extract::State, http::Uri, routing::get, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use http::HeaderMap;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct CookieReport {
    /// Presence of each auth-related cookie (non-empty value)
    pub cookies: BTreeMap<&'static str, bool>,
    /// Names of every cookie sent with the request
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GateReport {
    /// "allow" or "redirect" for a request to `/`
    pub decision: &'static str,
    pub redirect_to: Option<String>,
    pub has_id_token: bool,
    pub has_access_token: bool,
    pub has_refresh_token: bool,
}

async fn debug_cookies(jar: CookieJar) -> Json<CookieReport> {
    let cookies = [
        ID_TOKEN_COOKIE,
        ACCESS_TOKEN_COOKIE,
        REFRESH_TOKEN_COOKIE,
        AUTH_VALID_COOKIE,
    ]
    .into_iter()
    .map(|name| {
        let present = jar.get(name).is_some_and(|c| !c.value().is_empty());
        (name, present)
    })
    .collect();

    let mut names: Vec<String> = jar.iter().map(|c| c.name().to_string()).collect();
    names.sort();

    Json(CookieReport { cookies, names })
}

async fn debug_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Json<GateReport> {
    let cookies = AuthCookies::from_jar(&jar);
    let root = Uri::from_static("/");
    let request = GateRequest {
        path: "/",
        original_url: state.gate.original_url(&root, &headers),
        cookies: cookies.clone(),
    };

    let (decision, redirect_to) = match state.gate.evaluate(&request) {
        GateDecision::Redirect { location } => ("redirect", Some(location)),
        GateDecision::Allow | GateDecision::Bypass => ("allow", None),
        GateDecision::Reject => ("reject", None),
    };

    Json(GateReport {
        decision,
        redirect_to,
        has_id_token: cookies.has_id_token(),
        has_access_token: cookies.has_access_token(),
        has_refresh_token: cookies.has_refresh_token(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/debug-cookies", get(debug_cookies))
        .route("/debug-auth", get(debug_auth))
}
