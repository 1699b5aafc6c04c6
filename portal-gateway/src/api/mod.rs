pub(crate) mod debug;
mod gate_middleware;
pub(crate) mod health;
pub(crate) mod oauth;
mod proxy;

use crate::api::gate_middleware::auth_gate_middleware;
use crate::api::proxy::{fallback_to_frontend, proxy_to_backend, BACKEND_PREFIX};
use crate::openapi::{self, ApiDoc};
use crate::state::AppState;
use axum::{middleware, routing::any, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

/// Combines all routes into a single router behind the auth gate
pub(super) fn router(state: &AppState) -> Router<AppState> {
    let (documented, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(health::router())
        .merge(oauth::router())
        .split_for_parts();

    let mut router = documented
        .route(BACKEND_PREFIX, any(proxy_to_backend))
        .route(&format!("{BACKEND_PREFIX}/{{*path}}"), any(proxy_to_backend))
        .merge(openapi::router(api_doc));

    if state.config.debug {
        router = router.merge(debug::router());
    }

    router
        // Pages and assets are served by the frontend once the gate lets them through
        .fallback(any(fallback_to_frontend))
        // we must use layer here and not route_layer because, route_layer only
        // affects routes that are defined on the router which doesn't affect fallback
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_gate_middleware,
        ))
}
