use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const AUTH_TAG: &str = "Auth API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = AUTH_TAG, description = "OAuth token exchange endpoints"),
    ),
    info(
        title = "Portal Gateway API",
        description = "Auth gate and OAuth relay in front of the project portal",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Creates a router serving the collected OpenAPI document and the Scalar UI
pub(crate) fn router(api_doc: utoipa::openapi::OpenApi) -> Router<AppState> {
    let json_doc = api_doc.clone();
    Router::new()
        .route(
            "/api/openapi.json",
            get(move || {
                let doc = json_doc.clone();
                async move { Json(doc) }
            }),
        )
        .merge(Scalar::with_url("/api/scalar", api_doc))
}
