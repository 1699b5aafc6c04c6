use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde_json::json;

/// JSON error reply in the `{"detail": ...}` shape used by every gateway endpoint
#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Payload Too Large (413) with a detail message
    pub fn payload_too_large<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// Create new Bad Gateway (502) with a detail message
    pub fn bad_gateway<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_GATEWAY)
    }

    /// Create new Method Not Allowed (405) with a detail message
    pub fn method_not_allowed<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::METHOD_NOT_ALLOWED)
    }
}

impl IntoResponse for ApiError {
    /// Render as a JSON body with the stored status code
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "detail": self.detail,
        });
        (status_code, Json(body)).into_response()
    }
}
