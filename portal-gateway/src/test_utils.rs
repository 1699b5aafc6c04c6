use crate::config::GatewayConfig;
use crate::create_app;
use crate::state::AppState;
use axum::body::{Body, Bytes};
use axum::Router;
use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Cookie header sent by [`TestFixture::request_builder`], a signed-in user
pub const SESSION_COOKIE: &str = "id_token=test-id-token; refresh_token=test-refresh-token";

/// Test fixture for setting up a complete test environment with mocked services.
///
/// The TestFixture starts mock servers for the Google token endpoint, the
/// backend API and the frontend, configures the gateway to use them, and
/// drives the router in-process with `tower::ServiceExt::oneshot`.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///
///     Mock::given(matchers::method("GET"))
///         .and(matchers::path("/projects"))
///         .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
///         .mount(&fixture.backend_mock)
///         .await;
///
///     let response = fixture.get("/api/backend/projects").await;
///     response.assert_ok();
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration used to build `app`
    pub config: GatewayConfig,
    /// Mock server for the Google token endpoint
    pub google_mock: MockServer,
    /// Mock server for the backend API
    pub backend_mock: MockServer,
    /// Mock server for the frontend
    pub frontend_mock: MockServer,
}

impl TestFixture {
    /// Creates a new test fixture with mock servers for Google, backend and frontend.
    pub async fn new() -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let google_mock = MockServer::start().await;
        let backend_mock = MockServer::start().await;
        let frontend_mock = MockServer::start().await;

        let config = GatewayConfig::for_test_with_mocks(&google_mock, &backend_mock, &frontend_mock);
        let app = create_app(AppState::for_testing(&config));

        Self {
            app,
            config,
            google_mock,
            backend_mock,
            frontend_mock,
        }
    }

    /// Rebuilds the application after `config` was modified, keeping the mock servers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let mut fixture = TestFixture::new().await;
    /// fixture.config.debug = false;
    /// let fixture = fixture.rebuild();
    /// ```
    pub fn rebuild(mut self) -> Self {
        self.app = create_app(AppState::for_testing(&self.config));
        self
    }

    /// Initializes the test logger with customized settings.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Creates a request builder for a signed-in user.
    ///
    /// The request builder includes standard headers:
    /// - Cookie: [`SESSION_COOKIE`]
    /// - Content-Type: application/json
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        self.anonymous_request_builder(method, uri)
            .header(COOKIE, SESSION_COOKIE)
    }

    /// Creates a request builder without any cookies.
    pub fn anonymous_request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
    ) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header(CONTENT_TYPE, "application/json")
    }

    /// Sends a GET request as a signed-in user.
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a POST request with a JSON body as a signed-in user.
    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    ///
    /// This is a lower-level method that is used by the convenience methods
    /// like `get()` and `post()`.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Non-JSON bodies are kept as a JSON string, empty bodies become an empty object
        let json = if body.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
            json,
        }
    }

    /// Mounts a mock token endpoint at `/token` on the Google mock server.
    pub async fn add_google_token_mock(
        &self,
        status_code: StatusCode,
        response_body: impl Serialize,
        expected_calls: u64,
    ) {
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/token"))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(response_body))
            .expect(expected_calls)
            .mount(&self.google_mock)
            .await;
    }
}

/// Response from a test request that provides convenient access to status, headers and body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
    /// Response body as JSON (a JSON string when the body is not JSON)
    json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Asserts that a response header has the expected value.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(
            self.header(name),
            Some(expected),
            "Unexpected value for header {name}"
        );
        self
    }

    /// Returns a header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the response body as JSON
    pub fn json(&self) -> &Value {
        &self.json
    }
}
