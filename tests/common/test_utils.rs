use super::mocks::MockLlmClient;
use axum::{Router, body::Body, http::Request, response::Response};
use finance_ai::{
    config::LlmConfig,
    llm::LlmClient,
    relay::StreamRelay,
    server::{self, AppState},
};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// LLM settings with a test key and the stock model and temperature
pub fn create_test_llm_config() -> LlmConfig {
    LlmConfig {
        api_key: "test-api-key".to_string(),
        ..LlmConfig::default()
    }
}

pub fn create_relay(client: Arc<dyn LlmClient>) -> StreamRelay {
    StreamRelay::new(client, &create_test_llm_config())
}

/// Full application router backed by the given mock
pub fn create_test_app(mock: Arc<MockLlmClient>) -> Router {
    server::router(AppState {
        relay: Arc::new(create_relay(mock)),
    })
}

pub fn build_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/build")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
