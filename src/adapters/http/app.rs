//! Full application router: conversation routes plus the server-wide
//! middleware stack (tracing, CORS, request timeout).

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::conversation::{conversation_router, ConversationAppState};
use crate::config::ServerConfig;

/// Builds the router served by the binary.
pub fn build_app(state: ConversationAppState, server: &ServerConfig) -> Router {
    conversation_router()
        .with_state(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

/// Explicit origins when configured; otherwise permissive in development
/// and same-origin only elsewhere.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
    } else if server.environment.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::storage::InMemoryConversationStore;
    use crate::application::handlers::conversation::TurnSettings;
    use crate::config::Environment;
    use crate::ports::GenerationOptions;

    fn app(server: &ServerConfig) -> Router {
        let state = ConversationAppState::new(
            Arc::new(InMemoryConversationStore::new()),
            Arc::new(MockAIProvider::new()),
            TurnSettings::default(),
            GenerationOptions::default(),
        );
        build_app(state, server)
    }

    fn health_from(origin: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn configured_origin_is_allowed() {
        let server = ServerConfig {
            cors_origins: Some("http://localhost:5173".to_string()),
            ..Default::default()
        };

        let response = app(&server)
            .oneshot(health_from("http://localhost:5173"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5173"))
        );
    }

    #[tokio::test]
    async fn production_without_origins_sends_no_cors_headers() {
        let server = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };

        let response = app(&server)
            .oneshot(health_from("http://elsewhere.example"))
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn development_without_origins_is_permissive() {
        let response = app(&ServerConfig::default())
            .oneshot(health_from("http://elsewhere.example"))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
    }
}
