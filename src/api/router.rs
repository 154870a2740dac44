use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;
use crate::config::ServerConfig;

/// Create the full router with application state
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(&server.cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::evidence::{extract_sources, keys, EvidenceItem};
    use crate::domain::graph::MockAnswerGraph;
    use crate::domain::{
        ChatTurn, DomainError, ExecutionTrace, GraphError, GraphNode, GraphOutcome,
        RouteDecision,
    };

    fn app(graph: MockAnswerGraph) -> Router {
        create_router(AppState::new(Arc::new(graph)), &ServerConfig::default())
    }

    fn ask(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/rag/ask")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn outcome(question: &str) -> GraphOutcome {
        let evidence = vec![EvidenceItem::new("A primary key identifies a row.")
            .with_metadata(keys::COURSE_ID, json!("c-1"))
            .with_metadata(keys::DISTANCE, json!(0.25))];
        let mut trace = ExecutionTrace::new();
        trace.record(GraphNode::Route, "decision: retrieve");

        GraphOutcome {
            answer: "It uniquely identifies a row.".to_string(),
            sources: extract_sources(&evidence),
            chat_history: vec![ChatTurn::new(question, "It uniquely identifies a row.")],
            trace,
            route: RouteDecision::Retrieve,
            generation_attempts: 1,
            low_confidence: false,
        }
    }

    #[tokio::test]
    async fn test_ask_returns_answer_sources_and_history() {
        let mut graph = MockAnswerGraph::new();
        graph
            .expect_ask()
            .withf(|request| {
                request.question == "What is a primary key?"
                    && request.user_id.as_deref() == Some("m-1")
            })
            .returning(|request| Ok(outcome(&request.question)));

        let response = app(graph)
            .oneshot(ask(json!({"question": "What is a primary key?", "user_id": "m-1"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["answer"], "It uniquely identifies a row.");
        assert_eq!(body["sources"][0]["rank"], 1);
        assert_eq!(body["sources"][0]["course_id"], "c-1");
        assert_eq!(body["sources"][0]["distance"], 0.25);
        assert_eq!(body["chat_history"][0]["question"], "What is a primary key?");
        assert_eq!(body["route"], "retrieve");
        assert_eq!(body["low_confidence"], false);
        assert!(body["trace"].as_str().unwrap().contains("ROUTE: decision: retrieve"));
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected_without_running_graph() {
        let mut graph = MockAnswerGraph::new();
        graph.expect_ask().never();

        let response = app(graph)
            .oneshot(ask(json!({"question": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["detail"], "Question cannot be empty");
    }

    #[tokio::test]
    async fn test_graph_failure_is_internal_error() {
        let mut graph = MockAnswerGraph::new();
        graph.expect_ask().returning(|_| {
            Err(GraphError::stage(
                GraphNode::Retrieve,
                DomainError::storage("connection refused"),
            ))
        });

        let response = app(graph)
            .oneshot(ask(json!({"question": "What is SQL?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["detail"],
            "Error processing question: Node 'retrieve' failed: Storage error: connection refused"
        );
    }

    #[tokio::test]
    async fn test_missing_question_is_unprocessable() {
        let mut graph = MockAnswerGraph::new();
        graph.expect_ask().never();

        let response = app(graph)
            .oneshot(ask(json!({"user_id": "m-1"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_root_banner_and_health() {
        let router = app(MockAnswerGraph::new());

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await["message"],
            "Agentic RAG API is running"
        );

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_without_probes_is_healthy() {
        let response = app(MockAnswerGraph::new())
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_dev_origin() {
        let response = app(MockAnswerGraph::new())
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/v1/rag/ask")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:5173")
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let response = app(MockAnswerGraph::new())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }
}
