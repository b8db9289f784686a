//! Routing definitions for the Task Management API.
//!
//! Static segments win over path parameters, so `GET /tasks/export` is never
//! treated as a task id. The other id-taking methods on that path go to the
//! id handlers, which reject `export` as a malformed id.

use axum::Router;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::export::export_tasks;
use super::handlers::{
    AppState, create_task, delete_task, get_task, health_check, list_tasks, toggle_complete,
    update_task,
};

// =============================================================================
// Router Creation
// =============================================================================

/// Creates the API router with all routes and middleware.
///
/// # Examples
///
/// ```ignore
/// use task_service::api::{AppState, create_router};
///
/// let state = AppState::new(repository);
/// let listener = tokio::net::TcpListener::bind("localhost:8080").await?;
/// axum::serve(listener, create_router(state)).await?;
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/export",
            get(export_tasks).put(update_task).delete(delete_task),
        )
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/complete/{id}", put(toggle_complete))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

/// Any origin, method and header.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryTaskRepository;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use rstest::rstest;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::new(Arc::new(InMemoryTaskRepository::new())))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |text| Body::from(text.to_string())))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    const TASK_BODY: &str = r#"{"name":"A","status":"Pending","description":"d","timeEstimate":1,"dueDate":"2024-01-01","isComplete":false}"#;

    #[rstest]
    #[tokio::test]
    async fn health_check_returns_200() {
        let app = create_test_app();
        let (status, _, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ok"], true);
    }

    #[rstest]
    #[tokio::test]
    async fn export_route_is_not_captured_by_id_route() {
        let app = create_test_app();
        let (status, headers, body) = send(&app, Method::GET, "/tasks/export", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment;filename=tasks.csv"
        );
        assert!(String::from_utf8(body).unwrap().starts_with("ID,Name,"));
    }

    #[rstest]
    #[tokio::test]
    async fn create_returns_201_with_id() {
        let app = create_test_app();
        let (status, _, body) = send(&app, Method::POST, "/tasks", Some(TASK_BODY)).await;

        assert_eq!(status, StatusCode::CREATED);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["timeEstimate"], 1);
    }

    #[rstest]
    #[case(Method::GET, "/tasks/abc", None)]
    #[case(Method::PUT, "/tasks/abc", Some(TASK_BODY))]
    #[case(Method::PUT, "/tasks/abc", Some("not json"))]
    #[case(Method::DELETE, "/tasks/abc", None)]
    #[case(Method::PUT, "/tasks/complete/abc", None)]
    #[tokio::test]
    async fn malformed_id_returns_400(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] body: Option<&str>,
    ) {
        let app = create_test_app();
        let (status, _, body) = send(&app, method, uri, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INVALID_ID");
    }

    #[rstest]
    #[case(Method::PUT, "/tasks/export", Some(TASK_BODY))]
    #[case(Method::DELETE, "/tasks/export", None)]
    #[tokio::test]
    async fn export_segment_as_id_returns_400(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] body: Option<&str>,
    ) {
        let app = create_test_app();
        let (status, headers, body) = send(&app, method, uri, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INVALID_ID");
    }

    #[rstest]
    #[case(Method::GET, "/tasks/%FF", None)]
    #[case(Method::PUT, "/tasks/%FF", Some(TASK_BODY))]
    #[case(Method::DELETE, "/tasks/%C3%28", None)]
    #[case(Method::PUT, "/tasks/complete/%FF", None)]
    #[tokio::test]
    async fn undecodable_path_id_returns_json_400(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] body: Option<&str>,
    ) {
        let app = create_test_app();
        let (status, headers, body) = send(&app, method, uri, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INVALID_ID");
    }

    #[rstest]
    #[case(Method::POST, "/tasks")]
    #[case(Method::PUT, "/tasks/1")]
    #[tokio::test]
    async fn malformed_body_returns_400(
        #[case] method: Method,
        #[case] uri: &str,
        #[values(r#"{"timeEstimate":"x"}"#, "[]", "[1]")] payload: &str,
    ) {
        let app = create_test_app();
        send(&app, Method::POST, "/tasks", Some(TASK_BODY)).await;

        let (status, _, body) = send(&app, method, uri, Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "INVALID_BODY");
    }

    #[rstest]
    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let app = create_test_app();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/tasks")
            .header(header::ORIGIN, "http://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
