pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::flow::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        // Flow API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route("/api/v1/sessions/:id/text", post(handlers::handle_submit_text))
        .route("/api/v1/sessions/:id/upload", post(handlers::handle_upload))
        .route(
            "/api/v1/sessions/:id/document",
            post(handlers::handle_submit_document),
        )
        .route(
            "/api/v1/sessions/:id/template",
            put(handlers::handle_select_template),
        )
        .route("/api/v1/sessions/:id/optimize", post(handlers::handle_optimize))
        .route("/api/v1/sessions/:id/back", post(handlers::handle_back))
        .route(
            "/api/v1/sessions/:id/mutations",
            post(handlers::handle_apply_mutation),
        )
        .route("/api/v1/sessions/:id/measure", post(handlers::handle_measure))
        .route("/api/v1/sessions/:id/render", get(handlers::handle_render))
        .route("/api/v1/sessions/:id/export", get(handlers::handle_export))
        // Field editing
        .route(
            "/api/v1/sessions/:id/edit/open",
            post(handlers::handle_open_field),
        )
        .route(
            "/api/v1/sessions/:id/edit/input",
            post(handlers::handle_field_input),
        )
        .route("/api/v1/sessions/:id/edit/key", post(handlers::handle_field_key))
        .route(
            "/api/v1/sessions/:id/edit/commit",
            post(handlers::handle_field_commit),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::flow::service::tests::StubDocuments;
    use crate::flow::SessionStore;
    use crate::layout::engine::AutoFitConfig;
    use crate::models::document::fixtures::sample_document;
    use crate::render::TemplateRegistry;

    fn test_state(documents: StubDocuments) -> AppState {
        AppState {
            config: Config {
                openai_api_key: "test".to_string(),
                ai_base_url: "http://localhost".to_string(),
                ai_model: "test-model".to_string(),
                default_language: "French".to_string(),
                port: 0,
                rust_log: "debug".to_string(),
                layout: AutoFitConfig::default(),
            },
            documents: Arc::new(documents),
            sessions: SessionStore::new(),
            templates: Arc::new(TemplateRegistry::builtin()),
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Creates a session holding the sample document and returns its base URI.
    async fn session_with_document(app: &Router) -> String {
        let (status, created) = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let base = format!("/api/v1/sessions/{}", created["id"].as_str().unwrap());
        let doc = serde_json::to_value(sample_document()).unwrap();
        let (status, _) = send(app, "POST", &format!("{base}/document"), Some(doc)).await;
        assert_eq!(status, StatusCode::OK);
        base
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(StubDocuments::default()));
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "coverflow-api");
    }

    #[tokio::test]
    async fn test_templates_listed() {
        let app = build_router(test_state(StubDocuments::default()));
        let (status, body) = send(&app, "GET", "/api/v1/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["id"].as_str())
            .collect();
        assert!(ids.contains(&"professional"));
        assert!(ids.contains(&"classic"));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = build_router(test_state(StubDocuments::default()));
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_mutation_round_trip() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;

        let mutation = json!({"op": "update", "path": "summary", "value": "Rust backend engineer"});
        let (status, body) = send(&app, "POST", &format!("{base}/mutations"), Some(mutation)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["revision"], 1);

        let (_, body) = send(&app, "GET", &base, None).await;
        assert_eq!(body["document"]["summary"], "Rust backend engineer");
        assert_eq!(body["step"], "template");

        let remove = json!({"op": "removeAt", "path": "experiences.0.description", "index": 0});
        let (status, body) = send(&app, "POST", &format!("{base}/mutations"), Some(remove)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["document"]["experiences"][0]["description"]
                .as_array()
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_out_of_range_mutation_is_invalid_path() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;
        let mutation = json!({"op": "update", "path": "experiences.9.role", "value": "x"});
        let (status, body) = send(&app, "POST", &format!("{base}/mutations"), Some(mutation)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PATH");

        let (_, body) = send(&app, "GET", &base, None).await;
        assert_eq!(body["revision"], 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_does_not_advance() {
        let app = build_router(test_state(StubDocuments {
            fail_extract: true,
            ..Default::default()
        }));
        let (_, created) = send(&app, "POST", "/api/v1/sessions", None).await;
        let base = format!("/api/v1/sessions/{}", created["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            "POST",
            &format!("{base}/text"),
            Some(json!({"text": "Camille Martin, backend engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "EXTRACTION_FAILED");

        let (_, body) = send(&app, "GET", &base, None).await;
        assert_eq!(body["step"], "upload");
        assert!(body["document"].is_null());
    }

    #[tokio::test]
    async fn test_optimization_failure_still_advances() {
        let app = build_router(test_state(StubDocuments {
            fail_optimize: true,
            ..Default::default()
        }));
        let base = session_with_document(&app).await;
        let (status, body) = send(&app, "POST", &format!("{base}/optimize"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "edit");
        assert_eq!(body["document"]["summary"], sample_document().summary);
    }

    #[tokio::test]
    async fn test_template_change_resets_layout() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("{base}/measure"),
            Some(json!({"height": 1400.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["outcome"], "applied");
        assert_eq!(body["layout"]["state"]["density"], "tight");

        let (_, body) = send(
            &app,
            "PUT",
            &format!("{base}/template"),
            Some(json!({"templateId": "minimal"})),
        )
        .await;
        assert_eq!(body["templateId"], "minimal");
        assert_eq!(body["layout"]["state"]["density"], "normal");
    }

    #[tokio::test]
    async fn test_unmeasurable_height_is_a_no_op() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("{base}/measure"),
            Some(json!({"height": null})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"]["outcome"], "unavailable");
        assert_eq!(body["layout"]["state"]["density"], "normal");
    }

    #[tokio::test]
    async fn test_render_falls_back_for_unknown_template() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;
        send(
            &app,
            "PUT",
            &format!("{base}/template"),
            Some(json!({"templateId": "does-not-exist"})),
        )
        .await;
        let (status, body) = send(&app, "GET", &format!("{base}/render"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["templateId"], "professional");
        assert_eq!(body["tokens"]["scale"], 1.0);
        assert!(body["tree"]["body"].is_object());
    }

    #[tokio::test]
    async fn test_render_without_document_conflicts() {
        let app = build_router(test_state(StubDocuments::default()));
        let (_, created) = send(&app, "POST", "/api/v1/sessions", None).await;
        let uri = format!("/api/v1/sessions/{}/render", created["id"].as_str().unwrap());
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_export_returns_html() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;
        let request = Request::builder()
            .uri(format!("{base}/export"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(&sample_document().personal_info.full_name));
    }

    #[tokio::test]
    async fn test_field_edit_over_http() {
        let app = build_router(test_state(StubDocuments::default()));
        let base = session_with_document(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("{base}/edit/open"),
            Some(json!({"path": "personalInfo.jobTitle", "gesture": "click"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["opened"], true);

        send(
            &app,
            "POST",
            &format!("{base}/edit/input"),
            Some(json!({"text": "Principal Engineer"})),
        )
        .await;
        let (_, body) = send(&app, "POST", &format!("{base}/edit/key"), Some(json!({"key": "enter"}))).await;
        assert_eq!(body["revision"], 1);
        assert_eq!(body["document"]["personalInfo"]["jobTitle"], "Principal Engineer");
        assert!(body.get("editing").is_none());
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_file() {
        let app = build_router(test_state(StubDocuments::default()));
        let (_, created) = send(&app, "POST", "/api/v1/sessions", None).await;
        let uri = format!("/api/v1/sessions/{}/upload", created["id"].as_str().unwrap());

        let boundary = "coverflow-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.png\"\r\n\
             Content-Type: image/png\r\n\r\nnot an image\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
