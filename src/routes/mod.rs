//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); tighten for production
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/topics", get(http::http_get_topics))
        .route("/api/v1/exams", post(http::http_post_exam))
        .route("/api/v1/exams/:id", get(http::http_get_exam))
        .route("/api/v1/exams/:id/export", get(http::http_get_export))
        .route("/api/v1/variants", post(http::http_post_variants))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;

    fn app() -> Router {
        let state = AppState::new(AppConfig::default(), None).expect("state");
        build_router(Arc::new(state))
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    async fn body_json(res: Response) -> Value {
        serde_json::from_str(&body_text(res).await).expect("json")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_reports_ai_state() {
        let res = app().oneshot(get("/api/v1/health")).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!({ "ok": true, "aiEnabled": false }));
    }

    #[tokio::test]
    async fn topics_are_listed_in_registry_order() {
        let res = app().oneshot(get("/api/v1/topics")).await.expect("response");
        let body = body_json(res).await;
        assert_eq!(body["topics"][0]["id"], "arithmetic-expression");
        assert_eq!(body["topics"].as_array().map(Vec::len), Some(18));
    }

    #[tokio::test]
    async fn generate_view_and_export() {
        let app = app();
        let req = post_json(
            "/api/v1/exams",
            json!({ "topics": ["linear-equation", "savings-goal"], "count": 4, "title": "Week 2", "seed": 9 }),
        );
        let res = app.clone().oneshot(req).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let exam = body_json(res).await;
        assert_eq!(exam["items"].as_array().map(Vec::len), Some(4));
        let id = exam["examId"].as_str().expect("id").to_string();

        let res = app.clone().oneshot(get(&format!("/api/v1/exams/{id}?reveal=true"))).await.expect("response");
        let shown = body_json(res).await;
        assert!(shown["items"][0]["answer"].is_string());

        let uri = format!("/api/v1/exams/{id}/export?mode=student&format=text");
        let res = app.oneshot(get(&uri)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"Week_2_student.txt\"")
        );
        let text = body_text(res).await;
        assert!(text.starts_with("Week 2"));
        assert!(!text.contains("Answer:"));
    }

    #[tokio::test]
    async fn pdf_export_sends_an_ascii_filename() {
        let app = app();
        let req = post_json("/api/v1/exams", json!({ "topics": ["gcd-lcm"], "count": 2, "title": "Prüfung 1" }));
        let exam = body_json(app.clone().oneshot(req).await.expect("response")).await;
        let id = exam["examId"].as_str().expect("id").to_string();

        let uri = format!("/api/v1/exams/{id}/export?mode=answer-key&format=pdf");
        let res = app.oneshot(get(&uri)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/pdf")
        );
        assert_eq!(
            res.headers().get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"Prfung_1_answer_key.pdf\"")
        );
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let app = app();
        let res = app
            .clone()
            .oneshot(post_json("/api/v1/exams", json!({ "topics": ["age-problem"] })))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["error"].as_str().is_some_and(|e| e.contains("age-problem")));

        let res = app.oneshot(get("/api/v1/exams/missing")).await.expect("response");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn variants_report_disabled_ai_per_source() {
        let body = json!({
            "topic": "pythagorean",
            "images": [{ "name": "p1.png", "mime": "image/png", "dataBase64": "AAEC" }]
        });
        let res = app().oneshot(post_json("/api/v1/variants", body)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let out = body_json(res).await;
        assert_eq!(out["failed"], 1);
        assert_eq!(out["failures"][0]["source"], "p1.png");
        assert_eq!(out["items"], json!([]));
    }
}
