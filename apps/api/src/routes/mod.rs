pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

/// Several resumes per request; axum's 2 MB default is too small.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route(
            "/api/v1/job-descriptions/parse",
            post(handlers::handle_parse_jd),
        )
        .route("/api/v1/screenings", post(handlers::handle_screen))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::providers::ClientProvider;
    use crate::screening::orchestrator::ScreeningSettings;
    use crate::testing::{FailingProvider, StaticProvider, StubEmbedder, StubLlm};

    const BOUNDARY: &str = "screener-test-boundary";

    fn app(clients: impl ClientProvider + 'static) -> Router {
        build_router(AppState {
            clients: Arc::new(clients),
            settings: ScreeningSettings {
                model_timeout: Duration::from_secs(5),
                ..ScreeningSettings::default()
            },
        })
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*p)),
            );
        }
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    fn multipart_body(jd: &str, files: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\n{jd}\r\n"
            )
            .as_bytes(),
        );
        for (filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resumes\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn screening_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/screenings")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(FailingProvider)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener-api");
    }

    #[tokio::test]
    async fn test_parse_jd_returns_requirements() {
        let request = Request::post("/api/v1/job-descriptions/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"jd_text": "Requirements:\n- Rust\n- 5+ years experience"}"#,
            ))
            .unwrap();

        let response = app(FailingProvider).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["requirements"][0], "Rust");
        assert_eq!(body["requirements"][1], "5+ years experience");
    }

    #[tokio::test]
    async fn test_parse_jd_rejects_blank_text() {
        let request = Request::post("/api/v1/job-descriptions/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"jd_text": "   "}"#))
            .unwrap();

        let response = app(FailingProvider).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_screening_requires_a_supported_file() {
        let body = multipart_body("Requirements: Rust", &[("notes.txt", b"Rust".to_vec())]);
        let response = app(FailingProvider)
            .oneshot(screening_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_screening_initialization_failure_is_503() {
        let body = multipart_body(
            "Requirements: Rust",
            &[("cv.docx", docx_bytes(&["Skills: Rust"]))],
        );
        let response = app(FailingProvider)
            .oneshot(screening_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"]["code"], "INITIALIZATION_ERROR");
    }

    #[tokio::test]
    async fn test_screening_returns_ranked_report() {
        let provider = StaticProvider::new(StubLlm::failing(), StubEmbedder::constant(4));
        let body = multipart_body(
            "Requirements: Python, 3+ years experience",
            &[
                ("go.docx", docx_bytes(&["Skills: Go"])),
                ("notes.txt", b"ignored".to_vec()),
                ("py.docx", docx_bytes(&["jane@example.com", "Skills: Python, Java"])),
            ],
        );

        let response = app(provider).oneshot(screening_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report = json_body(response).await;
        assert_eq!(report["candidate_count"], 2);
        assert_eq!(report["results"][0]["filename"], "py.docx");
        assert_eq!(report["results"][0]["contact_info"]["email"], "jane@example.com");
        assert_eq!(report["results"][0]["status"]["state"], "degraded");
        assert_eq!(report["results"][1]["filename"], "go.docx");
        assert!(report["run_id"].is_string());
    }
}
