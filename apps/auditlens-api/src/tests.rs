//! End-to-end tests for the AuditLens API
//!
//! Each test drives the real router over an isolated SQLite database and
//! uploads directory, with the model seam replaced by a canned client.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use uuid::Uuid;

use crate::app;
use crate::model_client::{ImageInput, ModelClient};
use crate::state::AppState;

/// Model client that replies with fixed text, or fails when given none.
struct StubModel {
    reply: Option<String>,
}

impl StubModel {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None })
    }
}

#[async_trait]
impl ModelClient for StubModel {
    async fn analyze(&self, _images: &[ImageInput], _system: &str, _prompt: &str) -> Result<String> {
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => anyhow::bail!("model provider unavailable"),
        }
    }
}

/// A result payload with one critical issue at 10%/90%, wrapped in the code
/// fences real model responses arrive in.
const HAPPY_RESPONSE: &str = r#"```json
{
  "score": 72,
  "summary": "ok",
  "issues": [
    {
      "severity": "critical",
      "criterion": "1.4.3",
      "title": "Low contrast heading",
      "location": "hero section",
      "locationPercentX": 10,
      "locationPercentY": 90,
      "problem": "Heading contrast is below 4.5:1",
      "recommendation": "Darken the heading color"
    }
  ]
}
```"#;

struct TestEnv {
    app: Router,
    dir: PathBuf,
    database_url: String,
}

async fn setup(model: Arc<dyn ModelClient>) -> TestEnv {
    let dir = std::env::temp_dir().join(format!("auditlens-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let database_url = format!("sqlite:{}/test.db?mode=rwc", dir.display());

    let state = AppState::new(&database_url, dir.join("uploads"), model)
        .await
        .unwrap();
    TestEnv {
        app: app(Arc::new(state)),
        dir,
        database_url,
    }
}

impl TestEnv {
    /// Rebuild the router over the same database with a different model
    /// client, as a fresh server process would.
    async fn with_model(&self, model: Arc<dyn ModelClient>) -> Router {
        let state = AppState::new(&self.database_url, self.dir.join("uploads"), model)
            .await
            .unwrap();
        app(Arc::new(state))
    }
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": email }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["token"].as_str().unwrap().to_string()
}

async fn create_project(app: &Router, token: &str, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/projects",
            Some(token),
            serde_json::json!({ "name": name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["id"].as_str().unwrap().to_string()
}

fn multipart_request(
    uri: &str,
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "auditlens-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_works_unauthenticated() {
    let env = setup(StubModel::failing()).await;
    let response = env.app.clone().oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_invalid_email() {
    let env = setup(StubModel::failing()).await;
    for email in ["", "   ", "not-an-email"] {
        let response = env
            .app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn login_is_idempotent_per_email() {
    let env = setup(StubModel::failing()).await;
    let first = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": "dev@example.com" }),
        ))
        .await
        .unwrap();
    let first = read_json(first).await;

    let second = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": "dev@example.com" }),
        ))
        .await
        .unwrap();
    let second = read_json(second).await;

    // Same user, fresh token
    assert_eq!(first["userId"], second["userId"]);
    assert_ne!(first["token"], second["token"]);
}

#[tokio::test]
async fn data_routes_require_a_session() {
    let env = setup(StubModel::failing()).await;
    let response = env
        .app
        .clone()
        .oneshot(get_request("/api/projects", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = env
        .app
        .clone()
        .oneshot(get_request("/api/projects", Some("bogus-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn project_crud_roundtrip() {
    let env = setup(StubModel::failing()).await;
    let token = login(&env.app, "alice@example.com").await;

    // Empty name is rejected inline
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/projects",
            Some(&token),
            serde_json::json!({ "name": "  " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let project_id = create_project(&env.app, &token, "Marketing site").await;

    let response = env
        .app
        .clone()
        .oneshot(get_request("/api/projects", Some(&token)))
        .await
        .unwrap();
    let listed = read_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Marketing site");
    assert_eq!(listed[0]["auditCount"], 0);

    let response = env
        .app
        .clone()
        .oneshot(get_request(&format!("/api/projects/{}", project_id), Some(&token)))
        .await
        .unwrap();
    let detail = read_json(response).await;
    assert_eq!(detail["id"], project_id.as_str());
    assert_eq!(detail["audits"].as_array().unwrap().len(), 0);

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/projects/{}", project_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = env
        .app
        .clone()
        .oneshot(get_request("/api/projects", Some(&token)))
        .await
        .unwrap();
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn projects_are_scoped_to_their_owner() {
    let env = setup(StubModel::failing()).await;
    let alice = login(&env.app, "alice@example.com").await;
    let mallory = login(&env.app, "mallory@example.com").await;

    let project_id = create_project(&env.app, &alice, "Private").await;

    // Existence is not leaked: not-owned reads as not-found
    let response = env
        .app
        .clone()
        .oneshot(get_request(&format!("/api/projects/{}", project_id), Some(&mallory)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A foreign delete silently does nothing
    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/projects/{}", project_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", mallory))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = env
        .app
        .clone()
        .oneshot(get_request(&format!("/api/projects/{}", project_id), Some(&alice)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Audit runs against a foreign project are not-found either
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&mallory),
            serde_json::json!({
                "projectId": project_id,
                "imageUrls": ["https://example.com/shot.png"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_stores_and_serves_the_file() {
    let env = setup(StubModel::failing()).await;
    let token = login(&env.app, "alice@example.com").await;

    let png = [0x89u8, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
    let response = env
        .app
        .clone()
        .oneshot(multipart_request("/api/upload", &token, "shot.png", "image/png", &png))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let url = read_json(response).await["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("-shot.png"));

    // The stored file is retrievable at the returned URL
    let response = env.app.clone().oneshot(get_request(&url, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), &png[..]);
}

#[tokio::test]
async fn upload_rejects_wrong_type_and_oversize() {
    let env = setup(StubModel::failing()).await;
    let token = login(&env.app, "alice@example.com").await;

    let response = env
        .app
        .clone()
        .oneshot(multipart_request(
            "/api/upload",
            &token,
            "notes.pdf",
            "application/pdf",
            b"%PDF-1.4",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
    let response = env
        .app
        .clone()
        .oneshot(multipart_request(
            "/api/upload",
            &token,
            "huge.png",
            "image/png",
            &oversized,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audit_run_validates_inputs() {
    let env = setup(StubModel::replying(HAPPY_RESPONSE)).await;
    let token = login(&env.app, "alice@example.com").await;
    let project_id = create_project(&env.app, &token, "Site").await;

    // Missing images
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            serde_json::json!({ "projectId": project_id, "imageUrls": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown project
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            serde_json::json!({
                "projectId": "no-such-project",
                "imageUrls": ["https://example.com/shot.png"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_happy_path_end_to_end() {
    let env = setup(StubModel::replying(HAPPY_RESPONSE)).await;
    let token = login(&env.app, "alice@example.com").await;
    let project_id = create_project(&env.app, &token, "Site").await;

    // Upload a screenshot so the workflow exercises the local-file branch
    let png = [0x89u8, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let response = env
        .app
        .clone()
        .oneshot(multipart_request("/api/upload", &token, "shot.png", "image/png", &png))
        .await
        .unwrap();
    let image_url = read_json(response).await["url"].as_str().unwrap().to_string();

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            serde_json::json!({ "projectId": project_id, "imageUrls": [image_url] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let audit_id = body["auditId"].as_str().unwrap().to_string();
    assert_eq!(body["result"]["score"], 72);

    // The persisted record is complete with the score stored
    let response = env
        .app
        .clone()
        .oneshot(get_request(&format!("/api/audits/{}", audit_id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let audit = read_json(response).await;
    assert_eq!(audit["status"], "complete");
    assert_eq!(audit["score"], 72);

    // Exactly one critical group with one member, keeping original index 0
    let result: shared_types::AuditResult =
        serde_json::from_value(audit["result"].clone()).unwrap();
    let groups = audit_engine::group_by_severity(&result.issues);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].severity, shared_types::Severity::Critical);
    assert_eq!(groups[0].issues.len(), 1);
    assert_eq!(groups[0].issues[0].marker_number(), 1);

    // Its marker lands at 10%/90% of the image bounds, scaled by zoom
    let mut zoom = viewer_core::ZoomController::new();
    zoom.zoom_in();
    let (x, y) =
        viewer_core::marker_position(&result.issues[0], 1200.0, 800.0, zoom.scale());
    assert_eq!((x, y), (150.0, 900.0));
}

#[tokio::test]
async fn failed_model_call_marks_audit_error() {
    let env = setup(StubModel::failing()).await;
    let token = login(&env.app, "alice@example.com").await;
    let project_id = create_project(&env.app, &token, "Site").await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            serde_json::json!({
                "projectId": project_id,
                "imageUrls": ["https://example.com/shot.png"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The record is terminal-error with score and result unset
    let response = env
        .app
        .clone()
        .oneshot(get_request(&format!("/api/projects/{}", project_id), Some(&token)))
        .await
        .unwrap();
    let detail = read_json(response).await;
    let audits = detail["audits"].as_array().unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0]["status"], "error");
    assert!(audits[0]["score"].is_null());
    assert!(audits[0]["result"].is_null());
}

#[tokio::test]
async fn unparsable_model_reply_marks_audit_error() {
    let env = setup(StubModel::replying("I cannot audit this image, sorry.")).await;
    let token = login(&env.app, "alice@example.com").await;
    let project_id = create_project(&env.app, &token, "Site").await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            serde_json::json!({
                "projectId": project_id,
                "imageUrls": ["https://example.com/shot.png"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "Audit failed");
}

#[tokio::test]
async fn a_failed_audit_does_not_taint_the_next_run() {
    let env = setup(StubModel::failing()).await;
    let token = login(&env.app, "alice@example.com").await;
    let project_id = create_project(&env.app, &token, "Site").await;

    let request = serde_json::json!({
        "projectId": project_id,
        "imageUrls": ["https://example.com/shot.png"]
    });

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            request.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Same project and images, fresh server with a healthy model
    let healthy = env.with_model(StubModel::replying(HAPPY_RESPONSE)).await;
    let response = healthy
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/audit/accessibility",
            Some(&token),
            request,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Both records exist independently: one error, one complete
    let response = healthy
        .clone()
        .oneshot(get_request(&format!("/api/projects/{}", project_id), Some(&token)))
        .await
        .unwrap();
    let detail = read_json(response).await;
    let audits = detail["audits"].as_array().unwrap();
    assert_eq!(audits.len(), 2);

    let mut statuses: Vec<&str> = audits
        .iter()
        .map(|a| a["status"].as_str().unwrap())
        .collect();
    statuses.sort_unstable();
    assert_eq!(statuses, vec!["complete", "error"]);

    for audit in audits {
        match audit["status"].as_str().unwrap() {
            "error" => assert!(audit["score"].is_null()),
            "complete" => assert_eq!(audit["score"], 72),
            other => panic!("unexpected status {}", other),
        }
    }
}
