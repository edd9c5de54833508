//! Form analysis and report handler tests
//!
//! The handlers are mounted behind a fixed `AuthenticatedUser` extension
//! instead of the JWT middleware, so they run without a database.

mod common;

use axum::{
    Extension, Router,
    routing::post,
};
use clubhub::{
    ComplianceAnalyzer,
    handlers::{analysis::analyze_form, reports::run_query},
    middleware::AuthenticatedUser,
};
use common::{StubBackend, TestApp, test_app::test_state};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

async fn spawn(analyzer: ComplianceAnalyzer) -> TestApp {
    let state = test_state(analyzer);
    let user = AuthenticatedUser {
        id: uuid::Uuid::now_v7(),
        username: "treasurer".to_string(),
        email: "treasurer@example.com".to_string(),
    };

    let router = Router::new()
        .route("/api/analyze-form/", post(analyze_form))
        .route("/api/query/", post(run_query))
        .layer(Extension(user))
        .with_state(state.clone());

    TestApp::with_router(router, state).await
}

fn text_upload(text: &str) -> Form {
    Form::new().part(
        "file",
        Part::bytes(text.as_bytes().to_vec())
            .file_name("form.txt")
            .mime_str("text/plain")
            .unwrap(),
    )
}

// ============================================================================
// POST /api/analyze-form/
// ============================================================================

#[tokio::test]
async fn test_analyze_form_returns_model_review() {
    let backend = StubBackend::replying(
        r#"{"issues": ["Missing budget breakdown"], "recommendations": ["Add a budget table"]}"#,
    );
    let app = spawn(ComplianceAnalyzer::new(backend.clone())).await;

    let response = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(text_upload("Event: Spring Gala\nAmount requested: $500"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["issues"], json!(["Missing budget breakdown"]));
    assert_eq!(body["recommendations"], json!(["Add a budget table"]));

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Spring Gala"));
}

#[tokio::test]
async fn test_analyze_form_extracts_json_from_chatty_reply() {
    let backend = StubBackend::replying(
        "Here is my review:\n```json\n{\"issues\": [], \"recommendations\": [\"Looks good\"]}\n```",
    );
    let app = spawn(ComplianceAnalyzer::new(backend)).await;

    let body: Value = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(text_upload("Amount requested: $120"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["issues"], json!([]));
    assert_eq!(body["recommendations"], json!(["Looks good"]));
}

#[tokio::test]
async fn test_analyze_form_reports_unparseable_reply() {
    let app = spawn(ComplianceAnalyzer::new(StubBackend::replying("I cannot help with that."))).await;

    let response = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(text_upload("Amount requested: $120"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["issues"], json!(["Error parsing model response"]));
}

#[tokio::test]
async fn test_analyze_form_reports_model_failure_in_payload() {
    let app = spawn(ComplianceAnalyzer::new(StubBackend::failing("connection refused"))).await;

    let response = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(text_upload("Amount requested: $120"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let issue = body["issues"][0].as_str().unwrap();
    assert!(issue.starts_with("Error calling language model"));
    assert!(issue.contains("connection refused"));
}

#[tokio::test]
async fn test_analyze_form_without_model() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let body: Value = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(text_upload("Amount requested: $120"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(
        body["issues"][0]
            .as_str()
            .unwrap()
            .starts_with("Error calling language model")
    );
}

#[tokio::test]
async fn test_analyze_form_requires_file_field() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let form = Form::new().text("note", "no attachment");
    let response = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No file uploaded." }));
}

#[tokio::test]
async fn test_analyze_form_rejects_non_multipart_body() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let response = app
        .client
        .post(app.url("/api/analyze-form/"))
        .json(&json!({ "file": "form.pdf" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No file uploaded.");
}

#[tokio::test]
async fn test_analyze_form_reports_unreadable_pdf() {
    let backend = StubBackend::replying(r#"{"issues": [], "recommendations": []}"#);
    let app = spawn(ComplianceAnalyzer::new(backend.clone())).await;

    let form = Form::new().part(
        "file",
        Part::bytes(b"definitely not a pdf".to_vec())
            .file_name("form.pdf")
            .mime_str("application/pdf")
            .unwrap(),
    );
    let response = app
        .client
        .post(app.url("/api/analyze-form/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(
        body["issues"][0]
            .as_str()
            .unwrap()
            .starts_with("Error processing form")
    );
    assert!(backend.prompts.lock().unwrap().is_empty());
}

// ============================================================================
// POST /api/query/
// ============================================================================

#[tokio::test]
async fn test_query_requires_name() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let response = app
        .client
        .post(app.url("/api/query/"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "QUERY_MISSING");
}

#[tokio::test]
async fn test_query_rejects_raw_sql() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let response = app
        .client
        .post(app.url("/api/query/"))
        .json(&json!({ "query": "SELECT * FROM users" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UNKNOWN_QUERY");
}

#[tokio::test]
async fn test_query_validates_parameters() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let response = app
        .client
        .post(app.url("/api/query/"))
        .json(&json!({ "query": "foods_by_calories", "params": { "max_calories": "lots" } }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_PARAMETER");
}

#[tokio::test]
async fn test_query_rejects_wrongly_typed_body() {
    let app = spawn(ComplianceAnalyzer::unconfigured()).await;

    let response = app
        .client
        .post(app.url("/api/query/"))
        .json(&json!({ "query": "club_events", "params": ["club"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
