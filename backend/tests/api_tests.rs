//! HTTP API tests
//!
//! Drive the full router with `tower::ServiceExt::oneshot`, the AI services
//! either unreachable or replaced by an in-process fake.

use agritech_backend::{create_app, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

const BOUNDARY: &str = "agritech-test-boundary";

fn app(state: AppState) -> Router {
    create_app(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart body with text fields and an optional image part
fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn post_diagnosis(body: Vec<u8>, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/diagnosis/crop-disease")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }
    builder.body(Body::from(body)).unwrap()
}

fn diagnosis_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("crop_type", "Tomate"),
        ("crop_age_days", "45"),
        ("region", "Thiès"),
        ("symptoms", "Taches jaunes sur feuilles, Feuilles sèches,"),
        ("language", "fr"),
    ]
}

// ============================================================================
// Soil
// ============================================================================

#[tokio::test]
async fn test_soil_analysis_falls_back_offline() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/soil/analyze",
            json!({
                "ph": 6.5, "nitrogen": 45, "phosphorus": 30, "potassium": 120,
                "temperature": 28, "humidity": 35, "region": "Thiès"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soilQuality"], "good");
    assert_eq!(body["recommendations"], json!([]));
    assert_eq!(body["suitableCrops"], json!(["Maïs", "Tomate", "Oignon", "Haricot"]));
    assert_eq!(
        body["fertilizerNeeds"],
        json!({"nitrogen": "Moyen", "phosphorus": "Moyen", "potassium": "Moyen"})
    );
}

#[tokio::test]
async fn test_soil_analysis_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/soil/analyze",
            json!({
                "ph": 15, "nitrogen": 45, "phosphorus": 30, "potassium": 120,
                "temperature": 28, "humidity": 35, "region": "Thiès"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "ph");
    assert!(body["error"]["message_fr"].is_string());
}

#[tokio::test]
async fn test_soil_analysis_missing_field_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json("/api/v1/soil/analyze", json!({"ph": 6.5, "region": "Thiès"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// ============================================================================
// Assistant
// ============================================================================

#[tokio::test]
async fn test_assistant_falls_back_to_irrigation_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/assistant/ask",
            json!({"question": "Comment arroser le mil?", "language": "fr"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.starts_with("Pour l'arrosage"));
    assert!(body["audioText"].is_string());
    assert!(body.get("relatedTopics").is_none());
}

#[tokio::test]
async fn test_assistant_rejects_long_question() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json("/api/v1/assistant/ask", json!({"question": "a".repeat(501)})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "question");
}

#[tokio::test]
async fn test_assistant_uses_ai_answer() {
    let dir = tempfile::tempdir().unwrap();
    let ai = common::FakeAi::start().await;
    let (state, _) = common::test_state(ai.config(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json("/api/v1/assistant/ask", json!({"question": "Bonjour"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "[fr] Réponse IA: Bonjour");
    assert_eq!(body["relatedTopics"], json!(["irrigation", "mil"]));
}

// ============================================================================
// Diagnosis
// ============================================================================

#[tokio::test]
async fn test_create_diagnosis_and_read_it_back() {
    let dir = tempfile::tempdir().unwrap();
    let ai = common::FakeAi::start().await;
    let (state, repository) = common::test_state(ai.config(), dir.path());
    let app = app(state);

    let body = multipart_body(
        &diagnosis_fields(),
        Some(("feuille.jpg", "image/jpeg", &b"\xFF\xD8\xFFfake-jpeg"[..])),
    );
    let (status, created) = send(&app, post_diagnosis(body, Some("farmer-9"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], "farmer-9");
    assert_eq!(created["diseaseName"], "Mildiou");
    assert_eq!(created["status"], "completed");
    assert_eq!(created["symptoms"], json!(["Taches jaunes sur feuilles", "Feuilles sèches"]));
    assert_eq!(created["recommendations"][0]["type"], "treatment");
    assert_eq!(created["aiModelMetadata"]["modelVersion"], "plant-disease-v2");
    assert!(created.get("imagePath").is_none());

    let image_url = created["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/image-"));
    assert!(image_url.ends_with(".jpg"));
    assert_eq!(repository.len().await, 1);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/v1/diagnosis/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let history_request = Request::builder()
        .uri("/api/v1/diagnosis/history?cropType=Tomate&limit=5")
        .header("x-user-id", "farmer-9")
        .body(Body::empty())
        .unwrap();
    let (status, history) = send(&app, history_request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    // Other users do not see it
    let (_, default_history) = send(&app, get("/api/v1/diagnosis/history")).await;
    assert_eq!(default_history, json!([]));

    let stats_request = Request::builder()
        .uri("/api/v1/diagnosis/stats/overview")
        .header("x-user-id", "farmer-9")
        .body(Body::empty())
        .unwrap();
    let (status, stats) = send(&app, stats_request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalDiagnoses"], 1);
    assert_eq!(stats["diseaseDistribution"], json!([{"name": "Mildiou", "count": 1}]));
    assert_eq!(stats["averageConfidence"], 0.87);

    // The stored image is served statically
    let (status, _) = send(&app, get(image_url)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_diagnosis_ai_down_is_503() {
    let dir = tempfile::tempdir().unwrap();
    let (state, repository) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let body = multipart_body(
        &diagnosis_fields(),
        Some(("feuille.png", "image/png", &b"\x89PNGfake"[..])),
    );
    let (status, error) = send(&app, post_diagnosis(body, None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["error"]["code"], "AI_SERVICE_UNAVAILABLE");
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_create_diagnosis_rejects_disallowed_type() {
    let dir = tempfile::tempdir().unwrap();
    let (state, repository) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let body = multipart_body(
        &diagnosis_fields(),
        Some(("feuille.gif", "image/gif", &b"GIF89a"[..])),
    );
    let (status, error) = send(&app, post_diagnosis(body, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["field"], "image");
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_create_diagnosis_requires_image_and_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, error) = send(&app, post_diagnosis(multipart_body(&diagnosis_fields(), None), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["field"], "image");

    let fields = vec![("crop_type", "Tomate"), ("crop_age_days", "45"), ("region", "Thiès")];
    let body = multipart_body(&fields, Some(("a.jpg", "image/jpeg", &b"jpeg"[..])));
    let (status, error) = send(&app, post_diagnosis(body, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["field"], "symptoms");

    let mut fields = diagnosis_fields();
    fields[1] = ("crop_age_days", "0");
    let body = multipart_body(&fields, Some(("a.jpg", "image/jpeg", &b"jpeg"[..])));
    let (status, error) = send(&app, post_diagnosis(body, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["field"], "crop_age_days");
}

#[tokio::test]
async fn test_create_diagnosis_rejects_non_multipart_body() {
    let dir = tempfile::tempdir().unwrap();
    let (state, repository) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, error) = send(
        &app,
        post_json("/api/v1/diagnosis/crop-disease", json!({"crop_type": "Tomate"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert!(error["error"]["message_fr"].is_string());

    let no_boundary = Request::builder()
        .method("POST")
        .uri("/api/v1/diagnosis/crop-disease")
        .header(header::CONTENT_TYPE, "multipart/form-data")
        .body(Body::empty())
        .unwrap();
    let (status, error) = send(&app, no_boundary).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert!(repository.is_empty().await);
}

#[tokio::test]
async fn test_unknown_json_fields_are_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/soil/analyze",
            json!({
                "ph": 6.5, "nitrogen": 45, "phosphorus": 30, "potassium": 120,
                "temperature": 28, "humidity": 35, "region": "Thiès", "farmSize": 2
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        post_json("/api/v1/assistant/ask", json!({"question": "Bonjour", "topic": "mil"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_assistant_empty_language_answers_in_french() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/assistant/ask",
            json!({"question": "Comment arroser le mil?", "language": ""}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].as_str().unwrap().starts_with("Pour l'arrosage"));
}

#[tokio::test]
async fn test_unknown_or_malformed_id_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(&app, get("/api/v1/diagnosis/not-a-uuid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        get(&format!("/api/v1/diagnosis/{}", uuid::Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_window_validation() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    let (status, body) = send(&app, get("/api/v1/diagnosis/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    for uri in [
        "/api/v1/diagnosis/history?limit=0",
        "/api/v1/diagnosis/history?limit=101",
        "/api/v1/diagnosis/history?offset=-1",
        "/api/v1/diagnosis/history?limit=twenty",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_in_memory_storage() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = common::test_state(common::unreachable_ai(), dir.path());
    let app = app(state);

    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "in-memory");
    }

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().starts_with("AgriTech"));
}
