//! Shared helpers for integration tests: app state and a fake AI microservice

#![allow(dead_code)]

use std::{net::SocketAddr, path::Path, sync::Arc};

use agritech_backend::{
    config::{AiConfig, UploadConfig},
    repository::InMemoryDiagnosisRepository,
    AppState, Config,
};
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// Nothing listens on the discard port, connections are refused at once
pub fn unreachable_ai() -> AiConfig {
    AiConfig {
        disease_detection_url: "http://127.0.0.1:9".to_string(),
        soil_analysis_url: "http://127.0.0.1:9".to_string(),
        assistant_url: "http://127.0.0.1:9".to_string(),
        timeout_ms: 2000,
    }
}

/// App state over an in-memory store, with uploads written under `uploads_dir`
pub fn test_state(ai: AiConfig, uploads_dir: &Path) -> (AppState, InMemoryDiagnosisRepository) {
    let repository = InMemoryDiagnosisRepository::new();
    let config = Config {
        environment: "test".to_string(),
        ai,
        uploads: UploadConfig {
            destination: uploads_dir.to_string_lossy().into_owned(),
            ..UploadConfig::default()
        },
        ..Config::default()
    };

    let state = AppState::new(config, Arc::new(repository.clone())).unwrap();
    (state, repository)
}

pub fn detection_body() -> Value {
    json!({
        "disease_name": "Mildiou",
        "disease_name_local": "Xeetu gerte",
        "confidence": 0.87,
        "severity": "high",
        "description": "Infection fongique des feuilles",
        "recommendations": [
            {
                "type": "treatment",
                "title": "Fongicide",
                "description": "Pulvériser un fongicide à base de cuivre",
                "priority": 1,
                "audio_text": "Pulvérisez un fongicide"
            },
            {
                "type": "prevention",
                "title": "Espacement",
                "description": "Espacer les plants pour aérer",
                "priority": 2
            }
        ],
        "alternative_diseases": [{"name": "Alternariose", "confidence": 0.09}],
        "model_version": "plant-disease-v2",
        "processing_time": 1.4
    })
}

#[derive(Clone)]
struct FakeAiState {
    detection: Arc<Value>,
    detect_fields: Arc<Mutex<Vec<(String, String)>>>,
}

/// In-process stand-in for the three AI microservices
pub struct FakeAi {
    pub addr: SocketAddr,
    detect_fields: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeAi {
    pub async fn start() -> Self {
        Self::start_with_detection(detection_body()).await
    }

    pub async fn start_with_detection(detection: Value) -> Self {
        let state = FakeAiState {
            detection: Arc::new(detection),
            detect_fields: Arc::new(Mutex::new(Vec::new())),
        };
        let detect_fields = state.detect_fields.clone();

        let app = Router::new()
            .route("/detect", post(detect))
            .route("/analyze", post(analyze))
            .route("/ask", post(ask))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            detect_fields,
        }
    }

    pub fn config(&self) -> AiConfig {
        let base = format!("http://{}", self.addr);
        AiConfig {
            disease_detection_url: base.clone(),
            soil_analysis_url: base.clone(),
            assistant_url: base,
            timeout_ms: 5000,
        }
    }

    /// Text fields and image file name of every detection request received
    pub async fn detect_fields(&self) -> Vec<(String, String)> {
        self.detect_fields.lock().await.clone()
    }
}

async fn detect(State(state): State<FakeAiState>, mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            field.bytes().await.unwrap();
            fields.push((name, file_name));
        } else {
            fields.push((name, field.text().await.unwrap()));
        }
    }
    state.detect_fields.lock().await.extend(fields);
    Json((*state.detection).clone())
}

async fn analyze(Json(body): Json<Value>) -> Json<Value> {
    assert!(body.get("ph").is_some());
    json!({
        "soil_quality": "excellent",
        "recommendations": [
            {"type": "irrigation", "description": "Arroser deux fois par semaine", "priority": 3}
        ],
        "suitable_crops": ["Arachide"],
        "fertilizer_needs": {"nitrogen": "Moyen", "phosphorus": "Faible", "potassium": "Faible"}
    })
    .into()
}

async fn ask(Json(body): Json<Value>) -> Json<Value> {
    let question = body["question"].as_str().unwrap_or_default();
    let language = body["language"].as_str().unwrap_or_default();
    json!({
        "answer": format!("[{}] Réponse IA: {}", language, question),
        "audio_text": "Réponse courte",
        "related_topics": ["irrigation", "mil"],
        "confidence": 0.91
    })
    .into()
}
