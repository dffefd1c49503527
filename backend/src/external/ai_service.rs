//! AI Service Client
//!
//! Client for the three AI microservices: disease detection, soil analysis
//! and the farming assistant. Each endpoint gets its own HTTP client so a
//! slow or broken service never holds connections needed by the others.

use std::{fmt, path::PathBuf, time::Duration};

use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{
    AlternativeDisease, AssistantAnswer, FertilizerNeeds, Recommendation, Severity,
    SoilAnalysisInput, SoilAnalysisResult, SoilQuality, SoilRecommendation,
};
use thiserror::Error;

use crate::config::AiConfig;

/// Downstream AI endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEndpoint {
    DiseaseDetection,
    SoilAnalysis,
    Assistant,
}

impl AiEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            AiEndpoint::DiseaseDetection => "/detect",
            AiEndpoint::SoilAnalysis => "/analyze",
            AiEndpoint::Assistant => "/ask",
        }
    }

    pub fn name_en(&self) -> &'static str {
        match self {
            AiEndpoint::DiseaseDetection => "disease detection",
            AiEndpoint::SoilAnalysis => "soil analysis",
            AiEndpoint::Assistant => "assistant",
        }
    }

    pub fn name_fr(&self) -> &'static str {
        match self {
            AiEndpoint::DiseaseDetection => "de détection de maladies",
            AiEndpoint::SoilAnalysis => "d'analyse du sol",
            AiEndpoint::Assistant => "assistant",
        }
    }
}

impl fmt::Display for AiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_en())
    }
}

/// An AI endpoint could not produce a usable answer
///
/// Timeouts, refused connections, non-2xx statuses and undecodable bodies
/// all end up here; callers pick a fallback or surface a 503.
#[derive(Debug, Error)]
#[error("AI {endpoint} service unavailable: {reason}")]
pub struct ServiceUnavailable {
    pub endpoint: AiEndpoint,
    pub reason: String,
}

impl ServiceUnavailable {
    pub fn new(endpoint: AiEndpoint, reason: impl Into<String>) -> Self {
        Self {
            endpoint,
            reason: reason.into(),
        }
    }
}

pub type AiResult<T> = Result<T, ServiceUnavailable>;

// ============================================================================
// Disease detection wire types
// ============================================================================

/// Image and crop details sent for disease detection
#[derive(Debug, Clone)]
pub struct DiseaseDetectionRequest {
    /// Where the caller already stored the image
    pub image_path: PathBuf,
    pub content_type: String,
    pub crop_type: String,
    pub crop_age_days: i32,
    pub region: String,
    pub symptoms: Vec<String>,
    pub language: String,
}

/// Response from the disease detection API
#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseDetectionResponse {
    pub disease_name: String,
    pub disease_name_local: Option<String>,
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub recommendations: Vec<RecommendationResponse>,
    pub alternative_diseases: Option<Vec<AlternativeDiseaseResponse>>,
    pub model_version: Option<String>,
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub audio_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlternativeDiseaseResponse {
    pub name: String,
    pub confidence: f64,
}

impl From<RecommendationResponse> for Recommendation {
    fn from(r: RecommendationResponse) -> Self {
        Recommendation {
            kind: r.kind,
            title: r.title,
            description: r.description,
            priority: r.priority,
            audio_text: r.audio_text,
        }
    }
}

impl From<AlternativeDiseaseResponse> for AlternativeDisease {
    fn from(r: AlternativeDiseaseResponse) -> Self {
        AlternativeDisease {
            name: r.name,
            confidence: r.confidence,
        }
    }
}

// ============================================================================
// Soil analysis wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SoilAnalysisRequest {
    pub ph: f64,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    pub language: String,
}

impl From<&SoilAnalysisInput> for SoilAnalysisRequest {
    fn from(input: &SoilAnalysisInput) -> Self {
        SoilAnalysisRequest {
            ph: input.ph,
            nitrogen: input.nitrogen,
            phosphorus: input.phosphorus,
            potassium: input.potassium,
            temperature: input.temperature,
            humidity: input.humidity,
            region: input.region.clone(),
            crop_type: input.crop_type.clone(),
            language: input.language_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoilAnalysisResponse {
    pub soil_quality: SoilQuality,
    #[serde(default)]
    pub recommendations: Vec<SoilRecommendation>,
    #[serde(default)]
    pub suitable_crops: Vec<String>,
    pub fertilizer_needs: FertilizerNeeds,
}

impl From<SoilAnalysisResponse> for SoilAnalysisResult {
    fn from(r: SoilAnalysisResponse) -> Self {
        SoilAnalysisResult {
            soil_quality: r.soil_quality,
            recommendations: r.recommendations,
            suitable_crops: r.suitable_crops,
            fertilizer_needs: r.fertilizer_needs,
        }
    }
}

// ============================================================================
// Assistant wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AssistantRequest<'a> {
    pub question: &'a str,
    pub language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantResponse {
    pub answer: String,
    pub audio_text: Option<String>,
    pub related_topics: Option<Vec<String>>,
    pub confidence: Option<f64>,
}

impl From<AssistantResponse> for AssistantAnswer {
    fn from(r: AssistantResponse) -> Self {
        AssistantAnswer {
            answer: r.answer,
            audio_text: r.audio_text,
            related_topics: r.related_topics,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for the AI microservices
#[derive(Clone)]
pub struct AiServiceClient {
    disease_detection: EndpointClient,
    soil_analysis: EndpointClient,
    assistant: EndpointClient,
}

#[derive(Clone)]
struct EndpointClient {
    endpoint: AiEndpoint,
    base_url: String,
    http_client: Client,
}

impl EndpointClient {
    fn new(endpoint: AiEndpoint, base_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint.path())
    }

    fn unavailable(&self, reason: impl Into<String>) -> ServiceUnavailable {
        let error = ServiceUnavailable::new(self.endpoint, reason);
        tracing::error!("Error calling {} service: {}", self.endpoint, error.reason);
        error
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        sent: reqwest::Result<Response>,
    ) -> AiResult<T> {
        let response = sent
            .map_err(|e| self.unavailable(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| self.unavailable(format!("API returned error: {}", e)))?;

        response
            .json::<T>()
            .await
            .map_err(|e| self.unavailable(format!("Failed to parse response: {}", e)))
    }
}

impl AiServiceClient {
    /// Create the client, one connection pool per endpoint
    pub fn new(config: &AiConfig) -> reqwest::Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        Ok(Self {
            disease_detection: EndpointClient::new(
                AiEndpoint::DiseaseDetection,
                &config.disease_detection_url,
                timeout,
            )?,
            soil_analysis: EndpointClient::new(
                AiEndpoint::SoilAnalysis,
                &config.soil_analysis_url,
                timeout,
            )?,
            assistant: EndpointClient::new(AiEndpoint::Assistant, &config.assistant_url, timeout)?,
        })
    }

    /// Send a stored image and crop details for disease detection
    pub async fn detect_disease(
        &self,
        request: &DiseaseDetectionRequest,
    ) -> AiResult<DiseaseDetectionResponse> {
        let client = &self.disease_detection;
        tracing::info!("Calling AI disease detection for {}", request.crop_type);

        let bytes = tokio::fs::read(&request.image_path)
            .await
            .map_err(|e| client.unavailable(format!("Failed to read image: {}", e)))?;

        let file_name = request
            .image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let image = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&request.content_type)
            .map_err(|e| client.unavailable(format!("Invalid image type: {}", e)))?;

        let symptoms = serde_json::to_string(&request.symptoms)
            .map_err(|e| client.unavailable(format!("Failed to encode symptoms: {}", e)))?;

        let form = Form::new()
            .part("image", image)
            .text("crop_type", request.crop_type.clone())
            .text("crop_age_days", request.crop_age_days.to_string())
            .text("region", request.region.clone())
            .text("symptoms", symptoms)
            .text("language", request.language.clone());

        let sent = client.http_client.post(client.url()).multipart(form).send().await;
        let result: DiseaseDetectionResponse = client.read_json(sent).await?;

        tracing::info!("Disease detection completed: {}", result.disease_name);
        Ok(result)
    }

    /// Send soil measurements for analysis
    pub async fn analyze_soil(&self, request: &SoilAnalysisRequest) -> AiResult<SoilAnalysisResponse> {
        let client = &self.soil_analysis;
        tracing::info!("Calling AI soil analysis service");

        let sent = client.http_client.post(client.url()).json(request).send().await;
        let result = client.read_json(sent).await?;

        tracing::info!("Soil analysis completed");
        Ok(result)
    }

    /// Ask the farming assistant a question
    pub async fn ask_assistant(
        &self,
        question: &str,
        language: &str,
        context: Option<&str>,
    ) -> AiResult<AssistantResponse> {
        let client = &self.assistant;
        tracing::info!("Calling AI assistant service");

        let body = AssistantRequest {
            question,
            language,
            context,
        };
        let sent = client.http_client.post(client.url()).json(&body).send().await;
        let result = client.read_json(sent).await?;

        tracing::info!("Assistant response generated");
        Ok(result)
    }
}
