//! Crop disease diagnosis service

use std::{path::PathBuf, sync::Arc};

use shared::{
    validate_confidence, validate_label, AiModelMetadata, Diagnosis, DiagnosisFilter,
    DiagnosisStatistics, DiagnosisStatus, ImageReference, Language, NewDiagnosis, ValidationIssue,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ai_service::{DiseaseDetectionRequest, DiseaseDetectionResponse};
use crate::external::{AiEndpoint, AiServiceClient, ServiceUnavailable};
use crate::repository::DiagnosisRepository;

/// Diagnosis service: detection through the AI service, then persistence
///
/// There is no offline fallback here. When detection fails nothing is stored.
#[derive(Clone)]
pub struct DiagnosisService {
    repository: Arc<dyn DiagnosisRepository>,
    ai_client: AiServiceClient,
}

/// Crop details submitted with an image
#[derive(Debug, Clone)]
pub struct CreateDiagnosisInput {
    pub crop_type: String,
    pub crop_age_days: i32,
    pub region: String,
    pub symptoms: Vec<String>,
    pub language: Language,
}

/// An image already written to storage
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub reference: ImageReference,
    pub content_type: String,
}

impl DiagnosisService {
    /// Create a new DiagnosisService instance
    pub fn new(repository: Arc<dyn DiagnosisRepository>, ai_client: AiServiceClient) -> Self {
        Self {
            repository,
            ai_client,
        }
    }

    /// Run disease detection on an uploaded image and store the verdict
    pub async fn create_diagnosis(
        &self,
        input: CreateDiagnosisInput,
        image: UploadedImage,
        user_id: &str,
    ) -> AppResult<Diagnosis> {
        tracing::info!("Creating diagnosis for user {}", user_id);
        Self::validate_input(&input)?;

        let request = DiseaseDetectionRequest {
            image_path: PathBuf::from(&image.reference.path),
            content_type: image.content_type,
            crop_type: input.crop_type.clone(),
            crop_age_days: input.crop_age_days,
            region: input.region.clone(),
            symptoms: input.symptoms.clone(),
            language: input.language.code().to_string(),
        };

        let detection = self.ai_client.detect_disease(&request).await?;

        if let Err(issue) = validate_confidence(detection.confidence) {
            tracing::error!("Disease detection returned invalid confidence: {}", issue);
            return Err(ServiceUnavailable::new(
                AiEndpoint::DiseaseDetection,
                format!("invalid confidence {}", detection.confidence),
            )
            .into());
        }

        let diagnosis = self
            .repository
            .insert(build_diagnosis(input, image.reference, user_id, detection))
            .await?;

        tracing::info!(
            "Diagnosis {} created: {} ({:.2})",
            diagnosis.id,
            diagnosis.disease_name,
            diagnosis.confidence
        );
        Ok(diagnosis)
    }

    /// A user's diagnoses, newest first
    pub async fn get_user_diagnoses(
        &self,
        user_id: &str,
        filter: DiagnosisFilter,
    ) -> AppResult<Vec<Diagnosis>> {
        self.repository.list_for_user(user_id, &filter).await
    }

    /// Get a diagnosis by ID
    pub async fn get_diagnosis_by_id(&self, id: Uuid) -> AppResult<Diagnosis> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Diagnosis".to_string()))
    }

    /// Statistics over one user's diagnoses
    pub async fn get_statistics(&self, user_id: &str) -> AppResult<DiagnosisStatistics> {
        self.repository.statistics(user_id).await
    }

    /// Check crop details before anything is stored
    pub fn validate_input(input: &CreateDiagnosisInput) -> AppResult<()> {
        validate_label("crop_type", &input.crop_type)?;
        validate_label("region", &input.region)?;
        shared::validate_crop_age_days(i64::from(input.crop_age_days))?;
        if input.symptoms.iter().all(|s| s.trim().is_empty()) {
            return Err(ValidationIssue::new(
                "symptoms",
                "at least one symptom is required",
                "au moins un symptôme est requis",
            )
            .into());
        }
        Ok(())
    }
}

/// Completed diagnosis with every AI field copied verbatim
fn build_diagnosis(
    input: CreateDiagnosisInput,
    image: ImageReference,
    user_id: &str,
    detection: DiseaseDetectionResponse,
) -> NewDiagnosis {
    NewDiagnosis {
        user_id: user_id.to_string(),
        crop_type: input.crop_type,
        crop_age_days: input.crop_age_days,
        region: input.region,
        symptoms: input.symptoms,
        image,
        disease_name: detection.disease_name,
        disease_name_local: detection.disease_name_local,
        confidence: detection.confidence,
        severity: detection.severity,
        description: detection.description,
        recommendations: detection
            .recommendations
            .into_iter()
            .map(Into::into)
            .collect(),
        language: input.language,
        ai_model_metadata: AiModelMetadata {
            model_version: detection.model_version,
            processing_time: detection.processing_time,
            alternative_diseases: detection
                .alternative_diseases
                .map(|alternatives| alternatives.into_iter().map(Into::into).collect()),
        },
        status: DiagnosisStatus::Completed,
    }
}
