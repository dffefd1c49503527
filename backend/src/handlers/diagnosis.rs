//! HTTP handlers for crop disease diagnosis endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use shared::{
    parse_crop_age_days, parse_language, parse_symptoms, validate_history_window,
    validate_image_upload, Diagnosis, DiagnosisFilter, DiagnosisStatistics, ValidationIssue,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{CreateDiagnosisInput, DiagnosisService, UploadedImage};
use crate::AppState;

/// Query parameters for diagnosis history
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub crop_type: Option<String>,
    pub region: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl HistoryQuery {
    fn into_filter(self) -> AppResult<DiagnosisFilter> {
        let (limit, offset) = validate_history_window(self.limit, self.offset)?;
        Ok(DiagnosisFilter {
            crop_type: self.crop_type.filter(|c| !c.trim().is_empty()),
            region: self.region.filter(|r| !r.trim().is_empty()),
            limit,
            offset,
        })
    }
}

/// Raw multipart fields of a diagnosis request
#[derive(Default)]
struct DiagnosisForm {
    image: Option<ImagePart>,
    crop_type: Option<String>,
    crop_age_days: Option<String>,
    region: Option<String>,
    symptoms: Option<String>,
    language: Option<String>,
}

struct ImagePart {
    bytes: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

impl DiagnosisForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = DiagnosisForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.image = Some(ImagePart {
                        bytes: bytes.to_vec(),
                        file_name,
                        content_type,
                    });
                }
                "crop_type" | "crop_age_days" | "region" | "symptoms" | "language" => {
                    let value = field.text().await.map_err(multipart_error)?;
                    let slot = match name.as_str() {
                        "crop_type" => &mut form.crop_type,
                        "crop_age_days" => &mut form.crop_age_days,
                        "region" => &mut form.region,
                        "symptoms" => &mut form.symptoms,
                        _ => &mut form.language,
                    };
                    *slot = Some(value);
                }
                other => tracing::debug!("Ignoring unknown multipart field {}", other),
            }
        }

        Ok(form)
    }

    fn into_input(self) -> AppResult<(CreateDiagnosisInput, ImagePart)> {
        let image = self
            .image
            .ok_or_else(|| ValidationIssue::new("image", "image is required", "image requise"))?;

        let input = CreateDiagnosisInput {
            crop_type: required("crop_type", self.crop_type)?,
            crop_age_days: parse_crop_age_days(&required("crop_age_days", self.crop_age_days)?)?,
            region: required("region", self.region)?,
            symptoms: parse_symptoms(&required("symptoms", self.symptoms)?)?,
            language: parse_language(self.language.as_deref())?,
        };

        Ok((input, image))
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationIssue> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationIssue::new(field, "is required", "est requis"))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::ValidationError(e.body_text())
}

/// Diagnose a crop disease from an uploaded image
pub async fn create_diagnosis(
    State(state): State<AppState>,
    current_user: CurrentUser,
    WithRejection(multipart, _): WithRejection<Multipart, AppError>,
) -> AppResult<(StatusCode, Json<Diagnosis>)> {
    let (input, image) = DiagnosisForm::read(multipart).await?.into_input()?;
    DiagnosisService::validate_input(&input)?;

    let uploads = &state.config.uploads;
    validate_image_upload(
        image.content_type.as_deref(),
        image.bytes.len(),
        &uploads.allowed_types(),
        uploads.max_file_size,
    )?;

    let content_type = image.content_type.unwrap_or_default();
    let reference = state
        .images
        .save(&image.bytes, image.file_name.as_deref(), &content_type)
        .await?;

    let service = DiagnosisService::new(state.repository, state.ai_client);
    let diagnosis = service
        .create_diagnosis(
            input,
            UploadedImage {
                reference,
                content_type,
            },
            &current_user.0,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(diagnosis)))
}

/// List the caller's diagnoses
pub async fn get_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, AppError>,
) -> AppResult<Json<Vec<Diagnosis>>> {
    let filter = query.into_filter()?;
    let service = DiagnosisService::new(state.repository, state.ai_client);
    let diagnoses = service.get_user_diagnoses(&current_user.0, filter).await?;
    Ok(Json(diagnoses))
}

/// Get a diagnosis by ID
pub async fn get_diagnosis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Diagnosis>> {
    // An id that is not a UUID cannot name a stored diagnosis
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Diagnosis".to_string()))?;

    let service = DiagnosisService::new(state.repository, state.ai_client);
    let diagnosis = service.get_diagnosis_by_id(id).await?;
    Ok(Json(diagnosis))
}

/// Get statistics over the caller's diagnoses
pub async fn get_statistics(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DiagnosisStatistics>> {
    let service = DiagnosisService::new(state.repository, state.ai_client);
    let statistics = service.get_statistics(&current_user.0).await?;
    Ok(Json(statistics))
}
