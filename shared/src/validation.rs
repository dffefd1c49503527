//! Validation utilities for the AgriTech advisory platform
//!
//! Every check reports the offending field with an English and a French message.

use thiserror::Error;

use crate::models::{
    AssistantQuestion, SoilAnalysisInput, DEFAULT_HISTORY_LIMIT, MAX_CONTEXT_CHARS,
    MAX_HISTORY_LIMIT, MAX_QUESTION_CHARS,
};
use crate::types::Language;

/// Longest crop type or region name, in characters
pub const MAX_LABEL_CHARS: usize = 100;

/// Oldest crop accepted for diagnosis, in days
pub const MAX_CROP_AGE_DAYS: i64 = 365;

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
    pub message_fr: String,
}

impl ValidationIssue {
    pub fn new(field: &'static str, message: impl Into<String>, message_fr: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            message_fr: message_fr.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationIssue>;

fn validate_range(field: &'static str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationIssue::new(
            field,
            format!("must be between {} and {}", min, max),
            format!("doit être compris entre {} et {}", min, max),
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationIssue::new(
            field,
            "must be zero or more",
            "doit être positif ou nul",
        ));
    }
    Ok(())
}

fn validate_max_chars(field: &'static str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationIssue::new(
            field,
            format!("must be at most {} characters", max),
            format!("ne doit pas dépasser {} caractères", max),
        ));
    }
    Ok(())
}

/// Validate a required free-text label such as a crop type or region
pub fn validate_label(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationIssue::new(field, "is required", "est requis"));
    }
    validate_max_chars(field, value, MAX_LABEL_CHARS)
}

// ============================================================================
// Soil
// ============================================================================

/// Validate soil measurements
pub fn validate_soil_input(input: &SoilAnalysisInput) -> ValidationResult<()> {
    validate_range("ph", input.ph, 0.0, 14.0)?;
    validate_non_negative("nitrogen", input.nitrogen)?;
    validate_non_negative("phosphorus", input.phosphorus)?;
    validate_non_negative("potassium", input.potassium)?;
    validate_range("temperature", input.temperature, -10.0, 60.0)?;
    validate_range("humidity", input.humidity, 0.0, 100.0)?;
    if input.region.trim().is_empty() {
        return Err(ValidationIssue::new("region", "is required", "est requis"));
    }
    Ok(())
}

// ============================================================================
// Assistant
// ============================================================================

/// Validate a question for the assistant
pub fn validate_assistant_question(input: &AssistantQuestion) -> ValidationResult<()> {
    if input.question.trim().is_empty() {
        return Err(ValidationIssue::new(
            "question",
            "is required",
            "est requise",
        ));
    }
    validate_max_chars("question", &input.question, MAX_QUESTION_CHARS)?;
    if let Some(context) = &input.context {
        validate_max_chars("context", context, MAX_CONTEXT_CHARS)?;
    }
    Ok(())
}

// ============================================================================
// Diagnosis
// ============================================================================

/// Validate crop age, 1 to 365 days
pub fn validate_crop_age_days(days: i64) -> ValidationResult<i32> {
    if !(1..=MAX_CROP_AGE_DAYS).contains(&days) {
        return Err(ValidationIssue::new(
            "crop_age_days",
            format!("must be between 1 and {}", MAX_CROP_AGE_DAYS),
            format!("doit être compris entre 1 et {}", MAX_CROP_AGE_DAYS),
        ));
    }
    Ok(days as i32)
}

/// Parse crop age as sent in a form field
pub fn parse_crop_age_days(raw: &str) -> ValidationResult<i32> {
    let days: i64 = raw.trim().parse().map_err(|_| {
        ValidationIssue::new(
            "crop_age_days",
            "must be a whole number of days",
            "doit être un nombre entier de jours",
        )
    })?;
    validate_crop_age_days(days)
}

/// Split a comma separated symptom list; at least one symptom must remain
pub fn parse_symptoms(raw: &str) -> ValidationResult<Vec<String>> {
    let symptoms: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if symptoms.is_empty() {
        return Err(ValidationIssue::new(
            "symptoms",
            "at least one symptom is required",
            "au moins un symptôme est requis",
        ));
    }
    Ok(symptoms)
}

/// Resolve an optional language code, French when absent
pub fn parse_language(code: Option<&str>) -> ValidationResult<Language> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(Language::default()),
        Some(code) => Language::from_code(code).ok_or_else(|| {
            ValidationIssue::new(
                "language",
                "must be one of fr, wo, ff",
                "doit être fr, wo ou ff",
            )
        }),
    }
}

/// Model confidence must be a probability
pub fn validate_confidence(confidence: f64) -> ValidationResult<()> {
    validate_range("confidence", confidence, 0.0, 1.0)
}

/// Check an uploaded image against the MIME allow-list and size cap
pub fn validate_image_upload(
    content_type: Option<&str>,
    size_bytes: usize,
    allowed_types: &[String],
    max_size_bytes: usize,
) -> ValidationResult<()> {
    if size_bytes == 0 {
        return Err(ValidationIssue::new("image", "image is required", "image requise"));
    }

    let content_type = content_type.unwrap_or_default();
    if !allowed_types.iter().any(|t| t == content_type) {
        return Err(ValidationIssue::new(
            "image",
            format!("file type not allowed. Accepted types: {}", allowed_types.join(", ")),
            format!("type de fichier non autorisé. Types acceptés: {}", allowed_types.join(", ")),
        ));
    }

    if size_bytes > max_size_bytes {
        return Err(ValidationIssue::new(
            "image",
            format!("image must be at most {} bytes", max_size_bytes),
            format!("l'image ne doit pas dépasser {} octets", max_size_bytes),
        ));
    }
    Ok(())
}

/// Resolve the history page window, defaults 20 and 0
pub fn validate_history_window(limit: Option<i64>, offset: Option<i64>) -> ValidationResult<(u32, u32)> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT as i64);
    if !(1..=MAX_HISTORY_LIMIT as i64).contains(&limit) {
        return Err(ValidationIssue::new(
            "limit",
            format!("must be between 1 and {}", MAX_HISTORY_LIMIT),
            format!("doit être compris entre 1 et {}", MAX_HISTORY_LIMIT),
        ));
    }

    let offset = offset.unwrap_or(0);
    if offset < 0 || offset > u32::MAX as i64 {
        return Err(ValidationIssue::new(
            "offset",
            "must be zero or more",
            "doit être positif ou nul",
        ));
    }

    Ok((limit as u32, offset as u32))
}
