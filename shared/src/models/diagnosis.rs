//! Crop disease diagnosis models

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{FrequencyBucket, ImageReference, Language};

/// Default page size for diagnosis history
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Largest page size a client may request
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Number of diseases reported in the statistics distribution
pub const TOP_DISEASES_LIMIT: usize = 10;

/// Disease impact classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// Lifecycle of a diagnosis record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl DiagnosisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisStatus::Pending => "pending",
            DiagnosisStatus::Completed => "completed",
            DiagnosisStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for DiagnosisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DiagnosisStatus::Pending),
            "completed" => Ok(DiagnosisStatus::Completed),
            "failed" => Ok(DiagnosisStatus::Failed),
            other => Err(format!("unknown diagnosis status: {}", other)),
        }
    }
}

/// Advice attached to a diagnosis
///
/// Owned by its diagnosis; it has no identity of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// treatment, prevention, cultural_practice, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    /// 1 = urgent, 2 = important, 3 = optional
    pub priority: i32,
    /// Shorter wording for text-to-speech
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_text: Option<String>,
}

/// A disease the model considered but ranked lower
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlternativeDisease {
    pub name: String,
    pub confidence: f64,
}

/// Model details copied from the detection response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AiModelMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_diseases: Option<Vec<AlternativeDisease>>,
}

/// Persisted crop disease diagnosis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub id: Uuid,
    pub user_id: String,
    pub crop_type: String,
    pub crop_age_days: i32,
    pub region: String,
    pub symptoms: Vec<String>,
    #[serde(flatten)]
    pub image: ImageReference,
    pub disease_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_name_local: Option<String>,
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    pub recommendations: Vec<Recommendation>,
    pub language: Language,
    pub ai_model_metadata: AiModelMetadata,
    pub status: DiagnosisStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Diagnosis ready to be written; storage assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiagnosis {
    pub user_id: String,
    pub crop_type: String,
    pub crop_age_days: i32,
    pub region: String,
    pub symptoms: Vec<String>,
    pub image: ImageReference,
    pub disease_name: String,
    pub disease_name_local: Option<String>,
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    pub recommendations: Vec<Recommendation>,
    pub language: Language,
    pub ai_model_metadata: AiModelMetadata,
    pub status: DiagnosisStatus,
}

impl NewDiagnosis {
    /// Materialize the record with the given identity and timestamp
    pub fn into_diagnosis(self, id: Uuid, now: DateTime<Utc>) -> Diagnosis {
        Diagnosis {
            id,
            user_id: self.user_id,
            crop_type: self.crop_type,
            crop_age_days: self.crop_age_days,
            region: self.region,
            symptoms: self.symptoms,
            image: self.image,
            disease_name: self.disease_name,
            disease_name_local: self.disease_name_local,
            confidence: self.confidence,
            severity: self.severity,
            description: self.description,
            recommendations: self.recommendations,
            language: self.language,
            ai_model_metadata: self.ai_model_metadata,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// History filter and page window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisFilter {
    pub crop_type: Option<String>,
    pub region: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for DiagnosisFilter {
    fn default() -> Self {
        Self {
            crop_type: None,
            region: None,
            limit: DEFAULT_HISTORY_LIMIT,
            offset: 0,
        }
    }
}

impl DiagnosisFilter {
    pub fn matches(&self, diagnosis: &Diagnosis) -> bool {
        self.crop_type
            .as_deref()
            .map_or(true, |crop| diagnosis.crop_type == crop)
            && self
                .region
                .as_deref()
                .map_or(true, |region| diagnosis.region == region)
    }
}

/// Per-user diagnosis statistics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisStatistics {
    pub total_diagnoses: i64,
    /// Most frequent diseases, at most [`TOP_DISEASES_LIMIT`]
    pub disease_distribution: Vec<FrequencyBucket>,
    pub crop_distribution: Vec<FrequencyBucket>,
    pub average_confidence: f64,
}

impl DiagnosisStatistics {
    /// Aggregate statistics over one user's diagnoses
    pub fn from_diagnoses<'a, I>(diagnoses: I) -> Self
    where
        I: IntoIterator<Item = &'a Diagnosis>,
    {
        let mut total = 0i64;
        let mut confidence_sum = 0.0;
        let mut diseases: HashMap<&str, i64> = HashMap::new();
        let mut crops: HashMap<&str, i64> = HashMap::new();

        for d in diagnoses {
            total += 1;
            confidence_sum += d.confidence;
            *diseases.entry(d.disease_name.as_str()).or_default() += 1;
            *crops.entry(d.crop_type.as_str()).or_default() += 1;
        }

        let mut disease_distribution = sorted_buckets(diseases);
        disease_distribution.truncate(TOP_DISEASES_LIMIT);

        Self {
            total_diagnoses: total,
            disease_distribution,
            crop_distribution: sorted_buckets(crops),
            average_confidence: if total == 0 {
                0.0
            } else {
                confidence_sum / total as f64
            },
        }
    }
}

/// Count descending, then name ascending
fn sorted_buckets(counts: HashMap<&str, i64>) -> Vec<FrequencyBucket> {
    let mut buckets: Vec<FrequencyBucket> = counts
        .into_iter()
        .map(|(name, count)| FrequencyBucket {
            name: name.to_string(),
            count,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    buckets
}
