use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    AiModelMetadata, Diagnosis, DiagnosisFilter, DiagnosisStatistics, DiagnosisStatus,
    FrequencyBucket, ImageReference, Language, NewDiagnosis, Recommendation, Severity,
    TOP_DISEASES_LIMIT,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{DiagnosisRepository, StorageStatus};
use crate::error::{AppError, AppResult};

const DIAGNOSIS_COLUMNS: &str = r#"
    id, user_id, crop_type, crop_age_days, region, symptoms, image_url, image_path,
    disease_name, disease_name_local, confidence, severity, description,
    recommendations, language, ai_model_metadata, status, created_at, updated_at
"#;

/// A user's diagnoses, newest first; id breaks timestamp ties so pages never overlap
fn history_query() -> String {
    format!(
        r#"
        SELECT {DIAGNOSIS_COLUMNS}
        FROM diagnoses
        WHERE user_id = $1
          AND ($2::text IS NULL OR crop_type = $2)
          AND ($3::text IS NULL OR region = $3)
        ORDER BY created_at DESC, id DESC
        LIMIT $4 OFFSET $5
        "#
    )
}

/// PostgreSQL diagnosis store
#[derive(Clone)]
pub struct PgDiagnosisRepository {
    db: PgPool,
}

/// Database row for a diagnosis
#[derive(Debug, sqlx::FromRow)]
struct DiagnosisRow {
    id: Uuid,
    user_id: String,
    crop_type: String,
    crop_age_days: i32,
    region: String,
    symptoms: Vec<String>,
    image_url: String,
    image_path: String,
    disease_name: String,
    disease_name_local: Option<String>,
    confidence: f64,
    severity: String,
    description: String,
    recommendations: serde_json::Value,
    language: String,
    ai_model_metadata: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DiagnosisRow> for Diagnosis {
    fn from(row: DiagnosisRow) -> Self {
        let recommendations: Vec<Recommendation> =
            serde_json::from_value(row.recommendations).unwrap_or_default();

        let ai_model_metadata: AiModelMetadata =
            serde_json::from_value(row.ai_model_metadata).unwrap_or_default();

        Diagnosis {
            id: row.id,
            user_id: row.user_id,
            crop_type: row.crop_type,
            crop_age_days: row.crop_age_days,
            region: row.region,
            symptoms: row.symptoms,
            image: ImageReference::new(row.image_url, row.image_path),
            disease_name: row.disease_name,
            disease_name_local: row.disease_name_local,
            confidence: row.confidence,
            severity: row.severity.parse().unwrap_or(Severity::Medium),
            description: row.description,
            recommendations,
            language: Language::from_code(&row.language).unwrap_or_default(),
            ai_model_metadata,
            status: row.status.parse().unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgDiagnosisRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn distribution(
        &self,
        column: &str,
        user_id: &str,
        limit: Option<i64>,
    ) -> AppResult<Vec<FrequencyBucket>> {
        let query = format!(
            r#"
            SELECT {column} AS name, COUNT(*) AS count
            FROM diagnoses
            WHERE user_id = $1
            GROUP BY {column}
            ORDER BY count DESC, {column} ASC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, (String, i64)>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| FrequencyBucket { name, count })
            .collect())
    }
}

#[async_trait]
impl DiagnosisRepository for PgDiagnosisRepository {
    async fn insert(&self, diagnosis: NewDiagnosis) -> AppResult<Diagnosis> {
        let recommendations_json = serde_json::to_value(&diagnosis.recommendations)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let metadata_json = serde_json::to_value(&diagnosis.ai_model_metadata)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let query = format!(
            r#"
            INSERT INTO diagnoses (
                id, user_id, crop_type, crop_age_days, region, symptoms,
                image_url, image_path, disease_name, disease_name_local,
                confidence, severity, description, recommendations,
                language, ai_model_metadata, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {DIAGNOSIS_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, DiagnosisRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&diagnosis.user_id)
            .bind(&diagnosis.crop_type)
            .bind(diagnosis.crop_age_days)
            .bind(&diagnosis.region)
            .bind(&diagnosis.symptoms)
            .bind(&diagnosis.image.url)
            .bind(&diagnosis.image.path)
            .bind(&diagnosis.disease_name)
            .bind(&diagnosis.disease_name_local)
            .bind(diagnosis.confidence)
            .bind(diagnosis.severity.as_str())
            .bind(&diagnosis.description)
            .bind(&recommendations_json)
            .bind(diagnosis.language.code())
            .bind(&metadata_json)
            .bind(diagnosis.status.as_str())
            .fetch_one(&self.db)
            .await?;

        Ok(row.into())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &DiagnosisFilter,
    ) -> AppResult<Vec<Diagnosis>> {
        let rows = sqlx::query_as::<_, DiagnosisRow>(&history_query())
            .bind(user_id)
            .bind(&filter.crop_type)
            .bind(&filter.region)
            .bind(i64::from(filter.limit))
            .bind(i64::from(filter.offset))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Diagnosis>> {
        let query = format!("SELECT {DIAGNOSIS_COLUMNS} FROM diagnoses WHERE id = $1");

        let row = sqlx::query_as::<_, DiagnosisRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn statistics(&self, user_id: &str) -> AppResult<DiagnosisStatistics> {
        let (total_diagnoses, average_confidence) = sqlx::query_as::<_, (i64, f64)>(
            r#"
            SELECT COUNT(*), COALESCE(AVG(confidence), 0)::DOUBLE PRECISION
            FROM diagnoses
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        let disease_distribution = self
            .distribution("disease_name", user_id, Some(TOP_DISEASES_LIMIT as i64))
            .await?;
        let crop_distribution = self.distribution("crop_type", user_id, None).await?;

        Ok(DiagnosisStatistics {
            total_diagnoses,
            disease_distribution,
            crop_distribution,
            average_confidence,
        })
    }

    async fn status(&self) -> StorageStatus {
        match sqlx::query("SELECT 1").execute(&self.db).await {
            Ok(_) => StorageStatus::Connected,
            Err(e) => {
                tracing::warn!("Database health check failed: {}", e);
                StorageStatus::Disconnected
            }
        }
    }
}
