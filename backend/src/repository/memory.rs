use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shared::{Diagnosis, DiagnosisFilter, DiagnosisStatistics, NewDiagnosis};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DiagnosisRepository, StorageStatus};
use crate::error::AppResult;

/// Process-local diagnosis store, used when no database URL is configured
#[derive(Default, Clone)]
pub struct InMemoryDiagnosisRepository {
    inner: Arc<RwLock<Vec<Diagnosis>>>,
}

impl InMemoryDiagnosisRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl DiagnosisRepository for InMemoryDiagnosisRepository {
    async fn insert(&self, diagnosis: NewDiagnosis) -> AppResult<Diagnosis> {
        let mut guard = self.inner.write().await;
        let mut now = Utc::now();
        // Keep creation times strictly increasing within the store
        if let Some(last) = guard.last() {
            if now <= last.created_at {
                now = last.created_at + chrono::Duration::microseconds(1);
            }
        }
        let record = diagnosis.into_diagnosis(Uuid::new_v4(), now);
        guard.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &DiagnosisFilter,
    ) -> AppResult<Vec<Diagnosis>> {
        let guard = self.inner.read().await;
        let mut matching: Vec<&Diagnosis> = guard
            .iter()
            .filter(|d| d.user_id == user_id && filter.matches(d))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Diagnosis>> {
        let guard = self.inner.read().await;
        Ok(guard.iter().find(|d| d.id == id).cloned())
    }

    async fn statistics(&self, user_id: &str) -> AppResult<DiagnosisStatistics> {
        let guard = self.inner.read().await;
        Ok(DiagnosisStatistics::from_diagnoses(
            guard.iter().filter(|d| d.user_id == user_id),
        ))
    }

    async fn status(&self) -> StorageStatus {
        StorageStatus::InMemory
    }
}
