//! Diagnosis persistence
//!
//! Services depend on [`DiagnosisRepository`] only; the PostgreSQL and
//! in-memory stores are interchangeable behind it.

use async_trait::async_trait;
use serde::Serialize;
use shared::{Diagnosis, DiagnosisFilter, DiagnosisStatistics, NewDiagnosis};
use uuid::Uuid;

use crate::error::AppResult;

mod memory;
mod postgres;

pub use memory::InMemoryDiagnosisRepository;
pub use postgres::PgDiagnosisRepository;

/// Reachability of the diagnosis store, as reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageStatus {
    Connected,
    Disconnected,
    InMemory,
}

/// Repository for diagnosis records
///
/// Records are written once and never deleted through this interface.
#[async_trait]
pub trait DiagnosisRepository: Send + Sync {
    /// Persist a diagnosis; the store assigns its id and timestamps.
    async fn insert(&self, diagnosis: NewDiagnosis) -> AppResult<Diagnosis>;

    /// One page of a user's diagnoses, newest first.
    async fn list_for_user(
        &self,
        user_id: &str,
        filter: &DiagnosisFilter,
    ) -> AppResult<Vec<Diagnosis>>;

    /// Look up a diagnosis by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Diagnosis>>;

    /// Aggregate statistics over all of a user's diagnoses.
    async fn statistics(&self, user_id: &str) -> AppResult<DiagnosisStatistics>;

    async fn status(&self) -> StorageStatus;
}
