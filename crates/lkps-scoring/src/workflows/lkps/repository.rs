use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ScoreDetail, ScoreOutcome, TableCode, TableRecord};
use super::resolver::{ResolverError, ScoreDetailResolver};

/// Last saved state of one table: its rows and, for registered tables, the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTable {
    pub code: TableCode,
    pub rows: Vec<TableRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ScoreOutcome>,
    pub saved_at: DateTime<Utc>,
}

/// Storage abstraction so the scoring service can be exercised in isolation.
pub trait ScoreRepository: Send + Sync {
    /// Replaces whatever was stored for the table.
    fn save(&self, table: SavedTable) -> Result<(), RepositoryError>;
    fn fetch(&self, code: &TableCode) -> Result<Option<SavedTable>, RepositoryError>;
    fn scored_codes(&self) -> Result<Vec<TableCode>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Serves persisted score details to plugins through the resolver port.
pub struct PersistedScores<R> {
    repository: Arc<R>,
}

impl<R> PersistedScores<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> ScoreDetailResolver for PersistedScores<R>
where
    R: ScoreRepository,
{
    fn fetch_score_detail(&self, code: &TableCode) -> Result<Option<ScoreDetail>, ResolverError> {
        let saved = self
            .repository
            .fetch(code)
            .map_err(|err| ResolverError::Unavailable(err.to_string()))?;
        Ok(saved
            .and_then(|table| table.outcome)
            .map(|outcome| outcome.score_detail))
    }
}
