use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::config::ScoringConfig;
use super::domain::{FieldValue, ScoreDetail, ScoreOutcome, TableCode, TableRecord};
use super::plugin::{ScoreContext, TablePlugin};
use super::registry::{PluginRegistry, PluginSummary};
use super::repository::{PersistedScores, RepositoryError, SavedTable, ScoreRepository};
use super::resolver::{CachingResolver, ResolverError, ScoreDetailResolver};
use super::store::{StoreError, TableDataStore};
use crate::workflows::spreadsheet::{SpreadsheetImportError, SpreadsheetImporter};

/// Service composing the plugin registry, the editing workspace, and persisted scores.
pub struct LkpsScoringService<R> {
    registry: Arc<PluginRegistry>,
    repository: Arc<R>,
    resolver: CachingResolver,
    workspace: Mutex<TableDataStore>,
    config: ScoringConfig,
}

/// Advisory validation messages for one row. Never blocks a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub row_key: String,
    pub sequence: u32,
    pub messages: Vec<String>,
}

/// Result of saving one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReport {
    pub code: TableCode,
    pub rows: usize,
    pub validation: Vec<ValidationIssue>,
    /// `None` for tables without a registered plugin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ScoreOutcome>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub code: TableCode,
    pub imported: usize,
    pub skipped: usize,
    pub into_candidates: bool,
}

impl<R> LkpsScoringService<R>
where
    R: ScoreRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ScoringConfig) -> Self {
        Self::with_registry(PluginRegistry::standard(), repository, config)
    }

    pub fn with_registry(registry: PluginRegistry, repository: Arc<R>, config: ScoringConfig) -> Self {
        let persisted: Arc<dyn ScoreDetailResolver> =
            Arc::new(PersistedScores::new(Arc::clone(&repository)));

        Self {
            registry: Arc::new(registry),
            repository,
            resolver: CachingResolver::new(persisted),
            workspace: Mutex::new(TableDataStore::new()),
            config,
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn plugins(&self) -> Vec<PluginSummary> {
        self.registry.summaries()
    }

    /// Rows currently being edited, restored from the last save when the workspace has
    /// none for this table.
    pub fn load(&self, code: &TableCode) -> Result<Vec<TableRecord>, ScoringServiceError> {
        let rows = self.workspace().get_rows(code);
        if !rows.is_empty() {
            return Ok(rows);
        }

        let Some(saved) = self.repository.fetch(code)? else {
            return Ok(Vec::new());
        };
        self.workspace().set_rows(code, saved.rows.clone());
        Ok(saved.rows)
    }

    pub fn candidates(&self, code: &TableCode) -> Vec<TableRecord> {
        self.workspace().candidates(code)
    }

    pub fn replace_rows(&self, code: &TableCode, rows: Vec<TableRecord>) {
        self.workspace().set_rows(code, rows);
    }

    pub fn update_field(
        &self,
        code: &TableCode,
        row_key: &str,
        field: &str,
        value: FieldValue,
    ) -> Result<(), ScoringServiceError> {
        self.workspace().update_field(code, row_key, field, value)?;
        Ok(())
    }

    pub fn toggle_selection(&self, code: &TableCode, row_key: &str) -> Result<bool, ScoringServiceError> {
        Ok(self.workspace().toggle_selection(code, row_key)?)
    }

    /// Forgets the unsaved rows and candidates of `code`. Persisted scores stay.
    pub fn discard(&self, code: &TableCode) {
        self.workspace().clear(code);
        info!(table = %code, "workspace discarded");
    }

    /// Parses an uploaded sheet into the workspace. Selection tables fill the candidate
    /// pool; every other table has its row set replaced.
    pub fn import<Rd: Read>(
        &self,
        code: &TableCode,
        reader: Rd,
    ) -> Result<ImportSummary, ScoringServiceError> {
        let plugin = self.registry.resolve(code.as_str());
        let mut sheet = SpreadsheetImporter::from_reader(reader, code, plugin.as_deref())?;

        let summary = ImportSummary {
            code: code.clone(),
            imported: sheet.records.len(),
            skipped: sheet.skipped,
            into_candidates: sheet.into_candidates,
        };

        if sheet.into_candidates {
            // saved rows must be in the workspace so the next save keeps them
            self.load(code)?;
        }

        let mut workspace = self.workspace();
        workspace.issue_keys(code, &mut sheet.records);
        if sheet.into_candidates {
            workspace.set_candidates(code, sheet.records);
        } else {
            workspace.set_rows(code, sheet.records);
        }
        drop(workspace);

        info!(
            table = %code,
            imported = summary.imported,
            skipped = summary.skipped,
            candidates = summary.into_candidates,
            "spreadsheet imported"
        );
        Ok(summary)
    }

    /// Confirms selected candidates, then saves the workspace rows of `code`.
    pub fn save(&self, code: &TableCode) -> Result<SaveReport, ScoringServiceError> {
        let rows = {
            let mut workspace = self.workspace();
            workspace.promote_selected(code);
            workspace.get_rows(code)
        };
        self.save_records(code, rows)
    }

    /// Normalizes, validates, scores and persists `records` as the new state of `code`.
    pub fn save_records(
        &self,
        code: &TableCode,
        records: Vec<TableRecord>,
    ) -> Result<SaveReport, ScoringServiceError> {
        let saved_at = Utc::now();

        let Some(plugin) = self.registry.resolve(code.as_str()) else {
            let warning = format!("no plugin registered for table {code}; rows stored without a score");
            warn!(table = %code, rows = records.len(), "saving unregistered table without scoring");
            let rows = records.len();
            self.persist(code, records, None, saved_at)?;
            return Ok(SaveReport {
                code: code.clone(),
                rows,
                validation: Vec::new(),
                outcome: None,
                warnings: vec![warning],
            });
        };

        let records = plugin.normalize_data(records);
        let records = plugin.prepare_data_for_saving(records, saved_at);
        let validation = validation_issues(plugin.as_ref(), &records);
        let outcome = self.score(plugin.as_ref(), code, &records);

        for entry in &outcome.scores {
            info!(table = %code, butir = entry.butir, nilai = entry.nilai, "table scored");
        }
        for warning in &outcome.warnings {
            warn!(table = %code, %warning, "scoring degraded");
        }

        let rows = records.len();
        self.persist(code, records, Some(outcome.clone()), saved_at)?;

        Ok(SaveReport {
            code: code.clone(),
            rows,
            validation,
            warnings: outcome.warnings.clone(),
            outcome: Some(outcome),
        })
    }

    /// Scores `records` without persisting anything.
    pub fn preview(&self, code: &TableCode, records: Vec<TableRecord>) -> Option<ScoreOutcome> {
        let plugin = self.registry.resolve(code.as_str())?;
        let records = plugin.normalize_data(records);
        Some(self.score(plugin.as_ref(), code, &records))
    }

    /// Last persisted score detail of `code`, served through the cache.
    pub fn score_detail(&self, code: &TableCode) -> Result<Option<ScoreDetail>, ScoringServiceError> {
        Ok(self.resolver.fetch_score_detail(code)?)
    }

    /// Tables with a persisted score, in repository order.
    pub fn scored_tables(&self) -> Result<Vec<TableCode>, ScoringServiceError> {
        Ok(self.repository.scored_codes()?)
    }

    pub fn saved(&self, code: &TableCode) -> Result<Option<SavedTable>, ScoringServiceError> {
        Ok(self.repository.fetch(code)?)
    }

    fn score(&self, plugin: &dyn TablePlugin, code: &TableCode, records: &[TableRecord]) -> ScoreOutcome {
        let ctx = ScoreContext::new(&self.resolver);
        plugin.calculate_score(code, records, &self.config, &ctx)
    }

    fn persist(
        &self,
        code: &TableCode,
        rows: Vec<TableRecord>,
        outcome: Option<ScoreOutcome>,
        saved_at: chrono::DateTime<Utc>,
    ) -> Result<(), ScoringServiceError> {
        self.repository.save(SavedTable {
            code: code.clone(),
            rows: rows.clone(),
            outcome,
            saved_at,
        })?;
        self.resolver.invalidate(code);
        self.workspace().set_rows(code, rows);
        Ok(())
    }

    fn workspace(&self) -> MutexGuard<'_, TableDataStore> {
        self.workspace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn validation_issues(plugin: &dyn TablePlugin, records: &[TableRecord]) -> Vec<ValidationIssue> {
    records
        .iter()
        .filter_map(|record| {
            let messages = plugin.validate(record);
            (!messages.is_empty()).then(|| ValidationIssue {
                row_key: record.key.clone(),
                sequence: record.sequence,
                messages,
            })
        })
        .collect()
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    #[error(transparent)]
    Import(#[from] SpreadsheetImportError),
}
