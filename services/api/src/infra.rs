use lkps_scoring::workflows::lkps::{RepositoryError, SavedTable, ScoreRepository, TableCode};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local score store; contents are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryScoreRepository {
    tables: Arc<Mutex<BTreeMap<TableCode, SavedTable>>>,
}

impl ScoreRepository for InMemoryScoreRepository {
    fn save(&self, table: SavedTable) -> Result<(), RepositoryError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        guard.insert(table.code.clone(), table);
        Ok(())
    }

    fn fetch(&self, code: &TableCode) -> Result<Option<SavedTable>, RepositoryError> {
        let guard = self
            .tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard.get(code).cloned())
    }

    fn scored_codes(&self) -> Result<Vec<TableCode>, RepositoryError> {
        let guard = self
            .tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|table| table.outcome.is_some())
            .map(|table| table.code.clone())
            .collect())
    }
}

/// One `CODE=PATH` argument of the `score` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableInput {
    pub(crate) code: TableCode,
    pub(crate) path: PathBuf,
}

pub(crate) fn parse_table_input(raw: &str) -> Result<TableInput, String> {
    let (code, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=PATH, got '{raw}'"))?;
    let code = TableCode::new(code);
    if code.as_str().is_empty() || path.trim().is_empty() {
        return Err(format!("expected CODE=PATH, got '{raw}'"));
    }
    Ok(TableInput {
        code,
        path: PathBuf::from(path.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lkps_scoring::workflows::lkps::{ScoreDetail, ScoreOutcome};

    #[test]
    fn parse_table_input_splits_code_and_path() {
        let input = parse_table_input(" 3b2 =data/penelitian.csv").expect("valid input");
        assert_eq!(input.code, TableCode::new("3b2"));
        assert_eq!(input.path, PathBuf::from("data/penelitian.csv"));

        assert!(parse_table_input("3b2").is_err());
        assert!(parse_table_input("=x.csv").is_err());
    }

    #[test]
    fn scored_codes_skip_raw_tables() {
        let repository = InMemoryScoreRepository::default();
        let scored = ScoreOutcome::single(15, 0.0, ScoreDetail::new());
        for (code, outcome) in [("3a1", Some(scored)), ("9z", None)] {
            repository
                .save(SavedTable {
                    code: TableCode::new(code),
                    rows: Vec::new(),
                    outcome,
                    saved_at: Utc::now(),
                })
                .expect("save succeeds");
        }

        assert_eq!(
            repository.scored_codes().expect("codes"),
            vec![TableCode::new("3a1")]
        );
    }
}
