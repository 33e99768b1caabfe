use std::collections::BTreeMap;

use super::domain::{FieldValue, TableCode, TableRecord};

#[derive(Debug, Clone, Default)]
struct TableState {
    rows: Vec<TableRecord>,
    candidates: Vec<TableRecord>,
    /// Last suffix handed out by `issue_keys`; never reused within a session.
    last_key: u32,
}

impl TableState {
    fn holds_key(&self, key: &str) -> bool {
        self.rows
            .iter()
            .chain(self.candidates.iter())
            .any(|record| record.key == key)
    }

    fn fresh_key(&mut self, code: &TableCode) -> String {
        loop {
            self.last_key += 1;
            let key = format!("{code}-{}", self.last_key);
            if !self.holds_key(&key) {
                return key;
            }
        }
    }
}

/// Rows being edited in the current session, keyed by table code.
///
/// Single-writer and process-local; persistence happens through the scoring service.
#[derive(Debug, Clone, Default)]
pub struct TableDataStore {
    tables: BTreeMap<TableCode, TableState>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("row '{key}' not found in table {code}")]
    RowNotFound { code: TableCode, key: String },
    #[error("row '{key}' exists both as a saved row and as a candidate in table {code}")]
    AmbiguousRow { code: TableCode, key: String },
}

impl TableDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_rows(&self, code: &TableCode) -> Vec<TableRecord> {
        self.tables
            .get(code)
            .map(|state| state.rows.clone())
            .unwrap_or_default()
    }

    pub fn set_rows(&mut self, code: &TableCode, rows: Vec<TableRecord>) {
        self.tables.entry(code.clone()).or_default().rows = rows;
    }

    pub fn candidates(&self, code: &TableCode) -> Vec<TableRecord> {
        self.tables
            .get(code)
            .map(|state| state.candidates.clone())
            .unwrap_or_default()
    }

    /// Replaces the pool of parsed-but-unconfirmed rows.
    pub fn set_candidates(&mut self, code: &TableCode, rows: Vec<TableRecord>) {
        self.tables.entry(code.clone()).or_default().candidates = rows;
    }

    /// Rewrites the keys of freshly parsed records as `{code}-{n}`, skipping every key the
    /// table already holds in either pool.
    pub fn issue_keys(&mut self, code: &TableCode, records: &mut [TableRecord]) {
        let state = self.tables.entry(code.clone()).or_default();
        for record in records.iter_mut() {
            record.key = state.fresh_key(code);
        }
    }

    /// No validation happens here; plugins validate at save time.
    pub fn update_field(
        &mut self,
        code: &TableCode,
        row_key: &str,
        field: &str,
        value: FieldValue,
    ) -> Result<(), StoreError> {
        let record = self.find_mut(code, row_key)?;
        record.set_field(field, value);
        Ok(())
    }

    /// Flips `selected` and returns the new value.
    pub fn toggle_selection(&mut self, code: &TableCode, row_key: &str) -> Result<bool, StoreError> {
        let record = self.find_mut(code, row_key)?;
        record.selected = !record.selected;
        Ok(record.selected)
    }

    /// Moves selected candidates into the scored row set, returning how many moved.
    ///
    /// A candidate whose key is already taken by a saved row is moved under a fresh key.
    pub fn promote_selected(&mut self, code: &TableCode) -> usize {
        let Some(state) = self.tables.get_mut(code) else {
            return 0;
        };

        let (promoted, remaining): (Vec<_>, Vec<_>) = state
            .candidates
            .drain(..)
            .partition(|record| record.selected);
        state.candidates = remaining;

        let moved = promoted.len();
        for mut record in promoted {
            if state.rows.iter().any(|row| row.key == record.key) {
                record.key = state.fresh_key(code);
            }
            state.rows.push(record);
        }
        moved
    }

    /// Drops the table's rows and candidates from the session.
    pub fn clear(&mut self, code: &TableCode) {
        self.tables.remove(code);
    }

    fn find_mut(&mut self, code: &TableCode, row_key: &str) -> Result<&mut TableRecord, StoreError> {
        let not_found = || StoreError::RowNotFound {
            code: code.clone(),
            key: row_key.to_string(),
        };
        let state = self.tables.get_mut(code).ok_or_else(not_found)?;

        let in_rows = state.rows.iter().position(|record| record.key == row_key);
        let in_candidates = state
            .candidates
            .iter()
            .position(|record| record.key == row_key);
        match (in_rows, in_candidates) {
            (Some(_), Some(_)) => Err(StoreError::AmbiguousRow {
                code: code.clone(),
                key: row_key.to_string(),
            }),
            (Some(index), None) => Ok(&mut state.rows[index]),
            (None, Some(index)) => Ok(&mut state.candidates[index]),
            (None, None) => Err(not_found()),
        }
    }
}
