use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::config::ScoringConfig;
use super::domain::{
    is_truthy_text, parse_number, FieldKind, FieldValue, ScoreDetail, ScoreOutcome, TableCode,
    TableRecord,
};
use super::resolver::ScoreDetailResolver;

/// Column declaration: semantic field name, spreadsheet position and kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub position: usize,
    pub kind: FieldKind,
    /// Counts may not go below zero.
    pub non_negative: bool,
}

impl ColumnSpec {
    pub const fn text(name: &'static str, label: &'static str, position: usize) -> Self {
        Self::of(name, label, position, FieldKind::Text)
    }

    pub const fn count(name: &'static str, label: &'static str, position: usize) -> Self {
        Self {
            non_negative: true,
            ..Self::of(name, label, position, FieldKind::Number)
        }
    }

    pub const fn flag(name: &'static str, label: &'static str, position: usize) -> Self {
        Self::of(name, label, position, FieldKind::Boolean)
    }

    pub const fn of(
        name: &'static str,
        label: &'static str,
        position: usize,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            label,
            position,
            kind,
            non_negative: false,
        }
    }
}

/// Shape of an LKPS table as it appears in the upload template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub title: &'static str,
    pub columns: Vec<ColumnSpec>,
    /// Leading template rows (titles, merged headers) skipped during import.
    pub header_rows: usize,
    /// Uploaded rows go to a candidate pool and are confirmed one by one.
    pub allows_selection: bool,
}

impl TableSchema {
    pub fn new(title: &'static str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            title,
            columns,
            header_rows: 1,
            allows_selection: false,
        }
    }

    pub fn header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    pub fn with_selection(mut self) -> Self {
        self.allows_selection = true;
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// A field that must be non-blank for a record to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationRule {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationRule {
    pub const fn required(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Read access to other tables' persisted score details during a calculation.
pub struct ScoreContext<'a> {
    resolver: &'a dyn ScoreDetailResolver,
}

impl<'a> ScoreContext<'a> {
    pub fn new(resolver: &'a dyn ScoreDetailResolver) -> Self {
        Self { resolver }
    }

    /// Detail of `code`, or `None` when it was never saved or the lookup failed.
    pub fn dependency(&self, code: &str) -> Option<ScoreDetail> {
        let code = TableCode::new(code);
        match self.resolver.fetch_score_detail(&code) {
            Ok(Some(detail)) => Some(detail),
            Ok(None) => {
                warn!(dependency = %code, "dependent table has no saved score detail");
                None
            }
            Err(err) => {
                warn!(dependency = %code, error = %err, "score detail lookup failed");
                None
            }
        }
    }

    /// Like [`ScoreContext::dependency`] for inputs that may legitimately be absent,
    /// such as sibling parts of a table family.
    pub fn optional(&self, code: &str) -> Option<ScoreDetail> {
        let code = TableCode::new(code);
        match self.resolver.fetch_score_detail(&code) {
            Ok(detail) => {
                if detail.is_none() {
                    debug!(dependency = %code, "optional table not saved yet");
                }
                detail
            }
            Err(err) => {
                warn!(dependency = %code, error = %err, "score detail lookup failed");
                None
            }
        }
    }
}

/// Scoring behavior for one LKPS table or one declared family of tables.
pub trait TablePlugin: Send + Sync {
    /// Every table code this plugin serves, matched exactly.
    fn codes(&self) -> &'static [&'static str];

    fn schema(&self) -> &TableSchema;

    fn validation_rules(&self) -> &'static [ValidationRule];

    fn calculate_score(
        &self,
        code: &TableCode,
        records: &[TableRecord],
        config: &ScoringConfig,
        ctx: &ScoreContext<'_>,
    ) -> ScoreOutcome;

    fn title(&self) -> &'static str {
        self.schema().title
    }

    /// Field name to spreadsheet column index, in column order.
    fn field_mapping(&self) -> Vec<(&'static str, usize)> {
        self.schema()
            .columns
            .iter()
            .map(|column| (column.name, column.position))
            .collect()
    }

    /// Advisory messages for a record; empty when it is valid.
    fn validate(&self, record: &TableRecord) -> Vec<String> {
        self.validation_rules()
            .iter()
            .filter(|rule| record.is_blank(rule.field))
            .map(|rule| rule.message.to_string())
            .collect()
    }

    /// Records that take part in scoring: selected and passing every rule.
    fn countable<'r>(&self, records: &'r [TableRecord]) -> Vec<&'r TableRecord> {
        records
            .iter()
            .filter(|record| record.selected && self.validate(record).is_empty())
            .collect()
    }

    fn normalize_data(&self, records: Vec<TableRecord>) -> Vec<TableRecord> {
        let schema = self.schema();
        records
            .into_iter()
            .map(|record| normalize_record(schema, record))
            .collect()
    }

    fn prepare_data_for_saving(
        &self,
        records: Vec<TableRecord>,
        saved_at: DateTime<Utc>,
    ) -> Vec<TableRecord> {
        records
            .into_iter()
            .enumerate()
            .map(|(index, mut record)| {
                record.sequence = index as u32 + 1;
                record.saved_at = Some(saved_at);
                record
            })
            .collect()
    }
}

pub(crate) fn normalize_record(schema: &TableSchema, mut record: TableRecord) -> TableRecord {
    for column in &schema.columns {
        let current = record
            .fields
            .remove(column.name)
            .unwrap_or_else(FieldValue::blank);
        record
            .fields
            .insert(column.name.to_string(), normalize_value(column, current));
    }

    for value in record.fields.values_mut() {
        if let FieldValue::Text(text) = value {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
    }

    record
}

fn normalize_value(column: &ColumnSpec, value: FieldValue) -> FieldValue {
    if value.is_blank() {
        return FieldValue::blank();
    }

    match column.kind {
        FieldKind::Text | FieldKind::Date | FieldKind::Url => {
            FieldValue::Text(value.as_text().into_owned())
        }
        FieldKind::Number | FieldKind::Percentage => {
            let number = match &value {
                FieldValue::Number(number) => *number,
                FieldValue::Text(text) => parse_number(text).unwrap_or(0.0),
                FieldValue::Boolean(flag) => f64::from(u8::from(*flag)),
            };
            if column.non_negative {
                FieldValue::Number(number.max(0.0))
            } else {
                FieldValue::Number(number)
            }
        }
        FieldKind::Boolean => match &value {
            FieldValue::Text(text) => FieldValue::Boolean(is_truthy_text(text)),
            other => FieldValue::Boolean(other.is_truthy()),
        },
    }
}
