use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an LKPS table such as `3a1`, `3b3` or `8f5-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableCode(pub String);

impl TableCode {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self(code.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Semantic type of a column as declared by a table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
    Url,
    Percentage,
}

/// Cell value stored on a record. Blank cells are always `Text("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn blank() -> Self {
        Self::Text(String::new())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::Number(value) => !value.is_finite(),
            FieldValue::Boolean(_) => false,
        }
    }

    /// Textual rendering; whole numbers drop their fractional part.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(value) => Cow::Borrowed(value.trim()),
            FieldValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                Cow::Owned(format!("{}", *value as i64))
            }
            FieldValue::Number(value) => Cow::Owned(value.to_string()),
            FieldValue::Boolean(true) => Cow::Borrowed("V"),
            FieldValue::Boolean(false) => Cow::Borrowed(""),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) if value.is_finite() => Some(*value),
            FieldValue::Number(_) => None,
            FieldValue::Text(value) => parse_number(value),
            FieldValue::Boolean(value) => Some(if *value { 1.0 } else { 0.0 }),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Boolean(value) => *value,
            FieldValue::Number(value) => *value != 0.0,
            FieldValue::Text(value) => is_truthy_text(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Parses spreadsheet numerics, accepting `1.234,5`, `12,5`, `40%` and `1 200`.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.contains('.'), cleaned.contains(',')) {
        (true, true) => cleaned.replace('.', "").replace(',', "."),
        (false, true) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub(crate) fn is_truthy_text(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "v" | "\u{2713}" | "\u{2714}" | "x" | "y" | "ya" | "yes" | "true" | "1" | "ada"
    )
}

fn default_selected() -> bool {
    true
}

/// One evidence row of an LKPS table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub key: String,
    pub sequence: u32,
    #[serde(default = "default_selected")]
    pub selected: bool,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl TableRecord {
    pub fn new(key: impl Into<String>, sequence: u32) -> Self {
        Self {
            key: key.into(),
            sequence,
            selected: true,
            fields: BTreeMap::new(),
            saved_at: None,
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.field(name).map(FieldValue::is_blank).unwrap_or(true)
    }

    pub fn text(&self, name: &str) -> String {
        self.field(name)
            .map(|value| value.as_text().into_owned())
            .unwrap_or_default()
    }

    /// Numeric value of a field, `0.0` when missing or unparseable.
    pub fn number(&self, name: &str) -> f64 {
        self.field(name)
            .and_then(FieldValue::as_number)
            .unwrap_or(0.0)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.field(name).map(FieldValue::is_truthy).unwrap_or(false)
    }
}

/// A single criterion score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub butir: u16,
    pub nilai: f64,
}

/// Named intermediate quantities behind a score. Other tables read these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreDetail(BTreeMap<String, f64>);

impl ScoreDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Value for `key`, zero when the quantity was never recorded.
    pub fn value(&self, key: &str) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

impl<'a> FromIterator<(&'a str, f64)> for ScoreDetail {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }
}

/// Output of one plugin calculation, persisted per table code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub scores: Vec<ScoreEntry>,
    pub score_detail: ScoreDetail,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ScoreOutcome {
    pub fn single(butir: u16, nilai: f64, score_detail: ScoreDetail) -> Self {
        Self {
            scores: vec![ScoreEntry { butir, nilai }],
            score_detail,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn score_for(&self, butir: u16) -> Option<f64> {
        self.scores
            .iter()
            .find(|entry| entry.butir == butir)
            .map(|entry| entry.nilai)
    }
}
