use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::lkps::{ScoringServiceError, StoreError};
use crate::workflows::spreadsheet::SpreadsheetImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(SpreadsheetImportError),
    Scoring(ScoringServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Scoring(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(SpreadsheetImportError::Io(_)) => StatusCode::BAD_REQUEST,
            AppError::Import(SpreadsheetImportError::Csv(_))
            | AppError::Scoring(ScoringServiceError::Import(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Scoring(ScoringServiceError::Store(StoreError::RowNotFound { .. })) => {
                StatusCode::NOT_FOUND
            }
            AppError::Scoring(ScoringServiceError::Store(StoreError::AmbiguousRow { .. })) => {
                StatusCode::CONFLICT
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SpreadsheetImportError> for AppError {
    fn from(value: SpreadsheetImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ScoringServiceError> for AppError {
    fn from(value: ScoringServiceError) -> Self {
        Self::Scoring(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::lkps::{RepositoryError, TableCode};

    #[test]
    fn missing_rows_map_to_not_found() {
        let error = AppError::from(ScoringServiceError::from(StoreError::RowNotFound {
            code: TableCode::new("6a"),
            key: "r1".to_string(),
        }));

        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repository_failures_map_to_internal_error() {
        let error = AppError::from(ScoringServiceError::from(RepositoryError::Unavailable(
            "offline".to_string(),
        )));

        assert!(error.to_string().starts_with("scoring error"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
