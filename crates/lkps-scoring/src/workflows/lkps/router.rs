use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{FieldValue, TableCode, TableRecord};
use super::repository::ScoreRepository;
use super::service::{LkpsScoringService, ScoringServiceError};
use super::store::StoreError;
use crate::workflows::spreadsheet::SpreadsheetImportError;

/// Body of a single-field edit.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: FieldValue,
}

/// Router builder exposing the table editing and scoring endpoints.
pub fn lkps_router<R>(service: Arc<LkpsScoringService<R>>) -> Router
where
    R: ScoreRepository + 'static,
{
    Router::new()
        .route("/api/v1/lkps/plugins", get(plugins_handler::<R>))
        .route("/api/v1/lkps/tables", get(scored_tables_handler::<R>))
        .route(
            "/api/v1/lkps/tables/:code/rows",
            get(rows_handler::<R>)
                .put(replace_rows_handler::<R>)
                .delete(discard_handler::<R>),
        )
        .route(
            "/api/v1/lkps/tables/:code/rows/:row_key",
            patch(update_field_handler::<R>),
        )
        .route(
            "/api/v1/lkps/tables/:code/rows/:row_key/toggle",
            post(toggle_handler::<R>),
        )
        .route("/api/v1/lkps/tables/:code/import", post(import_handler::<R>))
        .route("/api/v1/lkps/tables/:code/save", post(save_handler::<R>))
        .route(
            "/api/v1/lkps/tables/:code/preview",
            post(preview_handler::<R>),
        )
        .route(
            "/api/v1/lkps/tables/:code/score-detail",
            get(score_detail_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn plugins_handler<R>(State(service): State<Arc<LkpsScoringService<R>>>) -> Response
where
    R: ScoreRepository + 'static,
{
    (StatusCode::OK, Json(service.plugins())).into_response()
}

pub(crate) async fn scored_tables_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    match service.scored_tables() {
        Ok(codes) => (StatusCode::OK, Json(json!({ "scored": codes }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rows_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.load(&code) {
        Ok(rows) => {
            let payload = json!({
                "code": code,
                "rows": rows,
                "candidates": service.candidates(&code),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_rows_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
    Json(rows): Json<Vec<TableRecord>>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    let count = rows.len();
    service.replace_rows(&code, rows);
    (StatusCode::OK, Json(json!({ "code": code, "rows": count }))).into_response()
}

pub(crate) async fn discard_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    service.discard(&TableCode::new(code));
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn update_field_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path((code, row_key)): Path<(String, String)>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.update_field(&code, &row_key, &update.field, update.value) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn toggle_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path((code, row_key)): Path<(String, String)>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.toggle_selection(&code, &row_key) {
        Ok(selected) => {
            let payload = json!({ "row_key": row_key, "selected": selected });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
    body: Bytes,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.import(&code, body.as_ref()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.save(&code) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
    Json(rows): Json<Vec<TableRecord>>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.preview(&code, rows) {
        Some(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        None => {
            let payload = json!({
                "error": format!("no plugin registered for table {code}"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn score_detail_handler<R>(
    State(service): State<Arc<LkpsScoringService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: ScoreRepository + 'static,
{
    let code = TableCode::new(code);
    match service.score_detail(&code) {
        Ok(Some(detail)) => (StatusCode::OK, Json(detail)).into_response(),
        Ok(None) => {
            let payload = json!({
                "error": format!("table {code} has no saved score detail"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScoringServiceError) -> Response {
    let status = match &error {
        ScoringServiceError::Store(StoreError::RowNotFound { .. }) => StatusCode::NOT_FOUND,
        ScoringServiceError::Store(StoreError::AmbiguousRow { .. }) => StatusCode::CONFLICT,
        ScoringServiceError::Import(SpreadsheetImportError::Io(_)) => StatusCode::BAD_REQUEST,
        ScoringServiceError::Import(SpreadsheetImportError::Csv(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScoringServiceError::Repository(_) | ScoringServiceError::Resolver(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
