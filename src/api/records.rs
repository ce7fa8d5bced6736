//! Record API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{NewRecord, Record, RecordPatch};
use crate::query::QueryDescriptor;
use crate::store::{DeleteTarget, RecordStore};
use crate::AppState;

/// GET /api/records - List every record, newest first.
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Vec<Record>> {
    let records = state.store.select(&QueryDescriptor::all()).await?;
    success(records)
}

/// POST /api/records - Insert a record.
pub async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<NewRecord>,
) -> ApiResult<Record> {
    let record = insert_one(&state.store, request).await?;
    success(record)
}

/// PUT /api/records/{id} - Update a record.
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<RecordPatch>,
) -> ApiResult<Record> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let updated = state.store.update(id, &patch).await?;
    match updated.into_iter().next() {
        Some(record) => {
            tracing::info!("Updated record {}", id);
            success(record)
        }
        None => Err(AppError::NotFound(format!("Record {} not found", id))),
    }
}

/// DELETE /api/records/{id} - Delete a record.
pub async fn delete_record(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.store.delete(DeleteTarget::One(id)).await?;
    tracing::info!("Deleted record {}", id);
    success(())
}

/// DELETE /api/records - Delete every record.
pub async fn delete_all_records(State(state): State<AppState>) -> ApiResult<()> {
    state.store.delete(DeleteTarget::All).await?;
    tracing::warn!("Deleted all records");
    success(())
}

/// Check required fields and insert one record.
pub(crate) async fn insert_one(store: &RecordStore, request: NewRecord) -> Result<Record, AppError> {
    let missing = request.missing_required();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Campos obrigatórios não preenchidos: {}",
            missing.join(", ")
        )));
    }

    let inserted = store.insert(std::slice::from_ref(&request)).await?;
    let record = inserted.into_iter().next().ok_or_else(|| {
        AppError::Internal("Remote store returned no inserted row".to_string())
    })?;

    tracing::info!("Inserted record {}", record.id);
    Ok(record)
}
