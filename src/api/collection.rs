//! Collection probe endpoint.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::store::CollectionStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CollectionInfo {
    pub table: String,
    pub backend: &'static str,
    pub status: CollectionStatus,
}

/// GET /api/collection/status - Whether the configured collection exists.
pub async fn collection_status(State(state): State<AppState>) -> ApiResult<CollectionInfo> {
    let status = state.store.check_collection().await?;
    success(CollectionInfo {
        table: state.config.table.clone(),
        backend: state.store.backend_name(),
        status,
    })
}
