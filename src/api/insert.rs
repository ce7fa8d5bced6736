//! Insert form API endpoints.

use axum::{extract::State, Json};

use super::records::insert_one;
use super::{detach, success, ApiResult};
use crate::models::NewRecord;
use crate::pages::{InsertOutcome, InsertPage};
use crate::AppState;

/// GET /api/insert - Current insert form state.
pub async fn get_insert_page(State(state): State<AppState>) -> ApiResult<InsertPage> {
    let page = state.pages.insert.read().await.clone();
    success(page)
}

/// POST /api/insert - Submit the insert form.
pub async fn submit_insert(
    State(state): State<AppState>,
    Json(request): Json<NewRecord>,
) -> ApiResult<InsertPage> {
    let page = detach(async move {
        let ticket = state.pages.insert.write().await.begin("Insert")?;
        let result = insert_one(&state.store, request).await;

        let mut page = state.pages.insert.write().await;
        match result {
            Ok(record) => {
                page.finish(ticket, Ok(InsertOutcome::new(record)));
                Ok(page.clone())
            }
            Err(err) => {
                page.finish(
                    ticket,
                    Err(format!("Erro ao inserir registro: {}", err.message())),
                );
                Err(err)
            }
        }
    })
    .await?;
    success(page)
}
