//! Filter page API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{detach, success, ApiResult};
use crate::errors::AppError;
use crate::models::FilterCriteria;
use crate::pages::{FilterPage, Ticket};
use crate::AppState;

/// GET /api/filter - Current filter page state.
pub async fn get_filter_page(State(state): State<AppState>) -> ApiResult<FilterPage> {
    let page = state.pages.filter.read().await.clone();
    success(page)
}

/// POST /api/filter/load - Load the capped initial view and department choices.
pub async fn load_filter_page(State(state): State<AppState>) -> ApiResult<FilterPage> {
    let page = detach(async move {
        let ticket = state.pages.filter.write().await.start_load()?;
        reload(&state, ticket).await
    })
    .await?;
    success(page)
}

/// POST /api/filter/apply - Search with the given criteria.
pub async fn apply_filters(
    State(state): State<AppState>,
    Json(criteria): Json<FilterCriteria>,
) -> ApiResult<FilterPage> {
    let page = detach(async move {
        let ticket = state
            .pages
            .filter
            .write()
            .await
            .start_search(criteria.clone())?;
        search(&state, ticket, criteria).await
    })
    .await?;
    success(page)
}

/// DELETE /api/filter/active/{label} - Remove one active filter and search again.
pub async fn remove_active_filter(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> ApiResult<FilterPage> {
    let page = detach(async move {
        let (ticket, criteria) = state.pages.filter.write().await.start_removal(&label);
        search(&state, ticket, criteria).await
    })
    .await?;
    success(page)
}

/// POST /api/filter/clear - Clear every filter and reload the initial view.
pub async fn clear_filters(State(state): State<AppState>) -> ApiResult<FilterPage> {
    let page = detach(async move {
        let ticket = state.pages.filter.write().await.start_clear();
        reload(&state, ticket).await
    })
    .await?;
    success(page)
}

async fn reload(state: &AppState, ticket: Ticket) -> Result<FilterPage, AppError> {
    let result = state.store.select(&state.queries.initial_query()).await;

    let mut page = state.pages.filter.write().await;
    match result {
        Ok(rows) => {
            page.finish_load(ticket, Ok(rows));
            Ok(page.clone())
        }
        Err(e) => {
            let err = AppError::from(e);
            page.finish_load(
                ticket,
                Err(format!("Erro ao carregar dados iniciais: {}", err.message())),
            );
            Err(err)
        }
    }
}

async fn search(
    state: &AppState,
    ticket: Ticket,
    criteria: FilterCriteria,
) -> Result<FilterPage, AppError> {
    let query = state.queries.build_query(&criteria);
    let result = state.store.select(&query).await;

    let mut page = state.pages.filter.write().await;
    match result {
        Ok(rows) => {
            tracing::info!(
                "Filter search returned {} rows ({} predicates)",
                rows.len(),
                query.predicates.len()
            );
            page.finish_search(ticket, &criteria, Ok(rows));
            Ok(page.clone())
        }
        Err(e) => {
            let err = AppError::from(e);
            page.finish_search(
                ticket,
                &criteria,
                Err(format!(
                    "Erro ao buscar dados com os filtros aplicados: {}",
                    err.message()
                )),
            );
            Err(err)
        }
    }
}
