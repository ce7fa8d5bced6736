//! Report page API endpoints.

use axum::{extract::State, Json};

use super::{detach, success, ApiResult};
use crate::errors::AppError;
use crate::models::DateRange;
use crate::pages::ReportPage;
use crate::report::aggregate;
use crate::AppState;

/// GET /api/report - Current report page state.
pub async fn get_report_page(State(state): State<AppState>) -> ApiResult<ReportPage> {
    let page = state.pages.report.read().await.clone();
    success(page)
}

/// POST /api/report - Generate the report for an optional date range.
pub async fn generate_report(
    State(state): State<AppState>,
    Json(range): Json<DateRange>,
) -> ApiResult<ReportPage> {
    let page = detach(async move {
        let ticket = state.pages.report.write().await.start(range)?;
        let result = state
            .store
            .select(&state.queries.report_query(&range))
            .await;

        let mut page = state.pages.report.write().await;
        match result {
            Ok(rows) => {
                let report = aggregate(&rows);
                tracing::info!(
                    "Report over {} records in {} departments",
                    report.total_records,
                    report.by_secretaria.len()
                );
                page.finish(ticket, Ok(report.summarize()));
                Ok(page.clone())
            }
            Err(e) => {
                let err = AppError::from(e);
                page.finish(
                    ticket,
                    Err(format!("Erro ao gerar relatório: {}", err.message())),
                );
                Err(err)
            }
        }
    })
    .await?;
    success(page)
}

/// POST /api/report/clear - Reset the date range and drop the report.
pub async fn clear_report(State(state): State<AppState>) -> ApiResult<ReportPage> {
    let mut page = state.pages.report.write().await;
    page.clear();
    success(page.clone())
}
