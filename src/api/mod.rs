//! REST API module.
//!
//! Contains all API routes and handlers for the admin front-end.

mod collection;
mod filter;
mod insert;
mod records;
mod report;

pub use collection::*;
pub use filter::*;
pub use insert::*;
pub use records::*;
pub use report::*;

use std::future::Future;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Run a page action to completion even if the client disconnects.
///
/// A page left in `Loading` would reject every later submission, so the
/// begin/finish pair must never be cut in half by a dropped handler.
async fn detach<T, F>(action: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(action).await?
}
