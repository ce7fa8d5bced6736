//! Per-page state: the filter page, the report page and the insert form.
//!
//! Each page runs `idle -> loading -> {success, error}` on every action.
//! Requests are sequenced with tickets: only the most recently issued ticket
//! may settle a page, so a slow, superseded response never overwrites a newer
//! one.

mod filter;
mod insert;
mod report;

pub use filter::*;
pub use insert::*;
pub use report::*;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::AppError;

/// Status of the last action on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum PageStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Identifies one in-flight page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Status plus the data of the last successful action.
///
/// A failed action keeps the previous data.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub status: PageStatus,
    pub data: Option<T>,
    #[serde(skip)]
    issued: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            status: PageStatus::Idle,
            data: None,
            issued: 0,
        }
    }
}

impl<T> Page<T> {
    /// Start an action, rejecting a duplicate submission while one is loading.
    pub fn begin(&mut self, action: &str) -> Result<Ticket, AppError> {
        if self.status == PageStatus::Loading {
            return Err(AppError::Busy(format!("{} already in progress", action)));
        }
        Ok(self.supersede())
    }

    /// Start an action that replaces whatever is in flight.
    pub fn supersede(&mut self) -> Ticket {
        self.issued += 1;
        self.status = PageStatus::Loading;
        Ticket(self.issued)
    }

    /// Settle the action identified by `ticket`. Returns false for a stale ticket.
    pub fn finish(&mut self, ticket: Ticket, result: Result<T, String>) -> bool {
        if ticket.0 != self.issued {
            tracing::debug!(
                "Discarding stale page result (ticket {}, latest {})",
                ticket.0,
                self.issued
            );
            return false;
        }

        match result {
            Ok(data) => {
                self.status = PageStatus::Success;
                self.data = Some(data);
            }
            Err(message) => self.status = PageStatus::Error(message),
        }
        true
    }

    /// Back to idle with no data. In-flight tickets become stale.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.status = PageStatus::Idle;
        self.data = None;
    }
}

/// All page state of the console.
#[derive(Default)]
pub struct Pages {
    pub filter: RwLock<FilterPage>,
    pub report: RwLock<ReportPage>,
    pub insert: RwLock<InsertPage>,
}
