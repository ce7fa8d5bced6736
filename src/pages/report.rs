//! Report page state.

use serde::Serialize;

use super::{Page, Ticket};
use crate::errors::AppError;
use crate::models::{DateRange, ReportSummary};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub range: DateRange,
    pub report: Page<ReportSummary>,
}

impl ReportPage {
    /// Start generating. The last successful report stays until a new one lands.
    pub fn start(&mut self, range: DateRange) -> Result<Ticket, AppError> {
        let ticket = self.report.begin("Report generation")?;
        self.range = range;
        Ok(ticket)
    }

    pub fn finish(&mut self, ticket: Ticket, result: Result<ReportSummary, String>) {
        self.report.finish(ticket, result);
    }

    pub fn clear(&mut self) {
        self.range = DateRange::default();
        self.report.reset();
    }
}
