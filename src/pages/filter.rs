//! Filter page state.

use serde::Serialize;

use super::{Page, PageStatus, Ticket};
use crate::errors::AppError;
use crate::models::{ActiveFilter, FilterCriteria, Record};
use crate::query::{describe_active_filters, distinct_secretarias, remove_filter};

/// Criteria, chips, department choices and the current result rows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPage {
    pub criteria: FilterCriteria,
    pub active_filters: Vec<ActiveFilter>,
    pub secretarias: Vec<String>,
    pub results: Page<Vec<Record>>,
}

impl FilterPage {
    pub fn start_load(&mut self) -> Result<Ticket, AppError> {
        self.results.begin("Initial load")
    }

    /// Settle an initial load; a non-empty sample refreshes the department choices.
    pub fn finish_load(&mut self, ticket: Ticket, result: Result<Vec<Record>, String>) {
        let choices = result.as_ref().ok().map(|rows| distinct_secretarias(rows));
        if self.results.finish(ticket, result) {
            if let Some(choices) = choices.filter(|c| !c.is_empty()) {
                self.secretarias = choices;
            }
        }
    }

    pub fn start_search(&mut self, criteria: FilterCriteria) -> Result<Ticket, AppError> {
        let ticket = self.results.begin("Filter search")?;
        self.criteria = criteria;
        Ok(ticket)
    }

    /// Drop one chip and return the criteria to re-query with.
    ///
    /// The re-query supersedes any search still in flight.
    pub fn start_removal(&mut self, label: &str) -> (Ticket, FilterCriteria) {
        self.criteria = remove_filter(&self.criteria, label);
        self.active_filters = describe_active_filters(&self.criteria);
        (self.results.supersede(), self.criteria.clone())
    }

    /// Settle a search; chips follow the criteria that produced the rows.
    pub fn finish_search(
        &mut self,
        ticket: Ticket,
        criteria: &FilterCriteria,
        result: Result<Vec<Record>, String>,
    ) {
        if self.results.finish(ticket, result) && self.results.status == PageStatus::Success {
            self.active_filters = describe_active_filters(criteria);
        }
    }

    /// Forget all criteria; the caller reloads the initial view.
    pub fn start_clear(&mut self) -> Ticket {
        self.criteria = FilterCriteria::default();
        self.active_filters.clear();
        self.results.supersede()
    }
}
