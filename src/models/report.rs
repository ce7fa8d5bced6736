//! Report models derived from a queried record set.

use serde::Serialize;

/// Label used for records without a department.
pub const UNSPECIFIED_SECRETARIA: &str = "Não especificada";

/// Count of records routed to one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretariaCount {
    pub name: String,
    pub count: usize,
}

/// Aggregated total and per-department breakdown, sorted by count descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub total_records: usize,
    pub by_secretaria: Vec<SecretariaCount>,
}

/// A department row with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecretariaShare {
    pub name: String,
    pub count: usize,
    pub percentage: String,
}

/// What the report page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_records: usize,
    pub by_secretaria: Vec<SecretariaShare>,
}
