//! Report aggregation: totals and per-department counts.

use std::collections::HashMap;

use crate::models::{
    Record, ReportResult, ReportSummary, SecretariaCount, SecretariaShare, UNSPECIFIED_SECRETARIA,
};

/// Group records by department and count them.
///
/// Missing or empty departments fall under [`UNSPECIFIED_SECRETARIA`]. Groups
/// are ordered by count descending; equal counts keep first-seen order.
pub fn aggregate(records: &[Record]) -> ReportResult {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut by_secretaria: Vec<SecretariaCount> = Vec::new();

    for record in records {
        let name = record
            .secretaria
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNSPECIFIED_SECRETARIA);

        match index.get(name) {
            Some(&slot) => by_secretaria[slot].count += 1,
            None => {
                index.insert(name, by_secretaria.len());
                by_secretaria.push(SecretariaCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps encounter order among ties.
    by_secretaria.sort_by(|a, b| b.count.cmp(&a.count));

    ReportResult {
        total_records: records.len(),
        by_secretaria,
    }
}

/// Share of `count` in `total`, one decimal, e.g. `"33.3%"`. Zero total yields `"0.0%"`.
///
/// Halves round away from zero, so 1 of 16 is `"6.3%"`.
pub fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    let tenths = (count as f64 * 1000.0 / total as f64).round();
    format!("{:.1}%", tenths / 10.0)
}

impl ReportResult {
    /// Attach display percentages to every department row.
    pub fn summarize(&self) -> ReportSummary {
        ReportSummary {
            total_records: self.total_records,
            by_secretaria: self
                .by_secretaria
                .iter()
                .map(|row| SecretariaShare {
                    name: row.name.clone(),
                    count: row.count,
                    percentage: percentage(row.count, self.total_records),
                })
                .collect(),
        }
    }
}
