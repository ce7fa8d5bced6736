//! Query building from filter criteria.
//!
//! A [`QueryDescriptor`] is a backend-neutral description of one `select`:
//! predicates, ordering and an optional row cap. The remote store renders it
//! as PostgREST parameters; the in-memory store evaluates it directly.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::models::{ActiveFilter, DateRange, FilterCriteria, FilterField, Record};

/// Row cap of the unfiltered initial view.
pub const INITIAL_ROW_CAP: usize = 20;

/// Comparison applied by a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Case-insensitive substring match
    ILike,
    Eq,
    Gte,
    Lte,
    Neq,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::ILike => "ilike",
            Operator::Eq => "eq",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Neq => "neq",
        }
    }
}

/// Typed operand of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

/// One `column <op> operand` condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub column: String,
    pub op: Operator,
    pub operand: Operand,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: Operator, operand: Operand) -> Self {
        Self {
            column: column.into(),
            op,
            operand,
        }
    }

    /// Evaluate against a record the way the remote store would.
    ///
    /// Null columns never match, as in SQL.
    pub fn matches(&self, record: &Record, timestamp_column: &str) -> bool {
        match &self.operand {
            Operand::Text(expected) => {
                let Some(actual) = record.text(&self.column) else {
                    return false;
                };
                match self.op {
                    Operator::ILike => actual
                        .to_lowercase()
                        .contains(&expected.to_lowercase()),
                    Operator::Eq => actual == expected.as_str(),
                    Operator::Neq => actual != expected.as_str(),
                    Operator::Gte => actual >= expected.as_str(),
                    Operator::Lte => actual <= expected.as_str(),
                }
            }
            Operand::Integer(expected) if self.column == "id" => {
                compare(&record.id, expected, self.op)
            }
            Operand::Timestamp(bound) if self.column == timestamp_column => record
                .created_at
                .as_ref()
                .is_some_and(|actual| compare(actual, bound, self.op)),
            _ => false,
        }
    }
}

fn compare<T: PartialOrd>(actual: &T, expected: &T, op: Operator) -> bool {
    match op {
        Operator::Eq | Operator::ILike => actual == expected,
        Operator::Neq => actual != expected,
        Operator::Gte => actual >= expected,
        Operator::Lte => actual <= expected,
    }
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn id_descending() -> Self {
        Self {
            column: "id".to_string(),
            ascending: false,
        }
    }
}

/// A complete `select` against the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDescriptor {
    pub predicates: Vec<Predicate>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl QueryDescriptor {
    /// Every record, newest first.
    pub fn all() -> Self {
        Self {
            predicates: Vec::new(),
            order: Some(Order::id_descending()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &Record, timestamp_column: &str) -> bool {
        self.predicates
            .iter()
            .all(|p| p.matches(record, timestamp_column))
    }
}

/// Builds queries for the configured collection layout.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    timestamp_column: String,
    offset: FixedOffset,
    initial_limit: usize,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            timestamp_column: "created_at".to_string(),
            offset: Utc.fix(),
            initial_limit: INITIAL_ROW_CAP,
        }
    }
}

impl QueryBuilder {
    pub fn from_config(config: &Config) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).unwrap_or_else(|| {
            tracing::warn!(
                "UTC offset of {} minutes is out of range, using UTC",
                config.utc_offset_minutes
            );
            Utc.fix()
        });

        Self {
            timestamp_column: config.timestamp_column.clone(),
            offset,
            initial_limit: config.initial_limit,
        }
    }

    /// The unfiltered default view: newest records, capped.
    pub fn initial_query(&self) -> QueryDescriptor {
        QueryDescriptor::all().with_limit(self.initial_limit)
    }

    /// Translate criteria into a query.
    ///
    /// Empty criteria fall back to the capped initial view; any populated
    /// field lifts the cap.
    pub fn build_query(&self, criteria: &FilterCriteria) -> QueryDescriptor {
        if criteria.is_empty() {
            return self.initial_query();
        }

        let mut query = QueryDescriptor::all();

        for field in [FilterField::Nome, FilterField::Email, FilterField::Telefone] {
            if let Some(value) = criteria.text(field) {
                query.predicates.push(Predicate::new(
                    field.label(),
                    Operator::ILike,
                    Operand::Text(value.to_string()),
                ));
            }
        }

        if let Some(secretaria) = criteria.text(FilterField::Secretaria) {
            query.predicates.push(Predicate::new(
                "secretaria",
                Operator::Eq,
                Operand::Text(secretaria.to_string()),
            ));
        }

        self.push_date_bounds(&mut query, criteria.data_inicio, criteria.data_fim);
        query
    }

    /// Uncapped query for the report page, bounded only by dates.
    pub fn report_query(&self, range: &DateRange) -> QueryDescriptor {
        let mut query = QueryDescriptor::all();
        self.push_date_bounds(&mut query, range.start_date, range.end_date);
        query
    }

    fn push_date_bounds(
        &self,
        query: &mut QueryDescriptor,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) {
        if let Some(start) = start {
            query.predicates.push(Predicate::new(
                self.timestamp_column.clone(),
                Operator::Gte,
                Operand::Timestamp(self.start_of_day(start)),
            ));
        }
        if let Some(end) = end {
            query.predicates.push(Predicate::new(
                self.timestamp_column.clone(),
                Operator::Lte,
                Operand::Timestamp(self.end_of_day(end)),
            ));
        }
    }

    /// First instant of `date` in the operators' timezone.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// Last millisecond of `date` in the operators' timezone.
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
    }
}

/// One chip per populated field, in display order.
pub fn describe_active_filters(criteria: &FilterCriteria) -> Vec<ActiveFilter> {
    FilterField::ALL
        .into_iter()
        .filter_map(|field| {
            let value = match criteria.date(field) {
                Some(date) => date.format("%d/%m/%Y").to_string(),
                None => criteria.text(field)?.to_string(),
            };
            Some(ActiveFilter {
                label: field.label().to_string(),
                value,
            })
        })
        .collect()
}

/// Clear the field matching `label`. Unknown labels leave the criteria untouched.
pub fn remove_filter(criteria: &FilterCriteria, label: &str) -> FilterCriteria {
    let mut next = criteria.clone();
    match FilterField::from_label(label) {
        Some(field) => next.clear(field),
        None => tracing::debug!("Ignoring removal of unknown filter {:?}", label),
    }
    next
}

/// Distinct non-empty departments in first-seen order.
pub fn distinct_secretarias(records: &[Record]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for secretaria in records
        .iter()
        .filter_map(|r| r.secretaria.as_deref())
        .filter(|s| !s.is_empty())
    {
        if !seen.iter().any(|s| s == secretaria) {
            seen.push(secretaria.to_string());
        }
    }
    seen
}
