//! Record store: the only side-effecting boundary.
//!
//! The hosted database is the source of truth. When no remote URL is
//! configured the backend runs against an in-memory table that evaluates the
//! same query descriptors.

mod memory;
mod postgrest;

pub use memory::*;
pub use postgrest::*;

use serde::Serialize;

use crate::models::{NewRecord, Record, RecordPatch};
use crate::query::{Operand, Operator, Predicate, QueryDescriptor};

/// PostgreSQL code for "relation does not exist".
pub const MISSING_RELATION: &str = "42P01";

/// A failed remote call, as `{code, message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// True when the collection itself does not exist.
    pub fn is_missing_relation(&self) -> bool {
        self.code.as_deref() == Some(MISSING_RELATION)
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Rows targeted by a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    One(i64),
    All,
}

impl DeleteTarget {
    /// The filter that selects the targeted rows. `All` is `id != 0`.
    pub fn predicate(&self) -> Predicate {
        match self {
            DeleteTarget::One(id) => Predicate::new("id", Operator::Eq, Operand::Integer(*id)),
            DeleteTarget::All => Predicate::new("id", Operator::Neq, Operand::Integer(0)),
        }
    }
}

/// Whether the configured collection exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionStatus {
    Available,
    Missing,
}

/// Store backend in use.
pub enum RecordStore {
    Remote(PostgrestClient),
    Memory(MemoryStore),
}

impl RecordStore {
    /// Run a select.
    pub async fn select(&self, query: &QueryDescriptor) -> Result<Vec<Record>, RemoteError> {
        match self {
            RecordStore::Remote(client) => client.select(query).await,
            RecordStore::Memory(store) => store.select(query).await,
        }
    }

    /// Insert records and return them as stored.
    pub async fn insert(&self, records: &[NewRecord]) -> Result<Vec<Record>, RemoteError> {
        match self {
            RecordStore::Remote(client) => client.insert(records).await,
            RecordStore::Memory(store) => store.insert(records).await,
        }
    }

    /// Apply a partial update and return the updated rows.
    pub async fn update(&self, id: i64, patch: &RecordPatch) -> Result<Vec<Record>, RemoteError> {
        match self {
            RecordStore::Remote(client) => client.update(id, patch).await,
            RecordStore::Memory(store) => store.update(id, patch).await,
        }
    }

    pub async fn delete(&self, target: DeleteTarget) -> Result<(), RemoteError> {
        match self {
            RecordStore::Remote(client) => client.delete(target).await,
            RecordStore::Memory(store) => store.delete(target).await,
        }
    }

    /// Probe the collection with a one-row select.
    pub async fn check_collection(&self) -> Result<CollectionStatus, RemoteError> {
        match self.select(&QueryDescriptor::all().with_limit(1)).await {
            Ok(_) => Ok(CollectionStatus::Available),
            Err(e) if e.is_missing_relation() => Ok(CollectionStatus::Missing),
            Err(e) => Err(e),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            RecordStore::Remote(_) => "postgrest",
            RecordStore::Memory(_) => "memory",
        }
    }
}
