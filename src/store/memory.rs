//! In-memory record table for development mode.

use chrono::Utc;
use tokio::sync::RwLock;

use super::{DeleteTarget, RemoteError, MISSING_RELATION};
use crate::models::{NewRecord, Record, RecordPatch};
use crate::query::QueryDescriptor;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<Record>,
}

/// Volatile stand-in for the hosted collection.
///
/// Ids are assigned sequentially from 1 and `created_at` is stamped on insert,
/// as the hosted service does.
#[derive(Debug)]
pub struct MemoryStore {
    timestamp_column: String,
    table: RwLock<Table>,
    missing: Option<String>,
}

impl MemoryStore {
    pub fn new(timestamp_column: impl Into<String>) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            table: RwLock::new(Table {
                next_id: 1,
                rows: Vec::new(),
            }),
            missing: None,
        }
    }

    /// A store whose collection was never created.
    #[cfg(test)]
    pub fn without_collection(table: &str) -> Self {
        Self {
            missing: Some(table.to_string()),
            ..Self::new("created_at")
        }
    }

    /// A store preloaded with rows, ids kept as given.
    #[cfg(test)]
    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            table: RwLock::new(Table {
                next_id,
                rows: records,
            }),
            ..Self::new("created_at")
        }
    }

    fn ensure_exists(&self) -> Result<(), RemoteError> {
        match &self.missing {
            Some(table) => Err(RemoteError::new(
                Some(MISSING_RELATION.to_string()),
                format!("relation \"public.{}\" does not exist", table),
            )),
            None => Ok(()),
        }
    }

    pub async fn select(&self, query: &QueryDescriptor) -> Result<Vec<Record>, RemoteError> {
        self.ensure_exists()?;
        let table = self.table.read().await;

        let mut rows: Vec<Record> = table
            .rows
            .iter()
            .filter(|r| query.matches(r, &self.timestamp_column))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            // Only id ordering is ever requested.
            if order.ascending {
                rows.sort_by_key(|r| r.id);
            } else {
                rows.sort_by_key(|r| std::cmp::Reverse(r.id));
            }
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    pub async fn insert(&self, records: &[NewRecord]) -> Result<Vec<Record>, RemoteError> {
        self.ensure_exists()?;
        let mut table = self.table.write().await;
        let now = Utc::now();

        let mut inserted = Vec::with_capacity(records.len());
        for new in records {
            let record = Record {
                id: table.next_id,
                nome: Some(new.nome.clone()),
                email: Some(new.email.clone()),
                telefone: Some(new.telefone.clone()),
                secretaria: Some(new.secretaria.clone()),
                demanda: new.demanda.clone(),
                created_at: Some(now),
            };
            table.next_id += 1;
            table.rows.push(record.clone());
            inserted.push(record);
        }

        Ok(inserted)
    }

    pub async fn update(&self, id: i64, patch: &RecordPatch) -> Result<Vec<Record>, RemoteError> {
        self.ensure_exists()?;
        let mut table = self.table.write().await;

        Ok(table
            .rows
            .iter_mut()
            .filter(|r| r.id == id)
            .map(|r| {
                r.apply(patch);
                r.clone()
            })
            .collect())
    }

    pub async fn delete(&self, target: DeleteTarget) -> Result<(), RemoteError> {
        self.ensure_exists()?;
        let predicate = target.predicate();
        let mut table = self.table.write().await;
        table
            .rows
            .retain(|r| !predicate.matches(r, &self.timestamp_column));
        Ok(())
    }
}
