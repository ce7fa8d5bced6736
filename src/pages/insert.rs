//! Insert form state.

use serde::Serialize;

use super::Page;
use crate::models::Record;

/// Banner shown after a successful insert.
pub const INSERT_SUCCESS_MESSAGE: &str = "Registro inserido com sucesso!";

#[derive(Debug, Clone, Serialize)]
pub struct InsertOutcome {
    pub record: Record,
    pub message: String,
}

impl InsertOutcome {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            message: INSERT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

pub type InsertPage = Page<InsertOutcome>;
