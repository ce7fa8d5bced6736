//! Record model matching the `prefilheus` collection schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One citizen interaction as stored in the remote collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: i64,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub secretaria: Option<String>,
    #[serde(default, alias = "mensagem")]
    pub demanda: Option<String>,
    #[serde(default, alias = "data_criacao")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Text value of a named column, if the column is a text column and non-null.
    pub fn text(&self, column: &str) -> Option<&str> {
        match column {
            "nome" => self.nome.as_deref(),
            "email" => self.email.as_deref(),
            "telefone" => self.telefone.as_deref(),
            "secretaria" => self.secretaria.as_deref(),
            "demanda" | "mensagem" => self.demanda.as_deref(),
            _ => None,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(nome) = &patch.nome {
            self.nome = Some(nome.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(telefone) = &patch.telefone {
            self.telefone = Some(telefone.clone());
        }
        if let Some(secretaria) = &patch.secretaria {
            self.secretaria = Some(secretaria.clone());
        }
        if let Some(demanda) = &patch.demanda {
            self.demanda = Some(demanda.clone());
        }
    }
}

/// Request body for inserting a new record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub secretaria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demanda: Option<String>,
}

impl NewRecord {
    /// Names of the required fields left blank, in form order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("nome", &self.nome),
            ("email", &self.email),
            ("telefone", &self.telefone),
            ("secretaria", &self.secretaria),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Request body for updating an existing record. Only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secretaria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demanda: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.email.is_none()
            && self.telefone.is_none()
            && self.secretaria.is_none()
            && self.demanda.is_none()
    }
}
