//! Filter criteria entered on the filter and report pages.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User-entered predicates not yet applied to a query.
///
/// Text fields are substring matchers, `secretaria` is an exact match and the
/// two dates bound the creation timestamp inclusively. Blank strings count as
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub secretaria: Option<String>,
    #[serde(default)]
    pub data_inicio: Option<NaiveDate>,
    #[serde(default)]
    pub data_fim: Option<NaiveDate>,
}

impl FilterCriteria {
    /// Value of a text field, `None` when blank.
    ///
    /// Substring fields are trimmed. `secretaria` is an exact match against a
    /// stored value and is returned untouched.
    pub fn text(&self, field: FilterField) -> Option<&str> {
        let value = match field {
            FilterField::Nome => self.nome.as_deref().map(str::trim),
            FilterField::Email => self.email.as_deref().map(str::trim),
            FilterField::Telefone => self.telefone.as_deref().map(str::trim),
            FilterField::Secretaria => self.secretaria.as_deref(),
            FilterField::DataInicio | FilterField::DataFim => return None,
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn date(&self, field: FilterField) -> Option<NaiveDate> {
        match field {
            FilterField::DataInicio => self.data_inicio,
            FilterField::DataFim => self.data_fim,
            _ => None,
        }
    }

    pub fn is_set(&self, field: FilterField) -> bool {
        self.text(field).is_some() || self.date(field).is_some()
    }

    /// True when no field would impose a predicate.
    pub fn is_empty(&self) -> bool {
        !FilterField::ALL.iter().any(|field| self.is_set(*field))
    }

    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Nome => self.nome = None,
            FilterField::Email => self.email = None,
            FilterField::Telefone => self.telefone = None,
            FilterField::Secretaria => self.secretaria = None,
            FilterField::DataInicio => self.data_inicio = None,
            FilterField::DataFim => self.data_fim = None,
        }
    }
}

/// One filterable field, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Nome,
    Email,
    Telefone,
    Secretaria,
    DataInicio,
    DataFim,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Nome,
        FilterField::Email,
        FilterField::Telefone,
        FilterField::Secretaria,
        FilterField::DataInicio,
        FilterField::DataFim,
    ];

    /// Label shown on the removable chip.
    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Nome => "nome",
            FilterField::Email => "email",
            FilterField::Telefone => "telefone",
            FilterField::Secretaria => "secretaria",
            FilterField::DataInicio => "data início",
            FilterField::DataFim => "data fim",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.label() == label)
    }
}

/// Display form of one applied predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilter {
    pub label: String,
    pub value: String,
}

/// Inclusive date range for the report page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}
