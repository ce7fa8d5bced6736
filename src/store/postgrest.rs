//! PostgREST client for the hosted collection.

use chrono::SecondsFormat;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use super::{DeleteTarget, RemoteError};
use crate::config::Config;
use crate::models::{NewRecord, Record, RecordPatch};
use crate::query::{Operand, Operator, Predicate, QueryDescriptor};

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// HTTP client bound to one collection.
pub struct PostgrestClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PostgrestClient {
    /// Create a client for `{base_url}/rest/v1/{table}`.
    pub fn new(base_url: &str, config: &Config) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| RemoteError::new(None, format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/rest/v1/{}",
                base_url.trim_end_matches('/'),
                config.table
            ),
            api_key: config.supabase_key.clone(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let request = self.client.request(method, &self.endpoint);
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    pub async fn select(&self, query: &QueryDescriptor) -> Result<Vec<Record>, RemoteError> {
        tracing::debug!("Remote select: {:?}", query);
        let response = send(self.request(Method::GET).query(&query_pairs(query))).await?;
        read_rows(response).await
    }

    pub async fn insert(&self, records: &[NewRecord]) -> Result<Vec<Record>, RemoteError> {
        tracing::debug!("Remote insert of {} record(s)", records.len());
        let response = send(
            self.request(Method::POST)
                .header("Prefer", "return=representation")
                .json(records),
        )
        .await?;
        read_rows(response).await
    }

    pub async fn update(&self, id: i64, patch: &RecordPatch) -> Result<Vec<Record>, RemoteError> {
        tracing::debug!("Remote update of record {}", id);
        let filter = predicate_pair(&DeleteTarget::One(id).predicate());
        let response = send(
            self.request(Method::PATCH)
                .query(&[filter])
                .header("Prefer", "return=representation")
                .json(patch),
        )
        .await?;
        read_rows(response).await
    }

    pub async fn delete(&self, target: DeleteTarget) -> Result<(), RemoteError> {
        tracing::debug!("Remote delete: {:?}", target);
        let filter = predicate_pair(&target.predicate());
        let response = send(self.request(Method::DELETE).query(&[filter])).await?;
        check_status(response).await.map(|_| ())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
    request
        .send()
        .await
        .map_err(|e| RemoteError::new(None, format!("Failed to reach remote store: {}", e)))
}

/// Turn a non-2xx response into a `RemoteError`, preferring the PostgREST body.
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<PostgrestErrorBody>(&text) {
        Ok(body) => {
            let message = match (body.message, body.details) {
                (Some(message), Some(details)) => format!("{} ({})", message, details),
                (Some(message), None) => message,
                (None, _) => format!("Remote store returned {}", status.as_u16()),
            };
            Err(RemoteError::new(body.code, message))
        }
        Err(_) => Err(RemoteError::new(
            None,
            format!("Remote store returned {}: {}", status.as_u16(), text),
        )),
    }
}

async fn read_rows(response: Response) -> Result<Vec<Record>, RemoteError> {
    check_status(response)
        .await?
        .json()
        .await
        .map_err(|e| RemoteError::new(None, format!("Failed to parse rows: {}", e)))
}

/// PostgREST query string for a select.
pub fn query_pairs(query: &QueryDescriptor) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), "*".to_string())];
    pairs.extend(query.predicates.iter().map(predicate_pair));

    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }

    pairs
}

fn predicate_pair(predicate: &Predicate) -> (String, String) {
    let operand = match (&predicate.operand, predicate.op) {
        (Operand::Text(text), Operator::ILike) => format!("*{}*", escape_like(text)),
        (Operand::Text(text), _) => text.clone(),
        (Operand::Integer(n), _) => n.to_string(),
        (Operand::Timestamp(ts), _) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    (
        predicate.column.clone(),
        format!("{}.{}", predicate.op.as_str(), operand),
    )
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
