//! `RecordStore` over a PostgREST endpoint (the Supabase REST API).

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::http::HttpEndpoint;
use super::{RecordStore, StoredRecord};
use crate::error::{DeleteError, InsertError};
use crate::job::{CommitRecord, RecordId};

pub const DEFAULT_TABLE: &str = "ij_coding_log_ver1";

/// Row shape returned by `Prefer: return=representation`. Extra columns such
/// as `created_at` are ignored.
#[derive(Debug, Deserialize)]
struct EchoedRow {
    id: Value,
    #[serde(flatten)]
    record: CommitRecord,
}

pub struct PostgrestRecordStore {
    endpoint: HttpEndpoint,
    table: String,
}

impl PostgrestRecordStore {
    pub fn new(endpoint: HttpEndpoint, table: impl Into<String>) -> Self {
        Self {
            endpoint,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_url(&self) -> reqwest::Url {
        self.endpoint.url(["rest", "v1", self.table.as_str()])
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Reads the body of a failed response for the error message.
async fn failure_detail(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.is_empty() => format!("{}: {}", status, body),
        _ => status.to_string(),
    }
}

fn record_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => Some(RecordId::new(n.to_string())),
        Value::String(s) if !s.is_empty() => Some(RecordId::new(s.clone())),
        _ => None,
    }
}

fn parse_echo(row: Value) -> Result<EchoedRow, InsertError> {
    serde_json::from_value(row).map_err(|e| InsertError::EchoMalformed(e.to_string()))
}

#[async_trait]
impl RecordStore for PostgrestRecordStore {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    async fn insert_returning(&self, record: &CommitRecord) -> Result<StoredRecord, InsertError> {
        let request = self
            .endpoint
            .client()
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(record);

        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| InsertError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = failure_detail(response).await;
            return Err(if is_transient(status) {
                InsertError::Transport(detail)
            } else {
                InsertError::Rejected(detail)
            });
        }

        // Past a 2xx the row may exist; an unreadable echo is an integrity failure
        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| InsertError::EchoMalformed(e.to_string()))?;

        let first = rows.into_iter().next().ok_or(InsertError::EchoMissing)?;
        let row = parse_echo(first)?;
        let id = record_id(&row.id).ok_or(InsertError::EchoMissing)?;

        Ok(StoredRecord {
            id,
            record: row.record,
        })
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), DeleteError> {
        let request = self
            .endpoint
            .client()
            .delete(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");

        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| DeleteError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = failure_detail(response).await;
            return Err(if is_transient(status) {
                DeleteError::Transport(detail)
            } else {
                DeleteError::Rejected(detail)
            });
        }

        // Row-level security can turn a delete into a silent no-op; the
        // representation tells us whether the row actually went away.
        let removed: Vec<Value> = response
            .json()
            .await
            .map_err(|e| DeleteError::Rejected(format!("Unreadable delete response: {}", e)))?;

        if removed.is_empty() {
            return Err(DeleteError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_echoed_row_ignores_extra_columns() {
        let row: EchoedRow = serde_json::from_value(json!({
            "id": 17,
            "job_order": "JAN 1",
            "job_quantity": 10,
            "programmed": 12,
            "verified": 11,
            "device": "X",
            "created_at": "2026-01-15T10:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(record_id(&row.id), Some(RecordId::new("17")));
        assert_eq!(row.record.job_id, "JAN 1");
        assert_eq!(row.record.quantity, 10);
    }

    #[test]
    fn test_parse_echo_rejects_null_column() {
        let err = parse_echo(json!({
            "id": 17,
            "job_order": "JAN 1",
            "job_quantity": 10,
            "programmed": 12,
            "verified": 11,
            "device": null
        }))
        .unwrap_err();
        assert!(matches!(err, InsertError::EchoMalformed(_)));
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_record_id_accepts_string_and_number() {
        assert_eq!(record_id(&json!("abc")), Some(RecordId::new("abc")));
        assert_eq!(record_id(&json!(5)), Some(RecordId::new("5")));
        assert_eq!(record_id(&json!("")), None);
        assert_eq!(record_id(&Value::Null), None);
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::CONFLICT));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
    }
}
