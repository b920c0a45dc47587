//! Synchronous search response parsing

use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

/// A single log message payload (the `message` object of a result row).
pub type LogRecord = Map<String, Value>;

/// Execution flags reported for the whole search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutionStats {
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub completed_exceptionally: bool,
}

impl ExecutionStats {
    pub fn succeeded(&self) -> bool {
        self.done && !self.cancelled && !self.completed_exceptionally
    }
}

/// One parsed response of the synchronous search endpoint.
///
/// A response whose result slot is missing is not an error: it yields no
/// messages and a zero total.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    execution: ExecutionStats,
    messages: Vec<Value>,
    total_results: u64,
    errors: Vec<String>,
}

impl SearchResponse {
    /// Parse a raw body, reading results for `query_id` / `search_type_id`.
    pub fn parse(body: &[u8], query_id: Uuid, search_type_id: Uuid) -> Result<Self> {
        let data: Value = serde_json::from_slice(body)
            .map_err(|e| Error::MalformedResponse(format!("search response: {}", e)))?;

        let execution = match data.get("execution") {
            Some(raw) => ExecutionStats::deserialize(raw)
                .map_err(|e| Error::MalformedResponse(format!("execution stats: {}", e)))?,
            None => ExecutionStats::default(),
        };

        let query_result = data
            .get("results")
            .and_then(|results| results.get(query_id.to_string()));

        let slot = query_result
            .and_then(|result| result.get("search_types"))
            .and_then(|types| types.get(search_type_id.to_string()));

        let (messages, total_results) = match slot {
            Some(slot) => (
                slot.get("messages")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                slot.get("total_results").and_then(Value::as_u64).unwrap_or(0),
            ),
            None => {
                debug!(%query_id, %search_type_id, "Result slot missing from search response");
                (Vec::new(), 0)
            }
        };

        let errors = query_result
            .and_then(|result| result.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("description").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            execution,
            messages,
            total_results,
            errors,
        })
    }

    pub fn execution(&self) -> ExecutionStats {
        self.execution
    }

    /// True iff the search is done, not cancelled and did not complete exceptionally.
    pub fn succeeded(&self) -> bool {
        self.execution.succeeded()
    }

    /// Raw result rows, each wrapping a `message` payload.
    pub fn messages(&self) -> &[Value] {
        &self.messages
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    /// First error description reported for the query, if any.
    pub fn error_description(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    /// Consume the response, keeping the `message` payload of each row.
    pub fn into_records(self) -> Vec<LogRecord> {
        self.messages
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(mut row) => match row.remove("message") {
                    Some(Value::Object(message)) => Some(message),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }
}
