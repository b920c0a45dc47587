//! Search time windows

use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Time window a query is evaluated over.
///
/// Relative ranges are resolved by the server at request time ("the last N
/// seconds"); absolute ranges pin both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRange {
    Relative { seconds: u64 },
    Absolute { from: DateTime<Utc>, to: DateTime<Utc> },
}

impl TimeRange {
    /// Window covering the last `seconds` seconds.
    pub fn relative(seconds: u64) -> Self {
        TimeRange::Relative { seconds }
    }

    /// Window between two instants. `to` must not precede `from`.
    pub fn absolute(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if to < from {
            return Err(Error::InvalidArgument(format!(
                "time range ends ({}) before it starts ({})",
                to.to_rfc3339(),
                from.to_rfc3339()
            )));
        }
        Ok(TimeRange::Absolute { from, to })
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, TimeRange::Relative { .. })
    }

    /// Encode as the `timerange` object of a search request.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            TimeRange::Relative { seconds } => serde_json::json!({
                "type": "relative",
                "from": seconds,
            }),
            TimeRange::Absolute { from, to } => serde_json::json!({
                "type": "absolute",
                "from": from.to_rfc3339(),
                "to": to.to_rfc3339(),
            }),
        }
    }
}
