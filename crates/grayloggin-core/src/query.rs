//! Paged search queries and the search-request envelope

use crate::{StreamRef, TimeRange};
use serde_json::{Value, json};
use uuid::Uuid;

/// Records per page.
pub const PAGE_SIZE: u64 = 50;

/// The search backend refuses to page past this many records.
pub const RESULT_WINDOW_LIMIT: u64 = 10_000;

/// One query of a search, positioned at a page.
///
/// The query id and the search-type (result slot) id are generated once and
/// stay stable across page changes; only the offset moves.
#[derive(Debug, Clone)]
pub struct Query {
    id: Uuid,
    search_type_id: Uuid,
    query_string: String,
    timerange: TimeRange,
    page_size: u64,
    offset: u64,
    streams: Vec<StreamRef>,
}

impl Query {
    /// Build a query positioned at `page`. An empty query string matches everything.
    pub fn new(
        query_string: impl Into<String>,
        timerange: TimeRange,
        streams: Vec<StreamRef>,
        page: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            search_type_id: Uuid::new_v4(),
            query_string: query_string.into(),
            timerange,
            page_size: PAGE_SIZE,
            offset: PAGE_SIZE.saturating_mul(page),
            streams,
        }
    }

    pub fn set_page(&mut self, page: u64) {
        self.offset = self.page_size.saturating_mul(page);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn search_type_id(&self) -> Uuid {
        self.search_type_id
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn timerange(&self) -> &TimeRange {
        &self.timerange
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn streams(&self) -> &[StreamRef] {
        &self.streams
    }

    /// Whether reading the current page would cross the backend's result window.
    pub fn exceeds_result_window(&self) -> bool {
        self.offset.saturating_add(self.page_size) > RESULT_WINDOW_LIMIT
    }

    /// Encode as one entry of a search request's `queries` array.
    pub fn to_wire(&self) -> Value {
        let mut search_type = json!({
            "id": self.search_type_id,
            "limit": self.page_size,
            "offset": self.offset,
            "type": "messages",
        });

        if !self.streams.is_empty() {
            let ids: Vec<&str> = self.streams.iter().map(|s| s.id.as_str()).collect();
            search_type["streams"] = json!(ids);
        }

        json!({
            "id": self.id,
            "query": {
                "type": "elasticsearch",
                "query_string": self.query_string,
            },
            "timerange": self.timerange.to_wire(),
            "search_types": [search_type],
        })
    }
}

/// Wrap a query in the synchronous search envelope `{id, queries: [query]}`.
pub fn search_body(search_id: Uuid, query: &Query) -> Value {
    json!({
        "id": search_id,
        "queries": [query.to_wire()],
    })
}
