//! Paginated search sessions
//!
//! A [`SearchSession`] owns one logical search. Starting a search fetches the
//! first page; iterating the session yields buffered records and fetches the
//! next page whenever the buffer runs dry, until the service-reported total
//! is exhausted, the backend's 10,000-record window is reached, or the search
//! fails.
//!
//! ```text
//! Idle --start--> Ready --next page--> Ready ... --> LastPage --drained--> Exhausted
//!                   \
//!                    +--error / cancel--> Failed
//! ```
//!
//! Iteration ends the same way whether the search ran out of results or
//! failed; check [`SearchSession::state`] and [`SearchSession::failure`]
//! afterwards to tell the two apart.

use crate::client::{AuthContext, HttpRequest, HttpResponse, Transport};
use crate::connection::GraylogConnection;
use crate::retry::{CancelHandle, Retrier, RetryPolicy, Sleeper};
use crate::{EgressError, Result};
use chrono::{DateTime, Utc};
use grayloggin_core::{LogRecord, PAGE_SIZE, Query, SearchResponse, StreamRef, TimeRange, search_body};
use rand::RngCore;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Server-side execution timeout passed to the synchronous search endpoint
pub const DEFAULT_SERVER_TIMEOUT_MS: u64 = 60_000;

/// Search session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub retry: RetryPolicy,
    pub server_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            server_timeout_ms: DEFAULT_SERVER_TIMEOUT_MS,
        }
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No search started yet
    Idle,
    /// A page is buffered and more pages may follow
    Ready,
    /// The buffered page is the last one
    LastPage,
    /// All results were consumed, or the result window limit was reached
    Exhausted,
    /// The search ended on an error; see [`SearchSession::failure`]
    Failed,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchState::Exhausted | SearchState::Failed)
    }
}

/// One logical search over the synchronous search API.
///
/// Not meant to be shared between threads; start one session per search.
pub struct SearchSession {
    transport: Arc<dyn Transport>,
    search_uri: String,
    headers: HeaderMap,
    auth: AuthContext,
    retrier: Retrier,
    cancel: Option<CancelHandle>,

    session_id: Uuid,
    query: Option<Query>,
    page: u64,
    buffer: std::vec::IntoIter<LogRecord>,
    total_results: u64,
    pages_fetched: u64,
    state: SearchState,
    failure: Option<EgressError>,
}

impl SearchSession {
    pub fn new(connection: &GraylogConnection, config: SearchConfig) -> Self {
        // Each session works on its own copy of the connection's headers
        let mut headers = connection.default_headers().clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            transport: connection.transport(),
            search_uri: connection.endpoint(&format!(
                "api/views/search/sync?timeout={}",
                config.server_timeout_ms
            )),
            headers,
            auth: connection.auth().clone(),
            retrier: Retrier::new(config.retry),
            cancel: None,
            session_id: Uuid::new_v4(),
            query: None,
            page: 0,
            buffer: Vec::new().into_iter(),
            total_results: 0,
            pages_fetched: 0,
            state: SearchState::Idle,
            failure: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retrier = self.retrier.with_sleeper(sleeper);
        self
    }

    /// Replace the randomness source used for retry jitter
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.retrier = self.retrier.with_rng(rng);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.retrier = self.retrier.with_cancel(cancel.clone());
        self.cancel = Some(cancel);
        self
    }

    /// Search the last `seconds` seconds and fetch the first page.
    ///
    /// A first page that fails leaves the session [`SearchState::Failed`]
    /// with no results; it is reported, not returned as an error.
    pub fn start_relative(
        &mut self,
        seconds: u64,
        query_string: impl Into<String>,
        streams: Vec<StreamRef>,
    ) -> SearchState {
        self.begin(TimeRange::relative(seconds), query_string.into(), streams)
    }

    /// Search between two instants and fetch the first page.
    ///
    /// Fails before any request if `to` precedes `from`.
    pub fn start_absolute(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        query_string: impl Into<String>,
        streams: Vec<StreamRef>,
    ) -> Result<SearchState> {
        let timerange = TimeRange::absolute(from, to)?;
        Ok(self.begin(timerange, query_string.into(), streams))
    }

    fn begin(&mut self, timerange: TimeRange, query_string: String, streams: Vec<StreamRef>) -> SearchState {
        self.session_id = Uuid::new_v4();
        self.query = Some(Query::new(query_string, timerange, streams, 0));
        self.page = 0;
        self.buffer = Vec::new().into_iter();
        self.total_results = 0;
        self.pages_fetched = 0;
        self.failure = None;
        self.state = SearchState::Idle;

        info!(session_id = %self.session_id, "Starting search");

        let state = self.fetch_page();
        if state.is_terminal() {
            warn!(
                session_id = %self.session_id,
                ?state,
                "Search ended before returning results"
            );
        }
        state
    }

    /// Fetch the first page again and return the total the service reports.
    ///
    /// Returns 0 when the fetch fails. This rewinds the session to page 0:
    /// calling it mid-iteration restarts the page cursor.
    pub fn total_count(&mut self) -> u64 {
        if self.query.is_none() {
            return 0;
        }
        self.page = 0;
        self.failure = None;

        match self.fetch_page() {
            SearchState::Ready | SearchState::LastPage => self.total_results,
            _ => 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// The error that ended a failed search
    pub fn failure(&self) -> Option<&EgressError> {
        self.failure.as_ref()
    }

    /// Total reported by the most recent successful page, without fetching
    pub fn reported_total(&self) -> u64 {
        self.total_results
    }

    /// HTTP page fetches issued since the search started
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Index of the page the next fetch will request
    pub fn current_page(&self) -> u64 {
        self.page
    }

    /// Records left in the buffered page
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[instrument(skip(self), fields(session_id = %self.session_id, page = self.page))]
    fn fetch_page(&mut self) -> SearchState {
        let (body, query_id, search_type_id) = {
            let Some(query) = self.query.as_mut() else {
                return self.state;
            };
            query.set_page(self.page);

            if query.exceeds_result_window() {
                debug!(offset = query.offset(), "Result window limit reached, not fetching");
                self.buffer = Vec::new().into_iter();
                self.state = SearchState::Exhausted;
                return self.state;
            }

            (
                search_body(self.session_id, query),
                query.id(),
                query.search_type_id(),
            )
        };

        if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            return self.fail(EgressError::Cancelled);
        }

        self.pages_fetched += 1;
        let response = match self.post(&body) {
            Ok(response) => response,
            Err(e) => return self.fail(e),
        };

        let parsed = match SearchResponse::parse(&response.body, query_id, search_type_id) {
            Ok(parsed) => parsed,
            Err(e) => return self.fail(e.into()),
        };

        if !parsed.succeeded() {
            let description = parsed
                .error_description()
                .unwrap_or("search did not complete")
                .to_string();
            return self.fail(EgressError::SearchExecutionFailed(description));
        }

        self.total_results = parsed.total_results();
        let records = parsed.into_records();
        debug!(
            records = records.len(),
            total_results = self.total_results,
            "Fetched page"
        );
        self.buffer = records.into_iter();

        let page_end = self.page.saturating_add(1).saturating_mul(PAGE_SIZE);
        if self.total_results < page_end {
            self.state = SearchState::LastPage;
        } else {
            self.page += 1;
            self.state = SearchState::Ready;
        }
        self.state
    }

    fn post(&mut self, body: &serde_json::Value) -> Result<HttpResponse> {
        let body = serde_json::to_vec(body).map_err(grayloggin_core::Error::from)?;
        let request = HttpRequest::post(&self.search_uri)
            .with_headers(self.headers.clone())
            .with_auth(self.auth.clone())
            .with_body(body);

        self.retrier.send(self.transport.as_ref(), &request)
    }

    fn fail(&mut self, error: EgressError) -> SearchState {
        warn!(session_id = %self.session_id, error = %error, "Search failed");
        self.buffer = Vec::new().into_iter();
        self.failure = Some(error);
        self.state = SearchState::Failed;
        self.state
    }
}

impl Iterator for SearchSession {
    type Item = LogRecord;

    fn next(&mut self) -> Option<LogRecord> {
        loop {
            if let Some(record) = self.buffer.next() {
                return Some(record);
            }

            match self.state {
                SearchState::Ready => {
                    self.fetch_page();
                }
                SearchState::LastPage => {
                    self.state = SearchState::Exhausted;
                    return None;
                }
                SearchState::Idle | SearchState::Exhausted | SearchState::Failed => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::tests::RecordingSleeper;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Serves pages of a result set of `total` records, answering every
    /// search with the ids it was asked for.
    struct FakeGraylog {
        total: u64,
        outcome: Mutex<Vec<HttpResponse>>,
        requests: Mutex<Vec<Value>>,
    }

    impl FakeGraylog {
        fn with_total(total: u64) -> Self {
            Self {
                total,
                outcome: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue canned responses served before the paged ones
        fn queue(self, responses: Vec<HttpResponse>) -> Self {
            *self.outcome.lock().unwrap() = responses;
            self
        }

        fn offsets(&self) -> Vec<u64> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|body| body["queries"][0]["search_types"][0]["offset"].as_u64().unwrap())
                .collect()
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Transport for FakeGraylog {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            let body: Value = serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap();
            self.requests.lock().unwrap().push(body.clone());

            let mut queued = self.outcome.lock().unwrap();
            if !queued.is_empty() {
                return Ok(queued.remove(0));
            }

            let query = &body["queries"][0];
            let search_type = &query["search_types"][0];
            let offset = search_type["offset"].as_u64().unwrap();
            let limit = search_type["limit"].as_u64().unwrap();

            let end = (offset + limit).min(self.total);
            let messages: Vec<Value> = (offset..end.max(offset))
                .map(|n| json!({ "index": "graylog_0", "message": { "_id": n.to_string(), "seq": n } }))
                .collect();

            let payload = json!({
                "execution": { "done": true, "cancelled": false, "completed_exceptionally": false },
                "results": {
                    query["id"].as_str().unwrap(): {
                        "errors": [],
                        "search_types": {
                            search_type["id"].as_str().unwrap(): {
                                "total_results": self.total,
                                "messages": messages,
                            }
                        }
                    }
                }
            });
            Ok(HttpResponse::new(200, serde_json::to_vec(&payload).unwrap()))
        }
    }

    fn session(fake: Arc<FakeGraylog>) -> (SearchSession, Arc<RecordingSleeper>) {
        let connection = GraylogConnection::with_transport(
            "http://graylog:9000",
            AuthContext::basic("admin", "secret"),
            fake,
        );
        let sleeper = Arc::new(RecordingSleeper::default());
        let session = connection
            .search()
            .with_sleeper(sleeper.clone())
            .with_rng(StdRng::seed_from_u64(1));
        (session, sleeper)
    }

    fn seqs(records: &[LogRecord]) -> Vec<u64> {
        records.iter().map(|r| r["seq"].as_u64().unwrap()).collect()
    }

    #[test]
    fn test_idle_session_yields_nothing() {
        let fake = Arc::new(FakeGraylog::with_total(10));
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.state(), SearchState::Idle);
        assert!(session.next().is_none());
        assert_eq!(session.total_count(), 0);
        assert_eq!(fake.request_count(), 0);
    }

    #[test]
    fn test_iterates_all_pages() {
        let fake = Arc::new(FakeGraylog::with_total(137));
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.start_relative(300, "level:3", vec![]), SearchState::Ready);
        assert_eq!(session.buffered(), 50);

        let records: Vec<LogRecord> = session.by_ref().collect();
        assert_eq!(records.len(), 137);
        assert_eq!(seqs(&records), (0..137).collect::<Vec<_>>());

        assert_eq!(fake.offsets(), vec![0, 50, 100]);
        assert_eq!(session.pages_fetched(), 3);
        assert_eq!(session.current_page(), 2);
        assert_eq!(session.reported_total(), 137);
        assert_eq!(session.state(), SearchState::Exhausted);
        assert!(session.failure().is_none());
        assert!(session.next().is_none());
        assert_eq!(fake.request_count(), 3);
    }

    #[test]
    fn test_last_page_is_marked() {
        let fake = Arc::new(FakeGraylog::with_total(137));
        let (mut session, _) = session(fake.clone());
        session.start_relative(300, "", vec![]);

        let _: Vec<_> = session.by_ref().take(100).collect();
        assert_eq!(session.state(), SearchState::Ready);

        assert!(session.next().is_some());
        assert_eq!(session.state(), SearchState::LastPage);
        assert_eq!(session.buffered(), 36);
    }

    #[test]
    fn test_single_short_page() {
        let fake = Arc::new(FakeGraylog::with_total(7));
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.start_relative(60, "", vec![]), SearchState::LastPage);
        assert_eq!(session.by_ref().count(), 7);
        assert_eq!(session.state(), SearchState::Exhausted);
        assert_eq!(fake.request_count(), 1);
    }

    #[test]
    fn test_no_results() {
        let fake = Arc::new(FakeGraylog::with_total(0));
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.start_relative(60, "nothing:matches", vec![]), SearchState::LastPage);
        assert!(session.next().is_none());
        assert_eq!(session.state(), SearchState::Exhausted);
        assert!(session.failure().is_none());
    }

    #[test]
    fn test_exact_page_multiple_fetches_empty_tail() {
        let fake = Arc::new(FakeGraylog::with_total(100));
        let (mut session, _) = session(fake.clone());
        session.start_relative(60, "", vec![]);

        assert_eq!(session.by_ref().count(), 100);
        assert_eq!(fake.offsets(), vec![0, 50, 100]);
        assert_eq!(session.state(), SearchState::Exhausted);
    }

    #[test]
    fn test_result_window_short_circuits() {
        let fake = Arc::new(FakeGraylog::with_total(10_000));
        let (mut session, _) = session(fake.clone());
        session.start_relative(86_400, "", vec![]);

        assert_eq!(session.by_ref().count(), 10_000);
        assert_eq!(fake.request_count(), 200);
        assert_eq!(fake.offsets().last(), Some(&9_950));
        assert_eq!(session.current_page(), 200);
        assert_eq!(session.state(), SearchState::Exhausted);
        assert!(session.failure().is_none());
    }

    #[test]
    fn test_result_window_caps_larger_result_sets() {
        let fake = Arc::new(FakeGraylog::with_total(25_000));
        let (mut session, _) = session(fake.clone());
        session.start_relative(86_400, "", vec![]);

        assert_eq!(session.by_ref().count(), 10_000);
        assert_eq!(fake.request_count(), 200);
        assert_eq!(session.state(), SearchState::Exhausted);
    }

    #[test]
    fn test_request_shape() {
        let fake = Arc::new(FakeGraylog::with_total(1));
        let (mut session, _) = session(fake.clone());
        session.start_relative(
            900,
            "source:web01",
            vec![StreamRef::new("nginx", "s1"), StreamRef::new("haproxy", "s2")],
        );

        let requests = fake.requests.lock().unwrap();
        let body = &requests[0];
        assert_eq!(body["id"], session.session_id().to_string());

        let query = &body["queries"][0];
        assert_eq!(query["query"]["query_string"], "source:web01");
        assert_eq!(query["timerange"], json!({ "type": "relative", "from": 900 }));
        assert_eq!(query["search_types"][0]["streams"], json!(["s1", "s2"]));
        assert_eq!(query["search_types"][0]["limit"], 50);
    }

    #[test]
    fn test_ids_stable_across_pages() {
        let fake = Arc::new(FakeGraylog::with_total(120));
        let (mut session, _) = session(fake.clone());
        session.start_relative(60, "", vec![]);
        let _: Vec<_> = session.by_ref().collect();

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        for body in requests.iter() {
            assert_eq!(body["id"], requests[0]["id"]);
            assert_eq!(body["queries"][0]["id"], requests[0]["queries"][0]["id"]);
            assert_eq!(
                body["queries"][0]["search_types"][0]["id"],
                requests[0]["queries"][0]["search_types"][0]["id"]
            );
        }
    }

    #[test]
    fn test_restart_generates_new_session_id() {
        let fake = Arc::new(FakeGraylog::with_total(3));
        let (mut session, _) = session(fake.clone());

        session.start_relative(60, "a", vec![]);
        let first = session.session_id();
        let first_query = session.query().map(Query::id);
        assert_eq!(session.by_ref().count(), 3);

        session.start_relative(60, "b", vec![]);
        assert_ne!(session.session_id(), first);
        assert_ne!(session.query().map(Query::id), first_query);
        assert_eq!(session.by_ref().count(), 3);
    }

    #[test]
    fn test_start_absolute() {
        use chrono::TimeZone;

        let fake = Arc::new(FakeGraylog::with_total(60));
        let (mut session, _) = session(fake.clone());
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();

        assert_eq!(
            session.start_absolute(from, to, "", vec![]).unwrap(),
            SearchState::Ready
        );
        assert_eq!(session.by_ref().count(), 60);

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests[0]["queries"][0]["timerange"]["type"], "absolute");
        assert_eq!(
            requests[0]["queries"][0]["timerange"]["from"],
            "2024-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_start_absolute_rejects_reversed_range() {
        use chrono::TimeZone;

        let fake = Arc::new(FakeGraylog::with_total(60));
        let (mut session, _) = session(fake.clone());
        let from = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        let err = session.start_absolute(from, to, "", vec![]).unwrap_err();
        assert!(matches!(
            err,
            EgressError::Core(grayloggin_core::Error::InvalidArgument(_))
        ));
        assert_eq!(fake.request_count(), 0);
        assert_eq!(session.state(), SearchState::Idle);
    }

    #[test]
    fn test_execution_failure_is_reported() {
        let failure = json!({
            "execution": { "done": true, "cancelled": false, "completed_exceptionally": true },
            "results": {}
        });
        let fake = Arc::new(
            FakeGraylog::with_total(500)
                .queue(vec![HttpResponse::new(200, serde_json::to_vec(&failure).unwrap())]),
        );
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.start_relative(60, "status:(", vec![]), SearchState::Failed);
        assert!(session.next().is_none());
        assert!(matches!(
            session.failure(),
            Some(EgressError::SearchExecutionFailed(_))
        ));
        assert_eq!(fake.request_count(), 1);
    }

    #[test]
    fn test_execution_failure_mid_iteration_ends_sequence() {
        let fake = Arc::new(FakeGraylog::with_total(500));
        let (mut session, _) = session(fake.clone());
        session.start_relative(60, "", vec![]);

        // The next fetch sees a body with a different query id, and no execution block.
        fake.outcome
            .lock()
            .unwrap()
            .push(HttpResponse::new(200, r#"{"results": {}}"#));

        let records: Vec<_> = session.by_ref().collect();
        assert_eq!(records.len(), 50);
        assert_eq!(session.state(), SearchState::Failed);
        assert!(session.failure().is_some());
    }

    #[test]
    fn test_malformed_response_fails_session() {
        let fake = Arc::new(
            FakeGraylog::with_total(10).queue(vec![HttpResponse::new(200, "<html>oops</html>")]),
        );
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.start_relative(60, "", vec![]), SearchState::Failed);
        assert!(matches!(
            session.failure(),
            Some(EgressError::Core(grayloggin_core::Error::MalformedResponse(_)))
        ));
    }

    #[test]
    fn test_transient_errors_are_retried() {
        let fake = Arc::new(FakeGraylog::with_total(20).queue(vec![
            HttpResponse::new(503, "busy"),
            HttpResponse::new(502, "bad gateway"),
        ]));
        let (mut session, sleeper) = session(fake.clone());

        assert_eq!(session.start_relative(60, "", vec![]), SearchState::LastPage);
        assert_eq!(session.by_ref().count(), 20);
        assert_eq!(fake.request_count(), 3);
        assert_eq!(session.pages_fetched(), 1);
        assert_eq!(sleeper.sleeps.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_retry_budget_exhaustion_fails_session() {
        let fake = Arc::new(
            FakeGraylog::with_total(20).queue(vec![HttpResponse::new(500, "down"); 11]),
        );
        let (mut session, _) = session(fake.clone());

        assert_eq!(session.start_relative(60, "", vec![]), SearchState::Failed);
        assert!(session.next().is_none());
        assert!(matches!(
            session.failure(),
            Some(EgressError::RetryBudgetExhausted { attempts: 11, .. })
        ));
        assert_eq!(fake.request_count(), 11);
    }

    #[test]
    fn test_total_count_rewinds_to_first_page() {
        let fake = Arc::new(FakeGraylog::with_total(137));
        let (mut session, _) = session(fake.clone());
        session.start_relative(60, "", vec![]);
        let _: Vec<_> = session.by_ref().take(75).collect();

        assert_eq!(session.total_count(), 137);
        assert_eq!(fake.offsets(), vec![0, 50, 0]);

        let records: Vec<_> = session.by_ref().collect();
        assert_eq!(seqs(&records).first(), Some(&0));
        assert_eq!(records.len(), 137);
    }

    #[test]
    fn test_total_count_for_single_page() {
        let fake = Arc::new(FakeGraylog::with_total(12));
        let (mut session, _) = session(fake.clone());
        session.start_relative(60, "", vec![]);

        assert_eq!(session.total_count(), 12);
    }

    #[test]
    fn test_total_count_zero_on_failure() {
        let fake = Arc::new(FakeGraylog::with_total(137));
        let (mut session, _) = session(fake.clone());
        session.start_relative(60, "", vec![]);

        fake.outcome
            .lock()
            .unwrap()
            .push(HttpResponse::new(200, "not json"));
        assert_eq!(session.total_count(), 0);
        assert_eq!(session.state(), SearchState::Failed);
    }

    #[test]
    fn test_cancel_before_next_page() {
        let fake = Arc::new(FakeGraylog::with_total(500));
        let cancel = CancelHandle::new();
        let (session, _) = session(fake.clone());
        let mut session = session.with_cancel(cancel.clone());
        session.start_relative(60, "", vec![]);

        let _: Vec<_> = session.by_ref().take(50).collect();
        cancel.cancel();

        assert!(session.next().is_none());
        assert_eq!(session.state(), SearchState::Failed);
        assert!(matches!(session.failure(), Some(EgressError::Cancelled)));
        assert_eq!(fake.request_count(), 1);
    }

    #[test]
    fn test_session_headers() {
        let fake = Arc::new(FakeGraylog::with_total(0));
        let (session, _) = session(fake);

        assert_eq!(session.headers["content-type"], "application/json");
        assert_eq!(session.headers["accept"], "application/json");
        assert!(session.headers.contains_key("x-requested-by"));
        assert_eq!(
            session.search_uri,
            "http://graylog:9000/api/views/search/sync?timeout=60000"
        );
    }
}
