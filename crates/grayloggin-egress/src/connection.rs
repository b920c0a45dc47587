//! Connection bootstrap: endpoint, credentials, default headers, stream listing

use crate::client::{AuthContext, HttpClientConfig, HttpRequest, ReqwestTransport, Transport};
use crate::search::{SearchConfig, SearchSession};
use crate::{EgressError, Result};
use grayloggin_core::StreamDirectory;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Value of the client-identifier header sent with every request
pub const CLIENT_ID: &str = concat!("Grayloggin v", env!("CARGO_PKG_VERSION"));

/// Normalize an API endpoint: ensure a scheme (default `http://`) and a trailing `/`.
pub fn normalize_base_uri(raw: &str) -> String {
    let raw = raw.trim();
    let mut uri = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}

/// An installation of the service the client is connected to.
///
/// Holds the normalized base URI, credentials and default headers. All of
/// these are read-only once built and shared by every search started from
/// the connection.
#[derive(Clone)]
pub struct GraylogConnection {
    base_uri: String,
    auth: AuthContext,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl GraylogConnection {
    /// Connect using a reqwest client built from `config`
    pub fn new(base_uri: &str, auth: AuthContext, config: &HttpClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::from_config(config)?;
        Ok(Self::with_transport(base_uri, auth, Arc::new(transport)))
    }

    /// Connect over an existing transport
    pub fn with_transport(base_uri: &str, auth: AuthContext, transport: Arc<dyn Transport>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-requested-by"),
            HeaderValue::from_static(CLIENT_ID),
        );

        Self {
            base_uri: normalize_base_uri(base_uri),
            auth,
            headers,
            transport,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Resolve an API path against the base URI
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_uri, path.trim_start_matches('/'))
    }

    /// Fetch the enabled streams, keyed by title
    #[instrument(skip(self), fields(base_uri = %self.base_uri))]
    pub fn streams(&self) -> Result<StreamDirectory> {
        let uri = self.endpoint("api/streams/enabled");
        let request = HttpRequest::get(&uri)
            .with_headers(self.headers.clone())
            .with_auth(self.auth.clone());

        let response = self.transport.execute(&request)?;
        if !response.is_success() {
            return Err(EgressError::HttpStatus {
                status: response.status,
                uri,
            });
        }

        let directory = StreamDirectory::from_listing(&response.body)?;
        debug!(streams = directory.len(), "Fetched stream directory");
        Ok(directory)
    }

    /// Start a search session with default settings
    pub fn search(&self) -> SearchSession {
        self.search_with(SearchConfig::default())
    }

    pub fn search_with(&self, config: SearchConfig) -> SearchSession {
        SearchSession::new(self, config)
    }
}
