//! Grayloggin Egress
//!
//! This crate talks to the log-management service:
//! - HTTP transport and client configuration
//! - Retrying POST with jittered backoff
//! - Connection bootstrap and stream listing
//! - Paginated search sessions

pub mod client;
pub mod connection;
pub mod retry;
pub mod search;

pub use client::{AuthContext, HttpClientConfig, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use connection::{GraylogConnection, normalize_base_uri};
pub use retry::{CancelHandle, Retrier, RetryPolicy, Sleeper, ThreadSleeper};
pub use search::{SearchConfig, SearchSession, SearchState};

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status} from {uri}")]
    HttpStatus { status: u16, uri: String },

    #[error(
        "Ran out of retries while trying to POST to {uri} ({attempts} attempts, {retries_remaining} retries left, last sleep {sleep:?})"
    )]
    RetryBudgetExhausted {
        uri: String,
        attempts: u32,
        retries_remaining: u32,
        sleep: Duration,
    },

    #[error("Search failed: {0}")]
    SearchExecutionFailed(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Core(#[from] grayloggin_core::Error),
}

pub type Result<T> = std::result::Result<T, EgressError>;
