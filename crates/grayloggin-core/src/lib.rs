//! Grayloggin Core Types
//!
//! This crate provides the data types shared by the Grayloggin search client:
//! - Time ranges and paged queries, with their wire encoding
//! - Stream references and the stream directory
//! - Search response parsing
//! - Core error types

pub mod error;
pub mod query;
pub mod response;
pub mod stream;
pub mod timerange;

pub use error::{Error, Result};
pub use query::{PAGE_SIZE, Query, RESULT_WINDOW_LIMIT, search_body};
pub use response::{ExecutionStats, LogRecord, SearchResponse};
pub use stream::{StreamDirectory, StreamRef};
pub use timerange::TimeRange;
