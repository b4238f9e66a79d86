//! Unified error types for the Hotel Analytics MCP Server.

use reqwest::StatusCode;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised at the query catalog boundary, before anything is sent.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid variables for {operation}: {source}")]
    InvalidVariables {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid date '{value}' for {field}, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Failures of a single GraphQL request/response cycle.
///
/// Every variant is a transport-level failure from the caller's point of
/// view: the view that triggered the fetch ends up in its error state.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("GraphQL error: {}", messages.join("; "))]
    GraphQL { messages: Vec<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Response carried no data")]
    MissingData,

    #[error("Failed to create HTTP client: {0}")]
    HttpClientInit(String),
}
