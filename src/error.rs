use std::{io, path::PathBuf};

use hyper::StatusCode;
use thiserror::Error;

use crate::client::ServiceResponse;

/// Failure of a single request against the statistics service.
/// One attempt, fail-fast; there is no retry policy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("group id must be a positive integer")]
    InvalidGroupId,
    #[error("failed to serialize request body")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build request for {url}")]
    Request {
        url: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("no response from {url} within {seconds}s")]
    TimedOut { url: String, seconds: u64 },
    #[error("failed to reach the statistics service at {url}")]
    Transport {
        url: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },
    #[error("request to {url} failed with status {status}{response}")]
    Status {
        url: String,
        status: StatusCode,
        response: ServiceResponse,
    },
    #[error("failed to collect response body from {url}")]
    Body {
        url: String,
        #[source]
        source: hyper::Error,
    },
    #[error("failed to deserialize response from {url}: {text}")]
    Decode {
        url: String,
        text: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while persisting a snapshot file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to format snapshot timestamp")]
    Timestamp(#[from] time::error::Format),
    #[error("failed to serialize snapshot")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write snapshot to {}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
