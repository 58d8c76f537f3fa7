//! Error types for excel-report-service
//!
//! Every fault a report request can run into maps to one variant of [`Error`]:
//! - decode faults are raised by the queue consumer before anything is dispatched
//! - unsupported report types, upstream-data faults and storage faults fail a single pipeline
//! - upstream-auxiliary faults never surface here, they are masked by [`crate::guard::guarded`]

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ReportStatus;

/// Result type alias for excel-report-service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for excel-report-service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "worker.page_size")
        key: Option<String>,
    },

    /// Inbound batch could not be decoded
    #[error("malformed report batch: {0}")]
    Decode(#[source] serde_json::Error),

    /// Report type has no handler
    #[error("report type {0} unsupported")]
    UnsupportedReportType(String),

    /// Report data source could not be reached or returned an undecodable body
    #[error("upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Report data source answered with a non-success status
    #[error("upstream returned status {status} for {url}")]
    UpstreamStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Artifact upload failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Workbook could not be assembled
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] zip::result::ZipError),

    /// Outbound message could not be handed to the transport
    #[error("transport error: {0}")]
    Transport(String),

    /// Attempted status change that would move a request backwards
    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Status the request is currently in
        from: ReportStatus,
        /// Status that was requested
        to: ReportStatus,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new batches
    #[error("shutdown in progress: not accepting new report batches")]
    ShuttingDown,
}

impl Error {
    /// Whether the error came from the remote report data source.
    ///
    /// Logged as the `upstream` field when a pipeline fails.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::UpstreamStatus { .. })
    }
}

/// Artifact storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Artifact id cannot be used as a file name
    #[error("invalid artifact id {0:?}")]
    InvalidId(String),

    /// Writing the artifact failed
    #[error("failed to write artifact {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Public URL could not be built for the stored artifact
    #[error("failed to build artifact url: {0}")]
    Url(#[from] url::ParseError),
}
