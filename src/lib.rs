//! # excel-report-service
//!
//! Queue-driven report worker: consumes batches of report requests, builds an XLSX workbook
//! per request from the movie catalogue, stores it and reports progress back to the submitter.
//!
//! ## Design
//!
//! - **Library-first** - transports are plugged in through [`messaging::MessageSender`] and an
//!   inbound `Stream`; an in-process channel transport ships with the crate
//! - **Bounded** - at most `worker.pool_size` reports are generated at once
//! - **Isolated** - a failing request never affects the rest of its batch
//! - **Event-driven** - local observers subscribe to [`Event`]s
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use excel_report_service::messaging::{ChannelSender, InboundMessage, inbound_channel};
//! use excel_report_service::{Config, ReportService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_json(r#"{"worker": {"pool_size": 8}}"#)?;
//!
//!     let (sender, mut statuses) = ChannelSender::new(64);
//!     let service = ReportService::new(config, Arc::new(sender))?;
//!
//!     let (inbound, stream) = inbound_channel(16);
//!     service.start_consumer(stream);
//!
//!     inbound
//!         .send(InboundMessage::new(r#"[{"id":"r1","reportType":"ALL_MOVIES"}]"#).with_format("xlsx"))
//!         .await?;
//!
//!     while let Some(status) = statuses.recv().await {
//!         println!("{}", String::from_utf8_lossy(&status.body));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Static fallback for unreliable upstream calls
pub mod guard;
/// Queue messages, transports and status publishing
pub mod messaging;
/// Report generation
pub mod report;
/// Worker service: consumer, dispatcher and pipelines
pub mod service;
/// Report data source
pub mod source;
/// Minimal XLSX writer
pub mod spreadsheet;
/// Artifact storage
pub mod storage;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result, StorageError};
pub use service::ReportService;
pub use types::{
    Event, MovieRecord, ReportFormat, ReportParameter, ReportRequest, ReportStatus, ReportType,
    RequestId, StatusMessage, UserRecord,
};

/// Run the service until a termination signal arrives, then shut it down gracefully.
///
/// - **Unix:** SIGTERM or SIGINT
/// - **Other platforms:** Ctrl+C
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use excel_report_service::messaging::{ChannelSender, inbound_channel};
/// use excel_report_service::{Config, ReportService, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let (sender, _statuses) = ChannelSender::new(64);
///     let service = ReportService::new(Config::default(), Arc::new(sender))?;
///     let (_inbound, stream) = inbound_channel(16);
///     service.start_consumer(stream);
///
///     run_with_shutdown(service).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(service: ReportService) -> Result<()> {
    wait_for_signal().await;
    service.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments; fall back to whatever is available
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Ok(mut only), Err(e)) | (Err(e), Ok(mut only)) => {
            tracing::warn!(error = %e, "Could not register all signal handlers");
            only.recv().await;
            tracing::info!("Received termination signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
    } else {
        tracing::info!("Received Ctrl+C signal");
    }
}
