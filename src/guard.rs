//! Guarded upstream calls
//!
//! Wraps a single call to an unreliable upstream with a static fallback. A failure is
//! logged and traded for the fallback value; the caller never sees the error.
//!
//! # Example
//!
//! ```no_run
//! use excel_report_service::guard::guarded;
//! use excel_report_service::error::Error;
//!
//! # async fn example() {
//! let users: Vec<String> = guarded(
//!     || async { Err::<Vec<String>, Error>(Error::Transport("connection refused".into())) },
//!     Vec::new(),
//! )
//! .await;
//! assert!(users.is_empty());
//! # }
//! ```
//!
//! Only auxiliary data goes through here. Primary report data is fetched unguarded so a
//! failure fails the report instead of silently producing an empty one.

use std::future::Future;

/// Run `operation` once and return its value, or `fallback` if it fails
///
/// The fallback is returned unchanged; callers cannot tell "upstream returned nothing"
/// from "upstream failed" other than through the warning this logs.
pub async fn guarded<F, Fut, T, E>(operation: F, fallback: T) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match operation().await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Guarded call failed, using fallback");
            fallback
        }
    }
}
