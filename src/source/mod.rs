//! Report data source -- where movie and user rows come from.
//!
//! - [`ReportDataSource`] - the interface report generation consumes
//! - [`MovielandClient`] - HTTP implementation against the movie catalogue service

mod client;


pub use client::MovielandClient;

use async_trait::async_trait;

use crate::types::{MovieRecord, ReportParameter, UserRecord};

/// Abstraction over the remote catalogue, enabling testability.
#[async_trait]
pub trait ReportDataSource: Send + Sync {
    /// Fetch one page of movies (pages are numbered from 1)
    ///
    /// A page shorter than `page_size` is the last one.
    async fn fetch_page(
        &self,
        page: usize,
        page_size: usize,
        parameter: &ReportParameter,
    ) -> crate::Result<Vec<MovieRecord>>;

    /// Fetch the most active users in a single bounded request
    async fn fetch_top_users(&self) -> crate::Result<Vec<UserRecord>>;
}
