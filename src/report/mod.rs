//! Report generation -- turns a request into workbook bytes.
//!
//! - [`layout`] - column layout per report type
//!
//! Movie reports page through the data source until a short page comes back. The top users
//! report is a single guarded fetch: if the data source is unavailable the report is still
//! produced, with the header row only.

mod layout;


pub use layout::{MOVIE_HEADERS, USER_HEADERS};

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::guard::guarded;
use crate::source::ReportDataSource;
use crate::spreadsheet::{self, Sheet};
use crate::types::{MovieRecord, ReportParameter, ReportRequest, ReportType};

/// Builds report artifacts from data source records
pub struct ReportBuilder {
    source: Arc<dyn ReportDataSource>,
    page_size: usize,
    date_format: String,
}

impl ReportBuilder {
    /// Create a builder over `source`
    ///
    /// `page_size` must be at least 1; [`crate::Config::validate`] enforces this.
    pub fn new(source: Arc<dyn ReportDataSource>, page_size: usize, date_format: String) -> Self {
        Self {
            source,
            page_size,
            date_format,
        }
    }

    /// Produce the workbook for `request`
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedReportType`] if the report type has no handler
    /// - upstream errors from the movie fetch (the top users fetch never fails)
    /// - spreadsheet errors if the workbook cannot be assembled
    pub async fn generate(&self, request: &ReportRequest) -> Result<Vec<u8>> {
        tracing::info!(request_id = %request.id, report_type = %request.report_type, "Start generating report");

        let sheet = self.build_sheet(request).await?;
        let rows = sheet.rows.len();

        let bytes = tokio::task::spawn_blocking(move || spreadsheet::write_workbook(&sheet))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("workbook task failed: {}", e))))??;

        tracing::info!(
            request_id = %request.id,
            rows,
            size_bytes = bytes.len(),
            "Finish generating report"
        );
        Ok(bytes)
    }

    async fn build_sheet(&self, request: &ReportRequest) -> Result<Sheet> {
        match &request.report_type {
            ReportType::AddedDuringPeriod | ReportType::AllMovies => {
                let parameter = request.report_parameter.clone().unwrap_or_default();
                let movies = self.fetch_all_movies(&parameter).await?;
                layout::movie_sheet(request.report_type.title(), &movies, &self.date_format)
            }
            ReportType::TopActiveUsers => {
                let users = guarded(|| self.source.fetch_top_users(), Vec::new()).await;
                Ok(layout::user_sheet(request.report_type.title(), &users))
            }
            ReportType::Unsupported(raw) => Err(Error::UnsupportedReportType(raw.clone())),
        }
    }

    /// Fetch every movie page for `parameter`
    ///
    /// Stops after the first page holding fewer than `page_size` records; that page's records
    /// are kept.
    pub async fn fetch_all_movies(&self, parameter: &ReportParameter) -> Result<Vec<MovieRecord>> {
        let mut movies = Vec::new();
        let mut page = 1;

        loop {
            let batch = self
                .source
                .fetch_page(page, self.page_size, parameter)
                .await?;
            let is_last = batch.len() < self.page_size;
            movies.extend(batch);
            if is_last {
                break;
            }
            page += 1;
        }

        tracing::debug!(pages = page, records = movies.len(), "Movie pages fetched");
        Ok(movies)
    }
}
