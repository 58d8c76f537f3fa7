//! Shared test helpers for creating ReportService instances in tests.

use crate::config::Config;
use crate::error::{Error, Result, StorageError};
use crate::messaging::{ChannelSender, OutboundMessage};
use crate::service::ReportService;
use crate::source::ReportDataSource;
use crate::storage::ArtifactStore;
use crate::types::{MovieRecord, ReportParameter, RequestId, StatusMessage, UserRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

pub(crate) fn sample_movie(id: i64) -> MovieRecord {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    MovieRecord {
        id,
        name_native: format!("Movie {id}"),
        description: "A movie".into(),
        genres: "drama".into(),
        price: Some(9.99),
        add_date: date,
        last_modified_date: date,
        rating: Some(7.5),
        review_count: 3,
    }
}

pub(crate) fn sample_user(id: i64) -> UserRecord {
    UserRecord {
        id,
        email: format!("user{id}@example.com"),
        review_count: 10 - id,
        average_rating: 8.0,
    }
}

/// In-memory data source with scripted page sizes
#[derive(Default)]
pub(crate) struct FakeSource {
    /// Number of movies returned for page N (index N - 1); missing pages are empty
    pub(crate) pages: Vec<usize>,
    pub(crate) users: Vec<UserRecord>,
    pub(crate) fail_movies: bool,
    pub(crate) users_unavailable: bool,
    pub(crate) delay: Option<Duration>,
    /// (page, page_size, parameter) of every movie fetch
    pub(crate) page_calls: Mutex<Vec<(usize, usize, ReportParameter)>>,
}

impl FakeSource {
    pub(crate) fn with_pages(pages: &[usize]) -> Self {
        Self {
            pages: pages.to_vec(),
            ..Default::default()
        }
    }

    pub(crate) async fn pages_fetched(&self) -> usize {
        self.page_calls.lock().await.len()
    }
}

#[async_trait]
impl ReportDataSource for FakeSource {
    async fn fetch_page(
        &self,
        page: usize,
        page_size: usize,
        parameter: &ReportParameter,
    ) -> Result<Vec<MovieRecord>> {
        self.page_calls
            .lock()
            .await
            .push((page, page_size, parameter.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_movies {
            return Err(Error::UpstreamStatus {
                status: 500,
                url: "http://movieland/v1/movie/report/".into(),
            });
        }
        let count = self.pages.get(page - 1).copied().unwrap_or(0);
        let first = ((page - 1) * page_size) as i64;
        Ok((0..count as i64).map(|i| sample_movie(first + i + 1)).collect())
    }

    async fn fetch_top_users(&self) -> Result<Vec<UserRecord>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.users_unavailable {
            return Err(Error::Transport("connection refused".into()));
        }
        Ok(self.users.clone())
    }
}

/// Artifact store keeping uploads in memory
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) fail: AtomicBool,
    pub(crate) uploads: Mutex<Vec<(RequestId, Vec<u8>)>>,
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn upload(&self, bytes: Vec<u8>, id: &RequestId) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                path: format!("/reports/{id}.xlsx").into(),
                source: std::io::Error::other("disk full"),
            }
            .into());
        }
        self.uploads.lock().await.push((id.clone(), bytes));
        Ok(format!("http://files.test/reports/{id}.xlsx"))
    }
}

/// Test harness around a service built from fakes
pub(crate) struct TestService {
    pub(crate) service: ReportService,
    pub(crate) source: Arc<FakeSource>,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) outbound: mpsc::Receiver<OutboundMessage>,
}

impl TestService {
    /// Receive the next status message, failing the test after two seconds
    pub(crate) async fn next_status(&mut self) -> (OutboundMessage, StatusMessage) {
        let message = tokio::time::timeout(Duration::from_secs(2), self.outbound.recv())
            .await
            .expect("timed out waiting for status message")
            .expect("outbound channel closed");
        let status = serde_json::from_slice(&message.body).unwrap();
        (message, status)
    }
}

pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.worker.pool_size = 2;
    config.worker.page_size = 50;
    config.worker.shutdown_timeout = Duration::from_secs(5);
    config
}

/// Helper to create a ReportService over a fake source, a memory store and a channel sender.
pub(crate) fn create_test_service(source: FakeSource) -> TestService {
    create_test_service_with(test_config(), source, MemoryStore::default())
}

pub(crate) fn create_test_service_with(
    config: Config,
    source: FakeSource,
    store: MemoryStore,
) -> TestService {
    let source = Arc::new(source);
    let store = Arc::new(store);
    let (sender, outbound) = ChannelSender::new(256);

    let service =
        ReportService::with_components(config, source.clone(), store.clone(), Arc::new(sender))
            .unwrap();

    TestService {
        service,
        source,
        store,
        outbound,
    }
}
