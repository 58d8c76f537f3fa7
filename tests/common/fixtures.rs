//! Catalogue mocks and service wiring shared by the integration tests

use excel_report_service::messaging::{ChannelSender, OutboundMessage};
use excel_report_service::{Config, ReportService, StatusMessage};
use serde_json::{Value, json};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Page size used by every integration test
pub const PAGE_SIZE: usize = 50;

/// Movie as served by the catalogue service
pub fn movie_json(id: i64) -> Value {
    json!({
        "id": id,
        "nameNative": format!("Movie {id}"),
        "description": "Integration fixture",
        "genres": "drama",
        "price": 4.5,
        "addDate": "2023-05-01T08:00:00",
        "lastModifiedDate": "2023-06-01T09:15:00",
        "rating": 8.1,
        "reviewCount": 12
    })
}

/// Serve `count` movies on movie report page `page`
pub async fn mount_movie_page(server: &MockServer, page: usize, count: usize) {
    let first = ((page - 1) * PAGE_SIZE) as i64;
    let body: Vec<Value> = (0..count as i64).map(|i| movie_json(first + i + 1)).collect();

    Mock::given(method("GET"))
        .and(path("/v1/movie/report/"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Service wired to a mock catalogue, a temporary artifact directory and a channel transport
pub struct Harness {
    pub service: ReportService,
    pub statuses: mpsc::Receiver<OutboundMessage>,
    pub storage: TempDir,
}

impl Harness {
    pub async fn start(catalogue: &MockServer) -> Self {
        let storage = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.worker.pool_size = 2;
        config.worker.page_size = PAGE_SIZE;
        config.worker.shutdown_timeout = Duration::from_secs(5);
        config.data_source.base_url = catalogue.uri();
        config.data_source.timeout = Duration::from_secs(2);
        config.storage.root_dir = storage.path().to_path_buf();
        config.storage.public_base_url = "https://files.example.com/reports/".into();

        let (sender, statuses) = ChannelSender::new(64);
        let service = ReportService::new(config, Arc::new(sender)).unwrap();

        Self {
            service,
            statuses,
            storage,
        }
    }

    /// Next status message, failing after five seconds
    pub async fn next_status(&mut self) -> (OutboundMessage, StatusMessage) {
        let message = tokio::time::timeout(Duration::from_secs(5), self.statuses.recv())
            .await
            .expect("timed out waiting for status")
            .expect("status channel closed");
        let status = serde_json::from_slice(&message.body).unwrap();
        (message, status)
    }
}

/// Read the single worksheet of an XLSX file
pub fn worksheet_xml(path: &std::path::Path) -> String {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name("xl/worksheets/sheet1.xml").unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

/// Count data rows (everything below the header)
pub fn data_rows(xml: &str) -> usize {
    xml.matches("<row ").count().saturating_sub(1)
}
