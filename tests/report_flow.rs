//! End-to-end report flow: inbound batch → catalogue → XLSX on disk → status replies
//!
//! The catalogue service is mocked with wiremock, artifacts land in a temporary directory and
//! the broker is replaced by the in-process channel transport.

mod common;

use common::{Harness, data_rows, mount_movie_page, worksheet_xml};
use excel_report_service::messaging::{InboundMessage, inbound_channel};
use excel_report_service::{Event, ReportStatus, StatusMessage};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_from_queue_produces_reports_and_status_replies() {
    let catalogue = MockServer::start().await;
    mount_movie_page(&catalogue, 1, 50).await;
    mount_movie_page(&catalogue, 2, 30).await;
    Mock::given(method("GET"))
        .and(path("/v1/user/top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 7, "email": "top@example.com", "reviewCount": 40, "averageRating": 7.25}
        ])))
        .mount(&catalogue)
        .await;

    let mut harness = Harness::start(&catalogue).await;
    let (inbound, stream) = inbound_channel(4);
    let consumer = harness.service.start_consumer(stream);

    let body = r#"[
        {"id": "r1", "reportType": "ALL_MOVIES", "reportFormat": "XLSX", "reportStatus": "NEW"},
        {"id": "u1", "reportType": "TOP_ACTIVE_USERS", "reportFormat": "XLSX"}
    ]"#;
    inbound
        .send(
            InboundMessage::new(body)
                .with_format("xlsx")
                .with_reply_to("reports.status"),
        )
        .await
        .unwrap();

    let mut generated = Vec::new();
    while generated.len() < 2 {
        let (message, status) = harness.next_status().await;
        assert_eq!(message.destination, "reports.status");
        assert_eq!(message.correlation_id, status.request_id.as_str());
        if status.report_status == ReportStatus::Generated {
            generated.push(status);
        }
    }
    generated.sort_by(|a, b| a.request_id.as_str().cmp(b.request_id.as_str()));

    assert_eq!(
        generated[0].artifact_url.as_deref(),
        Some("https://files.example.com/reports/r1.xlsx")
    );
    assert_eq!(
        generated[1].artifact_url.as_deref(),
        Some("https://files.example.com/reports/u1.xlsx")
    );

    let movies = worksheet_xml(&harness.storage.path().join("r1.xlsx"));
    assert_eq!(data_rows(&movies), 80);
    assert!(movies.contains("Last Modified Date"));
    assert!(movies.contains("2023-05-01 08:00:00"));

    let users = worksheet_xml(&harness.storage.path().join("u1.xlsx"));
    assert_eq!(data_rows(&users), 1);
    assert!(users.contains("top@example.com"));

    drop(inbound);
    tokio::time::timeout(Duration::from_secs(2), consumer)
        .await
        .unwrap()
        .unwrap();
    harness.service.shutdown().await.unwrap();
}

#[tokio::test]
async fn catalogue_outage_fails_movie_report_but_not_users_report() {
    let catalogue = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&catalogue)
        .await;

    let mut harness = Harness::start(&catalogue).await;
    let mut events = harness.service.subscribe();
    let body = r#"[
        {"id": "m1", "reportType": "ADDED_DURING_PERIOD",
         "reportParameter": {"fromDate": "2023-01-01T00:00:00", "toDate": "2023-12-31T23:59:59"}},
        {"id": "u1", "reportType": "TOP_ACTIVE_USERS"}
    ]"#;

    harness
        .service
        .handle_message(InboundMessage::new(body).with_format("xlsx"))
        .unwrap();

    let mut failed = None;
    let mut completed = None;
    tokio::time::timeout(Duration::from_secs(5), async {
        while failed.is_none() || completed.is_none() {
            match events.recv().await.unwrap() {
                Event::PipelineFailed { id, .. } => failed = Some(id),
                Event::PipelineCompleted { id, .. } => completed = Some(id),
                _ => {}
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(failed.unwrap().as_str(), "m1");
    assert_eq!(completed.unwrap().as_str(), "u1");
    assert!(!harness.storage.path().join("m1.xlsx").exists());
    assert_eq!(
        data_rows(&worksheet_xml(&harness.storage.path().join("u1.xlsx"))),
        0
    );

    harness.service.shutdown().await.unwrap();
    let mut m1_statuses = Vec::new();
    while let Some(message) = harness.statuses.recv().await {
        if message.correlation_id == "m1" {
            let status: StatusMessage = serde_json::from_slice(&message.body).unwrap();
            m1_statuses.push(status.report_status);
        }
    }
    assert_eq!(m1_statuses, vec![ReportStatus::InProgress]);
}

#[tokio::test]
async fn messages_for_other_formats_are_ignored() {
    let catalogue = MockServer::start().await;
    let harness = Harness::start(&catalogue).await;

    let submitted = harness
        .service
        .handle_message(
            InboundMessage::new(r#"[{"id":"c1","reportType":"ALL_MOVIES"}]"#).with_format("csv"),
        )
        .unwrap();

    assert_eq!(submitted, 0);
    assert_eq!(harness.service.in_flight(), 0);
}
