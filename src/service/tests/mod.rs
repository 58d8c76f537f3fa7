use super::test_helpers::*;
use super::*;
use crate::error::Error;
use crate::messaging::{InboundMessage, ReplyAddress};
use crate::types::{ReportRequest, ReportStatus, ReportType};
use std::time::Duration;


/// Wait for the first event matching `predicate`, failing after two seconds
async fn wait_for_event<F>(events: &mut broadcast::Receiver<Event>, mut predicate: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = events.recv().await.unwrap();
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn batch_json(requests: &[ReportRequest]) -> Vec<u8> {
    serde_json::to_vec(requests).unwrap()
}
