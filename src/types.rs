//! Core types for excel-report-service

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier of a report request
///
/// Used as the correlation id of every status message and as the artifact file name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new RequestId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of report to produce
///
/// Unknown wire values decode into [`ReportType::Unsupported`] so that a batch carrying one
/// still decodes; the request then fails inside its own pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportType {
    /// Movies added within the requested period
    AddedDuringPeriod,
    /// The whole movie catalogue
    AllMovies,
    /// Users ranked by review activity
    TopActiveUsers,
    /// Any value this service has no handler for
    Unsupported(String),
}

impl ReportType {
    /// Wire name of the report type
    pub fn as_str(&self) -> &str {
        match self {
            ReportType::AddedDuringPeriod => "ADDED_DURING_PERIOD",
            ReportType::AllMovies => "ALL_MOVIES",
            ReportType::TopActiveUsers => "TOP_ACTIVE_USERS",
            ReportType::Unsupported(raw) => raw,
        }
    }

    /// Human readable title, used as the worksheet name
    pub fn title(&self) -> &str {
        match self {
            ReportType::AddedDuringPeriod => "Added During Period",
            ReportType::AllMovies => "All Movies",
            ReportType::TopActiveUsers => "Top Active Users",
            ReportType::Unsupported(raw) => raw,
        }
    }
}

impl From<String> for ReportType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ADDED_DURING_PERIOD" => ReportType::AddedDuringPeriod,
            "ALL_MOVIES" => ReportType::AllMovies,
            "TOP_ACTIVE_USERS" => ReportType::TopActiveUsers,
            _ => ReportType::Unsupported(raw),
        }
    }
}

impl From<ReportType> for String {
    fn from(report_type: ReportType) -> Self {
        match report_type {
            ReportType::Unsupported(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact format
///
/// Written as its uppercase wire name; read back ignoring case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ReportFormat {
    /// Office Open XML workbook
    #[default]
    Xlsx,
}

impl ReportFormat {
    /// Lowercase name, also used as the queue selector value and file extension
    pub fn name(&self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
        }
    }

    /// Look up a format by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        [ReportFormat::Xlsx]
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<String> for ReportFormat {
    type Error = String;

    fn try_from(name: String) -> std::result::Result<Self, Self::Error> {
        Self::from_name(&name).ok_or_else(|| format!("unknown report format {:?}", name))
    }
}

/// Optional time range restricting movie reports
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParameter {
    /// Inclusive lower bound (unbounded if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDateTime>,
    /// Inclusive upper bound (unbounded if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDateTime>,
}

/// Report processing status
///
/// Ordered: a request only ever moves forward through these states.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    /// Submitted, not yet picked up
    #[default]
    New,
    /// Picked up by a pipeline
    InProgress,
    /// Artifact uploaded
    Generated,
}

/// One report job as delivered by the queue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Correlation key, immutable
    pub id: RequestId,
    /// Which report to build
    pub report_type: ReportType,
    /// Artifact format
    #[serde(default)]
    pub report_format: ReportFormat,
    /// Time range for movie reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_parameter: Option<ReportParameter>,
    /// Current status
    #[serde(default)]
    pub report_status: ReportStatus,
    /// Download link, present once generated
    #[serde(default, alias = "ftpUrl", skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
}

impl ReportRequest {
    /// Create a new request in the `New` state
    pub fn new(id: impl Into<RequestId>, report_type: ReportType) -> Self {
        Self {
            id: id.into(),
            report_type,
            report_format: ReportFormat::Xlsx,
            report_parameter: None,
            report_status: ReportStatus::New,
            artifact_url: None,
        }
    }

    /// Set the time range
    pub fn with_parameter(mut self, parameter: ReportParameter) -> Self {
        self.report_parameter = Some(parameter);
        self
    }

    /// Move the request to `InProgress`
    pub fn mark_in_progress(&mut self) -> Result<()> {
        self.advance(ReportStatus::InProgress)
    }

    /// Move the request to `Generated` and attach the artifact URL
    pub fn mark_generated(&mut self, artifact_url: String) -> Result<()> {
        self.advance(ReportStatus::Generated)?;
        self.artifact_url = Some(artifact_url);
        Ok(())
    }

    fn advance(&mut self, to: ReportStatus) -> Result<()> {
        if to <= self.report_status {
            return Err(Error::InvalidTransition {
                from: self.report_status,
                to,
            });
        }
        self.report_status = to;
        Ok(())
    }

    /// Snapshot of the request as a status message
    pub fn status_message(&self) -> StatusMessage {
        StatusMessage {
            request_id: self.id.clone(),
            report_status: self.report_status,
            artifact_url: self.artifact_url.clone(),
        }
    }
}

/// Status update sent back to the submitter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    /// Originating request
    pub request_id: RequestId,
    /// Status at the time the message was built
    pub report_status: ReportStatus,
    /// Download link, only on `Generated`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,
}

/// Movie row returned by the report data source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    /// Movie id
    pub id: i64,
    /// Title in the original language
    pub name_native: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Comma separated genre names
    #[serde(default)]
    pub genres: String,
    /// Price, if set
    #[serde(default)]
    pub price: Option<f64>,
    /// When the movie was added
    pub add_date: NaiveDateTime,
    /// When the movie was last modified
    pub last_modified_date: NaiveDateTime,
    /// Average rating, if rated
    #[serde(default)]
    pub rating: Option<f64>,
    /// Number of reviews
    #[serde(default)]
    pub review_count: i64,
}

/// User row returned by the report data source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User id
    pub id: i64,
    /// Email address
    pub email: String,
    /// Number of reviews written
    #[serde(default)]
    pub review_count: i64,
    /// Average rating given
    #[serde(default)]
    pub average_rating: f64,
}

/// Event emitted for local observers
///
/// Events never leave the process; status updates for submitters go through
/// [`crate::messaging::StatusPublisher`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A batch was decoded and is being dispatched
    BatchReceived {
        /// Number of requests in the batch
        size: usize,
    },

    /// An inbound message was dropped before dispatch
    MessageRejected {
        /// Why the message was dropped
        reason: String,
    },

    /// A pipeline acquired a worker and started
    PipelineStarted {
        /// Request being processed
        id: RequestId,
    },

    /// A status message was delivered to the transport
    StatusPublished {
        /// Request the status belongs to
        id: RequestId,
        /// Published status
        status: ReportStatus,
    },

    /// A pipeline finished and its artifact is available
    PipelineCompleted {
        /// Request that completed
        id: RequestId,
        /// Artifact URL
        url: String,
    },

    /// A pipeline stopped on an error; no further status is published for it
    PipelineFailed {
        /// Request that failed
        id: RequestId,
        /// Error message
        error: String,
    },

    /// A status message could not be delivered
    PublishFailed {
        /// Request the status belongs to
        id: RequestId,
        /// Error message
        error: String,
    },

    /// Service is shutting down
    Shutdown,
}
