use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag of one search submission; poll results carry the tag of their loop.
pub type Generation = u64;
/// Tag of one lead-list refresh.
pub type RefreshTicket = u64;

/// Body of `POST /reddit/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub subreddits: Vec<String>,
    pub user_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_per_subreddit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchAccepted {
    #[serde(default)]
    pub message: String,
    pub job_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatusKind {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ResultsPayload {
    pub posts_processed: u64,
    pub comments_processed: u64,
    pub leads_found: u64,
}

/// Body of `GET /reddit/search/{job_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobStatusPayload {
    pub job_id: String,
    pub status: JobStatusKind,
    #[serde(default)]
    pub progress: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: ResultsPayload,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatusPayload {
    /// Progress clamped into `0..=100`.
    pub fn progress_percent(&self) -> u8 {
        // Lossless after the clamp.
        self.progress.clamp(0, 100) as u8
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub post_id: String,
    pub title: String,
    #[serde(default)]
    pub post_text: Option<String>,
    pub url: String,
    pub subreddit_name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadsPayload {
    pub(crate) leads: Vec<Lead>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubredditsPayload {
    #[serde(default)]
    pub(crate) subreddits: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddSubredditBody<'a> {
    pub(crate) subreddit: &'a str,
}

/// Results reported by the engine thread, tagged with the request they answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SearchSubmitted {
        generation: Generation,
        result: Result<SearchAccepted, RequestError>,
    },
    StatusFetched {
        generation: Generation,
        result: Result<JobStatusPayload, RequestError>,
    },
    LeadsFetched {
        ticket: RefreshTicket,
        result: Result<Vec<Lead>, RequestError>,
    },
    SubredditsFetched {
        result: Result<Vec<String>, RequestError>,
    },
    SubredditAdded {
        name: String,
        result: Result<(), RequestError>,
    },
    HealthChecked {
        healthy: bool,
    },
}

/// Any transport or backend failure, with a message fit for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub kind: RequestFailure,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: RequestFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFailure {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    Decode,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::InvalidUrl => write!(f, "invalid url"),
            RequestFailure::Network => write!(f, "network error"),
            RequestFailure::Timeout => write!(f, "timeout"),
            RequestFailure::HttpStatus(code) => write!(f, "http status {code}"),
            RequestFailure::Decode => write!(f, "undecodable response"),
        }
    }
}
