use std::fmt;

use crate::form::SearchForm;
use crate::lead_store::{LeadStore, RefreshPolicy};
use crate::view_model::{AppViewModel, CommunitiesView, JobStatusView};

/// Monotonic counter identifying one search submission and its poll loop.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum JobState {
    #[default]
    Idle,
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Pending or processing: the poll loop should keep running.
    pub fn is_active(self) -> bool {
        matches!(self, JobState::Pending | JobState::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultsSummary {
    pub posts_processed: u64,
    pub comments_processed: u64,
    pub leads_found: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub job_id: String,
    pub state: JobState,
    /// Percentage in `0..=100`.
    pub progress: u8,
    pub results: ResultsSummary,
    pub error: Option<String>,
}

impl JobStatus {
    /// Status adopted right after the backend accepted a submission.
    pub fn pending(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Pending,
            progress: 0,
            results: ResultsSummary::default(),
            error: None,
        }
    }

    /// Synthetic terminal status for a submission that never produced a job id.
    pub fn submission_failed(message: impl Into<String>) -> Self {
        Self {
            job_id: String::new(),
            state: JobState::Failed,
            progress: 0,
            results: ResultsSummary::default(),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub id: i64,
    pub post_id: String,
    pub title: String,
    pub post_text: Option<String>,
    pub url: String,
    pub subreddit_name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub subreddits: Vec<String>,
    pub limit_per_subreddit: Option<u32>,
    pub keywords: Option<Vec<String>>,
    pub user_query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthState {
    #[default]
    Unknown,
    Checking,
    Healthy,
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    /// Consecutive status-fetch failures tolerated before polling is abandoned.
    /// Values below 1 behave as 1.
    pub max_poll_failures: u32,
    pub refresh_policy: RefreshPolicy,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            max_poll_failures: 1,
            refresh_policy: RefreshPolicy::LatestRequest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActivePoll {
    pub(crate) generation: Generation,
    pub(crate) job_id: String,
    pub(crate) consecutive_failures: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct CommunityConfig {
    pub(crate) names: Vec<String>,
    pub(crate) loaded: bool,
    pub(crate) loads_in_flight: usize,
    pub(crate) adds_in_flight: usize,
    pub(crate) notice: Option<String>,
    pub(crate) failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: CoreSettings,
    pub(crate) form: SearchForm,
    pub(crate) generation: Generation,
    pub(crate) job: Option<JobStatus>,
    pub(crate) poll: Option<ActivePoll>,
    pub(crate) poll_notice: Option<String>,
    pub(crate) leads: LeadStore,
    pub(crate) communities: CommunityConfig,
    pub(crate) health: HealthState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            settings,
            leads: LeadStore::new(settings.refresh_policy),
            ..Self::default()
        }
    }

    pub fn settings(&self) -> CoreSettings {
        self.settings
    }

    /// Poller state; `Idle` until a submission has been accepted or rejected.
    pub fn job_state(&self) -> JobState {
        self.job.as_ref().map_or(JobState::Idle, |job| job.state)
    }

    pub fn job(&self) -> Option<&JobStatus> {
        self.job.as_ref()
    }

    pub fn current_generation(&self) -> Generation {
        self.generation
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    pub fn leads(&self) -> &LeadStore {
        &self.leads
    }

    /// True while any request issued by this state is still unresolved.
    pub fn is_busy(&self) -> bool {
        self.form.submitting
            || self.poll.is_some()
            || self.leads.is_loading()
            || self.communities.loads_in_flight > 0
            || self.communities.adds_in_flight > 0
            || self.health == HealthState::Checking
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            form: self.form.view(),
            job: self.job.as_ref().map(JobStatusView::from_status),
            poll_notice: self.poll_notice.clone(),
            leads: self.leads.view(),
            communities: CommunitiesView {
                names: self.communities.names.clone(),
                loaded: self.communities.loaded,
                loading: self.communities.loads_in_flight > 0,
                notice: self.communities.notice.clone(),
                failed: self.communities.failed,
            },
            health: self.health,
            busy: self.is_busy(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
