use crate::{HealthState, JobState, JobStatus, Lead, ResultsSummary};

pub const EMPTY_LEADS_MESSAGE: &str = "No leads found yet. Run a search to find potential leads.";

const SHORT_JOB_ID_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub form: FormView,
    pub job: Option<JobStatusView>,
    /// Set when status polling was abandoned after transport failures.
    pub poll_notice: Option<String>,
    pub leads: LeadsView,
    pub communities: CommunitiesView,
    pub health: HealthState,
    pub busy: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormView {
    pub subreddits: String,
    pub query: String,
    pub keywords: String,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusView {
    pub job_id: String,
    pub short_job_id: String,
    pub state: JobState,
    pub progress: u8,
    /// Hidden for failed jobs.
    pub show_progress: bool,
    /// Counters are shown once the job completed.
    pub results: Option<ResultsSummary>,
    pub error: Option<String>,
}

impl JobStatusView {
    pub(crate) fn from_status(status: &JobStatus) -> Self {
        let short_job_id: String = status.job_id.chars().take(SHORT_JOB_ID_LEN).collect();
        Self {
            job_id: status.job_id.clone(),
            short_job_id,
            state: status.state,
            progress: status.progress,
            show_progress: status.state != JobState::Failed,
            results: (status.state == JobState::Completed).then_some(status.results),
            error: status.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadsView {
    pub items: Vec<Lead>,
    /// At least one refresh has been applied.
    pub loaded: bool,
    pub loading: bool,
    pub notice: Option<String>,
}

impl LeadsView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommunitiesView {
    pub names: Vec<String>,
    pub loaded: bool,
    pub loading: bool,
    pub notice: Option<String>,
    /// The last load or add request failed.
    pub failed: bool,
}
