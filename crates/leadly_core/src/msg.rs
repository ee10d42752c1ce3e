use crate::{Generation, JobStatus, Lead, RefreshTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the comma-separated subreddit field.
    SubredditsChanged(String),
    /// User edited the service description.
    QueryChanged(String),
    /// User edited the comma-separated keyword field.
    KeywordsChanged(String),
    /// User changed the per-subreddit result cap.
    LimitChanged(Option<u32>),
    /// User submitted the search form.
    SearchSubmitted,
    /// Backend accepted the submission of `generation`.
    SearchAccepted {
        generation: Generation,
        job_id: String,
    },
    /// Submission of `generation` failed before a job id existed.
    SearchRejected {
        generation: Generation,
        message: String,
    },
    /// A status poll of `generation` answered.
    StatusReceived {
        generation: Generation,
        status: JobStatus,
    },
    /// A status poll of `generation` failed at the transport level.
    StatusFetchFailed {
        generation: Generation,
        message: String,
    },
    /// User asked for a fresh lead list.
    RefreshLeadsClicked,
    LeadsLoaded {
        ticket: RefreshTicket,
        leads: Vec<Lead>,
    },
    LeadsLoadFailed {
        ticket: RefreshTicket,
        message: String,
    },
    /// User asked for the configured subreddit list.
    LoadSubredditsRequested,
    SubredditsLoaded(Vec<String>),
    SubredditsLoadFailed(String),
    /// User asked to add a subreddit to the backend configuration.
    AddSubredditRequested(String),
    SubredditAdded(String),
    SubredditAddFailed {
        name: String,
        message: String,
    },
    HealthCheckRequested,
    HealthChecked { healthy: bool },
}
