use crate::{Generation, RefreshTicket, SearchRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitSearch {
        generation: Generation,
        request: SearchRequest,
    },
    /// Wait one poll interval, then fetch the status of `job_id`.
    PollStatus {
        generation: Generation,
        job_id: String,
    },
    /// Clear the pending poll timer of a superseded loop.
    CancelPoll { generation: Generation },
    FetchLeads { ticket: RefreshTicket },
    FetchSubreddits,
    AddSubreddit { name: String },
    CheckHealth,
}
