//! Leadly core: pure state machine for the search form, job poller and lead
//! store, plus view-model helpers. No IO happens here; every request is
//! described as an [`Effect`] and its outcome comes back as a [`Msg`].
mod effect;
mod form;
mod lead_store;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{
    split_list, SearchForm, DEFAULT_LIMIT_PER_SUBREDDIT, DEFAULT_QUERY, DEFAULT_SUBREDDITS,
};
pub use lead_store::{LeadStore, RefreshPolicy, RefreshTicket};
pub use msg::Msg;
pub use state::{
    AppState, CoreSettings, Generation, HealthState, JobState, JobStatus, Lead, ResultsSummary,
    SearchRequest,
};
pub use update::update;
pub use view_model::{
    AppViewModel, CommunitiesView, FormView, JobStatusView, LeadsView, EMPTY_LEADS_MESSAGE,
};
