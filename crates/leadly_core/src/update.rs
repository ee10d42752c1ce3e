use leadly_logging::{leadly_debug, leadly_info, leadly_warn};

use crate::state::ActivePoll;
use crate::{AppState, Effect, Generation, HealthState, JobState, JobStatus, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubredditsChanged(raw) => {
            state.form.subreddits = raw;
            state.mark_dirty();
            Vec::new()
        }
        Msg::QueryChanged(raw) => {
            state.form.query = raw;
            state.mark_dirty();
            Vec::new()
        }
        Msg::KeywordsChanged(raw) => {
            state.form.keywords = raw;
            state.mark_dirty();
            Vec::new()
        }
        Msg::LimitChanged(limit) => {
            state.form.limit_per_subreddit = limit;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchSubmitted => submit_search(&mut state),
        Msg::SearchAccepted { generation, job_id } => {
            if !settle_submission(&mut state, generation) {
                return (state, Vec::new());
            }
            leadly_info!("Job {} accepted (generation {})", job_id, generation);
            state.job = Some(JobStatus::pending(job_id.clone()));
            state.poll = Some(ActivePoll {
                generation,
                job_id: job_id.clone(),
                consecutive_failures: 0,
            });
            state.mark_dirty();
            vec![Effect::PollStatus { generation, job_id }]
        }
        Msg::SearchRejected {
            generation,
            message,
        } => {
            if !settle_submission(&mut state, generation) {
                return (state, Vec::new());
            }
            leadly_warn!("Search submission failed: {}", message);
            state.job = Some(JobStatus::submission_failed(message));
            state.mark_dirty();
            Vec::new()
        }
        Msg::StatusReceived { generation, status } => apply_status(&mut state, generation, status),
        Msg::StatusFetchFailed {
            generation,
            message,
        } => apply_poll_failure(&mut state, generation, message),
        Msg::RefreshLeadsClicked => {
            let ticket = state.leads.begin_refresh();
            state.mark_dirty();
            vec![Effect::FetchLeads { ticket }]
        }
        Msg::LeadsLoaded { ticket, leads } => {
            let count = leads.len();
            if state.leads.apply_loaded(ticket, leads) {
                leadly_debug!("Applied {} leads from ticket {}", count, ticket);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::LeadsLoadFailed { ticket, message } => {
            leadly_warn!("Lead refresh {} failed: {}", ticket, message);
            state.leads.apply_failed(ticket, message);
            state.mark_dirty();
            Vec::new()
        }
        Msg::LoadSubredditsRequested => request_subreddits(&mut state),
        Msg::SubredditsLoaded(names) => {
            let config = &mut state.communities;
            config.loads_in_flight = config.loads_in_flight.saturating_sub(1);
            config.names = names;
            config.loaded = true;
            if !config
                .notice
                .as_deref()
                .is_some_and(|notice| notice.starts_with("Added "))
            {
                config.notice = None;
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubredditsLoadFailed(message) => {
            leadly_warn!("Loading configured subreddits failed: {}", message);
            let config = &mut state.communities;
            config.loads_in_flight = config.loads_in_flight.saturating_sub(1);
            config.notice = Some(format!("Could not load subreddits: {message}"));
            config.failed = true;
            state.mark_dirty();
            Vec::new()
        }
        Msg::AddSubredditRequested(raw) => {
            let name = raw.trim();
            if name.is_empty() {
                return (state, Vec::new());
            }
            state.communities.adds_in_flight += 1;
            state.communities.notice = None;
            state.communities.failed = false;
            state.mark_dirty();
            vec![Effect::AddSubreddit {
                name: name.to_string(),
            }]
        }
        Msg::SubredditAdded(name) => {
            let config = &mut state.communities;
            config.adds_in_flight = config.adds_in_flight.saturating_sub(1);
            config.notice = Some(format!("Added r/{name}"));
            request_subreddits(&mut state)
        }
        Msg::SubredditAddFailed { name, message } => {
            leadly_warn!("Adding subreddit {} failed: {}", name, message);
            let config = &mut state.communities;
            config.adds_in_flight = config.adds_in_flight.saturating_sub(1);
            config.notice = Some(format!("Could not add r/{name}: {message}"));
            config.failed = true;
            state.mark_dirty();
            Vec::new()
        }
        Msg::HealthCheckRequested => {
            if state.health == HealthState::Checking {
                return (state, Vec::new());
            }
            state.health = HealthState::Checking;
            state.mark_dirty();
            vec![Effect::CheckHealth]
        }
        Msg::HealthChecked { healthy } => {
            state.health = if healthy {
                HealthState::Healthy
            } else {
                HealthState::Unreachable
            };
            state.mark_dirty();
            Vec::new()
        }
    };

    (state, effects)
}

fn submit_search(state: &mut AppState) -> Vec<Effect> {
    // The form stays disabled until the previous submission resolves.
    if state.form.submitting {
        leadly_debug!("Ignoring submit while a submission is outstanding");
        return Vec::new();
    }

    let request = state.form.build_request();
    let superseded = state.poll.take();

    state.generation += 1;
    let generation = state.generation;
    state.form.submitting = true;
    state.job = None;
    state.poll_notice = None;
    state.mark_dirty();

    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = superseded {
        leadly_info!(
            "Cancelling poll loop of job {} (generation {})",
            previous.job_id,
            previous.generation
        );
        effects.push(Effect::CancelPoll {
            generation: previous.generation,
        });
    }
    effects.push(Effect::SubmitSearch {
        generation,
        request,
    });
    effects
}

/// Re-enables the form if `generation` is the outstanding submission.
fn settle_submission(state: &mut AppState, generation: Generation) -> bool {
    if generation != state.generation || !state.form.submitting {
        leadly_debug!(
            "Discarding submission result of generation {} (current {})",
            generation,
            state.generation
        );
        return false;
    }
    state.form.submitting = false;
    true
}

fn active_poll(state: &mut AppState, generation: Generation) -> Option<&mut ActivePoll> {
    match state.poll.as_mut() {
        Some(poll) if poll.generation == generation => Some(poll),
        _ => {
            leadly_debug!("Discarding poll result of superseded generation {}", generation);
            None
        }
    }
}

fn apply_status(state: &mut AppState, generation: Generation, status: JobStatus) -> Vec<Effect> {
    let Some(poll) = active_poll(state, generation) else {
        return Vec::new();
    };
    if status.job_id != poll.job_id {
        leadly_warn!(
            "Discarding status of job {} while polling {}",
            status.job_id,
            poll.job_id
        );
        let job_id = poll.job_id.clone();
        return vec![Effect::PollStatus { generation, job_id }];
    }
    poll.consecutive_failures = 0;
    let job_id = poll.job_id.clone();

    let previous = state.job_state();
    let mut status = status;
    if status.state < previous {
        // Forward-only: a stale `pending` after `processing` keeps `processing`.
        leadly_warn!(
            "Job {} reported {} after {}; keeping {}",
            job_id,
            status.state,
            previous,
            previous
        );
        status.state = previous;
    }
    if let Some(current) = state.job.as_ref() {
        if status.progress < current.progress {
            leadly_warn!(
                "Job {} progress went from {} to {}",
                job_id,
                current.progress,
                status.progress
            );
        }
    }

    let next = status.state;
    state.job = Some(status);
    state.mark_dirty();

    match next {
        JobState::Completed => {
            state.poll = None;
            let ticket = state.leads.begin_refresh();
            leadly_info!("Job {} completed; refreshing leads (ticket {})", job_id, ticket);
            vec![Effect::FetchLeads { ticket }]
        }
        JobState::Failed => {
            state.poll = None;
            leadly_info!("Job {} failed", job_id);
            Vec::new()
        }
        JobState::Idle | JobState::Pending | JobState::Processing => {
            vec![Effect::PollStatus { generation, job_id }]
        }
    }
}

fn apply_poll_failure(
    state: &mut AppState,
    generation: Generation,
    message: String,
) -> Vec<Effect> {
    let max_failures = state.settings().max_poll_failures.max(1);
    let Some(poll) = active_poll(state, generation) else {
        return Vec::new();
    };
    poll.consecutive_failures += 1;
    let failures = poll.consecutive_failures;
    let job_id = poll.job_id.clone();

    if failures < max_failures {
        leadly_warn!(
            "Status check {}/{} for job {} failed: {}",
            failures,
            max_failures,
            job_id,
            message
        );
        return vec![Effect::PollStatus { generation, job_id }];
    }

    leadly_warn!(
        "Abandoning status polling for job {} after {} failure(s): {}",
        job_id,
        failures,
        message
    );
    state.poll = None;
    state.poll_notice = Some(format!(
        "Status updates stopped after {failures} failed attempt(s): {message}"
    ));
    state.mark_dirty();
    Vec::new()
}

fn request_subreddits(state: &mut AppState) -> Vec<Effect> {
    state.communities.loads_in_flight += 1;
    state.communities.failed = false;
    state.mark_dirty();
    vec![Effect::FetchSubreddits]
}
