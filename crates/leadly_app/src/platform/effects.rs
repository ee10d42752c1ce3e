use std::time::Duration;

use leadly_core::{Effect, JobState, JobStatus, Lead, Msg, ResultsSummary, SearchRequest};
use leadly_engine::{EngineEvent, EngineHandle, JobStatusKind, JobStatusPayload};
use leadly_logging::{leadly_debug, leadly_info};

const FAILED_WITHOUT_MESSAGE: &str = "Search job failed";

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitSearch {
                    generation,
                    request,
                } => {
                    leadly_info!(
                        "SubmitSearch generation={} subreddits={:?}",
                        generation,
                        request.subreddits
                    );
                    self.engine.submit_search(generation, map_request(request));
                }
                Effect::PollStatus { generation, job_id } => {
                    leadly_debug!("PollStatus generation={} job_id={}", generation, job_id);
                    self.engine.poll_status(generation, job_id);
                }
                Effect::CancelPoll { generation } => self.engine.cancel_poll(generation),
                Effect::FetchLeads { ticket } => self.engine.fetch_leads(ticket),
                Effect::FetchSubreddits => self.engine.fetch_subreddits(),
                Effect::AddSubreddit { name } => self.engine.add_subreddit(name),
                Effect::CheckHealth => self.engine.check_health(),
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SearchSubmitted { generation, result } => match result {
            Ok(accepted) => Msg::SearchAccepted {
                generation,
                job_id: accepted.job_id,
            },
            Err(err) => Msg::SearchRejected {
                generation,
                message: err.message,
            },
        },
        EngineEvent::StatusFetched { generation, result } => match result {
            Ok(payload) => Msg::StatusReceived {
                generation,
                status: map_status(payload),
            },
            Err(err) => Msg::StatusFetchFailed {
                generation,
                message: err.message,
            },
        },
        EngineEvent::LeadsFetched { ticket, result } => match result {
            Ok(leads) => Msg::LeadsLoaded {
                ticket,
                leads: leads.into_iter().map(map_lead).collect(),
            },
            Err(err) => Msg::LeadsLoadFailed {
                ticket,
                message: err.message,
            },
        },
        EngineEvent::SubredditsFetched { result } => match result {
            Ok(names) => Msg::SubredditsLoaded(names),
            Err(err) => Msg::SubredditsLoadFailed(err.message),
        },
        EngineEvent::SubredditAdded { name, result } => match result {
            Ok(()) => Msg::SubredditAdded(name),
            Err(err) => Msg::SubredditAddFailed {
                name,
                message: err.message,
            },
        },
        EngineEvent::HealthChecked { healthy } => Msg::HealthChecked { healthy },
    }
}

fn map_request(request: SearchRequest) -> leadly_engine::SearchRequest {
    leadly_engine::SearchRequest {
        subreddits: request.subreddits,
        user_query: request.user_query,
        limit_per_subreddit: request.limit_per_subreddit,
        keywords: request.keywords,
    }
}

fn map_status(payload: JobStatusPayload) -> JobStatus {
    let progress = payload.progress_percent();
    let state = match payload.status {
        JobStatusKind::Pending => JobState::Pending,
        JobStatusKind::Processing => JobState::Processing,
        JobStatusKind::Completed => JobState::Completed,
        JobStatusKind::Failed => JobState::Failed,
    };
    // The error message only accompanies failed jobs.
    let error = match state {
        JobState::Failed => Some(
            payload
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| FAILED_WITHOUT_MESSAGE.to_string()),
        ),
        _ => None,
    };
    JobStatus {
        job_id: payload.job_id,
        state,
        progress,
        results: ResultsSummary {
            posts_processed: payload.results.posts_processed,
            comments_processed: payload.results.comments_processed,
            leads_found: payload.results.leads_found,
        },
        error,
    }
}

fn map_lead(lead: leadly_engine::Lead) -> Lead {
    Lead {
        id: lead.id,
        post_id: lead.post_id,
        title: lead.title,
        post_text: lead.post_text,
        url: lead.url,
        subreddit_name: lead.subreddit_name,
        created_at: lead.created_at,
        updated_at: lead.updated_at,
    }
}
