use std::sync::Once;

use leadly_core::{
    update, AppState, CoreSettings, Effect, JobState, JobStatus, Lead, Msg, RefreshPolicy,
    ResultsSummary,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(leadly_logging::initialize_for_tests);
}

fn status(job_id: &str, state: JobState, progress: u8) -> JobStatus {
    JobStatus {
        job_id: job_id.to_string(),
        state,
        progress,
        results: ResultsSummary::default(),
        error: None,
    }
}

fn submit(state: AppState, subreddits: &str, query: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::SubredditsChanged(subreddits.to_string()));
    let (state, _) = update(state, Msg::QueryChanged(query.to_string()));
    update(state, Msg::SearchSubmitted)
}

/// Submits and accepts a search, returning the state with an active poll loop.
fn accepted(state: AppState, job_id: &str) -> AppState {
    let (state, _) = submit(state, "forhire", "test");
    let generation = state.current_generation();
    let (state, _) = update(
        state,
        Msg::SearchAccepted {
            generation,
            job_id: job_id.to_string(),
        },
    );
    state
}

fn lead(id: i64, title: &str) -> Lead {
    Lead {
        id,
        post_id: format!("t3_{id}"),
        title: title.to_string(),
        post_text: None,
        url: format!("https://reddit.com/{id}"),
        subreddit_name: "forhire".to_string(),
        created_at: "2024-05-01T10:00:00".to_string(),
        updated_at: "2024-05-01T10:00:00".to_string(),
    }
}

fn count_polls(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::PollStatus { .. }))
        .count()
}

#[test]
fn scenario_submit_poll_complete_refreshes_once() {
    init_logging();
    let (state, effects) = submit(AppState::new(), "forhire", "test");
    assert_eq!(state.job_state(), JobState::Idle);
    assert!(!state.view().form.submit_enabled);

    let request = match &effects[..] {
        [Effect::SubmitSearch { generation: 1, request }] => request.clone(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(request.subreddits, vec!["forhire"]);
    assert_eq!(request.user_query, "test");

    let (state, effects) = update(
        state,
        Msg::SearchAccepted {
            generation: 1,
            job_id: "abc123".to_string(),
        },
    );
    let view = state.view();
    let job = view.job.expect("job status");
    assert_eq!(job.state, JobState::Pending);
    assert_eq!(job.progress, 0);
    assert!(view.form.submit_enabled);
    assert_eq!(
        effects,
        vec![Effect::PollStatus {
            generation: 1,
            job_id: "abc123".to_string(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("abc123", JobState::Processing, 50),
        },
    );
    assert_eq!(state.view().job.unwrap().progress, 50);
    assert_eq!(count_polls(&effects), 1);

    let completed = JobStatus {
        results: ResultsSummary {
            posts_processed: 20,
            comments_processed: 5,
            leads_found: 3,
        },
        ..status("abc123", JobState::Completed, 100)
    };
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: completed,
        },
    );
    assert_eq!(effects, vec![Effect::FetchLeads { ticket: 1 }]);
    assert!(!state.is_polling());
    let job = state.view().job.unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(
        job.results,
        Some(ResultsSummary {
            posts_processed: 20,
            comments_processed: 5,
            leads_found: 3,
        })
    );
}

#[test]
fn failed_job_triggers_no_refresh_and_stops_polling() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let failed = JobStatus {
        error: Some("reddit unavailable".to_string()),
        ..status("job-1", JobState::Failed, 30)
    };
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: failed,
        },
    );

    assert!(effects.is_empty());
    assert!(!state.is_polling());
    let job = state.view().job.unwrap();
    assert_eq!(job.error.as_deref(), Some("reddit unavailable"));
    assert!(!job.show_progress);
    assert_eq!(job.results, None);
}

#[test]
fn terminal_state_ignores_late_status() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Completed, 100),
        },
    );
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Processing, 40),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.job_state(), JobState::Completed);
    assert_eq!(state.view().job.unwrap().progress, 100);
}

#[test]
fn state_never_moves_backwards_but_progress_is_latest() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Processing, 60),
        },
    );
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Pending, 55),
        },
    );

    assert_eq!(state.job_state(), JobState::Processing);
    assert_eq!(state.view().job.unwrap().progress, 55);
    assert_eq!(count_polls(&effects), 1);
}

#[test]
fn submission_failure_creates_synthetic_failed_status() {
    init_logging();
    let (state, _) = submit(AppState::new(), "forhire", "test");
    let (state, effects) = update(
        state,
        Msg::SearchRejected {
            generation: 1,
            message: "At least one subreddit is required".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.is_polling());
    let view = state.view();
    let job = view.job.unwrap();
    assert_eq!(job.state, JobState::Failed);
    assert_eq!(job.job_id, "");
    assert_eq!(job.error.as_deref(), Some("At least one subreddit is required"));
    assert!(!job.show_progress);
    assert!(view.form.submit_enabled);
}

#[test]
fn submit_is_ignored_while_submission_outstanding() {
    init_logging();
    let (state, _) = submit(AppState::new(), "forhire", "test");
    let (state, effects) = update(state, Msg::SearchSubmitted);

    assert!(effects.is_empty());
    assert_eq!(state.current_generation(), 1);
}

#[test]
fn resubmit_cancels_previous_loop_and_discards_its_updates() {
    init_logging();
    let state = accepted(AppState::new(), "old-job");
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("old-job", JobState::Processing, 20),
        },
    );

    let (state, effects) = update(state, Msg::SearchSubmitted);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::CancelPoll { generation: 1 });
    assert!(matches!(
        effects[1],
        Effect::SubmitSearch { generation: 2, .. }
    ));
    assert_eq!(state.job_state(), JobState::Idle);

    let (state, _) = update(
        state,
        Msg::SearchAccepted {
            generation: 2,
            job_id: "new-job".to_string(),
        },
    );

    // A late answer from the superseded loop must not be applied.
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("old-job", JobState::Completed, 100),
        },
    );
    assert!(effects.is_empty());
    let job = state.view().job.unwrap();
    assert_eq!(job.job_id, "new-job");
    assert_eq!(job.state, JobState::Pending);
    assert!(!state.leads().is_loading());

    let (_state, effects) = update(
        state,
        Msg::StatusFetchFailed {
            generation: 1,
            message: "connection reset".to_string(),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn resubmit_after_terminal_state_emits_no_cancel() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Failed, 10),
        },
    );
    let (_state, effects) = update(state, Msg::SearchSubmitted);

    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::SubmitSearch { generation: 2, .. }));
}

#[test]
fn poll_failure_abandons_loop_with_visible_notice() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Processing, 40),
        },
    );
    let (state, effects) = update(
        state,
        Msg::StatusFetchFailed {
            generation: 1,
            message: "timeout".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.is_polling());
    let view = state.view();
    assert_eq!(view.job.unwrap().state, JobState::Processing);
    assert_eq!(
        view.poll_notice.as_deref(),
        Some("Status updates stopped after 1 failed attempt(s): timeout")
    );
    assert!(!view.busy);
}

#[test]
fn poll_failures_within_tolerance_keep_polling() {
    init_logging();
    let settings = CoreSettings {
        max_poll_failures: 3,
        refresh_policy: RefreshPolicy::LatestRequest,
    };
    let state = accepted(AppState::with_settings(settings), "job-1");

    let fail = |state: AppState| {
        update(
            state,
            Msg::StatusFetchFailed {
                generation: 1,
                message: "network error".to_string(),
            },
        )
    };

    let (state, effects) = fail(state);
    assert_eq!(count_polls(&effects), 1);
    let (state, effects) = fail(state);
    assert_eq!(count_polls(&effects), 1);

    // A success resets the streak.
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Processing, 10),
        },
    );
    let (state, effects) = fail(state);
    assert_eq!(count_polls(&effects), 1);
    let (state, effects) = fail(state);
    assert_eq!(count_polls(&effects), 1);
    let (state, effects) = fail(state);
    assert!(effects.is_empty());
    assert!(state.view().poll_notice.is_some());
}

#[test]
fn status_for_another_job_is_discarded() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-2", JobState::Processing, 40),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::PollStatus {
            generation: 1,
            job_id: "job-1".to_string(),
        }]
    );
    assert!(state.is_polling());
    assert_eq!(state.job_state(), JobState::Pending);
    assert_eq!(state.view().job.unwrap().progress, 0);
    assert_eq!(state.view().poll_notice, None);

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Processing, 60),
        },
    );
    assert_eq!(count_polls(&effects), 1);
    assert_eq!(state.job_state(), JobState::Processing);
}

#[test]
fn refresh_failure_after_completion_keeps_job_and_leads() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let (state, effects) = update(state, Msg::RefreshLeadsClicked);
    let ticket = match &effects[..] {
        [Effect::FetchLeads { ticket }] => *ticket,
        other => panic!("unexpected effects {other:?}"),
    };
    let previous = vec![lead(7, "Need a logo")];
    let (state, _) = update(
        state,
        Msg::LeadsLoaded {
            ticket,
            leads: previous.clone(),
        },
    );

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status("job-1", JobState::Completed, 100),
        },
    );
    let ticket = match &effects[..] {
        [Effect::FetchLeads { ticket }] => *ticket,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, effects) = update(
        state,
        Msg::LeadsLoadFailed {
            ticket,
            message: "HTTP 502".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.job_state(), JobState::Completed);
    let view = state.view();
    assert_eq!(view.leads.items, previous);
    assert_eq!(view.leads.notice.as_deref(), Some("Could not load leads: HTTP 502"));
    assert_eq!(view.job.unwrap().error, None);
    assert!(!state.is_busy());
}

#[test]
fn at_most_one_poll_is_outstanding() {
    init_logging();
    let state = accepted(AppState::new(), "job-1");
    let mut state = state;
    for progress in [10, 20, 30, 40] {
        let (next, effects) = update(
            state,
            Msg::StatusReceived {
                generation: 1,
                status: status("job-1", JobState::Processing, progress),
            },
        );
        assert_eq!(count_polls(&effects), 1);
        assert_eq!(effects.len(), 1);
        state = next;
    }
    assert!(state.is_busy());
}
