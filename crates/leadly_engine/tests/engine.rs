use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use leadly_engine::{
    ApiClient, EngineEvent, EngineHandle, JobStatusKind, JobStatusPayload, Lead, RequestError,
    ResultsPayload, SearchAccepted, SearchRequest,
};

const WAIT: Duration = Duration::from_secs(5);

/// Scripted backend that records calls and the peak number of concurrent
/// status requests.
#[derive(Default)]
struct FakeBackend {
    statuses: Mutex<Vec<JobStatusKind>>,
    status_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    lead_calls: AtomicUsize,
}

impl FakeBackend {
    fn with_statuses(statuses: Vec<JobStatusKind>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses),
            ..Self::default()
        })
    }
}

#[async_trait::async_trait]
impl ApiClient for FakeBackend {
    async fn submit_search(
        &self,
        _request: &SearchRequest,
    ) -> Result<SearchAccepted, RequestError> {
        Ok(SearchAccepted {
            message: "Search started".to_string(),
            job_id: "job-1".to_string(),
        })
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatusPayload, RequestError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let status = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(JobStatusPayload {
            job_id: job_id.to_string(),
            status,
            progress: 0,
            results: ResultsPayload::default(),
            error: None,
        })
    }

    async fn fetch_leads(&self) -> Result<Vec<Lead>, RequestError> {
        self.lead_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn list_subreddits(&self) -> Result<Vec<String>, RequestError> {
        Ok(vec!["forhire".to_string()])
    }

    async fn add_subreddit(&self, _name: &str) -> Result<(), RequestError> {
        Ok(())
    }

    async fn check_health(&self) -> bool {
        true
    }
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

fn request() -> SearchRequest {
    SearchRequest {
        subreddits: vec!["forhire".to_string()],
        user_query: "test".to_string(),
        limit_per_subreddit: Some(10),
        keywords: None,
    }
}

#[test]
fn submit_reports_tagged_result() {
    let backend = FakeBackend::with_statuses(vec![JobStatusKind::Pending]);
    let engine = EngineHandle::with_client(backend, Duration::from_millis(10)).unwrap();

    engine.submit_search(4, request());
    match next_event(&engine) {
        EngineEvent::SearchSubmitted { generation, result } => {
            assert_eq!(generation, 4);
            assert_eq!(result.unwrap().job_id, "job-1");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn poll_waits_for_interval_before_fetching() {
    let backend = FakeBackend::with_statuses(vec![JobStatusKind::Processing]);
    let engine = EngineHandle::with_client(backend.clone(), Duration::from_millis(150)).unwrap();

    let started = Instant::now();
    engine.poll_status(1, "job-1");
    match next_event(&engine) {
        EngineEvent::StatusFetched { generation, result } => {
            assert_eq!(generation, 1);
            assert_eq!(result.unwrap().status, JobStatusKind::Processing);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(backend.status_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cancelled_poll_never_fetches() {
    let backend = FakeBackend::with_statuses(vec![JobStatusKind::Processing]);
    let engine = EngineHandle::with_client(backend.clone(), Duration::from_millis(200)).unwrap();

    engine.poll_status(1, "job-1");
    engine.cancel_poll(1);

    assert!(engine.recv_timeout(Duration::from_millis(500)).is_none());
    assert_eq!(backend.status_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn cancel_for_other_generation_keeps_timer() {
    let backend = FakeBackend::with_statuses(vec![JobStatusKind::Processing]);
    let engine = EngineHandle::with_client(backend.clone(), Duration::from_millis(50)).unwrap();

    engine.poll_status(2, "job-2");
    engine.cancel_poll(1);

    match next_event(&engine) {
        EngineEvent::StatusFetched { generation, .. } => assert_eq!(generation, 2),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn sequential_polls_never_overlap() {
    let backend = FakeBackend::with_statuses(vec![
        JobStatusKind::Pending,
        JobStatusKind::Processing,
        JobStatusKind::Processing,
        JobStatusKind::Completed,
    ]);
    let engine = EngineHandle::with_client(backend.clone(), Duration::from_millis(5)).unwrap();

    // Drive the loop the way the app does: next poll only after an answer.
    engine.poll_status(1, "job-1");
    let mut seen = Vec::new();
    loop {
        match next_event(&engine) {
            EngineEvent::StatusFetched { result, .. } => {
                let status = result.unwrap().status;
                seen.push(status);
                if status == JobStatusKind::Completed {
                    break;
                }
                engine.poll_status(1, "job-1");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(seen.len(), 4);
    assert_eq!(backend.peak_in_flight.load(Ordering::SeqCst), 1);
}

#[test]
fn refresh_and_config_commands_report_events() {
    let backend = FakeBackend::with_statuses(vec![JobStatusKind::Pending]);
    let engine = EngineHandle::with_client(backend.clone(), Duration::from_millis(5)).unwrap();

    engine.fetch_leads(9);
    match next_event(&engine) {
        EngineEvent::LeadsFetched { ticket, result } => {
            assert_eq!(ticket, 9);
            assert!(result.unwrap().is_empty());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(backend.lead_calls.load(Ordering::SeqCst), 1);

    engine.check_health();
    assert_eq!(next_event(&engine), EngineEvent::HealthChecked { healthy: true });

    engine.fetch_subreddits();
    assert_eq!(
        next_event(&engine),
        EngineEvent::SubredditsFetched {
            result: Ok(vec!["forhire".to_string()])
        }
    );

    engine.add_subreddit("hiring");
    assert_eq!(
        next_event(&engine),
        EngineEvent::SubredditAdded {
            name: "hiring".to_string(),
            result: Ok(())
        }
    );
}
