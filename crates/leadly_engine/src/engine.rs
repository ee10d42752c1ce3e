use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use leadly_logging::{leadly_debug, leadly_info};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, ApiSettings, ReqwestApiClient};
use crate::{EngineEvent, Generation, RefreshTicket, RequestError, SearchRequest};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    /// Delay between a status answer and the next status request.
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid API configuration: {0}")]
    Api(#[from] RequestError),
    #[error("could not start engine runtime: {0}")]
    Runtime(#[from] io::Error),
}

enum EngineCommand {
    SubmitSearch {
        generation: Generation,
        request: SearchRequest,
    },
    PollStatus {
        generation: Generation,
        job_id: String,
    },
    CancelPoll {
        generation: Generation,
    },
    FetchLeads {
        ticket: RefreshTicket,
    },
    FetchSubreddits,
    AddSubreddit {
        name: String,
    },
    CheckHealth,
}

/// Owns the IO thread. Commands are executed on a tokio runtime and their
/// outcomes come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = ReqwestApiClient::new(config.api)?;
        Self::with_client(Arc::new(client), config.poll_interval)
    }

    pub fn with_client(
        client: Arc<dyn ApiClient>,
        poll_interval: Duration,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("leadly-engine".to_string())
            .spawn(move || run(runtime, client, poll_interval, cmd_rx, event_tx))?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit_search(&self, generation: Generation, request: SearchRequest) {
        self.send(EngineCommand::SubmitSearch {
            generation,
            request,
        });
    }

    /// Fetches the status of `job_id` once the poll interval has elapsed.
    /// Scheduling a poll replaces any timer that has not fired yet.
    pub fn poll_status(&self, generation: Generation, job_id: impl Into<String>) {
        self.send(EngineCommand::PollStatus {
            generation,
            job_id: job_id.into(),
        });
    }

    /// Clears the pending poll timer of `generation`. A request already in
    /// flight still completes and reports its event.
    pub fn cancel_poll(&self, generation: Generation) {
        self.send(EngineCommand::CancelPoll { generation });
    }

    pub fn fetch_leads(&self, ticket: RefreshTicket) {
        self.send(EngineCommand::FetchLeads { ticket });
    }

    pub fn fetch_subreddits(&self) {
        self.send(EngineCommand::FetchSubreddits);
    }

    pub fn add_subreddit(&self, name: impl Into<String>) {
        self.send(EngineCommand::AddSubreddit { name: name.into() });
    }

    pub fn check_health(&self) {
        self.send(EngineCommand::CheckHealth);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

struct PollTimer {
    generation: Generation,
    token: CancellationToken,
}

fn run(
    runtime: Runtime,
    client: Arc<dyn ApiClient>,
    poll_interval: Duration,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut poll_timer: Option<PollTimer> = None;

    while let Ok(command) = cmd_rx.recv() {
        let client = client.clone();
        let event_tx = event_tx.clone();
        match command {
            EngineCommand::SubmitSearch {
                generation,
                request,
            } => {
                runtime.spawn(async move {
                    let result = client.submit_search(&request).await;
                    let _ = event_tx.send(EngineEvent::SearchSubmitted { generation, result });
                });
            }
            EngineCommand::PollStatus { generation, job_id } => {
                if let Some(previous) = poll_timer.take() {
                    previous.token.cancel();
                }
                let token = CancellationToken::new();
                poll_timer = Some(PollTimer {
                    generation,
                    token: token.clone(),
                });
                runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {
                            leadly_debug!("Poll timer for generation {} cleared", generation);
                            return;
                        }
                        _ = tokio::time::sleep(poll_interval) => {}
                    }
                    let result = client.fetch_job_status(&job_id).await;
                    let _ = event_tx.send(EngineEvent::StatusFetched { generation, result });
                });
            }
            EngineCommand::CancelPoll { generation } => {
                match poll_timer.take() {
                    Some(timer) if timer.generation == generation => {
                        leadly_info!("Cancelling poll loop of generation {}", generation);
                        timer.token.cancel();
                    }
                    other => poll_timer = other,
                }
            }
            EngineCommand::FetchLeads { ticket } => {
                runtime.spawn(async move {
                    let result = client.fetch_leads().await;
                    let _ = event_tx.send(EngineEvent::LeadsFetched { ticket, result });
                });
            }
            EngineCommand::FetchSubreddits => {
                runtime.spawn(async move {
                    let result = client.list_subreddits().await;
                    let _ = event_tx.send(EngineEvent::SubredditsFetched { result });
                });
            }
            EngineCommand::AddSubreddit { name } => {
                runtime.spawn(async move {
                    let result = client.add_subreddit(&name).await;
                    let _ = event_tx.send(EngineEvent::SubredditAdded { name, result });
                });
            }
            EngineCommand::CheckHealth => {
                runtime.spawn(async move {
                    let healthy = client.check_health().await;
                    let _ = event_tx.send(EngineEvent::HealthChecked { healthy });
                });
            }
        }
    }

    leadly_debug!("Engine command channel closed; shutting down");
    runtime.shutdown_timeout(Duration::from_secs(1));
}
