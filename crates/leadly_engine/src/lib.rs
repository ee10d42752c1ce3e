//! Leadly engine: REST client for the lead-finder backend and the effect
//! execution thread that drives it.
mod api;
mod engine;
mod persist;
mod types;

pub use api::{ApiClient, ApiSettings, ReqwestApiClient, DEFAULT_API_KEY, DEFAULT_BASE_URL};
pub use engine::{EngineConfig, EngineError, EngineHandle, DEFAULT_POLL_INTERVAL};
pub use persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
pub use types::{
    EngineEvent, Generation, JobStatusKind, JobStatusPayload, Lead, RefreshTicket, RequestError,
    RequestFailure, ResultsPayload, SearchAccepted, SearchRequest,
};
