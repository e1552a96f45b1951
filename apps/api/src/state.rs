use std::sync::Arc;

use crate::llm_client::CompletionBackend;
use crate::storage::reports::ReportStore;
use crate::storage::sessions::{SessionLocks, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production, scripted in tests.
    pub llm: Arc<dyn CompletionBackend>,
    /// One `ScreeningSession` per candidate. In-memory by default, Redis when `REDIS_URL` is set.
    pub sessions: Arc<dyn SessionStore>,
    /// Serializes requests that touch the same session.
    pub session_locks: Arc<SessionLocks>,
    /// Final report records. Local JSON files by default, S3 when `S3_BUCKET` is set.
    pub reports: Arc<dyn ReportStore>,
}
