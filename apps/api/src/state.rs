use std::sync::Arc;

use crate::config::Config;
use crate::ids::IdGenerator;
use crate::jobs::JobSource;
use crate::llm_client::StructuredClient;
use crate::speech::SpeechService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Providers are trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub llm: StructuredClient,
    pub jobs: Arc<dyn JobSource>,
    pub speech: Arc<dyn SpeechService>,
    /// Mints ids for questions and job listings that arrive without one.
    pub ids: Arc<dyn IdGenerator>,
    pub config: Config,
}
