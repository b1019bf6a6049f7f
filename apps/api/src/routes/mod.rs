pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::interview::handlers as interview;
use crate::jobs::handlers as jobs;
use crate::speech::handlers as speech;
use crate::state::AppState;

/// Largest audio upload accepted by `/tts/transcribe`.
pub const MAX_AUDIO_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Job search (no AI)
        .route("/jobs", get(jobs::handle_get_jobs))
        // AI capabilities
        .route("/analysis/job", post(analysis::handle_analyze_job))
        .route("/questions", post(interview::handle_generate_questions))
        .route("/scores", post(interview::handle_score))
        .route("/learning", post(interview::handle_learning_plan))
        .route("/coach/guide", post(interview::handle_guidance))
        // Speech
        .route("/tts/speak", post(speech::handle_speak))
        .route(
            "/tts/transcribe",
            post(speech::handle_transcribe).layer(DefaultBodyLimit::max(MAX_AUDIO_UPLOAD_BYTES)),
        )
        .with_state(state)
}
