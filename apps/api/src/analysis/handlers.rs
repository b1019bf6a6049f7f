use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::analyze_job_description;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::schema::analysis::JobDescriptionAnalysis;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub job_description: String,
}

/// POST /analysis/job
///
/// Summarizes a job description and lists its top requirements and skills.
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<JobDescriptionRequest>,
) -> Result<Json<JobDescriptionAnalysis>, AppError> {
    let analysis = analyze_job_description(&request.job_description, &state.llm).await?;
    Ok(Json(analysis))
}
