use axum::{extract::State, Json};
use tracing::info;

use crate::errors::AppError;
use crate::extract::ApiQuery;
use crate::jobs::{JobQuery, RawJob};
use crate::state::AppState;

/// GET /jobs
///
/// Fetches listings from the job-search provider without any AI processing.
pub async fn handle_get_jobs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<JobQuery>,
) -> Result<Json<Vec<RawJob>>, AppError> {
    query.validate()?;
    info!(query = %query.query, page = query.page, "Searching jobs");

    let postings = state.jobs.search(&query).await?;
    let jobs = postings
        .into_iter()
        .map(|p| RawJob::from_posting(p, state.ids.as_ref()))
        .collect();

    Ok(Json(jobs))
}
