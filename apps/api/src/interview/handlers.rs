use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::interview::guidance::{generate_guidance, GuidanceRequest};
use crate::interview::learning::{generate_learning_plan, LearningPlanRequest};
use crate::interview::questions::{generate_questions, QuestionGenerationRequest};
use crate::interview::scoring::{score_questions, ScoringRequest};
use crate::schema::guidance::GuidanceResponse;
use crate::schema::learning::RecommendationReport;
use crate::schema::questions::QuestionSet;
use crate::schema::scoring::ScoreReport;
use crate::state::AppState;

/// POST /questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuestionGenerationRequest>,
) -> Result<Json<QuestionSet>, AppError> {
    let set = generate_questions(&request, &state.llm, state.ids.as_ref()).await?;
    Ok(Json(set))
}

/// POST /scores
///
/// Grades the candidate's answers. Verdict handling follows `VERDICT_POLICY`.
pub async fn handle_score(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ScoringRequest>,
) -> Result<Json<ScoreReport>, AppError> {
    let report = score_questions(&request, &state.llm, state.config.verdict_policy).await?;
    Ok(Json(report))
}

/// POST /learning
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LearningPlanRequest>,
) -> Result<Json<RecommendationReport>, AppError> {
    let plan = generate_learning_plan(&request, &state.llm).await?;
    Ok(Json(plan))
}

/// POST /coach/guide
pub async fn handle_guidance(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GuidanceRequest>,
) -> Result<Json<GuidanceResponse>, AppError> {
    let response = generate_guidance(&request, &state.llm).await?;
    Ok(Json(response))
}
