use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::prompts::build_scoring_prompt;
use crate::llm_client::StructuredClient;
use crate::schema::questions::QuestionSet;
use crate::schema::scoring::{ScoreReport, VerdictPolicy};
use crate::schema::Schema;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringRequest {
    pub question_set: QuestionSet,
}

/// Grades a completed question set. The inbound set must still satisfy every
/// generation invariant and carry an id on each question, since the report is
/// matched against it id by id.
pub async fn score_questions(
    request: &ScoringRequest,
    llm: &StructuredClient,
    policy: VerdictPolicy,
) -> Result<ScoreReport, AppError> {
    let set = &request.question_set;
    set.check()
        .and_then(|_| set.check_ids_present())
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let answered = set
        .questions
        .iter()
        .filter(|q| !q.user_response.trim().is_empty())
        .count();
    info!(
        "Scoring '{}': {answered} of {} questions answered",
        set.job_title,
        set.questions.len()
    );

    let prompt = build_scoring_prompt(set)?;
    let mut report: ScoreReport = llm.complete(&prompt).await?;
    report.reconcile(set)?;
    report.apply_verdict_policy(policy)?;
    Ok(report)
}
