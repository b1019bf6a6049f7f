use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::prompts::build_learning_prompt;
use crate::llm_client::StructuredClient;
use crate::schema::learning::{RecommendationReport, MIN_TOPICS};
use crate::schema::questions::QuestionKind;
use crate::schema::scoring::{ScoreReport, Verdict};
use crate::schema::Schema;

fn default_threshold() -> f64 {
    70.0
}

fn default_budget_hours() -> f64 {
    10.0
}

fn default_max_resources() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningPlanRequest {
    pub scored_report: ScoreReport,
    /// Percent (0–100) below which an answer is treated as a gap.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_budget_hours")]
    pub budget_hours: f64,
    #[serde(default = "default_max_resources")]
    pub max_resources: usize,
}

impl LearningPlanRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(AppError::InvalidRequest(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        if !self.budget_hours.is_finite() || self.budget_hours <= 0.0 {
            return Err(AppError::InvalidRequest(
                "budget_hours must be a positive number".to_string(),
            ));
        }
        // Each of the minimum topics needs one resource.
        if self.max_resources < MIN_TOPICS {
            return Err(AppError::InvalidRequest(format!(
                "max_resources must be at least {MIN_TOPICS}, got {}",
                self.max_resources
            )));
        }
        self.scored_report
            .check()
            .map_err(|e| AppError::InvalidRequest(e.to_string()))
    }
}

/// One answer the plan has to address.
#[derive(Debug, Clone, PartialEq)]
pub struct WeakItem {
    pub question_id: String,
    pub kind: QuestionKind,
    pub verdict: Verdict,
    pub percent: f64,
    /// Rubric bullets that did not earn full credit.
    pub missed_criteria: Vec<String>,
    pub feedback: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemediationScope {
    pub weak: Vec<WeakItem>,
}

/// An item is weak when its percent falls below `threshold` or its verdict is
/// fair or poor, whichever the model reported.
pub fn remediation_scope(report: &ScoreReport, threshold: f64) -> RemediationScope {
    let weak = report
        .items
        .iter()
        .filter(|item| item.percent() < threshold || item.verdict.needs_remediation())
        .map(|item| WeakItem {
            question_id: item.question_id.clone(),
            kind: item.kind,
            verdict: item.verdict,
            percent: item.percent(),
            missed_criteria: item
                .bullet_evals
                .iter()
                .filter(|b| b.score < 1.0)
                .map(|b| b.criterion.clone())
                .collect(),
            feedback: item.feedback.clone(),
        })
        .collect();
    RemediationScope { weak }
}

pub async fn generate_learning_plan(
    request: &LearningPlanRequest,
    llm: &StructuredClient,
) -> Result<RecommendationReport, AppError> {
    request.validate()?;
    let scope = remediation_scope(&request.scored_report, request.threshold);
    info!(
        "Building learning plan for '{}': {} of {} answers below threshold",
        request.scored_report.job_title,
        scope.weak.len(),
        request.scored_report.items.len()
    );

    let prompt = build_learning_prompt(request, &scope)?;
    let mut plan: RecommendationReport = llm.complete(&prompt).await?;
    plan.clamp(request.max_resources, request.budget_hours);
    info!(
        "Learning plan ready: {} topics, {} resources",
        plan.topics.len(),
        plan.resource_count()
    );
    Ok(plan)
}
