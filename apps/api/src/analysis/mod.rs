//! Job description analysis: summary, requirements and skills in one call.

pub mod handlers;
pub mod prompts;

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::StructuredClient;
use crate::schema::analysis::JobDescriptionAnalysis;

/// Extracts a structured summary from a raw job description.
pub async fn analyze_job_description(
    job_description: &str,
    llm: &StructuredClient,
) -> Result<JobDescriptionAnalysis, AppError> {
    let prompt = prompts::build_analysis_prompt(job_description)?;
    let mut analysis: JobDescriptionAnalysis = llm.complete(&prompt).await?;
    analysis.clamp();
    info!(
        "Job description analyzed: {} requirements, {} skills",
        analysis.requirements.len(),
        analysis.skills.len()
    );
    Ok(analysis)
}
