// Prompt for job description analysis.

use crate::errors::AppError;
use crate::llm_client::prompts::{fill, json_system};
use crate::llm_client::Prompt;

pub const ANALYSIS_ROLE: &str =
    "You are an expert job description analyst helping early-career candidates \
    understand what a role involves.";

/// Replace `{job_description}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and extract:
1. A concise summary of what the job involves (4-5 lines).
2. The key requirements and qualifications, as a list of individual requirements (up to 5).
3. The required technical and soft skills, as a list of individual skills (up to 5).

Return a JSON object with this EXACT schema (no extra fields):
{
  "description_summary": "string",
  "requirements": ["string"],
  "required_skills": ["string"]
}

JOB DESCRIPTION:
{job_description}"#;

pub fn build_analysis_prompt(job_description: &str) -> Result<Prompt, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(Prompt {
        system: json_system(ANALYSIS_ROLE),
        user: fill(
            ANALYSIS_PROMPT_TEMPLATE,
            &[("job_description", job_description.trim())],
        ),
    })
}
