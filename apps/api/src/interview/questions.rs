//! Question generation. One completion call produces the whole set and the
//! server then assigns ids and resets candidate-owned fields.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::ids::IdGenerator;
use crate::interview::prompts::build_questions_prompt;
use crate::llm_client::StructuredClient;
use crate::schema::questions::{Difficulty, QuestionSet};

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionGenerationRequest {
    pub job_description: String,
    #[serde(default)]
    pub resume: String,
    pub job_title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

pub async fn generate_questions(
    request: &QuestionGenerationRequest,
    llm: &StructuredClient,
    ids: &dyn IdGenerator,
) -> Result<QuestionSet, AppError> {
    let prompt = build_questions_prompt(request)?;
    info!(
        "Generating {} questions for '{}'",
        request.difficulty, request.job_title
    );

    let mut set: QuestionSet = llm.complete(&prompt).await?;
    finalize_question_set(&mut set, request.difficulty, ids);
    Ok(set)
}

/// Post-processing applied to every generated set:
/// - blank or repeated ids are replaced with fresh ones
/// - `user_response` is reset to the empty string
/// - coding difficulty is pinned to the requested level
pub fn finalize_question_set(set: &mut QuestionSet, difficulty: Difficulty, ids: &dyn IdGenerator) {
    let mut taken: HashSet<String> = set
        .questions
        .iter()
        .filter(|q| !q.id.trim().is_empty())
        .map(|q| q.id.clone())
        .collect();
    let mut seen = HashSet::new();

    for question in &mut set.questions {
        if question.id.trim().is_empty() || !seen.insert(question.id.clone()) {
            question.id = loop {
                let id = ids.next_id();
                if taken.insert(id.clone()) {
                    break id;
                }
            };
        }
        question.user_response.clear();
        if let Some(meta) = question.coding_meta.as_mut() {
            meta.difficulty = difficulty;
        }
    }
}
