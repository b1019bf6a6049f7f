// All prompt templates and builders for the interview capabilities.
// Builders are pure: they validate their inputs and interpolate, nothing else.

use crate::errors::AppError;
use crate::interview::guidance::GuidanceRequest;
use crate::interview::learning::{LearningPlanRequest, RemediationScope};
use crate::interview::questions::QuestionGenerationRequest;
use crate::llm_client::prompts::{fill, json_system};
use crate::llm_client::Prompt;
use crate::schema::questions::QuestionSet;

/// Soft length target given to the model. The hard cap is applied afterwards.
pub const GUIDANCE_TARGET_WORDS: usize = 75;

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Question generation
// ────────────────────────────────────────────────────────────────────────────

pub const QUESTIONS_ROLE: &str = "You are a senior technical interviewer who designs \
    realistic interview loops tailored to a specific job and candidate.";

/// Replace: {job_title}, {difficulty}, {job_description}, {resume}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Design an interview question set for the role "{job_title}".

HARD RULES:
1. Exactly 10 questions in total.
2. Exactly 2 questions have "kind": "coding". They are data-structure / algorithm problems at "{difficulty}" difficulty, and each carries a "coding_meta" object with "difficulty": "{difficulty}", a "target_language", "constraints" and worked "examples".
3. The other 8 questions are split between "behavioral" and "job_requirement" kinds and MUST have "coding_meta": null.
4. Every question has a one-sentence "rationale" explaining what it tests and a "rubric" of 3 to 5 short, gradeable bullet points, ordered from most to least important.
5. Every question has "user_response": "" (empty string).
6. Ground job_requirement questions in the job description and personalize behavioral questions using the resume.

Return a JSON object with this EXACT schema:
{
  "job_title": "string",
  "summary": "one or two sentences describing the focus of this interview",
  "questions": [
    {
      "id": "q1",
      "kind": "coding" | "behavioral" | "job_requirement",
      "text": "string",
      "rationale": "string",
      "rubric": ["string"],
      "coding_meta": {
        "difficulty": "{difficulty}",
        "target_language": "string",
        "constraints": ["string"],
        "examples": ["string"]
      } | null,
      "user_response": ""
    }
  ]
}

JOB DESCRIPTION:
{job_description}

CANDIDATE RESUME:
{resume}"#;

pub fn build_questions_prompt(request: &QuestionGenerationRequest) -> Result<Prompt, AppError> {
    require("job_description", &request.job_description)?;
    require("job_title", &request.job_title)?;

    let resume = if request.resume.trim().is_empty() {
        "(no resume provided)"
    } else {
        request.resume.trim()
    };
    let difficulty = request.difficulty.to_string();

    Ok(Prompt {
        system: json_system(QUESTIONS_ROLE),
        user: fill(
            QUESTIONS_PROMPT_TEMPLATE,
            &[
                ("job_title", request.job_title.trim()),
                ("difficulty", &difficulty),
                ("job_description", request.job_description.trim()),
                ("resume", resume),
            ],
        ),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

pub const SCORING_ROLE: &str = "You are a fair, rigorous interview grader. \
    You grade only what the candidate actually wrote; an empty answer earns no credit.";

/// Replace: {question_set_json}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Grade each candidate answer in the question set below against its rubric.

HARD RULES:
1. Return exactly one evaluation per question, in the same order as the input, with "question_id" equal to the question's "id" and the same "kind".
2. "bullet_evals" has exactly one entry per rubric bullet, in rubric order, with "criterion" copied from the rubric.
3. Each bullet "score" is 0 (not met), 0.5 (partially met) or 1 (fully met).
4. Pick "verdict" from the average bullet score: >= 0.85 "excellent", 0.65-0.84 "good", 0.35-0.64 "fair", < 0.35 "poor".
5. Coding questions MUST include a "coding_review"; all other questions MUST have "coding_review": null.
6. An empty "user_response" scores 0 on every bullet.

Return a JSON object with this EXACT schema:
{
  "job_title": "string",
  "overall_summary": "string",
  "items": [
    {
      "question_id": "string",
      "kind": "coding" | "behavioral" | "job_requirement",
      "verdict": "excellent" | "good" | "fair" | "poor",
      "bullet_evals": [
        {"criterion": "string", "score": 0 | 0.5 | 1, "notes": "string"}
      ],
      "feedback": "string",
      "coding_review": {
        "correctness": "string",
        "time_complexity": "string",
        "space_complexity": "string",
        "edge_cases": ["string"],
        "improvements": ["string"]
      } | null
    }
  ]
}

QUESTION SET WITH CANDIDATE ANSWERS:
{question_set_json}"#;

pub fn build_scoring_prompt(set: &QuestionSet) -> Result<Prompt, AppError> {
    require("question_set.job_title", &set.job_title)?;
    let question_set_json = serde_json::to_string_pretty(set)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode question set: {e}")))?;

    Ok(Prompt {
        system: json_system(SCORING_ROLE),
        user: fill(
            SCORING_PROMPT_TEMPLATE,
            &[("question_set_json", &question_set_json)],
        ),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Learning plan
// ────────────────────────────────────────────────────────────────────────────

pub const LEARNING_ROLE: &str = "You are an interview coach who turns graded mock \
    interviews into focused, realistic study plans.";

/// Replace: {job_title}, {focus_instruction}, {findings}, {budget_hours}, {max_resources}
pub const LEARNING_PROMPT_TEMPLATE: &str = r#"Build a learning plan for a candidate preparing for "{job_title}".

{focus_instruction}

FINDINGS FROM THE GRADED INTERVIEW:
{findings}

HARD RULES:
1. Between 3 and 5 "topics", ordered by expected impact on the candidate's next interview.
2. At most 5 "quick_wins": concrete things doable in under an hour.
3. Each topic lists 1 to 3 "resources"; at most {max_resources} resources across the whole plan.
4. The "study_schedule" fits within {budget_hours} hours in total.
5. Each topic's "why" names the question ids it addresses, when it addresses any.

Return a JSON object with this EXACT schema:
{
  "job_title": "string",
  "overview": "string",
  "quick_wins": ["string"],
  "topics": [
    {
      "topic": "string",
      "skill_area": "data_structures_algorithms" | "system_design" | "behavioral" | "domain_knowledge" | "communication" | "tooling",
      "why": "string",
      "priority": "high" | "medium" | "low",
      "actions": ["string"],
      "practice_tasks": ["string"],
      "resources": [
        {"title": "string", "kind": "article" | "video" | "course" | "book" | "documentation" | "practice", "url": "string" | null, "est_hours": 1.5}
      ]
    }
  ],
  "study_schedule": [
    {"label": "Day 1", "focus": "string", "hours": 2}
  ]
}"#;

const REMEDIATION_INSTRUCTION: &str = "Focus on remediation: every topic should close a gap \
    shown by the weak answers listed below, highest-impact gaps first.";

const STRETCH_INSTRUCTION: &str = "No answer fell below the remediation threshold. Propose \
    stretch topics that push the candidate beyond the level already demonstrated.";

pub fn build_learning_prompt(
    request: &LearningPlanRequest,
    scope: &RemediationScope,
) -> Result<Prompt, AppError> {
    require("scored_report.job_title", &request.scored_report.job_title)?;

    let (focus_instruction, findings) = if scope.weak.is_empty() {
        let strengths = request
            .scored_report
            .items
            .iter()
            .map(|i| format!("- {} ({:?}): {:.0}%", i.question_id, i.kind, i.percent()))
            .collect::<Vec<_>>()
            .join("\n");
        (STRETCH_INSTRUCTION, strengths)
    } else {
        let weak = scope
            .weak
            .iter()
            .map(|w| {
                format!(
                    "- {} ({:?}, verdict {:?}, {:.0}%): missed [{}]. Feedback: {}",
                    w.question_id,
                    w.kind,
                    w.verdict,
                    w.percent,
                    w.missed_criteria.join("; "),
                    w.feedback
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        (REMEDIATION_INSTRUCTION, weak)
    };

    let findings = if findings.is_empty() {
        "(no graded answers)".to_string()
    } else {
        findings
    };
    let budget_hours = format!("{}", request.budget_hours);
    let max_resources = request.max_resources.to_string();

    Ok(Prompt {
        system: json_system(LEARNING_ROLE),
        user: fill(
            LEARNING_PROMPT_TEMPLATE,
            &[
                ("job_title", request.scored_report.job_title.trim()),
                ("focus_instruction", focus_instruction),
                ("findings", &findings),
                ("budget_hours", &budget_hours),
                ("max_resources", &max_resources),
            ],
        ),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Guidance
// ────────────────────────────────────────────────────────────────────────────

pub const GUIDANCE_ROLE: &str = "You are a Socratic interview coach. You never give the \
    answer away: you respond with hints, probing questions and next steps that help the \
    candidate reason it out themselves.";

/// Replace: {main_question}, {history}, {new_user_query}, {target_words}
pub const GUIDANCE_PROMPT_TEMPLATE: &str = r#"The candidate is working on this interview question:
{main_question}

CONVERSATION SO FAR:
{history}

THE CANDIDATE NOW ASKS:
{new_user_query}

Reply in at most {target_words} words. Do not state the solution, final answer or full code.

Return a JSON object with this EXACT schema:
{"guidance": "string"}"#;

pub fn build_guidance_prompt(request: &GuidanceRequest) -> Result<Prompt, AppError> {
    require("main_question", &request.main_question)?;
    require("new_user_query", &request.new_user_query)?;

    let history = request
        .history_str
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or("(none)");
    let target_words = GUIDANCE_TARGET_WORDS.to_string();

    Ok(Prompt {
        system: json_system(GUIDANCE_ROLE),
        user: fill(
            GUIDANCE_PROMPT_TEMPLATE,
            &[
                ("main_question", request.main_question.trim()),
                ("history", history),
                ("new_user_query", request.new_user_query.trim()),
                ("target_words", &target_words),
            ],
        ),
    })
}
