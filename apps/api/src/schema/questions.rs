use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Schema, SchemaError, SchemaId};

pub const QUESTION_COUNT: usize = 10;
pub const CODING_QUESTION_COUNT: usize = 2;
pub const MIN_RUBRIC_BULLETS: usize = 3;
pub const MAX_RUBRIC_BULLETS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Coding,
    Behavioral,
    JobRequirement,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        })
    }
}

/// Extra detail carried only by coding questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingMeta {
    pub difficulty: Difficulty,
    pub target_language: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Assigned server-side when the model leaves it blank.
    #[serde(default)]
    pub id: String,
    pub kind: QuestionKind,
    pub text: String,
    pub rationale: String,
    pub rubric: Vec<String>,
    #[serde(default)]
    pub coding_meta: Option<CodingMeta>,
    /// Filled in by the client and sent back for scoring.
    #[serde(default)]
    pub user_response: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub job_title: String,
    pub summary: String,
    pub questions: Vec<Question>,
}

impl QuestionSet {
    pub fn coding_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.kind == QuestionKind::Coding)
            .count()
    }

    /// Stricter check applied when a set comes back from a client for scoring:
    /// every question must carry a non-empty id and no id may repeat.
    ///
    /// Generated sets skip this; blank or repeated ids there are reassigned.
    pub fn check_ids_present(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for (i, q) in self.questions.iter().enumerate() {
            if q.id.trim().is_empty() {
                return Err(SchemaError::MissingField {
                    schema: Self::ID,
                    detail: format!("questions[{i}].id is empty"),
                });
            }
            if !seen.insert(q.id.as_str()) {
                return Err(SchemaError::cross_field(
                    Self::ID,
                    format!("duplicate question id '{}'", q.id),
                ));
            }
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

impl Schema for QuestionSet {
    const ID: SchemaId = SchemaId::QuestionSet;

    fn check(&self) -> Result<(), SchemaError> {
        if self.questions.len() != QUESTION_COUNT {
            return Err(SchemaError::cardinality(
                Self::ID,
                format!(
                    "expected exactly {QUESTION_COUNT} questions, got {}",
                    self.questions.len()
                ),
            ));
        }

        let coding = self.coding_count();
        if coding != CODING_QUESTION_COUNT {
            return Err(SchemaError::cardinality(
                Self::ID,
                format!("expected exactly {CODING_QUESTION_COUNT} coding questions, got {coding}"),
            ));
        }

        for (i, q) in self.questions.iter().enumerate() {
            let bullets = q.rubric.len();
            if !(MIN_RUBRIC_BULLETS..=MAX_RUBRIC_BULLETS).contains(&bullets) {
                return Err(SchemaError::cardinality(
                    Self::ID,
                    format!(
                        "questions[{i}].rubric has {bullets} bullets, expected {MIN_RUBRIC_BULLETS}-{MAX_RUBRIC_BULLETS}"
                    ),
                ));
            }

            match (q.kind, &q.coding_meta) {
                (QuestionKind::Coding, None) => {
                    return Err(SchemaError::cross_field(
                        Self::ID,
                        format!("questions[{i}] is a coding question without coding_meta"),
                    ));
                }
                (QuestionKind::Behavioral | QuestionKind::JobRequirement, Some(_)) => {
                    return Err(SchemaError::cross_field(
                        Self::ID,
                        format!("questions[{i}] carries coding_meta but is not a coding question"),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
