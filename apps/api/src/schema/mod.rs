//! Schema registry: typed shapes for every structured completion and the rules
//! used to accept or reject model output.
//!
//! Decoding is done by serde; the serde error is classified into
//! missing-field / type-mismatch / enum-violation. Count bounds and cross-field
//! invariants are checked afterwards by each type's [`Schema::check`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub mod analysis;
pub mod guidance;
pub mod learning;
pub mod questions;
pub mod scoring;

/// Identifies which structured output a completion call expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaId {
    JobAnalysis,
    QuestionSet,
    ScoreReport,
    RecommendationReport,
    Guidance,
}

impl SchemaId {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaId::JobAnalysis => "job_analysis",
            SchemaId::QuestionSet => "question_set",
            SchemaId::ScoreReport => "score_report",
            SchemaId::RecommendationReport => "recommendation_report",
            SchemaId::Guidance => "guidance",
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{schema}: missing required field: {detail}")]
    MissingField { schema: SchemaId, detail: String },

    #[error("{schema}: type mismatch: {detail}")]
    TypeMismatch { schema: SchemaId, detail: String },

    #[error("{schema}: enum violation: {detail}")]
    EnumViolation { schema: SchemaId, detail: String },

    #[error("{schema}: cardinality violation: {detail}")]
    Cardinality { schema: SchemaId, detail: String },

    #[error("{schema}: cross-field invariant violated: {detail}")]
    CrossField { schema: SchemaId, detail: String },
}

impl SchemaError {
    pub fn cardinality(schema: SchemaId, detail: impl Into<String>) -> Self {
        SchemaError::Cardinality {
            schema,
            detail: detail.into(),
        }
    }

    pub fn cross_field(schema: SchemaId, detail: impl Into<String>) -> Self {
        SchemaError::CrossField {
            schema,
            detail: detail.into(),
        }
    }

    /// Classifies a serde decoding failure by its message.
    fn from_serde(schema: SchemaId, err: &serde_json::Error) -> Self {
        let detail = err.to_string();
        if detail.starts_with("missing field") {
            SchemaError::MissingField { schema, detail }
        } else if detail.starts_with("unknown variant") {
            SchemaError::EnumViolation { schema, detail }
        } else {
            SchemaError::TypeMismatch { schema, detail }
        }
    }
}

/// A structured output the model can be asked to produce.
pub trait Schema: DeserializeOwned {
    const ID: SchemaId;

    /// Count bounds and cross-field rules that serde cannot express.
    fn check(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Decodes a JSON value into `T` and runs its invariant checks.
pub fn validate<T: Schema>(raw: Value) -> Result<T, SchemaError> {
    let entity: T = serde_json::from_value(raw).map_err(|e| SchemaError::from_serde(T::ID, &e))?;
    entity.check()?;
    Ok(entity)
}

/// Keeps at most `max` items, dropping from the tail.
pub(crate) fn truncate_list<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        items.truncate(max);
    }
}
