use serde::{Deserialize, Serialize};

use super::{Schema, SchemaError, SchemaId};

/// Hard ceiling on guidance length, applied after generation.
pub const MAX_GUIDANCE_WORDS: usize = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceResponse {
    pub guidance: String,
}

impl Schema for GuidanceResponse {
    const ID: SchemaId = SchemaId::Guidance;

    fn check(&self) -> Result<(), SchemaError> {
        if self.guidance.trim().is_empty() {
            return Err(SchemaError::MissingField {
                schema: Self::ID,
                detail: "guidance is empty".to_string(),
            });
        }
        Ok(())
    }
}

impl GuidanceResponse {
    pub fn truncate_words(&mut self, max_words: usize) {
        self.guidance = truncate_words(&self.guidance, max_words);
    }
}

/// Cuts `text` to at most `max_words` whitespace-separated words. Text already
/// within the limit is returned unchanged; truncated text is re-joined with
/// single spaces so a word is never split.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.trim().to_string();
    }
    words[..max_words].join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
