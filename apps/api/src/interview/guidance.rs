use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::interview::prompts::build_guidance_prompt;
use crate::llm_client::StructuredClient;
use crate::schema::guidance::{word_count, GuidanceResponse, MAX_GUIDANCE_WORDS};

#[derive(Debug, Clone, Deserialize)]
pub struct GuidanceRequest {
    pub main_question: String,
    #[serde(default)]
    pub history_str: Option<String>,
    pub new_user_query: String,
}

/// One coaching turn. The reply is hard-capped at [`MAX_GUIDANCE_WORDS`]
/// regardless of what the model produced.
pub async fn generate_guidance(
    request: &GuidanceRequest,
    llm: &StructuredClient,
) -> Result<GuidanceResponse, AppError> {
    let prompt = build_guidance_prompt(request)?;
    info!("Generating guidance");

    let mut response: GuidanceResponse = llm.complete(&prompt).await?;
    let words = word_count(&response.guidance);
    if words > MAX_GUIDANCE_WORDS {
        debug!("Truncating guidance from {words} to {MAX_GUIDANCE_WORDS} words");
    }
    response.truncate_words(MAX_GUIDANCE_WORDS);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCompletion;

    fn request() -> GuidanceRequest {
        GuidanceRequest {
            main_question: "Find the first repeated character in a string.".to_string(),
            history_str: None,
            new_user_query: "Should I use nested loops?".to_string(),
        }
    }

    fn llm_saying(guidance: &str) -> StructuredClient {
        let body = serde_json::json!({ "guidance": guidance }).to_string();
        StructuredClient::new(FakeCompletion::repeating(&body))
    }

    #[tokio::test]
    async fn test_short_guidance_passes_through() {
        let llm = llm_saying("What does a set let you check in constant time?");
        let out = generate_guidance(&request(), &llm).await.unwrap();
        assert_eq!(out.guidance, "What does a set let you check in constant time?");
    }

    #[tokio::test]
    async fn test_verbose_model_is_capped() {
        let rambling = (0..400).map(|i| format!("hint{i}")).collect::<Vec<_>>().join("  \n ");
        let llm = llm_saying(&rambling);
        let out = generate_guidance(&request(), &llm).await.unwrap();
        assert_eq!(word_count(&out.guidance), MAX_GUIDANCE_WORDS);
        assert!(out.guidance.starts_with("hint0 hint1"));
        assert!(out.guidance.ends_with("hint149"));
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_provider() {
        let fake = FakeCompletion::repeating(r#"{"guidance":"x"}"#);
        let llm = StructuredClient::new(fake.clone());
        let req = GuidanceRequest {
            new_user_query: "  ".to_string(),
            ..request()
        };
        let err = generate_guidance(&req, &llm).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_guidance_is_schema_violation() {
        let llm = llm_saying("");
        let err = generate_guidance(&request(), &llm).await.unwrap_err();
        assert!(matches!(err, AppError::SchemaViolation(_)));
    }
}
