//! Feedback sentiment — asks the model for a `{score, label}` JSON verdict
//! and recovers it through the extraction layer.

use crate::errors::AppError;
use crate::extraction::{self, Extraction, Sentiment};
use crate::hr::prompts::SENTIMENT_PROMPT_TEMPLATE;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

/// Scores feedback text. The model call can fail loudly (upstream error);
/// an unusable reply cannot — it degrades to the neutral sentiment with the
/// reason attached.
pub async fn analyze_sentiment(
    llm: &LlmClient,
    text: &str,
) -> Result<Extraction<Sentiment>, AppError> {
    let prompt = SENTIMENT_PROMPT_TEMPLATE.replace("{text}", text);
    let reply = llm
        .generate(&prompt, JSON_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Sentiment analysis failed: {e}")))?;

    Ok(extraction::sentiment(&reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_prompt_embeds_text() {
        let prompt = SENTIMENT_PROMPT_TEMPLATE.replace("{text}", "great quarter, happy team");
        assert!(prompt.contains("Text: great quarter, happy team"));
        assert!(prompt.contains("'score' and 'label'"));
        assert!(!prompt.contains("{text}"));
    }
}
