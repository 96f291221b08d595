//! Resume screening — PDF text extraction, cleanup, and LLM analysis.

use crate::errors::AppError;
use crate::extraction;
use crate::hr::prompts::RESUME_PROMPT_TEMPLATE;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;

/// Collapses whitespace and strips everything but alphanumerics and spaces.
/// PDF extraction leaves ligatures, bullets, and control characters that only
/// confuse the model.
pub fn clean_resume_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect()
}

/// Screens an uploaded resume PDF: extract text, clean it, and ask the model
/// for a structured summary. Unreadable or empty PDFs are 422s.
pub async fn screen_resume(llm: &LlmClient, pdf_bytes: &[u8]) -> Result<String, AppError> {
    let raw = pdf_extract::extract_text_from_mem(pdf_bytes)
        .map_err(|e| AppError::UnprocessableEntity(format!("Failed to process resume: {e}")))?;

    let cleaned = clean_resume_text(&raw);
    if cleaned.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF".to_string(),
        ));
    }

    let prompt = RESUME_PROMPT_TEMPLATE.replace("{resume_text}", &cleaned);
    let reply = llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    Ok(extraction::passthrough(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(
            clean_resume_text("Jane\n\nDoe\t Senior   Engineer"),
            "Jane Doe Senior Engineer"
        );
    }

    #[test]
    fn test_clean_strips_punctuation() {
        assert_eq!(
            clean_resume_text("C++, Rust & Go (5 yrs)"),
            "C Rust  Go 5 yrs"
        );
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean_resume_text("  \n\t "), "");
    }
}
