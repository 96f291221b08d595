// Commerce module LLM prompt templates.
// Every analysis call shares the context/task wrapper; each operation supplies
// its own task line and a plain-text data context.

/// Shared analysis wrapper. Replace `{context}` and `{task}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Context: {context}

Task: {task}

Please provide a detailed analysis focusing on actionable insights."#;

pub const MARKET_TRENDS_TASK: &str =
    "Analyze the e-commerce sector trends and provide strategic insights";

/// Replace `{category}` before sending.
pub const PRICING_TASK_TEMPLATE: &str =
    "Provide pricing optimization recommendations for {category} category";

/// The reply feeds `extraction::percentage`, so the task pins the format.
pub const PURCHASE_PROBABILITY_TASK: &str = "Predict purchase probability and provide reasoning. \
    Begin your reply with the probability as a bare percentage, for example: 72% ...";

pub const COMPETITOR_TASK: &str =
    "Analyze competitor positioning and provide strategic recommendations";

pub const SEGMENTS_TASK: &str = "Analyze customer segments and provide targeting recommendations";

pub const REPORT_MARKET_TASK: &str = "Generate comprehensive market analysis section";

pub const REPORT_PRICING_TASK: &str = "Generate pricing strategy analysis section";

pub const REPORT_COMPETITOR_TASK: &str = "Generate competitor analysis section";

/// Builds the shared analysis prompt from a task and a data context.
pub fn analysis_prompt(task: &str, context: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{task}", task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_renders_both_slots() {
        let prompt = analysis_prompt("Do the thing", "data here");
        assert!(prompt.starts_with("Context: data here"));
        assert!(prompt.contains("Task: Do the thing"));
        assert!(prompt.contains("actionable insights"));
    }

    #[test]
    fn test_pricing_task_renders_category() {
        let task = PRICING_TASK_TEMPLATE.replace("{category}", "Electronics");
        assert_eq!(
            task,
            "Provide pricing optimization recommendations for Electronics category"
        );
    }
}
