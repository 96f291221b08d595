// HR module LLM prompt templates.
// All prompts for the HR module are defined here.

/// Payslip generation prompt.
/// Replace: {employee_name}, {month}, {year}, {basic_pay}, {net_pay}
pub const PAYSLIP_PROMPT_TEMPLATE: &str = r#"Generate a detailed payslip for:
Employee: {employee_name}
Month: {month} {year}
Basic Pay: {basic_pay}
Net Pay (after bonuses and deductions): {net_pay}"#;

/// HR chat assistant prompt. Replace `{query}` before sending.
pub const CHAT_PROMPT_TEMPLATE: &str = r#"You are an HR assistant. Please respond to this HR-related question:
Question: {query}
Provide a professional and helpful response."#;

/// Sentiment analysis prompt — the reply feeds `extraction::sentiment`.
/// Replace `{text}` before sending. Pair with `JSON_ONLY_SYSTEM`.
pub const SENTIMENT_PROMPT_TEMPLATE: &str = r#"Analyze the sentiment of this text and provide a score (-1 to 1) and label (positive/negative/neutral):
Text: {text}
Format the response as JSON with 'score' and 'label' fields. Return ONLY the JSON object."#;

/// Resume analysis prompt. Replace `{resume_text}` before sending.
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Please analyze this resume and provide the key information in a clear format:

Resume Text:
{resume_text}

Please extract and organize:
1. Personal Information
2. Professional Summary
3. Skills
4. Work Experience
5. Education

Make necessary corrections to words for example: Llama3370b should be written as Llama-3.3-70b."#;
