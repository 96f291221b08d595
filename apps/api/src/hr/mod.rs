// HR Management module.
// Implements: employee CRUD, salary details, payroll payslips, attendance,
// feedback sentiment analysis, resume screening, and the HR chat assistant.
// All LLM calls go through llm_client — no direct watsonx calls here.

pub mod handlers;
pub mod payroll;
pub mod prompts;
pub mod resume;
pub mod sentiment;
