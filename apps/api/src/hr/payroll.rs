//! Payroll — net salary computation and LLM-drafted payslips.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::extraction;
use crate::hr::prompts::PAYSLIP_PROMPT_TEMPLATE;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::employee::{EmployeeRow, SalaryDetailRow};

/// Net salary: basic pay plus bonuses minus deductions.
pub fn net_salary(basic_pay: f64, bonuses: &[f64], deductions: &[f64]) -> f64 {
    basic_pay + bonuses.iter().sum::<f64>() - deductions.iter().sum::<f64>()
}

pub struct PayslipDraft {
    pub payslip: String,
    pub net_pay: f64,
}

/// Drafts a payslip for the employee's latest salary details.
/// Missing employee or salary records surface as 404s — these are user-visible
/// failures, not extraction fallbacks.
pub async fn generate_payslip(
    pool: &PgPool,
    llm: &LlmClient,
    employee_id: i64,
    month: &str,
    year: i32,
    bonuses: &[f64],
    deductions: &[f64],
) -> Result<PayslipDraft, AppError> {
    let employee: Option<EmployeeRow> = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;
    let employee = employee
        .ok_or_else(|| AppError::NotFound(format!("No employee found with ID {employee_id}")))?;

    let salary: Option<SalaryDetailRow> = sqlx::query_as(
        "SELECT * FROM salary_details WHERE employee_id = $1 ORDER BY effective_date DESC LIMIT 1",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;
    let salary = salary.ok_or_else(|| {
        AppError::NotFound(format!("No salary details found for employee ID {employee_id}"))
    })?;

    let net_pay = net_salary(salary.basic_pay, bonuses, deductions);
    let prompt = PAYSLIP_PROMPT_TEMPLATE
        .replace("{employee_name}", &employee.name)
        .replace("{month}", month)
        .replace("{year}", &year.to_string())
        .replace("{basic_pay}", &format!("{:.2}", salary.basic_pay))
        .replace("{net_pay}", &format!("{net_pay:.2}"));

    let reply = llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Payslip generation failed: {e}")))?;

    Ok(PayslipDraft {
        payslip: extraction::passthrough(reply),
        net_pay,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_salary_basic_only() {
        assert!((net_salary(5000.0, &[], &[]) - 5000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_net_salary_with_bonuses_and_deductions() {
        // 5000 + (500 + 250) - (100 + 50) = 5600
        let net = net_salary(5000.0, &[500.0, 250.0], &[100.0, 50.0]);
        assert!((net - 5600.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_salary_deductions_can_exceed_pay() {
        let net = net_salary(1000.0, &[], &[1500.0]);
        assert!((net - -500.0).abs() < 1e-9);
    }

    #[test]
    fn test_payslip_prompt_renders_all_fields() {
        let prompt = PAYSLIP_PROMPT_TEMPLATE
            .replace("{employee_name}", "Ada")
            .replace("{month}", "March")
            .replace("{year}", "2025")
            .replace("{basic_pay}", "5000.00")
            .replace("{net_pay}", "5600.00");
        assert!(prompt.contains("Employee: Ada"));
        assert!(prompt.contains("Month: March 2025"));
        assert!(prompt.contains("Basic Pay: 5000.00"));
        assert!(prompt.contains("Net Pay (after bonuses and deductions): 5600.00"));
        assert!(!prompt.contains('{'));
    }
}
