//! Axum route handlers for the HR Management API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::{self, FallbackReason};
use crate::hr::payroll::generate_payslip;
use crate::hr::prompts::CHAT_PROMPT_TEMPLATE;
use crate::hr::resume::screen_resume;
use crate::hr::sentiment::analyze_sentiment;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::models::employee::{
    AttendanceRow, AttendanceWithName, EmployeeRow, SalaryDetailRow, SalaryDetailWithName,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SaveSalaryRequest {
    pub employee_id: i64,
    pub basic_pay: f64,
}

#[derive(Debug, Deserialize)]
pub struct SalaryQuery {
    pub employee_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PayslipRequest {
    pub employee_id: i64,
    pub month: String,
    pub year: i32,
    #[serde(default)]
    pub bonuses: Vec<f64>,
    #[serde(default)]
    pub deductions: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct PayslipResponse {
    pub payslip: String,
    pub net_pay: f64,
}

#[derive(Debug, Deserialize)]
pub struct ClockRequest {
    pub employee_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub score: f64,
    pub label: String,
    /// False when the reply was unusable and the neutral default was substituted.
    pub extracted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

#[derive(Debug, Serialize)]
pub struct ResumeScreenResponse {
    pub analysis: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Employees
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/hr/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeRow>), AppError> {
    let row: EmployeeRow = sqlx::query_as(
        r#"
        INSERT INTO employees (name, email, department, role, hire_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.department)
    .bind(&req.role)
    .bind(req.hire_date)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/hr/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeRow>>, AppError> {
    let rows: Vec<EmployeeRow> = sqlx::query_as("SELECT * FROM employees ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// PATCH /api/v1/hr/employees/:id
pub async fn handle_update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeRow>, AppError> {
    let row: Option<EmployeeRow> = sqlx::query_as(
        r#"
        UPDATE employees
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            department = COALESCE($4, department),
            role = COALESCE($5, role),
            hire_date = COALESCE($6, hire_date)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.department)
    .bind(&req.role)
    .bind(req.hire_date)
    .fetch_optional(&state.db)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("No employee found with ID {id}")))?;
    Ok(Json(row))
}

/// DELETE /api/v1/hr/employees/:id
pub async fn handle_delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("No employee found with ID {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Salary details
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/hr/salaries
/// Save semantics: updates the employee's salary details when they exist,
/// inserts them otherwise. `effective_date` is always stamped today.
pub async fn handle_save_salary(
    State(state): State<AppState>,
    Json(req): Json<SaveSalaryRequest>,
) -> Result<Json<SalaryDetailRow>, AppError> {
    if req.basic_pay < 0.0 {
        return Err(AppError::Validation("basic_pay must be non-negative".to_string()));
    }

    let employee_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = $1")
        .bind(req.employee_id)
        .fetch_optional(&state.db)
        .await?;
    if employee_exists.is_none() {
        return Err(AppError::NotFound(format!(
            "No employee found with ID {}",
            req.employee_id
        )));
    }

    let existing: Option<SalaryDetailRow> =
        sqlx::query_as("SELECT * FROM salary_details WHERE employee_id = $1")
            .bind(req.employee_id)
            .fetch_optional(&state.db)
            .await?;

    let row: SalaryDetailRow = if existing.is_some() {
        sqlx::query_as(
            r#"
            UPDATE salary_details
            SET basic_pay = $2, effective_date = CURRENT_DATE
            WHERE employee_id = $1
            RETURNING *
            "#,
        )
        .bind(req.employee_id)
        .bind(req.basic_pay)
        .fetch_one(&state.db)
        .await?
    } else {
        sqlx::query_as(
            r#"
            INSERT INTO salary_details (employee_id, basic_pay, effective_date)
            VALUES ($1, $2, CURRENT_DATE)
            RETURNING *
            "#,
        )
        .bind(req.employee_id)
        .bind(req.basic_pay)
        .fetch_one(&state.db)
        .await?
    };

    Ok(Json(row))
}

/// GET /api/v1/hr/salaries
pub async fn handle_list_salaries(
    State(state): State<AppState>,
    Query(params): Query<SalaryQuery>,
) -> Result<Json<Vec<SalaryDetailWithName>>, AppError> {
    let rows: Vec<SalaryDetailWithName> = sqlx::query_as(
        r#"
        SELECT s.employee_id, e.name AS employee_name, s.basic_pay, s.effective_date
        FROM salary_details s
        JOIN employees e ON e.id = s.employee_id
        WHERE ($1::BIGINT IS NULL OR s.employee_id = $1)
        ORDER BY s.employee_id
        "#,
    )
    .bind(params.employee_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

// ────────────────────────────────────────────────────────────────────────────
// Payroll
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/hr/payroll/payslip
pub async fn handle_generate_payslip(
    State(state): State<AppState>,
    Json(req): Json<PayslipRequest>,
) -> Result<Json<PayslipResponse>, AppError> {
    let draft = generate_payslip(
        &state.db,
        &state.llm,
        req.employee_id,
        &req.month,
        req.year,
        &req.bonuses,
        &req.deductions,
    )
    .await?;

    Ok(Json(PayslipResponse {
        payslip: draft.payslip,
        net_pay: draft.net_pay,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Attendance
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/hr/attendance/clock-in
pub async fn handle_clock_in(
    State(state): State<AppState>,
    Json(req): Json<ClockRequest>,
) -> Result<(StatusCode, Json<AttendanceRow>), AppError> {
    let employee_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = $1")
        .bind(req.employee_id)
        .fetch_optional(&state.db)
        .await?;
    if employee_exists.is_none() {
        return Err(AppError::NotFound(format!(
            "No employee found with ID {}",
            req.employee_id
        )));
    }

    let row: AttendanceRow = sqlx::query_as(
        r#"
        INSERT INTO attendance (employee_id, date, clock_in)
        VALUES ($1, CURRENT_DATE, NOW())
        RETURNING *
        "#,
    )
    .bind(req.employee_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/v1/hr/attendance/clock-out
pub async fn handle_clock_out(
    State(state): State<AppState>,
    Json(req): Json<ClockRequest>,
) -> Result<Json<AttendanceRow>, AppError> {
    let row: Option<AttendanceRow> = sqlx::query_as(
        r#"
        UPDATE attendance
        SET clock_out = NOW()
        WHERE employee_id = $1 AND date = CURRENT_DATE
        RETURNING *
        "#,
    )
    .bind(req.employee_id)
    .fetch_optional(&state.db)
    .await?;

    let row = row.ok_or_else(|| {
        AppError::NotFound(format!(
            "No attendance record today for employee ID {}",
            req.employee_id
        ))
    })?;
    Ok(Json(row))
}

/// GET /api/v1/hr/attendance
pub async fn handle_list_attendance(
    State(state): State<AppState>,
    Query(params): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceWithName>>, AppError> {
    let rows: Vec<AttendanceWithName> = sqlx::query_as(
        r#"
        SELECT a.employee_id, e.name AS employee_name, a.date, a.clock_in, a.clock_out
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        WHERE ($1::BIGINT IS NULL OR a.employee_id = $1)
          AND ($2::DATE IS NULL OR a.date >= $2)
          AND ($3::DATE IS NULL OR a.date <= $3)
        ORDER BY a.date DESC, a.clock_in DESC
        "#,
    )
    .bind(params.employee_id)
    .bind(params.start_date)
    .bind(params.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

// ────────────────────────────────────────────────────────────────────────────
// AI-backed operations
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/hr/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let prompt = CHAT_PROMPT_TEMPLATE.replace("{query}", &req.query);
    let reply = state
        .llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("HR chat failed: {e}")))?;

    Ok(Json(ChatResponse {
        reply: extraction::passthrough(reply),
    }))
}

/// POST /api/v1/hr/sentiment
pub async fn handle_sentiment(
    State(state): State<AppState>,
    Json(req): Json<SentimentRequest>,
) -> Result<Json<SentimentResponse>, AppError> {
    let result = analyze_sentiment(&state.llm, &req.text).await?;

    Ok(Json(SentimentResponse {
        score: result.value.score,
        label: result.value.label,
        extracted: result.ok,
        fallback_reason: result.reason,
    }))
}

/// POST /api/v1/hr/resumes/screen (multipart, field name "file")
pub async fn handle_screen_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeScreenResponse>, AppError> {
    let mut pdf: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart upload: {e}")))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            pdf = Some(data);
        }
    }

    let pdf = pdf.ok_or_else(|| AppError::Validation("Missing 'file' field in upload".to_string()))?;
    let analysis = screen_resume(&state.llm, &pdf).await?;

    Ok(Json(ResumeScreenResponse { analysis }))
}
