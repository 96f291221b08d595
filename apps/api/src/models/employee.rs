use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryDetailRow {
    pub id: i64,
    pub employee_id: i64,
    pub basic_pay: f64,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Salary detail joined with the employee's name for listing views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryDetailWithName {
    pub employee_id: i64,
    pub employee_name: String,
    pub basic_pay: f64,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRow {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
}

/// Attendance record joined with the employee's name for listing views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceWithName {
    pub employee_id: i64,
    pub employee_name: String,
    pub date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
}
