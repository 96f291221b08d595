pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::commerce::handlers as commerce;
use crate::hr::handlers as hr;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // HR: employees
        .route(
            "/api/v1/hr/employees",
            get(hr::handle_list_employees).post(hr::handle_create_employee),
        )
        .route(
            "/api/v1/hr/employees/:id",
            patch(hr::handle_update_employee).delete(hr::handle_delete_employee),
        )
        // HR: salary details
        .route(
            "/api/v1/hr/salaries",
            get(hr::handle_list_salaries).post(hr::handle_save_salary),
        )
        // HR: payroll
        .route(
            "/api/v1/hr/payroll/payslip",
            post(hr::handle_generate_payslip),
        )
        // HR: attendance
        .route("/api/v1/hr/attendance/clock-in", post(hr::handle_clock_in))
        .route(
            "/api/v1/hr/attendance/clock-out",
            post(hr::handle_clock_out),
        )
        .route("/api/v1/hr/attendance", get(hr::handle_list_attendance))
        // HR: AI-backed operations
        .route("/api/v1/hr/chat", post(hr::handle_chat))
        .route("/api/v1/hr/sentiment", post(hr::handle_sentiment))
        .route("/api/v1/hr/resumes/screen", post(hr::handle_screen_resume))
        // Commerce analytics
        .route(
            "/api/v1/commerce/market-trends",
            get(commerce::handle_market_trends),
        )
        .route(
            "/api/v1/commerce/pricing/:category",
            get(commerce::handle_pricing),
        )
        .route(
            "/api/v1/commerce/purchase-probability",
            post(commerce::handle_purchase_probability),
        )
        .route(
            "/api/v1/commerce/competitors",
            get(commerce::handle_list_competitors).post(commerce::handle_add_competitor),
        )
        .route(
            "/api/v1/commerce/competitors/analysis",
            get(commerce::handle_competitor_analysis),
        )
        .route("/api/v1/commerce/segments", get(commerce::handle_segments))
        .route("/api/v1/commerce/report", get(commerce::handle_report))
        .with_state(state)
}
