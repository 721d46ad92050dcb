pub mod employees;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::registry::EmployeeRegistry;

/// Resource base for the employee routes.
pub const EMPLOYEES_PATH: &str = "/api/funcionario";
const EMPLOYEE_BY_ID_PATH: &str = "/api/funcionario/:id";

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: EmployeeRegistry,
}

pub fn employee_location(id: i64) -> String {
    format!("{}/{}", EMPLOYEES_PATH, id)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(EMPLOYEES_PATH, post(employees::create_employee))
        .route(
            EMPLOYEE_BY_ID_PATH,
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "employee-registry",
        "timestamp": chrono::Utc::now(),
        "audit": {
            "table": state.config.audit.table_name,
            "failure_policy": state.registry.failure_policy()
        }
    }))
}
