use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::info;

use crate::database::models::{Employee, EmployeeDraft};
use crate::error::{RegistryError, Result};
use crate::handlers::{employee_location, AppState};

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>> {
    let employee = state.registry.find(id).await?;
    Ok(Json(employee))
}

/// A missing body, a JSON `null` or a body that is not an employee all
/// reach the registry as an absent draft.
pub async fn create_employee(
    State(state): State<AppState>,
    payload: Option<Json<Option<EmployeeDraft>>>,
) -> Result<Response> {
    let draft = payload.and_then(|Json(draft)| draft);
    let employee = state.registry.create(draft).await?;

    info!("Employee {} created", employee.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, employee_location(employee.id))],
        Json(employee),
    )
        .into_response())
}

/// Body errors are rejected with the same 400 as create.
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Option<Json<EmployeeDraft>>,
) -> Result<Json<Employee>> {
    let Json(draft) = payload.ok_or_else(RegistryError::missing_body)?;
    let employee = state.registry.update(id, draft).await?;
    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.registry.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
