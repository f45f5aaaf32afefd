use actix_web::{web, HttpResponse};
use log::warn;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::{AppError, Diagnostic};
use crate::services::{directory, lifecycle};
use crate::services::lifecycle::{EmployeeUpdate, NewEmployee};
use crate::session::Session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EmployeeQueryParams {
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    confirm: bool,
}

pub async fn create_employee(
    state: web::Data<AppState>,
    session: Session,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    let created = lifecycle::create_employee(&state.backend, &session, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_employees(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let view = directory::list(&state.backend, &session, query.search.as_deref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_employee(
    state: web::Data<AppState>,
    session: Session,
    employee_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let row = directory::detail(&state.backend, &session, employee_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(row))
}

pub async fn update_employee(
    state: web::Data<AppState>,
    session: Session,
    employee_id: web::Path<Uuid>,
    updates: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, AppError> {
    let employee = lifecycle::update_employee(
        &state.backend,
        &session,
        employee_id.into_inner(),
        updates.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Deletes by identity id and answers with the refreshed directory. The
/// refetch runs after the deletion committed, so its failure only costs the
/// listing.
pub async fn delete_employee(
    state: web::Data<AppState>,
    session: Session,
    user_id: web::Path<Uuid>,
    params: web::Query<DeleteParams>,
) -> Result<HttpResponse, AppError> {
    let mut report = lifecycle::delete_employee(
        &state.backend,
        &session,
        user_id.into_inner(),
        params.confirm,
    )
    .await?;

    let mut body = json!({
        "message": "Employee deleted successfully",
    });
    match directory::list(&state.backend, &session, None).await {
        Ok(view) => body["directory"] = json!(view),
        Err(err) => {
            warn!("Directory refresh after deleting {} failed: {}", report.user_id, err);
            report
                .diagnostics
                .push(Diagnostic::new("refresh directory", err.to_string()));
        }
    }
    body["report"] = json!(report);

    Ok(HttpResponse::Ok().json(body))
}
