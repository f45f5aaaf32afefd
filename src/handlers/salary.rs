use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::ledger::{self, SalaryInput};
use crate::session::Session;
use crate::state::AppState;

pub async fn get_salary(
    state: web::Data<AppState>,
    session: Session,
    employee_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let salary = ledger::current_salary(&state.backend, &session, employee_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "salary": salary })))
}

pub async fn submit_salary(
    state: web::Data<AppState>,
    session: Session,
    employee_id: web::Path<Uuid>,
    payload: web::Json<SalaryInput>,
) -> Result<HttpResponse, AppError> {
    let salary = ledger::submit_salary(
        &state.backend,
        &session,
        employee_id.into_inner(),
        &payload,
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "salary": salary })))
}

pub async fn mark_paid(
    state: web::Data<AppState>,
    session: Session,
    employee_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let salary = ledger::mark_paid(&state.backend, &session, employee_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "salary": salary })))
}
