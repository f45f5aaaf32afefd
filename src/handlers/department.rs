use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::departments::{self, DepartmentInput};
use crate::session::Session;
use crate::state::AppState;

pub async fn get_departments(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let departments = departments::list(&state.backend, &session).await?;
    Ok(HttpResponse::Ok().json(departments))
}

pub async fn create_department(
    state: web::Data<AppState>,
    session: Session,
    payload: web::Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    let department = departments::create(&state.backend, &session, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(department))
}

pub async fn update_department(
    state: web::Data<AppState>,
    session: Session,
    department_id: web::Path<Uuid>,
    payload: web::Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    let department = departments::rename(
        &state.backend,
        &session,
        department_id.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    state: web::Data<AppState>,
    session: Session,
    department_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    departments::delete(&state.backend, &session, department_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted successfully",
    })))
}
