use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::services::account::{self, PasswordChange};
use crate::session::Session;
use crate::state::AppState;

pub async fn get_my_profile(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let profile = account::my_profile(&state.backend, &session).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn change_password(
    state: web::Data<AppState>,
    session: Session,
    payload: web::Json<PasswordChange>,
) -> Result<HttpResponse, AppError> {
    account::change_password(&state.backend, &session, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Password updated successfully",
    })))
}
