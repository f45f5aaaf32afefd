use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::services::account::{self, LoginRequest};
use crate::session::Session;
use crate::state::AppState;

pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = account::login(&state.backend, &state.auth, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn logout(state: web::Data<AppState>, session: Session) -> HttpResponse {
    account::logout(&state.sessions, &session);
    HttpResponse::NoContent().finish()
}
