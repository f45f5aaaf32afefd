use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::services::directory;
use crate::session::Session;
use crate::state::AppState;

pub async fn get_dashboard(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let stats = directory::dashboard(&state.backend, &session).await?;
    Ok(HttpResponse::Ok().json(stats))
}
