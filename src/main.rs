mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod repository;
mod services;
mod session;
mod state;
mod utils;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;

use crate::config::AppConfig;
use crate::state::AppState;

fn startup_error(err: errors::AppError) -> io::Error {
    error!("{}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(startup_error)?;
    let pool = db::create_pool(&config).await.map_err(startup_error)?;
    let state = AppState::postgres(pool, &config);

    if let Some(admin) = &config.admin {
        services::account::ensure_admin(&state.backend, admin)
            .await
            .map_err(startup_error)?;
    }

    let state = web::Data::new(state);
    info!("Starting server at {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
