use actix_web::web;

use crate::errors::AppError;

pub mod auth;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod salary;
pub mod user;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .service(web::resource("/v1/auth/login").route(web::post().to(auth::login)))
    .service(web::resource("/v1/auth/logout").route(web::post().to(auth::logout)))
    .service(web::resource("/v1/me").route(web::get().to(user::get_my_profile)))
    .service(web::resource("/v1/me/password").route(web::patch().to(user::change_password)))
    .service(web::resource("/v1/dashboard").route(web::get().to(dashboard::get_dashboard)))
    .service(
        web::resource("/v1/departments")
            .route(web::get().to(department::get_departments))
            .route(web::post().to(department::create_department)),
    )
    .service(
        web::resource("/v1/departments/{department_id}")
            .route(web::patch().to(department::update_department))
            .route(web::delete().to(department::delete_department)),
    )
    .service(
        web::resource("/v1/employees")
            .route(web::get().to(employee::get_employees))
            .route(web::post().to(employee::create_employee)),
    )
    .service(
        web::resource("/v1/employees/user/{user_id}")
            .route(web::delete().to(employee::delete_employee)),
    )
    .service(
        web::resource("/v1/employees/{employee_id}")
            .route(web::get().to(employee::get_employee))
            .route(web::patch().to(employee::update_employee)),
    )
    .service(
        web::resource("/v1/employees/{employee_id}/salary")
            .route(web::get().to(salary::get_salary))
            .route(web::put().to(salary::submit_salary)),
    )
    .service(
        web::resource("/v1/employees/{employee_id}/salary/paid")
            .route(web::post().to(salary::mark_paid)),
    );
}
