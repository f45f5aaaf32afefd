use log::info;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::department::Department;
use crate::services::Backend;
use crate::session::Session;
use crate::utils::validation::validate_payload;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DepartmentInput {
    #[validate(length(min = 1, max = 64, message = "Department name must be 1-64 characters"))]
    pub name: String,
}

impl DepartmentInput {
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

fn name_taken(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Conflict("Department name already exists".to_string()),
        other => other,
    }
}

pub async fn list(backend: &Backend, _session: &Session) -> Result<Vec<Department>, AppError> {
    backend
        .call("Department listing", backend.departments.list())
        .await
}

pub async fn create(
    backend: &Backend,
    session: &Session,
    input: DepartmentInput,
) -> Result<Department, AppError> {
    session.require_admin()?;
    let input = input.normalized();
    validate_payload(&input)?;

    let department = backend
        .call("Department creation", backend.departments.create(&input.name))
        .await
        .map_err(name_taken)?;
    info!("Department '{}' created by {}", department.name, session.email);
    Ok(department)
}

pub async fn rename(
    backend: &Backend,
    session: &Session,
    department_id: Uuid,
    input: DepartmentInput,
) -> Result<Department, AppError> {
    session.require_admin()?;
    let input = input.normalized();
    validate_payload(&input)?;

    backend
        .call(
            "Department update",
            backend.departments.rename(department_id, &input.name),
        )
        .await
        .map_err(name_taken)?
        .ok_or_else(|| AppError::NotFound("Department not found".to_string()))
}

pub async fn delete(backend: &Backend, session: &Session, department_id: Uuid) -> Result<(), AppError> {
    session.require_admin()?;

    if backend
        .call("Department lookup", backend.departments.find(department_id))
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Department not found".to_string()));
    }

    let members = backend
        .call(
            "Department membership",
            backend.employees.count_in_department(department_id),
        )
        .await?;
    if members > 0 {
        return Err(AppError::Conflict(
            "Department still contains employees".to_string(),
        ));
    }

    backend
        .call("Department deletion", backend.departments.delete(department_id))
        .await?;
    info!("Department {} deleted by {}", department_id, session.email);
    Ok(())
}
