//! Employee creation and deletion across identity, profile and employee records.

use chrono::Utc;
use futures_util::FutureExt;
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, Diagnostic};
use crate::models::employee::{Employee, EmployeeChanges, NewEmployeeRecord};
use crate::models::user::{IdentityMetadata, Profile, Role};
use crate::services::saga::Saga;
use crate::services::Backend;
use crate::session::Session;
use crate::utils::validation::{
    parse_date, validate_date_of_birth, validate_department_id, validate_email, validate_name,
    validate_password, validate_payload,
};

pub const EMP_ID_PREFIX: &str = "EMP";
const EMP_ID_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewEmployee {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[validate(custom = "validate_email")]
    pub email: String,
    #[validate(custom = "validate_password")]
    pub password: String,
    #[validate(custom = "validate_date_of_birth")]
    pub date_of_birth: String,
    #[validate(custom = "validate_department_id")]
    pub department_id: String,
}

/// Admin edit form; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EmployeeUpdate {
    #[validate(custom = "validate_name")]
    pub name: Option<String>,
    #[validate(custom = "validate_date_of_birth")]
    pub date_of_birth: Option<String>,
    #[validate(custom = "validate_department_id")]
    pub department_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedEmployee {
    pub employee: Employee,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct DeletionReport {
    pub user_id: Uuid,
    pub employee_removed: bool,
    pub profile_removed: bool,
    pub identity_removed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// `EMP` followed by the six low-order digits of a millisecond timestamp.
pub fn emp_id_from_millis(millis: i64) -> String {
    format!("{}{:06}", EMP_ID_PREFIX, millis.rem_euclid(1_000_000))
}

fn random_emp_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}{:06}", EMP_ID_PREFIX, suffix)
}

async fn allocate_emp_id(backend: &Backend) -> Result<String, AppError> {
    let mut candidate = emp_id_from_millis(Utc::now().timestamp_millis());
    for _ in 0..EMP_ID_ATTEMPTS {
        let taken = backend
            .call("Employee id check", backend.employees.emp_id_exists(&candidate))
            .await?;
        if !taken {
            return Ok(candidate);
        }
        log::warn!("Employee id {} already taken, trying another", candidate);
        candidate = random_emp_id();
    }
    Err(AppError::Conflict(
        "Could not allocate a unique employee id".to_string(),
    ))
}

fn signup_error(err: AppError) -> AppError {
    match err {
        AppError::DuplicateEmail | AppError::Timeout { .. } => err,
        AppError::WeakCredential(_) => {
            AppError::WeakCredential("Password must be at least 6 characters.".to_string())
        }
        other => AppError::BadRequest(format!("Signup failed: {}", other)),
    }
}

pub async fn create_employee(
    backend: &Backend,
    session: &Session,
    input: NewEmployee,
) -> Result<CreatedEmployee, AppError> {
    session.require_admin()?;
    validate_payload(&input)?;

    let date_of_birth = parse_date(&input.date_of_birth)
        .ok_or_else(|| AppError::field("date_of_birth", "Date of birth must be a valid date"))?;
    let department_id = Uuid::parse_str(input.department_id.trim())
        .map_err(|_| AppError::field("department_id", "Please select a department"))?;

    if backend
        .call("Department lookup", backend.departments.find(department_id))
        .await?
        .is_none()
    {
        return Err(AppError::field(
            "department_id",
            "Selected department does not exist",
        ));
    }

    let name = input.name.trim().to_string();
    let metadata = IdentityMetadata {
        name: name.clone(),
        role: Role::Employee,
    };

    let identity = backend
        .call(
            "Signup",
            backend
                .identities
                .create_identity(input.email.trim(), &input.password, metadata),
        )
        .await
        .map_err(signup_error)?;

    let mut saga = Saga::new("create employee");
    {
        let backend = backend.clone();
        let actor = session.clone();
        let identity_id = identity.id;
        saga.on_failure("delete identity", move || {
            async move {
                backend
                    .call(
                        "Identity deletion",
                        backend.identity_admin.delete_identity(&actor, identity_id),
                    )
                    .await
            }
            .boxed()
        });
    }

    let profile = Profile {
        id: identity.id,
        name: name.clone(),
        role: Role::Employee,
    };
    match backend
        .call("Profile creation", backend.profiles.insert(&profile))
        .await
    {
        Ok(()) => {
            let backend = backend.clone();
            let profile_id = profile.id;
            saga.on_failure("delete profile", move || {
                async move {
                    backend
                        .call("Profile deletion", backend.profiles.delete(profile_id))
                        .await
                }
                .boxed()
            });
        }
        Err(err) => saga.tolerate("create profile", &err),
    }

    let emp_id = match allocate_emp_id(backend).await {
        Ok(emp_id) => emp_id,
        Err(err) => return Err(saga.abort(err.context("Failed to create employee")).await),
    };

    let record = NewEmployeeRecord {
        user_id: identity.id,
        emp_id,
        name,
        date_of_birth,
        department_id,
    };

    match backend
        .call("Employee creation", backend.employees.insert(&record))
        .await
    {
        Ok(employee) => {
            info!(
                "Employee {} ({}) created by {}",
                employee.emp_id, employee.id, session.email
            );
            Ok(CreatedEmployee {
                employee,
                diagnostics: saga.complete(),
            })
        }
        Err(err) => Err(saga.abort(err.context("Failed to create employee")).await),
    }
}

pub async fn update_employee(
    backend: &Backend,
    session: &Session,
    employee_id: Uuid,
    input: EmployeeUpdate,
) -> Result<Employee, AppError> {
    session.require_admin()?;
    validate_payload(&input)?;

    let changes = EmployeeChanges {
        name: input.name.map(|name| name.trim().to_string()),
        date_of_birth: input.date_of_birth.as_deref().and_then(parse_date),
        department_id: input
            .department_id
            .as_deref()
            .and_then(|id| Uuid::parse_str(id.trim()).ok()),
    };

    if let Some(department_id) = changes.department_id {
        if backend
            .call("Department lookup", backend.departments.find(department_id))
            .await?
            .is_none()
        {
            return Err(AppError::field(
                "department_id",
                "Selected department does not exist",
            ));
        }
    }

    let employee = backend
        .call("Employee update", backend.employees.update(employee_id, &changes))
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    info!("Employee {} updated by {}", employee.emp_id, session.email);
    Ok(employee)
}

/// Removes the employee row, then its profile and identity. Only the first
/// step can fail the request.
pub async fn delete_employee(
    backend: &Backend,
    session: &Session,
    user_id: Uuid,
    confirmed: bool,
) -> Result<DeletionReport, AppError> {
    session.require_admin()?;
    if !confirmed {
        return Err(AppError::BadRequest(
            "Deletion must be confirmed with confirm=true".to_string(),
        ));
    }

    let removed = backend
        .call("Employee deletion", backend.employees.delete_by_user_id(user_id))
        .await?;
    if !removed {
        return Err(AppError::NotFound("Employee not found".to_string()));
    }

    let mut saga = Saga::new("delete employee");

    let profile_removed = match backend
        .call("Profile deletion", backend.profiles.delete(user_id))
        .await
    {
        Ok(()) => true,
        Err(err) => {
            saga.tolerate("delete profile", &err);
            false
        }
    };

    let identity_removed = match backend
        .call(
            "Identity deletion",
            backend.identity_admin.delete_identity(session, user_id),
        )
        .await
    {
        Ok(()) => true,
        Err(err) => {
            saga.tolerate("delete identity", &err);
            false
        }
    };

    info!("Employee with user id {} deleted by {}", user_id, session.email);

    Ok(DeletionReport {
        user_id,
        employee_removed: true,
        profile_removed,
        identity_removed,
        diagnostics: saga.complete(),
    })
}
