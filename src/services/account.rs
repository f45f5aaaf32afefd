//! Login, logout, self-service profile and password change, admin bootstrap.

use chrono::NaiveDate;
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::AdminBootstrap;
use crate::errors::AppError;
use crate::models::salary::SalaryStatus;
use crate::models::user::{IdentityMetadata, Profile, Role};
use crate::services::Backend;
use crate::session::{Session, SessionRegistry};
use crate::state::AuthSettings;
use crate::utils;
use crate::utils::validation::{validate_email, validate_password, validate_payload};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom = "validate_email")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[validate(custom = "validate_password")]
    pub new_password: String,
}

/// The signed-in employee's own record and current pay.
#[derive(Debug, Serialize)]
pub struct MyProfile {
    pub id: Uuid,
    pub name: String,
    pub emp_id: String,
    pub department: Option<String>,
    pub date_of_birth: NaiveDate,
    pub salary: Option<Decimal>,
    pub pay_date: Option<NaiveDate>,
    pub status: Option<SalaryStatus>,
}

pub async fn login(
    backend: &Backend,
    auth: &AuthSettings,
    input: LoginRequest,
) -> Result<LoginResponse, AppError> {
    validate_payload(&input)?;

    let identity = backend
        .call(
            "Login",
            backend.identities.authenticate(input.email.trim(), &input.password),
        )
        .await?;

    // The profile row is authoritative for the role; fall back to signup metadata
    // for identities whose profile insert failed.
    let (name, role) = match backend
        .call("Profile lookup", backend.profiles.find(identity.id))
        .await
    {
        Ok(Some(profile)) => (profile.name, profile.role),
        Ok(None) => (identity.metadata.name.clone(), identity.metadata.role),
        Err(err) => {
            warn!("Profile lookup for {} failed, using identity metadata: {}", identity.id, err);
            (identity.metadata.name.clone(), identity.metadata.role)
        }
    };

    let session = Session::new(identity.id, identity.email.clone(), role);
    let token = utils::jwt::generate_token(
        &auth.jwt_secret,
        session.user_id,
        &session.email,
        session.role,
        session.token_id,
        auth.jwt_ttl,
    )?;

    info!("{} signed in as {}", session.email, role.as_str());
    Ok(LoginResponse {
        token,
        user: SessionUser {
            id: identity.id,
            email: identity.email,
            name,
            role,
        },
    })
}

pub fn logout(sessions: &SessionRegistry, session: &Session) {
    sessions.revoke(session.token_id, session.expires_at);
    info!("{} signed out", session.email);
}

pub async fn my_profile(backend: &Backend, session: &Session) -> Result<MyProfile, AppError> {
    let employee = backend
        .call("Employee lookup", backend.employees.find_by_user_id(session.user_id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No employee record linked to this account".to_string())
        })?;

    let entry = backend
        .call("Employee lookup", backend.employees.directory_entry(employee.id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No employee record linked to this account".to_string())
        })?;

    Ok(MyProfile {
        id: entry.id,
        name: entry.name,
        emp_id: entry.emp_id,
        department: entry.department_name,
        date_of_birth: entry.date_of_birth,
        salary: entry.salary,
        pay_date: entry.pay_date,
        status: entry.salary_status,
    })
}

/// Re-authenticates with the old password before setting the new one.
pub async fn change_password(
    backend: &Backend,
    session: &Session,
    input: PasswordChange,
) -> Result<(), AppError> {
    validate_payload(&input)?;

    match backend
        .call(
            "Re-authentication",
            backend.identities.authenticate(&session.email, &input.old_password),
        )
        .await
    {
        Ok(_) => {}
        Err(AppError::InvalidCredential) => {
            return Err(AppError::BadRequest("Old password is incorrect".to_string()))
        }
        Err(err) => return Err(err),
    }

    backend
        .call(
            "Password update",
            backend.identities.update_password(session.user_id, &input.new_password),
        )
        .await?;
    info!("{} changed their password", session.email);
    Ok(())
}

/// Provisions the configured administrator unless the email is already registered.
pub async fn ensure_admin(backend: &Backend, admin: &AdminBootstrap) -> Result<(), AppError> {
    if backend
        .call("Identity lookup", backend.identities.find_by_email(&admin.email))
        .await?
        .is_some()
    {
        return Ok(());
    }

    let metadata = IdentityMetadata {
        name: admin.name.clone(),
        role: Role::Admin,
    };
    let identity = backend
        .call(
            "Admin signup",
            backend
                .identities
                .create_identity(&admin.email, &admin.password, metadata),
        )
        .await?;
    backend
        .call(
            "Admin profile creation",
            backend.profiles.insert(&Profile {
                id: identity.id,
                name: admin.name.clone(),
                role: Role::Admin,
            }),
        )
        .await?;

    info!("Provisioned administrator {}", admin.email);
    Ok(())
}
