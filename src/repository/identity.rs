use argon2::{Argon2, password_hash::PasswordHasher, password_hash::SaltString, PasswordVerifier};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{AuthIdentity, IdentityMetadata};
use crate::repository::{IdentityAdmin, IdentityProvider, RepoResult};
use crate::session::Session;

/// Password policy enforced by the identity service itself.
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::InternalServerError("Hashing error".to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    argon2::PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn check_password_policy(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::WeakCredential(format!(
            "Password should be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    email: String,
    password_hash: String,
    metadata: Json<IdentityMetadata>,
    created_at: chrono::DateTime<Utc>,
}

impl From<IdentityRow> for AuthIdentity {
    fn from(row: IdentityRow) -> Self {
        AuthIdentity {
            id: row.id,
            email: row.email,
            metadata: row.metadata,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn row_by_email(&self, email: &str) -> RepoResult<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, password_hash, metadata, created_at FROM auth_identities WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityStore {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        metadata: IdentityMetadata,
    ) -> RepoResult<AuthIdentity> {
        check_password_policy(password)?;

        if self.row_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;
        let row = sqlx::query_as::<_, IdentityRow>(
            "INSERT INTO auth_identities (id, email, password_hash, metadata, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, email, password_hash, metadata, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&password_hash)
        .bind(Json(&metadata))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match AppError::from(err) {
            // Lost a race with a concurrent signup for the same address.
            AppError::Conflict(_) => AppError::DuplicateEmail,
            other => other,
        })?;

        Ok(row.into())
    }

    async fn authenticate(&self, email: &str, password: &str) -> RepoResult<AuthIdentity> {
        let row = self
            .row_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredential)?;

        if !verify_password(password, &row.password_hash) {
            return Err(AppError::InvalidCredential);
        }
        Ok(row.into())
    }

    async fn update_password(&self, identity_id: Uuid, new_password: &str) -> RepoResult<()> {
        check_password_policy(new_password)?;
        let password_hash = hash_password(new_password)?;

        let result = sqlx::query("UPDATE auth_identities SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(identity_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Identity not found".to_string()));
        }
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<AuthIdentity>> {
        Ok(self.row_by_email(email).await?.map(AuthIdentity::from))
    }
}

/// Trusted backend action for removing identities.
#[derive(Clone)]
pub struct PgIdentityAdmin {
    pool: PgPool,
}

impl PgIdentityAdmin {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityAdmin for PgIdentityAdmin {
    async fn delete_identity(&self, actor: &Session, identity_id: Uuid) -> RepoResult<()> {
        actor.require_admin()?;

        let result = sqlx::query("DELETE FROM auth_identities WHERE id = $1")
            .bind(identity_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Identity not found".to_string()));
        }
        Ok(())
    }
}
