use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::Utc;
use sqlx::types::Json;

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

/// Display metadata attached to an identity when it is provisioned.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityMetadata {
    pub name: String,
    pub role: Role,
}

/// An authenticated account. The credential never leaves the identity store.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub metadata: Json<IdentityMetadata>,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}
