//! Per-request session context.
//!
//! A [`Session`] is created at login, travels as a signed bearer token, is
//! rebuilt from that token for every request and is torn down at logout by
//! revoking its token id.

use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::RwLock;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;
use crate::utils;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(skip)]
    pub token_id: Uuid,
    /// Token expiry as seconds since the epoch.
    #[serde(skip)]
    pub expires_at: usize,
}

impl Session {
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            token_id: Uuid::new_v4(),
            expires_at: usize::MAX,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator access required".to_string()))
        }
    }
}

/// Tokens are still accepted this long after `exp` (jsonwebtoken's default leeway).
const EXPIRY_LEEWAY_SECS: usize = 60;

fn now_secs() -> usize {
    Utc::now().timestamp().max(0) as usize
}

/// Token ids of sessions that have logged out, kept until the token itself
/// would be rejected as expired.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    revoked: RwLock<HashMap<Uuid, usize>>,
}

impl SessionRegistry {
    pub fn revoke(&self, token_id: Uuid, expires_at: usize) {
        if let Ok(mut revoked) = self.revoked.write() {
            let now = now_secs();
            revoked.retain(|_, exp| exp.saturating_add(EXPIRY_LEEWAY_SECS) >= now);
            revoked.insert(token_id, expires_at);
        }
    }

    pub fn is_revoked(&self, token_id: &Uuid) -> bool {
        self.revoked
            .read()
            .map(|revoked| revoked.contains_key(token_id))
            .unwrap_or(true)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn extract_session(req: &HttpRequest) -> Result<Session, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalServerError("Application state missing".to_string()))?;

    let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

    let claims = utils::jwt::validate_token(&state.auth.jwt_secret, token)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))?;
    let token_id = Uuid::parse_str(&claims.jti)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    if state.sessions.is_revoked(&token_id) {
        return Err(AppError::Unauthorized("Session has ended".to_string()));
    }

    Ok(Session {
        user_id,
        email: claims.email,
        role: claims.role,
        token_id,
        expires_at: claims.exp,
    })
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_session(req))
    }
}
