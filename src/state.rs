use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::repository::{
    PgDepartmentStore, PgEmployeeStore, PgIdentityAdmin, PgIdentityStore, PgProfileStore,
    PgSalaryStore,
};
use crate::services::Backend;
use crate::session::SessionRegistry;

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_ttl: chrono::Duration,
}

pub struct AppState {
    pub backend: Backend,
    pub auth: AuthSettings,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(backend: Backend, auth: AuthSettings) -> Self {
        Self {
            backend,
            auth,
            sessions: SessionRegistry::default(),
        }
    }

    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        let backend = Backend {
            identities: Arc::new(PgIdentityStore::new(pool.clone())),
            identity_admin: Arc::new(PgIdentityAdmin::new(pool.clone())),
            profiles: Arc::new(PgProfileStore::new(pool.clone())),
            departments: Arc::new(PgDepartmentStore::new(pool.clone())),
            employees: Arc::new(PgEmployeeStore::new(pool.clone())),
            salaries: Arc::new(PgSalaryStore::new(pool)),
            timeout: config.remote_timeout,
        };
        Self::new(
            backend,
            AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                jwt_ttl: config.jwt_ttl,
            },
        )
    }
}
