use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::AppError;
use crate::repository::{
    DepartmentRepository, EmployeeRepository, IdentityAdmin, IdentityProvider, ProfileRepository,
    SalaryRepository,
};

pub mod account;
pub mod departments;
pub mod directory;
pub mod ledger;
pub mod lifecycle;
pub mod saga;

/// Handles to every external port plus the per-call time limit.
#[derive(Clone)]
pub struct Backend {
    pub identities: Arc<dyn IdentityProvider>,
    pub identity_admin: Arc<dyn IdentityAdmin>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub salaries: Arc<dyn SalaryRepository>,
    pub timeout: Duration,
}

impl Backend {
    /// Runs one remote call under the configured time limit.
    pub async fn call<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                log::error!("{} timed out after {:?}", operation, self.timeout);
                Err(AppError::Timeout { operation })
            }
        }
    }
}
