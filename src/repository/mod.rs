//! Ports to the external data and identity service.
//!
//! Workflows only talk to these traits. The `Pg*` types implement them on
//! PostgreSQL; `memory` provides a failure-injectable double for tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::employee::{DirectoryEntry, Employee, EmployeeChanges, NewEmployeeRecord};
use crate::models::salary::{Salary, SalaryComponents};
use crate::models::user::{AuthIdentity, IdentityMetadata, Profile};
use crate::session::Session;

pub mod department;
pub mod employee;
pub mod identity;
pub mod profile;
pub mod salary;

#[cfg(test)]
pub mod memory;

pub use department::PgDepartmentStore;
pub use employee::PgEmployeeStore;
pub use identity::{PgIdentityAdmin, PgIdentityStore};
pub use profile::PgProfileStore;
pub use salary::PgSalaryStore;

pub type RepoResult<T> = Result<T, AppError>;

/// Total written next to the components; stores refuse rows whose total
/// would not fit the column.
pub fn stored_total(components: &SalaryComponents) -> RepoResult<Decimal> {
    components.total().ok_or_else(|| {
        AppError::field("total", "Total is outside the supported range")
    })
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fails with `DuplicateEmail` or `WeakCredential` per the service's policy.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        metadata: IdentityMetadata,
    ) -> RepoResult<AuthIdentity>;

    /// Fails with `InvalidCredential` for an unknown email or wrong password.
    async fn authenticate(&self, email: &str, password: &str) -> RepoResult<AuthIdentity>;

    async fn update_password(&self, identity_id: Uuid, new_password: &str) -> RepoResult<()>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<AuthIdentity>>;
}

/// Privileged identity operations, only reachable with an admin session.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
    async fn delete_identity(&self, actor: &Session, identity_id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn insert(&self, profile: &Profile) -> RepoResult<()>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<Profile>>;
    async fn delete(&self, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<Department>>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<Department>>;
    async fn create(&self, name: &str) -> RepoResult<Department>;
    async fn rename(&self, id: Uuid, name: &str) -> RepoResult<Option<Department>>;
    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
    async fn count(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn insert(&self, record: &NewEmployeeRecord) -> RepoResult<Employee>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<Employee>>;
    async fn find_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Employee>>;
    async fn update(&self, id: Uuid, changes: &EmployeeChanges) -> RepoResult<Option<Employee>>;
    /// Returns whether a row was removed.
    async fn delete_by_user_id(&self, user_id: Uuid) -> RepoResult<bool>;
    async fn emp_id_exists(&self, emp_id: &str) -> RepoResult<bool>;
    async fn count(&self) -> RepoResult<i64>;
    async fn count_in_department(&self, department_id: Uuid) -> RepoResult<i64>;
    /// Employees joined with department and latest salary, newest first.
    async fn directory(&self) -> RepoResult<Vec<DirectoryEntry>>;
    async fn directory_entry(&self, id: Uuid) -> RepoResult<Option<DirectoryEntry>>;
}

#[async_trait]
pub trait SalaryRepository: Send + Sync {
    /// Most recently created row for the employee.
    async fn latest(&self, employee_id: Uuid) -> RepoResult<Option<Salary>>;
    async fn insert(&self, employee_id: Uuid, components: &SalaryComponents) -> RepoResult<Salary>;
    async fn update_components(&self, id: Uuid, components: &SalaryComponents) -> RepoResult<Salary>;
    /// Sets paid + pay date when the row is still unpaid; `None` otherwise.
    async fn mark_paid(&self, id: Uuid, pay_date: NaiveDate) -> RepoResult<Option<Salary>>;
}
