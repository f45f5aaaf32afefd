//! In-memory ports with failure injection, used by workflow and handler tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::department::Department;
use crate::models::employee::{DirectoryEntry, Employee, EmployeeChanges, NewEmployeeRecord};
use crate::models::salary::{Salary, SalaryComponents, SalaryStatus};
use crate::models::user::{AuthIdentity, IdentityMetadata, Profile};
use crate::repository::identity::check_password_policy;
use crate::repository::{
    DepartmentRepository, EmployeeRepository, IdentityAdmin, IdentityProvider, ProfileRepository,
    stored_total, RepoResult, SalaryRepository,
};
use crate::services::Backend;
use crate::session::Session;

#[derive(Default)]
struct Tables {
    identities: Vec<(AuthIdentity, String)>,
    profiles: Vec<Profile>,
    departments: Vec<Department>,
    employees: Vec<Employee>,
    salaries: Vec<Salary>,
    // Monotonic clock so "latest" ordering is deterministic.
    ticks: i64,
}

impl Tables {
    fn next_timestamp(&mut self) -> chrono::DateTime<Utc> {
        self.ticks += 1;
        Utc::now() + ChronoDuration::milliseconds(self.ticks)
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<&'static str>>,
    stalled: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    taken_emp_id_checks: Mutex<usize>,
    checked_emp_ids: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the named operation (e.g. `"employees.insert"`) fail.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Makes the named operation hang far beyond any test timeout.
    pub fn stall(&self, op: &'static str) {
        self.stalled.lock().unwrap().insert(op);
    }

    /// The next `checks` employee id lookups report the id as taken.
    pub fn occupy_emp_ids(&self, checks: usize) {
        *self.taken_emp_id_checks.lock().unwrap() = checks;
    }

    pub fn checked_emp_ids(&self) -> Vec<String> {
        self.checked_emp_ids.lock().unwrap().clone()
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    async fn enter(&self, op: &'static str) -> RepoResult<()> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;
        let stalled = self.stalled.lock().unwrap().contains(op);
        if stalled {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(AppError::DatabaseError(format!("{} failed", op)));
        }
        Ok(())
    }

    pub fn backend(self: &Arc<Self>) -> Backend {
        Backend {
            identities: self.clone(),
            identity_admin: self.clone(),
            profiles: self.clone(),
            departments: self.clone(),
            employees: self.clone(),
            salaries: self.clone(),
            timeout: Duration::from_millis(200),
        }
    }

    pub fn seed_department(&self, name: &str) -> Department {
        let mut tables = self.tables.lock().unwrap();
        let department = Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: tables.next_timestamp(),
        };
        tables.departments.push(department.clone());
        department
    }

    pub fn seed_admin(&self, email: &str, password: &str) -> Session {
        let mut tables = self.tables.lock().unwrap();
        let identity = AuthIdentity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            metadata: Json(IdentityMetadata {
                name: "Admin".to_string(),
                role: crate::models::user::Role::Admin,
            }),
            created_at: tables.next_timestamp(),
        };
        tables.profiles.push(Profile {
            id: identity.id,
            name: "Admin".to_string(),
            role: crate::models::user::Role::Admin,
        });
        tables.identities.push((identity.clone(), password.to_string()));
        Session::new(identity.id, email, crate::models::user::Role::Admin)
    }

    pub fn identity_ids(&self) -> Vec<Uuid> {
        self.tables.lock().unwrap().identities.iter().map(|(i, _)| i.id).collect()
    }

    pub fn profile_ids(&self) -> Vec<Uuid> {
        self.tables.lock().unwrap().profiles.iter().map(|p| p.id).collect()
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.tables.lock().unwrap().employees.clone()
    }

    pub fn salaries(&self) -> Vec<Salary> {
        self.tables.lock().unwrap().salaries.clone()
    }

    fn entry_for(tables: &Tables, employee: &Employee) -> DirectoryEntry {
        let department_name = tables
            .departments
            .iter()
            .find(|d| d.id == employee.department_id)
            .map(|d| d.name.clone());
        let latest = tables
            .salaries
            .iter()
            .filter(|s| s.employee_id == employee.id)
            .max_by_key(|s| s.created_at);
        DirectoryEntry {
            id: employee.id,
            user_id: employee.user_id,
            emp_id: employee.emp_id.clone(),
            name: employee.name.clone(),
            date_of_birth: employee.date_of_birth,
            department_id: employee.department_id,
            department_name,
            salary: latest.map(|s| s.salary),
            salary_total: latest.map(|s| s.total),
            salary_status: latest.map(|s| s.status),
            pay_date: latest.and_then(|s| s.pay_date),
            created_at: employee.created_at,
        }
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        metadata: IdentityMetadata,
    ) -> RepoResult<AuthIdentity> {
        self.enter("identities.create").await?;
        check_password_policy(password)?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .identities
            .iter()
            .any(|(i, _)| i.email.eq_ignore_ascii_case(email))
        {
            return Err(AppError::DuplicateEmail);
        }
        let identity = AuthIdentity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            metadata: Json(metadata),
            created_at: tables.next_timestamp(),
        };
        tables.identities.push((identity.clone(), password.to_string()));
        Ok(identity)
    }

    async fn authenticate(&self, email: &str, password: &str) -> RepoResult<AuthIdentity> {
        self.enter("identities.authenticate").await?;
        let tables = self.tables.lock().unwrap();
        tables
            .identities
            .iter()
            .find(|(i, secret)| i.email.eq_ignore_ascii_case(email) && secret == password)
            .map(|(i, _)| i.clone())
            .ok_or(AppError::InvalidCredential)
    }

    async fn update_password(&self, identity_id: Uuid, new_password: &str) -> RepoResult<()> {
        self.enter("identities.update_password").await?;
        check_password_policy(new_password)?;
        let mut tables = self.tables.lock().unwrap();
        let entry = tables
            .identities
            .iter_mut()
            .find(|(i, _)| i.id == identity_id)
            .ok_or_else(|| AppError::NotFound("Identity not found".to_string()))?;
        entry.1 = new_password.to_string();
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<AuthIdentity>> {
        self.enter("identities.find_by_email").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .identities
            .iter()
            .find(|(i, _)| i.email.eq_ignore_ascii_case(email))
            .map(|(i, _)| i.clone()))
    }
}

#[async_trait]
impl IdentityAdmin for MemoryBackend {
    async fn delete_identity(&self, actor: &Session, identity_id: Uuid) -> RepoResult<()> {
        actor.require_admin()?;
        self.enter("identities.delete").await?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.identities.len();
        tables.identities.retain(|(i, _)| i.id != identity_id);
        if tables.identities.len() == before {
            return Err(AppError::NotFound("Identity not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn insert(&self, profile: &Profile) -> RepoResult<()> {
        self.enter("profiles.insert").await?;
        let mut tables = self.tables.lock().unwrap();
        if tables.profiles.iter().any(|p| p.id == profile.id) {
            return Err(AppError::Conflict("duplicate key value violates unique constraint \"profiles_pkey\"".to_string()));
        }
        tables.profiles.push(profile.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Profile>> {
        self.enter("profiles.find").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.enter("profiles.delete").await?;
        self.tables.lock().unwrap().profiles.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl DepartmentRepository for MemoryBackend {
    async fn list(&self) -> RepoResult<Vec<Department>> {
        self.enter("departments.list").await?;
        let mut departments = self.tables.lock().unwrap().departments.clone();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Department>> {
        self.enter("departments.find").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.departments.iter().find(|d| d.id == id).cloned())
    }

    async fn create(&self, name: &str) -> RepoResult<Department> {
        self.enter("departments.create").await?;
        let mut tables = self.tables.lock().unwrap();
        if tables.departments.iter().any(|d| d.name == name) {
            return Err(AppError::Conflict("duplicate key value violates unique constraint \"departments_name_key\"".to_string()));
        }
        let department = Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: tables.next_timestamp(),
        };
        tables.departments.push(department.clone());
        Ok(department)
    }

    async fn rename(&self, id: Uuid, name: &str) -> RepoResult<Option<Department>> {
        self.enter("departments.rename").await?;
        let mut tables = self.tables.lock().unwrap();
        if tables.departments.iter().any(|d| d.name == name && d.id != id) {
            return Err(AppError::Conflict("duplicate key value violates unique constraint \"departments_name_key\"".to_string()));
        }
        Ok(tables.departments.iter_mut().find(|d| d.id == id).map(|d| {
            d.name = name.to_string();
            d.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        self.enter("departments.delete").await?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.departments.len();
        tables.departments.retain(|d| d.id != id);
        Ok(tables.departments.len() < before)
    }

    async fn count(&self) -> RepoResult<i64> {
        self.enter("departments.count").await?;
        Ok(self.tables.lock().unwrap().departments.len() as i64)
    }
}

#[async_trait]
impl EmployeeRepository for MemoryBackend {
    async fn insert(&self, record: &NewEmployeeRecord) -> RepoResult<Employee> {
        self.enter("employees.insert").await?;
        let mut tables = self.tables.lock().unwrap();
        if tables.employees.iter().any(|e| e.emp_id == record.emp_id) {
            return Err(AppError::Conflict("duplicate key value violates unique constraint \"employees_emp_id_key\"".to_string()));
        }
        let employee = Employee {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            emp_id: record.emp_id.clone(),
            name: record.name.clone(),
            date_of_birth: record.date_of_birth,
            department_id: record.department_id,
            created_at: tables.next_timestamp(),
        };
        tables.employees.push(employee.clone());
        Ok(employee)
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Employee>> {
        self.enter("employees.find").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Employee>> {
        self.enter("employees.find_by_user_id").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.employees.iter().find(|e| e.user_id == user_id).cloned())
    }

    async fn update(&self, id: Uuid, changes: &EmployeeChanges) -> RepoResult<Option<Employee>> {
        self.enter("employees.update").await?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.employees.iter_mut().find(|e| e.id == id).map(|e| {
            if let Some(name) = &changes.name {
                e.name = name.clone();
            }
            if let Some(date_of_birth) = changes.date_of_birth {
                e.date_of_birth = date_of_birth;
            }
            if let Some(department_id) = changes.department_id {
                e.department_id = department_id;
            }
            e.clone()
        }))
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> RepoResult<bool> {
        self.enter("employees.delete").await?;
        let mut tables = self.tables.lock().unwrap();
        let removed: Vec<Uuid> = tables
            .employees
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.id)
            .collect();
        tables.employees.retain(|e| e.user_id != user_id);
        tables.salaries.retain(|s| !removed.contains(&s.employee_id));
        Ok(!removed.is_empty())
    }

    async fn emp_id_exists(&self, emp_id: &str) -> RepoResult<bool> {
        self.enter("employees.emp_id_exists").await?;
        self.checked_emp_ids.lock().unwrap().push(emp_id.to_string());
        {
            let mut taken = self.taken_emp_id_checks.lock().unwrap();
            if *taken > 0 {
                *taken -= 1;
                return Ok(true);
            }
        }
        let tables = self.tables.lock().unwrap();
        Ok(tables.employees.iter().any(|e| e.emp_id == emp_id))
    }

    async fn count(&self) -> RepoResult<i64> {
        self.enter("employees.count").await?;
        Ok(self.tables.lock().unwrap().employees.len() as i64)
    }

    async fn count_in_department(&self, department_id: Uuid) -> RepoResult<i64> {
        self.enter("employees.count_in_department").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .employees
            .iter()
            .filter(|e| e.department_id == department_id)
            .count() as i64)
    }

    async fn directory(&self) -> RepoResult<Vec<DirectoryEntry>> {
        self.enter("employees.directory").await?;
        let tables = self.tables.lock().unwrap();
        let mut entries: Vec<DirectoryEntry> = tables
            .employees
            .iter()
            .map(|e| Self::entry_for(&tables, e))
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn directory_entry(&self, id: Uuid) -> RepoResult<Option<DirectoryEntry>> {
        self.enter("employees.directory_entry").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| Self::entry_for(&tables, e)))
    }
}

#[async_trait]
impl SalaryRepository for MemoryBackend {
    async fn latest(&self, employee_id: Uuid) -> RepoResult<Option<Salary>> {
        self.enter("salaries.latest").await?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .salaries
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn insert(&self, employee_id: Uuid, components: &SalaryComponents) -> RepoResult<Salary> {
        self.enter("salaries.insert").await?;
        let total = stored_total(components)?;
        let mut tables = self.tables.lock().unwrap();
        let salary = Salary {
            id: Uuid::new_v4(),
            employee_id,
            salary: components.salary,
            allowance: components.allowance,
            deduction: components.deduction,
            total,
            status: SalaryStatus::Unpaid,
            pay_date: None,
            created_at: tables.next_timestamp(),
        };
        tables.salaries.push(salary.clone());
        Ok(salary)
    }

    async fn update_components(&self, id: Uuid, components: &SalaryComponents) -> RepoResult<Salary> {
        self.enter("salaries.update").await?;
        let total = stored_total(components)?;
        let mut tables = self.tables.lock().unwrap();
        let salary = tables
            .salaries
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;
        salary.salary = components.salary;
        salary.allowance = components.allowance;
        salary.deduction = components.deduction;
        salary.total = total;
        Ok(salary.clone())
    }

    async fn mark_paid(&self, id: Uuid, pay_date: NaiveDate) -> RepoResult<Option<Salary>> {
        self.enter("salaries.mark_paid").await?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .salaries
            .iter_mut()
            .find(|s| s.id == id && s.status == SalaryStatus::Unpaid)
            .map(|s| {
                s.status = SalaryStatus::Paid;
                s.pay_date = Some(pay_date);
                s.clone()
            }))
    }
}
