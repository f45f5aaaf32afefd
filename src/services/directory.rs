//! Read-side views: employee directory, single employee detail and dashboard counts.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::DirectoryEntry;
use crate::models::salary::SalaryStatus;
use crate::services::Backend;
use crate::session::Session;

pub const EMPTY_DIRECTORY_MESSAGE: &str = "No employees found";

#[derive(Debug, Serialize)]
pub struct EmployeeLinks {
    pub detail: String,
    pub edit: String,
    pub salary: String,
    pub delete: String,
}

impl EmployeeLinks {
    fn for_entry(entry: &DirectoryEntry) -> Self {
        Self {
            detail: format!("/v1/employees/{}", entry.id),
            edit: format!("/v1/employees/{}", entry.id),
            salary: format!("/v1/employees/{}/salary", entry.id),
            delete: format!("/v1/employees/user/{}?confirm=true", entry.user_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DirectoryRow {
    #[serde(flatten)]
    pub entry: DirectoryEntry,
    pub links: EmployeeLinks,
}

impl From<DirectoryEntry> for DirectoryRow {
    fn from(entry: DirectoryEntry) -> Self {
        let links = EmployeeLinks::for_entry(&entry);
        Self { entry, links }
    }
}

#[derive(Debug, Serialize)]
pub struct DirectoryView {
    pub employees: Vec<DirectoryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl DirectoryView {
    fn new(entries: Vec<DirectoryEntry>) -> Self {
        let message = entries.is_empty().then_some(EMPTY_DIRECTORY_MESSAGE);
        Self {
            employees: entries.into_iter().map(DirectoryRow::from).collect(),
            message,
        }
    }
}

/// Case-insensitive substring match on the employee name only.
pub fn filter_by_name(entries: Vec<DirectoryEntry>, search: Option<&str>) -> Vec<DirectoryEntry> {
    let needle = match search.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return entries,
    };
    entries
        .into_iter()
        .filter(|entry| entry.name.to_lowercase().contains(&needle))
        .collect()
}

pub async fn list(
    backend: &Backend,
    session: &Session,
    search: Option<&str>,
) -> Result<DirectoryView, AppError> {
    session.require_admin()?;
    let entries = backend
        .call("Directory query", backend.employees.directory())
        .await?;
    Ok(DirectoryView::new(filter_by_name(entries, search)))
}

pub async fn detail(
    backend: &Backend,
    session: &Session,
    employee_id: Uuid,
) -> Result<DirectoryRow, AppError> {
    let entry = backend
        .call("Employee lookup", backend.employees.directory_entry(employee_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    if !session.is_admin() && entry.user_id != session.user_id {
        return Err(AppError::Forbidden(
            "You can only view your own record".to_string(),
        ));
    }
    Ok(entry.into())
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub employees: i64,
    pub departments: i64,
    pub salaries_paid: i64,
    pub salaries_unpaid: i64,
    pub salaries_unset: i64,
}

pub async fn dashboard(backend: &Backend, session: &Session) -> Result<DashboardStats, AppError> {
    session.require_admin()?;

    let employees = backend.call("Employee count", backend.employees.count()).await?;
    let departments = backend
        .call("Department count", backend.departments.count())
        .await?;
    let entries = backend
        .call("Directory query", backend.employees.directory())
        .await?;

    let mut stats = DashboardStats {
        employees,
        departments,
        ..Default::default()
    };
    for entry in &entries {
        match entry.salary_status {
            Some(SalaryStatus::Paid) => stats.salaries_paid += 1,
            Some(SalaryStatus::Unpaid) => stats.salaries_unpaid += 1,
            None => stats.salaries_unset += 1,
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::repository::memory::MemoryBackend;
    use crate::services::ledger::{mark_paid, submit_salary, SalaryInput};
    use crate::services::lifecycle::{create_employee, NewEmployee};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn entry(name: &str, department: &str) -> DirectoryEntry {
        DirectoryEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            emp_id: "EMP000001".to_string(),
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            department_id: Uuid::new_v4(),
            department_name: Some(department.to_string()),
            salary: None,
            salary_total: None,
            salary_status: None,
            pay_date: None,
            created_at: Utc::now(),
        }
    }

    fn hire(name: &str, email: &str, department_id: Uuid) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            date_of_birth: "1992-06-30".to_string(),
            department_id: department_id.to_string(),
        }
    }

    #[test]
    fn test_search_matches_name_only() {
        let entries = vec![
            entry("Anna", "Sales"),
            entry("Susan", "Sales"),
            entry("Bob", "Analytics"),
        ];
        let names: Vec<String> = filter_by_name(entries, Some("an"))
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Anna", "Susan"]);
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let entries = vec![entry("Anna", "Sales"), entry("Bob", "Analytics")];
        assert_eq!(filter_by_name(entries, Some("  ")).len(), 2);
    }

    #[actix_web::test]
    async fn test_directory_joins_department_and_latest_salary() {
        let memory = MemoryBackend::new();
        let backend = memory.backend();
        let admin = memory.seed_admin("root@corp.io", "rootpass");
        let sales = memory.seed_department("Sales");
        let anna = create_employee(&backend, &admin, hire("Anna", "anna@corp.io", sales.id))
            .await
            .unwrap()
            .employee;
        create_employee(&backend, &admin, hire("Bob", "bob@corp.io", sales.id))
            .await
            .unwrap();
        let salary: SalaryInput = serde_json::from_value(json!({"salary": 3000, "allowance": 250})).unwrap();
        submit_salary(&backend, &admin, anna.id, &salary).await.unwrap();

        let view = list(&backend, &admin, None).await.unwrap();

        assert!(view.message.is_none());
        // Newest first.
        assert_eq!(view.employees[0].entry.name, "Bob");
        let anna_row = &view.employees[1];
        assert_eq!(anna_row.entry.department_name.as_deref(), Some("Sales"));
        assert_eq!(anna_row.entry.salary_total, Some(Decimal::from(3250)));
        assert_eq!(anna_row.entry.salary_status, Some(SalaryStatus::Unpaid));
        assert_eq!(anna_row.links.salary, format!("/v1/employees/{}/salary", anna.id));
    }

    #[actix_web::test]
    async fn test_empty_directory_has_message() {
        let memory = MemoryBackend::new();
        let backend = memory.backend();
        let admin = memory.seed_admin("root@corp.io", "rootpass");

        let view = list(&backend, &admin, Some("nobody")).await.unwrap();
        assert!(view.employees.is_empty());
        assert_eq!(view.message, Some(EMPTY_DIRECTORY_MESSAGE));
    }

    #[actix_web::test]
    async fn test_identity_without_employee_does_not_break_directory() {
        let memory = MemoryBackend::new();
        let backend = memory.backend();
        let admin = memory.seed_admin("root@corp.io", "rootpass");
        let sales = memory.seed_department("Sales");
        memory.fail("employees.insert");
        memory.fail("identities.delete");
        let _ = create_employee(&backend, &admin, hire("Orphan", "orphan@corp.io", sales.id)).await;
        memory.recover("employees.insert");

        let view = list(&backend, &admin, None).await.unwrap();
        assert!(view.employees.is_empty());
        assert_eq!(memory.identity_ids().len(), 2);
    }

    #[actix_web::test]
    async fn test_detail_restricted_to_owner() {
        let memory = MemoryBackend::new();
        let backend = memory.backend();
        let admin = memory.seed_admin("root@corp.io", "rootpass");
        let sales = memory.seed_department("Sales");
        let anna = create_employee(&backend, &admin, hire("Anna", "anna@corp.io", sales.id))
            .await
            .unwrap()
            .employee;

        let owner = Session::new(anna.user_id, "anna@corp.io", Role::Employee);
        let other = Session::new(Uuid::new_v4(), "bob@corp.io", Role::Employee);
        assert_eq!(detail(&backend, &owner, anna.id).await.unwrap().entry.name, "Anna");
        assert!(matches!(
            detail(&backend, &other, anna.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn test_dashboard_counts() {
        let memory = MemoryBackend::new();
        let backend = memory.backend();
        let admin = memory.seed_admin("root@corp.io", "rootpass");
        let sales = memory.seed_department("Sales");
        memory.seed_department("Support");
        let anna = create_employee(&backend, &admin, hire("Anna", "anna@corp.io", sales.id))
            .await
            .unwrap()
            .employee;
        let bob = create_employee(&backend, &admin, hire("Bob", "bob@corp.io", sales.id))
            .await
            .unwrap()
            .employee;
        create_employee(&backend, &admin, hire("Cy", "cy@corp.io", sales.id))
            .await
            .unwrap();
        let salary: SalaryInput = serde_json::from_value(json!({"salary": 100})).unwrap();
        submit_salary(&backend, &admin, anna.id, &salary).await.unwrap();
        submit_salary(&backend, &admin, bob.id, &salary).await.unwrap();
        mark_paid(&backend, &admin, bob.id).await.unwrap();

        let stats = dashboard(&backend, &admin).await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                employees: 3,
                departments: 2,
                salaries_paid: 1,
                salaries_unpaid: 1,
                salaries_unset: 1,
            }
        );
    }
}
