//! Salary ledger: current salary, component updates and payment status.

use chrono::Utc;
use log::info;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors};
use crate::models::employee::Employee;
use crate::models::salary::{Salary, SalaryComponents, SalaryStatus};
use crate::services::Backend;
use crate::session::Session;
use crate::utils::validation::coerce_amount;

/// Loosely typed salary form; every component defaults to zero.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SalaryInput {
    pub salary: Option<Value>,
    pub allowance: Option<Value>,
    pub deduction: Option<Value>,
}

impl SalaryInput {
    pub fn components(&self) -> Result<SalaryComponents, AppError> {
        let mut errors = FieldErrors::new();
        let mut amount = |field: &str, value: &Option<Value>| {
            coerce_amount(value.as_ref()).unwrap_or_else(|message| {
                errors.insert(field.to_string(), message.to_string());
                Default::default()
            })
        };
        let components = SalaryComponents {
            salary: amount("salary", &self.salary),
            allowance: amount("allowance", &self.allowance),
            deduction: amount("deduction", &self.deduction),
        };
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        if components.total().is_none() {
            return Err(AppError::field("total", "Total is outside the supported range"));
        }
        Ok(components)
    }
}

async fn load_employee(backend: &Backend, employee_id: Uuid) -> Result<Employee, AppError> {
    backend
        .call("Employee lookup", backend.employees.find(employee_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
}

/// Latest salary row; `None` means no salary has been set yet.
pub async fn current_salary(
    backend: &Backend,
    session: &Session,
    employee_id: Uuid,
) -> Result<Option<Salary>, AppError> {
    let employee = load_employee(backend, employee_id).await?;
    if !session.is_admin() && employee.user_id != session.user_id {
        return Err(AppError::Forbidden(
            "You can only view your own salary".to_string(),
        ));
    }
    backend
        .call("Salary lookup", backend.salaries.latest(employee.id))
        .await
}

/// Updates the latest row in place when there is one, otherwise starts an unpaid row.
/// Never touches status or pay date.
pub async fn submit_salary(
    backend: &Backend,
    session: &Session,
    employee_id: Uuid,
    input: &SalaryInput,
) -> Result<Salary, AppError> {
    session.require_admin()?;
    let components = input.components()?;
    let employee = load_employee(backend, employee_id).await?;

    let latest = backend
        .call("Salary lookup", backend.salaries.latest(employee.id))
        .await?;

    let salary = match latest {
        Some(row) => {
            backend
                .call(
                    "Salary update",
                    backend.salaries.update_components(row.id, &components),
                )
                .await?
        }
        None => {
            backend
                .call("Salary creation", backend.salaries.insert(employee.id, &components))
                .await?
        }
    };

    info!(
        "Salary for {} set to total {} by {}",
        employee.emp_id, salary.total, session.email
    );
    Ok(salary)
}

/// Moves the latest row to paid with today's date. An already paid row is
/// returned as stored.
pub async fn mark_paid(
    backend: &Backend,
    session: &Session,
    employee_id: Uuid,
) -> Result<Salary, AppError> {
    session.require_admin()?;
    let employee = load_employee(backend, employee_id).await?;

    let latest = backend
        .call("Salary lookup", backend.salaries.latest(employee.id))
        .await?
        .ok_or_else(|| AppError::NotFound("No salary record to mark as paid".to_string()))?;

    if latest.status == SalaryStatus::Paid {
        return Ok(latest);
    }

    let today = Utc::now().date_naive();
    match backend
        .call("Salary payment", backend.salaries.mark_paid(latest.id, today))
        .await?
    {
        Some(paid) => {
            info!("Salary {} for {} marked paid on {}", paid.id, employee.emp_id, today);
            Ok(paid)
        }
        // Paid concurrently by another session; report what is stored.
        None => backend
            .call("Salary lookup", backend.salaries.latest(employee.id))
            .await?
            .ok_or_else(|| AppError::NotFound("No salary record to mark as paid".to_string())),
    }
}
