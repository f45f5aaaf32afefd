use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::salary::SalaryStatus;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Uuid,
    pub emp_id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub department_id: Uuid,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmployeeRecord {
    pub user_id: Uuid,
    pub emp_id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub department_id: Uuid,
}

/// Admin-editable fields; `emp_id` and `user_id` are fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub department_id: Option<Uuid>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date_of_birth.is_none() && self.department_id.is_none()
    }
}

/// Employee joined with its department and most recent salary row.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub emp_id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub department_id: Uuid,
    pub department_name: Option<String>,
    pub salary: Option<Decimal>,
    pub salary_total: Option<Decimal>,
    pub salary_status: Option<SalaryStatus>,
    pub pay_date: Option<NaiveDate>,
    pub created_at: chrono::DateTime<Utc>,
}
