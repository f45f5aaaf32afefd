use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

/// Decimal places kept by the NUMERIC(14, 2) salary columns.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest magnitude a NUMERIC(14, 2) column holds: 999 999 999 999.99.
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, AMOUNT_SCALE)
}

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "salary_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SalaryStatus {
    Unpaid,
    Paid,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Salary {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub salary: Decimal,
    pub allowance: Decimal,
    pub deduction: Decimal,
    pub total: Decimal,
    pub status: SalaryStatus,
    pub pay_date: Option<NaiveDate>,
    pub created_at: chrono::DateTime<Utc>,
}

/// The three editable components of a salary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalaryComponents {
    pub salary: Decimal,
    pub allowance: Decimal,
    pub deduction: Decimal,
}

impl SalaryComponents {
    /// `None` when the total overflows or does not fit the stored column.
    pub fn total(&self) -> Option<Decimal> {
        compute_total(self.salary, self.allowance, self.deduction)
    }
}

/// The only place `total` is derived.
pub fn compute_total(salary: Decimal, allowance: Decimal, deduction: Decimal) -> Option<Decimal> {
    salary
        .checked_add(allowance)?
        .checked_sub(deduction)
        .filter(|total| total.abs() <= max_amount())
}
