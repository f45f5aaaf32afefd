use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::salary::{Salary, SalaryComponents, SalaryStatus};
use crate::repository::{stored_total, RepoResult, SalaryRepository};

const SALARY_COLUMNS: &str =
    "id, employee_id, salary, allowance, deduction, total, status, pay_date, created_at";

#[derive(Clone)]
pub struct PgSalaryStore {
    pool: PgPool,
}

impl PgSalaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalaryRepository for PgSalaryStore {
    async fn latest(&self, employee_id: Uuid) -> RepoResult<Option<Salary>> {
        let salary = sqlx::query_as::<_, Salary>(&format!(
            "SELECT {} FROM salaries WHERE employee_id = $1 ORDER BY created_at DESC LIMIT 1",
            SALARY_COLUMNS
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(salary)
    }

    async fn insert(&self, employee_id: Uuid, components: &SalaryComponents) -> RepoResult<Salary> {
        let salary = sqlx::query_as::<_, Salary>(&format!(
            "INSERT INTO salaries (id, employee_id, salary, allowance, deduction, total, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            SALARY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(components.salary)
        .bind(components.allowance)
        .bind(components.deduction)
        .bind(stored_total(components)?)
        .bind(SalaryStatus::Unpaid)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(salary)
    }

    async fn update_components(&self, id: Uuid, components: &SalaryComponents) -> RepoResult<Salary> {
        let salary = sqlx::query_as::<_, Salary>(&format!(
            "UPDATE salaries SET salary = $1, allowance = $2, deduction = $3, total = $4 \
             WHERE id = $5 RETURNING {}",
            SALARY_COLUMNS
        ))
        .bind(components.salary)
        .bind(components.allowance)
        .bind(components.deduction)
        .bind(stored_total(components)?)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(salary)
    }

    async fn mark_paid(&self, id: Uuid, pay_date: NaiveDate) -> RepoResult<Option<Salary>> {
        let salary = sqlx::query_as::<_, Salary>(&format!(
            "UPDATE salaries SET status = $1, pay_date = $2 \
             WHERE id = $3 AND status = $4 RETURNING {}",
            SALARY_COLUMNS
        ))
        .bind(SalaryStatus::Paid)
        .bind(pay_date)
        .bind(id)
        .bind(SalaryStatus::Unpaid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(salary)
    }
}
