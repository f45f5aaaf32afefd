use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::employee::{DirectoryEntry, Employee, EmployeeChanges, NewEmployeeRecord};
use crate::repository::{EmployeeRepository, RepoResult};

const EMPLOYEE_COLUMNS: &str = "id, user_id, emp_id, name, date_of_birth, department_id, created_at";

const DIRECTORY_SELECT: &str = r#"
    SELECT
        e.id,
        e.user_id,
        e.emp_id,
        e.name,
        e.date_of_birth,
        e.department_id,
        d.name AS department_name,
        s.salary,
        s.total AS salary_total,
        s.status AS salary_status,
        s.pay_date,
        e.created_at
    FROM employees e
    LEFT JOIN departments d ON d.id = e.department_id
    LEFT JOIN LATERAL (
        SELECT salary, total, status, pay_date
        FROM salaries
        WHERE employee_id = e.id
        ORDER BY created_at DESC
        LIMIT 1
    ) s ON TRUE
"#;

#[derive(Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeStore {
    async fn insert(&self, record: &NewEmployeeRecord) -> RepoResult<Employee> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "INSERT INTO employees (id, user_id, emp_id, name, date_of_birth, department_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            EMPLOYEE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.emp_id)
        .bind(&record.name)
        .bind(record.date_of_birth)
        .bind(record.department_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE user_id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn update(&self, id: Uuid, changes: &EmployeeChanges) -> RepoResult<Option<Employee>> {
        if changes.is_empty() {
            return self.find(id).await;
        }

        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE employees SET ");
        let mut separated = query.separated(", ");
        if let Some(name) = &changes.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            separated.push("date_of_birth = ");
            separated.push_bind_unseparated(date_of_birth);
        }
        if let Some(department_id) = changes.department_id {
            separated.push("department_id = ");
            separated.push_bind_unseparated(department_id);
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", EMPLOYEE_COLUMNS));

        let employee = query
            .build_query_as::<Employee>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn emp_id_exists(&self, emp_id: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE emp_id = $1)")
            .bind(emp_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn count(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_in_department(&self, department_id: Uuid) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE department_id = $1")
            .bind(department_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn directory(&self) -> RepoResult<Vec<DirectoryEntry>> {
        let entries = sqlx::query_as::<_, DirectoryEntry>(&format!(
            "{} ORDER BY e.created_at DESC",
            DIRECTORY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn directory_entry(&self, id: Uuid) -> RepoResult<Option<DirectoryEntry>> {
        let entry = sqlx::query_as::<_, DirectoryEntry>(&format!("{} WHERE e.id = $1", DIRECTORY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }
}
