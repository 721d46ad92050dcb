use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::database::models::*;

/// Salaries are stored as TEXT so the decimal survives the round trip.
pub(crate) fn decode_salary(row: &SqliteRow) -> Result<Decimal, sqlx::Error> {
    let salary: String = row.try_get("salary")?;
    Decimal::from_str(&salary).map_err(|e| sqlx::Error::Decode(e.into()))
}

pub struct Queries;

impl Queries {
    pub async fn get_employee(pool: &SqlitePool, id: i64) -> Result<Option<Employee>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, admission_date, salary, department, extension
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Employee {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                admission_date: row.try_get("admission_date")?,
                salary: decode_salary(&row)?,
                department: row.try_get("department")?,
                extension: row.try_get("extension")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn insert_employee(pool: &SqlitePool, draft: &EmployeeDraft) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (name, admission_date, salary, department, extension)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.name)
        .bind(draft.admission_date)
        .bind(draft.salary.to_string())
        .bind(&draft.department)
        .bind(&draft.extension)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Returns the number of rows written.
    pub async fn update_employee(pool: &SqlitePool, employee: &Employee) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = ?, admission_date = ?, salary = ?, department = ?, extension = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.name)
        .bind(employee.admission_date)
        .bind(employee.salary.to_string())
        .bind(&employee.department)
        .bind(&employee.extension)
        .bind(employee.id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_employee(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_employees(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(pool)
            .await
    }
}
