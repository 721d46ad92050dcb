pub mod models;
pub mod queries;
pub mod schema;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::debug;

use crate::error::{RegistryError, Result};
use models::{Employee, EmployeeDraft};
use queries::Queries;

/// Relational side of the registry: the authoritative employee table.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>>;

    /// Insert a new row and return it with the id the store assigned.
    async fn insert(&self, draft: &EmployeeDraft) -> Result<Employee>;

    /// Overwrite every mutable column of the row identified by `employee.id`.
    async fn update(&self, employee: &Employee) -> Result<()>;

    async fn delete(&self, employee: &Employee) -> Result<()>;
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Database { pool })
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same memory image.
    pub async fn new_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let database = Database { pool };
        database.run_migrations().await?;
        Ok(database)
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(schema::EMPLOYEES_SCHEMA)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count_employees(&self) -> Result<i64> {
        Ok(Queries::count_employees(&self.pool).await?)
    }
}

#[async_trait]
impl EmployeeStore for Database {
    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>> {
        Ok(Queries::get_employee(&self.pool, id).await?)
    }

    async fn insert(&self, draft: &EmployeeDraft) -> Result<Employee> {
        let id = Queries::insert_employee(&self.pool, draft).await?;
        debug!("Inserted employee {}", id);
        Ok(Employee::from_draft(id, draft))
    }

    async fn update(&self, employee: &Employee) -> Result<()> {
        match Queries::update_employee(&self.pool, employee).await? {
            0 => Err(RegistryError::Persistence(format!(
                "Employee {} vanished before update",
                employee.id
            ))),
            _ => Ok(()),
        }
    }

    async fn delete(&self, employee: &Employee) -> Result<()> {
        match Queries::delete_employee(&self.pool, employee.id).await? {
            0 => Err(RegistryError::Persistence(format!(
                "Employee {} vanished before delete",
                employee.id
            ))),
            _ => Ok(()),
        }
    }
}
