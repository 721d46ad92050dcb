//! Partitioned Audit Table
//!
//! Audit store backed by a single SQLite table keyed by
//! `(partition_key, row_key)`. The store is addressed by a connection
//! string and a table name. Neither is checked until the first audit write.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::audit::entry::{ActionKind, AuditLogEntry};
use crate::audit::store::AuditStore;
use crate::database::queries::decode_salary;
use crate::error::{RegistryError, Result};

/// Table names follow the Azure Table rules: alphanumeric, starting with a
/// letter, 3 to 63 characters.
const TABLE_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9]{2,62}$";

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(TABLE_NAME_PATTERN).expect("table name pattern is valid"));

pub fn is_valid_table_name(name: &str) -> bool {
    TABLE_NAME_RE.is_match(name)
}

pub struct TableAuditStore {
    connection_string: String,
    table_name: String,
    cache_table_ready: bool,
    pool: OnceCell<SqlitePool>,
    table_ready: AtomicBool,
}

impl TableAuditStore {
    pub fn new(connection_string: String, table_name: String, cache_table_ready: bool) -> Self {
        Self {
            connection_string,
            table_name,
            cache_table_ready,
            pool: OnceCell::new(),
            table_ready: AtomicBool::new(false),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    fn checked_table_name(&self) -> Result<&str> {
        if is_valid_table_name(&self.table_name) {
            Ok(&self.table_name)
        } else {
            Err(RegistryError::audit(format!(
                "Invalid audit table name: {:?}",
                self.table_name
            )))
        }
    }

    /// Open the pool on first use and share it afterwards.
    async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async {
                let connection_string = self.connection_string.trim();
                if connection_string.is_empty() {
                    return Err(RegistryError::audit(
                        "Audit connection string is not configured",
                    ));
                }

                let options = SqliteConnectOptions::from_str(connection_string)
                    .map_err(RegistryError::audit)?
                    .create_if_missing(true);

                let pool_options = if connection_string.contains(":memory:") {
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    SqlitePoolOptions::new()
                };

                let pool = pool_options
                    .connect_with(options)
                    .await
                    .map_err(RegistryError::audit)?;

                info!("Connected to audit store");
                Ok(pool)
            })
            .await
    }

    fn entry_from_row(row: &SqliteRow) -> std::result::Result<AuditLogEntry, sqlx::Error> {
        let action: String = row.try_get("action")?;
        let action = action
            .parse::<ActionKind>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(AuditLogEntry {
            partition_key: row.try_get("partition_key")?,
            row_key: row.try_get("row_key")?,
            timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
            employee_id: row.try_get("employee_id")?,
            name: row.try_get("name")?,
            admission_date: row.try_get::<NaiveDate, _>("admission_date")?,
            salary: decode_salary(row)?,
            department: row.try_get("department")?,
            extension: row.try_get("extension")?,
            action,
        })
    }
}

#[async_trait]
impl AuditStore for TableAuditStore {
    async fn ensure_table_exists(&self) -> Result<()> {
        if self.cache_table_ready && self.table_ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let table = self.checked_table_name()?;
        let pool = self.pool().await?;

        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                partition_key TEXT NOT NULL,
                row_key TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                employee_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                admission_date TEXT NOT NULL,
                salary TEXT NOT NULL,
                department TEXT NOT NULL,
                extension TEXT NOT NULL,
                action TEXT NOT NULL,
                PRIMARY KEY (partition_key, row_key)
            )
            "#
        );
        sqlx::query(&ddl)
            .execute(pool)
            .await
            .map_err(RegistryError::audit)?;

        self.table_ready.store(true, Ordering::Release);
        debug!("Audit table {} is ready", table);
        Ok(())
    }

    async fn upsert(&self, entry: &AuditLogEntry) -> Result<()> {
        let table = self.checked_table_name()?;
        let pool = self.pool().await?;

        let sql = format!(
            r#"
            INSERT INTO {table} (partition_key, row_key, timestamp, employee_id, name,
                                 admission_date, salary, department, extension, action)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (partition_key, row_key) DO UPDATE SET
                timestamp = excluded.timestamp,
                employee_id = excluded.employee_id,
                name = excluded.name,
                admission_date = excluded.admission_date,
                salary = excluded.salary,
                department = excluded.department,
                extension = excluded.extension,
                action = excluded.action
            "#
        );
        sqlx::query(&sql)
            .bind(&entry.partition_key)
            .bind(&entry.row_key)
            .bind(entry.timestamp)
            .bind(entry.employee_id)
            .bind(&entry.name)
            .bind(entry.admission_date)
            .bind(entry.salary.to_string())
            .bind(&entry.department)
            .bind(&entry.extension)
            .bind(entry.action.as_str())
            .execute(pool)
            .await
            .map_err(RegistryError::audit)?;

        debug!("Wrote audit entry: {}", entry.summary());
        Ok(())
    }

    async fn list_partition(&self, partition_key: &str) -> Result<Vec<AuditLogEntry>> {
        self.ensure_table_exists().await?;
        let table = self.checked_table_name()?;
        let pool = self.pool().await?;

        let sql = format!(
            r#"
            SELECT partition_key, row_key, timestamp, employee_id, name,
                   admission_date, salary, department, extension, action
            FROM {table}
            WHERE partition_key = ?
            ORDER BY rowid
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(partition_key)
            .fetch_all(pool)
            .await
            .map_err(RegistryError::audit)?;

        rows.iter()
            .map(|row| Self::entry_from_row(row).map_err(RegistryError::audit))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Employee;
    use rust_decimal::Decimal;
    use tempfile::{tempdir, TempDir};

    fn employee(department: &str) -> Employee {
        Employee {
            id: 1,
            name: "Ana".to_string(),
            admission_date: NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
            salary: Decimal::from(5000),
            department: department.to_string(),
            extension: "1001".to_string(),
        }
    }

    fn memory_store(table: &str) -> TableAuditStore {
        TableAuditStore::new("sqlite::memory:".to_string(), table.to_string(), false)
    }

    fn file_url(temp_dir: &TempDir) -> String {
        format!("sqlite://{}", temp_dir.path().join("audit.db").display())
    }

    /// Drop the audit table behind the store's back, through a separate pool.
    async fn drop_table_externally(url: &str) {
        let pool = SqlitePool::connect(url).await.unwrap();
        sqlx::query("DROP TABLE FuncionarioLog")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }

    #[test]
    fn test_table_name_rules() {
        assert!(is_valid_table_name("FuncionarioLog"));
        assert!(is_valid_table_name("abc"));
        assert!(!is_valid_table_name("ab"));
        assert!(!is_valid_table_name("1audit"));
        assert!(!is_valid_table_name("audit_log"));
        assert!(!is_valid_table_name("audit; DROP TABLE employees"));
        assert!(!is_valid_table_name(&"a".repeat(64)));
    }

    #[tokio::test]
    async fn test_write_and_read_back_partition() {
        let store = memory_store("FuncionarioLog");
        store.ensure_table_exists().await.unwrap();

        let inserted = AuditLogEntry::new(&employee("TI"), ActionKind::Insertion);
        let updated = AuditLogEntry::new(&employee("TI"), ActionKind::Update);
        store.upsert(&inserted).await.unwrap();
        store.upsert(&updated).await.unwrap();
        store
            .upsert(&AuditLogEntry::new(&employee("RH"), ActionKind::Removal))
            .await
            .unwrap();

        let ti = store.list_partition("TI").await.unwrap();
        assert_eq!(ti.len(), 2);
        assert_eq!(ti[0].row_key, inserted.row_key);
        assert_eq!(ti[0].action, ActionKind::Insertion);
        assert_eq!(ti[1].action, ActionKind::Update);
        assert!(ti[0].matches(&employee("TI")));
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let store = memory_store("FuncionarioLog");
        store.ensure_table_exists().await.unwrap();
        store
            .upsert(&AuditLogEntry::new(&employee("TI"), ActionKind::Insertion))
            .await
            .unwrap();
        store.ensure_table_exists().await.unwrap();

        assert_eq!(store.list_partition("TI").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cached_ready_flag_skips_ensure() {
        let temp_dir = tempdir().unwrap();
        let url = file_url(&temp_dir);
        let store = TableAuditStore::new(url.clone(), "FuncionarioLog".to_string(), true);
        store.ensure_table_exists().await.unwrap();

        drop_table_externally(&url).await;

        // The remembered success short-circuits, so the table stays missing.
        store.ensure_table_exists().await.unwrap();
        assert!(matches!(
            store
                .upsert(&AuditLogEntry::new(&employee("TI"), ActionKind::Insertion))
                .await,
            Err(RegistryError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_uncached_ensure_recreates_dropped_table() {
        let temp_dir = tempdir().unwrap();
        let url = file_url(&temp_dir);
        let store = TableAuditStore::new(url.clone(), "FuncionarioLog".to_string(), false);
        store.ensure_table_exists().await.unwrap();

        drop_table_externally(&url).await;

        store.ensure_table_exists().await.unwrap();
        store
            .upsert(&AuditLogEntry::new(&employee("TI"), ActionKind::Insertion))
            .await
            .unwrap();
        assert_eq!(store.list_partition("TI").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_salary_survives_audit_table_exactly() {
        let store = memory_store("FuncionarioLog");
        store.ensure_table_exists().await.unwrap();

        let mut snapshot = employee("TI");
        snapshot.salary = Decimal::from_str("12345678901234567.89").unwrap();
        store
            .upsert(&AuditLogEntry::new(&snapshot, ActionKind::Insertion))
            .await
            .unwrap();

        let entries = store.list_partition("TI").await.unwrap();
        assert_eq!(entries[0].salary, snapshot.salary);
        assert!(entries[0].matches(&snapshot));
    }

    #[tokio::test]
    async fn test_missing_connection_string_fails_on_first_use() {
        let store = TableAuditStore::new(String::new(), "FuncionarioLog".to_string(), false);

        let result = store.ensure_table_exists().await;
        assert!(matches!(result, Err(RegistryError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_invalid_table_name_fails_on_first_use() {
        let store = memory_store("bad-name");

        assert!(matches!(
            store.ensure_table_exists().await,
            Err(RegistryError::Persistence(_))
        ));
        assert!(matches!(
            store
                .upsert(&AuditLogEntry::new(&employee("TI"), ActionKind::Insertion))
                .await,
            Err(RegistryError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_without_table_fails() {
        let store = memory_store("FuncionarioLog");

        let result = store
            .upsert(&AuditLogEntry::new(&employee("TI"), ActionKind::Insertion))
            .await;
        assert!(matches!(result, Err(RegistryError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let url = file_url(&temp_dir);

        let entry = AuditLogEntry::new(&employee("TI"), ActionKind::Insertion);
        {
            let store = TableAuditStore::new(url.clone(), "FuncionarioLog".to_string(), true);
            store.ensure_table_exists().await.unwrap();
            store.upsert(&entry).await.unwrap();
        }

        let reopened = TableAuditStore::new(url, "FuncionarioLog".to_string(), true);
        let entries = reopened.list_partition("TI").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].row_key, entry.row_key);
    }
}
