//! Audit Store
//!
//! Write side of the audit trail. Implementations address entries by
//! partition key and row key, and only ever create rows because every
//! row key is fresh.

use async_trait::async_trait;

use crate::audit::entry::AuditLogEntry;
use crate::error::Result;

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Create the backing table if it is missing. Must be idempotent: the
    /// registry calls it before every audit write.
    async fn ensure_table_exists(&self) -> Result<()>;

    /// Write `entry`, replacing any row with the same partition and row key.
    async fn upsert(&self, entry: &AuditLogEntry) -> Result<()>;

    /// All entries of one partition, in write order.
    async fn list_partition(&self, partition_key: &str) -> Result<Vec<AuditLogEntry>>;
}
