//! In-memory audit store used by tests and local runs without a table backend.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use crate::audit::entry::AuditLogEntry;
use crate::audit::store::AuditStore;
use crate::error::{RegistryError, Result};

#[derive(Default)]
pub struct MemoryAuditStore {
    entries: Mutex<Vec<AuditLogEntry>>,
    ensure_calls: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `upsert` fail until switched back off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn ensure_calls(&self) -> u64 {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn ensure_table_exists(&self) -> Result<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, entry: &AuditLogEntry) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RegistryError::audit("simulated write failure"));
        }

        let mut entries = self.entries.lock().await;
        match entries
            .iter_mut()
            .find(|e| e.partition_key == entry.partition_key && e.row_key == entry.row_key)
        {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }

        debug!("Stored audit entry: {}", entry.summary());
        Ok(())
    }

    async fn list_partition(&self, partition_key: &str) -> Result<Vec<AuditLogEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|e| e.partition_key == partition_key)
            .cloned()
            .collect())
    }
}
