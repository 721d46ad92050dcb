//! Employee Registry
//!
//! Sequences each employee mutation as a relational write followed by an
//! audit write. The relational store is authoritative. The audit entry is
//! attempted only after the relational write succeeded, and there is no
//! rollback, retry or outbox between the two.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::audit::{ActionKind, AuditLogEntry, AuditStore};
use crate::config::AuditFailurePolicy;
use crate::database::models::{Employee, EmployeeDraft};
use crate::database::EmployeeStore;
use crate::error::{RegistryError, Result};

#[derive(Clone)]
pub struct EmployeeRegistry {
    employees: Arc<dyn EmployeeStore>,
    audit: Arc<dyn AuditStore>,
    failure_policy: AuditFailurePolicy,
}

impl EmployeeRegistry {
    pub fn new(
        employees: Arc<dyn EmployeeStore>,
        audit: Arc<dyn AuditStore>,
        failure_policy: AuditFailurePolicy,
    ) -> Self {
        Self {
            employees,
            audit,
            failure_policy,
        }
    }

    pub fn failure_policy(&self) -> AuditFailurePolicy {
        self.failure_policy
    }

    /// Look up one employee. Reads are never audited.
    pub async fn find(&self, id: i64) -> Result<Employee> {
        match self.employees.find_by_id(id).await? {
            Some(employee) => Ok(employee),
            None => {
                warn!("Employee {} not found", id);
                Err(RegistryError::NotFound(id))
            }
        }
    }

    /// Insert a new employee and audit it under its department.
    /// An absent draft is rejected before anything is written.
    pub async fn create(&self, draft: Option<EmployeeDraft>) -> Result<Employee> {
        let draft = draft.ok_or_else(RegistryError::missing_body)?;

        let employee = self.employees.insert(&draft).await?;
        info!(
            "Created employee {} in department {}",
            employee.id, employee.department
        );

        self.record(&employee, ActionKind::Insertion).await?;
        Ok(employee)
    }

    /// Overwrite the mutable fields of an existing employee. The audit entry
    /// carries the post-update snapshot and department.
    pub async fn update(&self, id: i64, draft: EmployeeDraft) -> Result<Employee> {
        let mut employee = self.find(id).await?;
        employee.apply(draft);

        self.employees.update(&employee).await?;
        info!(
            "Updated employee {} (department {})",
            employee.id, employee.department
        );

        self.record(&employee, ActionKind::Update).await?;
        Ok(employee)
    }

    /// Delete an existing employee. The audit entry carries the snapshot and
    /// department as they were before deletion.
    pub async fn remove(&self, id: i64) -> Result<()> {
        let employee = self.find(id).await?;

        self.employees.delete(&employee).await?;
        info!(
            "Removed employee {} from department {}",
            employee.id, employee.department
        );

        self.record(&employee, ActionKind::Removal).await
    }

    /// Write the audit entry for a committed relational change.
    async fn record(&self, employee: &Employee, action: ActionKind) -> Result<()> {
        let entry = AuditLogEntry::new(employee, action);

        match self.write_entry(&entry).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // The relational change is already committed at this point.
                error!(
                    "Audit write failed after committed change ({}): {}",
                    entry.summary(),
                    e
                );
                match self.failure_policy {
                    AuditFailurePolicy::Propagate => Err(e),
                    AuditFailurePolicy::LogAndContinue => Ok(()),
                }
            }
        }
    }

    async fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        self.audit.ensure_table_exists().await?;
        self.audit.upsert(entry).await
    }
}
