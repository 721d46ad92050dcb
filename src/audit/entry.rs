//! Audit Log Entry
//!
//! One immutable row per successful employee mutation, addressed by
//! department (partition key) and a freshly generated row key.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Employee;

/// Kind of mutation an entry records. Serialized with the wire names used by
/// the audit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "Inclusao")]
    Insertion,
    #[serde(rename = "Atualizacao")]
    Update,
    #[serde(rename = "Remocao")]
    Removal,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Insertion => "Inclusao",
            ActionKind::Update => "Atualizacao",
            ActionKind::Removal => "Remocao",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inclusao" => Ok(ActionKind::Insertion),
            "Atualizacao" => Ok(ActionKind::Update),
            "Remocao" => Ok(ActionKind::Removal),
            _ => Err(format!("Invalid audit action: {}", s)),
        }
    }
}

/// Audit entry carrying a flattened snapshot of the employee at write time.
/// There is no live reference back to the employee row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub partition_key: String,
    pub row_key: String,
    pub timestamp: DateTime<Utc>,
    pub employee_id: i64,
    pub name: String,
    pub admission_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub salary: Decimal,
    pub department: String,
    pub extension: String,
    pub action: ActionKind,
}

impl AuditLogEntry {
    /// Snapshot `employee` under its current department with a new row key.
    pub fn new(employee: &Employee, action: ActionKind) -> Self {
        Self {
            partition_key: employee.department.clone(),
            row_key: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            employee_id: employee.id,
            name: employee.name.clone(),
            admission_date: employee.admission_date,
            salary: employee.salary,
            department: employee.department.clone(),
            extension: employee.extension.clone(),
            action,
        }
    }

    /// Whether the snapshot still matches the given employee field for field.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.employee_id == employee.id
            && self.name == employee.name
            && self.admission_date == employee.admission_date
            && self.salary == employee.salary
            && self.department == employee.department
            && self.extension == employee.extension
    }

    pub fn summary(&self) -> String {
        format!(
            "{} employee {} ({}/{})",
            self.action, self.employee_id, self.partition_key, self.row_key
        )
    }
}
