//! Audit Log System
//!
//! Every successful employee mutation leaves one immutable entry in a
//! partitioned table: partition key is the department, row key is a fresh
//! UUID.

pub mod entry;
pub mod memory;
pub mod store;
pub mod table;

pub use entry::{ActionKind, AuditLogEntry};
pub use memory::MemoryAuditStore;
pub use store::AuditStore;
pub use table::TableAuditStore;
