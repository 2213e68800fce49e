pub mod audit_executor;

pub use audit_executor::{AuditExecutor, TaskOutcome};
