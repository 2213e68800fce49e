pub mod loaders;
pub mod report;
pub mod row;
pub mod schema;
pub mod task;

pub use loaders::load_tasks;
pub use report::{AuditResult, CategoryResult, LighthouseReport, RuntimeError};
pub use row::{FailureRecord, ResultRow};
pub use schema::{ColumnOrderMap, ReportSchema, INPUT_COLUMNS_HEADER};
pub use task::{AuditTask, Device};
