pub mod lighthouse;

pub use lighthouse::{AuditEngine, AuditSettings, LighthouseCli};
