pub mod normalizer;
pub mod report_writer;

pub use normalizer::ValueNormalizer;
pub use report_writer::{ensure_dir, run_stamp, ErrorLogWriter, ReportWriter};
