//! 结果写入服务 - 业务能力层
//!
//! 只负责"按到达顺序追加写入结果文件和错误日志"，不关心调度

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::OutputError;
use crate::models::{FailureRecord, ResultRow};

/// 运行开始时间戳（本地时间，精确到分钟）
pub fn run_stamp(start: DateTime<Local>) -> String {
    start.format("%Y-%m-%dT%H-%M").to_string()
}

/// 目录不存在时创建
pub fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// 结果报告写入器
///
/// 每写一行立即 flush，保证结果随到随写、整行写入。
pub struct ReportWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl ReportWriter {
    /// 在 `dir` 下创建 `<stamp>.csv` 并写入表头
    pub fn create(dir: &Path, stamp: &str, header: &[String]) -> Result<Self, OutputError> {
        ensure_dir(dir)?;
        let path = dir.join(format!("{}.csv", stamp));
        let writer = csv::Writer::from_path(&path).map_err(|source| OutputError::Write {
            path: path.clone(),
            source,
        })?;

        let mut report = Self {
            path,
            writer,
            rows_written: 0,
        };
        report.write_record(header)?;
        Ok(report)
    }

    pub fn write_row(&mut self, row: &ResultRow) -> Result<(), OutputError> {
        debug!("写入结果: {} {}", row.device(), row.url());
        self.write_record(row.to_record())?;
        self.rows_written += 1;
        Ok(())
    }

    fn write_record<I, T>(&mut self, record: I) -> Result<(), OutputError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(record)
            .and_then(|_| self.writer.flush().map_err(csv::Error::from))
            .map_err(|source| OutputError::Write {
                path: self.path.clone(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 已写入的数据行数（不含表头）
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

/// 错误日志写入器（每行字段数随错误而变）
pub struct ErrorLogWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl ErrorLogWriter {
    /// 在 `dir` 下创建 `<stamp>-error-log.csv`
    pub fn create(dir: &Path, stamp: &str) -> Result<Self, OutputError> {
        ensure_dir(dir)?;
        let path = dir.join(format!("{}-error-log.csv", stamp));
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            writer,
            rows_written: 0,
        })
    }

    pub fn write_failure(&mut self, failure: &FailureRecord) -> Result<(), OutputError> {
        debug!("写入错误日志: {} {}", failure.device, failure.url);
        self.writer
            .write_record(failure.to_record())
            .and_then(|_| self.writer.flush().map_err(csv::Error::from))
            .map_err(|source| OutputError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}
