//! 单个任务的产出：成功时为 `ResultRow`，失败时为 `FailureRecord`

use std::sync::Arc;

use crate::models::schema::ReportSchema;
use crate::models::task::{AuditTask, Device};

/// 结果行
///
/// 定长，未出现在本次报告中的列保持为空。只能通过 id 写入，
/// 偏移由 `ReportSchema` 决定。
#[derive(Debug, Clone)]
pub struct ResultRow {
    schema: Arc<ReportSchema>,
    cells: Vec<Option<String>>,
}

impl ResultRow {
    pub(crate) fn new(schema: Arc<ReportSchema>, task: &AuditTask) -> Self {
        let mut cells = vec![None; schema.width()];
        cells[0] = Some(task.device.to_string());
        cells[1] = Some(task.url.clone());
        Self { schema, cells }
    }

    /// 按 id 写入单元格，id 不在表头中时返回 false
    pub fn set(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.schema.order().offset(id) {
            Some(offset) => {
                self.cells[offset] = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// 按 id 读取单元格
    pub fn get(&self, id: &str) -> Option<&str> {
        let offset = self.schema.order().offset(id)?;
        self.cells[offset].as_deref()
    }

    pub fn device(&self) -> &str {
        self.cells[0].as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.cells[1].as_deref().unwrap_or_default()
    }

    /// 按表头顺序输出，空单元格为 ""
    pub fn to_record(&self) -> Vec<&str> {
        self.cells
            .iter()
            .map(|cell| cell.as_deref().unwrap_or(""))
            .collect()
    }
}

/// 失败记录：任务信息 + 错误的所有字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub device: Device,
    pub url: String,
    pub fields: Vec<(String, String)>,
}

impl FailureRecord {
    pub fn new(task: &AuditTask, fields: Vec<(String, String)>) -> Self {
        Self {
            device: task.device,
            url: task.url.clone(),
            fields,
        }
    }

    /// `device, url, key1, value1, key2, value2, ...`
    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(2 + self.fields.len() * 2);
        record.push(self.device.to_string());
        record.push(self.url.clone());
        for (key, value) in &self.fields {
            record.push(key.clone());
            record.push(value.clone());
        }
        record
    }
}
