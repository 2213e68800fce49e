use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info};

use crate::error::InputError;
use crate::models::task::{AuditTask, Device};

/// 输入文件中的一行（表头字段: Device, URL）
#[derive(Debug, Deserialize)]
struct InputRecord {
    #[serde(rename = "Device")]
    device: String,
    #[serde(rename = "URL")]
    url: String,
}

/// 从 CSV 文件加载全部审计任务（保持输入顺序）
pub async fn load_tasks(input_file_path: &Path) -> Result<Vec<AuditTask>, InputError> {
    let content = fs::read(input_file_path)
        .await
        .map_err(|source| InputError::Unreadable {
            path: input_file_path.to_path_buf(),
            source,
        })?;

    let tasks = parse_tasks(content.as_slice())?;
    info!(
        "✓ 从 {} 加载了 {} 个任务",
        input_file_path.display(),
        tasks.len()
    );
    Ok(tasks)
}

/// 解析 CSV 内容：首行为表头，去除首尾空白，跳过空行（包括只含空白的行）
pub fn parse_tasks(input: impl Read) -> Result<Vec<AuditTask>, InputError> {
    // flexible: 只含空白的行会被读成单个空字段，字段数由下面自行校验
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(malformed)?.clone();
    let mut tasks = Vec::new();

    for result in reader.records() {
        let record = result.map_err(malformed)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != headers.len() {
            return Err(InputError::Malformed {
                line,
                message: format!(
                    "第 {} 行字段数 {} 与表头字段数 {} 不一致",
                    line,
                    record.len(),
                    headers.len()
                ),
            });
        }
        let raw: InputRecord = record.deserialize(Some(&headers)).map_err(malformed)?;

        let device = raw
            .device
            .parse::<Device>()
            .map_err(|message| InputError::Malformed { line, message })?;
        if raw.url.is_empty() {
            return Err(InputError::Malformed {
                line,
                message: "URL 不能为空".to_string(),
            });
        }

        debug!("第 {} 行: {} {}", line, device, raw.url);
        tasks.push(AuditTask::new(device, raw.url));
    }

    Ok(tasks)
}

fn malformed(err: csv::Error) -> InputError {
    InputError::Malformed {
        line: err.position().map(|p| p.line()).unwrap_or_default(),
        message: err.to_string(),
    }
}
