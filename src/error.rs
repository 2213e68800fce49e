use std::path::PathBuf;

use thiserror::Error;

/// 输入阶段错误（致命，任何 Worker 启动前中止整个运行）
#[derive(Debug, Error)]
pub enum InputError {
    /// 输入文件不存在或无法打开
    #[error("无法读取输入文件 {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 列不一致、缺少表头字段或设备类型无法识别
    #[error("输入文件格式错误 (第 {line} 行): {message}")]
    Malformed { line: u64, message: String },
}

/// 输出阶段错误（结果文件/错误日志无法创建或写入）
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("无法创建输出目录 {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("无法写入 {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 单个任务的执行错误（非致命，写入错误日志后继续）
#[derive(Debug, Error)]
pub enum TaskError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {message}")]
    BrowserLaunch { message: String },
    /// 无法从调试地址中取得端口
    #[error("无法解析浏览器调试地址: {endpoint}")]
    Endpoint { endpoint: String },
    /// 无法启动审计进程
    #[error("无法启动审计程序 {program}: {message}")]
    EngineSpawn { program: String, message: String },
    /// 审计进程非零退出
    #[error("审计程序异常退出 (code: {code:?}): {stderr}")]
    EngineExited { code: Option<i32>, stderr: String },
    /// 审计超时
    #[error("审计超时 ({seconds} 秒)")]
    Timeout { seconds: u64 },
    /// 报告 JSON 解析失败
    #[error("无法解析审计报告: {message}")]
    ReportParse { message: String },
    /// 审计引擎返回的结构化错误，字段原样保留
    #[error("审计引擎报告错误: {fields:?}")]
    Reported { fields: Vec<(String, String)> },
    /// Worker 在执行任务时崩溃（重试后仍失败）
    #[error("Worker 崩溃 (已尝试 {attempts} 次)")]
    WorkerCrashed { attempts: u32 },
}

impl TaskError {
    /// 展开为错误日志使用的 (字段名, 字段值) 列表
    pub fn fields(&self) -> Vec<(String, String)> {
        fn pairs(items: &[(&str, String)]) -> Vec<(String, String)> {
            items
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect()
        }

        match self {
            TaskError::BrowserLaunch { message } => {
                pairs(&[("kind", "browser_launch".into()), ("message", message.clone())])
            }
            TaskError::Endpoint { endpoint } => {
                pairs(&[("kind", "endpoint".into()), ("endpoint", endpoint.clone())])
            }
            TaskError::EngineSpawn { program, message } => pairs(&[
                ("kind", "engine_spawn".into()),
                ("program", program.clone()),
                ("message", message.clone()),
            ]),
            TaskError::EngineExited { code, stderr } => pairs(&[
                ("kind", "engine_exited".into()),
                ("code", code.map(|c| c.to_string()).unwrap_or_default()),
                ("stderr", stderr.clone()),
            ]),
            TaskError::Timeout { seconds } => {
                pairs(&[("kind", "timeout".into()), ("seconds", seconds.to_string())])
            }
            TaskError::ReportParse { message } => {
                pairs(&[("kind", "report_parse".into()), ("message", message.clone())])
            }
            TaskError::Reported { fields } => fields.clone(),
            TaskError::WorkerCrashed { attempts } => pairs(&[
                ("error", "worker crashed".into()),
                ("attempts", attempts.to_string()),
            ]),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for TaskError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        TaskError::BrowserLaunch {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::ReportParse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_fields_pass_through() {
        let err = TaskError::Reported {
            fields: vec![("message".into(), "timeout".into())],
        };
        assert_eq!(err.fields(), vec![("message".to_string(), "timeout".to_string())]);
    }

    #[test]
    fn test_exited_fields() {
        let err = TaskError::EngineExited {
            code: Some(1),
            stderr: "boom".into(),
        };
        let fields = err.fields();
        assert_eq!(fields[0], ("kind".to_string(), "engine_exited".to_string()));
        assert_eq!(fields[1], ("code".to_string(), "1".to_string()));
        assert_eq!(fields[2], ("stderr".to_string(), "boom".to_string()));
    }
}
