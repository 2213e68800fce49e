//! 审计引擎 - 基础设施层
//!
//! 只暴露"对一个 URL 跑一次审计"的能力，不认识任务队列和结果文件

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::TaskError;
use crate::models::{Device, LighthouseReport};
use crate::utils::logging::truncate_text;

/// 单次审计的引擎设置（由任务的设备类型和全局配置组合而成）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
    pub emulated_form_factor: Device,
    pub throttling_method: String,
}

/// 审计引擎
#[async_trait]
pub trait AuditEngine: Send + Sync {
    /// 连接 `debug_port` 上的浏览器，审计 `url`
    async fn audit(
        &self,
        url: &str,
        debug_port: u16,
        settings: &AuditSettings,
    ) -> Result<LighthouseReport, TaskError>;
}

/// 通过 Lighthouse 命令行运行审计
#[derive(Debug, Clone)]
pub struct LighthouseCli {
    program: String,
    timeout: Duration,
}

impl LighthouseCli {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn command(&self, url: &str, debug_port: u16, settings: &AuditSettings) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(url)
            .arg(format!("--port={}", debug_port))
            .arg("--output=json")
            .arg("--output-path=stdout")
            .arg("--quiet")
            .arg(format!(
                "--emulated-form-factor={}",
                settings.emulated_form_factor
            ))
            .arg(format!("--throttling-method={}", settings.throttling_method))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl AuditEngine for LighthouseCli {
    async fn audit(
        &self,
        url: &str,
        debug_port: u16,
        settings: &AuditSettings,
    ) -> Result<LighthouseReport, TaskError> {
        debug!("运行 {} {} (端口: {})", self.program, url, debug_port);

        let child = self
            .command(url, debug_port, settings)
            .spawn()
            .map_err(|e| TaskError::EngineSpawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        // 超时后 future 被丢弃，kill_on_drop 负责结束子进程
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TaskError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| TaskError::EngineSpawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TaskError::EngineExited {
                code: output.status.code(),
                stderr: truncate_text(stderr.trim(), 500),
            });
        }

        parse_report(&output.stdout)
    }
}

/// 解析 JSON 报告；报告中带 runtimeError 时视为结构化失败
pub fn parse_report(stdout: &[u8]) -> Result<LighthouseReport, TaskError> {
    let report: LighthouseReport = serde_json::from_slice(stdout)?;

    if let Some(runtime_error) = &report.runtime_error {
        return Err(TaskError::Reported {
            fields: vec![
                ("code".to_string(), runtime_error.code.clone()),
                ("message".to_string(), runtime_error.message.clone()),
            ],
        });
    }

    Ok(report)
}
