//! 批量审计入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：组装报告结构、浏览器启动器、审计引擎和执行器
//! 2. **加载输入**：读取输入 CSV（失败即中止，不启动任何 Worker）
//! 3. **创建输出**：按运行开始时间创建结果文件和错误日志
//! 4. **向下委托**：交给 Coordinator 调度所有任务
//! 5. **全局统计**：输出成功/失败数量和总耗时

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::warn;

use crate::browser::{BrowserLauncher, ChromeLauncher};
use crate::config::Config;
use crate::infrastructure::{AuditEngine, LighthouseCli};
use crate::models::{load_tasks, ReportSchema};
use crate::orchestrator::coordinator::{Coordinator, RunStatistics};
use crate::services::{run_stamp, ErrorLogWriter, ReportWriter};
use crate::utils::logging::{log_startup, log_tasks_loaded, print_final_stats};
use crate::workflow::AuditExecutor;

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub statistics: RunStatistics,
    pub report_path: PathBuf,
    pub error_log_path: PathBuf,
}

/// 应用主结构
pub struct App {
    config: Config,
    executor: Arc<AuditExecutor>,
}

impl App {
    /// 使用 Chrome + Lighthouse 命令行初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let launcher = Arc::new(ChromeLauncher::new(config.chrome_executable.clone()));
        let engine = Arc::new(LighthouseCli::new(
            config.lighthouse_bin.clone(),
            Duration::from_secs(config.audit_timeout_secs),
        ));
        Self::with_collaborators(config, launcher, engine)
    }

    /// 使用自定义的浏览器启动器和审计引擎初始化
    pub fn with_collaborators(
        config: Config,
        launcher: Arc<dyn BrowserLauncher>,
        engine: Arc<dyn AuditEngine>,
    ) -> Result<Self> {
        let schema = Arc::new(ReportSchema::lighthouse_default());
        let executor = AuditExecutor::new(&config, schema, launcher, engine)
            .context("无法创建审计执行器")?;

        Ok(Self {
            config,
            executor: Arc::new(executor),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        log_startup(self.config.max_workers);
        let started = Local::now();

        let tasks = load_tasks(&self.config.input_file)
            .await
            .context("请确认输入文件（默认 input.csv）存在且格式正确")?;
        if tasks.is_empty() {
            warn!("⚠️ 输入文件中没有任务，只生成表头");
        }

        let stamp = run_stamp(started);
        let mut report = ReportWriter::create(
            &self.config.output_dir,
            &stamp,
            self.executor.schema().header(),
        )?;
        let mut error_log = ErrorLogWriter::create(&self.config.error_log_dir, &stamp)?;

        let coordinator = Coordinator::new(Arc::clone(&self.executor), self.config.max_workers);
        log_tasks_loaded(tasks.len(), coordinator.max_workers().min(tasks.len()));

        let statistics = coordinator.run(tasks, &mut report, &mut error_log).await?;

        print_final_stats(&statistics, &report, &error_log);

        Ok(RunSummary {
            statistics,
            report_path: report.path().to_path_buf(),
            error_log_path: error_log.path().to_path_buf(),
        })
    }
}
