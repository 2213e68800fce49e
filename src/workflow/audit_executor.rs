//! 单任务审计流程 - 流程层
//!
//! 核心职责：定义"一个页面"的完整审计流程
//!
//! 流程顺序：
//! 1. 启动独占的浏览器会话
//! 2. 按任务设备类型配置引擎并运行审计
//! 3. 关闭浏览器（无论成功失败）
//! 4. 把报告展开成结果行，或把错误展开成失败记录

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::browser::BrowserLauncher;
use crate::config::Config;
use crate::error::TaskError;
use crate::infrastructure::{AuditEngine, AuditSettings};
use crate::models::{AuditTask, FailureRecord, LighthouseReport, ReportSchema, ResultRow};
use crate::services::ValueNormalizer;

/// 单个任务的产出：二者必居其一
pub type TaskOutcome = std::result::Result<ResultRow, FailureRecord>;

/// 审计执行器
///
/// - 每个 Worker 持有一份（内部均为 `Arc` 共享的只读数据）
/// - 不持有浏览器，每个任务单独启动、单独关闭
/// - 不关心队列和输出文件
pub struct AuditExecutor {
    launcher: Arc<dyn BrowserLauncher>,
    engine: Arc<dyn AuditEngine>,
    schema: Arc<ReportSchema>,
    normalizer: ValueNormalizer,
    throttling_method: String,
    verbose_logging: bool,
}

impl AuditExecutor {
    pub fn new(
        config: &Config,
        schema: Arc<ReportSchema>,
        launcher: Arc<dyn BrowserLauncher>,
        engine: Arc<dyn AuditEngine>,
    ) -> Result<Self> {
        Ok(Self {
            launcher,
            engine,
            schema,
            normalizer: ValueNormalizer::new()?,
            throttling_method: config.throttling_method.clone(),
            verbose_logging: config.verbose_logging,
        })
    }

    pub fn schema(&self) -> &Arc<ReportSchema> {
        &self.schema
    }

    /// 执行一个任务
    pub async fn execute(&self, task: &AuditTask) -> TaskOutcome {
        match self.run(task).await {
            Ok(row) => {
                info!("✓ 审计完成: {}", task);
                Ok(row)
            }
            Err(e) => {
                warn!("⚠️ 审计失败: {} | {}", task, e);
                Err(FailureRecord::new(task, e.fields()))
            }
        }
    }

    async fn run(&self, task: &AuditTask) -> std::result::Result<ResultRow, TaskError> {
        let session = self.launcher.launch().await?;

        let settings = AuditSettings {
            emulated_form_factor: task.device,
            throttling_method: self.throttling_method.clone(),
        };
        let audited = AssertUnwindSafe(
            self.engine
                .audit(&task.url, session.debug_port(), &settings),
        )
        .catch_unwind()
        .await;

        // 先释放浏览器，再处理结果（审计 panic 时关闭后继续向上传播）
        session.close().await;

        let report = match audited {
            Ok(result) => result?,
            Err(panic) => {
                error!("💥 审计过程中发生 panic: {}", task);
                std::panic::resume_unwind(panic);
            }
        };
        Ok(self.flatten(task, &report))
    }

    /// 把报告展开成一行：先填审计项（规范化后的展示值），再填分类分数
    pub fn flatten(&self, task: &AuditTask, report: &LighthouseReport) -> ResultRow {
        let mut row = self.schema.new_row(task);

        for (id, audit) in &report.audits {
            let value = self.normalizer.normalize(&audit.cell_value());
            if self.verbose_logging {
                info!("  {} = {}", id, value);
            }
            row.set(id, value);
        }

        for (id, category) in &report.categories {
            if let Some(score) = category.score {
                row.set(id, score.to_string());
            }
        }

        row
    }
}
