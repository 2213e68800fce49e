//! # Lighthouse Batch
//!
//! 按输入 CSV 中的 (设备类型, URL) 批量运行 Lighthouse 页面审计，
//! 把各页面的分数和指标汇总成一张固定列顺序的 CSV 报告
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 每个任务独占的无头浏览器会话
//! - `infrastructure/` - 审计引擎（Lighthouse 命令行）
//!
//! ### ② 业务能力层（Services）
//! - `ValueNormalizer` - 展示值规范化
//! - `ReportWriter` / `ErrorLogWriter` - 追加写入结果和错误日志
//!
//! ### ③ 流程层（Workflow）
//! - `AuditExecutor` - 一个任务的完整流程（启动浏览器 → 审计 → 关闭 → 展开结果）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/coordinator` - 持有任务队列，管理 Worker 池
//! - `orchestrator/worker` - 一次执行一个任务的 Worker
//! - `orchestrator/batch_processor` - 应用入口
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{BrowserLauncher, BrowserSession, ChromeLauncher};
pub use config::Config;
pub use error::{InputError, OutputError, TaskError};
pub use infrastructure::{AuditEngine, AuditSettings, LighthouseCli};
pub use models::{AuditTask, Device, FailureRecord, LighthouseReport, ReportSchema, ResultRow};
pub use orchestrator::{App, Coordinator, RunStatistics, RunSummary};
pub use services::ValueNormalizer;
pub use workflow::{AuditExecutor, TaskOutcome};
