//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 加载配置和输入、创建输出文件
//! - 组装执行器并交给 Coordinator
//! - 输出全局统计信息
//!
//! ### `coordinator` - Worker 池调度器
//! - 持有任务队列，按 Worker 事件派发任务
//! - 崩溃后补充 Worker，全部退出后结束
//!
//! ### `worker` - 单任务执行单元
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App)
//!     ↓
//! coordinator (TaskQueue + Vec<Worker>)
//!     ↓
//! worker (一次一个 AuditTask)
//!     ↓
//! workflow::AuditExecutor (单个任务的审计流程)
//!     ↓
//! browser / infrastructure (浏览器会话、审计引擎)
//! ```

pub mod batch_processor;
pub mod coordinator;
pub mod queue;
pub mod worker;

pub use batch_processor::{App, RunSummary};
pub use coordinator::{Coordinator, RunStatistics, MAX_TASK_ATTEMPTS};
pub use queue::{QueuedTask, TaskQueue};
pub use worker::{WorkerEvent, WorkerId};
