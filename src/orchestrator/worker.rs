//! Worker - 单任务执行单元
//!
//! 每个 Worker 是一个独立的 tokio 任务：
//! - 启动后发送 `Ready`
//! - 每收到一个任务就完整执行一次，发送 `Completed`
//! - 任务通道被 Coordinator 关闭后退出
//!
//! Worker 外面包一层监视任务，把正常退出和崩溃（panic）统一转换成 `Exited` 事件。

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::models::AuditTask;
use crate::workflow::{AuditExecutor, TaskOutcome};

pub type WorkerId = usize;

/// Worker → Coordinator 的事件
#[derive(Debug)]
pub enum WorkerEvent {
    /// 已启动，可以接收任务
    Ready { worker: WorkerId },
    /// 当前任务执行完毕
    Completed {
        worker: WorkerId,
        outcome: TaskOutcome,
    },
    /// 已退出（`crashed` 表示非正常退出）
    Exited { worker: WorkerId, crashed: bool },
}

/// 启动一个 Worker，返回它的任务通道
///
/// 丢弃返回的发送端即通知 Worker 退出。
pub fn spawn_worker(
    worker: WorkerId,
    executor: Arc<AuditExecutor>,
    events: UnboundedSender<WorkerEvent>,
) -> UnboundedSender<AuditTask> {
    let (assignments_tx, assignments_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(worker_loop(
        worker,
        executor,
        assignments_rx,
        events.clone(),
    ));

    tokio::spawn(async move {
        let crashed = match handle.await {
            Ok(()) => false,
            Err(e) => {
                error!("[Worker {}] 💥 异常退出: {}", worker, e);
                true
            }
        };
        let _ = events.send(WorkerEvent::Exited { worker, crashed });
    });

    assignments_tx
}

async fn worker_loop(
    worker: WorkerId,
    executor: Arc<AuditExecutor>,
    mut assignments: UnboundedReceiver<AuditTask>,
    events: UnboundedSender<WorkerEvent>,
) {
    debug!("[Worker {}] 已启动", worker);
    if events.send(WorkerEvent::Ready { worker }).is_err() {
        return;
    }

    while let Some(task) = assignments.recv().await {
        debug!("[Worker {}] 开始执行: {}", worker, task);
        let outcome = executor.execute(&task).await;
        if events.send(WorkerEvent::Completed { worker, outcome }).is_err() {
            break;
        }
    }

    debug!("[Worker {}] 退出", worker);
}
