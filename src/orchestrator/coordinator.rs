//! Worker 池调度器（Coordinator）
//!
//! ## 职责
//!
//! 1. **持有任务队列**：唯一修改队列的一方
//! 2. **维护 Worker 池**：启动、补充（崩溃后）、回收，存活数不超过上限
//! 3. **派发任务**：每个空闲 Worker 一次只领一个任务
//! 4. **收集结果**：按到达顺序写入结果文件或错误日志
//! 5. **判定完成**：队列为空且没有存活的 Worker
//!
//! ## 状态
//!
//! ```text
//! Running(队列非空) → Draining(队列为空，Worker 收尾) → Done(0 个 Worker)
//! ```
//!
//! 整个循环只由 Worker 事件驱动（Ready / Completed / Exited）。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::error::{OutputError, TaskError};
use crate::models::{AuditTask, FailureRecord};
use crate::orchestrator::queue::{QueuedTask, TaskQueue};
use crate::orchestrator::worker::{spawn_worker, WorkerEvent, WorkerId};
use crate::services::{ErrorLogWriter, ReportWriter};
use crate::utils::logging::log_dispatch;
use crate::workflow::AuditExecutor;

/// 同一任务最多派发的次数（Worker 崩溃时会重新排队）
pub const MAX_TASK_ATTEMPTS: u32 = 2;

/// 运行统计
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub total_tasks: usize,
    /// 派发次数（含重新排队后的再次派发）
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub requeued: usize,
    pub worker_crashes: usize,
    pub workers_spawned: usize,
    /// 同时存活的 Worker 数峰值
    pub peak_workers: usize,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl RunStatistics {
    fn new(total_tasks: usize) -> Self {
        Self {
            total_tasks,
            dispatched: 0,
            succeeded: 0,
            failed: 0,
            requeued: 0,
            worker_crashes: 0,
            workers_spawned: 0,
            peak_workers: 0,
            started_at: Instant::now(),
            finished_at: None,
        }
    }

    /// 运行耗时（未结束时计算到当前）
    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }
}

/// Coordinator 眼中的一个存活 Worker
struct WorkerSlot {
    /// `None` 表示已通知退出
    assignments: Option<UnboundedSender<AuditTask>>,
    in_flight: Option<QueuedTask>,
}

/// Worker 池调度器
pub struct Coordinator {
    executor: Arc<AuditExecutor>,
    max_workers: usize,
}

/// 单次运行的可变状态
struct Run<'a> {
    queue: TaskQueue,
    workers: HashMap<WorkerId, WorkerSlot>,
    next_worker_id: WorkerId,
    events: UnboundedSender<WorkerEvent>,
    stats: RunStatistics,
    report: &'a mut ReportWriter,
    error_log: &'a mut ErrorLogWriter,
}

impl Coordinator {
    pub fn new(executor: Arc<AuditExecutor>, max_workers: usize) -> Self {
        Self {
            executor,
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 执行全部任务，直到队列为空且所有 Worker 退出
    ///
    /// 只有输出文件写入失败会中止运行；单个任务失败和 Worker 崩溃都不会。
    pub async fn run(
        &self,
        tasks: Vec<AuditTask>,
        report: &mut ReportWriter,
        error_log: &mut ErrorLogWriter,
    ) -> Result<RunStatistics, OutputError> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let queue = TaskQueue::new(tasks);
        let mut run = Run {
            stats: RunStatistics::new(queue.total()),
            queue,
            workers: HashMap::new(),
            next_worker_id: 0,
            events: events_tx,
            report,
            error_log,
        };

        let initial_workers = self.max_workers.min(run.queue.len());
        for _ in 0..initial_workers {
            self.add_worker(&mut run);
        }

        while !run.workers.is_empty() {
            // 持有 events 发送端，通道不会关闭
            let Some(event) = events_rx.recv().await else {
                break;
            };

            match event {
                WorkerEvent::Ready { worker } => {
                    debug!("[Worker {}] 就绪", worker);
                    self.assign_or_release(&mut run, worker);
                }
                WorkerEvent::Completed { worker, outcome } => {
                    if let Some(slot) = run.workers.get_mut(&worker) {
                        slot.in_flight = None;
                    }
                    match outcome {
                        Ok(row) => {
                            run.report.write_row(&row)?;
                            run.stats.succeeded += 1;
                        }
                        Err(failure) => {
                            run.error_log.write_failure(&failure)?;
                            run.stats.failed += 1;
                        }
                    }
                    self.assign_or_release(&mut run, worker);
                }
                WorkerEvent::Exited { worker, crashed } => {
                    let slot = run.workers.remove(&worker);
                    if crashed {
                        run.stats.worker_crashes += 1;
                        if let Some(lost) = slot.and_then(|s| s.in_flight) {
                            self.recover_lost_task(&mut run, worker, lost)?;
                        }
                    } else {
                        debug!("[Worker {}] 已退出", worker);
                    }

                    if !run.queue.is_empty() && run.workers.len() < self.max_workers {
                        info!("🔁 补充 Worker（剩余任务: {}）", run.queue.len());
                        self.add_worker(&mut run);
                    }
                }
            }
        }

        run.stats.finished_at = Some(Instant::now());
        Ok(run.stats)
    }

    fn add_worker(&self, run: &mut Run<'_>) {
        let id = run.next_worker_id;
        run.next_worker_id += 1;

        let assignments = spawn_worker(id, Arc::clone(&self.executor), run.events.clone());
        run.workers.insert(
            id,
            WorkerSlot {
                assignments: Some(assignments),
                in_flight: None,
            },
        );
        run.stats.workers_spawned += 1;
        run.stats.peak_workers = run.stats.peak_workers.max(run.workers.len());
        debug!("[Worker {}] 已创建（存活: {}）", id, run.workers.len());
    }

    /// Worker 空闲：有任务就派发，没有就通知退出
    fn assign_or_release(&self, run: &mut Run<'_>, worker: WorkerId) {
        let Some(slot) = run.workers.get_mut(&worker) else {
            return;
        };
        let Some(sender) = slot.assignments.as_ref() else {
            return;
        };

        match run.queue.dequeue() {
            Some(mut next) => {
                log_dispatch(run.stats.total_tasks, run.queue.len());
                info!("{}", next.task);

                next.attempts += 1;
                match sender.send(next.task.clone()) {
                    Ok(()) => {
                        slot.in_flight = Some(next);
                        run.stats.dispatched += 1;
                    }
                    Err(_) => {
                        // Worker 已经退出，等 Exited 事件后由补充的 Worker 接手
                        next.attempts -= 1;
                        run.queue.requeue_front(next);
                    }
                }
            }
            None => {
                debug!("[Worker {}] 队列已空，通知退出", worker);
                slot.assignments = None;
            }
        }
    }

    /// 崩溃 Worker 手上的任务：未超过次数上限则放回队首，否则记为失败
    fn recover_lost_task(
        &self,
        run: &mut Run<'_>,
        worker: WorkerId,
        lost: QueuedTask,
    ) -> Result<(), OutputError> {
        if lost.attempts < MAX_TASK_ATTEMPTS {
            warn!(
                "[Worker {}] 崩溃时正在执行 {}，重新排队（第 {} 次）",
                worker, lost.task, lost.attempts
            );
            run.queue.requeue_front(lost);
            run.stats.requeued += 1;
            return Ok(());
        }

        error!(
            "[Worker {}] {} 已尝试 {} 次仍崩溃，记入错误日志",
            worker, lost.task, lost.attempts
        );
        let failure = FailureRecord::new(
            &lost.task,
            TaskError::WorkerCrashed {
                attempts: lost.attempts,
            }
            .fields(),
        );
        run.error_log.write_failure(&failure)?;
        run.stats.failed += 1;
        Ok(())
    }
}
