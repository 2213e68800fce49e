use std::collections::VecDeque;

use crate::models::AuditTask;

/// 队列中的任务及其已派发次数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTask {
    pub task: AuditTask,
    pub attempts: u32,
}

/// 待处理任务队列（FIFO，仅由 Coordinator 修改）
///
/// 任务只会在交给 Worker 的那一刻出队；唯一的"入队"是崩溃任务的重新排队。
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<QueuedTask>,
    total: usize,
}

impl TaskQueue {
    pub fn new(tasks: Vec<AuditTask>) -> Self {
        let total = tasks.len();
        Self {
            pending: tasks
                .into_iter()
                .map(|task| QueuedTask { task, attempts: 0 })
                .collect(),
            total,
        }
    }

    pub fn dequeue(&mut self) -> Option<QueuedTask> {
        self.pending.pop_front()
    }

    /// 放回队首，下一个空闲 Worker 优先处理
    pub fn requeue_front(&mut self, task: QueuedTask) {
        self.pending.push_front(task);
    }

    /// 剩余任务数
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 输入任务总数（运行期间不变）
    pub fn total(&self) -> usize {
        self.total
    }
}
