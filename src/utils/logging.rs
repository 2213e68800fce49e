/// 日志工具模块
///
/// 提供运行过程中各阶段日志输出的辅助函数
use std::time::Duration;

use tracing::info;

use crate::orchestrator::RunStatistics;
use crate::services::{ErrorLogWriter, ReportWriter};

/// 记录程序启动信息
///
/// # 参数
/// - `max_workers`: Worker 数量上限
pub fn log_startup(max_workers: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多 Worker 页面审计模式");
    info!("📊 最大 Worker 数: {}", max_workers);
    info!("{}", "=".repeat(60));
}

/// 记录任务加载信息
pub fn log_tasks_loaded(total: usize, workers: usize) {
    info!("✓ 找到 {} 个待审计的页面", total);
    info!("📋 将启动 {} 个 Worker 并行处理\n", workers);
}

/// 记录一次任务派发
///
/// # 参数
/// - `total`: 任务总数
/// - `remaining`: 派发后队列中剩余的任务数
pub fn log_dispatch(total: usize, remaining: usize) {
    info!("Total: {} || Remaining: {}", total, remaining);
}

/// 格式化耗时：`M minutes S seconds`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    format!(
        "{} minutes {} seconds",
        total_seconds / 60,
        total_seconds % 60
    )
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 本次运行统计
/// - `report`: 结果文件写入器
/// - `error_log`: 错误日志写入器
pub fn print_final_stats(stats: &RunStatistics, report: &ReportWriter, error_log: &ErrorLogWriter) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部审计完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.succeeded, stats.total_tasks);
    info!("❌ 失败: {}", stats.failed);
    if stats.worker_crashes > 0 {
        info!(
            "💥 Worker 崩溃: {} (重新排队: {})",
            stats.worker_crashes, stats.requeued
        );
    }
    info!(
        "Total time to accomplish all tasks: {}",
        format_elapsed(stats.elapsed())
    );
    info!("{}", "=".repeat(60));
    info!(
        "\n结果已保存至: {} ({} 行)",
        report.path().display(),
        report.rows_written()
    );
    info!(
        "错误日志: {} ({} 行)",
        error_log.path().display(),
        error_log.rows_written()
    );
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
