//! 浏览器会话 - 基础设施层
//!
//! 每个任务独占一个新启动的浏览器会话，审计引擎通过调试端口连接它

pub mod headless;

use async_trait::async_trait;

use crate::error::TaskError;

pub use headless::ChromeLauncher;

/// 一个已启动的浏览器会话
#[async_trait]
pub trait BrowserSession: Send {
    /// 远程调试端口（交给审计引擎）
    fn debug_port(&self) -> u16;

    /// 关闭浏览器并等待进程退出
    async fn close(self: Box<Self>);
}

/// 浏览器启动能力
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, TaskError>;
}
