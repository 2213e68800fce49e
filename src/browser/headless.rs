use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::error::TaskError;

/// 无头 Chrome 启动器
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    chrome_executable: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(chrome_executable: Option<PathBuf>) -> Self {
        Self { chrome_executable }
    }

    fn browser_config(&self) -> Result<BrowserConfig, TaskError> {
        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--disable-gpu",             // 无头模式禁用 GPU
            "--no-sandbox",              // 受限环境（容器）下无法使用沙盒
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",   // 防止共享内存不足
        ]);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(|message| {
            error!("配置无头浏览器失败: {}", message);
            TaskError::BrowserLaunch { message }
        })
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, TaskError> {
        debug!("🚀 启动无头浏览器...");
        let config = self.browser_config()?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            TaskError::from(e)
        })?;

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let endpoint = browser.websocket_address().clone();
        let debug_port = match parse_debug_port(&endpoint) {
            Some(port) => port,
            None => {
                let session = ChromeSession {
                    browser,
                    handler_task,
                    debug_port: 0,
                };
                Box::new(session).close().await;
                return Err(TaskError::Endpoint { endpoint });
            }
        };

        info!("✅ 无头浏览器已启动，调试端口: {}", debug_port);
        Ok(Box::new(ChromeSession {
            browser,
            handler_task,
            debug_port,
        }))
    }
}

/// 从 `ws://127.0.0.1:<port>/devtools/browser/<id>` 中取出端口
pub fn parse_debug_port(endpoint: &str) -> Option<u16> {
    Url::parse(endpoint).ok()?.port()
}

/// chromiumoxide 启动的浏览器进程
struct ChromeSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    debug_port: u16,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    fn debug_port(&self) -> u16 {
        self.debug_port
    }

    async fn close(self: Box<Self>) {
        let mut session = *self;

        if let Err(e) = session.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = session.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        debug!("浏览器已关闭");
    }
}

// 未经 close 就被丢弃时（例如 Worker panic 展开），Browser 自身的 Drop 会结束 Chrome 子进程，
// 这里只负责停掉事件循环任务
impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
