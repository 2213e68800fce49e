//! 审计任务模型
//!
//! 一条输入记录对应一个 `AuditTask`，创建后不可变

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 设备类型（决定 Lighthouse 的设备模拟方式）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// 移动端
    Mobile,
    /// 桌面端
    Desktop,
}

impl Device {
    /// 获取 Lighthouse 使用的名称
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Mobile => "mobile",
            Device::Desktop => "desktop",
        }
    }
}

impl FromStr for Device {
    type Err = String;

    /// 不区分大小写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Device::Mobile),
            "desktop" => Ok(Device::Desktop),
            other => Err(format!("未知的设备类型: {}", other)),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个审计任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTask {
    pub device: Device,
    pub url: String,
}

impl AuditTask {
    pub fn new(device: Device, url: impl Into<String>) -> Self {
        Self {
            device,
            url: url.into(),
        }
    }
}

impl fmt::Display for AuditTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device = {} || URL = {}", self.device, self.url)
    }
}
