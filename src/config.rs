use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// 程序配置（启动时构建一次，之后只读）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入 CSV（表头: Device,URL）
    pub input_file: PathBuf,
    /// 结果报告目录
    pub output_dir: PathBuf,
    /// 错误日志目录
    pub error_log_dir: PathBuf,
    /// 同时存活的 Worker 数量上限
    pub max_workers: usize,
    /// Lighthouse 节流方式
    pub throttling_method: String,
    /// Lighthouse 可执行文件
    pub lighthouse_bin: String,
    /// Chrome 可执行文件（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<PathBuf>,
    /// 单次审计超时（秒）
    pub audit_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("input.csv"),
            output_dir: PathBuf::from("output"),
            error_log_dir: PathBuf::from("errorLog"),
            max_workers: 4,
            throttling_method: "simulate".to_string(),
            lighthouse_bin: "lighthouse".to_string(),
            chrome_executable: None,
            audit_timeout_secs: 300,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 → CONFIG_FILE 指定的 TOML → 环境变量，后者覆盖前者
    pub fn load() -> Result<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env())
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config.normalized())
    }

    /// 用环境变量覆盖已有配置
    pub fn with_env(self) -> Self {
        Self {
            input_file: std::env::var("INPUT_FILE").map(PathBuf::from).unwrap_or(self.input_file),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(self.output_dir),
            error_log_dir: std::env::var("ERROR_LOG_DIR").map(PathBuf::from).unwrap_or(self.error_log_dir),
            max_workers: std::env::var("MAX_WORKERS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_workers),
            throttling_method: std::env::var("THROTTLING_METHOD").unwrap_or(self.throttling_method),
            lighthouse_bin: std::env::var("LIGHTHOUSE_BIN").unwrap_or(self.lighthouse_bin),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from).or(self.chrome_executable),
            audit_timeout_secs: std::env::var("AUDIT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.audit_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
        .normalized()
    }

    /// 命令行指定的输入文件优先
    pub fn with_input_file(mut self, input_file: Option<PathBuf>) -> Self {
        if let Some(path) = input_file {
            self.input_file = path;
        }
        self
    }

    fn normalized(mut self) -> Self {
        self.max_workers = self.max_workers.max(1);
        self
    }
}
