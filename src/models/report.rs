//! Lighthouse 报告（LHR）中本程序关心的部分

use std::collections::HashMap;

use serde::Deserialize;

/// 报告根节点
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseReport {
    #[serde(default)]
    pub categories: HashMap<String, CategoryResult>,
    #[serde(default)]
    pub audits: HashMap<String, AuditResult>,
    /// Lighthouse 运行期错误（页面无法加载等）
    #[serde(default)]
    pub runtime_error: Option<RuntimeError>,
}

/// 分类结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    #[serde(default)]
    pub title: String,
    pub score: Option<f64>,
}

/// 单个审计项结果
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score_display_mode: String,
    pub score: Option<f64>,
    pub display_value: Option<String>,
}

impl AuditResult {
    /// 单元格原始值：优先 displayValue，否则取分数，分数为空时记为 -1
    pub fn cell_value(&self) -> String {
        match (&self.display_value, self.score) {
            (Some(display), _) if !display.is_empty() => display.clone(),
            (_, Some(score)) => score.to_string(),
            (_, None) => "-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}
