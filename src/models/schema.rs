//! 报告结构注册表
//!
//! Lighthouse 结果同时返回 title（用于展示）和 id，这里用 id 作为键，
//! 为每个分类/审计项分配固定的列偏移，保证所有结果行与表头对齐。

use std::collections::HashMap;
use std::sync::Arc;

use phf::phf_ordered_map;

use crate::models::row::ResultRow;
use crate::models::task::AuditTask;

/// 输入回显列（结果表的前两列）
pub const INPUT_COLUMNS_HEADER: [&str; 2] = ["Device", "URL"];

/// 分类 id -> 展示标题（顺序即列顺序）
pub static CATEGORY_TITLES: phf::OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "performance" => "Performance",
    "accessibility" => "Accessibility",
    "best-practices" => "Best-practices",
    "seo" => "SEO",
    "pwa" => "PWA",
};

/// 审计项 id -> 展示标题（顺序即列顺序）
pub static AUDIT_TITLES: phf::OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "first-contentful-paint" => "First Contentful Paint",
    "first-meaningful-paint" => "First Meaningful Paint",
    "speed-index" => "Speed Index",
    "estimated-input-latency" => "Estimated Input Latency",
    "interactive" => "Time to Interactive",
    "first-cpu-idle" => "First CPU Idle",
    "render-blocking-resources" => "Eliminate render-blocking resources",
    "uses-rel-preconnect" => "Preconnect to required origins",
    "uses-text-compression" => "Enable text compression",
    "time-to-first-byte" => "Server response times are low (TTFB)",
    "offscreen-images" => "Defer offscreen images",
    "uses-webp-images" => "Serve images in next-gen formats",
    "uses-optimized-images" => "Efficiently encode images",
    "uses-responsive-images" => "Properly size images",
    "unminified-javascript" => "Minify JavaScript",
    "uses-rel-preload" => "Preload key requests",
    "unused-css-rules" => "Remove unused CSS",
    "efficient-animated-content" => "Use video formats for animated content",
    "unminified-css" => "Minify CSS",
    "mainthread-work-breakdown" => "Minimize main-thread work",
    "dom-size" => "Avoid an excessive DOM size",
    "uses-long-cache-ttl" => "Serve static assets with an efficient cache policy",
    "bootup-time" => "Reduce JavaScript execution time",
    "critical-request-chains" => "Minimize Critical Requests Depth",
    "user-timings" => "User Timing marks and measures",
    "font-display" => "All text remains visible during webfont loads",
    "total-byte-weight" => "Avoids enormous network payloads",
};

/// id -> 列偏移
///
/// 偏移相对于整行计算（已包含输入回显列），初始化后只读。
#[derive(Debug, Clone, Default)]
pub struct ColumnOrderMap {
    offsets: HashMap<&'static str, usize>,
}

impl ColumnOrderMap {
    /// 查找 id 对应的列偏移
    pub fn offset(&self, id: &str) -> Option<usize> {
        self.offsets.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.offsets.iter().map(|(id, offset)| (*id, *offset))
    }
}

/// 报告结构：完整表头 + 列偏移表
#[derive(Debug, Clone)]
pub struct ReportSchema {
    header: Vec<String>,
    order: ColumnOrderMap,
}

impl ReportSchema {
    /// 使用内置的分类和审计项构建
    pub fn lighthouse_default() -> Self {
        Self::build(
            CATEGORY_TITLES.entries().map(|(id, title)| (*id, *title)),
            AUDIT_TITLES.entries().map(|(id, title)| (*id, *title)),
        )
    }

    /// 按"输入列 → 分类 → 审计项"的顺序构建表头和偏移表
    ///
    /// 重复出现的 id 只保留第一次，保证偏移表是双射。
    pub fn build(
        categories: impl IntoIterator<Item = (&'static str, &'static str)>,
        audits: impl IntoIterator<Item = (&'static str, &'static str)>,
    ) -> Self {
        let mut header: Vec<String> = INPUT_COLUMNS_HEADER.iter().map(|s| s.to_string()).collect();
        let mut offsets = HashMap::new();

        for (id, title) in categories.into_iter().chain(audits) {
            if offsets.contains_key(id) {
                continue;
            }
            offsets.insert(id, header.len());
            header.push(title.to_string());
        }

        Self {
            header,
            order: ColumnOrderMap { offsets },
        }
    }

    /// 完整表头
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn order(&self) -> &ColumnOrderMap {
        &self.order
    }

    /// 为任务创建一行空结果（前两列已填入 device / url）
    pub fn new_row(self: &Arc<Self>, task: &AuditTask) -> ResultRow {
        ResultRow::new(Arc::clone(self), task)
    }
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self::lighthouse_default()
    }
}
