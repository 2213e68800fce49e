//! 数值规范化服务 - 业务能力层
//!
//! 把 Lighthouse 的展示字符串统一成 `<数值部分> (<前缀>)` 的形式，方便后续分析

use anyhow::Result;
use regex::Regex;

/// 展示值规范化
///
/// - 以（可带负号的）整数开头的值原样返回
/// - 否则从第一个数字处切分，改写为 `"<从第一个数字起的部分> (<第一个数字之前的部分>)"`
/// - 不含数字的值原样返回
#[derive(Debug, Clone)]
pub struct ValueNormalizer {
    leading_integer: Regex,
    digits: Regex,
}

impl ValueNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            leading_integer: Regex::new(r"^-?[0-9]+")?,
            digits: Regex::new(r"[0-9]+")?,
        })
    }

    pub fn normalize(&self, value: &str) -> String {
        if self.leading_integer.is_match(value) {
            return value.to_string();
        }

        match self.digits.find(value) {
            Some(found) => {
                let index = found.start();
                format!("{} ({})", &value[index..], &value[..index])
            }
            None => value.to_string(),
        }
    }
}
