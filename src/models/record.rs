//! 数据行模型
//!
//! 一行数据就是"列名 -> 文本值"的映射；缺失或空单元格统一为空字符串

use serde::Serialize;
use std::collections::BTreeMap;

/// 单行数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由键值对构建，主要用于测试和合并
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// 列存在时返回其值
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// 列不存在时返回空字符串
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// 所有单元格都是空白
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

/// 一个数据源：表头 + 按输入顺序排列的行
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    /// 表头（保持原始顺序）
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl DataSource {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// 只保留前 N 行
    pub fn truncate(&mut self, limit: Option<usize>) {
        if let Some(limit) = limit {
            self.records.truncate(limit);
        }
    }

    /// 只保留指定列的值属于给定集合的行
    pub fn retain_values(&mut self, column: &str, allowed: &[String]) {
        self.records
            .retain(|record| allowed.iter().any(|v| v == record.value(column)));
    }
}
