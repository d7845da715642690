//! 模板字段与数据列的比对 - 业务能力层
//!
//! 结果只作提示，不会中断批处理

use crate::models::Record;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// 比对报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// 模板中的占位符
    pub placeholders: BTreeSet<String>,
    /// 数据中的列
    pub columns: BTreeSet<String>,
    /// 模板需要但数据中没有的字段（升序）
    pub missing: Vec<String>,
    /// 数据中有但模板没有用到的列（升序）
    pub unused: Vec<String>,
    /// 两边都有的字段（升序）
    pub matched: Vec<String>,
    /// 所有占位符都能找到对应列
    pub is_valid: bool,
}

/// 比对占位符集合与列集合
pub fn reconcile(placeholders: &BTreeSet<String>, columns: &BTreeSet<String>) -> SchemaReport {
    // BTreeSet 的差集/交集天然有序
    let missing: Vec<String> = placeholders.difference(columns).cloned().collect();
    SchemaReport {
        placeholders: placeholders.clone(),
        columns: columns.clone(),
        unused: columns.difference(placeholders).cloned().collect(),
        matched: placeholders.intersection(columns).cloned().collect(),
        is_valid: missing.is_empty(),
        missing,
    }
}

/// 以第一条记录的键集合作为列集合进行比对；没有记录时列集合为空
pub fn reconcile_records(placeholders: &BTreeSet<String>, records: &[Record]) -> SchemaReport {
    let columns = records
        .first()
        .map(|record| record.keys().cloned().collect())
        .unwrap_or_default();
    reconcile(placeholders, &columns)
}

/// 唯一列检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UniquenessReport {
    pub column: String,
    /// 重复值 -> 出现的行号（从 1 开始）
    pub duplicates: BTreeMap<String, Vec<usize>>,
    /// 值为空的行号
    pub empty_rows: Vec<usize>,
}

impl UniquenessReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.empty_rows.is_empty()
    }
}

/// 检查某一列的值是否唯一且非空
///
/// 调用方需保证该列存在；缺列时所有行都会被计为空值。
pub fn check_unique(records: &[Record], column: &str) -> UniquenessReport {
    let mut seen: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut empty_rows = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        let value = record.value(column).trim();
        if value.is_empty() {
            empty_rows.push(row);
        } else {
            seen.entry(value.to_string()).or_default().push(row);
        }
    }

    seen.retain(|_, rows| rows.len() > 1);

    UniquenessReport {
        column: column.to_string(),
        duplicates: seen,
        empty_rows,
    }
}
