//! 运行汇总
//!
//! 每次运行重新生成，不落盘；`--json` 时整体序列化输出

use crate::services::{MergeStats, SchemaReport, UniquenessReport, WrittenLabel};
use serde::Serialize;
use std::path::PathBuf;

/// 运行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// 数据为空，什么都没做
    Empty,
    /// 只做了校验和预览
    DryRun,
    /// 已写出全部标签
    Completed,
}

/// 预览样例（第 1 行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSample {
    pub file_name: String,
    /// 截断后的内容片段
    pub snippet: String,
}

/// 运行汇总
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// 本次处理的行数（已应用筛选和行数限制）
    pub rows: usize,
    pub schema: SchemaReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniqueness: Option<UniquenessReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<LabelSample>,
    /// 写出的文件（按行号顺序）
    pub written: Vec<WrittenLabel>,
    /// 文件名走了兜底的行号
    pub fallback_rows: Vec<usize>,
    /// 输出目录的绝对路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
}

impl RunReport {
    pub fn new(outcome: RunOutcome, rows: usize, schema: SchemaReport) -> Self {
        Self {
            outcome,
            rows,
            schema,
            uniqueness: None,
            merge: None,
            sample: None,
            written: Vec::new(),
            fallback_rows: Vec::new(),
            out_dir: None,
            archive: None,
        }
    }

    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// 因重名被改名的文件
    pub fn renamed(&self) -> impl Iterator<Item = &WrittenLabel> {
        self.written.iter().filter(|w| w.renamed_from.is_some())
    }
}
