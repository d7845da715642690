//! 单行标签处理流程 - 流程层
//!
//! 核心职责：定义"一行数据"的完整处理流程
//!
//! 流程顺序：
//! 1. 填充模板（转义后替换占位符）
//! 2. 生成文件名（查不到字段时使用兜底名）

use tracing::{debug, warn};

use crate::models::{LabelCtx, Record};
use crate::services::filler::fill_template;
use crate::services::naming::{build_filename, NamingPattern};

/// 一行数据的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLabel {
    /// 行号（从 1 开始）
    pub row_index: usize,
    /// 清洗后的文件名
    pub file_name: String,
    /// 填充后的标签内容
    pub content: String,
    /// 文件名走了兜底时，导致兜底的字段
    pub unresolved_field: Option<String>,
}

/// 单行标签处理流程
///
/// - 持有模板文本和文件名模式（整个批次共用，只读）
/// - 不持有任何 I/O 资源，不写文件
/// - 行与行之间没有共享的可变状态
pub struct LabelFlow<'a> {
    template: &'a str,
    pattern: &'a NamingPattern,
}

impl<'a> LabelFlow<'a> {
    pub fn new(template: &'a str, pattern: &'a NamingPattern) -> Self {
        Self { template, pattern }
    }

    pub fn run(&self, record: &Record, ctx: &LabelCtx) -> RenderedLabel {
        let content = fill_template(self.template, record);
        let built = build_filename(self.pattern, record, ctx.row_index);

        if let Some(field) = &built.unresolved_field {
            warn!(
                "{} ⚠️ 文件名字段 {{{}}} 不存在，使用兜底名 {}",
                ctx, field, built.file_name
            );
        } else {
            debug!("{} 文件名: {}", ctx, built.file_name);
        }

        RenderedLabel {
            row_index: ctx.row_index,
            file_name: built.file_name,
            content,
            unresolved_field: built.unresolved_field,
        }
    }
}
