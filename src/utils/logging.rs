use crate::config::Config;
use crate::orchestrator::report::{LabelSample, RunReport};
use crate::services::{MergeStats, SchemaReport, UniquenessReport};
/// 日志工具模块
///
/// 提供控制台报告的格式化和输出函数
use tracing::{info, warn};

/// 预览片段的最大字符数
pub const SNIPPET_CHARS: usize = 400;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 标签生成 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📄 模板: {}", config.template_path.display());
    info!("📊 数据: {}", config.data_path.display());
    if config.dry_run {
        info!("🔍 模式: DRY RUN（不写文件）");
    } else {
        info!("📁 输出目录: {}", config.out_dir.display());
    }
    info!("{}", "=".repeat(60));
}

/// 记录条码合并统计
pub fn log_merge_stats(stats: &MergeStats) {
    if stats.unmatched > 0 {
        warn!("⚠️ {} 行没有匹配到条码", stats.unmatched);
    }
}

/// 记录字段比对结果
///
/// 缺失的占位符是警告，未使用的列只是提示。
pub fn log_schema(report: &SchemaReport) {
    info!("模板占位符: {:?}", report.placeholders);
    info!("数据列:     {:?}", report.columns);

    if !report.missing.is_empty() {
        warn!("⚠️ 模板占位符没有对应的数据列: {:?}", report.missing);
    }
    if !report.unused.is_empty() {
        info!("提示: 模板没有用到的列: {:?}", report.unused);
    }
}

/// 记录唯一列检查结果
pub fn log_uniqueness(report: &UniquenessReport) {
    if report.is_clean() {
        info!("✓ 列 {} 的值全部唯一且非空", report.column);
        return;
    }
    for (value, rows) in &report.duplicates {
        warn!("⚠️ 列 {} 的值 {} 重复出现在行 {:?}", report.column, value, rows);
    }
    if !report.empty_rows.is_empty() {
        warn!("⚠️ 列 {} 在行 {:?} 为空", report.column, report.empty_rows);
    }
}

/// 生成预览片段：换行替换为空格，超长截断
pub fn snippet(content: &str) -> String {
    truncate_text(&content.replace('\n', " "), SNIPPET_CHARS)
}

/// 记录 DRY RUN 预览
pub fn log_dry_run(sample: &LabelSample, rows: usize) {
    info!("\n{}", "─".repeat(60));
    info!("--- DRY RUN ---");
    info!("将生成 {} 个标签", rows);
    info!("示例文件名: {}", sample.file_name);
    info!("标签内容片段: {}", sample.snippet);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &RunReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));

    let renamed: Vec<_> = report.renamed().collect();
    if !renamed.is_empty() {
        warn!("⚠️ {} 个文件因重名被改名:", renamed.len());
        for label in renamed {
            warn!(
                "   行 {}: {} → {}",
                label.row_index,
                label.renamed_from.as_deref().unwrap_or_default(),
                label.file_name
            );
        }
    }
    if !report.fallback_rows.is_empty() {
        warn!("⚠️ 使用兜底文件名的行: {:?}", report.fallback_rows);
    }

    let out_dir = report
        .out_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    info!("✅ 已创建 {} 个文件: {}", report.written_count(), out_dir);
    if let Some(archive) = &report.archive {
        info!("📦 压缩包: {}", archive.display());
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("àèìòù", 2), "àè...");
    }

    #[test]
    fn test_snippet_flattens_newlines() {
        assert_eq!(snippet("<a>\n<b/>\n</a>"), "<a> <b/> </a>");

        let long = "x".repeat(SNIPPET_CHARS + 10);
        let s = snippet(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), SNIPPET_CHARS + 3);
    }
}
