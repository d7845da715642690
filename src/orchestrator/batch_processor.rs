//! 批量标签处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次批处理从加载到汇总的全过程。
//!
//! ## 运行状态
//!
//! ```text
//! Loaded ──► Reconciled ──┬─► DryRunComplete   （不建目录，不写文件）
//!                         └─► Writing ──► Done （N 个文件）
//! 任一步骤出现致命错误 ──► Failed（进程以非零状态退出）
//! ```
//!
//! ## 设计特点
//!
//! - **先检查后写入**：所有致命错误都在 `initialize` 阶段暴露，写文件前不会半途失败于配置问题
//! - **顺序处理**：按输入顺序逐行填充、命名、写入，一行写完再处理下一行
//! - **向下委托**：单行处理交给 `LabelFlow`，写入交给 `LabelWriter`

use crate::config::Config;
use crate::models::{load_table, load_template, DataSource, LabelCtx, TableOptions};
use crate::orchestrator::report::{LabelSample, RunOutcome, RunReport};
use crate::services::naming::ROW_INDEX_FIELD;
use crate::services::{
    check_unique, check_zip_target, create_zip_archive, extract_placeholders, merge_barcodes,
    reconcile_records, LabelWriter, MergeStats,
};
use crate::utils::logging;
use crate::workflow::LabelFlow;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 应用主结构
///
/// 持有已加载的模板和数据（Loaded 状态），之后只读。
pub struct App {
    config: Config,
    template: String,
    data: DataSource,
    merge_stats: Option<MergeStats>,
}

impl App {
    /// 初始化应用：读取模板和数据，应用合并、筛选和行数限制
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        if let Some(zip_path) = &config.zip_path {
            check_zip_target(zip_path).context("ZIP 目标路径不可用")?;
        }

        let template = load_template(&config.template_path)
            .await
            .with_context(|| format!("无法读取模板: {}", config.template_path.display()))?;

        let options = TableOptions {
            sheet: config.sheet.as_deref(),
            delimiter: config.delimiter,
            encoding: config.encoding,
        };
        let mut data = load_table(&config.data_path, &options)
            .with_context(|| format!("无法读取数据: {}", config.data_path.display()))?;

        let mut merge_stats = None;
        if let Some(ean_path) = &config.ean_data_path {
            let ean_options = TableOptions {
                sheet: config.ean_sheet.as_deref(),
                ..options
            };
            let barcodes = load_table(ean_path, &ean_options)
                .with_context(|| format!("无法读取条码表: {}", ean_path.display()))?;

            let (merged, stats) =
                merge_barcodes(&data, &barcodes, &config.join_key, &config.ean_column)
                    .context("条码表合并失败")?;
            logging::log_merge_stats(&stats);
            data = merged;
            merge_stats = Some(stats);
        }

        if !config.groups.is_empty() {
            if !data.has_column(&config.group_column) {
                anyhow::bail!(
                    "数据中缺少分组列 '{}'，无法按分组筛选",
                    config.group_column
                );
            }
            let before = data.len();
            data.retain_values(&config.group_column, &config.groups);
            info!(
                "✓ 按分组 {:?} 筛选: {} → {} 行",
                config.groups,
                before,
                data.len()
            );
        }

        data.truncate(config.limit);

        Ok(Self {
            config,
            template,
            data,
            merge_stats,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunReport> {
        let records = &self.data.records;
        let placeholders = extract_placeholders(&self.template);

        // 比对（Reconciled）
        let schema = reconcile_records(&placeholders, records);

        if records.is_empty() {
            warn!("⚠️ 数据为空：没有需要处理的行");
            let mut report = RunReport::new(RunOutcome::Empty, 0, schema);
            report.merge = self.merge_stats;
            return Ok(report);
        }

        logging::log_schema(&schema);
        self.warn_row_index_column();

        let total_rows = records.len();
        let mut report = RunReport::new(RunOutcome::DryRun, total_rows, schema);
        report.merge = self.merge_stats;

        if let Some(column) = &self.config.unique_column {
            if self.data.has_column(column) {
                let uniqueness = check_unique(records, column);
                logging::log_uniqueness(&uniqueness);
                report.uniqueness = Some(uniqueness);
            } else {
                warn!("⚠️ 唯一性检查的列 '{}' 不存在，已跳过", column);
            }
        }

        let flow = LabelFlow::new(&self.template, &self.config.name_pattern);

        if self.config.dry_run {
            // 只处理第一行作为样例（DryRunComplete）
            let label = flow.run(&records[0], &LabelCtx::new(1, total_rows));
            let sample = LabelSample {
                file_name: label.file_name,
                snippet: logging::snippet(&label.content),
            };
            logging::log_dry_run(&sample, total_rows);
            if label.unresolved_field.is_some() {
                report.fallback_rows.push(1);
            }
            report.sample = Some(sample);
            return Ok(report);
        }

        // 写入（Writing）
        let mut writer = LabelWriter::new(&self.config.out_dir);
        writer
            .ensure_dir()
            .await
            .context("无法创建输出目录")?;

        for (index, record) in records.iter().enumerate() {
            let ctx = LabelCtx::new(index + 1, total_rows);
            let label = flow.run(record, &ctx);
            if label.unresolved_field.is_some() {
                report.fallback_rows.push(ctx.row_index);
            }

            let written = writer
                .write(ctx.row_index, &label.file_name, &label.content)
                .await
                .with_context(|| format!("{} 写入失败", ctx))?;
            report.written.push(written);
        }

        // 完成（Done）
        report.outcome = RunOutcome::Completed;
        report.out_dir = Some(
            std::fs::canonicalize(writer.out_dir())
                .unwrap_or_else(|_| writer.out_dir().to_path_buf()),
        );

        if let Some(zip_path) = &self.config.zip_path {
            let names: Vec<String> = report.written.iter().map(|w| w.file_name.clone()).collect();
            create_zip_archive(zip_path, writer.out_dir(), &names).context("打包 ZIP 失败")?;
            report.archive = Some(zip_path.clone());
        }

        logging::print_final_stats(&report);

        Ok(report)
    }

    /// 已加载（并筛选、截断后）的数据
    pub fn data(&self) -> &DataSource {
        &self.data
    }

    /// 名为 `i` 的列与行号字段冲突时提示：文件名中的 `{i}` 始终是行号
    fn warn_row_index_column(&self) {
        let uses_index = self
            .config
            .name_pattern
            .fields()
            .any(|f| f == ROW_INDEX_FIELD);

        if uses_index && self.data.has_column(ROW_INDEX_FIELD) {
            warn!(
                "⚠️ 数据中有名为 '{}' 的列；文件名模式中的 {{{}}} 使用行号，不使用该列",
                ROW_INDEX_FIELD, ROW_INDEX_FIELD
            );
        }
    }
}
