// 命令行参数，映射到 ConfigLayer

use crate::config::{Config, ConfigLayer};
use crate::error::AppResult;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "dymo_label_gen")]
#[command(
    about = "根据模板和 Excel/CSV 数据批量生成 .dymo 标签文件",
    long_about = None,
    version
)]
pub struct Cli {
    /// 模板路径（.dymo）
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// 数据路径（.xlsx/.xls/.csv）
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Excel 工作表名（默认第一个）
    #[arg(long)]
    pub sheet: Option<String>,

    /// CSV 分隔符（默认 ,；制表符写 \t）
    #[arg(long)]
    pub sep: Option<String>,

    /// CSV 编码（默认 utf-8）
    #[arg(long)]
    pub encoding: Option<String>,

    /// 输出目录（默认 out）
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// 文件名模式，使用列名；{i} 是从 1 开始的行号（默认 {Code}_{Color}_{Size}.dymo）
    #[arg(long)]
    pub name: Option<String>,

    /// 只处理前 N 行
    #[arg(long)]
    pub limit: Option<usize>,

    /// 不写文件，只显示校验结果和预览
    #[arg(long)]
    pub dry_run: bool,

    /// TOML 配置文件
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 条码表（.xlsx/.xls/.csv），按关联列合并到数据上
    #[arg(long)]
    pub ean_data: Option<PathBuf>,

    /// 条码表的工作表名
    #[arg(long)]
    pub ean_sheet: Option<String>,

    /// 合并关联列（默认 Code）
    #[arg(long)]
    pub join_key: Option<String>,

    /// 条码列（默认 Barcode）
    #[arg(long)]
    pub ean_column: Option<String>,

    /// 检查该列的值是否唯一且非空
    #[arg(long)]
    pub unique_column: Option<String>,

    /// 只生成这些分组的标签（可重复）
    #[arg(long = "group")]
    pub groups: Vec<String>,

    /// 分组列（默认 Group）
    #[arg(long)]
    pub group_column: Option<String>,

    /// 写完后打包为 ZIP
    #[arg(long)]
    pub zip: Option<PathBuf>,

    /// 在 stdout 输出 JSON 格式的运行汇总
    #[arg(long)]
    pub json: bool,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 命令行本身这一层配置；未给出的开关不覆盖下层
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            template: self.template.clone(),
            data: self.data.clone(),
            sheet: self.sheet.clone(),
            sep: self.sep.clone(),
            encoding: self.encoding.clone(),
            out: self.out.clone(),
            name: self.name.clone(),
            limit: self.limit,
            dry_run: self.dry_run.then_some(true),
            ean_data: self.ean_data.clone(),
            ean_sheet: self.ean_sheet.clone(),
            join_key: self.join_key.clone(),
            ean_column: self.ean_column.clone(),
            unique_column: self.unique_column.clone(),
            groups: (!self.groups.is_empty()).then(|| self.groups.clone()),
            group_column: self.group_column.clone(),
            zip: self.zip.clone(),
            json: self.json.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }

    /// 合并配置文件、环境变量和命令行，得到最终配置
    pub fn into_config(self) -> AppResult<Config> {
        let file_layer = match &self.config {
            Some(path) => ConfigLayer::from_toml_file(path)?,
            None => ConfigLayer::default(),
        };

        file_layer
            .merge(ConfigLayer::from_env()?)
            .merge(self.to_layer())
            .build()
    }
}
