//! 程序配置
//!
//! 配置按层叠加，后者覆盖前者：
//! 默认值 → TOML 配置文件 → 环境变量 → 命令行参数。
//! 合并后校验一次，得到不可变的 [`Config`]，显式传给编排层。

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::services::naming::NamingPattern;
use encoding_rs::Encoding;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 模板路径
    pub template_path: PathBuf,
    /// 数据路径（.xlsx/.xls/.csv）
    pub data_path: PathBuf,
    /// Excel 工作表名
    pub sheet: Option<String>,
    /// CSV 分隔符
    pub delimiter: u8,
    /// CSV 字符编码
    pub encoding: &'static Encoding,
    /// 输出目录
    pub out_dir: PathBuf,
    /// 文件名模式
    pub name_pattern: NamingPattern,
    /// 只处理前 N 行
    pub limit: Option<usize>,
    /// 只校验不写文件
    pub dry_run: bool,
    // --- 条码表合并 ---
    pub ean_data_path: Option<PathBuf>,
    pub ean_sheet: Option<String>,
    pub join_key: String,
    pub ean_column: String,
    // --- 数据检查与筛选 ---
    /// 需要唯一且非空的列
    pub unique_column: Option<String>,
    /// 只保留这些分组（为空表示不筛选）
    pub groups: Vec<String>,
    pub group_column: String,
    // --- 输出 ---
    /// 写完后打包为 ZIP
    pub zip_path: Option<PathBuf>,
    /// 以 JSON 输出运行汇总
    pub json_report: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Config {
    /// 使用默认值创建配置，只需提供模板和数据路径
    pub fn new(template_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            data_path: data_path.into(),
            sheet: None,
            delimiter: b',',
            encoding: encoding_rs::UTF_8,
            out_dir: PathBuf::from("out"),
            name_pattern: NamingPattern::default(),
            limit: None,
            dry_run: false,
            ean_data_path: None,
            ean_sheet: None,
            join_key: "Code".to_string(),
            ean_column: "Barcode".to_string(),
            unique_column: None,
            groups: Vec::new(),
            group_column: "Group".to_string(),
            zip_path: None,
            json_report: false,
            verbose_logging: false,
        }
    }
}

/// 一层配置，所有字段都可缺省
///
/// 配置文件、环境变量和命令行各自产生一层，再按优先级合并。
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub template: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub sheet: Option<String>,
    pub sep: Option<String>,
    pub encoding: Option<String>,
    pub out: Option<PathBuf>,
    pub name: Option<String>,
    pub limit: Option<usize>,
    pub dry_run: Option<bool>,
    pub ean_data: Option<PathBuf>,
    pub ean_sheet: Option<String>,
    pub join_key: Option<String>,
    pub ean_column: Option<String>,
    pub unique_column: Option<String>,
    pub groups: Option<Vec<String>>,
    pub group_column: Option<String>,
    pub zip: Option<PathBuf>,
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

macro_rules! overlay {
    ($base:ident, $top:ident, $($field:ident),+ $(,)?) => {
        $( if $top.$field.is_some() { $base.$field = $top.$field; } )+
    };
}

impl ConfigLayer {
    /// 读取 TOML 配置文件
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let layer = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;

        Ok(layer)
    }

    /// 读取 `DYMO_*` 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let limit = match get("DYMO_LIMIT") {
            Some(value) => Some(value.trim().parse::<usize>().map_err(|_| {
                ConfigError::EnvVarParseFailed {
                    var_name: "DYMO_LIMIT".to_string(),
                    value: value.clone(),
                    expected_type: "正整数".to_string(),
                }
            })?),
            None => None,
        };

        let dry_run = match get("DYMO_DRY_RUN") {
            Some(value) => Some(parse_bool(&value).ok_or_else(|| {
                ConfigError::EnvVarParseFailed {
                    var_name: "DYMO_DRY_RUN".to_string(),
                    value: value.clone(),
                    expected_type: "布尔值".to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            template: get("DYMO_TEMPLATE").map(PathBuf::from),
            data: get("DYMO_DATA").map(PathBuf::from),
            sheet: get("DYMO_SHEET"),
            sep: var("DYMO_SEP").filter(|v| !v.is_empty()),
            encoding: get("DYMO_ENCODING"),
            out: get("DYMO_OUT").map(PathBuf::from),
            name: get("DYMO_NAME"),
            limit,
            dry_run,
            ..Default::default()
        })
    }

    /// 用 `top` 中存在的字段覆盖当前层
    pub fn merge(mut self, top: ConfigLayer) -> Self {
        overlay!(
            self, top, template, data, sheet, sep, encoding, out, name, limit, dry_run, ean_data,
            ean_sheet, join_key, ean_column, unique_column, groups, group_column, zip, json,
            verbose,
        );
        self
    }

    /// 校验并生成最终配置
    pub fn build(self) -> AppResult<Config> {
        let template = self
            .template
            .ok_or(ConfigError::MissingField { field: "template" })?;
        let data = self.data.ok_or(ConfigError::MissingField { field: "data" })?;

        let mut config = Config::new(template, data);

        if let Some(sep) = self.sep {
            config.delimiter = parse_delimiter(&sep)?;
        }
        if let Some(label) = self.encoding {
            config.encoding = parse_encoding(&label)?;
        }
        if let Some(name) = self.name {
            config.name_pattern = NamingPattern::parse(&name)?;
        }
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(ConfigError::InvalidLimit.into());
            }
            config.limit = Some(limit);
        }
        if let Some(out) = self.out {
            config.out_dir = out;
        }
        if let Some(join_key) = self.join_key {
            config.join_key = join_key;
        }
        if let Some(ean_column) = self.ean_column {
            config.ean_column = ean_column;
        }
        if let Some(group_column) = self.group_column {
            config.group_column = group_column;
        }

        config.sheet = self.sheet;
        config.ean_data_path = self.ean_data;
        config.ean_sheet = self.ean_sheet;
        config.unique_column = self.unique_column;
        config.groups = self.groups.unwrap_or_default();
        config.zip_path = self.zip;
        config.dry_run = self.dry_run.unwrap_or(false);
        config.json_report = self.json.unwrap_or(false);
        config.verbose_logging = self.verbose.unwrap_or(false);

        Ok(config)
    }
}

/// 解析分隔符：单个 ASCII 字符，或 `\t` / `tab`
pub fn parse_delimiter(value: &str) -> AppResult<u8> {
    match value {
        "\\t" | "tab" | "TAB" => return Ok(b'\t'),
        _ => {}
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(ConfigError::InvalidDelimiter {
            value: value.to_string(),
        }
        .into()),
    }
}

/// 解析编码名称（WHATWG 标签，如 `utf-8`、`latin1`、`windows-1252`）
pub fn parse_encoding(label: &str) -> AppResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        ConfigError::UnknownEncoding {
            label: label.to_string(),
        }
        .into()
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
