use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error(transparent)]
    File(#[from] FileError),
    /// 数据表错误
    #[error(transparent)]
    Data(#[from] DataError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 输出写入错误
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// 文件读取错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败: {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 模板不是合法的 UTF-8 文本
    #[error("模板不是 UTF-8 文本: {path}")]
    InvalidUtf8 { path: String },
    /// TOML 解析失败
    #[error("TOML解析失败: {path}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 数据表错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 不支持的数据格式
    #[error("不支持的数据格式: {path}（请使用 .xlsx/.xls 或 .csv）")]
    UnsupportedFormat { path: String },
    /// 工作簿打开失败
    #[error("无法打开工作簿 ({path}): {message}")]
    WorkbookOpenFailed { path: String, message: String },
    /// 工作表不存在
    #[error("工作表 '{sheet}' 不存在 ({path})，可用: {available:?}")]
    SheetNotFound {
        path: String,
        sheet: String,
        available: Vec<String>,
    },
    /// 工作簿中没有任何工作表
    #[error("工作簿中没有工作表: {path}")]
    NoSheets { path: String },
    /// CSV 解析失败
    #[error("CSV解析失败: {path}")]
    CsvParseFailed {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// 按指定编码解码失败
    #[error("无法按 {encoding} 解码 ({path})")]
    DecodeFailed { path: String, encoding: String },
    /// 必需的列不存在
    #[error("{table} 中缺少列 '{column}'")]
    MissingColumn { table: String, column: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必填项缺失
    #[error("缺少必填配置: {field}")]
    MissingField { field: &'static str },
    /// 分隔符不合法
    #[error("分隔符必须是单个 ASCII 字符: {value:?}")]
    InvalidDelimiter { value: String },
    /// 编码名称无法识别
    #[error("无法识别的字符编码: {label}")]
    UnknownEncoding { label: String },
    /// 文件名模式不合法
    #[error("文件名模式不合法 ({pattern}): {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// 行数限制不合法
    #[error("行数限制必须大于 0")]
    InvalidLimit,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 输出写入错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 创建输出目录失败
    #[error("创建输出目录失败: {path}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入标签文件失败
    #[error("写入文件失败: {path}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 打包 ZIP 失败
    #[error("ZIP 打包失败 ({path}): {message}")]
    ArchiveFailed { path: String, message: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AppError::File(FileError::NotFound { path })
        } else {
            AppError::File(FileError::ReadFailed { path, source })
        }
    }

    /// 创建缺列错误
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        AppError::Data(DataError::MissingColumn {
            table: table.into(),
            column: column.into(),
        })
    }

    /// 创建文件名模式错误
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
