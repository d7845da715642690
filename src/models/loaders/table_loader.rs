//! 数据表加载
//!
//! - Excel: .xlsx, .xls via calamine
//! - 分隔文本: .csv via csv（先用 encoding_rs 解码）
//!
//! 第一行是表头，所有单元格都按文本读取，保留前导零等原始格式。

use crate::error::{AppError, AppResult, DataError};
use crate::models::record::{DataSource, Record};
use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::Encoding;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// 数据表读取选项
#[derive(Debug, Clone, Copy)]
pub struct TableOptions<'a> {
    /// 工作表名（仅 Excel，None 表示第一个工作表）
    pub sheet: Option<&'a str>,
    /// 列分隔符（仅 CSV）
    pub delimiter: u8,
    /// 字符编码（仅 CSV）
    pub encoding: &'static Encoding,
}

impl Default for TableOptions<'_> {
    fn default() -> Self {
        Self {
            sheet: None,
            delimiter: b',',
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// 数据文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Spreadsheet,
    Delimited,
}

impl TableFormat {
    /// 根据扩展名（不区分大小写）判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xls" => Some(TableFormat::Spreadsheet),
            "csv" => Some(TableFormat::Delimited),
            _ => None,
        }
    }
}

/// 读取数据文件
pub fn load_table(data_path: &Path, options: &TableOptions<'_>) -> AppResult<DataSource> {
    if !data_path.exists() {
        return Err(AppError::file_read_failed(
            data_path.display().to_string(),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    }

    let format = TableFormat::from_path(data_path).ok_or_else(|| DataError::UnsupportedFormat {
        path: data_path.display().to_string(),
    })?;

    let source = match format {
        TableFormat::Spreadsheet => load_spreadsheet(data_path, options.sheet)?,
        TableFormat::Delimited => load_delimited(data_path, options.delimiter, options.encoding)?,
    };

    debug!(
        "数据已加载: {} ({} 列, {} 行)",
        data_path.display(),
        source.headers.len(),
        source.records.len()
    );

    Ok(source)
}

fn load_spreadsheet(path: &Path, sheet: Option<&str>) -> AppResult<DataSource> {
    let display = path.display().to_string();

    let mut workbook = open_workbook_auto(path).map_err(|e| DataError::WorkbookOpenFailed {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(DataError::SheetNotFound {
                    path: display,
                    sheet: name.to_string(),
                    available: sheet_names,
                }
                .into());
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| DataError::NoSheets {
                path: display.clone(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DataError::WorkbookOpenFailed {
            path: display.clone(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => normalize_headers(header_row.iter().map(cell_to_text).collect()),
        None => return Ok(DataSource::default()),
    };

    let records = rows
        .map(|row| {
            let cells = row.iter().map(cell_to_text).collect::<Vec<_>>();
            build_record(&headers, cells)
        })
        .filter(|record| !record.is_blank())
        .collect();

    Ok(DataSource::new(headers, records))
}

fn load_delimited(path: &Path, delimiter: u8, encoding: &'static Encoding) -> AppResult<DataSource> {
    let display = path.display().to_string();

    let bytes =
        std::fs::read(path).map_err(|e| AppError::file_read_failed(display.clone(), e))?;

    // decode 会识别 BOM，必要时切换编码并去掉 BOM
    let (text, used_encoding, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(DataError::DecodeFailed {
            path: display,
            encoding: used_encoding.name().to_string(),
        }
        .into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let csv_err = |source: csv::Error| DataError::CsvParseFailed {
        path: display.clone(),
        source,
    };

    let headers = normalize_headers(
        reader
            .headers()
            .map_err(&csv_err)?
            .iter()
            .map(str::to_string)
            .collect(),
    );

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result.map_err(&csv_err)?;
        if row.len() > headers.len() {
            warn!(
                "第 {} 行有 {} 个单元格，超出表头 {} 列，多余部分已忽略",
                idx + 1,
                row.len(),
                headers.len()
            );
        }
        let record = build_record(&headers, row.iter().map(str::to_string).collect());
        if !record.is_blank() {
            records.push(record);
        }
    }

    Ok(DataSource::new(headers, records))
}

/// 按表头拼装一行；单元格不足时补空字符串，多余的丢弃
fn build_record(headers: &[String], cells: Vec<String>) -> Record {
    let mut cells = cells.into_iter();
    let mut record = Record::new();
    for header in headers {
        record.insert(header.clone(), cells.next().unwrap_or_default());
    }
    record
}

/// 空表头命名为 `Unnamed: <列号>`，重复表头追加 `.1`、`.2` ...
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());

    for (col, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", col)
        } else {
            name
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while used.contains(&candidate) {
            candidate = format!("{}.{}", base, n);
            n += 1;
        }

        used.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

/// 单元格转文本
fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_to_text(*f),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| float_to_text(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// 整数值的浮点数不带小数部分（Excel 把所有数字都存成浮点）
fn float_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
