//! 输出文件名生成 - 业务能力层
//!
//! 文件名模式形如 `{Code}_{Color}_{Size}.dymo`：
//! - `{列名}` 引用当前行的值
//! - `{i}` 是从 1 开始的行号，优先于名为 `i` 的列
//! - `{{` / `}}` 表示字面量花括号
//!
//! 生成的名字总是非空、可以直接作为单个路径段使用。

use crate::error::{AppError, AppResult};
use crate::models::Record;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// 文件名最大字符数
pub const MAX_FILENAME_CHARS: usize = 180;

/// 文件名最大字节数（UTF-8）；常见文件系统上限为 255 字节，留出重名后缀的余量
pub const MAX_FILENAME_BYTES: usize = 240;

/// 清洗后为空时使用的名字
pub const EMPTY_NAME_FALLBACK: &str = "label";

/// 行号字段名
pub const ROW_INDEX_FIELD: &str = "i";

/// 默认文件名模式
pub const DEFAULT_NAME_PATTERN: &str = "{Code}_{Color}_{Size}.dymo";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// 解析后的文件名模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl NamingPattern {
    /// 解析模式，花括号不配对或字段名为空时报错
    pub fn parse(pattern: &str) -> AppResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => {
                                return Err(AppError::invalid_pattern(
                                    pattern,
                                    "字段名中不能出现 '{'",
                                ))
                            }
                            Some(c) => field.push(c),
                            None => {
                                return Err(AppError::invalid_pattern(pattern, "缺少 '}'"));
                            }
                        }
                    }
                    if field.is_empty() {
                        return Err(AppError::invalid_pattern(pattern, "字段名不能为空"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => {
                    return Err(AppError::invalid_pattern(pattern, "多余的 '}'"));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 模式引用的字段（按出现顺序，可能重复）
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// 模式末尾的字面量扩展名，例如 `.dymo`
    pub fn extension(&self) -> Option<&str> {
        match self.segments.last()? {
            Segment::Literal(text) => {
                let dot = text.rfind('.')?;
                let ext = &text[dot..];
                let valid = ext.len() > 1 && ext[1..].chars().all(|c| c.is_alphanumeric());
                valid.then_some(ext)
            }
            Segment::Field(_) => None,
        }
    }

    /// 按查找函数展开模式；遇到查不到的字段时返回该字段名
    pub fn render<'v, F>(&self, mut lookup: F) -> Result<String, &str>
    where
        F: FnMut(&str) -> Option<Cow<'v, str>>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => return Err(name),
                },
            }
        }
        Ok(out)
    }
}

impl Default for NamingPattern {
    fn default() -> Self {
        // 默认模式是常量，解析不会失败
        Self::parse(DEFAULT_NAME_PATTERN).expect("默认文件名模式必须合法")
    }
}

/// 文件名字段查找：行数据 + 行号
///
/// 查找是全函数：不存在的字段返回 None，由调用方走兜底文件名。
pub struct NameLookup<'a> {
    record: &'a Record,
    row_index: usize,
}

impl<'a> NameLookup<'a> {
    pub fn new(record: &'a Record, row_index: usize) -> Self {
        Self { record, row_index }
    }

    pub fn get(&self, field: &str) -> Option<Cow<'a, str>> {
        if field == ROW_INDEX_FIELD {
            return Some(Cow::Owned(self.row_index.to_string()));
        }
        self.record.get(field).map(Cow::Borrowed)
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltName {
    /// 清洗后的文件名
    pub file_name: String,
    /// 使用兜底名时，记录导致兜底的字段
    pub unresolved_field: Option<String>,
}

/// 为一行数据生成文件名
pub fn build_filename(pattern: &NamingPattern, record: &Record, row_index: usize) -> BuiltName {
    let lookup = NameLookup::new(record, row_index);

    match pattern.render(|field| lookup.get(field)) {
        Ok(name) => BuiltName {
            file_name: sanitize_filename(&name),
            unresolved_field: None,
        },
        Err(field) => BuiltName {
            file_name: sanitize_filename(&fallback_name(pattern, row_index)),
            unresolved_field: Some(field.to_string()),
        },
    }
}

/// 兜底文件名：`label_<行号>` 加上模式的扩展名
pub fn fallback_name(pattern: &NamingPattern, row_index: usize) -> String {
    format!(
        "{}_{}{}",
        EMPTY_NAME_FALLBACK,
        row_index,
        pattern.extension().unwrap_or("")
    )
}

fn unsafe_chars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\-. ]+").expect("文件名字符正则必须合法"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("空白正则必须合法"))
}

/// 清洗文件名
///
/// 1. 去掉首尾空白
/// 2. `/`、`\`、`:` 替换为 `-`
/// 3. 其余不在 [单词字符 - . 空格] 内的字符串替换为 `-`
/// 4. 连续空白替换为 `_`
/// 5. 截断到 [`MAX_FILENAME_CHARS`] 个字符和 [`MAX_FILENAME_BYTES`] 字节以内，保留扩展名
/// 6. 结果为空或只有点号时返回 `label`
pub fn sanitize_filename(name: &str) -> String {
    let s = name.trim().replace(['/', '\\', ':'], "-");
    let s = unsafe_chars_regex().replace_all(&s, "-");
    let s = whitespace_regex().replace_all(&s, "_");
    let (stem, ext) = split_extension(&s);
    let s = fit_name(stem, ext);

    // "." 和 ".." 不能作为文件名
    if s.chars().all(|c| c == '.') {
        EMPTY_NAME_FALLBACK.to_string()
    } else {
        s
    }
}

/// 拆分扩展名；以点开头且没有其他点的名字视为没有扩展名
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    }
}

/// 拼接 `stem + suffix`，只截断 stem，使结果不超过字符数和字节数上限
///
/// suffix 本身就放不下时整体截断。
pub fn fit_name(stem: &str, suffix: &str) -> String {
    let suffix_chars = suffix.chars().count();
    if suffix_chars >= MAX_FILENAME_CHARS || suffix.len() >= MAX_FILENAME_BYTES {
        let whole = format!("{}{}", stem, suffix);
        return truncate_at_char_boundary(&whole, MAX_FILENAME_CHARS, MAX_FILENAME_BYTES).to_string();
    }

    let mut out = truncate_at_char_boundary(
        stem,
        MAX_FILENAME_CHARS - suffix_chars,
        MAX_FILENAME_BYTES - suffix.len(),
    )
    .to_string();
    out.push_str(suffix);
    out
}

fn truncate_at_char_boundary(s: &str, max_chars: usize, max_bytes: usize) -> &str {
    let mut end = 0;
    for (count, (idx, ch)) in s.char_indices().enumerate() {
        let next = idx + ch.len_utf8();
        if count >= max_chars || next > max_bytes {
            break;
        }
        end = next;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::from_pairs([("Code", "A123"), ("Color", "Blue"), ("Size", "M")])
    }

    #[test]
    fn test_default_pattern() {
        let pattern = NamingPattern::default();
        let built = build_filename(&pattern, &record(), 1);
        assert_eq!(built.file_name, "A123_Blue_M.dymo");
        assert_eq!(built.unresolved_field, None);
    }

    #[test]
    fn test_slash_replaced_by_hyphen() {
        let pattern = NamingPattern::default();
        let rec = Record::from_pairs([("Code", "A/123"), ("Color", "Blue"), ("Size", "M")]);
        assert_eq!(build_filename(&pattern, &rec, 1).file_name, "A-123_Blue_M.dymo");
    }

    #[test]
    fn test_row_index_field() {
        let pattern = NamingPattern::parse("{i}-{Code}.dymo").unwrap();
        assert_eq!(build_filename(&pattern, &record(), 7).file_name, "7-A123.dymo");
    }

    #[test]
    fn test_row_index_wins_over_column_named_i() {
        let pattern = NamingPattern::parse("{i}").unwrap();
        let rec = Record::from_pairs([("i", "from-column")]);
        assert_eq!(build_filename(&pattern, &rec, 3).file_name, "3");
    }

    #[test]
    fn test_missing_field_falls_back() {
        let pattern = NamingPattern::parse("{Code}_{Brand}.dymo").unwrap();
        let built = build_filename(&pattern, &record(), 4);
        assert_eq!(built.file_name, "label_4.dymo");
        assert_eq!(built.unresolved_field.as_deref(), Some("Brand"));
    }

    #[test]
    fn test_fallback_without_extension() {
        let pattern = NamingPattern::parse("{Brand}").unwrap();
        assert_eq!(build_filename(&pattern, &record(), 2).file_name, "label_2");
    }

    #[test]
    fn test_empty_values_still_produce_a_name() {
        let pattern = NamingPattern::parse("{Code}").unwrap();
        let rec = Record::from_pairs([("Code", "   ")]);
        assert_eq!(build_filename(&pattern, &rec, 1).file_name, "label");
    }

    #[test]
    fn test_literal_braces() {
        let pattern = NamingPattern::parse("{{x}}{Code}").unwrap();
        // 花括号本身不是安全字符，会被替换为 -
        assert_eq!(build_filename(&pattern, &record(), 1).file_name, "-x-A123");
    }

    #[test]
    fn test_parse_errors() {
        assert!(NamingPattern::parse("{Code").is_err());
        assert!(NamingPattern::parse("Code}").is_err());
        assert!(NamingPattern::parse("{}").is_err());
        assert!(NamingPattern::parse("{a{b}}").is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(NamingPattern::parse("{A}.dymo").unwrap().extension(), Some(".dymo"));
        assert_eq!(NamingPattern::parse("{A}_x.label").unwrap().extension(), Some(".label"));
        assert_eq!(NamingPattern::parse("{A}").unwrap().extension(), None);
        assert_eq!(NamingPattern::parse("{A}.").unwrap().extension(), None);
    }

    #[test]
    fn test_fields() {
        let pattern = NamingPattern::parse("{Code}_{i}_{Code}").unwrap();
        assert_eq!(pattern.fields().collect::<Vec<_>>(), vec!["Code", "i", "Code"]);
    }

    #[test]
    fn test_sanitize_rules() {
        assert_eq!(sanitize_filename("  a b\tc  "), "a_b-c");
        assert_eq!(sanitize_filename("C:\\tmp\\x"), "C--tmp-x");
        assert_eq!(sanitize_filename("a*?\"<>|b"), "a-b");
        assert_eq!(sanitize_filename("Maglia  Rossa"), "Maglia_Rossa");
        assert_eq!(sanitize_filename(""), "label");
        assert_eq!(sanitize_filename(".."), "label");
        assert_eq!(sanitize_filename("Perù.dymo"), "Perù.dymo");
    }

    #[test]
    fn test_long_name_keeps_extension() {
        let pattern = NamingPattern::parse("{Desc}.dymo").unwrap();
        let rec = Record::from_pairs([("Desc", "x".repeat(300))]);
        let name = build_filename(&pattern, &rec, 1).file_name;
        assert!(name.ends_with(".dymo"));
        assert_eq!(name.chars().count(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_multibyte_name_fits_byte_budget() {
        let pattern = NamingPattern::default();
        let rec = Record::from_pairs([("Code", "漢".repeat(200)), ("Color", "Blu".into()), ("Size", "M".into())]);
        let name = build_filename(&pattern, &rec, 2).file_name;
        assert!(name.len() <= MAX_FILENAME_BYTES);
        assert!(name.ends_with(".dymo"));
        assert!(name.starts_with("漢漢漢"));

        let accented = sanitize_filename(&format!("{}.dymo", "è".repeat(200)));
        assert!(accented.len() <= MAX_FILENAME_BYTES);
        assert!(accented.ends_with(".dymo"));
    }

    #[test]
    fn test_fit_name_respects_both_limits() {
        assert_eq!(fit_name("abc", ".dymo"), "abc.dymo");
        let fitted = fit_name(&"€".repeat(100), "_7.dymo");
        assert!(fitted.len() <= MAX_FILENAME_BYTES);
        assert!(fitted.ends_with("_7.dymo"));
        // 截断不会切在多字节字符中间
        assert!(fitted.trim_end_matches("_7.dymo").chars().all(|c| c == '€'));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.b.dymo"), ("a.b", ".dymo"));
        assert_eq!(split_extension("label"), ("label", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_FILENAME_CHARS);
    }
}
