//! 占位符提取 - 业务能力层
//!
//! 只负责"模板里引用了哪些字段"，不关心数据从哪里来

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// 占位符语法：`{{Name}}`，Name 只能由单词字符组成
const PLACEHOLDER_PATTERN: &str = r"\{\{(\w+)\}\}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("占位符正则必须合法"))
}

/// 提取模板中出现的所有不重复占位符名称
///
/// 没有占位符时返回空集合，不会出错。
pub fn extract_placeholders(template: &str) -> BTreeSet<String> {
    placeholder_regex()
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}
