//! 模板填充 - 业务能力层
//!
//! 只负责"用一行数据填一份模板"，不关心文件名和写入

use crate::models::Record;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// 转义 XML 保留字符，`&` 最先处理
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 用一行数据填充模板
///
/// 模板中每个 `{{key}}`（key 是该行的列名）替换为转义后的值；
/// 找不到对应列的占位符原样保留。
///
/// 只从左到右扫描一遍模板，替换进去的值不会再被当成占位符展开，
/// 所以列的处理顺序不影响结果。
pub fn fill_template(template: &str, record: &Record) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + OPEN.len()..];

        let substituted = candidate.find(CLOSE).and_then(|end| {
            let key = &candidate[..end];
            record
                .get(key)
                .map(|value| (escape_xml(value), start + OPEN.len() + end + CLOSE.len()))
        });

        match substituted {
            Some((value, consumed)) => {
                out.push_str(&value);
                rest = &rest[consumed..];
            }
            None => {
                // 只前进一个 `{`，这样 `{{{A}}}` 里的 `{{A}}` 仍能被识别
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}
