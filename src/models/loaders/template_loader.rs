use crate::error::{AppError, AppResult, FileError};
use std::path::Path;
use tokio::fs;

/// 读取模板文件，按 UTF-8 文本返回
///
/// 模板内容除占位符外不做任何解析，原样返回。
pub async fn load_template(template_path: &Path) -> AppResult<String> {
    let bytes = fs::read(template_path)
        .await
        .map_err(|e| AppError::file_read_failed(template_path.display().to_string(), e))?;

    let text = String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8 {
        path: template_path.display().to_string(),
    })?;

    tracing::debug!(
        "模板已加载: {} ({} 字符)",
        template_path.display(),
        text.chars().count()
    );

    Ok(text)
}
