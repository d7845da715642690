//! 标签写入服务 - 业务能力层
//!
//! 只负责"把一份已填好的标签写进输出目录"，不关心模板和数据

use crate::error::{AppResult, OutputError};
use crate::services::naming::{fit_name, split_extension};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// 一次写入的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenLabel {
    /// 行号（从 1 开始）
    pub row_index: usize,
    /// 实际写入的文件名
    pub file_name: String,
    /// 因重名被改名时，原本生成的文件名
    pub renamed_from: Option<String>,
}

/// 标签写入服务
///
/// 职责：
/// - 创建输出目录
/// - 记录本次运行已用过的文件名（不区分大小写）
/// - 重名时在扩展名前追加行号，保证不覆盖本次运行的其他标签
pub struct LabelWriter {
    out_dir: PathBuf,
    used_names: HashSet<String>,
}

impl LabelWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            used_names: HashSet::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// 递归创建输出目录
    pub async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|source| OutputError::CreateDirFailed {
                path: self.out_dir.display().to_string(),
                source,
            })?;
        Ok(())
    }

    /// 写入一份标签
    ///
    /// # 参数
    /// - `row_index`: 行号
    /// - `file_name`: 生成的文件名（已清洗）
    /// - `content`: 填充后的标签内容
    pub async fn write(
        &mut self,
        row_index: usize,
        file_name: &str,
        content: &str,
    ) -> AppResult<WrittenLabel> {
        let final_name = self.reserve(file_name, row_index);
        let renamed_from = (final_name != file_name).then(|| file_name.to_string());

        if let Some(original) = &renamed_from {
            warn!(
                "[行 {}] ⚠️ 文件名 {} 已被占用，改为 {}",
                row_index, original, final_name
            );
        }

        let path = self.out_dir.join(&final_name);
        debug!("[行 {}] 写入 {} ({} 字节)", row_index, path.display(), content.len());

        fs::write(&path, content)
            .await
            .map_err(|source| OutputError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        Ok(WrittenLabel {
            row_index,
            file_name: final_name,
            renamed_from,
        })
    }

    /// 登记文件名，必要时生成不冲突的新名字
    fn reserve(&mut self, file_name: &str, row_index: usize) -> String {
        if self.used_names.insert(file_name.to_lowercase()) {
            return file_name.to_string();
        }

        let (stem, ext) = split_extension(file_name);
        let mut attempt = 1;
        loop {
            let suffix = if attempt == 1 {
                format!("_{}{}", row_index, ext)
            } else {
                format!("_{}_{}{}", row_index, attempt, ext)
            };
            let candidate = fit_name(stem, &suffix);

            if self.used_names.insert(candidate.to_lowercase()) {
                return candidate;
            }
            attempt += 1;
        }
    }
}
