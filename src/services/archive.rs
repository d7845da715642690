//! ZIP 打包服务 - 业务能力层
//!
//! 把本次运行写出的标签文件打成一个压缩包

use crate::error::{AppResult, OutputError};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 写入任何标签之前检查压缩包路径是否可用
///
/// - 目标不能是已存在的目录
/// - 最近一级已存在的上级路径必须是可写目录
pub fn check_zip_target(zip_path: &Path) -> AppResult<()> {
    let archive_err = |message: &str| OutputError::ArchiveFailed {
        path: zip_path.display().to_string(),
        message: message.to_string(),
    };

    if zip_path.is_dir() {
        return Err(archive_err("目标是一个已存在的目录").into());
    }

    let existing_parent = zip_path
        .ancestors()
        .skip(1)
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .find(|p| p.exists());

    if let Some(parent) = existing_parent {
        let metadata = std::fs::metadata(parent).map_err(|e| archive_err(&e.to_string()))?;
        if !metadata.is_dir() {
            return Err(archive_err(&format!("上级路径不是目录: {}", parent.display())).into());
        }
        if metadata.permissions().readonly() {
            return Err(archive_err(&format!("上级目录不可写: {}", parent.display())).into());
        }
    }

    Ok(())
}

/// 打包输出目录中的指定文件
///
/// # 参数
/// - `zip_path`: 压缩包路径（已存在则覆盖）
/// - `out_dir`: 标签所在目录
/// - `file_names`: 要打包的文件名，按顺序写入
pub fn create_zip_archive(zip_path: &Path, out_dir: &Path, file_names: &[String]) -> AppResult<()> {
    let archive_err = |message: String| OutputError::ArchiveFailed {
        path: zip_path.display().to_string(),
        message,
    };

    if let Some(parent) = zip_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| archive_err(e.to_string()))?;
    }

    let file = File::create(zip_path).map_err(|e| archive_err(e.to_string()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in file_names {
        let content =
            std::fs::read(out_dir.join(name)).map_err(|e| archive_err(format!("{}: {}", name, e)))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| archive_err(e.to_string()))?;
        zip.write_all(&content)
            .map_err(|e| archive_err(e.to_string()))?;
    }

    zip.finish().map_err(|e| archive_err(e.to_string()))?;

    info!("📦 已打包 {} 个文件: {}", file_names.len(), zip_path.display());
    Ok(())
}
