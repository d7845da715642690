//! 条码表合并 - 业务能力层
//!
//! 把一张"编码 -> 条码"的对照表按关联列左连接到产品数据上

use crate::error::{AppError, AppResult};
use crate::models::DataSource;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// 合并统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub total: usize,
    /// 合并后条码非空的行数
    pub matched: usize,
    pub unmatched: usize,
}

/// 左连接条码表
///
/// # 参数
/// - `products`: 产品数据，保留全部行和原有顺序
/// - `barcodes`: 条码对照表，同一关联值出现多次时取第一行
/// - `join_key`: 关联列（两张表都必须有）
/// - `barcode_column`: 条码列（对照表必须有）
///
/// 匹配到的行使用对照表中的条码，未匹配的行保留自己原有的值（没有则为空）。
pub fn merge_barcodes(
    products: &DataSource,
    barcodes: &DataSource,
    join_key: &str,
    barcode_column: &str,
) -> AppResult<(DataSource, MergeStats)> {
    if !products.has_column(join_key) {
        return Err(AppError::missing_column("产品数据", join_key));
    }
    if !barcodes.has_column(join_key) {
        return Err(AppError::missing_column("条码表", join_key));
    }
    if !barcodes.has_column(barcode_column) {
        return Err(AppError::missing_column("条码表", barcode_column));
    }

    let mut mapping: HashMap<&str, &str> = HashMap::new();
    for record in &barcodes.records {
        mapping
            .entry(record.value(join_key))
            .or_insert_with(|| record.value(barcode_column));
    }

    let mut headers = products.headers.clone();
    if !headers.iter().any(|h| h == barcode_column) {
        headers.push(barcode_column.to_string());
    }

    let mut stats = MergeStats {
        total: products.len(),
        ..Default::default()
    };

    let records = products
        .records
        .iter()
        .map(|record| {
            let mut merged = record.clone();
            let barcode = match mapping.get(record.value(join_key)) {
                Some(found) => found.to_string(),
                None => record.value(barcode_column).to_string(),
            };
            if barcode.is_empty() {
                stats.unmatched += 1;
            } else {
                stats.matched += 1;
            }
            merged.insert(barcode_column, barcode);
            merged
        })
        .collect();

    info!(
        "✓ 条码合并完成: 共 {} 行, 匹配 {} 行, 未匹配 {} 行",
        stats.total, stats.matched, stats.unmatched
    );

    Ok((DataSource::new(headers, records), stats))
}
