//! 日志初始化
//!
//! 所有日志写到 stderr；stdout 只留给 `--json` 的 JSON 汇总。

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时的默认级别
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// 初始化全局日志
///
/// # 参数
/// - `verbose`: 默认级别改为 debug（`RUST_LOG` 优先）
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
