//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批处理调度和汇总，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量标签处理器
//! - 加载模板和数据（含条码合并、分组筛选、行数限制）
//! - 比对模板字段与数据列
//! - DRY RUN：只预览第 1 行
//! - 正式运行：逐行填充、命名、写入，可选打包 ZIP
//!
//! ### `report` - 运行汇总
//! - 比对结果、写出的文件、改名和兜底记录
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Record>)
//!     ↓
//! workflow::LabelFlow (处理单行)
//!     ↓
//! services (能力层：filler / naming / label_writer ...)
//! ```

pub mod batch_processor;
pub mod report;

// 重新导出主要类型
pub use batch_processor::App;
pub use report::{LabelSample, RunOutcome, RunReport};
