//! # DYMO Label Gen
//!
//! 根据模板和表格数据批量生成 DYMO 标签文件
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - `Record` / `DataSource`，以及模板和表格的加载
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理一件事
//! - `placeholder` - 提取模板占位符
//! - `schema` - 比对模板字段和数据列
//! - `filler` - 用一行数据填充模板
//! - `naming` - 生成安全的输出文件名
//! - `label_writer` - 写入标签文件，处理重名
//! - `ean_merge` / `archive` - 条码表合并、ZIP 打包
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一行数据"的完整处理流程（填充 → 命名）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 加载、比对、DRY RUN 或逐行写入、汇总
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::Cli;
pub use config::{Config, ConfigLayer};
pub use error::{AppError, AppResult};
pub use models::{DataSource, LabelCtx, Record};
pub use orchestrator::{App, RunOutcome, RunReport};
pub use workflow::{LabelFlow, RenderedLabel};
