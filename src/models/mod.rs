pub mod label_ctx;
pub mod loaders;
pub mod record;

pub use label_ctx::LabelCtx;
pub use loaders::{load_table, load_template, TableOptions};
pub use record::{DataSource, Record};
