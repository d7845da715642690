pub mod table_loader;
pub mod template_loader;

pub use table_loader::{load_table, TableFormat, TableOptions};
pub use template_loader::load_template;
