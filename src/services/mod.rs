pub mod archive;
pub mod ean_merge;
pub mod filler;
pub mod label_writer;
pub mod naming;
pub mod placeholder;
pub mod schema;

pub use archive::{check_zip_target, create_zip_archive};
pub use ean_merge::{merge_barcodes, MergeStats};
pub use filler::{escape_xml, fill_template};
pub use label_writer::{LabelWriter, WrittenLabel};
pub use naming::{build_filename, sanitize_filename, BuiltName, NamingPattern};
pub use placeholder::extract_placeholders;
pub use schema::{check_unique, reconcile, reconcile_records, SchemaReport, UniquenessReport};
