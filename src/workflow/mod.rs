pub mod label_flow;

pub use label_flow::{LabelFlow, RenderedLabel};
