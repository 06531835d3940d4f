//! CSV parsing with per-cell type inference.

mod infer;
mod reader;

pub use infer::infer_cell;
pub use reader::parse_csv;
