//! Export pipeline: typed tables to spreadsheet documents and delimited text

mod encoder;
mod styles;
mod text;
mod writer;

pub use crate::document::{cell_reference, column_letter};
pub use encoder::{CellCategory, CellEncoder};
pub use styles::{
    StyleBuilder, StyleIndex, CUSTOM_NUMBER_FORMAT_BASE, DATE_STYLE, DEFAULT_STYLE, HEADER_STYLE,
};
pub use text::TextWriter;
pub use writer::{TableWriter, COLUMN_WIDTH};
