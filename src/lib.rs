//! sheetcodec - Typed tabular data to spreadsheets and back
//!
//! Exports typed records into single-sheet XLSX documents or delimited
//! text, and imports delimited text or single-sheet workbooks back into
//! records through a user-supplied [`Record`] implementation.

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod model;

pub use config::{CancellationToken, ImportConfig, SourceFormat, TextExportConfig};
pub use error::{CodecError, CodecResult};
pub use export::{TableWriter, TextWriter};
pub use import::{SheetImporter, SimpleParser, TableImporter, TextImporter};
pub use model::{
    Accessor, CellType, Column, ColumnBuilder, ColumnFormat, IntoTable, ParsedTable, RawRecord,
    Record, Table, Value,
};
