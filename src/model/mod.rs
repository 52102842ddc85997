//! Data model for typed tables and records

mod culture;
pub mod date;
mod record;
mod schema;
mod table;
mod value;

pub use culture::Culture;
pub use record::{ParsedTable, RawRecord, Record};
pub use schema::{Accessor, Column, ColumnBuilder, ColumnFormat, FieldMeta, Selector};
pub use table::{IntoTable, Table};
pub use value::{CellType, Value};

pub(crate) use value::parse_bool;
