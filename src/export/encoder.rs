//! Type-directed encoding of record values into cells

use chrono::NaiveDateTime;

use super::styles::{StyleIndex, DATE_STYLE};
use crate::document::{cell_reference, Cell, CellData};
use crate::error::{CodecError, CodecResult};
use crate::model::{date, CellType, Column, Culture, Value};

/// Cell representation chosen for a cell type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCategory {
    Boolean,
    Number,
    Formula,
    InlineString,
    Date,
}

impl CellCategory {
    /// `None` for types without a cell representation
    pub fn of(cell_type: CellType) -> Option<CellCategory> {
        match cell_type {
            CellType::Bool => Some(CellCategory::Boolean),
            CellType::Int | CellType::Float => Some(CellCategory::Number),
            CellType::Formula => Some(CellCategory::Formula),
            CellType::Char | CellType::String => Some(CellCategory::InlineString),
            CellType::Date | CellType::DateTime => Some(CellCategory::Date),
            CellType::Binary => None,
        }
    }
}

/// Encodes one column value of one record into a cell
pub struct CellEncoder<'a> {
    styles: &'a StyleIndex,
}

impl<'a> CellEncoder<'a> {
    pub fn new(styles: &'a StyleIndex) -> Self {
        Self { styles }
    }

    /// Encode the value of the column at `position` for `record` on `row`.
    ///
    /// Returns `Ok(None)` when the value is absent: no cell is written.
    pub fn encode<T>(
        &self,
        position: usize,
        column: &Column<T>,
        record: &T,
        row: u32,
    ) -> CodecResult<Option<Cell>> {
        let value = column.value(record);
        let Some(runtime_type) = value.cell_type() else {
            return Ok(None);
        };
        let effective_type = column.data_type.unwrap_or(runtime_type);
        let category =
            CellCategory::of(effective_type).ok_or_else(|| CodecError::UnrecognizedCellType {
                column: column.title.clone(),
                type_name: effective_type.to_string(),
            })?;

        let culture = column.culture();
        let reference = cell_reference(position, row);
        let mut cell = match category {
            CellCategory::Boolean => {
                Cell::new(reference, CellData::Boolean(to_bool(column, &value)?))
            }
            CellCategory::Number => Cell::new(
                reference,
                CellData::Number(to_number(column, &value, &culture)?),
            ),
            CellCategory::Formula => Cell::new(
                reference,
                CellData::Formula(value.format(&culture).into_owned()),
            ),
            CellCategory::InlineString => Cell::new(
                reference,
                CellData::InlineString(value.format(&culture).into_owned()),
            ),
            CellCategory::Date => {
                let serial = date::to_serial(to_datetime(column, &value, &culture)?);
                Cell::new(reference, CellData::Number(serial.to_string())).with_style(DATE_STYLE)
            }
        };

        if let Some(style) = self.styles.get(position) {
            cell.style = Some(style);
        }
        Ok(Some(cell))
    }
}

fn conversion_error<T>(column: &Column<T>, value: &Value, target: &'static str) -> CodecError {
    CodecError::Conversion {
        column: column.title.clone(),
        value: value.to_string(),
        target,
    }
}

fn to_bool<T>(column: &Column<T>, value: &Value) -> CodecResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::UInt(u) => Ok(*u != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Text(s) => {
            crate::model::parse_bool(s.trim()).ok_or_else(|| conversion_error(column, value, "boolean"))
        }
        _ => Err(conversion_error(column, value, "boolean")),
    }
}

/// Numeric cell text, always in invariant notation
fn to_number<T>(column: &Column<T>, value: &Value, culture: &Culture) -> CodecResult<String> {
    let number = match value {
        Value::Int(i) => return Ok(i.to_string()),
        Value::UInt(u) => return Ok(u.to_string()),
        Value::Bool(b) => return Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Float(f) => Some(*f),
        Value::Text(s) => culture.parse_float(s),
        Value::Date(d) => d.and_hms_opt(0, 0, 0).map(date::to_serial),
        Value::DateTime(dt) => Some(date::to_serial(*dt)),
        Value::Char(_) | Value::Binary(_) | Value::Null => None,
    };
    match number {
        Some(f) if f.is_finite() => Ok(f.to_string()),
        _ => Err(conversion_error(column, value, "number")),
    }
}

fn to_datetime<T>(column: &Column<T>, value: &Value, culture: &Culture) -> CodecResult<NaiveDateTime> {
    let dt = match value {
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::DateTime(dt) => Some(*dt),
        Value::Text(s) => culture.parse_datetime(s),
        Value::Float(f) => date::from_serial(*f),
        _ => None,
    };
    dt.ok_or_else(|| conversion_error(column, value, "date"))
}
