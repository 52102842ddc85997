//! Runtime cell values and declared cell types

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::culture::Culture;

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Bool,
    Int,
    Float,
    Char,
    String,
    /// Text written as a formula instead of a literal
    Formula,
    Date,
    DateTime,
    /// Raw bytes; no spreadsheet representation
    Binary,
}

impl CellType {
    /// Map a Rust type name (as produced by `std::any::type_name`) to a cell type.
    ///
    /// `Option<..>` and reference wrappers are looked through, so an accessor
    /// returning `Option<i32>` declares an `Int` column.
    pub fn from_type_name(name: &str) -> Option<CellType> {
        let mut name = name.trim();
        loop {
            if let Some(rest) = name.strip_prefix('&') {
                name = rest.trim_start_matches("mut ").trim();
                continue;
            }
            match name.split_once('<') {
                Some((outer, inner)) if outer.ends_with("Option") => {
                    name = inner.strip_suffix('>').unwrap_or(inner).trim();
                }
                _ => break,
            }
        }

        let short = name.rsplit("::").next().unwrap_or(name);
        match short {
            "bool" => Some(CellType::Bool),
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => Some(CellType::Int),
            "f32" | "f64" => Some(CellType::Float),
            "char" => Some(CellType::Char),
            "str" | "String" => Some(CellType::String),
            "NaiveDate" => Some(CellType::Date),
            "NaiveDateTime" => Some(CellType::DateTime),
            "[u8]" => Some(CellType::Binary),
            _ if short.starts_with("Vec<u8") => Some(CellType::Binary),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::Char => write!(f, "char"),
            CellType::String => write!(f, "string"),
            CellType::Formula => write!(f, "formula"),
            CellType::Date => write!(f, "date"),
            CellType::DateTime => write!(f, "datetime"),
            CellType::Binary => write!(f, "binary"),
        }
    }
}

/// A value extracted from a record
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Binary(Vec<u8>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            // Cross-type numeric comparison
            (Value::Int(a), Value::UInt(b)) | (Value::UInt(b), Value::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            _ => false,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The cell type of this value, `None` for `Null`
    pub fn cell_type(&self) -> Option<CellType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(CellType::Bool),
            Value::Int(_) | Value::UInt(_) => Some(CellType::Int),
            Value::Float(_) => Some(CellType::Float),
            Value::Char(_) => Some(CellType::Char),
            Value::Text(_) => Some(CellType::String),
            Value::Date(_) => Some(CellType::Date),
            Value::DateTime(_) => Some(CellType::DateTime),
            Value::Binary(_) => Some(CellType::Binary),
        }
    }

    /// Render the value as text using the given culture
    pub fn format(&self, culture: &Culture) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::UInt(u) => Cow::Owned(u.to_string()),
            Value::Float(f) => Cow::Owned(culture.format_float(*f)),
            Value::Char(c) => Cow::Owned(c.to_string()),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Date(d) => Cow::Owned(d.format(culture.date_pattern).to_string()),
            Value::DateTime(dt) => Cow::Owned(dt.format(culture.datetime_pattern).to_string()),
            Value::Binary(bytes) => Cow::Owned(
                bytes
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect::<String>(),
            ),
        }
    }

    /// Parse text into a value of the given type.
    ///
    /// Empty text becomes `Null`. Returns `None` when the text does not
    /// represent a value of that type.
    pub fn parse_as(text: &str, cell_type: CellType, culture: &Culture) -> Option<Value> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some(Value::Null);
        }

        match cell_type {
            CellType::Bool => parse_bool(trimmed).map(Value::Bool),
            CellType::Int => trimmed.parse::<i64>().ok().map(Value::Int),
            CellType::Float => culture.parse_float(trimmed).map(Value::Float),
            CellType::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            CellType::String | CellType::Formula => Some(Value::Text(text.to_string())),
            CellType::Date => culture
                .parse_datetime(trimmed)
                .map(|dt| Value::Date(dt.date())),
            CellType::DateTime => culture.parse_datetime(trimmed).map(Value::DateTime),
            CellType::Binary => Some(Value::Binary(text.as_bytes().to_vec())),
        }
    }
}

pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s == "1" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no") || s == "0" {
        Some(false)
    } else {
        None
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(&Culture::invariant()))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
