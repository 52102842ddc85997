//! Column metadata, accessors and column resolution

use std::any::type_name;

use serde::{Deserialize, Serialize};

use super::culture::Culture;
use super::value::{CellType, Value};
use crate::error::{CodecError, CodecResult};

/// Function extracting a cell value from a record
pub type Selector<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;

/// Metadata declared alongside a typed field accessor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMeta {
    /// Field name, used as the title when no display name is given
    pub name: String,
    pub display_name: Option<String>,
    pub display_format: Option<String>,
    pub convert_empty_string_to_null: bool,
    pub encode_value: bool,
    pub null_display_text: Option<String>,
    /// Rust type name of the accessor's return type
    pub type_name: &'static str,
}

/// A typed field accessor with its declared metadata
pub struct Accessor<T> {
    meta: FieldMeta,
    get: Selector<T>,
}

impl<T: 'static> Accessor<T> {
    /// Create an accessor; the field's type is captured from the closure's return type
    pub fn new<V, F>(name: impl Into<String>, get: F) -> Self
    where
        V: Into<Value> + 'static,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            meta: FieldMeta {
                name: name.into(),
                type_name: type_name::<V>(),
                ..Default::default()
            },
            get: Box::new(move |record| get(record).into()),
        }
    }
}

impl<T> Accessor<T> {
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.meta.display_name = Some(name.into());
        self
    }

    pub fn display_format(mut self, format: impl Into<String>) -> Self {
        self.meta.display_format = Some(format.into());
        self
    }

    pub fn convert_empty_string_to_null(mut self, convert: bool) -> Self {
        self.meta.convert_empty_string_to_null = convert;
        self
    }

    pub fn encode_value(mut self, encode: bool) -> Self {
        self.meta.encode_value = encode;
        self
    }

    pub fn null_display_text(mut self, text: impl Into<String>) -> Self {
        self.meta.null_display_text = Some(text.into());
        self
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn get(&self, record: &T) -> Value {
        (self.get)(record)
    }
}

impl<T> std::fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor").field("meta", &self.meta).finish()
    }
}

/// Explicit per-column overrides; unset fields fall back to accessor metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFormat {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub data_type: Option<CellType>,
    pub format: Option<String>,
    pub convert_empty_string_to_null: Option<bool>,
    pub encode_value: Option<bool>,
    pub null_display_text: Option<String>,
    pub culture: Option<Culture>,
}

impl ColumnFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_data_type(mut self, data_type: CellType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn set_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn set_convert_empty_string_to_null(mut self, convert: bool) -> Self {
        self.convert_empty_string_to_null = Some(convert);
        self
    }

    pub fn set_encode_value(mut self, encode: bool) -> Self {
        self.encode_value = Some(encode);
        self
    }

    pub fn set_null_display_text(mut self, text: impl Into<String>) -> Self {
        self.null_display_text = Some(text.into());
        self
    }

    pub fn set_culture(mut self, culture: Culture) -> Self {
        self.culture = Some(culture);
        self
    }
}

/// A resolved output column
pub struct Column<T> {
    pub title: String,
    /// Declared type; `None` means the runtime type of each value decides
    pub data_type: Option<CellType>,
    /// Number or date format code
    pub format: Option<String>,
    pub culture: Option<Culture>,
    pub null_display_text: Option<String>,
    pub convert_empty_string_to_null: bool,
    pub encode_value: bool,
    select: Selector<T>,
}

impl<T> Column<T> {
    /// Extract this column's value from a record
    pub fn value(&self, record: &T) -> Value {
        let value = (self.select)(record);
        match value {
            Value::Text(ref s) if self.convert_empty_string_to_null && s.is_empty() => Value::Null,
            other => other,
        }
    }

    /// The column culture, invariant when unset
    pub fn culture(&self) -> Culture {
        self.culture.unwrap_or_default()
    }

    /// Resolve a column from accessor metadata and overrides; a selector,
    /// when given, replaces the accessor as value source
    pub(crate) fn from_accessor(
        accessor: Accessor<T>,
        format: ColumnFormat,
        select: Option<Selector<T>>,
    ) -> Self {
        let Accessor { meta, get } = accessor;
        Column {
            title: format
                .title
                .or(meta.display_name)
                .unwrap_or(meta.name),
            data_type: format
                .data_type
                .or_else(|| CellType::from_type_name(meta.type_name)),
            format: format.format.or(meta.display_format),
            culture: format.culture,
            null_display_text: format.null_display_text.or(meta.null_display_text),
            convert_empty_string_to_null: format
                .convert_empty_string_to_null
                .unwrap_or(meta.convert_empty_string_to_null),
            encode_value: format.encode_value.unwrap_or(meta.encode_value),
            select: select.unwrap_or(get),
        }
    }

    /// Resolve a column from overrides alone; the type defaults to text
    pub(crate) fn from_selector(format: ColumnFormat, select: Selector<T>) -> Self {
        Column {
            title: format.title.unwrap_or_default(),
            data_type: Some(format.data_type.unwrap_or(CellType::String)),
            format: format.format,
            culture: format.culture,
            null_display_text: format.null_display_text,
            convert_empty_string_to_null: format.convert_empty_string_to_null.unwrap_or(false),
            encode_value: format.encode_value.unwrap_or(false),
            select,
        }
    }
}

impl<T> std::fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .field("data_type", &self.data_type)
            .field("format", &self.format)
            .field("culture", &self.culture)
            .finish_non_exhaustive()
    }
}

/// Resolves an accessor, overrides and an optional selector into a [`Column`]
pub struct ColumnBuilder<T> {
    accessor: Option<Accessor<T>>,
    format: ColumnFormat,
    select: Option<Selector<T>>,
}

impl<T> Default for ColumnBuilder<T> {
    fn default() -> Self {
        Self {
            accessor: None,
            format: ColumnFormat::default(),
            select: None,
        }
    }
}

impl<T> ColumnBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessor(mut self, accessor: Accessor<T>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    pub fn format(mut self, format: ColumnFormat) -> Self {
        self.format = format;
        self
    }

    /// Value source that takes precedence over the accessor
    pub fn select<F>(mut self, select: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.select = Some(Box::new(select));
        self
    }

    /// Resolve the column; `position` is only used for error reporting
    pub fn build(self, position: usize) -> CodecResult<Column<T>> {
        let ColumnBuilder {
            accessor,
            format,
            select,
        } = self;

        match (accessor, select) {
            (Some(accessor), select) => Ok(Column::from_accessor(accessor, format, select)),
            (None, Some(select)) => Ok(Column::from_selector(format, select)),
            (None, None) => Err(CodecError::UnresolvedColumn(position)),
        }
    }
}
