//! Exportable table definition

use tracing::warn;

use super::schema::{Accessor, Column, ColumnBuilder, ColumnFormat};
use super::value::Value;
use crate::error::CodecResult;

/// A titled sequence of records with the columns used to render them
pub struct Table<T> {
    /// Worksheet title
    pub title: String,
    /// Emit a header row with the column titles
    pub show_header: bool,
    /// Column definitions, in output order
    pub columns: Vec<Column<T>>,
    /// Records of this table
    pub data: Vec<T>,
    /// Tables rendered beneath this one with this table's columns
    pub additional_tables: Vec<Table<T>>,
}

impl<T> Table<T> {
    /// Create a table over the given records, titled after the record type
    pub fn new(data: Vec<T>) -> Self {
        Self {
            title: short_type_name::<T>().to_string(),
            show_header: true,
            columns: Vec::new(),
            data,
            additional_tables: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_header(mut self, show_header: bool) -> Self {
        self.show_header = show_header;
        self
    }

    /// Add a column resolved from an accessor and optional overrides
    pub fn add_column(mut self, accessor: Accessor<T>, format: Option<ColumnFormat>) -> Self {
        let column = Column::from_accessor(accessor, format.unwrap_or_default(), None);
        self.columns.push(column);
        self
    }

    /// Add a column whose values come from a selector function
    pub fn add_selected_column<F>(mut self, format: ColumnFormat, select: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.columns.push(Column::from_selector(format, Box::new(select)));
        self
    }

    /// Add a column from a builder; fails when the builder has no value source
    pub fn add(mut self, builder: ColumnBuilder<T>) -> CodecResult<Self> {
        let column = builder.build(self.columns.len())?;
        self.columns.push(column);
        Ok(self)
    }

    /// Append a table to be rendered beneath this one.
    ///
    /// The appended table's records are rendered with this table's columns.
    pub fn concat(mut self, other: Table<T>) -> Self {
        if !other.columns.is_empty() && other.columns.len() != self.columns.len() {
            warn!(
                table = %self.title,
                appended = %other.title,
                expected = self.columns.len(),
                found = other.columns.len(),
                "Appended table declares a different column count"
            );
        }
        self.additional_tables.push(other);
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of records in this table and all appended tables
    pub fn row_count(&self) -> usize {
        self.data.len()
            + self
                .additional_tables
                .iter()
                .map(Table::row_count)
                .sum::<usize>()
    }
}

impl<T> std::fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("title", &self.title)
            .field("show_header", &self.show_header)
            .field("columns", &self.columns)
            .field("rows", &self.data.len())
            .field("additional_tables", &self.additional_tables)
            .finish()
    }
}

/// Turn any sequence of records into a [`Table`]
pub trait IntoTable<T> {
    /// Build a table; the title defaults to the record type's name
    fn into_table(self, show_header: bool, title: Option<&str>) -> Table<T>;
}

impl<T, I> IntoTable<T> for I
where
    I: IntoIterator<Item = T>,
{
    fn into_table(self, show_header: bool, title: Option<&str>) -> Table<T> {
        let table = Table::new(self.into_iter().collect()).with_header(show_header);
        match title {
            Some(title) => table.with_title(title),
            None => table,
        }
    }
}

/// Last path segment of a type name, without generic arguments
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellType;

    #[derive(Clone)]
    struct Example {
        count: i32,
        name: String,
    }

    fn rows() -> Vec<Example> {
        vec![
            Example {
                count: 1,
                name: "John".to_string(),
            },
            Example {
                count: 10,
                name: "Alex".to_string(),
            },
        ]
    }

    #[test]
    fn test_default_title_is_type_name() {
        let table = rows().into_table(true, None);
        assert_eq!(table.title, "Example");
        assert!(table.show_header);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_columns_accumulate_in_order() {
        let table = rows()
            .into_table(false, Some("Example data"))
            .add_column(
                Accessor::new("name", |e: &Example| e.name.clone()),
                Some(ColumnFormat::new().set_title("Human name")),
            )
            .add_column(Accessor::new("count", |e: &Example| e.count), None)
            .add_selected_column(ColumnFormat::new().set_title("Human name"), |e: &Example| {
                Value::from(e.name.to_uppercase())
            });

        let titles: Vec<_> = table.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Human name", "count", "Human name"]);
        assert_eq!(table.columns[1].data_type, Some(CellType::Int));
        assert_eq!(table.title, "Example data");
    }

    #[test]
    fn test_add_rejects_unresolved_column() {
        let result = rows()
            .into_table(true, None)
            .add(ColumnBuilder::new().format(ColumnFormat::new().set_title("x")));
        assert!(result.is_err());
    }

    #[test]
    fn test_concat_counts_rows() {
        let table = rows()
            .into_table(true, None)
            .add_column(Accessor::new("count", |e: &Example| e.count), None)
            .concat(rows().into_table(false, None));
        assert_eq!(table.additional_tables.len(), 1);
        assert_eq!(table.row_count(), 4);
    }
}
