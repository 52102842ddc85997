//! Table to spreadsheet document

use std::path::Path;

use tracing::{debug, trace};

use super::encoder::CellEncoder;
use super::styles::{StyleBuilder, StyleIndex, HEADER_STYLE};
use crate::config::CancellationToken;
use crate::document::{
    self, cell_reference, sheet_name, Cell, CellData, ColumnWidth, Row, Workbook, Worksheet,
};
use crate::error::CodecResult;
use crate::model::Table;

/// Width of every column, in character units
pub const COLUMN_WIDTH: f64 = 20.0;

/// Renders a [`Table`] and its appended tables into a single worksheet
pub struct TableWriter<'a, T> {
    table: &'a Table<T>,
    cancellation: CancellationToken,
}

impl<'a, T> TableWriter<'a, T> {
    pub fn new(table: &'a Table<T>) -> Self {
        Self {
            table,
            cancellation: CancellationToken::default(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Build the document; `None` when the table has no columns
    pub fn build(&self) -> CodecResult<Option<Workbook>> {
        let table = self.table;
        if table.columns.is_empty() {
            debug!(table = %table.title, "Table has no columns, nothing to export");
            return Ok(None);
        }

        let (stylesheet, styles) = StyleBuilder::new(&table.columns).build();

        let mut sheet = Worksheet::new(sheet_name(&table.title));
        sheet.columns.push(ColumnWidth {
            min: 1,
            max: table.columns.len() as u32,
            width: COLUMN_WIDTH,
            custom_width: true,
        });

        let mut row_index = 0u32;
        if table.show_header {
            row_index += 1;
            sheet.rows.push(self.header_row(row_index));
        }
        self.append_rows(table, &styles, &mut sheet, &mut row_index)?;

        debug!(
            table = %table.title,
            rows = sheet.rows.len(),
            columns = table.columns.len(),
            "Built worksheet"
        );

        Ok(Some(Workbook {
            worksheets: vec![sheet],
            stylesheet,
            shared_strings: Default::default(),
        }))
    }

    /// Write the table to an `.xlsx` file; returns `false` (and writes
    /// nothing) when the table has no columns
    pub fn save(&self, path: &Path) -> CodecResult<bool> {
        match self.build()? {
            Some(workbook) => {
                document::xlsx::save(&workbook, path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Serialize the table to `.xlsx` bytes; `None` when it has no columns
    pub fn to_buffer(&self) -> CodecResult<Option<Vec<u8>>> {
        self.build()?
            .map(|workbook| document::xlsx::to_buffer(&workbook))
            .transpose()
    }

    fn header_row(&self, index: u32) -> Row {
        let mut row = Row::new(index);
        row.cells = self
            .table
            .columns
            .iter()
            .enumerate()
            .map(|(position, column)| {
                Cell::new(
                    cell_reference(position, index),
                    CellData::InlineString(column.title.clone()),
                )
                .with_style(HEADER_STYLE)
            })
            .collect();
        row
    }

    /// Emit the records of `source` and of its appended tables, in order,
    /// using the writer's own columns
    fn append_rows(
        &self,
        source: &Table<T>,
        styles: &StyleIndex,
        sheet: &mut Worksheet,
        row_index: &mut u32,
    ) -> CodecResult<()> {
        let encoder = CellEncoder::new(styles);

        for record in &source.data {
            self.cancellation.check()?;
            *row_index += 1;

            let mut row = Row::new(*row_index);
            for (position, column) in self.table.columns.iter().enumerate() {
                if let Some(cell) = encoder.encode(position, column, record, *row_index)? {
                    row.cells.push(cell);
                }
            }
            trace!(row = *row_index, cells = row.cells.len(), "Encoded row");
            sheet.rows.push(row);
        }

        for appended in &source.additional_tables {
            self.append_rows(appended, styles, sheet, row_index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::export::styles::DATE_STYLE;
    use crate::model::{Accessor, ColumnFormat, IntoTable};
    use chrono::NaiveDate;

    #[derive(Clone)]
    struct Example {
        count: i32,
        name: String,
        note: Option<String>,
    }

    fn example(count: i32, name: &str, note: Option<&str>) -> Example {
        Example {
            count,
            name: name.to_string(),
            note: note.map(str::to_string),
        }
    }

    fn table(rows: Vec<Example>) -> Table<Example> {
        rows.into_table(true, Some("Example data"))
            .add_column(
                Accessor::new("name", |e: &Example| e.name.clone()),
                Some(ColumnFormat::new().set_title("Human name")),
            )
            .add_column(Accessor::new("count", |e: &Example| e.count), None)
            .add_column(Accessor::new("note", |e: &Example| e.note.clone()), None)
    }

    #[test]
    fn test_empty_columns_is_noop() {
        let table = vec![example(1, "John", None)].into_table(true, None);
        assert!(TableWriter::new(&table).build().unwrap().is_none());
        assert!(TableWriter::new(&table).to_buffer().unwrap().is_none());
    }

    #[test]
    fn test_header_and_rows() {
        let table = table(vec![example(1, "John", Some("x")), example(10, "Alex", None)]);
        let workbook = TableWriter::new(&table).build().unwrap().unwrap();
        let sheet = &workbook.worksheets[0];

        assert_eq!(sheet.name, "Example data");
        assert_eq!(
            sheet.columns,
            vec![ColumnWidth {
                min: 1,
                max: 3,
                width: COLUMN_WIDTH,
                custom_width: true
            }]
        );
        assert_eq!(sheet.rows.len(), 3);

        let header = &sheet.rows[0];
        assert_eq!(header.index, 1);
        assert_eq!(header.cells[0].data, CellData::InlineString("Human name".into()));
        assert!(header.cells.iter().all(|c| c.style == Some(HEADER_STYLE)));

        let first = &sheet.rows[1];
        assert_eq!(first.cells.len(), 3);
        assert_eq!(first.cells[1].reference, "B2");
        assert_eq!(first.cells[1].data, CellData::Number("1".into()));

        // The missing note produces no cell at all
        let second = &sheet.rows[2];
        assert_eq!(second.cells.len(), 2);
        assert!(sheet.cell("C3").is_none());
    }

    #[test]
    fn test_appended_rows_continue_numbering() {
        let primary = table(vec![
            example(1, "a", None),
            example(2, "b", None),
            example(3, "c", None),
        ]);
        let appended = vec![example(4, "d", None), example(5, "e", None)].into_table(true, None);
        let table = primary.concat(appended);

        let workbook = TableWriter::new(&table).build().unwrap().unwrap();
        let rows = &workbook.worksheets[0].rows;
        let indices: Vec<u32> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            workbook.worksheets[0].cell("A6").map(|c| c.data.clone()),
            Some(CellData::InlineString("e".into()))
        );
    }

    #[test]
    fn test_no_header() {
        let table = table(vec![example(1, "John", None)]).with_header(false);
        let workbook = TableWriter::new(&table).build().unwrap().unwrap();
        let rows = &workbook.worksheets[0].rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 1);
    }

    #[test]
    fn test_date_column_with_and_without_format() {
        #[derive(Clone)]
        struct Event {
            at: NaiveDate,
        }
        let at = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let table = vec![Event { at }]
            .into_table(false, None)
            .add_column(Accessor::new("plain", |e: &Event| e.at), None)
            .add_column(
                Accessor::new("formatted", |e: &Event| e.at),
                Some(ColumnFormat::new().set_format("dd.MM.yyyy")),
            );

        let workbook = TableWriter::new(&table).build().unwrap().unwrap();
        let sheet = &workbook.worksheets[0];
        assert_eq!(sheet.cell("A1").unwrap().style, Some(DATE_STYLE));
        assert_eq!(sheet.cell("B1").unwrap().style, Some(3));
        assert_eq!(sheet.cell("B1").unwrap().data, CellData::Number("45293".into()));
    }

    #[test]
    fn test_long_title_still_saves() {
        let table = table(vec![example(1, "John", None)])
            .with_title("Quarterly sales report for 2024 Q1");
        let workbook = TableWriter::new(&table).build().unwrap().unwrap();
        assert_eq!(workbook.worksheets[0].name, "Quarterly sales report for 2024");

        let blank = table.with_title("");
        let bytes = TableWriter::new(&blank).to_buffer().unwrap().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_cancellation_aborts() {
        let token = CancellationToken::new();
        token.cancel();
        let table = table(vec![example(1, "John", None)]);
        let err = TableWriter::new(&table)
            .with_cancellation(token)
            .build()
            .unwrap_err();
        assert!(matches!(err, CodecError::Cancelled));
    }
}
