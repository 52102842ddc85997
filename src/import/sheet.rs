//! Single-sheet spreadsheet import

use std::path::Path;

use tracing::{debug, trace};

use super::{parse_clone, RowParser, SimpleParser, TableImporter};
use crate::config::ImportConfig;
use crate::document::{self, Cell, CellData, Row, SharedStringTable, Workbook};
use crate::error::{CodecError, CodecResult};
use crate::model::{ParsedTable, Record};

/// Reads the rows of a workbook's only worksheet into records
#[derive(Debug, Clone, Default)]
pub struct SheetImporter<P = SimpleParser> {
    parser: P,
    config: ImportConfig,
}

impl<P: RowParser> SheetImporter<P> {
    pub fn new(parser: P, config: ImportConfig) -> Self {
        Self { parser, config }
    }

    /// Import the rows of an in-memory workbook.
    ///
    /// Fails before reading any row unless the workbook has exactly one
    /// worksheet.
    pub fn import_workbook<R: Record>(
        &self,
        workbook: &Workbook,
        prototype: &R,
    ) -> CodecResult<ParsedTable<R>> {
        let sheet = match workbook.worksheets.as_slice() {
            [sheet] => sheet,
            [] => return Err(CodecError::NoWorksheet),
            sheets => return Err(CodecError::MultipleWorksheets(sheets.len())),
        };

        let skip = usize::from(self.config.has_headers);
        let mut parsed = 0usize;
        let mut records = Vec::with_capacity(sheet.rows.len().saturating_sub(skip));
        for row in sheet.rows.iter().skip(skip) {
            self.config.cancellation.check()?;
            let texts = row_texts(row, &workbook.shared_strings);
            let cells: Vec<&str> = texts.iter().map(String::as_str).collect();
            trace!(row = row.index, cells = cells.len(), "Parsing row");
            records.push(parse_clone(&self.parser, prototype, &cells, &mut parsed));
        }

        debug!(
            sheet = %sheet.name,
            rows = records.len(),
            parsed,
            "Imported worksheet"
        );
        Ok(ParsedTable::new(records, parsed))
    }
}

impl<P: RowParser> TableImporter for SheetImporter<P> {
    fn import_path<R: Record>(&self, path: &Path, prototype: &R) -> CodecResult<ParsedTable<R>> {
        let workbook = document::xlsx::load_single(path)?;
        self.import_workbook(&workbook, prototype)
    }
}

/// Cell texts of a row in column order; columns without a cell are empty
fn row_texts(row: &Row, shared_strings: &SharedStringTable) -> Vec<String> {
    let mut texts: Vec<String> = Vec::with_capacity(row.cells.len());
    for cell in &row.cells {
        let text = cell_text(cell, shared_strings);
        match cell.column_index() {
            Some(index) if index >= texts.len() => {
                texts.resize(index, String::new());
                texts.push(text);
            }
            Some(index) => texts[index] = text,
            None => texts.push(text),
        }
    }
    texts
}

/// Text of a cell, resolving shared-string references
fn cell_text(cell: &Cell, shared_strings: &SharedStringTable) -> String {
    match &cell.data {
        CellData::SharedString(index) => index
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared_strings.get(i))
            .unwrap_or_default()
            .to_string(),
        _ => cell.inner_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Worksheet;
    use crate::model::RawRecord;

    fn row(index: u32, cells: Vec<(&str, CellData)>) -> Row {
        Row {
            index,
            cells: cells
                .into_iter()
                .map(|(reference, data)| Cell::new(reference, data))
                .collect(),
        }
    }

    fn workbook(rows: Vec<Row>) -> Workbook {
        let mut sheet = Worksheet::new("Data");
        sheet.rows = rows;
        Workbook {
            worksheets: vec![sheet],
            shared_strings: ["John", "Alex"].into_iter().collect(),
            ..Default::default()
        }
    }

    fn importer() -> SheetImporter {
        SheetImporter::new(SimpleParser, ImportConfig::default())
    }

    #[test]
    fn test_header_skipped_and_shared_strings_resolved() {
        let workbook = workbook(vec![
            row(1, vec![("A1", CellData::InlineString("Name".into()))]),
            row(
                2,
                vec![
                    ("A2", CellData::SharedString("1".into())),
                    ("B2", CellData::Number("3".into())),
                ],
            ),
        ]);
        let table = importer()
            .import_workbook(&workbook, &RawRecord::with_width(2))
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].cells, vec!["Alex", "3"]);
        assert_eq!(table.parsed_count(), 1);
    }

    #[test]
    fn test_bad_shared_string_index_is_empty() {
        let workbook = workbook(vec![row(
            1,
            vec![
                ("A1", CellData::SharedString("42".into())),
                ("B1", CellData::SharedString("x".into())),
                ("C1", CellData::Boolean(true)),
            ],
        )]);
        let table = SheetImporter::new(SimpleParser, ImportConfig::default().with_headers(false))
            .import_workbook(&workbook, &RawRecord::new())
            .unwrap();
        assert_eq!(table[0].cells, vec!["", "", "1"]);
    }

    #[test]
    fn test_omitted_cells_leave_gaps() {
        let workbook = workbook(vec![row(
            1,
            vec![
                ("A1", CellData::InlineString("a".into())),
                ("C1", CellData::InlineString("c".into())),
            ],
        )]);
        let table = SheetImporter::new(SimpleParser, ImportConfig::default().with_headers(false))
            .import_workbook(&workbook, &RawRecord::with_width(3))
            .unwrap();
        assert_eq!(table[0].cells, vec!["a", "", "c"]);
        assert!(table[0].is_parsed());
    }

    #[test]
    fn test_multiple_worksheets_rejected() {
        let mut workbook = workbook(vec![row(1, vec![("A1", CellData::Boolean(true))])]);
        workbook.worksheets.push(Worksheet::new("Other"));
        let err = importer()
            .import_workbook(&workbook, &RawRecord::new())
            .unwrap_err();
        assert!(matches!(err, CodecError::MultipleWorksheets(2)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_no_worksheet() {
        let err = importer()
            .import_workbook(&Workbook::new(), &RawRecord::new())
            .unwrap_err();
        assert!(matches!(err, CodecError::NoWorksheet));
    }
}
