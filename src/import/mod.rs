//! Import pipeline: delimited text and single-sheet spreadsheets to records

mod sheet;
mod sniff;
mod text;

use std::path::Path;

use crate::config::{ImportConfig, SourceFormat};
use crate::error::CodecResult;
use crate::model::{ParsedTable, Record};

pub use self::sheet::SheetImporter;
pub use self::sniff::{sniff_delimiter, CANDIDATE_DELIMITERS};
pub use self::text::TextImporter;

/// Feeds the cell texts of one row into a record
pub trait RowParser {
    fn parse_row<R: Record>(&self, record: &mut R, cells: &[&str]);
}

/// Hands the cells to [`Record::parse`] unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleParser;

impl RowParser for SimpleParser {
    fn parse_row<R: Record>(&self, record: &mut R, cells: &[&str]) {
        record.parse(cells);
    }
}

/// Strips surrounding whitespace from every cell before parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimmingParser;

impl RowParser for TrimmingParser {
    fn parse_row<R: Record>(&self, record: &mut R, cells: &[&str]) {
        let trimmed: Vec<&str> = cells.iter().map(|c| c.trim()).collect();
        record.parse(&trimmed);
    }
}

/// Clone the prototype, parse one row into the clone and count successes
pub(crate) fn parse_clone<R: Record, P: RowParser>(
    parser: &P,
    prototype: &R,
    cells: &[&str],
    parsed: &mut usize,
) -> R {
    let mut record = prototype.clone();
    parser.parse_row(&mut record, cells);
    if record.is_parsed() {
        *parsed += 1;
    }
    record
}

/// A source of records read from a file
pub trait TableImporter {
    fn import_path<R: Record>(&self, path: &Path, prototype: &R) -> CodecResult<ParsedTable<R>>;
}

/// Import a file, choosing the importer from its extension.
///
/// Files with an unknown extension are read as delimited text.
pub fn import_path<R: Record, P: RowParser>(
    path: &Path,
    prototype: &R,
    parser: P,
    config: &ImportConfig,
) -> CodecResult<ParsedTable<R>> {
    match SourceFormat::from_path(path).unwrap_or_default() {
        SourceFormat::Text => TextImporter::new(parser, config.clone()).import_path(path, prototype),
        SourceFormat::Spreadsheet => {
            SheetImporter::new(parser, config.clone()).import_path(path, prototype)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawRecord;

    #[test]
    fn test_simple_parser_keeps_cells() {
        let mut record = RawRecord::new();
        SimpleParser.parse_row(&mut record, &[" a", "b "]);
        assert_eq!(record.cells, vec![" a", "b "]);
        assert!(record.is_parsed());
    }

    #[test]
    fn test_trimming_parser() {
        let mut record = RawRecord::new();
        TrimmingParser.parse_row(&mut record, &[" a", "b "]);
        assert_eq!(record.cells, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_clone_counts_successes() {
        let prototype = RawRecord::with_width(2);
        let mut parsed = 0;
        let ok = parse_clone(&SimpleParser, &prototype, &["a", "b"], &mut parsed);
        let failed = parse_clone(&SimpleParser, &prototype, &["a"], &mut parsed);
        assert!(ok.is_parsed());
        assert!(!failed.is_parsed());
        assert_eq!(parsed, 1);
        assert!(prototype.cells.is_empty());
    }
}
