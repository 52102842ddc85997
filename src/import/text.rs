//! Delimited text import

use std::fs;
use std::path::Path;

use tracing::debug;

use super::{parse_clone, sniff_delimiter, RowParser, SimpleParser, TableImporter};
use crate::config::ImportConfig;
use crate::error::CodecResult;
use crate::model::{ParsedTable, Record};

/// Reads newline-separated delimited text into records.
///
/// Fields are split on the delimiter without any quoting support.
#[derive(Debug, Clone, Default)]
pub struct TextImporter<P = SimpleParser> {
    parser: P,
    config: ImportConfig,
}

impl<P: RowParser> TextImporter<P> {
    pub fn new(parser: P, config: ImportConfig) -> Self {
        Self { parser, config }
    }

    /// Import every line of `source`, skipping the header line if configured.
    ///
    /// Trailing blank lines are not data and are ignored.
    pub fn import_str<R: Record>(&self, source: &str, prototype: &R) -> CodecResult<ParsedTable<R>> {
        let skip = usize::from(self.config.has_headers);
        let mut lines: Vec<&str> = source.lines().skip(skip).collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
            debug!("No data lines to import");
            return Ok(ParsedTable::new(Vec::new(), 0));
        };

        let delimiter = match self.config.delimiter {
            Some(delimiter) => delimiter,
            None => sniff_delimiter(&self.parser, prototype, first, last)?,
        };

        let mut parsed = 0usize;
        let mut records = Vec::with_capacity(lines.len());
        for line in &lines {
            self.config.cancellation.check()?;
            let cells: Vec<&str> = line.split(delimiter).collect();
            records.push(parse_clone(&self.parser, prototype, &cells, &mut parsed));
        }

        debug!(
            rows = records.len(),
            parsed,
            delimiter = ?delimiter,
            "Imported delimited text"
        );
        Ok(ParsedTable::new(records, parsed))
    }
}

impl<P: RowParser> TableImporter for TextImporter<P> {
    fn import_path<R: Record>(&self, path: &Path, prototype: &R) -> CodecResult<ParsedTable<R>> {
        let source = fs::read_to_string(path)?;
        self.import_str(&source, prototype)
    }
}
