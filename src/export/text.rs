//! Table to delimited text
//!
//! Output uses no quoting, mirroring the text importer: a field containing
//! the delimiter will split on import unless its column encodes values.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use crate::config::TextExportConfig;
use crate::error::{CodecError, CodecResult};
use crate::model::{date, Column, Table, Value};

/// Writes a [`Table`] and its appended tables as delimited text
pub struct TextWriter<'a, T> {
    table: &'a Table<T>,
    config: TextExportConfig,
}

impl<'a, T> TextWriter<'a, T> {
    pub fn new(table: &'a Table<T>, config: TextExportConfig) -> Self {
        Self { table, config }
    }

    /// Write all rows; nothing is written when the table has no columns
    pub fn write<W: Write>(&self, writer: W) -> CodecResult<()> {
        let table = self.table;
        if table.columns.is_empty() {
            debug!(table = %table.title, "Table has no columns, nothing to export");
            return Ok(());
        }

        let delimiter = self.config.delimiter;
        let delimiter_byte = self.delimiter_byte()?;

        let mut csv_writer = WriterBuilder::new()
            .delimiter(delimiter_byte)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(writer);

        if self.config.include_header && table.show_header {
            csv_writer.write_record(table.columns.iter().map(|c| c.title.as_str()))?;
        }

        let mut rows = 0usize;
        self.write_rows(table, &mut csv_writer, &mut rows)?;
        csv_writer.flush()?;

        debug!(table = %table.title, rows, delimiter = %delimiter, "Wrote delimited text");
        Ok(())
    }

    /// Render the table into a string
    pub fn to_text(&self) -> CodecResult<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write the table to a file; no file is created when it has no columns
    pub fn save(&self, path: &Path) -> CodecResult<bool> {
        if self.table.columns.is_empty() {
            return Ok(false);
        }
        self.delimiter_byte()?;
        let file = File::create(path)?;
        self.write(BufWriter::new(file))?;
        Ok(true)
    }

    /// The delimiter as a single ASCII byte
    fn delimiter_byte(&self) -> CodecResult<u8> {
        let delimiter = self.config.delimiter;
        u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(CodecError::InvalidDelimiter(delimiter))
    }

    fn write_rows<W: Write>(
        &self,
        source: &Table<T>,
        csv_writer: &mut csv::Writer<W>,
        rows: &mut usize,
    ) -> CodecResult<()> {
        for record in &source.data {
            self.config.cancellation.check()?;
            let fields: Vec<String> = self
                .table
                .columns
                .iter()
                .map(|column| self.field_text(column, record))
                .collect();
            csv_writer.write_record(&fields)?;
            *rows += 1;
        }
        for appended in &source.additional_tables {
            self.write_rows(appended, csv_writer, rows)?;
        }
        Ok(())
    }

    fn field_text(&self, column: &Column<T>, record: &T) -> String {
        let value = column.value(record);
        let text = match (&value, column.format.as_deref()) {
            (Value::Null, _) => column.null_display_text.clone().unwrap_or_default(),
            (Value::Date(d), Some(code)) => {
                d.format(&date::excel_pattern_to_chrono(code)).to_string()
            }
            (Value::DateTime(dt), Some(code)) => {
                dt.format(&date::excel_pattern_to_chrono(code)).to_string()
            }
            _ => value.format(&column.culture()).into_owned(),
        };

        if column.encode_value {
            encode(&text, self.config.delimiter)
        } else {
            text
        }
    }
}

/// Backslash-escape the delimiter, backslashes and line breaks
fn encode(text: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' if delimiter == '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}
