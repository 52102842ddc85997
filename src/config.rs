//! Configuration handling for sheetcodec

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CodecError, CodecResult};
use crate::model::ColumnFormat;

/// Kind of tabular source or destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFormat {
    /// Newline-separated delimited text
    #[default]
    Text,
    /// Single-sheet spreadsheet document
    Spreadsheet,
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "csv" | "tsv" | "txt" => Ok(SourceFormat::Text),
            "spreadsheet" | "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(format!("Unknown source format: {}", s)),
        }
    }
}

impl SourceFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

/// Cooperative cancellation flag, checked once per row
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation holding a clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Fail with [`CodecError::Cancelled`] once cancellation was requested
    pub fn check(&self) -> CodecResult<()> {
        if self.is_cancelled() {
            Err(CodecError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Configuration for import operations
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Skip the first line/row of the source
    pub has_headers: bool,
    /// Field separator for text sources; sniffed when unset
    pub delimiter: Option<char>,
    /// Cancellation flag checked once per row
    pub cancellation: CancellationToken,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: None,
            cancellation: CancellationToken::default(),
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the source starts with a header line
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Use a fixed delimiter instead of sniffing one
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Attach a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// Configuration for delimited text export
#[derive(Debug, Clone)]
pub struct TextExportConfig {
    /// Field separator, must be a single byte
    pub delimiter: char,
    /// Write the column titles as the first line (when the table shows a header)
    pub include_header: bool,
    /// Cancellation flag checked once per row
    pub cancellation: CancellationToken,
}

impl Default for TextExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            include_header: true,
            cancellation: CancellationToken::default(),
        }
    }
}

impl TextExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// Parse a JSON array of column formats, one per column in order
pub fn parse_column_schema(json: &str) -> CodecResult<Vec<ColumnFormat>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a column schema file
pub fn load_column_schema(path: &Path) -> CodecResult<Vec<ColumnFormat>> {
    let json = std::fs::read_to_string(path)?;
    parse_column_schema(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_from_path() {
        assert_eq!(
            SourceFormat::from_path(Path::new("data.CSV")),
            Some(SourceFormat::Text)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("book.xlsx")),
            Some(SourceFormat::Spreadsheet)
        );
        assert_eq!(SourceFormat::from_path(Path::new("notes.md")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_cancellation_shared_between_clones() {
        let token = CancellationToken::new();
        let config = ImportConfig::new().with_cancellation(token.clone());
        assert!(config.cancellation.check().is_ok());
        token.cancel();
        assert!(matches!(
            config.cancellation.check(),
            Err(CodecError::Cancelled)
        ));
    }

    #[test]
    fn test_import_defaults() {
        let config = ImportConfig::default();
        assert!(config.has_headers);
        assert_eq!(config.delimiter, None);
        let config = config.with_headers(false).with_delimiter(',');
        assert!(!config.has_headers);
        assert_eq!(config.delimiter, Some(','));
    }

    #[test]
    fn test_parse_column_schema() {
        let schema = parse_column_schema(
            r#"[
                {"title": "Name"},
                {"title": "Date", "type": "date", "format": "dd.MM.yyyy", "culture": "de-DE"},
                {"type": "float", "null_display_text": "-"}
            ]"#,
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema[1].data_type, Some(crate::model::CellType::Date));
        assert_eq!(schema[1].culture.map(|c| c.name), Some("de-DE"));
        assert_eq!(schema[2].title, None);
        assert_eq!(schema[2].null_display_text.as_deref(), Some("-"));
    }

    #[test]
    fn test_invalid_column_schema() {
        let err = parse_column_schema(r#"[{"type": "decimal"}]"#).unwrap_err();
        assert!(matches!(err, CodecError::Schema(_)));
    }
}
