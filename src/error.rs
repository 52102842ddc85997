//! Error types for sheetcodec

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Spreadsheet read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column schema error: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Cell value type not recognized: column '{column}' has type {type_name}")]
    UnrecognizedCellType { column: String, type_name: String },

    #[error("Cannot convert value '{value}' in column '{column}' to {target}")]
    Conversion {
        column: String,
        value: String,
        target: &'static str,
    },

    #[error("Column {0} has neither an accessor nor a selector function")]
    UnresolvedColumn(usize),

    #[error("Cannot extract a single table from a workbook with multiple sheets ({0} found)")]
    MultipleWorksheets(usize),

    #[error("Workbook contains no worksheets")]
    NoWorksheet,

    #[error("Could not determine a field separator: the record type or parser does not match the data")]
    UndetectableDelimiter,

    #[error("Invalid delimiter {0:?}: delimited text output needs a single-byte separator")]
    InvalidDelimiter(char),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CodecError {
    /// Whether this error is a configuration error: the operation cannot
    /// succeed with the given columns, source or record type.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CodecError::UnrecognizedCellType { .. }
                | CodecError::Conversion { .. }
                | CodecError::UnresolvedColumn(_)
                | CodecError::MultipleWorksheets(_)
                | CodecError::NoWorksheet
                | CodecError::UndetectableDelimiter
                | CodecError::InvalidDelimiter(_)
        )
    }
}
