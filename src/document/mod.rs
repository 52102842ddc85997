//! In-memory spreadsheet document
//!
//! A minimal workbook structure: worksheets made of sparse rows and cells,
//! a stylesheet and a shared-string table. The `xlsx` submodule persists
//! and loads it.

mod styles;
pub mod xlsx;

use indexmap::IndexSet;

pub use styles::{Border, CellFormat, Fill, Font, HorizontalAlignment, NumberFormat, Stylesheet};

/// Column letters for a zero-based column index: A..Z, AA, AB, ...
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Positional reference of a cell from a zero-based column and 1-based row
pub fn cell_reference(column: usize, row: u32) -> String {
    format!("{}{}", column_letter(column), row)
}

/// Longest worksheet name a workbook accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Turn a table title into a valid worksheet name.
///
/// Forbidden characters (`[]:*?/\`) become `_`, surrounding apostrophes
/// are stripped and the result is cut to 31 characters. Blank and reserved
/// names fall back to `Sheet1`.
pub fn sheet_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let name: String = replaced
        .trim()
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let name = name.trim_end().trim_end_matches('\'');

    if name.trim().is_empty() || name.eq_ignore_ascii_case("history") {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Content of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    /// Boolean stored as 0/1
    Boolean(bool),
    /// Numeric text in invariant notation
    Number(String),
    InlineString(String),
    /// Index into the workbook's shared-string table, as stored
    SharedString(String),
    Formula(String),
}

/// A cell with its positional reference (`A1`, `AB12`)
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub reference: String,
    pub data: CellData,
    /// Index into the stylesheet's cell formats
    pub style: Option<u32>,
}

impl Cell {
    pub fn new(reference: impl Into<String>, data: CellData) -> Self {
        Self {
            reference: reference.into(),
            data,
            style: None,
        }
    }

    pub fn with_style(mut self, style: u32) -> Self {
        self.style = Some(style);
        self
    }

    /// Zero-based column index decoded from the reference letters
    pub fn column_index(&self) -> Option<usize> {
        let letters: String = self
            .reference
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        if letters.is_empty() {
            return None;
        }
        let mut n = 0usize;
        for c in letters.chars() {
            n = n * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
        }
        Some(n - 1)
    }

    /// Text of the cell without shared-string resolution
    pub fn inner_text(&self) -> String {
        match &self.data {
            CellData::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            CellData::Number(s)
            | CellData::InlineString(s)
            | CellData::SharedString(s)
            | CellData::Formula(s) => s.clone(),
        }
    }
}

/// A row with its 1-based index
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: u32,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: Vec::new(),
        }
    }
}

/// Width applied to an inclusive, 1-based range of columns
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidth {
    pub min: u32,
    pub max: u32,
    pub width: f64,
    pub custom_width: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    pub name: String,
    pub columns: Vec<ColumnWidth>,
    pub rows: Vec<Row>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find a cell by its reference
    pub fn cell(&self, reference: &str) -> Option<&Cell> {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .find(|c| c.reference == reference)
    }
}

/// Deduplicated strings referenced by index from cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedStringTable {
    items: IndexSet<String>,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string, returning its index; existing strings are reused
    pub fn push(&mut self, s: impl Into<String>) -> usize {
        self.items.insert_full(s.into()).0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get_index(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SharedStringTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = SharedStringTable::new();
        for s in iter {
            table.push(s);
        }
        table
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub worksheets: Vec<Worksheet>,
    pub stylesheet: Stylesheet,
    pub shared_strings: SharedStringTable,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }
}
