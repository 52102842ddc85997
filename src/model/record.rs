//! Importable records and parse results

/// A record type that can be rebuilt from a row of cell texts.
///
/// Importers clone a prototype once per row, call [`Record::parse`] exactly
/// once on the clone and keep it whether or not parsing succeeded.
/// `parse` must not panic on malformed cells; it reports failure through
/// [`Record::is_parsed`].
pub trait Record: Clone {
    /// Fill this record from the cells of one row, in column order
    fn parse(&mut self, cells: &[&str]);

    /// Whether the last call to `parse` succeeded
    fn is_parsed(&self) -> bool;
}

/// Records reconstructed by an import, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable<R> {
    records: Vec<R>,
    parsed_count: usize,
}

impl<R> ParsedTable<R> {
    /// `parsed_count` is capped at the number of records
    pub fn new(records: Vec<R>, parsed_count: usize) -> Self {
        let parsed_count = parsed_count.min(records.len());
        Self {
            records,
            parsed_count,
        }
    }

    /// Number of records, parsed or not
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records that reported a successful parse
    pub fn parsed_count(&self) -> usize {
        self.parsed_count
    }

    pub fn failed_count(&self) -> usize {
        self.records.len().saturating_sub(self.parsed_count)
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R: Record> ParsedTable<R> {
    /// Only the records that parsed successfully
    pub fn parsed(&self) -> impl Iterator<Item = &R> {
        self.records.iter().filter(|r| r.is_parsed())
    }
}

impl<R> std::ops::Index<usize> for ParsedTable<R> {
    type Output = R;

    fn index(&self, index: usize) -> &R {
        &self.records[index]
    }
}

impl<'a, R> IntoIterator for &'a ParsedTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A record holding the raw cell texts of a row.
///
/// With an expected width it parses only rows with exactly that many cells;
/// without one it parses any row that was split into more than one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub cells: Vec<String>,
    width: Option<usize>,
    parsed: bool,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A prototype accepting rows of exactly `width` cells
    pub fn with_width(width: usize) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn width(&self) -> Option<usize> {
        self.width
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

impl Record for RawRecord {
    fn parse(&mut self, cells: &[&str]) {
        self.cells = cells.iter().map(|c| c.to_string()).collect();
        self.parsed = match self.width {
            Some(width) => cells.len() == width,
            None => cells.len() > 1,
        };
    }

    fn is_parsed(&self) -> bool {
        self.parsed
    }
}
