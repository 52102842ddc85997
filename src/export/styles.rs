//! Stylesheet construction and the per-column style index

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{Border, CellFormat, Fill, Font, HorizontalAlignment, NumberFormat, Stylesheet};
use crate::model::Column;

/// Cell format of cells without a custom format
pub const DEFAULT_STYLE: u32 = 0;
/// Cell format applied to date cells
pub const DATE_STYLE: u32 = 1;
/// Bold cell format of header cells
pub const HEADER_STYLE: u32 = 2;

/// First id available for custom number formats
pub const CUSTOM_NUMBER_FORMAT_BASE: u32 = 164;

/// Built-in short date number format
const BUILTIN_DATE_FORMAT: u32 = 14;

const REGULAR_FONT: u32 = 0;
const BOLD_FONT: u32 = 1;

/// Style id of each column with a custom format, keyed by column position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleIndex {
    styles: IndexMap<usize, u32>,
}

impl StyleIndex {
    /// Style id of the column at `position`, if it declared a custom format
    pub fn get(&self, position: usize) -> Option<u32> {
        self.styles.get(&position).copied()
    }

    /// Style id of the column at `position`, falling back to the default style
    pub fn style_for(&self, position: usize) -> u32 {
        self.get(position).unwrap_or(DEFAULT_STYLE)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// `(column position, style id)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.styles.iter().map(|(&p, &s)| (p, s))
    }
}

/// Builds the stylesheet shared by a whole worksheet.
///
/// Fixed cell formats come first (default, date, bold header); every column
/// declaring a format string then gets its own cell format, in column order,
/// pointing at number format `164 + column position`.
pub struct StyleBuilder<'a, T> {
    columns: &'a [Column<T>],
}

impl<'a, T> StyleBuilder<'a, T> {
    pub fn new(columns: &'a [Column<T>]) -> Self {
        Self { columns }
    }

    pub fn build(&self) -> (Stylesheet, StyleIndex) {
        let mut stylesheet = Stylesheet {
            fonts: vec![Font::default(), Font::bold()],
            fills: vec![Fill::default()],
            borders: vec![Border::default()],
            number_formats: Vec::new(),
            cell_formats: vec![
                cell_format(0, REGULAR_FONT, false),
                cell_format(BUILTIN_DATE_FORMAT, REGULAR_FONT, true),
                cell_format(0, BOLD_FONT, true),
            ],
        };
        let mut index = StyleIndex::default();

        for (position, column) in self.columns.iter().enumerate() {
            let Some(code) = column.format.as_deref() else {
                continue;
            };
            let number_format_id = CUSTOM_NUMBER_FORMAT_BASE + position as u32;
            stylesheet.number_formats.push(NumberFormat {
                id: number_format_id,
                code: code.to_string(),
            });

            let style = stylesheet.cell_formats.len() as u32;
            stylesheet.cell_formats.push(CellFormat {
                number_format_id,
                apply_number_format: true,
                ..Default::default()
            });
            index.styles.insert(position, style);
        }

        debug!(
            cell_formats = stylesheet.cell_formats.len(),
            number_formats = stylesheet.number_formats.len(),
            "Built stylesheet"
        );
        (stylesheet, index)
    }
}

fn cell_format(number_format_id: u32, font_id: u32, apply_number_format: bool) -> CellFormat {
    CellFormat {
        number_format_id,
        font_id,
        fill_id: 0,
        border_id: 0,
        apply_number_format,
        alignment: Some(HorizontalAlignment::Left),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnBuilder, ColumnFormat, Value};

    fn column(format: Option<&str>) -> Column<()> {
        let mut fmt = ColumnFormat::new();
        if let Some(code) = format {
            fmt = fmt.set_format(code);
        }
        ColumnBuilder::new()
            .format(fmt)
            .select(|_: &()| Value::Null)
            .build(0)
            .unwrap()
    }

    #[test]
    fn test_fixed_tables() {
        let (stylesheet, index) = StyleBuilder::<()>::new(&[]).build();
        assert_eq!(stylesheet.fonts.len(), 2);
        assert!(stylesheet.fonts[1].bold);
        assert_eq!(stylesheet.fills.len(), 1);
        assert_eq!(stylesheet.borders.len(), 1);
        assert_eq!(stylesheet.cell_formats.len(), 3);
        assert_eq!(stylesheet.cell_formats[DATE_STYLE as usize].number_format_id, 14);
        assert_eq!(stylesheet.cell_formats[HEADER_STYLE as usize].font_id, 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_custom_formats_per_column() {
        let columns = vec![column(None), column(Some("0.00")), column(Some("dd.MM.yyyy"))];
        let (stylesheet, index) = StyleBuilder::new(&columns).build();

        assert_eq!(index.get(0), None);
        assert_eq!(index.style_for(0), DEFAULT_STYLE);
        assert_eq!(index.get(1), Some(3));
        assert_eq!(index.get(2), Some(4));

        assert_eq!(stylesheet.number_format_code(165), Some("0.00"));
        assert_eq!(stylesheet.number_format_code(166), Some("dd.MM.yyyy"));
        assert_eq!(stylesheet.cell_formats[4].number_format_id, 166);
    }

    #[test]
    fn test_same_title_columns_get_distinct_styles() {
        let columns = vec![column(Some("0.0")), column(Some("0.0"))];
        let (_, index) = StyleBuilder::new(&columns).build();
        assert_ne!(index.get(0), index.get(1));
    }

    #[test]
    fn test_deterministic() {
        let columns = vec![column(Some("0")), column(None), column(Some("yyyy"))];
        let first = StyleBuilder::new(&columns).build();
        let second = StyleBuilder::new(&columns).build();
        assert_eq!(first, second);
    }
}
