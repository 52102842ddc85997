//! XLSX persistence for [`Workbook`] documents
//!
//! Writing goes through `rust_xlsxwriter`, reading through `calamine`.
//! calamine resolves shared strings while loading, so loaded cells always
//! carry their text directly.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Format, FormatAlign, Formula, Workbook as XlsxWorkbook};
use tracing::{debug, warn};

use super::{
    cell_reference, Cell, CellData, CellFormat, HorizontalAlignment, Row, Stylesheet, Workbook,
    Worksheet,
};
use crate::error::{CodecError, CodecResult};

/// Write a document to an `.xlsx` file
pub fn save(workbook: &Workbook, path: &Path) -> CodecResult<()> {
    let mut xlsx = build(workbook)?;
    xlsx.save(path)?;
    debug!(path = %path.display(), "Saved workbook");
    Ok(())
}

/// Serialize a document to `.xlsx` bytes
pub fn to_buffer(workbook: &Workbook) -> CodecResult<Vec<u8>> {
    let mut xlsx = build(workbook)?;
    Ok(xlsx.save_to_buffer()?)
}

fn build(workbook: &Workbook) -> CodecResult<XlsxWorkbook> {
    let formats: Vec<Format> = workbook
        .stylesheet
        .cell_formats
        .iter()
        .map(|cf| to_format(&workbook.stylesheet, cf))
        .collect();
    let default_format = Format::new();

    let mut xlsx = XlsxWorkbook::new();
    for sheet in &workbook.worksheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for range in &sheet.columns {
            for col in range.min..=range.max {
                // Column ranges are 1-based
                worksheet.set_column_width(col.saturating_sub(1) as u16, range.width)?;
            }
        }

        for row in &sheet.rows {
            let r = row.index.saturating_sub(1);
            for cell in &row.cells {
                let Some(col) = cell.column_index() else {
                    warn!(reference = %cell.reference, "Skipping cell with invalid reference");
                    continue;
                };
                let col = col as u16;
                let format = cell
                    .style
                    .and_then(|s| formats.get(s as usize))
                    .unwrap_or(&default_format);

                match &cell.data {
                    CellData::Boolean(b) => worksheet.write_boolean_with_format(r, col, *b, format)?,
                    CellData::Number(s) => match s.parse::<f64>() {
                        Ok(n) => worksheet.write_number_with_format(r, col, n, format)?,
                        Err(_) => worksheet.write_string_with_format(r, col, s, format)?,
                    },
                    CellData::InlineString(s) => worksheet.write_string_with_format(r, col, s, format)?,
                    CellData::SharedString(index) => {
                        let text = index
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| workbook.shared_strings.get(i))
                            .unwrap_or_default();
                        worksheet.write_string_with_format(r, col, text, format)?
                    }
                    CellData::Formula(f) => {
                        worksheet.write_formula_with_format(r, col, Formula::new(f), format)?
                    }
                };
            }
        }
    }
    Ok(xlsx)
}

/// Map a stylesheet cell format to a rust_xlsxwriter format
fn to_format(stylesheet: &Stylesheet, cell_format: &CellFormat) -> Format {
    let mut format = Format::new();

    let id = cell_format.number_format_id;
    if cell_format.apply_number_format || id != 0 {
        if let Some(code) = stylesheet.number_format_code(id) {
            format = format.set_num_format(code);
        } else if let Ok(builtin) = u8::try_from(id) {
            format = format.set_num_format_index(builtin);
        }
    }

    if stylesheet.font(cell_format.font_id).is_some_and(|f| f.bold) {
        format = format.set_bold();
    }

    match cell_format.alignment {
        Some(HorizontalAlignment::Left) => format = format.set_align(FormatAlign::Left),
        Some(HorizontalAlignment::Center) => format = format.set_align(FormatAlign::Center),
        Some(HorizontalAlignment::Right) => format = format.set_align(FormatAlign::Right),
        None => {}
    }

    format
}

/// Load every worksheet of an `.xlsx`, `.xls` or `.ods` file
pub fn load(path: &Path) -> CodecResult<Workbook> {
    let mut source = open_workbook_auto(path)?;
    let mut workbook = Workbook::new();

    for name in source.sheet_names().to_owned() {
        let range = source.worksheet_range(&name)?;
        workbook.worksheets.push(worksheet_from_range(&name, &range));
    }

    debug!(
        path = %path.display(),
        sheets = workbook.worksheets.len(),
        "Loaded workbook"
    );
    Ok(workbook)
}

/// Load a file that must hold exactly one worksheet.
///
/// The sheet count is checked before any cell is read.
pub fn load_single(path: &Path) -> CodecResult<Workbook> {
    let mut source = open_workbook_auto(path)?;
    let names = source.sheet_names().to_owned();
    let name = match names.as_slice() {
        [name] => name,
        [] => return Err(CodecError::NoWorksheet),
        _ => return Err(CodecError::MultipleWorksheets(names.len())),
    };

    let range = source.worksheet_range(name)?;
    let mut workbook = Workbook::new();
    workbook.worksheets.push(worksheet_from_range(name, &range));
    debug!(path = %path.display(), sheet = %name, "Loaded single-sheet workbook");
    Ok(workbook)
}

/// Empty rows inside the used range are kept with no cells so records keep
/// their positions; trailing empty rows are dropped
fn worksheet_from_range(name: &str, range: &Range<Data>) -> Worksheet {
    let mut worksheet = Worksheet::new(name);
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

    for (r, cells) in range.rows().enumerate() {
        let index = row_offset + r as u32 + 1;
        let mut row = Row::new(index);
        for (c, data) in cells.iter().enumerate() {
            if let Some(data) = convert_cell(data) {
                let reference = cell_reference(col_offset as usize + c, index);
                row.cells.push(Cell::new(reference, data));
            }
        }
        worksheet.rows.push(row);
    }
    while worksheet.rows.last().is_some_and(|row| row.cells.is_empty()) {
        worksheet.rows.pop();
    }
    worksheet
}

fn convert_cell(cell: &Data) -> Option<CellData> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(CellData::InlineString(s.clone())),
        Data::Float(f) => Some(CellData::Number(f.to_string())),
        Data::Int(i) => Some(CellData::Number(i.to_string())),
        Data::Bool(b) => Some(CellData::Boolean(*b)),
        // Dates come back as their day-count serial, as stored
        Data::DateTime(dt) => Some(CellData::Number(dt.as_f64().to_string())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellData::InlineString(s.clone())),
        Data::Error(e) => Some(CellData::InlineString(format!("#{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), None);
        assert_eq!(
            convert_cell(&Data::Float(2.0)),
            Some(CellData::Number("2".to_string()))
        );
        assert_eq!(
            convert_cell(&Data::String("John".to_string())),
            Some(CellData::InlineString("John".to_string()))
        );
        assert_eq!(convert_cell(&Data::Bool(true)), Some(CellData::Boolean(true)));
    }

    #[test]
    fn test_empty_rows_keep_their_position() {
        let mut range = Range::new((1, 0), (4, 1));
        range.set_value((1, 0), Data::String("a".into()));
        range.set_value((3, 1), Data::Float(3.0));

        let sheet = worksheet_from_range("Data", &range);
        let indices: Vec<u32> = sheet.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 3, 4]);
        assert_eq!(sheet.rows[0].cells[0].reference, "A2");
        assert!(sheet.rows[1].cells.is_empty());
        assert_eq!(sheet.rows[2].cells[0].reference, "B4");
    }

    #[test]
    fn test_buffer_is_zip_package() {
        let mut sheet = Worksheet::new("Data");
        let mut row = Row::new(1);
        row.cells.push(Cell::new("A1", CellData::InlineString("John".into())));
        row.cells.push(Cell::new("B1", CellData::Number("1.5".into())));
        row.cells.push(Cell::new("C1", CellData::SharedString("7".into())));
        sheet.rows.push(row);
        let workbook = Workbook {
            worksheets: vec![sheet],
            ..Default::default()
        };

        let bytes = to_buffer(&workbook).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
