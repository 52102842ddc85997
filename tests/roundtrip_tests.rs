//! Export/import round trips through files

use chrono::NaiveDate;
use tempfile::TempDir;

use sheetcodec::document::{self, Cell, CellData, Row, Workbook, Worksheet};
use sheetcodec::model::date;
use sheetcodec::{
    Accessor, CodecError, ColumnFormat, ImportConfig, IntoTable, RawRecord, Record, SheetImporter,
    SimpleParser, Table, TableImporter, TableWriter, TextExportConfig, TextImporter, TextWriter,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    name: String,
    count: i64,
    born: Option<NaiveDate>,
    parsed: bool,
}

impl Person {
    fn new(name: &str, count: i64, born: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            count,
            born: Some(born),
            parsed: false,
        }
    }
}

impl Record for Person {
    fn parse(&mut self, cells: &[&str]) {
        self.parsed = false;
        let [name, count, born] = cells else {
            return;
        };
        // Spreadsheets give back numbers and date serials; text gives the formatted date
        let Ok(count) = count.trim().parse::<f64>() else {
            return;
        };
        let born = NaiveDate::parse_from_str(born, "%d.%m.%Y")
            .ok()
            .or_else(|| date::parse_serial(born).map(|dt| dt.date()));
        let Some(born) = born else {
            return;
        };

        self.name = name.to_string();
        self.count = count as i64;
        self.born = Some(born);
        self.parsed = true;
    }

    fn is_parsed(&self) -> bool {
        self.parsed
    }
}

fn people() -> Vec<Person> {
    vec![
        Person::new("John", 1, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        Person::new("Alex", 2, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
    ]
}

fn table() -> Table<Person> {
    people()
        .into_table(true, Some("People"))
        .add_column(Accessor::new("Name", |p: &Person| p.name.clone()), None)
        .add_column(Accessor::new("Count", |p: &Person| p.count), None)
        .add_column(
            Accessor::new("Born", |p: &Person| p.born),
            Some(ColumnFormat::new().set_format("dd.MM.yyyy")),
        )
}

fn assert_same_people(imported: &[Person]) {
    let expected = people();
    assert_eq!(imported.len(), expected.len());
    for (got, want) in imported.iter().zip(&expected) {
        assert!(got.parsed);
        assert_eq!(got.name, want.name);
        assert_eq!(got.count, want.count);
        assert_eq!(got.born, want.born);
    }
}

#[test]
fn test_xlsx_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");

    assert!(TableWriter::new(&table()).save(&path).unwrap());

    let imported = SheetImporter::new(SimpleParser, ImportConfig::default())
        .import_path(&path, &Person::default())
        .unwrap();
    assert_eq!(imported.parsed_count(), 2);
    assert_same_people(imported.records());
}

#[test]
fn test_text_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.csv");

    assert!(TextWriter::new(&table(), TextExportConfig::default())
        .save(&path)
        .unwrap());

    let imported = TextImporter::new(SimpleParser, ImportConfig::default())
        .import_path(&path, &Person::default())
        .unwrap();
    assert_eq!(imported.parsed_count(), 2);
    assert_same_people(imported.records());
}

#[test]
fn test_appended_table_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("more.xlsx");
    let more = vec![Person::new(
        "Kate",
        3,
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
    )];
    let table = table().concat(more.into_table(false, None));

    TableWriter::new(&table).save(&path).unwrap();
    let imported = SheetImporter::new(SimpleParser, ImportConfig::default())
        .import_path(&path, &Person::default())
        .unwrap();
    assert_eq!(imported.len(), 3);
    assert_eq!(imported[2].name, "Kate");
}

#[test]
fn test_all_null_record_keeps_its_row() {
    #[derive(Clone)]
    struct Entry {
        label: Option<&'static str>,
        amount: Option<i32>,
    }

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaps.xlsx");
    let entries = vec![
        Entry { label: Some("a"), amount: Some(1) },
        Entry { label: None, amount: None },
        Entry { label: Some("c"), amount: Some(3) },
    ];
    let table = entries
        .into_table(true, Some("Entries"))
        .add_column(Accessor::new("Label", |e: &Entry| e.label), None)
        .add_column(Accessor::new("Amount", |e: &Entry| e.amount), None);

    TableWriter::new(&table).save(&path).unwrap();
    let imported = SheetImporter::new(SimpleParser, ImportConfig::default())
        .import_path(&path, &RawRecord::with_width(2))
        .unwrap();

    assert_eq!(imported.len(), 3);
    assert_eq!(imported.parsed_count(), 2);
    assert_eq!(imported[0].cells, vec!["a", "1"]);
    assert!(imported[1].cells.is_empty());
    assert_eq!(imported[2].cells, vec!["c", "3"]);
}

#[test]
fn test_empty_table_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xlsx");
    let table = people().into_table(true, None);

    assert!(!TableWriter::new(&table).save(&path).unwrap());
    assert!(!path.exists());
}

#[test]
fn test_multiple_sheets_rejected_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("two.xlsx");

    let mut first = Worksheet::new("First");
    let mut row = Row::new(1);
    row.cells.push(Cell::new("A1", CellData::InlineString("x".into())));
    first.rows.push(row);
    let workbook = Workbook {
        worksheets: vec![first, Worksheet::new("Second")],
        ..Default::default()
    };
    document::xlsx::save(&workbook, &path).unwrap();

    let err = SheetImporter::new(SimpleParser, ImportConfig::default())
        .import_path(&path, &Person::default())
        .unwrap_err();
    assert!(matches!(err, CodecError::MultipleWorksheets(2)));
    assert!(err.is_configuration());
}

#[test]
fn test_out_of_range_shared_string() {
    let mut sheet = Worksheet::new("Data");
    let mut row = Row::new(1);
    row.cells.push(Cell::new("A1", CellData::SharedString("99".into())));
    row.cells.push(Cell::new("B1", CellData::Number("4".into())));
    row.cells.push(Cell::new("C1", CellData::Number("45292".into())));
    sheet.rows.push(row);
    let workbook = Workbook {
        worksheets: vec![sheet],
        shared_strings: ["only"].into_iter().collect(),
        ..Default::default()
    };

    let imported = SheetImporter::new(SimpleParser, ImportConfig::default().with_headers(false))
        .import_workbook(&workbook, &Person::default())
        .unwrap();
    assert!(imported[0].is_parsed());
    assert_eq!(imported[0].name, "");
    assert_eq!(imported[0].born, NaiveDate::from_ymd_opt(2024, 1, 1));
}

#[test]
fn test_text_sniffing_failure() {
    let err = TextImporter::new(SimpleParser, ImportConfig::default())
        .import_str("Name\nJohn\nAlex\n", &Person::default())
        .unwrap_err();
    assert!(matches!(err, CodecError::UndetectableDelimiter));
}
