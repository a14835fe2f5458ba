//! End-to-end integration tests for xlsxforge.
//!
//! The library only writes `.xlsx` packages, so these tests assert on the
//! package's bytes directly (via `support::zip_inspect`) rather than reading
//! the workbook back through some second library.

mod support {
    pub mod zip_inspect;
}

use support::zip_inspect::ZipContents;
use xlsxforge::{
    BoolExpr, Book, BookStyle, Column, ColumnBuilder, ColumnWidth, DataProvider, FreezePanes, Sheet,
    SheetStyle,
};

struct Person {
    name: String,
    age: i64,
    nickname: Option<String>,
    active: bool,
}

fn person_columns() -> Vec<Column<Person>> {
    vec![
        ColumnBuilder::<Person, String>::required("Name", |p| p.name.clone())
            .to_string_with(|s| s),
        ColumnBuilder::<Person, i64>::required("Age", |p| p.age).to_int_with(|v| v),
        ColumnBuilder::<Person, String>::optional("Nickname", |p| p.nickname.clone())
            .default_value("-".to_string())
            .to_string_with(|s| s),
        ColumnBuilder::<Person, bool>::required("Active", |p| p.active)
            .to_bool_with(BoolExpr::YesNo, |b| b),
    ]
}

fn write_and_inspect(book: Book) -> ZipContents {
    let mut book = book;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    book.write(&path).unwrap();
    ZipContents::read(&path)
}

#[test]
fn package_contains_every_mandatory_part() {
    let sheet = Sheet::new(
        "People",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| {
            Ok(vec![Person {
                name: "Alice".to_string(),
                age: 30,
                nickname: None,
                active: true,
            }])
        }),
    );
    let book = Book::new(BookStyle::default()).add_sheet(sheet);
    let zip = write_and_inspect(book);

    for part in [
        "[Content_Types].xml",
        "_rels/.rels",
        "docProps/app.xml",
        "docProps/core.xml",
        "xl/workbook.xml",
        "xl/_rels/workbook.xml.rels",
        "xl/styles.xml",
        "xl/sharedStrings.xml",
        "xl/worksheets/sheet1.xml",
    ] {
        assert!(zip.contains(part), "missing part: {part}");
    }
}

#[test]
fn header_and_data_rows_are_emitted_with_shared_strings() {
    let sheet = Sheet::new(
        "People",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| {
            Ok(vec![
                Person {
                    name: "Alice".to_string(),
                    age: 30,
                    nickname: None,
                    active: true,
                },
                Person {
                    name: "Bob".to_string(),
                    age: 25,
                    nickname: Some("Bobby".to_string()),
                    active: false,
                },
            ])
        }),
    );
    let book = Book::new(BookStyle::default()).add_sheet(sheet);
    let zip = write_and_inspect(book);

    let shared_strings = zip.text("xl/sharedStrings.xml");
    assert!(shared_strings.contains("Name"));
    assert!(shared_strings.contains("Alice"));
    assert!(shared_strings.contains("Bobby"));
    assert!(shared_strings.contains('-'.to_string().as_str()));

    let sheet_xml = zip.text("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("<v>30</v>"));
    assert!(sheet_xml.contains("dimension ref=\"A1:D3\""));
}

#[test]
fn multiple_sheets_get_distinct_worksheet_parts_and_workbook_entries() {
    let first = Sheet::new(
        "Team A",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| {
            Ok(vec![Person {
                name: "Alice".to_string(),
                age: 30,
                nickname: None,
                active: true,
            }])
        }),
    );
    let second = Sheet::new(
        "Team B",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| {
            Ok(vec![Person {
                name: "Carol".to_string(),
                age: 41,
                nickname: None,
                active: false,
            }])
        }),
    );
    let book = Book::new(BookStyle::default())
        .add_sheet(first)
        .add_sheet(second);
    let zip = write_and_inspect(book);

    assert!(zip.contains("xl/worksheets/sheet1.xml"));
    assert!(zip.contains("xl/worksheets/sheet2.xml"));
    let workbook_xml = zip.text("xl/workbook.xml");
    assert!(workbook_xml.contains("Team A"));
    assert!(workbook_xml.contains("Team B"));
}

#[test]
fn duplicate_sheet_names_are_rejected_before_any_write() {
    let make = |label: &str| {
        let label = label.to_string();
        Sheet::new(
            "Same Name",
            true,
            SheetStyle::default(),
            person_columns(),
            DataProvider::sync(move || {
                Ok(vec![Person {
                    name: label.clone(),
                    age: 1,
                    nickname: None,
                    active: true,
                }])
            }),
        )
    };
    let mut book = Book::new(BookStyle::default())
        .add_sheet(make("one"))
        .add_sheet(make("two"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    let result = book.write(&path);
    assert!(result.is_err());
    assert!(!path.exists());
}

#[test]
fn empty_dataset_still_emits_the_header_row() {
    let sheet = Sheet::new(
        "Empty",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| Ok(vec![])),
    );
    let book = Book::new(BookStyle::default()).add_sheet(sheet);
    let zip = write_and_inspect(book);

    let sheet_xml = zip.text("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("dimension ref=\"A1:D1\""));
}

#[test]
fn large_dataset_round_trips_through_the_whole_pipeline() {
    let row_count = 2_000;
    let sheet = Sheet::new(
        "Bulk",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(move || {
            Ok((0..row_count)
                .map(|i| Person {
                    name: format!("Person {i}"),
                    age: (i % 80) as i64,
                    nickname: None,
                    active: i % 2 == 0,
                })
                .collect())
        }),
    );
    let book = Book::new(BookStyle::default()).add_sheet(sheet);
    let zip = write_and_inspect(book);

    let sheet_xml = zip.text("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(&format!("dimension ref=\"A1:D{}\"", row_count + 1)));
}

#[test]
fn special_characters_survive_xml_escaping() {
    let sheet = Sheet::new(
        "Special",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| {
            Ok(vec![Person {
                name: "Text with <tags> & \"quotes\" and 'apostrophes' Ñoño 😀".to_string(),
                age: 1,
                nickname: None,
                active: true,
            }])
        }),
    );
    let book = Book::new(BookStyle::default()).add_sheet(sheet);
    let zip = write_and_inspect(book);

    let shared_strings = zip.text("xl/sharedStrings.xml");
    assert!(shared_strings.contains("&lt;tags&gt;"));
    assert!(shared_strings.contains("&amp;"));
    assert!(shared_strings.contains("Ñoño"));
    assert!(shared_strings.contains('\u{1F600}'.to_string().as_str()));
}

#[test]
fn unicode_sheet_names_are_preserved_and_sanitized() {
    let make_sheet = |name: &str| {
        Sheet::new(
            name,
            true,
            SheetStyle::default(),
            person_columns(),
            DataProvider::sync(|| {
                Ok(vec![Person {
                    name: "X".to_string(),
                    age: 1,
                    nickname: None,
                    active: true,
                }])
            }),
        )
    };
    let book = Book::new(BookStyle::default())
        .add_sheet(make_sheet("Данные"))
        .add_sheet(make_sheet("数据"))
        .add_sheet(make_sheet("Ventes/Q1"));
    let zip = write_and_inspect(book);

    let workbook_xml = zip.text("xl/workbook.xml");
    assert!(workbook_xml.contains("Данные"));
    assert!(workbook_xml.contains("数据"));
    // '/' is not legal in an Excel sheet name and must be sanitized away.
    assert!(!workbook_xml.contains("Ventes/Q1"));
    assert!(workbook_xml.contains("Ventes_Q1"));
}

#[test]
fn column_widths_and_freeze_panes_reach_the_worksheet_xml() {
    let mut sheet_style = SheetStyle::default();
    sheet_style.freeze_panes = Some(FreezePanes { rows: 1, columns: 0 });

    let mut columns = person_columns();
    columns[0] = ColumnBuilder::<Person, String>::required("Name", |p| p.name.clone())
        .width(ColumnWidth::characters(24.0))
        .to_string_with(|s| s);

    let sheet = Sheet::new(
        "Styled",
        true,
        sheet_style,
        columns,
        DataProvider::sync(|| {
            Ok(vec![Person {
                name: "Alice".to_string(),
                age: 30,
                nickname: None,
                active: true,
            }])
        }),
    );
    let book = Book::new(BookStyle::default()).add_sheet(sheet);
    let zip = write_and_inspect(book);

    let sheet_xml = zip.text("xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("width=\"24\""));
    assert!(sheet_xml.contains("topLeftCell=\"A2\""));
}

#[test]
fn cancellation_leaves_no_file_behind() {
    let sheet = Sheet::new(
        "People",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::sync(|| {
            Ok(vec![Person {
                name: "Alice".to_string(),
                age: 30,
                nickname: None,
                active: true,
            }])
        }),
    );
    let mut book = Book::new(BookStyle::default()).add_sheet(sheet);
    book.cancellation_handle()
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    assert!(book.write(&path).is_err());
    assert!(!path.exists());
}

#[tokio::test]
async fn async_data_provider_round_trips_via_write_async() {
    let sheet = Sheet::new(
        "Async",
        true,
        SheetStyle::default(),
        person_columns(),
        DataProvider::asynchronous(|| {
            Box::pin(async {
                Ok(vec![Person {
                    name: "Delayed Alice".to_string(),
                    age: 30,
                    nickname: None,
                    active: true,
                }])
            })
        }),
    );
    let mut book = Book::new(BookStyle::default()).add_sheet(sheet);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    book.write_async(&path).await.unwrap();

    let zip = ZipContents::read(&path);
    assert!(zip.text("xl/sharedStrings.xml").contains("Delayed Alice"));
}
