//! # xlsxforge
//!
//! A generation engine that turns typed in-memory records into `.xlsx`
//! workbooks via a declarative column model.
//!
//! ## Features
//!
//! - **Typed columns**: a `ColumnBuilder<R, T>` chain maps each field of a
//!   record type `R` to a cell, with nil-handling, conditional mapping, and
//!   per-column styling.
//! - **Layered styling**: book, sheet, column, and cell style layers merge
//!   field-wise, with data-region borders overlaid automatically.
//! - **Sync or async data sources**: a sheet's records may come from a plain
//!   closure or a `Future`-returning one, with no bundled async runtime.
//! - **Streamed-light writing**: every package part is collected in memory,
//!   then packed into an uncompressed (STORE-method) ZIP and written
//!   atomically, so a cancelled or failed write never leaves a partial file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xlsxforge::{Book, BookStyle, Column, ColumnBuilder, DataProvider, Sheet, SheetStyle};
//!
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! # fn main() -> xlsxforge::Result<()> {
//! let columns: Vec<Column<Person>> = vec![
//!     ColumnBuilder::<Person, String>::required("Name", |p| p.name.clone())
//!         .to_string_with(|s| s),
//!     ColumnBuilder::<Person, i64>::required("Age", |p| p.age).to_int_with(|v| v),
//! ];
//!
//! let sheet = Sheet::new(
//!     "People",
//!     true,
//!     SheetStyle::default(),
//!     columns,
//!     DataProvider::sync(|| {
//!         Ok(vec![Person { name: "Alice".to_string(), age: 30 }])
//!     }),
//! );
//!
//! let mut book = Book::new(BookStyle::default()).add_sheet(sheet);
//! book.write(std::path::Path::new("people.xlsx"))?;
//! # Ok(())
//! # }
//! ```

pub mod atomic_write;
pub mod book;
pub mod cell;
pub mod color;
pub mod column;
pub mod error;
pub mod excel_date;
pub mod global_parts;
pub mod names;
pub mod output;
pub mod progress;
pub mod range;
pub mod registry;
pub mod sheet;
pub mod style;
pub mod worksheet_xml;
pub mod xml_writer;
pub mod zip;

pub use book::{Book, Logger};
pub use cell::{BoolExpr, CellValue};
pub use column::{Column, ColumnBuilder, NilHandling};
pub use color::Color;
pub use error::{Result, XlsxError};
pub use names::{CharStrategy, SanitizeConfig};
pub use output::OutputConfig;
pub use progress::{FailureKind, ProgressEvent};
pub use range::{CellRange, CellRef, RangeEdges};
pub use sheet::{DataProvider, Sheet};
pub use style::{
    Alignment, Border, BorderSide, BorderStyle, BookStyle, CellStyle, ColumnWidth, DataBorder,
    DataBorderStyle, Fill, FillPattern, Font, FreezePanes, HorizontalAlign, NumberFormat,
    SheetStyle, VerticalAlign,
};
