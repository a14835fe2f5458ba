//! The sheet engine: `Sheet<R>`, `DataProvider<R>`, and the per-sheet
//! resolution algorithm that turns records into styled, positioned cells
//! (spec §4.2).
//!
//! Grounded on spec.md's algorithm directly; XML cell/row emission is
//! grounded on the teacher's `fast_writer::worksheet::FastWorksheet` and
//! `fast_writer::workbook::FastWorkbook::write_row_styled`.

use crate::cell::CellValue;
use crate::column::Column;
use crate::error::{Result, XlsxError};
use crate::names::sanitize_sheet_name;
use crate::output::OutputConfig;
use crate::range::CellRange;
use crate::style::{Border, CellStyle, DataBorder, SheetStyle};
use std::future::Future;
use std::pin::Pin;

/// A boxed, `Send` future, the shape an async data provider returns,
/// requiring no executor dependency in the library itself (spec §5's
/// redesign guidance: only the caller's own runtime drives `.await`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a sheet's records are supplied. Two variants rather than a single
/// sendable-constrained callable, so the crate never needs to name an
/// async runtime type (spec §5).
pub enum DataProvider<R> {
    Sync(Box<dyn Fn() -> Result<Vec<R>>>),
    Async(Box<dyn Fn() -> BoxFuture<'static, Result<Vec<R>>>>),
}

impl<R> DataProvider<R> {
    pub fn sync(f: impl Fn() -> Result<Vec<R>> + 'static) -> Self {
        DataProvider::Sync(Box::new(f))
    }

    pub fn asynchronous(
        f: impl Fn() -> BoxFuture<'static, Result<Vec<R>>> + 'static,
    ) -> Self {
        DataProvider::Async(Box::new(f))
    }
}

/// One resolved, positioned cell, ready for XML emission.
#[derive(Debug, Clone)]
pub struct ResolvedCell {
    pub row: u32,
    pub column: u32,
    pub value: CellValue,
    pub style_id: Option<u32>,
    pub shared_string_id: Option<u32>,
}

/// A homogeneous collection of records rendered as one worksheet.
pub struct Sheet<R> {
    raw_name: String,
    has_header: bool,
    style: SheetStyle,
    columns: Vec<Column<R>>,
    provider: DataProvider<R>,
    data: Option<Vec<R>>,
}

impl<R> Sheet<R> {
    pub fn new(
        name: impl Into<String>,
        has_header: bool,
        style: SheetStyle,
        columns: Vec<Column<R>>,
        provider: DataProvider<R>,
    ) -> Self {
        Sheet {
            raw_name: name.into(),
            has_header,
            style,
            columns,
            provider,
            data: None,
        }
    }

    /// Sanitized worksheet name (spec §6); safe to call before `load()`.
    pub fn name(&self) -> String {
        sanitize_sheet_name(&self.raw_name)
    }

    /// Fetch the sheet's records via its data provider, caching the
    /// result. Every metadata/XML-emission operation below assumes this
    /// has already completed (spec §3's `Sheet<R>` lifecycle invariant).
    pub fn load(&mut self) -> Result<()> {
        if self.data.is_some() {
            return Ok(());
        }
        let rows = match &self.provider {
            DataProvider::Sync(f) => f()?,
            DataProvider::Async(_) => {
                return Err(XlsxError::XmlGeneration(
                    "sheet with an async data provider must be loaded via load_async".to_string(),
                ))
            }
        };
        self.data = Some(rows);
        Ok(())
    }

    pub async fn load_async(&mut self) -> Result<()> {
        if self.data.is_some() {
            return Ok(());
        }
        let rows = match &self.provider {
            DataProvider::Sync(f) => f()?,
            DataProvider::Async(f) => f().await?,
        };
        self.data = Some(rows);
        Ok(())
    }

    fn data(&self) -> &[R] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Active columns for this sheet: every column whose `when` predicate
    /// holds against the first record, or all columns if there are no
    /// records (spec §4.2 step 2).
    fn active_columns(&self) -> Vec<&Column<R>> {
        let first = self.data().first();
        self.columns
            .iter()
            .filter(|c| c.is_visible(first))
            .collect()
    }

    /// Merge this sheet's style on top of the book's default sheet style,
    /// compute the effective column-width map, and (if enabled) the
    /// data-region border range (spec §4.2 steps 1, 3, 4).
    fn effective_style(&self, book_default: &SheetStyle) -> (SheetStyle, Vec<&Column<R>>) {
        let mut merged = self.style.merge(book_default);
        let active = self.active_columns();

        for (index, column) in active.iter().enumerate() {
            if let Some(width) = column.width() {
                merged.column_widths.insert((index + 1) as u32, width);
            }
        }

        (merged, active)
    }

    fn data_range(&self, merged_style: &SheetStyle, active_count: usize, row_count: usize) -> Option<CellRange> {
        let border = merged_style.data_border?;
        if !border.enabled || row_count == 0 || active_count == 0 {
            return None;
        }
        let start_row = if border.include_header && self.has_header {
            1
        } else if self.has_header {
            2
        } else {
            1
        };
        let end_row = row_count as u32 + if self.has_header { 1 } else { 0 };
        Some(CellRange::new(start_row, 1, end_row, active_count as u32))
    }

    /// Run the full per-sheet resolution algorithm (spec §4.2), producing
    /// every cell this sheet contains. `book_header_style`/`book_body_style`
    /// are the book-level defaults (empty `CellStyle` layer if unset).
    pub fn resolve_cells(
        &self,
        book_default_sheet_style: &SheetStyle,
        book_header_style: &CellStyle,
        book_body_style: &CellStyle,
    ) -> Vec<(ResolvedCell, CellStyle)> {
        let (merged_style, active) = self.effective_style(book_default_sheet_style);
        let rows = self.data();
        let data_range = self.data_range(&merged_style, active.len(), rows.len());

        let mut cells = Vec::new();
        let mut current_row = 1u32;

        let sheet_header_base = merged_style
            .header_style
            .clone()
            .unwrap_or_default()
            .merge(book_header_style);
        let sheet_body_base = merged_style
            .body_style
            .clone()
            .unwrap_or_default()
            .merge(book_body_style);

        if self.has_header {
            for (index, column) in active.iter().enumerate() {
                let col_index = (index + 1) as u32;
                let mut style = column
                    .header_style()
                    .cloned()
                    .unwrap_or_default()
                    .merge(&sheet_header_base);
                style = overlay_border(
                    style,
                    data_range,
                    merged_style.data_border,
                    current_row,
                    col_index,
                );

                cells.push((
                    ResolvedCell {
                        row: current_row,
                        column: col_index,
                        value: CellValue::StringValue(column.display_name().to_string()),
                        style_id: None,
                        shared_string_id: None,
                    },
                    style,
                ));
            }
            current_row += 1;
        }

        for record in rows {
            for (index, column) in active.iter().enumerate() {
                let col_index = (index + 1) as u32;
                let output = column.resolve(record);
                let value = output_to_cell_value(output);

                let mut style = column
                    .body_style()
                    .cloned()
                    .unwrap_or_default()
                    .merge(&sheet_body_base);
                style = overlay_border(
                    style,
                    data_range,
                    merged_style.data_border,
                    current_row,
                    col_index,
                );

                cells.push((
                    ResolvedCell {
                        row: current_row,
                        column: col_index,
                        value,
                        style_id: None,
                        shared_string_id: None,
                    },
                    style,
                ));
            }
            current_row += 1;
        }

        cells
    }

    /// The style layer `resolve_cells` computes internally, exposed for
    /// worksheet-level XML emission (column widths, row heights, display
    /// flags, freeze panes, tab color, zoom) independent of the cell list.
    pub fn merged_style(&self, book_default: &SheetStyle) -> SheetStyle {
        self.effective_style(book_default).0
    }

    pub fn column_count(&self) -> usize {
        self.active_columns().len()
    }

    pub fn row_count(&self) -> usize {
        self.data().len()
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }
}

/// Overlay data-region border sides onto `style`, merged underneath any
/// border the cell's own style already carries (spec §4.2's border overlay
/// rules: "additional overrides base", with the cell's explicit border as
/// the higher-priority side).
fn overlay_border(
    style: CellStyle,
    data_range: Option<CellRange>,
    data_border: Option<DataBorder>,
    row: u32,
    column: u32,
) -> CellStyle {
    let Some(range) = data_range else {
        return style;
    };
    if !range.contains(row, column) {
        return style;
    }
    let edges = range.edges_of(row, column);
    if !edges.any() {
        return style;
    }
    let border_style = data_border
        .map(|b| b.style.to_border_style())
        .unwrap_or(crate::style::BorderStyle::Thin);
    let overlay = Border::uniform(border_style, crate::color::Color::BLACK, edges);
    let mut merged_style = style;
    merged_style.border = Some(match merged_style.border {
        Some(existing) => existing.merge(&overlay),
        None => overlay,
    });
    merged_style
}

/// Resolve a column's terminal `OutputConfig` into the `CellValue` the
/// cell will carry, applying the nil-handling rule from spec §4.1: the
/// empty case produces `Empty` only when `KeepEmpty` left the value absent.
fn output_to_cell_value(output: OutputConfig) -> CellValue {
    match output {
        OutputConfig::Text(Some(s)) => CellValue::StringValue(s),
        OutputConfig::Text(None) => CellValue::Empty,
        OutputConfig::Int(Some(i)) => CellValue::IntValue(i),
        OutputConfig::Int(None) => CellValue::Empty,
        OutputConfig::Double(Some(d)) => CellValue::DoubleValue(d),
        OutputConfig::Double(None) => CellValue::Empty,
        OutputConfig::Bool(Some(b), expr) => CellValue::BoolValue(b, expr),
        OutputConfig::Bool(None, _) => CellValue::Empty,
        OutputConfig::Date(Some(dt)) => CellValue::DateValue(dt),
        OutputConfig::Date(None) => CellValue::Empty,
        OutputConfig::Url(Some(u)) => CellValue::URLValue(u),
        OutputConfig::Url(None) => CellValue::Empty,
        OutputConfig::Percentage(value, precision) => CellValue::Percentage(value, precision),
    }
}
