//! Per-sheet XML emission: turns a sheet's resolved cells into the bytes
//! for `xl/worksheets/sheet{n}.xml` (spec §4.2, §4.7), interning each
//! cell's style and string-like value into the book-wide registries as it
//! goes.
//!
//! Grounded on the teacher's `fast_writer::worksheet::FastWorksheet`
//! (`<row>`/`<c>`/`<v>` emission shape), extended with `<cols>`,
//! `<sheetViews>` (zoom, gridlines, freeze panes), `<sheetFormatPr>`, and
//! `<dimension>` per spec §3's `SheetStyle` fields.

use crate::cell::CellValue;
use crate::error::Result;
use crate::excel_date::to_excel_serial;
use crate::range::CellRef;
use crate::registry::{SharedStringRegistry, StyleRegistry};
use crate::sheet::ResolvedCell;
use crate::style::{CellStyle, SheetStyle};
use crate::xml_writer::{build_part, XmlWriter};

/// Render `cells` (as produced by `Sheet::resolve_cells`) into one
/// worksheet XML part, interning styles/strings into the shared registries.
pub fn build_worksheet_xml(
    cells: &[(ResolvedCell, CellStyle)],
    merged_style: &SheetStyle,
    style_registry: &mut StyleRegistry,
    shared_strings: &mut SharedStringRegistry,
) -> Result<Vec<u8>> {
    let max_row = cells.iter().map(|(c, _)| c.row).max().unwrap_or(0);
    let max_col = cells.iter().map(|(c, _)| c.column).max().unwrap_or(0);

    // Resolve style/shared-string ids up front: rows below only format bytes.
    let resolved: Vec<(u32, u32, u32, CellBody)> = cells
        .iter()
        .map(|(cell, style)| {
            let style_id = style_registry.intern(style, &cell.value);
            let body = resolve_body(&cell.value, shared_strings);
            (cell.row, cell.column, style_id, body)
        })
        .collect();

    build_part(|w| {
        w.start_element("worksheet")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        w.attribute(
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        )?;
        w.close_start_tag()?;

        if let Some(tab_color) = merged_style.tab_color {
            w.start_element("sheetPr")?;
            w.close_start_tag()?;
            w.start_element("tabColor")?;
            w.attribute("rgb", &tab_color.to_hex())?;
            w.close_self_closing()?;
            w.end_element("sheetPr")?;
        }

        w.start_element("dimension")?;
        if max_row == 0 || max_col == 0 {
            w.attribute("ref", "A1")?;
        } else {
            w.attribute(
                "ref",
                &format!("{}:{}", CellRef::new(1, 1), CellRef::new(max_row, max_col)),
            )?;
        }
        w.close_self_closing()?;

        write_sheet_views(w, merged_style)?;

        w.start_element("sheetFormatPr")?;
        w.attribute(
            "defaultRowHeight",
            &merged_style.resolved_row_height().to_string(),
        )?;
        w.attribute(
            "defaultColWidth",
            &merged_style.resolved_column_width().to_string(),
        )?;
        w.close_self_closing()?;

        if !merged_style.column_widths.is_empty() {
            let mut widths: Vec<(&u32, &crate::style::ColumnWidth)> =
                merged_style.column_widths.iter().collect();
            widths.sort_by_key(|(idx, _)| **idx);
            w.start_element("cols")?;
            w.close_start_tag()?;
            for (index, width) in widths {
                w.start_element("col")?;
                w.attribute_int("min", *index as i64)?;
                w.attribute_int("max", *index as i64)?;
                w.attribute("width", &width.width.to_string())?;
                if width.is_custom {
                    w.attribute("customWidth", "1")?;
                }
                w.close_self_closing()?;
            }
            w.end_element("cols")?;
        }

        w.start_element("sheetData")?;
        w.close_start_tag()?;

        let mut current_row: Option<u32> = None;
        for (row, column, style_id, body) in &resolved {
            if current_row != Some(*row) {
                if current_row.is_some() {
                    w.end_element("row")?;
                }
                w.start_element("row")?;
                w.attribute_int("r", *row as i64)?;
                if let Some(height) = merged_style.row_heights.get(row) {
                    w.attribute("ht", &height.to_string())?;
                    w.attribute("customHeight", "1")?;
                }
                w.close_start_tag()?;
                current_row = Some(*row);
            }
            write_cell(w, *row, *column, *style_id, body)?;
        }
        if current_row.is_some() {
            w.end_element("row")?;
        }
        w.end_element("sheetData")?;

        w.start_element("pageMargins")?;
        w.attribute("left", "0.7")?;
        w.attribute("right", "0.7")?;
        w.attribute("top", "0.75")?;
        w.attribute("bottom", "0.75")?;
        w.attribute("header", "0.3")?;
        w.attribute("footer", "0.3")?;
        w.close_self_closing()?;

        w.end_element("worksheet")
    })
}

fn write_sheet_views(w: &mut XmlWriter<Vec<u8>>, style: &SheetStyle) -> Result<()> {
    w.start_element("sheetViews")?;
    w.close_start_tag()?;
    w.start_element("sheetView")?;
    if style.show_gridlines == Some(false) {
        w.attribute("showGridLines", "0")?;
    }
    if style.show_row_col_headings == Some(false) {
        w.attribute("showRowColHeaders", "0")?;
    }
    if style.show_zeros == Some(false) {
        w.attribute("showZeros", "0")?;
    }
    if style.show_outline_symbols == Some(false) {
        w.attribute("showOutlineSymbols", "0")?;
    }
    w.attribute("zoomScale", &style.zoom.unwrap_or(100).to_string())?;
    w.attribute("workbookViewId", "0")?;

    if let Some(freeze) = style.freeze_panes {
        if freeze.rows > 0 || freeze.columns > 0 {
            w.close_start_tag()?;
            w.start_element("pane")?;
            if freeze.columns > 0 {
                w.attribute_int("xSplit", freeze.columns as i64)?;
            }
            if freeze.rows > 0 {
                w.attribute_int("ySplit", freeze.rows as i64)?;
            }
            let top_left = CellRef::new(freeze.rows + 1, freeze.columns + 1).to_string();
            w.attribute("topLeftCell", &top_left)?;
            w.attribute("activePane", "bottomRight")?;
            w.attribute("state", "frozen")?;
            w.close_self_closing()?;
            w.end_element("sheetView")?;
            w.end_element("sheetViews")?;
            return Ok(());
        }
    }
    w.close_self_closing()?;
    w.end_element("sheetViews")
}

/// What goes inside a cell's `<v>` element, if anything.
enum CellBody {
    None,
    Inline(String),
    Shared(u32),
    Native(bool),
}

/// Resolve a cell's value into its emitted body, interning string-like
/// values through `shared_strings` as it goes (spec §4.4's boolean
/// interaction rule: only `BoolExpr::OneZero` bypasses the registry).
fn resolve_body(value: &CellValue, shared_strings: &mut SharedStringRegistry) -> CellBody {
    match value {
        CellValue::StringValue(s) => CellBody::Shared(shared_strings.intern(s)),
        CellValue::OptionalString(Some(s)) => CellBody::Shared(shared_strings.intern(s)),
        CellValue::URLValue(u) => CellBody::Shared(shared_strings.intern(u)),
        CellValue::OptionalURL(Some(u)) => CellBody::Shared(shared_strings.intern(u)),
        CellValue::IntValue(i) => CellBody::Inline(i.to_string()),
        CellValue::OptionalInt(Some(i)) => CellBody::Inline(i.to_string()),
        CellValue::DoubleValue(d) => CellBody::Inline(d.to_string()),
        CellValue::OptionalDouble(Some(d)) => CellBody::Inline(d.to_string()),
        CellValue::DateValue(dt) => CellBody::Inline(to_excel_serial(dt).to_string()),
        CellValue::OptionalDate(Some(dt)) => CellBody::Inline(to_excel_serial(dt).to_string()),
        CellValue::Percentage(Some(d), _) => CellBody::Inline(d.to_string()),
        CellValue::BoolValue(b, expr) if expr.is_native() => CellBody::Native(*b),
        CellValue::BoolValue(b, expr) => CellBody::Shared(shared_strings.intern(expr.render(*b))),
        CellValue::OptionalBool(Some(b), expr) if expr.is_native() => CellBody::Native(*b),
        CellValue::OptionalBool(Some(b), expr) => {
            CellBody::Shared(shared_strings.intern(expr.render(*b)))
        }
        CellValue::Empty
        | CellValue::OptionalString(None)
        | CellValue::OptionalInt(None)
        | CellValue::OptionalDouble(None)
        | CellValue::OptionalDate(None)
        | CellValue::OptionalURL(None)
        | CellValue::OptionalBool(None, _)
        | CellValue::Percentage(None, _) => CellBody::None,
    }
}

fn write_cell(
    w: &mut XmlWriter<Vec<u8>>,
    row: u32,
    column: u32,
    style_id: u32,
    body: &CellBody,
) -> Result<()> {
    w.start_element("c")?;
    w.attribute("r", &CellRef::new(row, column).to_string())?;
    if style_id != 0 {
        w.attribute_int("s", style_id as i64)?;
    }
    match body {
        CellBody::None => {
            w.close_self_closing()?;
        }
        CellBody::Inline(text) => {
            w.close_start_tag()?;
            w.start_element("v")?;
            w.close_start_tag()?;
            w.write_str(text)?;
            w.end_element("v")?;
            w.end_element("c")?;
        }
        CellBody::Shared(index) => {
            w.attribute("t", "s")?;
            w.close_start_tag()?;
            w.start_element("v")?;
            w.close_start_tag()?;
            w.write_str(&index.to_string())?;
            w.end_element("v")?;
            w.end_element("c")?;
        }
        CellBody::Native(b) => {
            w.attribute("t", "b")?;
            w.close_start_tag()?;
            w.start_element("v")?;
            w.close_start_tag()?;
            w.write_str(if *b { "1" } else { "0" })?;
            w.end_element("v")?;
            w.end_element("c")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::BoolExpr;
    use crate::sheet::ResolvedCell;

    fn cell(row: u32, column: u32, value: CellValue) -> (ResolvedCell, CellStyle) {
        (
            ResolvedCell {
                row,
                column,
                value,
                style_id: None,
                shared_string_id: None,
            },
            CellStyle::default(),
        )
    }

    #[test]
    fn string_cell_is_interned_and_referenced() {
        let cells = vec![cell(1, 1, CellValue::StringValue("Name".to_string()))];
        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let xml = build_worksheet_xml(
            &cells,
            &SheetStyle::default(),
            &mut style_registry,
            &mut shared_strings,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("t=\"s\""));
        assert!(xml.contains("<v>0</v>"));
        assert_eq!(shared_strings.unique_count(), 1);
    }

    #[test]
    fn one_zero_bool_is_native_not_shared() {
        let cells = vec![cell(1, 1, CellValue::BoolValue(true, BoolExpr::OneZero))];
        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let xml = build_worksheet_xml(
            &cells,
            &SheetStyle::default(),
            &mut style_registry,
            &mut shared_strings,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("t=\"b\""));
        assert!(xml.contains("<v>1</v>"));
        assert_eq!(shared_strings.unique_count(), 0);
    }

    #[test]
    fn yes_no_bool_is_shared_string() {
        let cells = vec![cell(1, 1, CellValue::BoolValue(true, BoolExpr::YesNo))];
        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let xml = build_worksheet_xml(
            &cells,
            &SheetStyle::default(),
            &mut style_registry,
            &mut shared_strings,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("t=\"s\""));
        assert_eq!(shared_strings.unique_count(), 1);
        assert_eq!(shared_strings.strings().next(), Some("YES"));
    }

    #[test]
    fn empty_cell_has_no_value_element() {
        let cells = vec![cell(1, 1, CellValue::Empty)];
        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let xml = build_worksheet_xml(
            &cells,
            &SheetStyle::default(),
            &mut style_registry,
            &mut shared_strings,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(!xml.contains("<v>"));
        assert!(xml.contains("<c r=\"A1\"/>"));
    }

    #[test]
    fn dimension_spans_every_emitted_cell() {
        let cells = vec![
            cell(1, 1, CellValue::IntValue(1)),
            cell(3, 2, CellValue::IntValue(2)),
        ];
        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let xml = build_worksheet_xml(
            &cells,
            &SheetStyle::default(),
            &mut style_registry,
            &mut shared_strings,
        )
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("ref=\"A1:B3\""));
    }
}
