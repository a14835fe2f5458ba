//! The style model: `CellStyle` and its field-wise merge, plus the
//! sheet/book-level style layers that sit above it.
//!
//! Grounded on the teacher's `CellStyle` enum of style presets
//! (`src/types.rs`), generalized from a closed set of named presets into a
//! structural, field-wise mergeable style, since this port composes styles
//! from independently-set header/body/sheet/book layers rather than
//! picking one of fourteen fixed looks.

use crate::color::Color;
use std::collections::HashMap;

/// Font weight/slant/underline and color (spec §4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<Color>,
}

impl Font {
    pub fn merge(&self, base: &Font) -> Font {
        Font {
            name: self.name.clone().or_else(|| base.name.clone()),
            size: self.size.or(base.size),
            bold: self.bold.or(base.bold),
            italic: self.italic.or(base.italic),
            underline: self.underline.or(base.underline),
            color: self.color.or(base.color),
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Font {
            name: Some("Calibri".to_string()),
            size: Some(11.0),
            bold: None,
            italic: None,
            underline: None,
            color: None,
        }
    }
}

/// Solid background fill. Excel's "no fill" is represented by `None` at the
/// `CellStyle` level, not by a variant here.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub pattern: FillPattern,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillPattern {
    None,
    Solid,
    Gray125,
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Fill {
            pattern: FillPattern::Solid,
            foreground: Some(color),
            background: None,
        }
    }

    pub fn merge(&self, base: &Fill) -> Fill {
        Fill {
            pattern: self.pattern,
            foreground: self.foreground.or(base.foreground),
            background: self.background.or(base.background),
        }
    }
}

impl Default for Fill {
    fn default() -> Self {
        Fill {
            pattern: FillPattern::None,
            foreground: None,
            background: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

/// One edge of a cell border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderSide {
    pub style: BorderStyle,
    pub color: Color,
}

/// A cell's four borders. Each side is independently nullable so the
/// data-region overlay (spec §4.2) can set exactly the edges a cell
/// touches without disturbing the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Border {
    pub left: Option<BorderSide>,
    pub right: Option<BorderSide>,
    pub top: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
}

impl Border {
    pub fn uniform(style: BorderStyle, color: Color, sides: crate::range::RangeEdges) -> Border {
        let side = BorderSide { style, color };
        Border {
            left: sides.left.then_some(side),
            right: sides.right.then_some(side),
            top: sides.top.then_some(side),
            bottom: sides.bottom.then_some(side),
        }
    }

    /// Field-wise "additional overrides base when non-null" (spec §3).
    pub fn merge(&self, base: &Border) -> Border {
        Border {
            left: self.left.or(base.left),
            right: self.right.or(base.right),
            top: self.top.or(base.top),
            bottom: self.bottom.or(base.bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub wrap_text: Option<bool>,
}

impl Alignment {
    pub fn merge(&self, base: &Alignment) -> Alignment {
        Alignment {
            horizontal: self.horizontal.or(base.horizontal),
            vertical: self.vertical.or(base.vertical),
            wrap_text: self.wrap_text.or(base.wrap_text),
        }
    }
}

/// An explicit number format override on a `CellStyle` (spec §4.3). When
/// absent, the style registry derives a format from the cell's `CellValue`
/// variant instead (date/percentage get a derived format, everything else
/// falls back to `General`).
#[derive(Debug, Clone, PartialEq)]
pub enum NumberFormat {
    /// One of Excel's built-in numFmt ids (0 = General, 14 = date, ...).
    Builtin(u32),
    /// A custom format code, interned into the style registry's numFmt table.
    Custom(String),
}

/// A complete cell style: every sub-field nullable, merged field-wise with
/// "additional overrides base when non-null" (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellStyle {
    pub font: Option<Font>,
    pub fill: Option<Fill>,
    pub alignment: Option<Alignment>,
    pub border: Option<Border>,
    pub number_format: Option<NumberFormat>,
}

impl CellStyle {
    pub fn merge(&self, base: &CellStyle) -> CellStyle {
        CellStyle {
            font: merge_option(&self.font, &base.font, Font::merge),
            fill: merge_option(&self.fill, &base.fill, Fill::merge),
            alignment: merge_option(&self.alignment, &base.alignment, Alignment::merge),
            border: merge_option(&self.border, &base.border, |a: &Border, b: &Border| {
                a.merge(b)
            }),
            number_format: self
                .number_format
                .clone()
                .or_else(|| base.number_format.clone()),
        }
    }
}

/// `additional` wins field-wise over `base`; `None` defers to the other side.
fn merge_option<T: Clone>(
    additional: &Option<T>,
    base: &Option<T>,
    combine: impl Fn(&T, &T) -> T,
) -> Option<T> {
    match (additional, base) {
        (Some(a), Some(b)) => Some(combine(a, b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Column width, keyed by 1-based column index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    pub width: f64,
    pub is_custom: bool,
}

/// Excel's native character-width unit. Pixel/point units from foreign
/// sources are converted to characters at construction time (see
/// `from_pixels`) rather than carried through the writer, since
/// `<col width=.../>` is always expressed in characters.
impl ColumnWidth {
    pub fn characters(width: f64) -> Self {
        ColumnWidth {
            width,
            is_custom: true,
        }
    }

    /// Standard 7-pixel-per-character Calibri-11 approximation.
    pub fn from_pixels(pixels: f64) -> Self {
        ColumnWidth::characters(pixels / 7.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBorderStyle {
    Thin,
    Medium,
    Thick,
}

impl DataBorderStyle {
    pub fn to_border_style(self) -> BorderStyle {
        match self {
            DataBorderStyle::Thin => BorderStyle::Thin,
            DataBorderStyle::Medium => BorderStyle::Medium,
            DataBorderStyle::Thick => BorderStyle::Thick,
        }
    }
}

/// Data-region border settings (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBorder {
    pub enabled: bool,
    pub include_header: bool,
    pub style: DataBorderStyle,
}

impl Default for DataBorder {
    fn default() -> Self {
        DataBorder {
            enabled: false,
            include_header: true,
            style: DataBorderStyle::Thin,
        }
    }
}

/// Sheet-level display and default-style settings (spec §3's `SheetStyle`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetStyle {
    pub column_widths: HashMap<u32, ColumnWidth>,
    pub row_heights: HashMap<u32, f64>,
    pub default_column_width: Option<f64>,
    pub default_row_height: Option<f64>,
    pub show_gridlines: Option<bool>,
    pub show_row_col_headings: Option<bool>,
    pub show_zeros: Option<bool>,
    pub show_formulas: Option<bool>,
    pub show_outline_symbols: Option<bool>,
    pub show_page_breaks: Option<bool>,
    pub tab_color: Option<Color>,
    pub freeze_panes: Option<FreezePanes>,
    pub zoom: Option<u32>,
    pub data_border: Option<DataBorder>,
    pub header_style: Option<CellStyle>,
    pub body_style: Option<CellStyle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    pub rows: u32,
    pub columns: u32,
}

impl SheetStyle {
    pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;
    pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

    /// Force-override merge only (spec.md §9 Open Question, resolved in
    /// DESIGN.md): `self` (the higher-priority layer) wins field-wise
    /// wherever it is `Some`; map-valued fields union, with `self`'s keys
    /// winning on collision.
    pub fn merge(&self, base: &SheetStyle) -> SheetStyle {
        let mut column_widths = base.column_widths.clone();
        column_widths.extend(self.column_widths.clone());

        let mut row_heights = base.row_heights.clone();
        row_heights.extend(self.row_heights.clone());

        SheetStyle {
            column_widths,
            row_heights,
            default_column_width: self.default_column_width.or(base.default_column_width),
            default_row_height: self.default_row_height.or(base.default_row_height),
            show_gridlines: self.show_gridlines.or(base.show_gridlines),
            show_row_col_headings: self.show_row_col_headings.or(base.show_row_col_headings),
            show_zeros: self.show_zeros.or(base.show_zeros),
            show_formulas: self.show_formulas.or(base.show_formulas),
            show_outline_symbols: self.show_outline_symbols.or(base.show_outline_symbols),
            show_page_breaks: self.show_page_breaks.or(base.show_page_breaks),
            tab_color: self.tab_color.or(base.tab_color),
            freeze_panes: self.freeze_panes.or(base.freeze_panes),
            zoom: self.zoom.or(base.zoom).map(|z| z.clamp(10, 400)),
            data_border: self.data_border.or(base.data_border),
            header_style: merge_option(&self.header_style, &base.header_style, CellStyle::merge),
            body_style: merge_option(&self.body_style, &base.body_style, CellStyle::merge),
        }
    }

    pub fn resolved_column_width(&self) -> f64 {
        self.default_column_width.unwrap_or(Self::DEFAULT_COLUMN_WIDTH)
    }

    pub fn resolved_row_height(&self) -> f64 {
        self.default_row_height.unwrap_or(Self::DEFAULT_ROW_HEIGHT)
    }
}

/// Workbook-level defaults (spec §3's `Book` style fields).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookStyle {
    pub default_font: Option<Font>,
    pub default_header_style: Option<CellStyle>,
    pub default_body_style: Option<CellStyle>,
    pub default_sheet_style: SheetStyle,
    pub title: Option<String>,
    pub author: Option<String>,
    pub company: Option<String>,
}
