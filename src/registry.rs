//! Interning registries: the shared-string table and the style table, plus
//! the number-format derivation that ties `CellValue` to a `numFmt`.
//!
//! Both registries are insertion-ordered dedup maps, grounded on the
//! teacher's `fast_writer::shared_strings::SharedStrings` (`Vec<String>` +
//! `HashMap<String, u32>`). Here they are built on `indexmap::IndexMap`,
//! which is already declared in the teacher's `Cargo.toml` but unused in
//! its `src/`; it is the exact tool for an ordered, insertion-deduped map
//! from value to index.

use crate::cell::CellValue;
use crate::style::{Alignment, Border, CellStyle, Fill, Font, NumberFormat};
use indexmap::IndexMap;

/// Deduplicates strings in insertion order; `intern` is idempotent.
#[derive(Debug, Default)]
pub struct SharedStringRegistry {
    index: IndexMap<String, u32>,
    /// Total number of references made via `intern`, including repeats;
    /// distinct from `index.len()`, the unique count.
    reference_count: u64,
}

impl SharedStringRegistry {
    pub fn new() -> Self {
        SharedStringRegistry::default()
    }

    /// Intern `s`, returning its stable zero-based index.
    pub fn intern(&mut self, s: &str) -> u32 {
        self.reference_count += 1;
        if let Some(&index) = self.index.get(s) {
            return index;
        }
        let index = self.index.len() as u32;
        self.index.insert(s.to_string(), index);
        index
    }

    pub fn unique_count(&self) -> usize {
        self.index.len()
    }

    pub fn reference_count(&self) -> u64 {
        self.reference_count
    }

    /// Strings in insertion order, for XML emission.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|s| s.as_str())
    }
}

/// Resolved, composite style a cell embeds: indices into each sub-table
/// plus the style registry's own index for the composite itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedStyle {
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub alignment_id: u32,
    pub number_format_id: u32,
}

/// A normalized numFmt: either one of Excel's built-in ids or a custom
/// format code interned into its own sub-table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NumFmtKey {
    Builtin(u32),
    Custom(String),
}

/// Interning tables for fonts, fills, borders, alignments, number formats,
/// and the composite `ResolvedStyle`. Index 0 of every sub-table is the
/// Excel-mandated default, seeded at construction (spec §4.3).
pub struct StyleRegistry {
    fonts: IndexMap<FontKey, u32>,
    fills: IndexMap<FillKey, u32>,
    borders: IndexMap<BorderKey, u32>,
    alignments: IndexMap<Alignment, u32>,
    number_formats: IndexMap<NumFmtKey, u32>,
    composites: IndexMap<ResolvedStyle, u32>,
    next_custom_numfmt_id: u32,
}

/// `Font`/`Fill`/`Border` are not `Eq`/`Hash` (they carry `f64`/arbitrary
/// strings through `Option`), so the registry keys on a normalized,
/// hashable projection instead of the style types themselves. The XML
/// writer reads these projections directly rather than round-tripping
/// back through the public style types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub name: String,
    size_millis: i64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    color: Option<(u8, u8, u8, u8)>,
}

impl FontKey {
    pub fn size(&self) -> f64 {
        self.size_millis as f64 / 1000.0
    }

    pub fn color_hex(&self) -> Option<String> {
        self.color
            .map(|(a, r, g, b)| format!("{a:02X}{r:02X}{g:02X}{b:02X}"))
    }
}

impl From<&Font> for FontKey {
    fn from(f: &Font) -> Self {
        FontKey {
            name: f.name.clone().unwrap_or_else(|| "Calibri".to_string()),
            size_millis: (f.size.unwrap_or(11.0) * 1000.0).round() as i64,
            bold: f.bold.unwrap_or(false),
            italic: f.italic.unwrap_or(false),
            underline: f.underline.unwrap_or(false),
            color: f.color.map(|c| (c.alpha, c.red, c.green, c.blue)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FillKey {
    pub pattern: crate::style::FillPattern,
    foreground: Option<(u8, u8, u8, u8)>,
    background: Option<(u8, u8, u8, u8)>,
}

impl FillKey {
    pub fn foreground_hex(&self) -> Option<String> {
        self.foreground
            .map(|(a, r, g, b)| format!("{a:02X}{r:02X}{g:02X}{b:02X}"))
    }

    pub fn background_hex(&self) -> Option<String> {
        self.background
            .map(|(a, r, g, b)| format!("{a:02X}{r:02X}{g:02X}{b:02X}"))
    }
}

impl From<&Fill> for FillKey {
    fn from(f: &Fill) -> Self {
        FillKey {
            pattern: f.pattern,
            foreground: f.foreground.map(|c| (c.alpha, c.red, c.green, c.blue)),
            background: f.background.map(|c| (c.alpha, c.red, c.green, c.blue)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderKey(pub Border);

impl From<&Border> for BorderKey {
    fn from(b: &Border) -> Self {
        BorderKey(*b)
    }
}

impl StyleRegistry {
    pub fn new() -> Self {
        let mut registry = StyleRegistry {
            fonts: IndexMap::new(),
            fills: IndexMap::new(),
            borders: IndexMap::new(),
            alignments: IndexMap::new(),
            number_formats: IndexMap::new(),
            composites: IndexMap::new(),
            next_custom_numfmt_id: 164, // first id outside Excel's built-in range
        };

        registry.intern_font(&FontKey::from(&Font::default()));
        registry.intern_fill(&FillKey::from(&Fill::default()));
        registry.intern_border(&BorderKey::from(&Border::default()));
        registry.intern_alignment(&Alignment::default());
        registry.intern_number_format(&NumFmtKey::Builtin(0));

        registry
    }

    fn intern_font(&mut self, key: &FontKey) -> u32 {
        if let Some(&id) = self.fonts.get(key) {
            return id;
        }
        let id = self.fonts.len() as u32;
        self.fonts.insert(key.clone(), id);
        id
    }

    fn intern_fill(&mut self, key: &FillKey) -> u32 {
        if let Some(&id) = self.fills.get(key) {
            return id;
        }
        let id = self.fills.len() as u32;
        self.fills.insert(key.clone(), id);
        id
    }

    fn intern_border(&mut self, key: &BorderKey) -> u32 {
        if let Some(&id) = self.borders.get(key) {
            return id;
        }
        let id = self.borders.len() as u32;
        self.borders.insert(*key, id);
        id
    }

    fn intern_alignment(&mut self, alignment: &Alignment) -> u32 {
        if let Some(&id) = self.alignments.get(alignment) {
            return id;
        }
        let id = self.alignments.len() as u32;
        self.alignments.insert(*alignment, id);
        id
    }

    fn intern_number_format(&mut self, key: &NumFmtKey) -> u32 {
        if let Some(&id) = self.number_formats.get(key) {
            return id;
        }
        let id = match key {
            NumFmtKey::Builtin(builtin_id) => *builtin_id,
            NumFmtKey::Custom(_) => {
                let id = self.next_custom_numfmt_id;
                self.next_custom_numfmt_id += 1;
                id
            }
        };
        self.number_formats.insert(key.clone(), id);
        id
    }

    /// Derive the number format a cell's value requires, honoring an
    /// explicit override on the style first (spec §4.3).
    fn derive_number_format(style: &CellStyle, value: &CellValue) -> NumFmtKey {
        if let Some(explicit) = &style.number_format {
            return match explicit {
                NumberFormat::Builtin(id) => NumFmtKey::Builtin(*id),
                NumberFormat::Custom(code) => NumFmtKey::Custom(code.clone()),
            };
        }

        match value {
            CellValue::DateValue(_) | CellValue::OptionalDate(Some(_)) => {
                NumFmtKey::Custom("yyyy-mm-dd hh:mm:ss".to_string())
            }
            CellValue::Percentage(Some(_), precision) => {
                if *precision == 0 {
                    NumFmtKey::Custom("0%".to_string())
                } else {
                    NumFmtKey::Custom(format!("0.{}%", "0".repeat(*precision as usize)))
                }
            }
            _ => NumFmtKey::Builtin(0),
        }
    }

    /// Intern `style` merged with the number format `value` requires,
    /// returning the composite `cellXfs` index cells embed (spec §4.3).
    pub fn intern(&mut self, style: &CellStyle, value: &CellValue) -> u32 {
        let font = style.font.clone().unwrap_or_default();
        let fill = style.fill.clone().unwrap_or_default();
        let border = style.border.unwrap_or_default();
        let alignment = style.alignment.unwrap_or_default();
        let numfmt_key = Self::derive_number_format(style, value);

        let resolved = ResolvedStyle {
            font_id: self.intern_font(&FontKey::from(&font)),
            fill_id: self.intern_fill(&FillKey::from(&fill)),
            border_id: self.intern_border(&BorderKey::from(&border)),
            alignment_id: self.intern_alignment(&alignment),
            number_format_id: self.intern_number_format(&numfmt_key),
        };

        if let Some(&id) = self.composites.get(&resolved) {
            return id;
        }
        let id = self.composites.len() as u32;
        self.composites.insert(resolved, id);
        id
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn fill_count(&self) -> usize {
        self.fills.len()
    }

    pub fn border_count(&self) -> usize {
        self.borders.len()
    }

    pub fn cell_xfs_count(&self) -> usize {
        self.composites.len()
    }

    /// Fonts in insertion order, for `<fonts>` emission.
    pub fn fonts(&self) -> impl Iterator<Item = &FontKey> {
        self.fonts.keys()
    }

    /// Fills in insertion order, for `<fills>` emission.
    pub fn fills(&self) -> impl Iterator<Item = &FillKey> {
        self.fills.keys()
    }

    /// Borders in insertion order, for `<borders>` emission.
    pub fn borders(&self) -> impl Iterator<Item = &BorderKey> {
        self.borders.keys()
    }

    /// Alignments in insertion order, for `<cellXfs>` child `<alignment>` emission.
    pub fn alignments(&self) -> impl Iterator<Item = &Alignment> {
        self.alignments.keys()
    }

    /// Custom number formats in insertion order, for `<numFmts>` emission.
    /// Built-in formats (index < 164) need no `<numFmt>` declaration.
    pub fn custom_number_formats(&self) -> impl Iterator<Item = (u32, &str)> {
        self.number_formats.iter().filter_map(|(key, &id)| match key {
            NumFmtKey::Custom(code) => Some((id, code.as_str())),
            NumFmtKey::Builtin(_) => None,
        })
    }

    /// Composite `cellXfs` entries in insertion order.
    pub fn composites(&self) -> impl Iterator<Item = &ResolvedStyle> {
        self.composites.keys()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderStyle, HorizontalAlign};

    #[test]
    fn shared_string_intern_is_idempotent() {
        let mut registry = SharedStringRegistry::new();
        let a = registry.intern("hello");
        let b = registry.intern("world");
        let c = registry.intern("hello");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(c, 0);
        assert_eq!(registry.unique_count(), 2);
        assert_eq!(registry.reference_count(), 3);
    }

    #[test]
    fn shared_string_order_is_insertion_order() {
        let mut registry = SharedStringRegistry::new();
        registry.intern("b");
        registry.intern("a");
        let collected: Vec<&str> = registry.strings().collect();
        assert_eq!(collected, vec!["b", "a"]);
    }

    #[test]
    fn style_registry_seeds_default_at_index_zero() {
        let mut registry = StyleRegistry::new();
        let id = registry.intern(&CellStyle::default(), &CellValue::IntValue(1));
        assert_eq!(id, 0);
    }

    #[test]
    fn style_registry_dedupes_identical_styles() {
        let mut registry = StyleRegistry::new();
        let style = CellStyle {
            font: Some(Font {
                bold: Some(true),
                ..Font::default()
            }),
            ..CellStyle::default()
        };
        let a = registry.intern(&style, &CellValue::IntValue(1));
        let b = registry.intern(&style, &CellValue::IntValue(2));
        assert_eq!(a, b);
        assert_eq!(registry.cell_xfs_count(), 2); // default + this one
    }

    #[test]
    fn style_registry_distinguishes_different_fonts() {
        let mut registry = StyleRegistry::new();
        let bold = CellStyle {
            font: Some(Font {
                bold: Some(true),
                ..Font::default()
            }),
            ..CellStyle::default()
        };
        let italic = CellStyle {
            font: Some(Font {
                italic: Some(true),
                ..Font::default()
            }),
            ..CellStyle::default()
        };
        let a = registry.intern(&bold, &CellValue::IntValue(1));
        let b = registry.intern(&italic, &CellValue::IntValue(1));
        assert_ne!(a, b);
    }

    #[test]
    fn date_values_get_a_derived_number_format() {
        let mut registry = StyleRegistry::new();
        let date = chrono::DateTime::<chrono::FixedOffset>::from(
            chrono::Utc::now(),
        );
        let id = registry.intern(&CellStyle::default(), &CellValue::DateValue(date));
        // Distinct from the plain-integer default (index 0) because the
        // numFmt differs even though every other sub-style is default.
        assert_ne!(id, 0);
    }

    #[test]
    fn percentage_precision_affects_number_format() {
        let mut registry = StyleRegistry::new();
        let a = registry.intern(&CellStyle::default(), &CellValue::Percentage(Some(0.5), 2));
        let b = registry.intern(&CellStyle::default(), &CellValue::Percentage(Some(0.5), 0));
        assert_ne!(a, b);
    }

    #[test]
    fn explicit_number_format_override_is_honored() {
        let mut registry = StyleRegistry::new();
        let style = CellStyle {
            number_format: Some(NumberFormat::Builtin(14)),
            ..CellStyle::default()
        };
        let a = registry.intern(&style, &CellValue::IntValue(1));
        let b = registry.intern(&CellStyle::default(), &CellValue::IntValue(1));
        assert_ne!(a, b);
    }

    #[test]
    fn fill_and_border_and_alignment_participate_in_dedup() {
        let mut registry = StyleRegistry::new();
        let style = CellStyle {
            fill: Some(Fill::solid(crate::color::Color::rgb(1, 2, 3))),
            border: Some(Border::uniform(
                BorderStyle::Thin,
                crate::color::Color::BLACK,
                crate::range::RangeEdges {
                    top: true,
                    bottom: true,
                    left: true,
                    right: true,
                },
            )),
            alignment: Some(Alignment {
                horizontal: Some(HorizontalAlign::Center),
                ..Alignment::default()
            }),
            ..CellStyle::default()
        };
        let a = registry.intern(&style, &CellValue::IntValue(1));
        let b = registry.intern(&style, &CellValue::IntValue(1));
        assert_eq!(a, b);
        assert!(registry.fill_count() > 1);
        assert!(registry.border_count() > 1);
    }
}
