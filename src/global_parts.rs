//! The eight mandatory package parts that are not per-sheet worksheets
//! (spec §4.7, §6): `[Content_Types].xml`, `_rels/.rels`, `docProps/app.xml`,
//! `docProps/core.xml`, `xl/workbook.xml`, `xl/_rels/workbook.xml.rels`,
//! `xl/styles.xml`, `xl/sharedStrings.xml`.
//!
//! Grounded on the teacher's hard-coded `write_content_types`/
//! `write_workbook_xml`/`write_workbook_rels`/`write_root_rels`/
//! `write_core_props`/`write_app_props` in `fast_writer/workbook.rs`,
//! generalized to vary with sheet count/names and the style/shared-string
//! registry sizes instead of being fixed strings.

use crate::error::Result;
use crate::registry::{SharedStringRegistry, StyleRegistry};
use crate::style::{Alignment, BorderStyle, FillPattern, HorizontalAlign, VerticalAlign};
use crate::xml_writer::build_part;

/// A sheet's declared identity, as assigned by the orchestrator.
pub struct SheetMeta {
    pub sheet_id: u32,
    pub name: String,
}

pub fn content_types(sheets: &[SheetMeta]) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("Types")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/package/2006/content-types",
        )?;
        w.close_start_tag()?;

        w.start_element("Default")?;
        w.attribute("Extension", "rels")?;
        w.attribute(
            "ContentType",
            "application/vnd.openxmlformats-package.relationships+xml",
        )?;
        w.close_self_closing()?;

        w.start_element("Default")?;
        w.attribute("Extension", "xml")?;
        w.attribute("ContentType", "application/xml")?;
        w.close_self_closing()?;

        for part in [
            ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
            ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
            ("/xl/styles.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"),
            ("/xl/workbook.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
            ("/xl/sharedStrings.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"),
        ] {
            w.start_element("Override")?;
            w.attribute("PartName", part.0)?;
            w.attribute("ContentType", part.1)?;
            w.close_self_closing()?;
        }

        for sheet in sheets {
            w.start_element("Override")?;
            w.attribute(
                "PartName",
                &format!("/xl/worksheets/sheet{}.xml", sheet.sheet_id),
            )?;
            w.attribute(
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            )?;
            w.close_self_closing()?;
        }

        w.end_element("Types")
    })
}

pub fn root_rels() -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("Relationships")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/package/2006/relationships",
        )?;
        w.close_start_tag()?;

        for (id, rel_type, target) in [
            (
                "rId1",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
                "xl/workbook.xml",
            ),
            (
                "rId2",
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
                "docProps/core.xml",
            ),
            (
                "rId3",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
                "docProps/app.xml",
            ),
        ] {
            w.start_element("Relationship")?;
            w.attribute("Id", id)?;
            w.attribute("Type", rel_type)?;
            w.attribute("Target", target)?;
            w.close_self_closing()?;
        }

        w.end_element("Relationships")
    })
}

pub fn workbook_xml(sheets: &[SheetMeta]) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("workbook")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        w.attribute(
            "xmlns:r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        )?;
        w.close_start_tag()?;

        w.start_element("bookViews")?;
        w.close_start_tag()?;
        w.start_element("workbookView")?;
        w.close_self_closing()?;
        w.end_element("bookViews")?;

        w.start_element("sheets")?;
        w.close_start_tag()?;
        for sheet in sheets {
            w.start_element("sheet")?;
            w.attribute("name", &sheet.name)?;
            w.attribute_int("sheetId", sheet.sheet_id as i64)?;
            w.attribute("r:id", &format!("rId{}", sheet.sheet_id))?;
            w.close_self_closing()?;
        }
        w.end_element("sheets")?;

        w.end_element("workbook")
    })
}

pub fn workbook_rels(sheets: &[SheetMeta]) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("Relationships")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/package/2006/relationships",
        )?;
        w.close_start_tag()?;

        for sheet in sheets {
            w.start_element("Relationship")?;
            w.attribute("Id", &format!("rId{}", sheet.sheet_id))?;
            w.attribute(
                "Type",
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet",
            )?;
            w.attribute(
                "Target",
                &format!("worksheets/sheet{}.xml", sheet.sheet_id),
            )?;
            w.close_self_closing()?;
        }

        let styles_rid = sheets.len() as u32 + 1;
        let strings_rid = styles_rid + 1;

        w.start_element("Relationship")?;
        w.attribute("Id", &format!("rId{styles_rid}"))?;
        w.attribute(
            "Type",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
        )?;
        w.attribute("Target", "styles.xml")?;
        w.close_self_closing()?;

        w.start_element("Relationship")?;
        w.attribute("Id", &format!("rId{strings_rid}"))?;
        w.attribute(
            "Type",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings",
        )?;
        w.attribute("Target", "sharedStrings.xml")?;
        w.close_self_closing()?;

        w.end_element("Relationships")
    })
}

pub fn core_props(title: Option<&str>, author: Option<&str>, timestamp_iso8601: &str) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("cp:coreProperties")?;
        w.attribute(
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        )?;
        w.attribute("xmlns:dc", "http://purl.org/dc/elements/1.1/")?;
        w.attribute("xmlns:dcterms", "http://purl.org/dc/terms/")?;
        w.attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")?;
        w.close_start_tag()?;

        if let Some(title) = title {
            w.start_element("dc:title")?;
            w.close_start_tag()?;
            w.write_escaped(title)?;
            w.end_element("dc:title")?;
        }
        if let Some(author) = author {
            w.start_element("dc:creator")?;
            w.close_start_tag()?;
            w.write_escaped(author)?;
            w.end_element("dc:creator")?;
        }

        w.start_element("dcterms:created")?;
        w.attribute("xsi:type", "dcterms:W3CDTF")?;
        w.close_start_tag()?;
        w.write_str(timestamp_iso8601)?;
        w.end_element("dcterms:created")?;

        w.start_element("dcterms:modified")?;
        w.attribute("xsi:type", "dcterms:W3CDTF")?;
        w.close_start_tag()?;
        w.write_str(timestamp_iso8601)?;
        w.end_element("dcterms:modified")?;

        w.end_element("cp:coreProperties")
    })
}

pub fn app_props(sheet_names: &[String], company: Option<&str>) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("Properties")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )?;
        w.attribute(
            "xmlns:vt",
            "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
        )?;
        w.close_start_tag()?;

        w.start_element("Company")?;
        w.close_start_tag()?;
        if let Some(company) = company {
            w.write_escaped(company)?;
        }
        w.end_element("Company")?;

        w.start_element("HeadingPairs")?;
        w.close_start_tag()?;
        w.start_element("vt:vector")?;
        w.attribute("size", "2")?;
        w.attribute("baseType", "variant")?;
        w.close_start_tag()?;
        w.start_element("vt:variant")?;
        w.close_start_tag()?;
        w.start_element("vt:lpstr")?;
        w.close_start_tag()?;
        w.write_str("Worksheets")?;
        w.end_element("vt:lpstr")?;
        w.end_element("vt:variant")?;
        w.start_element("vt:variant")?;
        w.close_start_tag()?;
        w.start_element("vt:i4")?;
        w.close_start_tag()?;
        w.write_str(&sheet_names.len().to_string())?;
        w.end_element("vt:i4")?;
        w.end_element("vt:variant")?;
        w.end_element("vt:vector")?;
        w.end_element("HeadingPairs")?;

        w.start_element("TitlesOfParts")?;
        w.close_start_tag()?;
        w.start_element("vt:vector")?;
        w.attribute("size", &sheet_names.len().to_string())?;
        w.attribute("baseType", "lpstr")?;
        w.close_start_tag()?;
        for name in sheet_names {
            w.start_element("vt:lpstr")?;
            w.close_start_tag()?;
            w.write_escaped(name)?;
            w.end_element("vt:lpstr")?;
        }
        w.end_element("vt:vector")?;
        w.end_element("TitlesOfParts")?;

        w.end_element("Properties")
    })
}

pub fn shared_strings_xml(registry: &SharedStringRegistry) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("sst")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        w.attribute_int("count", registry.reference_count() as i64)?;
        w.attribute_int("uniqueCount", registry.unique_count() as i64)?;
        w.close_start_tag()?;

        for s in registry.strings() {
            w.start_element("si")?;
            w.close_start_tag()?;
            w.start_element("t")?;
            if s.starts_with(' ') || s.ends_with(' ') {
                w.attribute("xml:space", "preserve")?;
            }
            w.close_start_tag()?;
            w.write_escaped(s)?;
            w.end_element("t")?;
            w.end_element("si")?;
        }

        w.end_element("sst")
    })
}

fn alignment_attrs(alignment: Alignment) -> Option<(Option<&'static str>, Option<&'static str>, bool)> {
    if alignment.horizontal.is_none() && alignment.vertical.is_none() && alignment.wrap_text.is_none() {
        return None;
    }
    let horizontal = alignment.horizontal.map(|h| match h {
        HorizontalAlign::General => "general",
        HorizontalAlign::Left => "left",
        HorizontalAlign::Center => "center",
        HorizontalAlign::Right => "right",
    });
    let vertical = alignment.vertical.map(|v| match v {
        VerticalAlign::Top => "top",
        VerticalAlign::Center => "center",
        VerticalAlign::Bottom => "bottom",
    });
    Some((horizontal, vertical, alignment.wrap_text.unwrap_or(false)))
}

fn border_style_name(style: BorderStyle) -> &'static str {
    match style {
        BorderStyle::Thin => "thin",
        BorderStyle::Medium => "medium",
        BorderStyle::Thick => "thick",
        BorderStyle::Dashed => "dashed",
        BorderStyle::Dotted => "dotted",
        BorderStyle::Double => "double",
    }
}

/// Emit `xl/styles.xml` from every sub-table the registry interned, in
/// insertion order, per spec §4.3's "`count` must equal the number of
/// children" contract.
pub fn styles_xml(registry: &StyleRegistry) -> Result<Vec<u8>> {
    build_part(|w| {
        w.start_element("styleSheet")?;
        w.attribute(
            "xmlns",
            "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        )?;
        w.close_start_tag()?;

        let custom_formats: Vec<(u32, String)> = registry
            .custom_number_formats()
            .map(|(id, code)| (id, code.to_string()))
            .collect();
        if !custom_formats.is_empty() {
            w.start_element("numFmts")?;
            w.attribute_int("count", custom_formats.len() as i64)?;
            w.close_start_tag()?;
            for (id, code) in &custom_formats {
                w.start_element("numFmt")?;
                w.attribute_int("numFmtId", *id as i64)?;
                w.attribute("formatCode", code)?;
                w.close_self_closing()?;
            }
            w.end_element("numFmts")?;
        }

        let fonts: Vec<_> = registry.fonts().collect();
        w.start_element("fonts")?;
        w.attribute_int("count", fonts.len() as i64)?;
        w.close_start_tag()?;
        for font in &fonts {
            w.start_element("font")?;
            w.close_start_tag()?;
            if font.bold {
                w.write_str("<b/>")?;
            }
            if font.italic {
                w.write_str("<i/>")?;
            }
            if font.underline {
                w.write_str("<u/>")?;
            }
            w.start_element("sz")?;
            w.attribute("val", &font.size().to_string())?;
            w.close_self_closing()?;
            if let Some(hex) = font.color_hex() {
                w.start_element("color")?;
                w.attribute("rgb", &hex)?;
                w.close_self_closing()?;
            }
            w.start_element("name")?;
            w.attribute("val", &font.name)?;
            w.close_self_closing()?;
            w.end_element("font")?;
        }
        w.end_element("fonts")?;

        let fills: Vec<_> = registry.fills().collect();
        w.start_element("fills")?;
        w.attribute_int("count", fills.len() as i64)?;
        w.close_start_tag()?;
        for fill in &fills {
            w.start_element("fill")?;
            w.close_start_tag()?;
            w.start_element("patternFill")?;
            let pattern = match fill.pattern {
                FillPattern::None => "none",
                FillPattern::Solid => "solid",
                FillPattern::Gray125 => "gray125",
            };
            w.attribute("patternType", pattern)?;
            if fill.foreground_hex().is_some() || fill.background_hex().is_some() {
                w.close_start_tag()?;
                if let Some(hex) = fill.foreground_hex() {
                    w.start_element("fgColor")?;
                    w.attribute("rgb", &hex)?;
                    w.close_self_closing()?;
                }
                if let Some(hex) = fill.background_hex() {
                    w.start_element("bgColor")?;
                    w.attribute("rgb", &hex)?;
                    w.close_self_closing()?;
                }
                w.end_element("patternFill")?;
            } else {
                w.close_self_closing()?;
            }
            w.end_element("fill")?;
        }
        w.end_element("fills")?;

        let borders: Vec<_> = registry.borders().collect();
        w.start_element("borders")?;
        w.attribute_int("count", borders.len() as i64)?;
        w.close_start_tag()?;
        for border_key in &borders {
            let border = border_key.0;
            w.start_element("border")?;
            w.close_start_tag()?;
            for (name, side) in [
                ("left", border.left),
                ("right", border.right),
                ("top", border.top),
                ("bottom", border.bottom),
            ] {
                w.start_element(name)?;
                if let Some(side) = side {
                    w.attribute("style", border_style_name(side.style))?;
                    w.close_start_tag()?;
                    w.start_element("color")?;
                    w.attribute("rgb", &side.color.to_hex())?;
                    w.close_self_closing()?;
                    w.end_element(name)?;
                } else {
                    w.close_self_closing()?;
                }
            }
            w.start_element("diagonal")?;
            w.close_self_closing()?;
            w.end_element("border")?;
        }
        w.end_element("borders")?;

        w.start_element("cellStyleXfs")?;
        w.attribute_int("count", 1)?;
        w.close_start_tag()?;
        w.start_element("xf")?;
        w.attribute_int("numFmtId", 0)?;
        w.attribute_int("fontId", 0)?;
        w.attribute_int("fillId", 0)?;
        w.attribute_int("borderId", 0)?;
        w.close_self_closing()?;
        w.end_element("cellStyleXfs")?;

        let alignments: Vec<_> = registry.alignments().collect();
        let composites: Vec<_> = registry.composites().collect();
        w.start_element("cellXfs")?;
        w.attribute_int("count", composites.len() as i64)?;
        w.close_start_tag()?;
        for composite in &composites {
            w.start_element("xf")?;
            w.attribute_int("numFmtId", composite.number_format_id as i64)?;
            w.attribute_int("fontId", composite.font_id as i64)?;
            w.attribute_int("fillId", composite.fill_id as i64)?;
            w.attribute_int("borderId", composite.border_id as i64)?;
            w.attribute_int("xfId", 0)?;
            if composite.number_format_id != 0 {
                w.attribute("applyNumberFormat", "1")?;
            }
            if composite.font_id != 0 {
                w.attribute("applyFont", "1")?;
            }
            if composite.fill_id != 0 {
                w.attribute("applyFill", "1")?;
            }
            if composite.border_id != 0 {
                w.attribute("applyBorder", "1")?;
            }
            let alignment = alignments.get(composite.alignment_id as usize).copied();
            let attrs = alignment.and_then(alignment_attrs);
            if let Some((horizontal, vertical, wrap)) = attrs {
                w.attribute("applyAlignment", "1")?;
                w.close_start_tag()?;
                w.start_element("alignment")?;
                if let Some(h) = horizontal {
                    w.attribute("horizontal", h)?;
                }
                if let Some(v) = vertical {
                    w.attribute("vertical", v)?;
                }
                if wrap {
                    w.attribute("wrapText", "1")?;
                }
                w.close_self_closing()?;
                w.end_element("xf")?;
            } else {
                w.close_self_closing()?;
            }
        }
        w.end_element("cellXfs")?;

        w.start_element("cellStyles")?;
        w.attribute_int("count", 1)?;
        w.close_start_tag()?;
        w.start_element("cellStyle")?;
        w.attribute("name", "Normal")?;
        w.attribute_int("xfId", 0)?;
        w.attribute_int("builtinId", 0)?;
        w.close_self_closing()?;
        w.end_element("cellStyles")?;

        w.end_element("styleSheet")
    })
}
