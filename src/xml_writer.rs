//! Low-allocation XML writer.
//!
//! Grounded almost verbatim on the teacher's `fast_writer::xml_writer::XmlWriter`
//! (buffer-then-flush, `start_element`/`attribute`/`write_escaped`); every
//! package part in this crate is built by collecting one of these into an
//! in-memory `Vec<u8>` before the part is handed to the ZIP writer (spec §5:
//! "the reference design collects per-entry bytes then hands them to the ZIP
//! writer").

use crate::error::Result;
use std::io::Write;

pub struct XmlWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W) -> Self {
        XmlWriter {
            writer,
            buffer: Vec::with_capacity(8192),
        }
    }

    #[inline]
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > 65536 {
            self.flush()?;
        }
        Ok(())
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_raw(s.as_bytes())
    }

    #[inline]
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.write_raw(b"<")?;
        self.write_str(name)
    }

    #[inline]
    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.write_raw(b"</")?;
        self.write_str(name)?;
        self.write_raw(b">")
    }

    #[inline]
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_raw(b" ")?;
        self.write_str(name)?;
        self.write_raw(b"=\"")?;
        self.write_escaped(value)?;
        self.write_raw(b"\"")
    }

    #[inline]
    pub fn attribute_int(&mut self, name: &str, value: i64) -> Result<()> {
        self.write_raw(b" ")?;
        self.write_str(name)?;
        self.write_raw(b"=\"")?;
        let mut buf = itoa::Buffer::new();
        self.write_str(buf.format(value))?;
        self.write_raw(b"\"")
    }

    /// Close the current start tag with `>` (element has children).
    #[inline]
    pub fn close_start_tag(&mut self) -> Result<()> {
        self.write_raw(b">")
    }

    /// Close the current start tag as self-closing (`/>`).
    #[inline]
    pub fn close_self_closing(&mut self) -> Result<()> {
        self.write_raw(b"/>")
    }

    #[inline]
    pub fn write_escaped(&mut self, text: &str) -> Result<()> {
        for byte in text.bytes() {
            match byte {
                b'&' => self.write_raw(b"&amp;")?,
                b'<' => self.write_raw(b"&lt;")?,
                b'>' => self.write_raw(b"&gt;")?,
                b'"' => self.write_raw(b"&quot;")?,
                b'\'' => self.write_raw(b"&apos;")?,
                _ => self.buffer.push(byte),
            }
        }
        if self.buffer.len() > 65536 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Consume the writer, returning the underlying sink after a final flush.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

/// Build a complete XML part into an in-memory buffer via `build`, prefixed
/// with the standard declaration.
pub fn build_part(build: impl FnOnce(&mut XmlWriter<Vec<u8>>) -> Result<()>) -> Result<Vec<u8>> {
    let mut writer = XmlWriter::new(Vec::with_capacity(4096));
    writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")?;
    build(&mut writer)?;
    writer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_element_with_attribute_and_text() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);
        writer.start_element("root").unwrap();
        writer.attribute("attr", "value").unwrap();
        writer.close_start_tag().unwrap();
        writer.write_str("content").unwrap();
        writer.end_element("root").unwrap();
        writer.flush().unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "<root attr=\"value\">content</root>"
        );
    }

    #[test]
    fn escapes_reserved_characters() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);
        writer.write_escaped("<a>&\"'b'\"</a>").unwrap();
        writer.flush().unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "&lt;a&gt;&amp;&quot;&apos;b&apos;&quot;&lt;/a&gt;"
        );
    }

    #[test]
    fn self_closing_element() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);
        writer.start_element("col").unwrap();
        writer.attribute_int("min", 1).unwrap();
        writer.close_self_closing().unwrap();
        writer.flush().unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "<col min=\"1\"/>");
    }

    #[test]
    fn build_part_prefixes_declaration() {
        let bytes = build_part(|w| {
            w.start_element("root")?;
            w.close_self_closing()
        })
        .unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n"));
        assert!(xml.ends_with("<root/>"));
    }
}
