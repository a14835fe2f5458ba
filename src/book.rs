//! `Book`: the workbook orchestrator (spec §4.6).
//!
//! Grounded on the teacher's `fast_writer::workbook::FastWorkbook::close`
//! for the global-parts emission order, and `writer::ExcelWriter` for the
//! shape of the public facade wrapping the lower-level writer pieces.

use crate::atomic_write::write_atomically;
use crate::error::{Result, XlsxError};
use crate::global_parts::{self, SheetMeta};
use crate::progress::{FailureKind, ProgressBroadcaster, ProgressEvent};
use crate::registry::{SharedStringRegistry, StyleRegistry};
use crate::sheet::Sheet;
use crate::style::{BookStyle, CellStyle, SheetStyle};
use crate::worksheet_xml::build_worksheet_xml;
use crate::zip::{write_store_zip, ZipEntry};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// A boxed future local to the orchestrator's own `.await` points; unlike
/// `sheet::BoxFuture`, this carries no `Send` bound, since `Book::write_async`
/// drives every sheet sequentially on the caller's own task and never moves
/// the future across threads (spec §5: the orchestrator is single-threaded
/// cooperative).
type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// External logging sink a `Book` may hold (spec §2's "ambient stack"). The
/// crate never requires a logging-framework dependency itself; callers wire
/// up their own sink and receive the same lifecycle lines the progress
/// channel carries, as plain text.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Type-erases `Sheet<R>` over its record type `R` so a `Book` can hold
/// sheets of different record types side by side (spec §3's `Book` holding
/// heterogeneous `Sheet<R>` instances).
trait AnySheet {
    fn name(&self) -> String;
    fn load(&mut self) -> Result<()>;
    fn load_async(&mut self) -> LocalBoxFuture<'_, Result<()>>;
    fn merged_style(&self, book_default: &SheetStyle) -> SheetStyle;
    fn build_xml(
        &self,
        book_default_sheet_style: &SheetStyle,
        book_header_style: &CellStyle,
        book_body_style: &CellStyle,
        style_registry: &mut StyleRegistry,
        shared_strings: &mut SharedStringRegistry,
    ) -> Result<Vec<u8>>;
}

impl<R: 'static> AnySheet for Sheet<R> {
    fn name(&self) -> String {
        Sheet::name(self)
    }

    fn load(&mut self) -> Result<()> {
        Sheet::load(self)
    }

    fn load_async(&mut self) -> LocalBoxFuture<'_, Result<()>> {
        Box::pin(Sheet::load_async(self))
    }

    fn merged_style(&self, book_default: &SheetStyle) -> SheetStyle {
        Sheet::merged_style(self, book_default)
    }

    fn build_xml(
        &self,
        book_default_sheet_style: &SheetStyle,
        book_header_style: &CellStyle,
        book_body_style: &CellStyle,
        style_registry: &mut StyleRegistry,
        shared_strings: &mut SharedStringRegistry,
    ) -> Result<Vec<u8>> {
        let cells = self.resolve_cells(book_default_sheet_style, book_header_style, book_body_style);
        let merged = self.merged_style(book_default_sheet_style);
        build_worksheet_xml(&cells, &merged, style_registry, shared_strings)
    }
}

/// A complete workbook: workbook-level style defaults plus an ordered list
/// of sheets, each of a possibly distinct record type (spec §3).
pub struct Book {
    style: BookStyle,
    sheets: Vec<Box<dyn AnySheet>>,
    logger: Option<Arc<dyn Logger>>,
    progress: ProgressBroadcaster,
    cancel: Arc<AtomicBool>,
}

impl Book {
    pub fn new(style: BookStyle) -> Self {
        Book {
            style,
            sheets: Vec::new(),
            logger: None,
            progress: ProgressBroadcaster::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Append a sheet. Distinct calls may use distinct record types `R`.
    pub fn add_sheet<R: 'static>(mut self, sheet: Sheet<R>) -> Self {
        self.sheets.push(Box::new(sheet));
        self
    }

    /// Register a progress subscriber (spec §4.6, §5); multiple subscribers
    /// may register independently.
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<ProgressEvent> {
        self.progress.subscribe(capacity)
    }

    /// A handle the caller may store and set to request cancellation.
    /// Honored at the next sheet boundary (spec §5, §7).
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn log(&self, event: &ProgressEvent) {
        self.progress.publish(event.clone());
        if let Some(logger) = &self.logger {
            logger.log(&event.description());
        }
    }

    /// Reject duplicate sanitized sheet names before any bytes are written
    /// (spec §4.6's validation pass, resolved in SPEC_FULL.md §4.6).
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for sheet in &self.sheets {
            let name = sheet.name();
            if !seen.insert(name.clone()) {
                return Err(XlsxError::XmlValidation {
                    part: "xl/workbook.xml".to_string(),
                    reason: format!("duplicate sheet name '{name}' after sanitization"),
                });
            }
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(XlsxError::Cancelled);
        }
        Ok(())
    }

    /// Run the synchronous write pipeline (spec §4.6): validate, then
    /// sequentially load/resolve every sheet into worksheet XML sharing one
    /// style/shared-string registry pair, assemble the workbook-wide parts,
    /// pack everything into a STORE-method ZIP, and write it atomically.
    pub fn write(&mut self, destination: &Path) -> Result<()> {
        self.validate()?;

        let book_header_style = self.style.default_header_style.clone().unwrap_or_default();
        let book_body_style = self.style.default_body_style.clone().unwrap_or_default();
        let book_default_sheet_style = self.style.default_sheet_style.clone();

        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let sheet_count = self.sheets.len();
        let mut worksheet_parts = Vec::with_capacity(sheet_count);
        let mut sheet_metas = Vec::with_capacity(sheet_count);

        for (index, sheet) in self.sheets.iter_mut().enumerate() {
            if let Err(e) = self.check_cancelled() {
                self.log(&ProgressEvent::Failed(FailureKind::Cancelled));
                return Err(e);
            }

            let name = sheet.name();
            self.log(&ProgressEvent::SheetStart {
                sheet_index: index,
                sheet_count,
                sheet_name: name.clone(),
                progress_percentage: sheet_progress(index, sheet_count),
            });

            if let Err(e) = sheet.load() {
                self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
                return Err(e);
            }

            let xml = match sheet.build_xml(
                &book_default_sheet_style,
                &book_header_style,
                &book_body_style,
                &mut style_registry,
                &mut shared_strings,
            ) {
                Ok(xml) => xml,
                Err(e) => {
                    self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
                    return Err(e);
                }
            };

            worksheet_parts.push(xml);
            sheet_metas.push(SheetMeta {
                sheet_id: (index + 1) as u32,
                name,
            });

            self.log(&ProgressEvent::SheetDone {
                sheet_index: index,
                sheet_count,
                sheet_name: sheet_metas[index].name.clone(),
                progress_percentage: sheet_progress(index + 1, sheet_count),
            });
        }

        self.log(&ProgressEvent::GlobalPartsStart {
            progress_percentage: 0.9,
        });

        let archive = match self.assemble(&sheet_metas, worksheet_parts, &style_registry, &shared_strings) {
            Ok(archive) => archive,
            Err(e) => {
                self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
                return Err(e);
            }
        };

        if let Err(e) = write_atomically(destination, &archive) {
            self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
            return Err(e);
        }

        self.log(&ProgressEvent::Finished);
        Ok(())
    }

    /// The async counterpart to `write`, for sheets backed by
    /// `DataProvider::Async` (spec §5). Drives each sheet's `load_async`
    /// sequentially on the caller's own executor; no runtime is bundled.
    pub async fn write_async(&mut self, destination: &Path) -> Result<()> {
        self.validate()?;

        let book_header_style = self.style.default_header_style.clone().unwrap_or_default();
        let book_body_style = self.style.default_body_style.clone().unwrap_or_default();
        let book_default_sheet_style = self.style.default_sheet_style.clone();

        let mut style_registry = StyleRegistry::new();
        let mut shared_strings = SharedStringRegistry::new();
        let sheet_count = self.sheets.len();
        let mut worksheet_parts = Vec::with_capacity(sheet_count);
        let mut sheet_metas = Vec::with_capacity(sheet_count);

        for (index, sheet) in self.sheets.iter_mut().enumerate() {
            if let Err(e) = self.check_cancelled() {
                self.log(&ProgressEvent::Failed(FailureKind::Cancelled));
                return Err(e);
            }

            let name = sheet.name();
            self.log(&ProgressEvent::SheetStart {
                sheet_index: index,
                sheet_count,
                sheet_name: name.clone(),
                progress_percentage: sheet_progress(index, sheet_count),
            });

            if let Err(e) = sheet.load_async().await {
                self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
                return Err(e);
            }

            let xml = match sheet.build_xml(
                &book_default_sheet_style,
                &book_header_style,
                &book_body_style,
                &mut style_registry,
                &mut shared_strings,
            ) {
                Ok(xml) => xml,
                Err(e) => {
                    self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
                    return Err(e);
                }
            };

            worksheet_parts.push(xml);
            sheet_metas.push(SheetMeta {
                sheet_id: (index + 1) as u32,
                name,
            });

            self.log(&ProgressEvent::SheetDone {
                sheet_index: index,
                sheet_count,
                sheet_name: sheet_metas[index].name.clone(),
                progress_percentage: sheet_progress(index + 1, sheet_count),
            });
        }

        self.log(&ProgressEvent::GlobalPartsStart {
            progress_percentage: 0.9,
        });

        let archive = match self.assemble(&sheet_metas, worksheet_parts, &style_registry, &shared_strings) {
            Ok(archive) => archive,
            Err(e) => {
                self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
                return Err(e);
            }
        };

        if let Err(e) = write_atomically(destination, &archive) {
            self.log(&ProgressEvent::Failed(FailureKind::from_error(&e)));
            return Err(e);
        }

        self.log(&ProgressEvent::Finished);
        Ok(())
    }

    /// Build every workbook-wide XML part and pack the whole package into a
    /// STORE-method ZIP archive (spec §4.7, §4.5), in the conventional
    /// `[Content_Types].xml`-first order.
    fn assemble(
        &self,
        sheet_metas: &[SheetMeta],
        worksheet_parts: Vec<Vec<u8>>,
        style_registry: &StyleRegistry,
        shared_strings: &SharedStringRegistry,
    ) -> Result<Vec<u8>> {
        let sheet_names: Vec<String> = sheet_metas.iter().map(|m| m.name.clone()).collect();
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        let mut entries = Vec::with_capacity(8 + worksheet_parts.len());
        entries.push(ZipEntry::new(
            "[Content_Types].xml",
            global_parts::content_types(sheet_metas)?,
        ));
        entries.push(ZipEntry::new("_rels/.rels", global_parts::root_rels()?));
        entries.push(ZipEntry::new(
            "docProps/app.xml",
            global_parts::app_props(&sheet_names, self.style.company.as_deref())?,
        ));
        entries.push(ZipEntry::new(
            "docProps/core.xml",
            global_parts::core_props(
                self.style.title.as_deref(),
                self.style.author.as_deref(),
                &timestamp,
            )?,
        ));
        entries.push(ZipEntry::new(
            "xl/workbook.xml",
            global_parts::workbook_xml(sheet_metas)?,
        ));
        entries.push(ZipEntry::new(
            "xl/_rels/workbook.xml.rels",
            global_parts::workbook_rels(sheet_metas)?,
        ));
        entries.push(ZipEntry::new(
            "xl/styles.xml",
            global_parts::styles_xml(style_registry)?,
        ));
        entries.push(ZipEntry::new(
            "xl/sharedStrings.xml",
            global_parts::shared_strings_xml(shared_strings)?,
        ));

        for (meta, xml) in sheet_metas.iter().zip(worksheet_parts) {
            entries.push(ZipEntry::new(
                format!("xl/worksheets/sheet{}.xml", meta.sheet_id),
                xml,
            ));
        }

        Ok(write_store_zip(entries))
    }
}

/// Linear progress estimate across the sheet-loading phase, reserving the
/// final 10% for global-parts assembly (spec §4.6's progress percentages).
fn sheet_progress(sheets_done: usize, sheet_count: usize) -> f64 {
    if sheet_count == 0 {
        return 0.9;
    }
    0.9 * sheets_done as f64 / sheet_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnBuilder;
    use crate::sheet::DataProvider;

    struct Person {
        name: String,
    }

    fn sample_sheet(name: &str) -> Sheet<Person> {
        Sheet::new(
            name,
            true,
            SheetStyle::default(),
            vec![ColumnBuilder::<Person, String>::required("Name", |p| p.name.clone())
                .to_string_with(|s| s)],
            DataProvider::sync(|| {
                Ok(vec![Person {
                    name: "Alice".to_string(),
                }])
            }),
        )
    }

    #[test]
    fn validate_rejects_duplicate_sanitized_names() {
        let book = Book::new(BookStyle::default())
            .add_sheet(sample_sheet("Sheet"))
            .add_sheet(sample_sheet("Sheet"));
        assert!(book.validate().is_err());
    }

    #[test]
    fn validate_accepts_unique_names() {
        let book = Book::new(BookStyle::default())
            .add_sheet(sample_sheet("One"))
            .add_sheet(sample_sheet("Two"));
        assert!(book.validate().is_ok());
    }

    #[test]
    fn write_produces_a_non_empty_zip_with_eocd_signature() {
        let mut book = Book::new(BookStyle::default()).add_sheet(sample_sheet("People"));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        book.write(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        let eocd = 0x0605_4b50u32.to_le_bytes();
        assert!(bytes.windows(4).any(|w| w == eocd));
    }

    #[test]
    fn cancellation_is_honored_before_any_sheet_loads() {
        let mut book = Book::new(BookStyle::default()).add_sheet(sample_sheet("People"));
        book.cancellation_handle().store(true, Ordering::SeqCst);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let result = book.write(&path);
        assert!(matches!(result, Err(XlsxError::Cancelled)));
        assert!(!path.exists());
    }

    #[test]
    fn subscriber_observes_full_lifecycle() {
        let mut book = Book::new(BookStyle::default()).add_sheet(sample_sheet("People"));
        let receiver = book.subscribe(16);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        book.write(&path).unwrap();

        let events: Vec<_> = receiver.try_iter().collect();
        assert!(matches!(events.first(), Some(ProgressEvent::SheetStart { .. })));
        assert!(matches!(events.last(), Some(ProgressEvent::Finished)));
    }
}
