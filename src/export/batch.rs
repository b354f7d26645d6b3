//! Multi-page export.
//!
//! Each page is switched to, converted and encoded on its own. With more
//! than one page the encoded documents are collected into a ZIP archive and
//! pages that fail are left out of it.

use std::io::{Cursor, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, Timelike, Utc};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::converter::ExportConverter;
use crate::codec::DocumentCodec;
use crate::error::{Error, Result};
use crate::fonts::FontResolver;
use crate::model::Project;
use crate::options::{ConvertOptions, PageSelection};
use crate::report::{ExportReport, PageOutcome};

/// Switches a project's active page and switches it back when dropped.
pub struct ActivePageGuard<'p> {
    project: &'p mut Project,
    saved: Option<String>,
}

impl<'p> ActivePageGuard<'p> {
    /// Make `page_id` the active page.
    pub fn switch(project: &'p mut Project, page_id: &str) -> Result<Self> {
        let saved = project.active_page().map(str::to_string);
        project.set_active_page(Some(page_id))?;
        Ok(Self { project, saved })
    }
}

impl Deref for ActivePageGuard<'_> {
    type Target = Project;

    fn deref(&self) -> &Project {
        self.project
    }
}

impl Drop for ActivePageGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.project.set_active_page(self.saved.as_deref()) {
            log::warn!("Active page could not be restored: {}", e);
        }
    }
}

/// One encoded page.
#[derive(Debug, Clone)]
pub struct PageExport {
    pub page_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Layers written
    pub layers: u32,
    /// Elements that could not be converted
    pub failed_elements: u32,
}

impl PageExport {
    fn outcome(&self) -> PageOutcome {
        PageOutcome::Exported {
            page_id: self.page_id.clone(),
            file_name: self.file_name.clone(),
            layers: self.layers,
            failed_elements: self.failed_elements,
        }
    }
}

/// The file produced by a batch export.
#[derive(Debug, Clone)]
pub enum ExportArtifact {
    /// A single encoded document
    Single { file_name: String, bytes: Vec<u8> },
    /// A ZIP archive of encoded documents
    Archive {
        file_name: String,
        bytes: Vec<u8>,
        /// Entry names, in archive order
        entries: Vec<String>,
    },
}

impl ExportArtifact {
    /// File name of the artifact.
    pub fn file_name(&self) -> &str {
        match self {
            ExportArtifact::Single { file_name, .. } | ExportArtifact::Archive { file_name, .. } => {
                file_name
            }
        }
    }

    /// Artifact bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            ExportArtifact::Single { bytes, .. } | ExportArtifact::Archive { bytes, .. } => bytes,
        }
    }

    /// Check if this is an archive.
    pub fn is_archive(&self) -> bool {
        matches!(self, ExportArtifact::Archive { .. })
    }

    /// Write the artifact into `dir` under its file name.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(self.file_name());
        std::fs::write(&path, self.bytes())?;
        Ok(path)
    }
}

/// Artifact and per-page report of a batch export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub artifact: ExportArtifact,
    pub report: ExportReport,
}

/// Exports project pages through a codec.
pub struct BatchExporter {
    codec: Arc<dyn DocumentCodec>,
    converter: ExportConverter,
    options: ConvertOptions,
}

impl BatchExporter {
    /// Create an exporter.
    pub fn new(
        codec: Arc<dyn DocumentCodec>,
        options: ConvertOptions,
        fonts: Arc<dyn FontResolver>,
    ) -> Self {
        Self {
            codec,
            converter: ExportConverter::new(options.clone(), fonts),
            options,
        }
    }

    /// Get the element converter.
    pub fn converter(&self) -> &ExportConverter {
        &self.converter
    }

    /// Export one page.
    pub fn export_page(&self, project: &mut Project, page_id: &str) -> Result<PageExport> {
        self.codec.ensure_available()?;

        let number = project
            .pages
            .iter()
            .position(|page| page.id == page_id)
            .map(|i| i + 1)
            .ok_or_else(|| Error::PageNotFound(page_id.to_string()))?;

        self.export_one(project, page_id, number)
    }

    /// Export the selected pages.
    ///
    /// A single selected page yields [`ExportArtifact::Single`] and its
    /// failure is returned as the error. Several pages yield an
    /// [`ExportArtifact::Archive`] of the pages that succeeded; failures are
    /// recorded in the report.
    pub fn export_document(
        &self,
        project: &mut Project,
        selection: &PageSelection,
    ) -> Result<ExportOutput> {
        self.codec.ensure_available()?;

        let numbers = selection.resolve(project.page_count())?;
        let targets: Vec<(usize, String)> = numbers
            .into_iter()
            .filter_map(|n| project.page_at(n).map(|page| (n, page.id.clone())))
            .collect();

        let mut report = ExportReport::new();

        if let [(number, page_id)] = targets.as_slice() {
            let export = self.export_one(project, page_id, *number)?;
            report.push(export.outcome());
            return Ok(ExportOutput {
                artifact: ExportArtifact::Single {
                    file_name: export.file_name,
                    bytes: export.bytes,
                },
                report,
            });
        }

        let mut exports = Vec::with_capacity(targets.len());
        for (number, page_id) in &targets {
            match self.export_one(project, page_id, *number) {
                Ok(export) => {
                    report.push(export.outcome());
                    exports.push(export);
                }
                Err(e) => {
                    log::warn!("Page {} ({}) failed to export: {}", number, page_id, e);
                    report.push(PageOutcome::Failed {
                        page_id: page_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let (bytes, entries) = build_archive(&exports)?;
        log::info!(
            "Exported {} of {} pages into {}",
            report.exported_count(),
            targets.len(),
            self.options.archive_name
        );

        Ok(ExportOutput {
            artifact: ExportArtifact::Archive {
                file_name: self.options.archive_name.clone(),
                bytes,
                entries,
            },
            report,
        })
    }

    fn export_one(&self, project: &mut Project, page_id: &str, number: usize) -> Result<PageExport> {
        let guard = ActivePageGuard::switch(project, page_id)?;
        let page = guard
            .page(page_id)
            .ok_or_else(|| Error::PageNotFound(page_id.to_string()))?;

        let layers = self.converter.convert_page(page);
        let bytes = self.codec.encode(&layers.document)?;

        log::debug!(
            "Encoded page {} with {} layers ({} bytes)",
            number,
            layers.document.layer_count(),
            bytes.len()
        );

        Ok(PageExport {
            page_id: page_id.to_string(),
            file_name: format!("page-{}.{}", number, self.codec.file_extension()),
            bytes,
            layers: layers.document.layer_count() as u32,
            failed_elements: layers.failed_elements,
        })
    }
}

impl std::fmt::Debug for BatchExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExporter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn build_archive(exports: &[PageExport]) -> Result<(Vec<u8>, Vec<String>)> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let now = Utc::now();
    if let Ok(timestamp) = zip::DateTime::from_date_and_time(
        now.year().clamp(1980, 2107) as u16,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    ) {
        options = options.last_modified_time(timestamp);
    }

    let mut entries = Vec::with_capacity(exports.len());
    for export in exports {
        zip.start_file(export.file_name.as_str(), options)?;
        zip.write_all(&export.bytes)?;
        entries.push(export.file_name.clone());
    }

    let cursor = zip.finish()?;
    Ok((cursor.into_inner(), entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    #[test]
    fn test_guard_restores_active_page() {
        let mut project = Project::new();
        let first = Page::new("one", 10, 10);
        let second = Page::new("two", 10, 10);
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        project.add_page(first);
        project.add_page(second);

        {
            let guard = ActivePageGuard::switch(&mut project, &second_id).unwrap();
            assert_eq!(guard.active_page(), Some(second_id.as_str()));
        }
        assert_eq!(project.active_page(), Some(first_id.as_str()));
    }

    #[test]
    fn test_guard_unknown_page() {
        let mut project = Project::new();
        project.add_page(Page::new("one", 10, 10));
        assert!(ActivePageGuard::switch(&mut project, "nope").is_err());
    }

    #[test]
    fn test_build_archive_entries() {
        let exports = vec![
            PageExport {
                page_id: "a".into(),
                file_name: "page-1.psd".into(),
                bytes: b"8BPS-one".to_vec(),
                layers: 1,
                failed_elements: 0,
            },
            PageExport {
                page_id: "c".into(),
                file_name: "page-3.psd".into(),
                bytes: b"8BPS-three".to_vec(),
                layers: 1,
                failed_elements: 0,
            },
        ];

        let (bytes, entries) = build_archive(&exports).unwrap();
        assert_eq!(entries, vec!["page-1.psd", "page-3.psd"]);

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut archive.by_name("page-3.psd").unwrap(), &mut content)
            .unwrap();
        assert_eq!(content, b"8BPS-three");
    }
}
