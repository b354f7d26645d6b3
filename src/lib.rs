//! # psdport
//!
//! Layered document interchange for Rust.
//!
//! This library turns the layer tree of a PSD/PSB document into pages of
//! positioned, styled elements for an editor, and renders such pages back
//! into layered documents.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use psdport::{DocumentCodec, Psdport};
//!
//! fn run(codec: Arc<dyn DocumentCodec>) -> psdport::Result<()> {
//!     let psdport = Psdport::new(codec).editable_text();
//!
//!     // Import a document as one editable page
//!     let imported = psdport.import_file("poster.psd")?;
//!     println!(
//!         "{} elements, {} layers skipped",
//!         imported.page.element_count(),
//!         imported.summary.skipped
//!     );
//!
//!     // Hand it to an editor as JSON
//!     let json = psdport::to_json(&imported.page, psdport::JsonFormat::Pretty)?;
//!     std::fs::write("poster.json", json)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layer flattening**: nested groups become an ordered list with parent links
//! - **Text metrics**: point sizes, tracking, leading and scale become CSS pixel metrics
//! - **Blend modes**: document keys map to CSS `mix-blend-mode` names and back
//! - **Raster enhancement**: upscale and sharpen imported pixels, in parallel with Rayon
//! - **Batch export**: multi-page export into a ZIP archive, tolerant of failing pages
//!
//! The binary container itself is read and written by a [`DocumentCodec`]
//! supplied by the caller.

pub mod codec;
pub mod detect;
pub mod error;
pub mod export;
pub mod fonts;
pub mod import;
pub mod model;
#[cfg(feature = "async")]
pub mod nonblocking;
pub mod options;
pub mod raster;
pub mod report;

// Re-export commonly used types
pub use codec::{decode_checked, DocumentCodec};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_psd, is_psd_bytes, PsdFormat};
pub use error::{Error, Result};
pub use export::{BatchExporter, ExportArtifact, ExportConverter, ExportOutput, PageExport};
pub use fonts::{FontData, FontFamily, FontResolver, MemoryFontResolver, SystemFontResolver};
pub use import::{flatten, flatten_document, FlatLayer, ImportConverter, ImportResult};
pub use model::{
    to_json, Alignment, Bitmap, BlendMode, Bounds, DocumentTree, Element, ElementContent,
    JsonFormat, LayerNode, Page, Project, RasterSource, TextContent, TextData,
};
pub use options::{ConvertOptions, EnhanceQuality, OpacityPolicy, PageSelection, MAX_PAGE_NUMBER};
pub use raster::Rasterizer;
pub use report::{ExportReport, ImportSummary, LayerOutcome, PageOutcome, SkipReason};

use std::path::Path;
use std::sync::Arc;

/// Import document bytes as one editable page.
///
/// Text layers are rasterized and system fonts are used.
///
/// # Arguments
///
/// * `codec` - Codec that decodes the document container
/// * `data` - Document bytes
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # fn codec() -> Arc<dyn psdport::DocumentCodec> { unimplemented!() }
/// let data = std::fs::read("poster.psd").unwrap();
/// let imported = psdport::import_bytes(codec(), &data).unwrap();
/// println!("Elements: {}", imported.page.element_count());
/// ```
pub fn import_bytes(codec: Arc<dyn DocumentCodec>, data: &[u8]) -> Result<ImportedPage> {
    Psdport::new(codec).import_bytes(data)
}

/// Import document bytes with custom options.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # fn codec() -> Arc<dyn psdport::DocumentCodec> { unimplemented!() }
/// use psdport::{import_bytes_with_options, ConvertOptions};
///
/// let options = ConvertOptions::new().editable_text().sequential();
/// let data = std::fs::read("poster.psd").unwrap();
/// let imported = import_bytes_with_options(codec(), &data, options).unwrap();
/// ```
pub fn import_bytes_with_options(
    codec: Arc<dyn DocumentCodec>,
    data: &[u8],
    options: ConvertOptions,
) -> Result<ImportedPage> {
    Psdport::new(codec).with_options(options).import_bytes(data)
}

/// Import a document file as one editable page named after the file.
pub fn import_file<P: AsRef<Path>>(codec: Arc<dyn DocumentCodec>, path: P) -> Result<ImportedPage> {
    Psdport::new(codec).import_file(path)
}

/// Export one page of a project.
pub fn export_page(
    codec: Arc<dyn DocumentCodec>,
    project: &mut Project,
    page_id: &str,
) -> Result<PageExport> {
    Psdport::new(codec).export_page(project, page_id)
}

/// Export the selected pages of a project.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # fn codec() -> Arc<dyn psdport::DocumentCodec> { unimplemented!() }
/// # fn project() -> psdport::Project { unimplemented!() }
/// use psdport::{export_document, PageSelection};
///
/// let mut project = project();
/// let output = export_document(codec(), &mut project, &PageSelection::All).unwrap();
/// output.artifact.write_to_dir("./out").unwrap();
/// println!("{} pages failed", output.report.failed_count());
/// ```
pub fn export_document(
    codec: Arc<dyn DocumentCodec>,
    project: &mut Project,
    selection: &PageSelection,
) -> Result<ExportOutput> {
    Psdport::new(codec).export_document(project, selection)
}

/// A page built from an imported document.
#[derive(Debug, Clone)]
pub struct ImportedPage {
    /// The page, sized to the document canvas
    pub page: Page,
    /// Per-layer tally
    pub summary: ImportSummary,
}

/// Builder for importing and exporting layered documents.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # fn codec() -> Arc<dyn psdport::DocumentCodec> { unimplemented!() }
/// use psdport::{MemoryFontResolver, Project, Psdport};
///
/// let mut fonts = MemoryFontResolver::new();
/// fonts.register("Arial", std::fs::read("Arial.ttf")?)?;
///
/// let psdport = Psdport::new(codec())
///     .with_fonts(Arc::new(fonts))
///     .editable_text()
///     .high_quality();
///
/// let mut project = Project::new();
/// project.add_page(psdport.import_file("cover.psd")?.page);
/// let output = psdport.export_document(&mut project, &psdport::PageSelection::All)?;
/// # Ok::<(), psdport::Error>(())
/// ```
#[derive(Clone)]
pub struct Psdport {
    codec: Arc<dyn DocumentCodec>,
    fonts: Arc<dyn FontResolver>,
    options: ConvertOptions,
}

impl Psdport {
    /// Create a new builder around a codec, using system fonts.
    pub fn new(codec: Arc<dyn DocumentCodec>) -> Self {
        Self {
            codec,
            fonts: Arc::new(SystemFontResolver::new()),
            options: ConvertOptions::default(),
        }
    }

    /// Set all options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the font resolver.
    pub fn with_fonts(mut self, fonts: Arc<dyn FontResolver>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Import type layers as editable text.
    pub fn editable_text(mut self) -> Self {
        self.options = self.options.editable_text();
        self
    }

    /// Enhance images with the 3x upscale.
    pub fn high_quality(mut self) -> Self {
        self.options = self.options.high_quality();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set opacity policy.
    pub fn with_opacity_policy(mut self, policy: OpacityPolicy) -> Self {
        self.options = self.options.with_opacity_policy(policy);
        self
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Get the codec.
    pub fn codec(&self) -> &Arc<dyn DocumentCodec> {
        &self.codec
    }

    /// Build an import converter with this builder's options and fonts.
    pub fn import_converter(&self) -> ImportConverter {
        ImportConverter::new(self.options.clone(), self.fonts.clone())
    }

    /// Build a batch exporter with this builder's codec, options and fonts.
    pub fn batch_exporter(&self) -> BatchExporter {
        BatchExporter::new(self.codec.clone(), self.options.clone(), self.fonts.clone())
    }

    /// Convert an already decoded document.
    pub fn import_document(&self, document: &DocumentTree, name: &str) -> ImportedPage {
        let layers = flatten_document(document);
        let result = self.import_converter().import_layers(&layers);
        let summary = result.summary.clone();
        ImportedPage {
            page: result.into_page(name, document.width, document.height),
            summary,
        }
    }

    /// Decode and convert document bytes.
    pub fn import_bytes(&self, data: &[u8]) -> Result<ImportedPage> {
        self.import_bytes_named(data, "Page 1")
    }

    /// Decode and convert document bytes into a page with the given name.
    pub fn import_bytes_named(&self, data: &[u8], name: &str) -> Result<ImportedPage> {
        let document = decode_checked(self.codec.as_ref(), data)?;
        Ok(self.import_document(&document, name))
    }

    /// Read, decode and convert a document file.
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportedPage> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        self.import_bytes_named(&data, &page_name_for(path))
    }

    /// Import several document files as pages of `project`.
    ///
    /// Returns the combined layer tally. The first file that cannot be read
    /// or decoded stops the import; pages added before it stay in the project.
    pub fn import_files_into<P: AsRef<Path>>(
        &self,
        project: &mut Project,
        paths: &[P],
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::new();
        for path in paths {
            let imported = self.import_file(path)?;
            summary.merge(&imported.summary);
            project.add_page(imported.page);
        }
        log::info!(
            "Imported {} files, {} of {} layers converted",
            paths.len(),
            summary.converted,
            summary.total
        );
        Ok(summary)
    }

    /// Export one page.
    pub fn export_page(&self, project: &mut Project, page_id: &str) -> Result<PageExport> {
        self.batch_exporter().export_page(project, page_id)
    }

    /// Export the selected pages.
    pub fn export_document(
        &self,
        project: &mut Project,
        selection: &PageSelection,
    ) -> Result<ExportOutput> {
        self.batch_exporter().export_document(project, selection)
    }
}

impl std::fmt::Debug for Psdport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Psdport")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Page name for a document file: its stem, or "Page 1".
pub(crate) fn page_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Page 1")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneLayerCodec;

    impl DocumentCodec for OneLayerCodec {
        fn decode(&self, _data: &[u8]) -> Result<DocumentTree> {
            let mut doc = DocumentTree::new(200, 100);
            doc.add_layer(
                LayerNode::new("red", Bounds::new(10, 10, 110, 60))
                    .with_raster(RasterSource::solid(100, 50, [255, 0, 0, 255])),
            );
            doc.add_layer(LayerNode::new("ghost", Bounds::new(0, 0, 5, 5)).hidden());
            Ok(doc)
        }

        fn encode(&self, _document: &DocumentTree) -> Result<Vec<u8>> {
            Ok(b"8BPS\x00\x01".to_vec())
        }
    }

    fn psdport() -> Psdport {
        Psdport::new(Arc::new(OneLayerCodec)).with_fonts(Arc::new(MemoryFontResolver::new()))
    }

    #[test]
    fn test_psdport_builder() {
        let builder = psdport().editable_text().high_quality().sequential();
        assert!(!builder.options().rasterize_text);
        assert_eq!(builder.options().enhance_quality, EnhanceQuality::High);
        assert!(!builder.options().parallel);
    }

    #[test]
    fn test_import_bytes_page() {
        let imported = psdport().import_bytes(b"8BPS\x00\x01....").unwrap();
        assert_eq!(imported.page.dimensions(), (200, 100));
        assert_eq!(imported.page.element_count(), 1);
        assert_eq!(imported.summary.converted, 1);
        assert_eq!(imported.summary.skipped, 1);
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_import_bytes_empty_data() {
        let result = psdport().import_bytes(&[]);
        assert!(matches!(result, Err(Error::MalformedInput)));
    }

    #[test]
    fn test_import_bytes_unknown_magic() {
        let data = b"%PDF-1.7\n%test";
        let result = psdport().import_bytes(data);
        assert!(matches!(result, Err(Error::MalformedInput)));
    }

    #[test]
    fn test_import_bytes_unsupported_version() {
        let result = psdport().import_bytes(b"8BPS\x00\x07....");
        assert!(matches!(result, Err(Error::UnsupportedVersion(7))));
    }

    #[test]
    fn test_import_files_into_project() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = ["front", "back"]
            .iter()
            .map(|name| {
                let path = dir.path().join(format!("{}.psd", name));
                std::fs::write(&path, b"8BPS\x00\x01....").unwrap();
                path
            })
            .collect();

        let mut project = Project::new();
        let summary = psdport().import_files_into(&mut project, &paths).unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.skipped, 2);
        let names: Vec<_> = project.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["front", "back"]);
    }

    #[test]
    fn test_import_files_into_stops_at_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.psd");
        std::fs::write(&good, b"8BPS\x00\x01....").unwrap();
        let paths = vec![good, dir.path().join("missing.psd")];

        let mut project = Project::new();
        let result = psdport().import_files_into(&mut project, &paths);
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(project.page_count(), 1);
    }

    #[test]
    fn test_page_name_for() {
        assert_eq!(page_name_for(Path::new("/tmp/cover.psd")), "cover");
        assert_eq!(page_name_for(Path::new("/")), "Page 1");
    }
}
