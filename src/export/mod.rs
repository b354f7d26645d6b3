//! Document export: editable pages back to layered documents.

pub mod batch;
pub mod converter;

pub use batch::{ActivePageGuard, BatchExporter, ExportArtifact, ExportOutput, PageExport};
pub use converter::{element_bounds, opacity_to_byte, ExportConverter, PageLayers};
