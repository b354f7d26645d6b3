//! Document import: layer tree to editable elements.
//!
//! The tree is flattened ([`flatten`]), each layer's metrics are converted
//! ([`metrics`]) and mapped through the style tables ([`style`]), and the
//! [`ImportConverter`] assembles one element per convertible layer.

pub mod converter;
pub mod flatten;
pub mod metrics;
pub mod style;

pub use converter::{normalize_text, ImportConverter};
pub use flatten::{flatten, flatten_document, flatten_into, FlatLayer};
pub use metrics::{
    pt_to_px, px_to_pt, resolve_font_size_px, resolve_letter_spacing, resolve_line_height, resolve_scale,
    resolve_text_metrics, validate_style, ResolvedFontSize, ScaleFactors, TextMetrics,
};
pub use style::{
    map_alignment, normalize_color, Fallback, FirstRun, LayerDefault, StyleChain, StyleStrategy,
};

use crate::model::{Element, Page};
use crate::report::ImportSummary;

/// Elements produced by an import and the per-layer tally.
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Elements in flattened layer order
    pub elements: Vec<Element>,

    /// Converted / skipped / failed counts
    pub summary: ImportSummary,
}

impl ImportResult {
    /// Get the number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Place the elements on a new page.
    pub fn into_page(self, name: impl Into<String>, width: u32, height: u32) -> Page {
        let mut page = Page::new(name, width, height);
        page.elements = self.elements;
        page
    }
}
