//! Per-unit outcomes and conversion statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a layer produced no element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The layer is hidden
    Hidden,
    /// The layer has nothing to convert (e.g. a group)
    NoContent,
}

/// Outcome of converting one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayerOutcome {
    Converted,
    Skipped { reason: SkipReason },
    Failed { message: String },
}

/// Counts of layer outcomes in an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Layers visited
    pub total: u32,

    /// Layers that produced an element
    pub converted: u32,

    /// Hidden layers and layers without content
    pub skipped: u32,

    /// Layers whose conversion failed
    pub failed: u32,

    /// Image elements built from type layers
    pub rasterized_text: u32,

    /// Image elements whose source could not be read
    pub placeholders: u32,
}

impl ImportSummary {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &LayerOutcome) {
        self.total += 1;
        match outcome {
            LayerOutcome::Converted => self.converted += 1,
            LayerOutcome::Skipped { .. } => self.skipped += 1,
            LayerOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Merge another summary into this one.
    pub fn merge(&mut self, other: &ImportSummary) {
        self.total += other.total;
        self.converted += other.converted;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.rasterized_text += other.rasterized_text;
        self.placeholders += other.placeholders;
    }

    /// Check if every layer was converted or skipped.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Outcome of exporting one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Exported {
        page_id: String,
        file_name: String,
        layers: u32,
        failed_elements: u32,
    },
    Failed {
        page_id: String,
        message: String,
    },
}

impl PageOutcome {
    /// Id of the page this outcome belongs to.
    pub fn page_id(&self) -> &str {
        match self {
            PageOutcome::Exported { page_id, .. } | PageOutcome::Failed { page_id, .. } => page_id,
        }
    }

    /// Check if the page was exported.
    pub fn is_exported(&self) -> bool {
        matches!(self, PageOutcome::Exported { .. })
    }
}

/// Summary of a batch export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    /// One outcome per selected page, in page order
    pub pages: Vec<PageOutcome>,

    /// When the export finished
    pub exported_at: DateTime<Utc>,
}

impl ExportReport {
    /// Create an empty report stamped now.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            exported_at: Utc::now(),
        }
    }

    /// Add a page outcome.
    pub fn push(&mut self, outcome: PageOutcome) {
        self.pages.push(outcome);
    }

    /// Number of exported pages.
    pub fn exported_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_exported()).count()
    }

    /// Number of failed pages.
    pub fn failed_count(&self) -> usize {
        self.pages.len() - self.exported_count()
    }

    /// Failed pages.
    pub fn failures(&self) -> impl Iterator<Item = &PageOutcome> {
        self.pages.iter().filter(|p| !p.is_exported())
    }
}

impl Default for ExportReport {
    fn default() -> Self {
        Self::new()
    }
}
