//! Page-level types of the editable model.

use super::Element;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single editable page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page id
    pub id: String,

    /// Page name
    pub name: String,

    /// Page width in pixels
    pub width: u32,

    /// Page height in pixels
    pub height: u32,

    /// Elements, bottom-most first
    pub elements: Vec<Element>,
}

impl Page {
    /// Create a new empty page with a fresh id.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Add an element to the page.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Check if the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of elements on the page.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A set of pages plus the page currently being edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Pages in display order
    pub pages: Vec<Page>,

    /// Id of the active page
    active_page: Option<String>,
}

impl Project {
    /// Create a new empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. The first page added becomes active.
    pub fn add_page(&mut self, page: Page) {
        if self.active_page.is_none() {
            self.active_page = Some(page.id.clone());
        }
        self.pages.push(page);
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Id of the active page.
    pub fn active_page(&self) -> Option<&str> {
        self.active_page.as_deref()
    }

    /// Switch the active page. `None` clears it.
    pub fn set_active_page(&mut self, page_id: Option<&str>) -> Result<()> {
        match page_id {
            Some(id) => {
                if self.page(id).is_none() {
                    return Err(Error::PageNotFound(id.to_string()));
                }
                self.active_page = Some(id.to_string());
            }
            None => self.active_page = None,
        }
        Ok(())
    }

    /// Get a page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    /// Get a page by id, mutably.
    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|page| page.id == id)
    }

    /// Get a page by position (1-indexed).
    pub fn page_at(&self, number: usize) -> Option<&Page> {
        if number == 0 {
            return None;
        }
        self.pages.get(number - 1)
    }
}

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a page for hand-off to an editing surface.
pub fn to_json(page: &Page, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(page),
        JsonFormat::Compact => serde_json::to_string(page),
    };

    result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
}
