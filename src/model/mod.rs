//! Data model for both sides of the pipeline.
//!
//! [`DocumentTree`] and [`LayerNode`] describe a decoded layered document;
//! [`Element`] and [`Page`] describe the editable scene model the pipeline
//! converts to and from.

mod document;
mod element;
mod page;
mod raster;
mod text;

pub use document::{count_nodes, Bounds, ColorMode, DocumentTree, LayerNode};
pub use element::{
    blend_to_source, blend_to_target, Alignment, BlendMode, Element, ElementContent,
    FontSizeSource, ImageContent, ImageMetadata, TextContent, TextMetadata,
};
pub use page::{to_json, JsonFormat, Page, Project};
pub use raster::{Bitmap, RasterSource};
pub use text::{RawAlignment, RawColor, StyleRun, TextData};

/// The exported form of an element is a regular layer node.
pub type LayerDescriptor = LayerNode;
