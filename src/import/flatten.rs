//! Layer tree flattening.
//!
//! A decoded layer tree is turned into a depth-first pre-order list in
//! which every entry knows its own position and the position of its parent.

use crate::model::{DocumentTree, LayerNode};

/// A layer with its position in the flattened list.
#[derive(Debug, Clone)]
pub struct FlatLayer<'a> {
    /// The source layer
    pub node: &'a LayerNode,

    /// Position in the flattened list
    pub index: usize,

    /// Position among its siblings
    pub original_index: usize,

    /// Index of the parent entry, `None` for top-level layers
    pub parent_index: Option<usize>,

    /// Fresh identifier for this flattening
    pub id: String,

    /// Visibility (`!node.hidden`)
    pub visible: bool,

    /// Nesting depth, 0 for top-level layers
    pub depth: usize,
}

impl<'a> FlatLayer<'a> {
    /// Layer name.
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// Check if the layer is hidden.
    pub fn is_hidden(&self) -> bool {
        !self.visible
    }

    /// Iterate over the ancestors of this entry, nearest first.
    ///
    /// `layers` must be the list this entry was flattened into.
    pub fn ancestors<'s>(&self, layers: &'s [FlatLayer<'a>]) -> Ancestors<'s, 'a> {
        Ancestors {
            layers,
            next: self.parent_index,
        }
    }
}

/// Iterator returned by [`FlatLayer::ancestors`].
pub struct Ancestors<'s, 'a> {
    layers: &'s [FlatLayer<'a>],
    next: Option<usize>,
}

impl<'s, 'a> Iterator for Ancestors<'s, 'a> {
    type Item = &'s FlatLayer<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let layer = self.layers.get(self.next?)?;
        self.next = layer.parent_index;
        Some(layer)
    }
}

/// Flatten a list of sibling layers and everything below them.
pub fn flatten(nodes: &[LayerNode], parent_index: Option<usize>) -> Vec<FlatLayer<'_>> {
    let mut out = Vec::with_capacity(crate::model::count_nodes(nodes));
    let depth = if parent_index.is_some() { 1 } else { 0 };
    flatten_into(nodes, parent_index, depth, &mut out);
    out
}

/// Append `nodes` and their descendants to `out`.
///
/// Each node is pushed before its children, which receive the node's own
/// index as their parent.
pub fn flatten_into<'a>(
    nodes: &'a [LayerNode],
    parent_index: Option<usize>,
    depth: usize,
    out: &mut Vec<FlatLayer<'a>>,
) {
    for (original_index, node) in nodes.iter().enumerate() {
        let index = out.len();
        out.push(FlatLayer {
            node,
            index,
            original_index,
            parent_index,
            id: uuid::Uuid::new_v4().to_string(),
            visible: !node.hidden,
            depth,
        });

        if !node.children.is_empty() {
            flatten_into(&node.children, Some(index), depth + 1, out);
        }
    }
}

/// Flatten every layer of a document.
pub fn flatten_document(document: &DocumentTree) -> Vec<FlatLayer<'_>> {
    flatten(&document.children, None)
}
