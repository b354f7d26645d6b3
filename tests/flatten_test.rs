//! Property tests for layer tree flattening.

use proptest::prelude::*;
use psdport::model::{count_nodes, Bounds, LayerNode};
use psdport::{flatten, flatten_document, DocumentTree};

fn layer_tree() -> impl Strategy<Value = LayerNode> {
    let leaf = ("[a-z]{1,6}", any::<bool>()).prop_map(|(name, hidden)| {
        let mut node = LayerNode::new(name, Bounds::new(0, 0, 8, 8));
        node.hidden = hidden;
        node
    });

    leaf.prop_recursive(4, 48, 5, |inner| {
        ("[a-z]{1,6}", prop::collection::vec(inner, 0..5))
            .prop_map(|(name, children)| LayerNode::group(name, children))
    })
}

fn forest() -> impl Strategy<Value = Vec<LayerNode>> {
    prop::collection::vec(layer_tree(), 0..6)
}

proptest! {
    #[test]
    fn test_flatten_visits_every_node(nodes in forest()) {
        let flat = flatten(&nodes, None);
        prop_assert_eq!(flat.len(), count_nodes(&nodes));
    }

    #[test]
    fn test_flatten_indices_are_positions(nodes in forest()) {
        let flat = flatten(&nodes, None);
        for (i, layer) in flat.iter().enumerate() {
            prop_assert_eq!(layer.index, i);
        }
    }

    #[test]
    fn test_parent_precedes_child(nodes in forest()) {
        let flat = flatten(&nodes, None);
        for layer in &flat {
            if let Some(parent) = layer.parent_index {
                prop_assert!(parent < layer.index);
                prop_assert_eq!(flat[parent].depth + 1, layer.depth);
                let is_child = flat[parent]
                    .node
                    .children
                    .iter()
                    .any(|child| std::ptr::eq(child, layer.node));
                prop_assert!(is_child);
            } else {
                prop_assert_eq!(layer.depth, 0);
            }
        }
    }

    #[test]
    fn test_visibility_mirrors_hidden_flag(nodes in forest()) {
        let flat = flatten(&nodes, None);
        for layer in &flat {
            prop_assert_eq!(layer.visible, !layer.node.hidden);
        }
    }

    #[test]
    fn test_ancestor_chain_ends_at_top_level(nodes in forest()) {
        let flat = flatten(&nodes, None);
        for layer in &flat {
            let chain: Vec<_> = layer.ancestors(&flat).collect();
            prop_assert_eq!(chain.len(), layer.depth);
            if let Some(root) = chain.last() {
                prop_assert!(root.parent_index.is_none());
            }
        }
    }
}

#[test]
fn test_flatten_pre_order_names() {
    let mut doc = DocumentTree::new(100, 100);
    doc.add_layer(LayerNode::new("background", Bounds::new(0, 0, 100, 100)));
    doc.add_layer(LayerNode::group(
        "header",
        vec![
            LayerNode::new("logo", Bounds::new(0, 0, 10, 10)),
            LayerNode::group(
                "nav",
                vec![LayerNode::new("link", Bounds::new(0, 0, 5, 5))],
            ),
        ],
    ));
    doc.add_layer(LayerNode::new("footer", Bounds::new(0, 90, 100, 100)));

    let flat = flatten_document(&doc);
    let names: Vec<_> = flat.iter().map(|l| l.name()).collect();
    assert_eq!(names, vec!["background", "header", "logo", "nav", "link", "footer"]);

    let parents: Vec<_> = flat.iter().map(|l| l.parent_index).collect();
    assert_eq!(parents, vec![None, None, Some(1), Some(1), Some(3), None]);

    let original: Vec<_> = flat.iter().map(|l| l.original_index).collect();
    assert_eq!(original, vec![0, 1, 0, 1, 0, 2]);
}

#[test]
fn test_flatten_ids_are_unique() {
    let nodes: Vec<_> = (0..20)
        .map(|i| LayerNode::new(format!("layer {}", i), Bounds::new(0, 0, 1, 1)))
        .collect();
    let flat = flatten(&nodes, None);
    let mut ids: Vec<_> = flat.iter().map(|l| l.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[test]
fn test_flatten_empty() {
    assert!(flatten(&[], None).is_empty());
}
