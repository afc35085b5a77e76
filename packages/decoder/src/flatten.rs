//! Recursive tree flattening
//!
//! Collapses a markup subtree into a single flat mapping from lowercase
//! tag to raw text. Data-bearing children become entries; nested
//! aggregates are flattened recursively and merged in. Flattening is only
//! valid when the subtree produces no field name twice at any depth —
//! schemas whose natural shape violates this (repeated lists, duplicated
//! sub-aggregate namespaces) must strip the offending substructures in a
//! pre-flatten hook before this step runs.

use crate::config;
use crate::error::{DecodeError, Result};
use crate::node::RawNode;
use std::collections::HashMap;

/// Flatten a node's subtree into a lowercase tag → trimmed text mapping.
///
/// Leaf elements whose tag contains the vendor-private separator are
/// silently dropped. Any field name produced twice fails with
/// [`DecodeError::FlattenCollision`] naming the key and the node.
pub fn flatten(node: &RawNode) -> Result<HashMap<String, String>> {
    flatten_at(node, 0)
}

fn flatten_at(node: &RawNode, depth: usize) -> Result<HashMap<String, String>> {
    if depth > config::MAX_NESTING_DEPTH {
        return Err(DecodeError::NestingTooDeep { depth });
    }

    let mut flat = HashMap::new();
    for child in node.children() {
        let text = child.text().map(str::trim).unwrap_or_default();
        if !text.is_empty() {
            // Data-bearing leaf element.
            if child.tag().contains(config::VENDOR_TAG_SEPARATOR) {
                tracing::debug!(tag = child.tag(), "Dropping vendor-private tag");
                continue;
            }
            insert(&mut flat, child.tag().to_ascii_lowercase(), text.to_string(), node)?;
        } else {
            // Nested aggregate: flatten and merge its contributions.
            for (key, value) in flatten_at(child, depth + 1)? {
                insert(&mut flat, key, value, node)?;
            }
        }
    }
    Ok(flat)
}

fn insert(
    flat: &mut HashMap<String, String>,
    key: String,
    value: String,
    node: &RawNode,
) -> Result<()> {
    if flat.contains_key(&key) {
        return Err(DecodeError::FlattenCollision {
            key,
            node: node.tag().to_string(),
        });
    }
    flat.insert(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_one_tree_maps_directly() {
        let node = RawNode::aggregate("LEDGERBAL")
            .with_child(RawNode::leaf("BALAMT", "1234.56"))
            .with_child(RawNode::leaf("DTASOF", "20230101120000"));

        let flat = flatten(&node).unwrap();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["balamt"], "1234.56");
        assert_eq!(flat["dtasof"], "20230101120000");
    }

    #[test]
    fn test_nested_aggregate_is_merged() {
        let node = RawNode::aggregate("SECINFO")
            .with_child(
                RawNode::aggregate("SECID")
                    .with_child(RawNode::leaf("UNIQUEID", "123456789"))
                    .with_child(RawNode::leaf("UNIQUEIDTYPE", "CUSIP")),
            )
            .with_child(RawNode::leaf("SECNAME", "Acme Industries"));

        let flat = flatten(&node).unwrap();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat["uniqueid"], "123456789");
        assert_eq!(flat["secname"], "Acme Industries");
    }

    #[test]
    fn test_text_is_trimmed() {
        let node = RawNode::aggregate("X").with_child(RawNode::leaf("MEMO", "  hello \n"));
        assert_eq!(flatten(&node).unwrap()["memo"], "hello");
    }

    #[test]
    fn test_whitespace_only_text_is_an_aggregate() {
        // Tokenizers often leave indentation as text on parent nodes.
        let mut parent = RawNode::aggregate("SECID");
        parent.push_child(RawNode::leaf("UNIQUEID", "1"));
        let node = RawNode::aggregate("X").with_child(parent);
        assert_eq!(flatten(&node).unwrap()["uniqueid"], "1");
    }

    #[test]
    fn test_vendor_private_leaf_is_dropped() {
        let node = RawNode::aggregate("STMTTRN")
            .with_child(RawNode::leaf("FITID", "1"))
            .with_child(RawNode::leaf("INTU.BID", "00123"));

        let flat = flatten(&node).unwrap();
        assert_eq!(flat.len(), 1);
        assert!(!flat.contains_key("intu.bid"));
    }

    #[test]
    fn test_vendor_private_dropped_at_depth() {
        let node = RawNode::aggregate("OUTER").with_child(
            RawNode::aggregate("INNER")
                .with_child(RawNode::leaf("KEEP", "yes"))
                .with_child(RawNode::leaf("INTU.XXXX", "no")),
        );

        let flat = flatten(&node).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["keep"], "yes");
    }

    #[test]
    fn test_sibling_leaf_collision_fails() {
        let node = RawNode::aggregate("X")
            .with_child(RawNode::leaf("MEMO", "a"))
            .with_child(RawNode::leaf("MEMO", "b"));

        match flatten(&node) {
            Err(DecodeError::FlattenCollision { key, node }) => {
                assert_eq!(key, "memo");
                assert_eq!(node, "X");
            }
            other => panic!("expected FlattenCollision, got {other:?}"),
        }
    }

    #[test]
    fn test_sibling_aggregate_collision_fails() {
        // Two balance aggregates under one node both produce balamt/dtasof.
        let node = RawNode::aggregate("STMTRS")
            .with_child(
                RawNode::aggregate("LEDGERBAL")
                    .with_child(RawNode::leaf("BALAMT", "1.00"))
                    .with_child(RawNode::leaf("DTASOF", "20230101")),
            )
            .with_child(
                RawNode::aggregate("AVAILBAL")
                    .with_child(RawNode::leaf("BALAMT", "2.00"))
                    .with_child(RawNode::leaf("DTASOF", "20230101")),
            );

        assert!(matches!(
            flatten(&node),
            Err(DecodeError::FlattenCollision { .. })
        ));
    }

    #[test]
    fn test_leaf_vs_aggregate_collision_fails() {
        let node = RawNode::aggregate("X")
            .with_child(RawNode::leaf("NAME", "direct"))
            .with_child(RawNode::aggregate("WRAP").with_child(RawNode::leaf("NAME", "nested")));

        assert!(matches!(
            flatten(&node),
            Err(DecodeError::FlattenCollision { .. })
        ));
    }

    #[test]
    fn test_depth_guard() {
        let mut node = RawNode::leaf("LEAF", "x");
        for i in 0..=config::MAX_NESTING_DEPTH + 1 {
            node = RawNode::aggregate(format!("LEVEL{i}")).with_child(node);
        }
        assert!(matches!(
            flatten(&node),
            Err(DecodeError::NestingTooDeep { .. })
        ));
    }
}
