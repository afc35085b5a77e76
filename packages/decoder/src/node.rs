//! Raw markup tree consumed by the decoder
//!
//! The external tokenizer produces a tree of [`RawNode`]s: every node
//! carries a tag, optional text, and ordered children. The decoder treats
//! the caller's tree as read-only input; [`crate::SchemaRegistry::decode`]
//! clones the tree once and performs all grooming and hook surgery on the
//! working copy.

use serde::Serialize;

/// A single node of the markup tree.
///
/// Leaf elements carry text and no children; aggregates carry children
/// and no meaningful text. Nothing enforces that split on the wire, so
/// the decoder classifies nodes by whether their trimmed text is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawNode {
    tag: String,
    text: Option<String>,
    children: Vec<RawNode>,
}

impl RawNode {
    /// Create an aggregate node with no text and no children.
    pub fn aggregate(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a data-bearing leaf node.
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    #[must_use]
    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child in place.
    pub fn push_child(&mut self, child: RawNode) {
        self.children.push(child);
    }

    /// Tag name of this node.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Text content, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Ordered child nodes.
    pub fn children(&self) -> &[RawNode] {
        &self.children
    }

    /// Consume the node and return its children.
    pub fn into_children(self) -> Vec<RawNode> {
        self.children
    }

    /// Find the first direct child with the given tag.
    pub fn find_child(&self, tag: &str) -> Option<&RawNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Whether a direct child with the given tag exists.
    pub fn has_child(&self, tag: &str) -> bool {
        self.find_child(tag).is_some()
    }

    /// Remove and return the first direct child with the given tag.
    ///
    /// The order of the remaining children is preserved.
    pub fn remove_child(&mut self, tag: &str) -> Option<RawNode> {
        let index = self.children.iter().position(|c| c.tag == tag)?;
        Some(self.children.remove(index))
    }

    /// Rename the first direct child with tag `from` to `to`.
    ///
    /// Returns whether a child was renamed.
    pub fn rename_child(&mut self, from: &str, to: &str) -> bool {
        match self.children.iter_mut().find(|c| c.tag == from) {
            Some(child) => {
                child.tag = to.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawNode {
        RawNode::aggregate("STMTTRN")
            .with_child(RawNode::leaf("TRNTYPE", "CREDIT"))
            .with_child(RawNode::leaf("FITID", "1001"))
            .with_child(
                RawNode::aggregate("PAYEE").with_child(RawNode::leaf("NAME", "ACME")),
            )
    }

    #[test]
    fn test_leaf_and_aggregate_shape() {
        let leaf = RawNode::leaf("TRNAMT", "-12.50");
        assert_eq!(leaf.tag(), "TRNAMT");
        assert_eq!(leaf.text(), Some("-12.50"));
        assert!(leaf.children().is_empty());

        let agg = RawNode::aggregate("LEDGERBAL");
        assert_eq!(agg.text(), None);
    }

    #[test]
    fn test_find_and_has_child() {
        let node = sample();
        assert!(node.has_child("PAYEE"));
        assert!(!node.has_child("MEMO"));
        assert_eq!(node.find_child("FITID").and_then(RawNode::text), Some("1001"));
    }

    #[test]
    fn test_remove_child_preserves_order() {
        let mut node = sample();
        let removed = node.remove_child("FITID");
        assert_eq!(removed.map(|n| n.tag).as_deref(), Some("FITID"));

        let tags: Vec<&str> = node.children().iter().map(RawNode::tag).collect();
        assert_eq!(tags, vec!["TRNTYPE", "PAYEE"]);
        assert!(node.remove_child("FITID").is_none());
    }

    #[test]
    fn test_rename_child() {
        let mut node = RawNode::aggregate("STOCKINFO").with_child(RawNode::leaf("YIELD", "4.5"));
        assert!(node.rename_child("YIELD", "YLD"));
        assert!(node.has_child("YLD"));
        assert!(!node.rename_child("YIELD", "YLD"));
    }
}
