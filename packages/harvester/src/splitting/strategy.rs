//! Splitting strategies for article extraction.

use roxmltree::Node;

use super::types::{ElementSpec, SplitContext};
use crate::xml::{find_by_path, get_text};

/// Trait for configurable splitting strategies.
///
/// Implementations determine where to split and how to extract numbers.
pub trait SplitStrategy {
    /// Determine if this element should produce a component.
    fn should_split_here(
        &self,
        node: Node<'_, '_>,
        spec: &ElementSpec,
        context: &SplitContext,
    ) -> bool;

    /// Extract the number/identifier for this element.
    fn get_number(&self, node: Node<'_, '_>, spec: &ElementSpec) -> Option<String>;
}

/// Strategy that splits at leaf nodes (deepest split points).
///
/// This is the default strategy for Dutch law article splitting.
pub struct LeafSplitStrategy;

impl SplitStrategy for LeafSplitStrategy {
    fn should_split_here(
        &self,
        _node: Node<'_, '_>,
        spec: &ElementSpec,
        context: &SplitContext,
    ) -> bool {
        // Only split at elements marked as split points
        if !spec.is_split_point {
            return false;
        }

        // Respect max depth if set
        if let Some(max_depth) = context.max_depth {
            if context.depth >= max_depth {
                return true;
            }
        }

        true
    }

    fn get_number(&self, node: Node<'_, '_>, spec: &ElementSpec) -> Option<String> {
        // Try primary number source first
        if let Some(source) = spec.number_source.as_deref() {
            if let Some(nr_node) = find_by_path(node, source) {
                let nr = get_text(nr_node);
                if let Some(cleaned) = self.clean_number(&nr) {
                    return Some(cleaned);
                }
            }
        }

        // Fallback: try label attribute for artikel elements (used by repealed articles)
        // Repealed articles ("Vervallen") often lack <kop><nr> but retain the label attribute
        // Example: <artikel label="Artikel 4"> with text "Vervallen"
        if spec.tag == "artikel" {
            if let Some(label) = node.attribute("label") {
                if let Some(nr) = label.strip_prefix("Artikel ") {
                    if let Some(cleaned) = self.clean_number(nr) {
                        return Some(cleaned);
                    }
                }
            }
        }

        None
    }
}

impl LeafSplitStrategy {
    /// Clean up and normalize an article number.
    ///
    /// - Removes trailing punctuation (period, degree symbol)
    /// - Filters out bullet-only markers
    /// - Transforms asterisk suffix to "_bis" for transition articles
    fn clean_number(&self, nr: &str) -> Option<String> {
        // Clean up the number:
        // - Remove trailing punctuation (period, degree symbol for Dutch "1°", "2°")
        // - Trim whitespace
        let nr = nr.trim();
        let nr = nr
            .strip_suffix('.')
            .or_else(|| nr.strip_suffix('°'))
            .or_else(|| nr.strip_suffix("°."))
            .unwrap_or(nr)
            .trim();

        // Filter out bullet-only markers (used for formula variables, not article numbers)
        // Unicode bullet: U+2022 (•)
        // These appear in laws like Participatiewet article 22a for formula variable definitions
        if nr.is_empty() || nr == "•" {
            return None;
        }

        // Transform asterisk suffix to "_bis" for transition articles (overgangsartikelen)
        // Example: "78ee*" becomes "78ee_bis"
        // The asterisk in Dutch law denotes transition provisions added later
        let nr = if let Some(base) = nr.strip_suffix('*') {
            format!("{base}_bis")
        } else {
            nr.to_string()
        };

        Some(nr)
    }
}
