//! Parse engine that orchestrates element parsing using the registry.

use roxmltree::Node;

use super::core::ElementRegistry;
use super::types::{ParseContext, ParseResult};
use crate::error::{HarvesterError, Result};
use crate::xml::get_tag_name;

/// Engine that orchestrates element parsing using the registry.
///
/// The engine walks the XML tree and dispatches elements to their
/// registered handlers. It raises `UnknownElement` error for any element
/// that has no handler and is not marked as skip.
pub struct ParseEngine {
    registry: ElementRegistry,
}

impl ParseEngine {
    /// Create a new engine with the given registry.
    #[must_use]
    pub fn new(registry: ElementRegistry) -> Self {
        Self { registry }
    }

    /// Get a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Parse an element tree recursively.
    ///
    /// # Arguments
    /// * `node` - The XML element to parse
    /// * `context` - Current parsing context
    ///
    /// # Returns
    /// `ParseResult` containing the extracted text
    ///
    /// # Errors
    /// Returns `UnknownElement` error if an element has no handler and is not skipped.
    pub fn parse(&self, node: Node<'_, '_>, context: &mut ParseContext<'_>) -> Result<ParseResult> {
        let tag_name = get_tag_name(node);

        // Skip marked elements
        if self.registry.should_skip(tag_name) {
            return Ok(ParseResult::empty());
        }

        // Get handler
        if let Some(handler) = self.registry.get_handler(node, context) {
            // Create recursive parsing closure that logs errors but continues parsing
            let recurse = |child: Node<'_, '_>, ctx: &mut ParseContext<'_>| -> ParseResult {
                self.parse(child, ctx).unwrap_or_else(|err| {
                    tracing::warn!(
                        error = %err,
                        tag = %get_tag_name(child),
                        "Error parsing child element, skipping"
                    );
                    ParseResult::empty()
                })
            };

            return Ok(handler.handle(node, context, &recurse));
        }

        // No handler - raise error with parent context
        let parent_context = node
            .parent_element()
            .map(|p| format!("<{}>", get_tag_name(p)));
        Err(HarvesterError::UnknownElement {
            tag_name: tag_name.to_string(),
            context: parent_context,
        })
    }

}
