//! Preamble element handlers for law introductions.
//!
//! These handlers process elements in the preamble (aanhef) of Dutch laws,
//! including the royal introduction and considerations.

use roxmltree::Node;

use crate::registry::handler::{extract_text_with_tail, ElementHandler, RecurseFn};
use crate::registry::types::{ElementType, ParseContext, ParseResult};
use crate::xml::get_tag_name;

/// Handler for `<wij>` (royal "We") elements.
///
/// The opening of the preamble, typically "Wij Beatrix..." or "Wij Willem-Alexander...".
pub struct WijHandler;

impl ElementHandler for WijHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Inline
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        _context: &mut ParseContext<'_>,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        let text = node.text().map(|s| s.trim()).unwrap_or_default();
        ParseResult::new(text)
    }
}

/// Handler for `<considerans>` (considerations) elements.
///
/// Contains the legal considerations for the law.
pub struct ConsideransHandler;

impl ElementHandler for ConsideransHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Structural
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        let mut parts: Vec<String> = Vec::new();

        for child in node.children() {
            if child.is_element() {
                let result = recurse(child, context);
                if !result.text.is_empty() {
                    parts.push(result.text);
                }
            }
        }

        ParseResult::new(parts.join("\n\n"))
    }
}

/// Handler for `<considerans.al>` (consideration paragraph) elements.
pub struct ConsideransAlHandler;

impl ElementHandler for ConsideransAlHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Inline
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        ParseResult::new(extract_text_with_tail(node, context, recurse))
    }
}

/// Handler for `<afkondiging>` (proclamation) elements.
pub struct AfkondigingHandler;

impl ElementHandler for AfkondigingHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Structural
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        let mut parts: Vec<String> = Vec::new();

        for child in node.children() {
            if child.is_element() && get_tag_name(child) == "al" {
                let result = recurse(child, context);
                if !result.text.is_empty() {
                    parts.push(result.text);
                }
            }
        }

        ParseResult::new(parts.join("\n\n"))
    }
}

/// Handler for `<aanhef>` (preamble) elements.
pub struct AanhefHandler;

impl ElementHandler for AanhefHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Structural
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        let mut parts: Vec<String> = Vec::new();

        for child in node.children() {
            if child.is_element() {
                let result = recurse(child, context);
                if !result.text.is_empty() {
                    parts.push(result.text);
                }
            }
        }

        ParseResult::new(parts.join("\n\n"))
    }
}
