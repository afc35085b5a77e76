//! Inline element handlers for text-level elements.
//!
//! These handlers process elements that appear inline within text,
//! such as emphasis (nadruk), external references (extref), and
//! internal references (intref).

use regex::Regex;
use roxmltree::Node;
use std::sync::LazyLock;

use crate::registry::handler::{extract_text_with_tail, ElementHandler, RecurseFn};
use crate::registry::types::{ElementType, ParseContext, ParseResult};
use crate::types::Reference;

// Static regexes for parsing JCI references - all patterns are guaranteed to be valid
#[allow(clippy::expect_used)]
/// Regex for extracting BWB ID from JCI reference.
static BWB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BWBR\d+").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Regex for extracting article number from JCI reference.
/// Matches both numeric (1, 1a, 12bis) and Roman numeral (I, II, IV, etc.) article numbers.
static ARTIKEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"artikel=([IVXLCDM]+\w*|\d+\w*)").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Regex for extracting lid (paragraph) from JCI reference.
static LID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"lid=([^&]+)").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Regex for extracting onderdeel (subdivision) from JCI reference.
static ONDERDEEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"onderdeel=([^&]+)").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Regex for extracting hoofdstuk (chapter) from JCI reference.
static HOOFDSTUK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"hoofdstuk=([^&]+)").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Regex for extracting paragraaf (section) from JCI reference.
static PARAGRAAF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"paragraaf=([^&]+)").expect("valid regex"));

#[allow(clippy::expect_used)]
/// Regex for extracting afdeling (division) from JCI reference.
static AFDELING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"afdeling=([^&]+)").expect("valid regex"));

/// Convert JCI reference to wetten.overheid.nl URL.
///
/// Anchor priority: artikel > hoofdstuk > afdeling > paragraaf
fn convert_jci_to_url(jci_ref: &str) -> String {
    if let Some(bwb_match) = BWB_PATTERN.find(jci_ref) {
        let bwb_id = bwb_match.as_str();

        // Check anchors in priority order
        if let Some(caps) = ARTIKEL_PATTERN.captures(jci_ref) {
            let artikel = caps[1].replace(' ', "_");
            return format!("https://wetten.overheid.nl/{bwb_id}#Artikel{artikel}");
        }
        if let Some(caps) = HOOFDSTUK_PATTERN.captures(jci_ref) {
            let hoofdstuk = caps[1].replace(' ', "_");
            return format!("https://wetten.overheid.nl/{bwb_id}#Hoofdstuk{hoofdstuk}");
        }
        if let Some(caps) = AFDELING_PATTERN.captures(jci_ref) {
            let afdeling = caps[1].replace(' ', "_");
            return format!("https://wetten.overheid.nl/{bwb_id}#Afdeling{afdeling}");
        }
        if let Some(caps) = PARAGRAAF_PATTERN.captures(jci_ref) {
            let paragraaf = caps[1].replace(' ', "_");
            return format!("https://wetten.overheid.nl/{bwb_id}#Paragraaf{paragraaf}");
        }

        return format!("https://wetten.overheid.nl/{bwb_id}");
    }
    jci_ref.to_string()
}

/// Extract first capture group from a regex match.
fn extract_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|c| c[1].to_string())
}

/// Parse JCI reference to Reference object.
fn parse_jci_reference(jci_ref: &str) -> Option<Reference> {
    let bwb_id = BWB_PATTERN.find(jci_ref)?.as_str().to_string();

    Some(Reference {
        id: String::new(), // Will be set by collector
        bwb_id,
        artikel: extract_capture(&ARTIKEL_PATTERN, jci_ref),
        lid: extract_capture(&LID_PATTERN, jci_ref),
        onderdeel: extract_capture(&ONDERDEEL_PATTERN, jci_ref),
        hoofdstuk: extract_capture(&HOOFDSTUK_PATTERN, jci_ref),
        paragraaf: extract_capture(&PARAGRAAF_PATTERN, jci_ref),
        afdeling: extract_capture(&AFDELING_PATTERN, jci_ref),
    })
}

/// Handler for `<nadruk>` (emphasis) elements.
///
/// Converts emphasis to markdown: `**text**` for bold (type="vet"),
/// `*text*` for italic (default).
pub struct NadrukHandler;

impl ElementHandler for NadrukHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Inline
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        // Use extract_text_with_tail to properly handle nested elements
        let text = extract_text_with_tail(node, context, recurse);
        let nadruk_type = node.attribute("type").unwrap_or_default();

        let formatted = if nadruk_type == "vet" {
            format!("**{text}**")
        } else {
            format!("*{text}*")
        };

        ParseResult::new(formatted)
    }
}

/// Common logic for handling reference elements (extref/intref).
///
/// Converts references to markdown links using reference-style formatting
/// when a collector is available, or inline links otherwise.
fn handle_reference_element(node: Node<'_, '_>, context: &mut ParseContext<'_>) -> ParseResult {
    let ref_text = node.text().unwrap_or_default();
    let doc_attr = node.attribute("doc").unwrap_or_default();

    if let Some(collector) = &mut context.collector {
        // Try to parse as JCI reference
        if let Some(reference) = parse_jci_reference(doc_attr) {
            let ref_id = collector.add_full_reference(reference);
            return ParseResult::new(format!("[{ref_text}][{ref_id}]"));
        }
    }

    // Fallback to inline link
    if !doc_attr.is_empty() {
        let url = convert_jci_to_url(doc_attr);
        return ParseResult::new(format!("[{ref_text}]({url})"));
    }

    ParseResult::new(ref_text)
}

/// Handler for `<extref>` (external reference) elements.
///
/// Converts external references to markdown links using reference-style
/// formatting when a collector is available, or inline links otherwise.
pub struct ExtrefHandler;

impl ElementHandler for ExtrefHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Inline
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        handle_reference_element(node, context)
    }
}

/// Handler for `<intref>` (internal reference) elements.
///
/// Converts internal references to markdown links using reference-style
/// formatting when a collector is available, or inline links otherwise.
pub struct IntrefHandler;

impl ElementHandler for IntrefHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Inline
    }

    fn handle<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        context: &mut ParseContext<'_>,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        handle_reference_element(node, context)
    }
}

/// Handler for `<al>` (paragraph/alinea) elements.
///
/// Extracts inline text including child elements like extref, intref,
/// and nadruk. This is the main text container element.
pub struct AlHandler;

impl ElementHandler for AlHandler {
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

/// Handler for `<redactie>` (editorial note) elements.
///
/// Editorial notes are NOT law text - they are annotations from editors.
/// Examples:
/// - "Dit artikel is gewijzigd in verband met..."
/// - "Voor overige gevallen luidt het artikel als volgt:"
/// - "Vervallen."
///
/// These elements are SKIPPED (return empty text) during parsing.
pub struct RedactieHandler;

impl ElementHandler for RedactieHandler {
    fn element_type(&self) -> ElementType {
        ElementType::Skip // Editorial content is always skipped
    }

    fn handle<'a, 'input>(
        &self,
        _node: Node<'a, 'input>,
        _context: &mut ParseContext<'_>,
        _recurse: &RecurseFn<'a, 'input>,
    ) -> ParseResult {
        // Return empty - editorial content is not law text
        ParseResult::empty()
    }
}
