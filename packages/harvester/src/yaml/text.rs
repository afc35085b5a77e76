//! Text wrapping and normalization utilities for YAML output.

use regex::Regex;
use std::sync::LazyLock;
use textwrap::{fill, Options};

use crate::config::TEXT_WRAP_WIDTH;

/// Regex pattern for reference-style links [text][refN].
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REFERENCE_LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]\[ref\d+\]").expect("valid regex"));

/// Regex pattern for missing space after comma before a word character.
/// Matches "word,word" but not "word, word" or "1,000".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MISSING_SPACE_AFTER_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z]),([a-zA-Z])").expect("valid regex"));

/// Check if text contains reference-style links that would be broken by wrapping.
fn contains_reference_link(text: &str) -> bool {
    REFERENCE_LINK_PATTERN.is_match(text)
}

/// Normalize common typographical issues in source text.
///
/// Fixes:
/// - Missing space after comma before a word (e.g., "lid,van" → "lid, van")
///
/// This is needed because some official source XML contains typographical errors.
pub fn normalize_text(text: &str) -> String {
    // Loop until no more replacements needed (handles overlapping cases like "a,b,c")
    let mut result = text.to_string();
    loop {
        let replaced = MISSING_SPACE_AFTER_COMMA
            .replace_all(&result, "$1, $2")
            .to_string();
        if replaced == result {
            break;
        }
        result = replaced;
    }
    result
}

/// Wrap text at specified width, preserving paragraph breaks and reference definitions.
///
/// Reference definitions (lines starting with [refN]:) are preserved as-is
/// to maintain valid markdown reference-style links.
pub fn wrap_text(text: &str, width: usize) -> String {
    // Separate reference definitions from main text
    let lines: Vec<&str> = text.lines().collect();
    let mut ref_lines: Vec<&str> = Vec::new();
    let mut content_lines: Vec<&str> = Vec::new();

    // Find where reference definitions start (from end)
    // Only include empty lines that are BETWEEN reference definitions
    let mut in_refs = false;
    let mut pending_empty: Vec<&str> = Vec::new();

    for line in lines.iter().rev() {
        if line.starts_with("[ref") && line.contains("]: ") {
            // Found a reference line - include any pending empty lines
            for empty in pending_empty.drain(..).rev() {
                ref_lines.insert(0, empty);
            }
            ref_lines.insert(0, line);
            in_refs = true;
        } else if in_refs && line.is_empty() {
            // Empty line while in refs - save for later
            // Only add if followed by another ref line
            pending_empty.push(line);
        } else {
            // Non-ref line - move pending empties to content and exit ref mode
            for empty in pending_empty.drain(..) {
                content_lines.insert(0, empty);
            }
            in_refs = false;
            content_lines.insert(0, line);
        }
    }

    // Any remaining pending empties go to content
    for empty in pending_empty {
        content_lines.insert(0, empty);
    }

    // Wrap content paragraphs, but skip paragraphs containing reference-style links
    let content_text = content_lines.join("\n");
    let paragraphs: Vec<&str> = content_text.split("\n\n").collect();

    let options = Options::new(width);
    let wrapped: Vec<String> = paragraphs
        .iter()
        .map(|p| {
            if contains_reference_link(p) {
                // Don't wrap paragraphs with reference links - wrapping could break them
                (*p).to_string()
            } else {
                fill(p, &options)
            }
        })
        .collect();

    let wrapped_content = wrapped.join("\n\n");

    // Append reference definitions unchanged
    if !ref_lines.is_empty() {
        format!("{}\n\n{}", wrapped_content, ref_lines.join("\n"))
    } else {
        wrapped_content
    }
}

/// Check if text should be wrapped for readability.
pub fn should_wrap_text(text: &str) -> bool {
    let has_markdown_links = text.contains('[') && text.contains("](");
    text.len() > 80 || has_markdown_links
}

/// Wrap text with default width.
pub fn wrap_text_default(text: &str) -> String {
    wrap_text(text, TEXT_WRAP_WIDTH)
}
