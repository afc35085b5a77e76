//! Configuration constants for the aggregate decoder
//!
//! Centralized limits and format constants used throughout the decoder.
//! The depth limit exists to keep the recursive flatten and dispatch
//! steps bounded even against pathological input trees; well-formed
//! interchange documents nest only a handful of levels.

/// Maximum nesting depth accepted during flattening and nested decode.
///
/// The interchange format nests aggregates a handful of levels deep;
/// 32 is far beyond anything a conforming producer emits.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Separator that marks a tag as vendor-private (e.g. `INTU.BID`).
///
/// Leaf elements whose tag contains this separator are silently dropped
/// during flattening.
pub const VENDOR_TAG_SEPARATOR: char = '.';
