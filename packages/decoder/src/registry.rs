//! Schema registry and decode dispatcher
//!
//! The registry maps aggregate tag names to composed [`Schema`]s and
//! drives the decode pipeline:
//!
//! 1. look up the schema for the node's tag
//! 2. groom the node and reject mutually-exclusive sibling elements
//! 3. run the composed pre-flatten hook chain, collecting side data
//! 4. flatten the remaining subtree into a flat attribute mapping
//! 5. construct the record through the schema's field descriptors
//! 6. run the post-flatten hook, attaching side attributes and
//!    recursively decoded subaggregates
//!
//! The registry is built once and never mutated, so one instance can be
//! shared freely across threads; [`SchemaRegistry::shared`] exposes a
//! process-wide instance for the common case.

use crate::config;
use crate::error::{DecodeError, FieldError, Result};
use crate::flatten::flatten;
use crate::hooks::{Extracted, SubAggregate, DEFAULT_HOOKS};
use crate::models;
use crate::node::RawNode;
use crate::record::{Attachment, Record};
use crate::schema::{compose_all, ChildKind, Schema, SchemaDef, SchemaError};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Registry mapping aggregate tag names to composed schemas.
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Compose a registry from a set of schema definitions.
    pub fn build(defs: &[SchemaDef]) -> std::result::Result<Self, SchemaError> {
        let schemas = compose_all(defs)?;
        tracing::debug!(schemas = schemas.len(), "Schema registry composed");
        Ok(Self { schemas })
    }

    /// The registry over the standard aggregate catalog.
    pub fn standard() -> Self {
        #[allow(clippy::expect_used)]
        Self::build(&models::standard_definitions())
            .expect("standard schema catalog must compose")
    }

    /// Process-wide shared registry over the standard catalog, built on
    /// first use and safe for unsynchronized concurrent reads.
    pub fn shared() -> &'static SchemaRegistry {
        static SHARED: OnceLock<SchemaRegistry> = OnceLock::new();
        SHARED.get_or_init(SchemaRegistry::standard)
    }

    /// Look up the composed schema for a tag.
    pub fn schema(&self, tag: &str) -> Option<&Schema> {
        self.schemas.get(tag)
    }

    /// Whether a schema is registered for a tag.
    pub fn has_schema(&self, tag: &str) -> bool {
        self.schemas.contains_key(tag)
    }

    /// Return set of all registered tag names.
    #[must_use]
    pub fn registered_tags(&self) -> HashSet<&str> {
        self.schemas.keys().map(|s| s.as_str()).collect()
    }

    /// Decode a markup tree into a typed record.
    ///
    /// The caller's tree is cloned once and never mutated; the returned
    /// record is exclusively owned by the caller.
    pub fn decode(&self, node: &RawNode) -> Result<Record> {
        tracing::debug!(tag = node.tag(), "Decoding aggregate");
        self.decode_node(node.clone(), 0)
    }

    fn decode_node(&self, mut node: RawNode, depth: usize) -> Result<Record> {
        if depth > config::MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep { depth });
        }
        let schema = self
            .schema(node.tag())
            .ok_or_else(|| DecodeError::UnknownAggregate {
                tag: node.tag().to_string(),
            })?;

        groom(&mut node, schema)?;

        let mut extracted = Extracted::new();
        for hook in schema.hook_chain() {
            extracted.merge(hook.pre_flatten(&mut node)?);
        }

        let attributes = flatten(&node)?;
        let mut record = construct(schema, attributes)?;

        let ctx = DecodeContext {
            registry: self,
            schema,
            depth,
        };
        let post = schema.hook_chain().last().copied().unwrap_or(&DEFAULT_HOOKS);
        post.post_flatten(&ctx, &mut record, extracted)?;

        Ok(record)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decode a markup tree against the standard shared registry.
pub fn decode(node: &RawNode) -> Result<Record> {
    SchemaRegistry::shared().decode(node)
}

/// Normalize the node and enforce the schema's sibling exclusions before
/// any hook touches it.
fn groom(node: &mut RawNode, schema: &Schema) -> Result<()> {
    // <YIELD> is decoded under the field name `yld`.
    node.rename_child("YIELD", "YLD");

    for (first, second) in schema.exclusive_pairs() {
        if node.has_child(first) && node.has_child(second) {
            return Err(DecodeError::MutuallyExclusiveElements {
                parent: node.tag().to_string(),
                first: first.clone(),
                second: second.clone(),
            });
        }
    }
    Ok(())
}

/// Build a record from the flattened attributes, validating every field
/// and rejecting attributes no field claims.
fn construct(schema: &Schema, mut attributes: HashMap<String, String>) -> Result<Record> {
    let mut record = Record::new(schema.name());

    for (name, spec) in schema.fields() {
        match attributes.remove(name) {
            Some(raw) => {
                let value = spec.convert(&raw).map_err(|source| DecodeError::FieldValidation {
                    schema: schema.name().to_string(),
                    field: name.to_string(),
                    source,
                })?;
                record.set_field(name, value);
            }
            None if spec.is_required() => {
                return Err(DecodeError::FieldValidation {
                    schema: schema.name().to_string(),
                    field: name.to_string(),
                    source: FieldError::Missing,
                });
            }
            None => {}
        }
    }

    if !attributes.is_empty() {
        let mut keys: Vec<String> = attributes.into_keys().collect();
        keys.sort();
        return Err(DecodeError::UnclaimedAttributes {
            schema: schema.name().to_string(),
            keys,
        });
    }

    Ok(record)
}

/// Handle given to post-flatten hooks for attaching side data.
pub struct DecodeContext<'a> {
    registry: &'a SchemaRegistry,
    schema: &'a Schema,
    depth: usize,
}

impl DecodeContext<'_> {
    /// The registry driving this decode call.
    pub fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    /// The schema of the record under construction.
    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Decode an extracted subtree through the full pipeline.
    pub fn decode_child(&self, node: RawNode) -> Result<Record> {
        self.registry.decode_node(node, self.depth + 1)
    }

    /// Generic attachment: side attributes go through the schema's field
    /// descriptors; side subaggregates are decoded recursively and
    /// attached under their declared slots, lists in source order.
    pub fn attach(&self, record: &mut Record, extracted: Extracted) -> Result<()> {
        let (attributes, subaggregates) = extracted.into_parts();

        for (field, raw) in attributes {
            let Some(spec) = self.schema.field(&field) else {
                return Err(DecodeError::UnclaimedAttributes {
                    schema: self.schema.name().to_string(),
                    keys: vec![field],
                });
            };
            let value = spec.convert(&raw).map_err(|source| DecodeError::FieldValidation {
                schema: self.schema.name().to_string(),
                field: field.clone(),
                source,
            })?;
            record.set_field(field, value);
        }

        for (slot, sub) in subaggregates {
            let attachment = match (self.schema.child_kind(&slot), sub) {
                (Some(ChildKind::Single), SubAggregate::Single(node)) => {
                    Attachment::Single(self.decode_child(node)?)
                }
                (Some(ChildKind::List), SubAggregate::List(nodes)) => {
                    let mut records = Vec::with_capacity(nodes.len());
                    for node in nodes {
                        records.push(self.decode_child(node)?);
                    }
                    Attachment::List(records)
                }
                _ => {
                    return Err(DecodeError::UnclaimedAttributes {
                        schema: self.schema.name().to_string(),
                        keys: vec![slot],
                    });
                }
            };
            record.attach(slot, attachment);
        }

        Ok(())
    }
}
