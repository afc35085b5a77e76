//! Schema definitions and ancestor composition
//!
//! A [`SchemaDef`] declares one aggregate type: its own fields in
//! declaration order, the schemas it composes from, its subaggregate
//! slots, its mutually-exclusive sibling-tag pairs, and an optional
//! extraction hook. Composition linearizes the ancestor DAG (C3,
//! most-derived first, left-to-right per declared order, deduplicated)
//! and folds declarations in that order, so a field declared closer to
//! the concrete type overrides one declared by a more distant ancestor.
//!
//! Composition runs once when the registry is built; the resulting
//! [`Schema`] tables are immutable and shared by every decode call.

use crate::field::FieldSpec;
use crate::hooks::ExtractionHooks;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while composing the schema catalog.
///
/// These indicate a malformed catalog, not malformed input; they can only
/// occur while registering schema definitions.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema names an ancestor that is not defined
    #[error("Schema {schema} composes unknown ancestor {base}")]
    UnknownAncestor { schema: String, base: String },

    /// The ancestor graph is cyclic or admits no consistent linearization
    #[error("Ancestry of {0} cannot be linearized")]
    InconsistentAncestry(String),

    /// Two definitions share a tag name
    #[error("Duplicate schema definition for <{0}>")]
    DuplicateDefinition(String),
}

/// Shape of an attached subaggregate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// A single nested record
    Single,
    /// An ordered list of nested records
    List,
}

/// Declaration of one aggregate type.
pub struct SchemaDef {
    name: &'static str,
    bases: &'static [&'static str],
    fields: Vec<(&'static str, FieldSpec)>,
    children: Vec<(&'static str, ChildKind)>,
    exclusive: Vec<(&'static str, &'static str)>,
    hook: Option<&'static dyn ExtractionHooks>,
}

impl SchemaDef {
    /// Start a declaration for the given tag name.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            bases: &[],
            fields: Vec::new(),
            children: Vec::new(),
            exclusive: Vec::new(),
            hook: None,
        }
    }

    /// Declare the ancestor schemas, in composition order.
    #[must_use]
    pub fn bases(mut self, bases: &'static [&'static str]) -> Self {
        self.bases = bases;
        self
    }

    /// Declare one field.
    #[must_use]
    pub fn field(mut self, name: &'static str, spec: FieldSpec) -> Self {
        self.fields.push((name, spec));
        self
    }

    /// Declare a slot holding a single nested record.
    #[must_use]
    pub fn child(mut self, slot: &'static str) -> Self {
        self.children.push((slot, ChildKind::Single));
        self
    }

    /// Declare a slot holding an ordered list of nested records.
    #[must_use]
    pub fn child_list(mut self, slot: &'static str) -> Self {
        self.children.push((slot, ChildKind::List));
        self
    }

    /// Declare a mutually-exclusive sibling-tag pair.
    #[must_use]
    pub fn exclusive(mut self, first: &'static str, second: &'static str) -> Self {
        self.exclusive.push((first, second));
        self
    }

    /// Attach this type's extraction hook.
    #[must_use]
    pub fn hook(mut self, hook: &'static dyn ExtractionHooks) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Tag name of the declared type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The composed, immutable shape of one aggregate type.
pub struct Schema {
    name: String,
    fields: Vec<(String, FieldSpec)>,
    field_index: HashMap<String, usize>,
    children: HashMap<String, ChildKind>,
    exclusive: Vec<(String, String)>,
    hooks: Vec<&'static dyn ExtractionHooks>,
    linearization: Vec<String>,
}

impl Schema {
    /// Tag name of this schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a composed field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.field_index.get(name).map(|i| &self.fields[*i].1)
    }

    /// Composed fields in composition order (most-derived first).
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Declared kind of a subaggregate slot, if any.
    pub fn child_kind(&self, slot: &str) -> Option<ChildKind> {
        self.children.get(slot).copied()
    }

    /// Composed mutually-exclusive sibling-tag pairs.
    pub fn exclusive_pairs(&self) -> &[(String, String)] {
        &self.exclusive
    }

    /// Extraction hooks along the ancestry, base-first.
    pub(crate) fn hook_chain(&self) -> &[&'static dyn ExtractionHooks] {
        &self.hooks
    }

    /// The C3 linearization this schema was composed from.
    pub fn linearization(&self) -> &[String] {
        &self.linearization
    }
}

/// Compose the full catalog: every definition into its [`Schema`].
pub(crate) fn compose_all(
    defs: &[SchemaDef],
) -> Result<HashMap<String, Schema>, SchemaError> {
    let mut by_name: HashMap<&str, &SchemaDef> = HashMap::new();
    for def in defs {
        if by_name.insert(def.name, def).is_some() {
            return Err(SchemaError::DuplicateDefinition(def.name.to_string()));
        }
    }

    let mut composed = HashMap::new();
    for def in defs {
        composed.insert(def.name.to_string(), compose(def.name, &by_name)?);
    }
    Ok(composed)
}

fn compose(name: &str, defs: &HashMap<&str, &SchemaDef>) -> Result<Schema, SchemaError> {
    let mut stack = Vec::new();
    let linearization = linearize(name, defs, &mut stack)?;

    let mut fields: Vec<(String, FieldSpec)> = Vec::new();
    let mut field_index: HashMap<String, usize> = HashMap::new();
    let mut children: HashMap<String, ChildKind> = HashMap::new();
    let mut exclusive: Vec<(String, String)> = Vec::new();

    for schema_name in &linearization {
        let def = defs[schema_name.as_str()];
        for (field_name, spec) in &def.fields {
            // First declaration along the linearization wins: the most
            // specific schema overrides more distant ancestors.
            if !field_index.contains_key(*field_name) {
                field_index.insert((*field_name).to_string(), fields.len());
                fields.push(((*field_name).to_string(), spec.clone()));
            }
        }
        for (slot, kind) in &def.children {
            children.entry((*slot).to_string()).or_insert(*kind);
        }
        for (first, second) in &def.exclusive {
            let pair = ((*first).to_string(), (*second).to_string());
            if !exclusive.contains(&pair) {
                exclusive.push(pair);
            }
        }
    }

    // Base-first, so a derived hook sees the node after its ancestors ran.
    let hooks = linearization
        .iter()
        .rev()
        .filter_map(|n| defs[n.as_str()].hook)
        .collect();

    Ok(Schema {
        name: name.to_string(),
        fields,
        field_index,
        children,
        exclusive,
        hooks,
        linearization,
    })
}

fn linearize(
    name: &str,
    defs: &HashMap<&str, &SchemaDef>,
    stack: &mut Vec<String>,
) -> Result<Vec<String>, SchemaError> {
    if stack.iter().any(|n| n == name) {
        return Err(SchemaError::InconsistentAncestry(name.to_string()));
    }
    let def = defs
        .get(name)
        .ok_or_else(|| SchemaError::UnknownAncestor {
            schema: stack.last().cloned().unwrap_or_else(|| name.to_string()),
            base: name.to_string(),
        })?;

    stack.push(name.to_string());
    let mut sequences: Vec<Vec<String>> = Vec::new();
    for base in def.bases {
        sequences.push(linearize(base, defs, stack)?);
    }
    stack.pop();
    sequences.push(def.bases.iter().map(|b| (*b).to_string()).collect());

    let mut result = vec![name.to_string()];
    result.extend(
        c3_merge(sequences).ok_or_else(|| SchemaError::InconsistentAncestry(name.to_string()))?,
    );
    Ok(result)
}

/// C3 merge: repeatedly take the head that appears in no sequence's tail.
fn c3_merge(mut sequences: Vec<Vec<String>>) -> Option<Vec<String>> {
    let mut merged = Vec::new();
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(merged);
        }
        let candidate = sequences.iter().find_map(|s| {
            let head = &s[0];
            sequences
                .iter()
                .all(|other| !other[1..].contains(head))
                .then(|| head.clone())
        })?;
        for s in &mut sequences {
            if s.first() == Some(&candidate) {
                s.remove(0);
            }
        }
        merged.push(candidate);
    }
}
