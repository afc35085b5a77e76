//! Execution tracing for audit trails and debugging
//!
//! This module provides structures and utilities for recording the execution
//! path through law evaluation. This is useful for:
//!
//! - **Audit trails**: Documenting exactly how a decision was reached
//! - **Debugging**: Understanding why a particular result was produced
//! - **Explainability**: Providing transparency in automated legal decisions
//!
//! # Example
//!
//! ```ignore
//! use regelrecht_engine::trace::{PathNode, PathNodeType, TraceBuilder};
//!
//! let mut builder = TraceBuilder::new();
//!
//! // Start resolving a variable
//! builder.push("inkomen", PathNodeType::Resolve);
//!
//! // Nested operation
//! builder.push("vergelijk_drempel", PathNodeType::Operation);
//! builder.set_result(Value::Bool(true));
//! builder.pop();
//!
//! // Complete the resolution
//! builder.set_result(Value::Int(50000));
//! builder.pop();
//!
//! let trace = builder.build();
//! ```

use crate::types::{PathNodeType, ResolveType, Value};
use serde::Serialize;
use std::time::Instant;

/// A node in the execution trace tree.
///
/// Each node represents a single step in the execution process, such as:
/// - Resolving a variable
/// - Executing an operation
/// - Evaluating an action
///
/// Nodes can have children, forming a tree structure that mirrors the
/// nested nature of law evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct PathNode {
    /// Type of this execution step
    pub node_type: PathNodeType,

    /// Name or identifier for this step (e.g., variable name, operation type)
    pub name: String,

    /// The result value produced by this step, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// For resolve nodes, indicates how the value was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_type: Option<ResolveType>,

    /// Child nodes representing nested execution steps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PathNode>,

    /// Execution duration in microseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl PathNode {
    /// Create a new PathNode with the given type and name.
    pub fn new(node_type: PathNodeType, name: impl Into<String>) -> Self {
        Self {
            node_type,
            name: name.into(),
            result: None,
            resolve_type: None,
            children: Vec::new(),
            duration_us: None,
        }
    }

    /// Set the result value for this node.
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Set the resolve type for this node.
    pub fn with_resolve_type(mut self, resolve_type: ResolveType) -> Self {
        self.resolve_type = Some(resolve_type);
        self
    }

    /// Add a child node.
    pub fn with_child(mut self, child: PathNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the duration in microseconds.
    pub fn with_duration(mut self, duration_us: u64) -> Self {
        self.duration_us = Some(duration_us);
        self
    }

    /// Render the trace as a human-readable tree string.
    ///
    /// Produces output like:
    /// ```text
    /// calculate (action)
    /// +-- inkomen (resolve) [parameter] = 50000
    /// +-- drempel (resolve) [definition] = 30000
    /// `-- vergelijk (operation) = true
    ///     +-- $inkomen (resolve) = 50000
    ///     `-- $drempel (resolve) = 30000
    /// ```
    ///
    /// # Arguments
    /// * `indent` - Current indentation level (start with 0)
    /// * `is_last` - Whether this is the last child in its parent (affects line prefix)
    pub fn render(&self, indent: usize, is_last: bool) -> String {
        self.render_internal(indent, is_last, true)
    }

    /// Internal render implementation.
    fn render_internal(&self, indent: usize, is_last: bool, is_top_level: bool) -> String {
        let mut lines = Vec::new();

        // Build the prefix for this node
        let prefix = if is_top_level {
            String::new()
        } else if is_last {
            "`-- ".to_string()
        } else {
            "+-- ".to_string()
        };

        // Build indentation for child nodes
        let child_indent = if is_top_level {
            String::new()
        } else if is_last {
            "    ".to_string()
        } else {
            "|   ".to_string()
        };

        // Format the node type
        let type_str = match self.node_type {
            PathNodeType::Resolve => "resolve",
            PathNodeType::Operation => "operation",
            PathNodeType::Action => "action",
            PathNodeType::Requirement => "requirement",
            PathNodeType::UriCall => "uri_call",
            PathNodeType::Article => "article",
            PathNodeType::Delegation => "delegation",
        };

        // Build the main line
        let mut line = format!("{}{} ({})", prefix, self.name, type_str);

        // Add resolve type if present
        if let Some(ref rt) = self.resolve_type {
            let rt_str = match rt {
                ResolveType::Uri => "uri",
                ResolveType::Parameter => "parameter",
                ResolveType::Definition => "definition",
                ResolveType::Output => "output",
                ResolveType::Input => "input",
                ResolveType::Local => "local",
                ResolveType::Context => "context",
                ResolveType::ResolvedInput => "resolved_input",
                ResolveType::DataSource => "data_source",
            };
            line.push_str(&format!(" [{}]", rt_str));
        }

        // Add result if present
        if let Some(ref result) = self.result {
            line.push_str(&format!(" = {}", format_value_compact(result)));
        }

        // Add duration if present (and significant)
        if let Some(duration) = self.duration_us {
            if duration >= 100 {
                // Only show if >= 0.1ms
                line.push_str(&format!(" ({}Î¼s)", duration));
            }
        }

        lines.push(line);

        // Render children
        let child_count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            let is_last_child = i == child_count - 1;
            let child_str = child.render_internal(0, is_last_child, false);

            // Add proper indentation to each line of the child's output
            for (j, child_line) in child_str.lines().enumerate() {
                if j == 0 {
                    // First line gets the current indentation
                    lines.push(format!(
                        "{}{}",
                        " ".repeat(indent * 4) + &child_indent,
                        child_line
                    ));
                } else {
                    // Subsequent lines need continued indentation
                    lines.push(format!(
                        "{}{}",
                        " ".repeat(indent * 4) + &child_indent,
                        child_line
                    ));
                }
            }
        }

        lines.join("\n")
    }

    /// Render the trace as a compact single-line summary.
    pub fn render_compact(&self) -> String {
        let type_str = match self.node_type {
            PathNodeType::Resolve => "res",
            PathNodeType::Operation => "op",
            PathNodeType::Action => "act",
            PathNodeType::Requirement => "req",
            PathNodeType::UriCall => "uri",
            PathNodeType::Article => "art",
            PathNodeType::Delegation => "del",
        };

        let result_str = self
            .result
            .as_ref()
            .map(|v| format!("={}", format_value_compact(v)))
            .unwrap_or_default();

        format!("{}:{}{}", type_str, self.name, result_str)
    }
}

/// Format a Value compactly for trace output.
fn format_value_compact(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => {
            // Limit decimal places
            if f.fract() == 0.0 {
                format!("{:.1}", f)
            } else {
                format!("{:.2}", f)
            }
        }
        Value::String(s) => {
            // Truncate long strings
            if s.len() > 20 {
                format!("\"{}...\"", &s[..17])
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => {
            if arr.len() <= 3 {
                let items: Vec<String> = arr.iter().map(format_value_compact).collect();
                format!("[{}]", items.join(", "))
            } else {
                format!("[{} items]", arr.len())
            }
        }
        Value::Object(obj) => {
            format!("{{...{} keys}}", obj.len())
        }
    }
}

/// A node being built, with timing information.
#[derive(Debug)]
struct BuildingNode {
    node: PathNode,
    start_time: Instant,
}

/// Builder for constructing execution traces using a stack-based approach.
///
/// The builder maintains a stack of nodes being constructed. As execution
/// proceeds, nodes are pushed when entering a new scope and popped when
/// leaving. This naturally produces the tree structure of nested execution.
#[derive(Debug)]
pub struct TraceBuilder {
    /// Stack of nodes being built (last is current)
    stack: Vec<BuildingNode>,

    /// Whether tracing is enabled
    enabled: bool,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    /// Create a new TraceBuilder with tracing enabled.
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            enabled: true,
        }
    }

    /// Create a new TraceBuilder with tracing disabled (no-op).
    pub fn disabled() -> Self {
        Self {
            stack: Vec::new(),
            enabled: false,
        }
    }

    /// Check if tracing is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Push a new node onto the stack.
    ///
    /// Call this when entering a new execution scope (resolving a variable,
    /// starting an operation, etc.).
    pub fn push(&mut self, name: impl Into<String>, node_type: PathNodeType) {
        if !self.enabled {
            return;
        }

        let node = PathNode::new(node_type, name);
        self.stack.push(BuildingNode {
            node,
            start_time: Instant::now(),
        });
    }

    /// Set the result value for the current node.
    pub fn set_result(&mut self, result: Value) {
        if !self.enabled {
            return;
        }

        if let Some(current) = self.stack.last_mut() {
            current.node.result = Some(result);
        }
    }

    /// Set the resolve type for the current node.
    pub fn set_resolve_type(&mut self, resolve_type: ResolveType) {
        if !self.enabled {
            return;
        }

        if let Some(current) = self.stack.last_mut() {
            current.node.resolve_type = Some(resolve_type);
        }
    }

    /// Pop the current node from the stack, making it a child of the parent.
    ///
    /// Returns the popped node. If this was the last node on the stack,
    /// returns the completed root node.
    pub fn pop(&mut self) -> Option<PathNode> {
        if !self.enabled {
            return None;
        }

        let building = self.stack.pop()?;
        let duration = building.start_time.elapsed().as_micros() as u64;

        let mut completed = building.node;
        completed.duration_us = Some(duration);

        // If there's a parent, add this as a child
        if let Some(parent) = self.stack.last_mut() {
            parent.node.children.push(completed.clone());
        }

        Some(completed)
    }

    /// Build the final trace, consuming the builder.
    ///
    /// Pops all remaining nodes from the stack, returning the root node.
    /// Returns None if the stack is empty or tracing was disabled.
    pub fn build(mut self) -> Option<PathNode> {
        if !self.enabled {
            return None;
        }

        // Pop all nodes to build complete tree
        let mut result = None;
        while !self.stack.is_empty() {
            result = self.pop();
        }
        result
    }

    /// Get the current depth of the trace stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
