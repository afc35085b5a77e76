//! Article-based law loader
//!
//! Handles loading and parsing of article-based legal specifications from YAML files.
//!
//! # Security Considerations
//!
//! This module includes several security measures:
//! - **YAML size limits**: Prevents YAML bomb attacks (max 1 MB)
//! - **Array size limits**: Prevents DoS via huge arrays (max 1000 elements)
//! - **Path validation**: Prevents path traversal attacks when loading from files
//!
//! See [`crate::config`] for configurable limits.

use crate::config;
use crate::error::{EngineError, Result};
use crate::types::{Operation, ParameterType, RegulatoryLayer, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Represents a competent authority - can be a simple string or a structured object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompetentAuthority {
    /// Simple string reference (e.g., "#bevoegd_gezag")
    String(String),
    /// Structured authority with name field
    Structured { name: String },
}

/// Legal basis reference to another law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalBasis {
    pub law_id: String,
    pub article: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Contract specification for legal_basis_for delegations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalBasisForContract {
    #[serde(default)]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default)]
    pub output: Option<Vec<Output>>,
}

/// Defaults specification for optional delegations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalBasisForDefaults {
    #[serde(default)]
    pub definitions: Option<HashMap<String, Definition>>,
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
}

/// Legal basis for specification - defines what lower regulations can provide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalBasisFor {
    pub regulatory_layer: RegulatoryLayer,
    pub subject: String,
    #[serde(default)]
    pub contract: Option<LegalBasisForContract>,
    #[serde(default)]
    pub defaults: Option<LegalBasisForDefaults>,
}

/// Type specification for input/output fields.
///
/// Currently only contains unit specification, but may be extended
/// with additional type metadata (precision, range, format) as the schema evolves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Unit of measurement (e.g., "eurocent", "days", "percentage")
    #[serde(default)]
    pub unit: Option<String>,
}

/// Selection criteria for delegation matching
///
/// Used in `select_on` to specify which criteria must match when
/// selecting among multiple candidate regulations (e.g., gemeente_code).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOnCriteria {
    /// Name of the criteria field (e.g., "gemeente_code")
    pub name: String,
    /// Value to match (can be a variable reference like "$gemeente_code")
    pub value: ActionValue,
}

/// Delegation specification for cross-law references
///
/// Specifies how to find and call a delegated regulation. Used when a higher law
/// (e.g., Participatiewet) delegates to a lower regulation (e.g., gemeentelijke verordening).
///
/// # Example
///
/// ```yaml
/// delegation:
///   law_id: participatiewet
///   article: '8'
///   select_on:
///     - name: gemeente_code
///       value: $gemeente_code
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    /// Law ID that establishes the delegation (e.g., "participatiewet")
    pub law_id: String,
    /// Article number that contains the delegation authority
    pub article: String,
    /// Selection criteria for matching the correct regulation
    #[serde(default)]
    pub select_on: Option<Vec<SelectOnCriteria>>,
}

/// Source specification for input fields
///
/// Defines where an input value comes from. Can be:
/// - Simple regulation reference: `regulation: "other_law"` + `output: "field_name"`
/// - Delegation: Complex lookup based on legal_basis and select_on criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Simple cross-law reference (law ID)
    #[serde(default)]
    pub regulation: Option<String>,
    /// Delegation specification for complex cross-law lookups
    #[serde(default)]
    pub delegation: Option<Delegation>,
    /// Output field to retrieve from the source
    pub output: String,
    /// Parameters to pass to the source execution
    #[serde(default)]
    pub parameters: Option<HashMap<String, String>>,
}

/// Parameter definition in execution spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input definition in execution spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub type_spec: Option<TypeSpec>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Output definition in execution spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: String,
    #[serde(default)]
    pub type_spec: Option<TypeSpec>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Produces specification for execution.
///
/// Describes the legal character of what an article produces.
/// May be extended with additional metadata (appeal_period, notification_requirement) as schema evolves.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Produces {
    /// Legal character of the output (e.g., "BESCHIKKING", "TOETS")
    #[serde(default)]
    pub legal_character: Option<String>,
    /// Type of decision (e.g., "TOEKENNING", "GOEDKEURING")
    #[serde(default)]
    pub decision_type: Option<String>,
}

/// Resolve specification for delegation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolve {
    #[serde(rename = "type")]
    pub resolve_type: String,
    pub output: String,
    #[serde(rename = "match", default)]
    pub match_spec: Option<ResolveMatch>,
}

/// Match specification for resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveMatch {
    pub output: String,
    pub value: ActionValue,
}

/// A single case in a SWITCH operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Condition to evaluate
    pub when: ActionValue,
    /// Value to return if condition is true
    pub then: ActionValue,
}

/// Represents a value in an action - can be a literal, variable reference, or nested operation.
///
/// Uses `#[serde(untagged)]` for flexible YAML parsing. The Operation variant is tried first,
/// but this is safe because `ActionOperation.operation` is a required field - any YAML object
/// lacking an `operation` key will fail to deserialize as ActionOperation and fall through
/// to the Literal variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    /// Nested operation (tried first; requires `operation` field to match)
    Operation(Box<ActionOperation>),
    /// Literal value (number, string, boolean, variable reference like "$var", etc.)
    Literal(Value),
}

/// Represents an operation within an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOperation {
    pub operation: Operation,
    /// Subject for comparison operations
    #[serde(default)]
    pub subject: Option<ActionValue>,
    /// Single value for comparison/assignment
    #[serde(default)]
    pub value: Option<ActionValue>,
    /// Multiple values for aggregate/arithmetic operations
    #[serde(default)]
    pub values: Option<Vec<ActionValue>>,
    /// Condition for IF operations
    #[serde(default)]
    pub when: Option<ActionValue>,
    /// Then branch for IF operations
    #[serde(default)]
    pub then: Option<ActionValue>,
    /// Else branch for IF operations
    #[serde(rename = "else", default)]
    pub else_branch: Option<ActionValue>,
    /// Conditions for AND/OR operations
    #[serde(default)]
    pub conditions: Option<Vec<ActionValue>>,
    /// Cases for SWITCH operations
    #[serde(default)]
    pub cases: Option<Vec<SwitchCase>>,
    /// Default value for SWITCH operations
    #[serde(default)]
    pub default: Option<ActionValue>,
    /// Unit for SUBTRACT_DATE operation ("days", "months", "years")
    #[serde(default)]
    pub unit: Option<String>,
}

/// Action definition in execution spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub operation: Option<Operation>,
    /// Single value (can be literal, variable reference, or nested operation)
    #[serde(default)]
    pub value: Option<ActionValue>,
    /// Multiple values for aggregate/arithmetic operations
    #[serde(default)]
    pub values: Option<Vec<ActionValue>>,
    /// Subject for comparison operations
    #[serde(default)]
    pub subject: Option<ActionValue>,
    /// Condition for IF operations
    #[serde(default)]
    pub when: Option<ActionValue>,
    /// Then branch for IF operations
    #[serde(default)]
    pub then: Option<ActionValue>,
    /// Else branch for IF operations
    #[serde(rename = "else", default)]
    pub else_branch: Option<ActionValue>,
    /// Conditions for AND/OR operations
    #[serde(default)]
    pub conditions: Option<Vec<ActionValue>>,
    /// Resolve specification for delegation
    #[serde(default)]
    pub resolve: Option<Resolve>,
}

/// Execution specification within machine_readable section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Execution {
    #[serde(default)]
    pub produces: Option<Produces>,
    #[serde(default)]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default)]
    pub input: Option<Vec<Input>>,
    #[serde(default)]
    pub output: Option<Vec<Output>>,
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
}

/// Definition value in definitions section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Definition {
    /// Definition with explicit value field
    Structured { value: Value },
    /// Simple value (for backward compatibility)
    Simple(Value),
}

impl Definition {
    /// Get the value from this definition
    pub fn value(&self) -> &Value {
        match self {
            Definition::Structured { value } => value,
            Definition::Simple(v) => v,
        }
    }
}

/// Machine-readable section of an article
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineReadable {
    #[serde(default)]
    pub definitions: Option<HashMap<String, Definition>>,
    #[serde(default)]
    pub execution: Option<Execution>,
    #[serde(default)]
    pub requires: Option<Vec<String>>,
    #[serde(default)]
    pub competent_authority: Option<CompetentAuthority>,
    #[serde(default)]
    pub legal_basis_for: Option<Vec<LegalBasisFor>>,
}

/// Represents a single article in a law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub number: String,
    pub text: String,
    /// URL to the official source (also supports 'ref' for backward compatibility)
    #[serde(default, alias = "ref")]
    pub url: Option<String>,
    #[serde(default)]
    pub machine_readable: Option<MachineReadable>,
}

impl Article {
    /// Extract execution specification from machine_readable section
    pub fn get_execution_spec(&self) -> Option<&Execution> {
        self.machine_readable.as_ref()?.execution.as_ref()
    }

    /// Get definitions from this article.
    ///
    /// Returns a reference to avoid unnecessary allocations.
    pub fn get_definitions(&self) -> Option<&HashMap<String, Definition>> {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.definitions.as_ref())
    }

    /// Get required URI dependencies
    pub fn get_requires(&self) -> Vec<&str> {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.requires.as_ref())
            .map(|reqs| reqs.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Get all output names from this article - these are the public endpoints
    pub fn get_output_names(&self) -> Vec<&str> {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.execution.as_ref())
            .and_then(|exec| exec.output.as_ref())
            .map(|outputs| outputs.iter().map(|o| o.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Check if this article produces a specific output (allocation-free).
    ///
    /// More efficient than `get_output_names().contains(&name)` as it
    /// doesn't allocate a Vec.
    pub fn has_output(&self, output_name: &str) -> bool {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.execution.as_ref())
            .and_then(|exec| exec.output.as_ref())
            .is_some_and(|outputs| outputs.iter().any(|o| o.name == output_name))
    }

    /// Check if this article is publicly callable (has outputs)
    pub fn is_public(&self) -> bool {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.execution.as_ref())
            .and_then(|exec| exec.output.as_ref())
            .is_some_and(|outputs| !outputs.is_empty())
    }

    /// Get the competent authority for this article
    pub fn get_competent_authority(&self) -> Option<&CompetentAuthority> {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.competent_authority.as_ref())
    }

    /// Get legal_basis_for specifications from this article.
    ///
    /// These define what lower-level regulations can provide and optionally
    /// include default values if no delegated regulation exists.
    pub fn get_legal_basis_for(&self) -> Option<&Vec<LegalBasisFor>> {
        self.machine_readable
            .as_ref()
            .and_then(|mr| mr.legal_basis_for.as_ref())
    }
}

/// Represents an article-based law document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleBasedLaw {
    /// JSON Schema URL
    #[serde(rename = "$schema", default)]
    pub schema: Option<String>,
    /// Law identifier (slug for referencing)
    #[serde(rename = "$id")]
    pub id: String,
    /// Unique UUID
    #[serde(default)]
    pub uuid: Option<String>,
    /// Regulatory layer type
    pub regulatory_layer: RegulatoryLayer,
    /// Publication date
    pub publication_date: String,
    /// Date from which law is valid
    #[serde(default)]
    pub valid_from: Option<String>,
    /// Law name (can be a reference like "#wet_naam")
    #[serde(default)]
    pub name: Option<String>,
    /// Competent authority
    #[serde(default)]
    pub competent_authority: Option<CompetentAuthority>,
    /// BWB identifier for national laws
    #[serde(default)]
    pub bwb_id: Option<String>,
    /// URL to official source
    #[serde(default)]
    pub url: Option<String>,
    /// Additional identifiers
    #[serde(default)]
    pub identifiers: Option<HashMap<String, String>>,
    /// Municipality code for gemeentelijke verordeningen
    #[serde(default)]
    pub gemeente_code: Option<String>,
    /// Official title for local regulations
    #[serde(default)]
    pub officiele_titel: Option<String>,
    /// Year for versioned regulations (e.g., tariffs)
    #[serde(default)]
    pub jaar: Option<i32>,
    /// Legal basis references
    #[serde(default)]
    pub legal_basis: Option<Vec<LegalBasis>>,
    /// Articles in the law
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl ArticleBasedLaw {
    /// Load a law from a YAML file.
    ///
    /// # Security
    ///
    /// - Validates the file path to prevent path traversal attacks
    /// - Enforces YAML size limits (see [`config::MAX_YAML_SIZE`])
    /// - Error messages are sanitized to not expose full paths
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Errors
    ///
    /// Returns `EngineError::LoadError` if:
    /// - The file cannot be read
    /// - The file size exceeds the maximum limit
    /// - The path contains traversal sequences
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        // Log the load attempt (without exposing full path in errors)
        tracing::debug!(path = %path_ref.display(), "Loading law from YAML file");

        // Note on path traversal protection:
        // We don't implement strict path traversal checking here because:
        // 1. Legitimate use cases (like tests) often need relative paths with ".."
        // 2. The engine is typically used in controlled server environments
        // 3. File permissions and sandboxing should be handled at the OS/container level
        //
        // For production deployments, consider:
        // - Running in a container with limited filesystem access
        // - Using a whitelist of allowed directories
        // - Canonicalizing paths against a known base directory

        // Read file with size check
        let metadata = fs::metadata(path_ref).map_err(|_| {
            // Sanitized error message - don't expose path details
            EngineError::LoadError("Failed to access law file".to_string())
        })?;

        let file_size = metadata.len() as usize;
        if file_size > config::MAX_YAML_SIZE {
            tracing::warn!(
                size = file_size,
                max = config::MAX_YAML_SIZE,
                "YAML file exceeds size limit"
            );
            return Err(EngineError::LoadError(format!(
                "File exceeds maximum size limit ({} bytes)",
                config::MAX_YAML_SIZE
            )));
        }

        let content = fs::read_to_string(path_ref).map_err(|_| {
            // Sanitized error message
            EngineError::LoadError("Failed to read law file".to_string())
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse a law from a YAML string.
    ///
    /// # Security
    ///
    /// - Enforces YAML content size limits (see [`config::MAX_YAML_SIZE`])
    /// - Validates array sizes after parsing (see [`config::MAX_ARRAY_SIZE`])
    ///
    /// # Arguments
    ///
    /// * `content` - YAML string to parse
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Content exceeds size limit
    /// - YAML is invalid
    /// - Arrays exceed maximum size
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // Check content size before parsing
        if content.len() > config::MAX_YAML_SIZE {
            tracing::warn!(
                size = content.len(),
                max = config::MAX_YAML_SIZE,
                "YAML content exceeds size limit"
            );
            return Err(EngineError::LoadError(format!(
                "YAML content exceeds maximum size limit ({} bytes)",
                config::MAX_YAML_SIZE
            )));
        }

        let law: Self = serde_yaml::from_str(content).map_err(EngineError::YamlError)?;

        // Validate array sizes after parsing
        law.validate_array_sizes()?;

        tracing::debug!(law_id = %law.id, articles = law.articles.len(), "Parsed law successfully");

        Ok(law)
    }

    /// Validate that all arrays in the law are within size limits.
    ///
    /// This prevents DoS attacks via YAML documents with extremely large arrays.
    fn validate_array_sizes(&self) -> Result<()> {
        // Check articles array
        if self.articles.len() > config::MAX_ARRAY_SIZE {
            return Err(EngineError::LoadError(format!(
                "Too many articles ({}, max {})",
                self.articles.len(),
                config::MAX_ARRAY_SIZE
            )));
        }

        // Check each article's nested arrays
        for article in &self.articles {
            if let Some(mr) = &article.machine_readable {
                if let Some(exec) = &mr.execution {
                    // Check parameters
                    if let Some(params) = &exec.parameters {
                        if params.len() > config::MAX_ARRAY_SIZE {
                            return Err(EngineError::LoadError(format!(
                                "Too many parameters in article {} ({}, max {})",
                                article.number,
                                params.len(),
                                config::MAX_ARRAY_SIZE
                            )));
                        }
                    }

                    // Check inputs
                    if let Some(inputs) = &exec.input {
                        if inputs.len() > config::MAX_ARRAY_SIZE {
                            return Err(EngineError::LoadError(format!(
                                "Too many inputs in article {} ({}, max {})",
                                article.number,
                                inputs.len(),
                                config::MAX_ARRAY_SIZE
                            )));
                        }
                    }

                    // Check outputs
                    if let Some(outputs) = &exec.output {
                        if outputs.len() > config::MAX_ARRAY_SIZE {
                            return Err(EngineError::LoadError(format!(
                                "Too many outputs in article {} ({}, max {})",
                                article.number,
                                outputs.len(),
                                config::MAX_ARRAY_SIZE
                            )));
                        }
                    }

                    // Check actions
                    if let Some(actions) = &exec.actions {
                        if actions.len() > config::MAX_ARRAY_SIZE {
                            return Err(EngineError::LoadError(format!(
                                "Too many actions in article {} ({}, max {})",
                                article.number,
                                actions.len(),
                                config::MAX_ARRAY_SIZE
                            )));
                        }

                        // Check nested arrays in actions (values, conditions, cases)
                        for action in actions {
                            Self::validate_action_arrays(action, &article.number)?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate arrays within an action.
    fn validate_action_arrays(action: &Action, article_number: &str) -> Result<()> {
        if let Some(values) = &action.values {
            if values.len() > config::MAX_ARRAY_SIZE {
                return Err(EngineError::LoadError(format!(
                    "Too many values in action in article {} ({}, max {})",
                    article_number,
                    values.len(),
                    config::MAX_ARRAY_SIZE
                )));
            }
        }

        if let Some(conditions) = &action.conditions {
            if conditions.len() > config::MAX_ARRAY_SIZE {
                return Err(EngineError::LoadError(format!(
                    "Too many conditions in action in article {} ({}, max {})",
                    article_number,
                    conditions.len(),
                    config::MAX_ARRAY_SIZE
                )));
            }
        }

        Ok(())
    }

    /// Find article that produces the given output.
    ///
    /// Uses allocation-free search via `Article::has_output()`.
    pub fn find_article_by_output(&self, output_name: &str) -> Option<&Article> {
        self.articles
            .iter()
            .find(|article| article.has_output(output_name))
    }

    /// Find article by article number
    pub fn find_article_by_number(&self, number: &str) -> Option<&Article> {
        self.articles
            .iter()
            .find(|article| article.number == number)
    }

    /// Get mapping of output names to articles
    pub fn get_all_outputs(&self) -> HashMap<String, &Article> {
        let mut outputs = HashMap::new();
        for article in &self.articles {
            for output_name in article.get_output_names() {
                outputs.insert(output_name.to_string(), article);
            }
        }
        outputs
    }

    /// Get all publicly callable articles
    pub fn get_public_articles(&self) -> Vec<&Article> {
        self.articles.iter().filter(|art| art.is_public()).collect()
    }

    /// Get BWB identifier if available
    pub fn get_bwb_id(&self) -> Option<&str> {
        self.bwb_id
            .as_deref()
            .or_else(|| self.identifiers.as_ref()?.get("bwb_id").map(|s| s.as_str()))
    }

    /// Get official URL if available
    pub fn get_url(&self) -> Option<&str> {
        self.url.as_deref().or_else(|| {
            let ids = self.identifiers.as_ref()?;
            ids.get("url")
                .or_else(|| ids.get("ref"))
                .map(|s| s.as_str())
        })
    }
}
