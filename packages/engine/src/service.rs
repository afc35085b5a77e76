//! Service layer for cross-law resolution
//!
//! Provides the `ServiceProvider` trait and `LawExecutionService` implementation
//! for resolving cross-law references and delegation lookups.
//!
//! # Example
//!
//! ```ignore
//! use regelrecht_engine::{LawExecutionService, Value};
//! use std::collections::HashMap;
//!
//! let mut service = LawExecutionService::new();
//! service.load_law(zorgtoeslagwet_yaml)?;
//! service.load_law(regeling_standaardpremie_yaml)?;
//!
//! let mut params = HashMap::new();
//! params.insert("BSN".to_string(), Value::String("123456789".to_string()));
//!
//! // This will automatically resolve cross-law references
//! let result = service.evaluate_law_output(
//!     "wet_op_de_zorgtoeslag",
//!     "heeft_recht_op_zorgtoeslag",
//!     params,
//!     "2025-01-01",
//! )?;
//! ```

use crate::article::{
    Action, Article, ArticleBasedLaw, Input, LegalBasisForDefaults, Resolve, SelectOnCriteria,
};
use crate::config;
use crate::context::RuleContext;
use crate::data_source::{DataSource, DataSourceRegistry, DictDataSource};
use crate::engine::{
    evaluate_select_on_criteria, get_delegation_info, ArticleEngine, ArticleResult,
};
use crate::error::{EngineError, Result};
use crate::operations::evaluate_value;
use crate::operations::values_equal;
use crate::operations::ValueResolver;
use crate::resolver::RuleResolver;
use crate::types::{RegulatoryLayer, Value};
use crate::uri::RegelrechtUri;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Resolution Context
// =============================================================================

/// Context for tracking cross-law resolution state.
///
/// Bundles the state needed for cycle detection and depth tracking
/// during cross-law reference resolution. This reduces the number of
/// parameters passed between internal resolution functions.
///
/// Uses a scoped push/pop pattern for the visited set to avoid
/// cloning the HashSet on every cross-law descent.
struct ResolutionContext<'a> {
    /// Date for calculations (YYYY-MM-DD)
    calculation_date: &'a str,
    /// Set of law#output keys already being resolved (cycle detection)
    visited: HashSet<String>,
    /// Current resolution depth
    depth: usize,
}

impl<'a> ResolutionContext<'a> {
    /// Create a new resolution context.
    fn new(calculation_date: &'a str) -> Self {
        Self {
            calculation_date,
            visited: HashSet::new(),
            depth: 0,
        }
    }

    /// Parse the calculation_date as NaiveDate for version selection.
    fn reference_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.calculation_date, "%Y-%m-%d").ok()
    }

    /// Enter a cross-law resolution scope: mark key as visited and increment depth.
    fn enter(&mut self, key: String) {
        self.visited.insert(key);
        self.depth += 1;
    }

    /// Leave a cross-law resolution scope: unmark key and decrement depth.
    fn leave(&mut self, key: &str) {
        self.visited.remove(key);
        self.depth -= 1;
    }

    /// Check if a key is already being resolved (cycle detection).
    fn is_visited(&self, key: &str) -> bool {
        self.visited.contains(key)
    }
}

/// Reference to a delegation source for resolution.
///
/// Bundles the delegation-specific parameters to reduce argument count
/// in delegation resolution functions.
struct DelegationRef<'a> {
    /// The law that grants the delegation
    law_id: &'a str,
    /// The article that grants the delegation
    article: &'a str,
    /// Criteria for selecting the delegated regulation
    select_on: Option<&'a [SelectOnCriteria]>,
}

/// Trait for resolving cross-law references and delegations.
///
/// Implement this trait to provide custom law loading and resolution strategies.
/// The default implementation is `LawExecutionService`.
pub trait ServiceProvider {
    /// Resolve and execute a regelrecht:// URI.
    ///
    /// # Arguments
    /// * `uri` - The URI to resolve (e.g., "regelrecht://law_id/output")
    /// * `parameters` - Parameters to pass to the target article
    /// * `calculation_date` - Date for calculations (YYYY-MM-DD)
    ///
    /// # Returns
    /// The execution result from the referenced article.
    fn evaluate_uri(
        &self,
        uri: &str,
        parameters: &HashMap<String, Value>,
        calculation_date: &str,
    ) -> Result<ArticleResult>;

    /// Find a delegated regulation matching the given criteria.
    ///
    /// # Arguments
    /// * `law_id` - The law that grants the delegation
    /// * `article` - The article number that grants the delegation
    /// * `criteria` - Evaluated select_on criteria to match
    /// * `reference_date` - Optional date to select the appropriate law version
    ///
    /// # Returns
    /// Reference to the matching regulation, if found.
    fn find_delegated_regulation(
        &self,
        law_id: &str,
        article: &str,
        criteria: &HashMap<String, Value>,
        reference_date: Option<NaiveDate>,
    ) -> Result<Option<&ArticleBasedLaw>>;

    /// Get a law by ID.
    fn get_law(&self, law_id: &str) -> Option<&ArticleBasedLaw>;

    /// Resolve an external input source.
    ///
    /// This is the main entry point for resolving `source.regulation` references.
    ///
    /// # Arguments
    /// * `regulation` - The target regulation ID
    /// * `output` - The output name to resolve
    /// * `source_parameters` - Parameters mapping from source (e.g., {"BSN": "$BSN"})
    /// * `context` - Current execution context for parameter resolution
    /// * `calculation_date` - Date for calculations
    fn resolve_external_input(
        &self,
        regulation: &str,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        calculation_date: &str,
    ) -> Result<Value>;

    /// Resolve a delegation input source.
    ///
    /// This resolves `source.delegation` references by finding the matching
    /// regulation and executing its article.
    ///
    /// # Arguments
    /// * `delegation_law_id` - The law that grants the delegation
    /// * `delegation_article` - The article that grants the delegation
    /// * `select_on` - Criteria for selecting the delegated regulation
    /// * `output` - The output name to resolve
    /// * `source_parameters` - Parameters mapping from source
    /// * `context` - Current execution context
    /// * `calculation_date` - Date for calculations
    #[allow(clippy::too_many_arguments)]
    fn resolve_delegation_input(
        &self,
        delegation_law_id: &str,
        delegation_article: &str,
        select_on: Option<&[SelectOnCriteria]>,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        calculation_date: &str,
    ) -> Result<Value>;
}

/// Metadata about a loaded law.
///
/// Provides summary information about a law without requiring full article access.
#[derive(Debug, Clone)]
pub struct LawInfo {
    /// Law identifier
    pub id: String,
    /// Regulatory layer
    pub regulatory_layer: RegulatoryLayer,
    /// Publication date
    pub publication_date: String,
    /// BWB identifier (for national laws)
    pub bwb_id: Option<String>,
    /// URL to official source
    pub url: Option<String>,
    /// List of output names produced by this law
    pub outputs: Vec<String>,
    /// Number of articles in the law
    pub article_count: usize,
}

/// Parse a resolve type string to a `RegulatoryLayer` for filtering.
///
/// Maps resolve type strings (from YAML `resolve.type` fields) to the
/// corresponding `RegulatoryLayer` enum variant.
fn parse_regulatory_layer(resolve_type: &str) -> Option<RegulatoryLayer> {
    match resolve_type.to_lowercase().as_str() {
        "ministeriele_regeling" => Some(RegulatoryLayer::MinisterieleRegeling),
        "wet" => Some(RegulatoryLayer::Wet),
        "amvb" => Some(RegulatoryLayer::Amvb),
        "gemeentelijke_verordening" => Some(RegulatoryLayer::GemeentelijkeVerordening),
        "beleidsregel" => Some(RegulatoryLayer::Beleidsregel),
        _ => None,
    }
}

/// High-level service for executing laws with automatic cross-law resolution.
///
/// `LawExecutionService` wraps a `RuleResolver` and implements `ServiceProvider`
/// to enable automatic resolution of external references and delegations.
/// It also supports external data sources via `DataSourceRegistry`.
pub struct LawExecutionService {
    resolver: RuleResolver,
    /// Staged for future integration: will be queried during law execution
    /// to resolve external data (e.g., citizen income, municipality data).
    /// Currently only supports manual CRUD; automatic resolution during
    /// execution is not yet wired up.
    data_registry: DataSourceRegistry,
}

impl Default for LawExecutionService {
    fn default() -> Self {
        Self::new()
    }
}

impl LawExecutionService {
    /// Create a new empty service.
    pub fn new() -> Self {
        Self {
            resolver: RuleResolver::new(),
            data_registry: DataSourceRegistry::new(),
        }
    }

    /// Load a law from YAML string.
    ///
    /// # Returns
    /// The law ID on success.
    pub fn load_law(&mut self, yaml: &str) -> Result<String> {
        self.resolver.load_from_yaml(yaml)
    }

    /// Load a law struct directly.
    ///
    /// # Returns
    /// `Ok(())` on success, `Err` if the maximum number of laws would be exceeded.
    pub fn load_law_struct(&mut self, law: ArticleBasedLaw) -> Result<()> {
        self.resolver.load_law(law)
    }

    /// Execute a law output by name.
    ///
    /// This is the main entry point for law execution. It finds the article
    /// that produces the requested output and executes it, automatically
    /// resolving any cross-law references.
    ///
    /// # Arguments
    /// * `law_id` - The law identifier (e.g., "zorgtoeslagwet")
    /// * `output_name` - The output to calculate
    /// * `parameters` - Input parameters
    /// * `calculation_date` - Date for calculations (YYYY-MM-DD)
    ///
    /// # Returns
    /// The execution result with outputs and metadata.
    pub fn evaluate_law_output(
        &self,
        law_id: &str,
        output_name: &str,
        parameters: HashMap<String, Value>,
        calculation_date: &str,
    ) -> Result<ArticleResult> {
        let mut res_ctx = ResolutionContext::new(calculation_date);
        self.evaluate_law_output_internal(law_id, output_name, parameters, &mut res_ctx)
    }

    /// Internal method with cycle tracking.
    fn evaluate_law_output_internal(
        &self,
        law_id: &str,
        output_name: &str,
        parameters: HashMap<String, Value>,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<ArticleResult> {
        tracing::debug!(
            law_id = %law_id,
            output = %output_name,
            depth = res_ctx.depth,
            "Resolving cross-law reference"
        );

        // Check depth limit
        if res_ctx.depth > config::MAX_CROSS_LAW_DEPTH {
            tracing::warn!(
                law_id = %law_id,
                output = %output_name,
                depth = res_ctx.depth,
                "Cross-law resolution depth exceeded"
            );
            return Err(EngineError::CircularReference(format!(
                "Cross-law resolution depth exceeded {} levels. \
                 Possible circular reference involving {}:{}",
                config::MAX_CROSS_LAW_DEPTH,
                law_id,
                output_name
            )));
        }

        // Get the law (version-aware: use the same reference date as the article lookup)
        let law = self
            .resolver
            .get_law_for_date(law_id, res_ctx.reference_date())
            .ok_or_else(|| EngineError::LawNotFound(law_id.to_string()))?;

        // Find the article
        let article = self
            .resolver
            .get_article_by_output(law_id, output_name, res_ctx.reference_date())
            .ok_or_else(|| EngineError::OutputNotFound {
                law_id: law_id.to_string(),
                output: output_name.to_string(),
            })?;

        // Execute with service provider
        self.evaluate_article_with_service(article, law, parameters, Some(output_name), res_ctx)
    }

    /// Execute an article with ServiceProvider support.
    fn evaluate_article_with_service(
        &self,
        article: &Article,
        law: &ArticleBasedLaw,
        parameters: HashMap<String, Value>,
        requested_output: Option<&str>,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<ArticleResult> {
        // Create execution context
        let mut context = RuleContext::new(parameters.clone(), res_ctx.calculation_date)?;

        // Set definitions from article
        if let Some(definitions) = article.get_definitions() {
            context.set_definitions(definitions);
        }

        // Resolve inputs with sources using ServiceProvider
        self.resolve_inputs_with_service(article, &mut context, &parameters, res_ctx)?;

        // Pre-resolve any resolve actions in this article
        let resolved_actions = self.pre_resolve_actions(article, law, &context, res_ctx)?;

        // Use ArticleEngine for action execution (it handles the internal logic)
        let engine = ArticleEngine::new(article, law);

        // Now execute with resolved inputs already in context
        // We need to pass resolved inputs as parameters to avoid re-resolution
        let mut combined_params = parameters;
        for (name, value) in context.resolved_inputs() {
            combined_params.insert(name.clone(), value.clone());
        }
        // Merge pre-resolved action outputs so the engine can pick them up
        for (name, value) in resolved_actions {
            combined_params.insert(name, value);
        }

        engine.evaluate_with_output(combined_params, res_ctx.calculation_date, requested_output)
    }

    /// Pre-resolve all resolve actions in an article.
    ///
    /// Scans the article's actions for `resolve:` specifications and resolves
    /// each one using `resolve_resolve_action()`. Returns a map of output names
    /// to resolved values.
    fn pre_resolve_actions(
        &self,
        article: &Article,
        law: &ArticleBasedLaw,
        context: &RuleContext,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<HashMap<String, Value>> {
        let mut resolved = HashMap::new();

        let actions = article
            .get_execution_spec()
            .and_then(|exec| exec.actions.as_deref())
            .unwrap_or(&[]);

        for action in actions {
            if let Some(resolve) = &action.resolve {
                if let Some(output_name) = &action.output {
                    let value = self.resolve_resolve_action(
                        resolve,
                        &law.id,
                        &article.number,
                        context,
                        res_ctx,
                    )?;
                    resolved.insert(output_name.clone(), value);
                }
            }
        }

        Ok(resolved)
    }

    /// Resolve a single resolve action.
    ///
    /// Implements the Python `_evaluate_resolve()` algorithm:
    /// 1. Find regulations by legal basis (filtered by resolve type)
    /// 2. If match criteria exist, evaluate expected value from context
    /// 3. For each candidate: execute to get match output, compare, skip on mismatch
    /// 4. Execute matching candidate for requested output
    /// 5. Require exactly 1 match (error on 0 or 2+)
    fn resolve_resolve_action(
        &self,
        resolve: &Resolve,
        law_id: &str,
        article_number: &str,
        context: &RuleContext,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value> {
        let layer_filter = parse_regulatory_layer(&resolve.resolve_type);

        tracing::debug!(
            law_id = %law_id,
            article = %article_number,
            resolve_type = %resolve.resolve_type,
            output = %resolve.output,
            "Resolving action via legal basis"
        );

        // Find regulations that have this article as their legal_basis
        let candidates = self.resolver.find_regulations_by_legal_basis(
            law_id,
            article_number,
            layer_filter.as_ref(),
            res_ctx.reference_date(),
        );

        if candidates.is_empty() {
            return Err(EngineError::DelegationError(format!(
                "No regulations found with legal_basis {}#{} (type={})",
                law_id, article_number, resolve.resolve_type
            )));
        }

        tracing::debug!(
            candidates = candidates.len(),
            ids = ?candidates.iter().map(|c| &c.id).collect::<Vec<_>>(),
            "Found candidate regulations"
        );

        // Evaluate expected match value if match criteria exist
        let expected_match_value = if let Some(match_spec) = &resolve.match_spec {
            Some(evaluate_value(&match_spec.value, context, 0)?)
        } else {
            None
        };

        // Track matches: we need exactly one
        let mut first_match: Option<(&str, Value)> = None;

        for candidate_law in &candidates {
            let candidate_id = &candidate_law.id;

            // Find the article that produces the requested output
            let candidate_article = match candidate_law.find_article_by_output(&resolve.output) {
                Some(a) => a,
                None => {
                    tracing::debug!(
                        candidate = %candidate_id,
                        output = %resolve.output,
                        "Candidate has no article with requested output, skipping"
                    );
                    continue;
                }
            };

            // Phase 1: Check match criteria if present
            if let (Some(match_spec), Some(expected)) = (&resolve.match_spec, &expected_match_value)
            {
                let match_result = self.try_evaluate_candidate(
                    candidate_article,
                    candidate_law,
                    Some(&match_spec.output),
                    res_ctx,
                );

                match match_result {
                    Ok(result) => {
                        let match_value = result.outputs.get(&match_spec.output);
                        match match_value {
                            Some(actual) if values_equal(actual, expected) => {
                                tracing::debug!(
                                    candidate = %candidate_id,
                                    "Match criteria satisfied"
                                );
                            }
                            Some(actual) => {
                                tracing::debug!(
                                    candidate = %candidate_id,
                                    expected = %expected,
                                    actual = %actual,
                                    "Match criteria not met, skipping"
                                );
                                continue;
                            }
                            None => {
                                tracing::debug!(
                                    candidate = %candidate_id,
                                    match_output = %match_spec.output,
                                    "Match output not found, skipping"
                                );
                                continue;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            candidate = %candidate_id,
                            error = %e,
                            "Error evaluating match criteria, skipping"
                        );
                        continue;
                    }
                }
            }

            // Phase 2: Get the actual requested output
            let output_result = self.try_evaluate_candidate(
                candidate_article,
                candidate_law,
                Some(&resolve.output),
                res_ctx,
            );

            match output_result {
                Ok(result) => {
                    if let Some(value) = result.outputs.get(&resolve.output).cloned() {
                        // Check for multiple matches
                        if let Some((prev_id, _)) = &first_match {
                            return Err(EngineError::DelegationError(format!(
                                "Multiple regulations match for {}#{} with resolve type '{}'. \
                                 Found at least: [{}, {}]. \
                                 Add more specific match criteria to ensure deterministic resolution.",
                                law_id, article_number, resolve.resolve_type, prev_id, candidate_id
                            )));
                        }
                        first_match = Some((candidate_id, value));
                    } else {
                        tracing::debug!(
                            candidate = %candidate_id,
                            output = %resolve.output,
                            "Output not found in result, skipping"
                        );
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        candidate = %candidate_id,
                        error = %e,
                        "Error evaluating candidate, skipping"
                    );
                    continue;
                }
            }
        }

        match first_match {
            Some((matched_id, value)) => {
                tracing::info!(
                    law_id = %law_id,
                    article = %article_number,
                    matched = %matched_id,
                    "Resolved to unique regulation"
                );
                Ok(value)
            }
            None => Err(EngineError::DelegationError(format!(
                "No matching regulation found for {}#{} with resolve type '{}' and match criteria {:?}",
                law_id, article_number, resolve.resolve_type,
                resolve.match_spec.as_ref().map(|m| &m.output)
            ))),
        }
    }

    /// Try to evaluate a candidate regulation's article.
    ///
    /// Used by resolve_resolve_action to evaluate match criteria and output values.
    /// Returns the execution result, or an error if evaluation fails.
    fn try_evaluate_candidate(
        &self,
        article: &Article,
        law: &ArticleBasedLaw,
        requested_output: Option<&str>,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<ArticleResult> {
        self.evaluate_article_with_service(article, law, HashMap::new(), requested_output, res_ctx)
    }

    /// Resolve input sources using ServiceProvider.
    fn resolve_inputs_with_service(
        &self,
        article: &Article,
        context: &mut RuleContext,
        parameters: &HashMap<String, Value>,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<()> {
        let inputs = self.get_inputs(article);

        for input in inputs {
            let source = match &input.source {
                Some(s) => s,
                None => continue,
            };

            // Check if already provided as parameter
            if parameters.contains_key(&input.name) {
                continue;
            }

            if let Some(delegation) = &source.delegation {
                // Delegation reference
                let (del_law_id, del_article, select_on) = get_delegation_info(delegation);
                let del_ref = DelegationRef {
                    law_id: del_law_id,
                    article: del_article,
                    select_on,
                };

                let value = self.resolve_delegation_input_internal(
                    &del_ref,
                    &source.output,
                    source.parameters.as_ref(),
                    context,
                    res_ctx,
                )?;

                context.set_resolved_input(&input.name, value);
            } else if let Some(regulation) = &source.regulation {
                // External reference
                let value = self.resolve_external_input_internal(
                    regulation,
                    &source.output,
                    source.parameters.as_ref(),
                    context,
                    res_ctx,
                )?;

                context.set_resolved_input(&input.name, value);
            } else {
                // Internal reference - handled by ArticleEngine
                // We don't resolve these here because ArticleEngine handles them
                // with proper circular reference detection within the same law
            }
        }

        Ok(())
    }

    /// Internal method for external input resolution with depth tracking.
    fn resolve_external_input_internal(
        &self,
        regulation: &str,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value> {
        // Check for circular reference before proceeding
        let key = format!("{}#{}", regulation, output);
        if res_ctx.is_visited(&key) {
            return Err(EngineError::CircularReference(format!(
                "Circular cross-law reference detected: {} is already being resolved",
                key
            )));
        }

        // Build parameters for the target article
        let target_params = self.build_target_parameters(source_parameters, context)?;

        // Enter cross-law resolution scope
        res_ctx.enter(key.clone());

        // Execute the target article
        let result =
            self.evaluate_law_output_internal(regulation, output, target_params, res_ctx);

        // Leave scope (even on error, for correct cycle tracking)
        res_ctx.leave(&key);

        // Extract the requested output
        result?
            .outputs
            .get(output)
            .cloned()
            .ok_or_else(|| EngineError::OutputNotFound {
                law_id: regulation.to_string(),
                output: output.to_string(),
            })
    }

    /// Internal method for delegation input resolution with depth tracking.
    fn resolve_delegation_input_internal(
        &self,
        delegation: &DelegationRef<'_>,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value> {
        // Evaluate selection criteria
        let criteria = if let Some(criteria_spec) = delegation.select_on {
            evaluate_select_on_criteria(criteria_spec, context)?
        } else {
            HashMap::new()
        };

        // Format criteria for logging
        let criteria_str: Vec<String> = criteria
            .iter()
            .map(|(k, v)| format!("{}={:?}", k, v))
            .collect();

        tracing::debug!(
            law_id = %delegation.law_id,
            article = %delegation.article,
            criteria = ?criteria_str,
            "Resolving delegation"
        );

        // Find matching regulation
        let regulation_opt = self.find_delegated_regulation(
            delegation.law_id,
            delegation.article,
            &criteria,
            res_ctx.reference_date(),
        )?;

        match regulation_opt {
            Some(regulation) => {
                tracing::debug!(
                    delegation_from = %delegation.law_id,
                    delegation_article = %delegation.article,
                    found_regulation = %regulation.id,
                    "Found delegated regulation"
                );
                // Found a delegated regulation - execute it
                self.execute_delegated_regulation(
                    regulation,
                    output,
                    source_parameters,
                    context,
                    res_ctx,
                )
            }
            None => {
                tracing::debug!(
                    delegation_from = %delegation.law_id,
                    delegation_article = %delegation.article,
                    "No matching regulation found, checking for defaults"
                );
                // No delegated regulation found - try to use defaults from the delegating article
                self.try_execute_defaults(delegation, output, source_parameters, context, &criteria, res_ctx)
            }
        }
    }

    /// Execute a found delegated regulation.
    fn execute_delegated_regulation(
        &self,
        regulation: &ArticleBasedLaw,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value> {
        // Check for circular reference
        let key = format!("{}#{}", regulation.id, output);
        if res_ctx.is_visited(&key) {
            return Err(EngineError::CircularReference(format!(
                "Circular delegation reference detected: {} is already being resolved",
                key
            )));
        }

        // Build parameters for the delegated regulation
        let target_params = self.build_target_parameters(source_parameters, context)?;

        tracing::debug!(
            regulation_id = %regulation.id,
            output = %output,
            params = ?target_params.keys().collect::<Vec<_>>(),
            "Executing delegated regulation"
        );

        // Enter cross-law resolution scope
        res_ctx.enter(key.clone());

        // Execute the delegated regulation with cycle tracking
        let result =
            self.evaluate_law_output_internal(&regulation.id, output, target_params, res_ctx);

        // Leave scope (even on error, for correct cycle tracking)
        res_ctx.leave(&key);

        let value = result?
            .outputs
            .get(output)
            .cloned()
            .ok_or_else(|| EngineError::OutputNotFound {
                law_id: regulation.id.clone(),
                output: output.to_string(),
            })?;

        tracing::debug!(
            regulation_id = %regulation.id,
            "Delegation result: {} = {}", output, value
        );

        Ok(value)
    }

    /// Try to execute defaults from the delegating article's legal_basis_for section.
    ///
    /// This is called when no delegated regulation is found. If the delegating
    /// article has defaults defined, those are executed instead.
    fn try_execute_defaults(
        &self,
        delegation: &DelegationRef<'_>,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        criteria: &HashMap<String, Value>,
        res_ctx: &mut ResolutionContext<'_>,
    ) -> Result<Value> {
        // Get the delegating law and article (version-aware)
        let law = self
            .resolver
            .get_law_for_date(delegation.law_id, res_ctx.reference_date())
            .ok_or_else(|| EngineError::LawNotFound(delegation.law_id.to_string()))?;

        let article = law
            .find_article_by_number(delegation.article)
            .ok_or_else(|| EngineError::ArticleNotFound {
                law_id: delegation.law_id.to_string(),
                article: delegation.article.to_string(),
            })?;

        // Look for legal_basis_for with defaults
        let defaults = article
            .get_legal_basis_for()
            .and_then(|basis_list| basis_list.iter().find_map(|basis| basis.defaults.as_ref()));

        match defaults {
            Some(defaults) => {
                tracing::info!(
                    law_id = %delegation.law_id,
                    article = %delegation.article,
                    "Using defaults (optional delegation)"
                );
                self.execute_defaults(defaults, output, source_parameters, context)
            }
            None => {
                // No defaults available - this is an error (mandatory delegation)
                let criteria_str = criteria
                    .iter()
                    .map(|(k, v)| format!("{}={:?}", k, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::error!(
                    law_id = %delegation.law_id,
                    article = %delegation.article,
                    criteria = %criteria_str,
                    "No regulation found for mandatory delegation"
                );
                Err(EngineError::DelegationError(format!(
                    "No regulation found for mandatory delegation from {}#{} with criteria [{}]",
                    delegation.law_id, delegation.article, criteria_str
                )))
            }
        }
    }

    /// Execute defaults actions to produce the requested output.
    fn execute_defaults(
        &self,
        defaults: &LegalBasisForDefaults,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
    ) -> Result<Value> {
        // Build a new context for defaults execution
        // Start with the source parameters resolved
        let target_params = self.build_target_parameters(source_parameters, context)?;
        let mut defaults_context = RuleContext::new(target_params, context.get_calculation_date())?;

        // Set definitions from defaults
        if let Some(definitions) = &defaults.definitions {
            defaults_context.set_definitions(definitions);
        }

        // Execute actions
        if let Some(actions) = &defaults.actions {
            for action in actions {
                if let Some(output_name) = &action.output {
                    let value = self.evaluate_default_action(action, &defaults_context)?;
                    tracing::debug!("Output {} = {}", output_name, value);
                    defaults_context.set_output(output_name, value);
                }
            }
        }

        // Extract the requested output
        defaults_context
            .get_output(output)
            .cloned()
            .ok_or_else(|| EngineError::OutputNotFound {
                law_id: "defaults".to_string(),
                output: output.to_string(),
            })
    }

    /// Evaluate a single action from defaults.
    fn evaluate_default_action(&self, action: &Action, context: &RuleContext) -> Result<Value> {
        // Check for direct value
        if let Some(value) = &action.value {
            return evaluate_value(value, context, 0);
        }

        // No value specified - return null
        Ok(Value::Null)
    }

    /// Build parameters for a target article from source parameter mapping.
    fn build_target_parameters(
        &self,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
    ) -> Result<HashMap<String, Value>> {
        let mut params = HashMap::new();

        if let Some(param_map) = source_parameters {
            for (target_name, source_ref) in param_map {
                // Source ref can be "$variable" or a literal
                let value = if let Some(var_name) = source_ref.strip_prefix('$') {
                    context.resolve(var_name)?
                } else {
                    // Literal value (as string)
                    Value::String(source_ref.clone())
                };
                params.insert(target_name.clone(), value);
            }
        }

        Ok(params)
    }

    /// Get inputs from article execution spec.
    fn get_inputs<'a>(&self, article: &'a Article) -> &'a [Input] {
        article
            .get_execution_spec()
            .and_then(|exec| exec.input.as_deref())
            .unwrap_or(&[])
    }

    /// List all loaded law IDs.
    pub fn list_laws(&self) -> Vec<&str> {
        self.resolver.list_laws()
    }

    /// Get the number of loaded laws.
    pub fn law_count(&self) -> usize {
        self.resolver.law_count()
    }

    /// Check if a law is loaded.
    pub fn has_law(&self, law_id: &str) -> bool {
        self.resolver.has_law(law_id)
    }

    /// Unload a law.
    pub fn unload_law(&mut self, law_id: &str) -> bool {
        self.resolver.unload_law(law_id)
    }

    /// Get direct access to the resolver.
    pub fn resolver(&self) -> &RuleResolver {
        &self.resolver
    }

    /// Get metadata about a loaded law.
    ///
    /// # Arguments
    /// * `law_id` - The law identifier
    ///
    /// # Returns
    /// `LawInfo` with metadata, or `None` if the law is not loaded.
    pub fn get_law_info(&self, law_id: &str) -> Option<LawInfo> {
        let law = self.resolver.get_law(law_id)?;

        // Collect output names from all articles
        let mut outputs = Vec::new();
        for article in &law.articles {
            if let Some(exec) = article.get_execution_spec() {
                if let Some(output_specs) = &exec.output {
                    for output in output_specs {
                        outputs.push(output.name.clone());
                    }
                }
            }
        }

        Some(LawInfo {
            id: law.id.clone(),
            regulatory_layer: law.regulatory_layer.clone(),
            publication_date: law.publication_date.clone(),
            bwb_id: law.bwb_id.clone(),
            url: law.url.clone(),
            outputs,
            article_count: law.articles.len(),
        })
    }

    /// List all (law_id, output_name) pairs across all loaded laws.
    pub fn list_all_outputs(&self) -> Vec<(&str, &str)> {
        self.resolver.list_all_outputs()
    }

    /// Get the total number of outputs across all loaded laws.
    pub fn get_output_count(&self) -> usize {
        self.resolver.output_count()
    }

    // -------------------------------------------------------------------------
    // Data Source Management
    // -------------------------------------------------------------------------

    /// Add a data source to the registry.
    ///
    /// **Note:** Data sources are staged for future integration. They are
    /// not yet automatically queried during law execution. Currently only
    /// manual CRUD operations and direct registry queries are supported.
    ///
    /// Data sources are queried in priority order (highest first) when
    /// resolving values that aren't found in the law context.
    pub fn add_data_source(&mut self, source: Box<dyn DataSource>) {
        self.data_registry.add_source(source);
    }

    /// Add a dictionary-based data source.
    ///
    /// Convenience method for adding a `DictDataSource` with the given data.
    ///
    /// # Arguments
    /// * `name` - Name identifier for this data source
    /// * `priority` - Priority for resolution order (higher = checked first)
    /// * `data` - Data as record_key -> field_name -> value
    pub fn add_dict_source(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        data: HashMap<String, HashMap<String, Value>>,
    ) {
        self.data_registry
            .add_source(Box::new(DictDataSource::new(name, priority, data)));
    }

    /// Remove a data source by name.
    pub fn remove_data_source(&mut self, name: &str) -> bool {
        self.data_registry.remove_source(name)
    }

    /// Clear all data sources from the registry.
    pub fn clear_data_sources(&mut self) {
        self.data_registry.clear();
    }

    /// Get the number of registered data sources.
    pub fn data_source_count(&self) -> usize {
        self.data_registry.source_count()
    }

    /// List all registered data source names.
    pub fn list_data_sources(&self) -> Vec<&str> {
        self.data_registry.list_sources()
    }

    /// Get direct access to the data registry.
    pub fn data_registry(&self) -> &DataSourceRegistry {
        &self.data_registry
    }
}

impl ServiceProvider for LawExecutionService {
    fn evaluate_uri(
        &self,
        uri: &str,
        parameters: &HashMap<String, Value>,
        calculation_date: &str,
    ) -> Result<ArticleResult> {
        let parsed = RegelrechtUri::parse(uri)?;
        self.evaluate_law_output(
            parsed.law_id(),
            parsed.output(),
            parameters.clone(),
            calculation_date,
        )
    }

    fn find_delegated_regulation(
        &self,
        law_id: &str,
        article: &str,
        criteria: &HashMap<String, Value>,
        reference_date: Option<NaiveDate>,
    ) -> Result<Option<&ArticleBasedLaw>> {
        Ok(self
            .resolver
            .find_delegated_regulation(law_id, article, criteria, reference_date))
    }

    fn get_law(&self, law_id: &str) -> Option<&ArticleBasedLaw> {
        self.resolver.get_law(law_id)
    }

    fn resolve_external_input(
        &self,
        regulation: &str,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        calculation_date: &str,
    ) -> Result<Value> {
        let mut res_ctx = ResolutionContext::new(calculation_date);
        self.resolve_external_input_internal(
            regulation,
            output,
            source_parameters,
            context,
            &mut res_ctx,
        )
    }

    fn resolve_delegation_input(
        &self,
        delegation_law_id: &str,
        delegation_article: &str,
        select_on: Option<&[SelectOnCriteria]>,
        output: &str,
        source_parameters: Option<&HashMap<String, String>>,
        context: &RuleContext,
        calculation_date: &str,
    ) -> Result<Value> {
        let mut res_ctx = ResolutionContext::new(calculation_date);
        let del_ref = DelegationRef {
            law_id: delegation_law_id,
            article: delegation_article,
            select_on,
        };
        self.resolve_delegation_input_internal(
            &del_ref,
            output,
            source_parameters,
            context,
            &mut res_ctx,
        )
    }
}
