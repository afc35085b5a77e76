//! Article execution engine
//!
//! Core engine for evaluating article-level machine_readable.execution sections.
//!
//! # Example
//!
//! ```ignore
//! use regelrecht_engine::{ArticleEngine, ArticleBasedLaw, Value};
//! use std::collections::HashMap;
//!
//! let law = ArticleBasedLaw::from_yaml_file("path/to/law.yaml")?;
//! let article = law.find_article_by_output("some_output").unwrap();
//!
//! let engine = ArticleEngine::new(article, &law);
//! let mut params = HashMap::new();
//! params.insert("BSN".to_string(), Value::String("123456789".to_string()));
//!
//! let result = engine.evaluate(params, "2025-01-01")?;
//! println!("Output: {:?}", result.outputs);
//! ```

use crate::article::{Action, ActionOperation, Article, ArticleBasedLaw};
use crate::context::RuleContext;
use crate::error::{EngineError, Result};
use crate::operations::{evaluate_value, execute_operation};
use crate::types::Value;
use std::collections::HashMap;

/// Result of article execution
#[derive(Debug, Clone)]
pub struct ArticleResult {
    /// Calculated output values
    pub outputs: HashMap<String, Value>,
    /// Resolved input values (from cross-law references)
    pub resolved_inputs: HashMap<String, Value>,
    /// Article number that was executed
    pub article_number: String,
    /// Law ID containing the article
    pub law_id: String,
    /// Law UUID if available
    pub law_uuid: Option<String>,
}

/// Executes a single article's machine_readable.execution section.
///
/// The engine orchestrates the execution of an article's actions,
/// resolving variables and evaluating operations to produce outputs.
pub struct ArticleEngine<'a> {
    /// Article to execute
    article: &'a Article,
    /// Law containing the article
    law: &'a ArticleBasedLaw,
}

impl<'a> ArticleEngine<'a> {
    /// Create a new article engine.
    ///
    /// # Arguments
    /// * `article` - Article to execute
    /// * `law` - Law containing the article
    pub fn new(article: &'a Article, law: &'a ArticleBasedLaw) -> Self {
        Self { article, law }
    }

    /// Execute this article's logic.
    ///
    /// # Arguments
    /// * `parameters` - Input parameters (e.g., {"BSN": "123456789"})
    /// * `calculation_date` - Date for which calculations are performed (YYYY-MM-DD)
    ///
    /// # Returns
    /// * `Ok(ArticleResult)` - Execution result with outputs and metadata
    /// * `Err(EngineError)` - If execution fails
    pub fn evaluate(
        &self,
        parameters: HashMap<String, Value>,
        calculation_date: &str,
    ) -> Result<ArticleResult> {
        self.evaluate_with_output(parameters, calculation_date, None)
    }

    /// Execute this article's logic, optionally calculating only a specific output.
    ///
    /// # Arguments
    /// * `parameters` - Input parameters (e.g., {"BSN": "123456789"})
    /// * `calculation_date` - Date for which calculations are performed (YYYY-MM-DD)
    /// * `requested_output` - Specific output to calculate (optional, calculates all if None)
    ///
    /// # Returns
    /// * `Ok(ArticleResult)` - Execution result with outputs and metadata
    /// * `Err(EngineError)` - If execution fails
    pub fn evaluate_with_output(
        &self,
        parameters: HashMap<String, Value>,
        calculation_date: &str,
        requested_output: Option<&str>,
    ) -> Result<ArticleResult> {
        // Create execution context
        let mut context = RuleContext::new(parameters, calculation_date)?;

        // Set definitions from article
        if let Some(definitions) = self.article.get_definitions() {
            context.set_definitions(definitions);
        }

        // Execute actions
        self.execute_actions(&mut context, requested_output)?;

        // Build result
        // Clone outputs and resolved_inputs since ArticleResult must own the data
        // (it may outlive the context)
        Ok(ArticleResult {
            outputs: context.outputs().clone(),
            resolved_inputs: context.resolved_inputs().clone(),
            article_number: self.article.number.clone(),
            law_id: self.law.id.clone(),
            law_uuid: self.law.uuid.clone(),
        })
    }

    /// Execute all actions in order.
    ///
    /// # Arguments
    /// * `context` - Execution context
    /// * `requested_output` - Specific output to calculate (optional)
    fn execute_actions(
        &self,
        context: &mut RuleContext,
        requested_output: Option<&str>,
    ) -> Result<()> {
        let actions = self.get_actions();

        for action in actions {
            // Skip actions without output
            let output_name = match &action.output {
                Some(name) => name,
                None => continue,
            };

            // If requested_output specified, only execute matching action
            if let Some(requested) = requested_output {
                if output_name != requested {
                    continue;
                }
            }

            // Evaluate the action and store output
            let value = self.evaluate_action(action, context)?;
            context.set_output(output_name, value);
        }

        Ok(())
    }

    /// Evaluate a single action.
    ///
    /// # Arguments
    /// * `action` - Action specification
    /// * `context` - Execution context
    ///
    /// # Returns
    /// Calculated value
    fn evaluate_action(&self, action: &Action, context: &RuleContext) -> Result<Value> {
        // Check for operation at action level FIRST
        // When an action has an operation, the value/subject fields are operands, not direct results
        if let Some(operation) = &action.operation {
            let action_op = self.action_to_operation(action, operation)?;
            return execute_operation(&action_op, context);
        }

        // Check for direct value (only when no operation is specified)
        if let Some(value) = &action.value {
            return evaluate_value(value, context);
        }

        // Check for resolve (cross-law reference) - TODO: Phase 5
        if action.resolve.is_some() {
            return Err(EngineError::InvalidOperation(
                "Cross-law references (resolve) not yet implemented".to_string(),
            ));
        }

        // No value or operation specified
        Ok(Value::Null)
    }

    /// Convert an Action to an ActionOperation for execution.
    ///
    /// This is needed because actions can have operations specified inline
    /// rather than as nested ActionValue::Operation.
    ///
    /// # Limitations
    ///
    /// SWITCH operations at the action level are NOT supported because the
    /// `Action` struct doesn't have `cases` and `default` fields. SWITCH must
    /// be nested inside `value` as an `ActionValue::Operation`. Example:
    ///
    /// ```yaml
    /// # INCORRECT - won't work:
    /// - output: result
    ///   operation: SWITCH
    ///   cases: [...]  # Action doesn't have this field
    ///
    /// # CORRECT - use value wrapper:
    /// - output: result
    ///   value:
    ///     operation: SWITCH
    ///     cases: [...]
    /// ```
    fn action_to_operation(
        &self,
        action: &Action,
        operation: &crate::types::Operation,
    ) -> Result<ActionOperation> {
        Ok(ActionOperation {
            operation: *operation, // Operation is Copy
            subject: action.subject.clone(),
            value: action.value.clone(),
            values: action.values.clone(),
            when: action.when.clone(),
            then: action.then.clone(),
            else_branch: action.else_branch.clone(),
            conditions: action.conditions.clone(),
            // SWITCH-specific fields: Action struct doesn't have these,
            // so SWITCH must be nested inside `value` to work correctly
            cases: None,
            default: None,
        })
    }

    /// Get actions from the article's execution spec.
    fn get_actions(&self) -> &[Action] {
        self.article
            .get_execution_spec()
            .and_then(|exec| exec.actions.as_deref())
            .unwrap_or(&[])
    }
}
