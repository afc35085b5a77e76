//! Execution context for article evaluation
//!
//! Manages state and value resolution during article execution.
//!
//! # Resolution Priority
//!
//! Variables are resolved in the following order (first match wins):
//! 1. **Context variables** - Built-in variables like `referencedate`
//! 2. **Local scope** - Loop variables from FOREACH operations
//! 3. **Outputs** - Previously calculated output values
//! 4. **Resolved inputs** - Cached results from cross-law references
//! 5. **Definitions** - Article-level constants
//! 6. **Parameters** - Direct input parameters (e.g., BSN)
//!
//! # Dot Notation
//!
//! Supports nested property access using dot notation:
//! - `referencedate.year` - Get year from reference date
//! - `person.address.city` - Navigate nested objects
//!
//! # Child Context Behavior
//!
//! The `create_child()` method creates a child context for nested evaluation
//! (e.g., FOREACH loops). Important: **child contexts start with an empty local scope**.
//!
//! This is an intentional design difference from the Python implementation:
//! - **Rust**: Clears local scope in child contexts (safer, prevents variable pollution)
//! - **Python**: Copies local scope to child contexts (allows cross-iteration access)
//!
//! If you need to pass values between iterations, use parameters or store them
//! in outputs rather than relying on local scope inheritance.

use crate::article::Definition;
use crate::config;
use crate::error::{EngineError, Result};
use crate::operations::ValueResolver;
use crate::types::Value;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// TypeSpec - Value Type Specification with Enforcement
// =============================================================================

/// Specification for value types with enforcement capabilities.
///
/// TypeSpec defines constraints and transformations that can be applied to values:
/// - **Type checking**: Ensure values match expected types
/// - **Range constraints**: min/max bounds for numeric values
/// - **Precision**: Rounding to specified decimal places
/// - **Unit conversion**: Handle unit-specific transformations (e.g., eurocent)
///
/// # Example
///
/// ```ignore
/// use regelrecht_engine::{TypeSpec, Value};
///
/// let spec = TypeSpec::new()
///     .with_precision(2)
///     .with_min(0.0)
///     .with_max(100.0);
///
/// let value = Value::Float(123.456);
/// let enforced = spec.enforce(value);
/// // enforced = Value::Float(100.0)  // clamped to max, rounded to 2 decimals
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Expected value type (e.g., "number", "string", "boolean")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    /// Unit for the value (e.g., "eurocent", "EUR", "days", "percent")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Number of decimal places for rounding (for numeric values)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,

    /// Minimum allowed value (for numeric values)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum allowed value (for numeric values)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl TypeSpec {
    /// Create a new empty TypeSpec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected value type.
    pub fn with_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the precision (decimal places).
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set the minimum value.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the maximum value.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Create a TypeSpec from a specification map.
    ///
    /// Recognized keys:
    /// - `type` or `value_type`: string
    /// - `unit`: string
    /// - `precision`: integer
    /// - `min`: number
    /// - `max`: number
    pub fn from_spec(spec: &HashMap<String, Value>) -> Option<Self> {
        // Return None if spec is empty
        if spec.is_empty() {
            return None;
        }

        let mut type_spec = TypeSpec::new();

        // Extract value_type (check both "type" and "value_type" keys)
        if let Some(Value::String(t)) = spec.get("type").or_else(|| spec.get("value_type")) {
            type_spec.value_type = Some(t.clone());
        }

        // Extract unit
        if let Some(Value::String(u)) = spec.get("unit") {
            type_spec.unit = Some(u.clone());
        }

        // Extract precision
        if let Some(v) = spec.get("precision") {
            match v {
                Value::Int(p) => type_spec.precision = Some(*p as i32),
                Value::Float(p) => type_spec.precision = Some(*p as i32),
                _ => {}
            }
        }

        // Extract min
        if let Some(v) = spec.get("min") {
            match v {
                Value::Int(m) => type_spec.min = Some(*m as f64),
                Value::Float(m) => type_spec.min = Some(*m),
                _ => {}
            }
        }

        // Extract max
        if let Some(v) = spec.get("max") {
            match v {
                Value::Int(m) => type_spec.max = Some(*m as f64),
                Value::Float(m) => type_spec.max = Some(*m),
                _ => {}
            }
        }

        // Return None if no constraints were found
        if type_spec.value_type.is_none()
            && type_spec.unit.is_none()
            && type_spec.precision.is_none()
            && type_spec.min.is_none()
            && type_spec.max.is_none()
        {
            return None;
        }

        Some(type_spec)
    }

    /// Check if this TypeSpec has any constraints to enforce.
    pub fn has_constraints(&self) -> bool {
        self.precision.is_some() || self.min.is_some() || self.max.is_some() || self.unit.is_some()
    }

    /// Enforce the type specification on a value.
    ///
    /// Applies the following transformations in order:
    /// 1. Min/max clamping (for numeric values)
    /// 2. Precision rounding (for numeric values)
    /// 3. Unit-specific conversions (e.g., eurocent -> integer)
    ///
    /// Non-numeric values are returned unchanged (unless unit conversion applies).
    pub fn enforce(&self, value: Value) -> Value {
        match value {
            Value::Int(i) => self.enforce_numeric(i as f64),
            Value::Float(f) => self.enforce_numeric(f),
            // Non-numeric values pass through unchanged
            other => other,
        }
    }

    /// Enforce constraints on a numeric value.
    fn enforce_numeric(&self, value: f64) -> Value {
        // Reject non-finite values (NaN, Infinity) - cannot meaningfully enforce constraints
        if !value.is_finite() {
            return Value::Float(value);
        }

        let mut result = value;

        // 1. Apply min/max constraints (swap if min > max to be forgiving)
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => {
                // Invalid config: swap to be forgiving
                result = result.max(max).min(min);
            }
            (min_opt, max_opt) => {
                if let Some(min) = min_opt {
                    result = result.max(min);
                }
                if let Some(max) = max_opt {
                    result = result.min(max);
                }
            }
        }

        // 3. Apply precision (rounding)
        if let Some(precision) = self.precision {
            let factor = 10_f64.powi(precision);
            result = (result * factor).round() / factor;
        }

        // 4. Handle unit-specific conversions
        if let Some(ref unit) = self.unit {
            return self.convert_for_unit(result, unit);
        }

        // Determine if result should be Int or Float
        if result.fract() == 0.0 && result >= i64::MIN as f64 && result <= i64::MAX as f64 {
            Value::Int(result as i64)
        } else {
            Value::Float(result)
        }
    }

    /// Convert a numeric value based on its unit.
    fn convert_for_unit(&self, value: f64, unit: &str) -> Value {
        match unit.to_lowercase().as_str() {
            // Cent units should be integers
            "eurocent" | "cent" | "cents" => {
                let rounded = value.round();
                Value::Int(rounded as i64)
            }
            // Euro with 2 decimal precision
            "eur" | "euro" | "euros" => {
                let rounded = (value * 100.0).round() / 100.0;
                Value::Float(rounded)
            }
            // Percentage typically with 2 decimal precision
            "percent" | "percentage" => {
                let rounded = (value * 100.0).round() / 100.0;
                Value::Float(rounded)
            }
            // Days should be integers
            "days" | "day" => {
                let rounded = value.round();
                Value::Int(rounded as i64)
            }
            // Months should be integers
            "months" | "month" => {
                let rounded = value.round();
                Value::Int(rounded as i64)
            }
            // Years should be integers
            "years" | "year" => {
                let rounded = value.round();
                Value::Int(rounded as i64)
            }
            // Unknown units - return as-is
            _ => {
                if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
                    Value::Int(value as i64)
                } else {
                    Value::Float(value)
                }
            }
        }
    }
}

// =============================================================================
// RuleContext - Execution Context
// =============================================================================

/// Execution context for article evaluation.
///
/// Holds all state needed during article execution including parameters,
/// definitions, outputs, and cached values.
///
/// # Shadowing Warning
///
/// Variables in higher-priority scopes shadow those in lower scopes.
/// For example, a local variable named "x" will shadow a parameter "x".
/// The priority order is: local > outputs > resolved_inputs > definitions > parameters.
#[derive(Debug, Clone)]
pub struct RuleContext {
    /// Article-level definitions (constants)
    definitions: HashMap<String, Value>,

    /// Input parameters (e.g., BSN, income)
    parameters: HashMap<String, Value>,

    /// Calculated output values
    outputs: HashMap<String, Value>,

    /// Local scope variables (for FOREACH loops)
    local: HashMap<String, Value>,

    /// Cached resolved inputs from cross-law references
    resolved_inputs: HashMap<String, Value>,

    /// Reference date for calculations
    reference_date: NaiveDate,

    /// Cached Value representation of reference_date (avoids repeated allocation)
    reference_date_value: Value,
}

impl RuleContext {
    /// Create a new execution context.
    ///
    /// # Arguments
    /// * `parameters` - Input parameters for the execution
    /// * `calculation_date` - Reference date for calculations (YYYY-MM-DD format)
    pub fn new(parameters: HashMap<String, Value>, calculation_date: &str) -> Result<Self> {
        let reference_date = NaiveDate::parse_from_str(calculation_date, "%Y-%m-%d")
            .map_err(|e| EngineError::InvalidDate(format!("{}: {}", calculation_date, e)))?;

        let reference_date_value = date_to_value(reference_date);

        Ok(Self {
            definitions: HashMap::new(),
            parameters,
            outputs: HashMap::new(),
            local: HashMap::new(),
            resolved_inputs: HashMap::new(),
            reference_date,
            reference_date_value,
        })
    }

    /// Create a context with a default date (today).
    ///
    /// Useful for testing.
    #[allow(clippy::expect_used)]
    pub fn with_defaults(parameters: HashMap<String, Value>) -> Self {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        Self::new(parameters, &today).expect("today's date should always be valid")
    }

    /// Set definitions from an article's definitions section.
    ///
    /// Processes the Definition enum to extract actual values.
    pub fn set_definitions(&mut self, definitions: &HashMap<String, Definition>) {
        self.definitions = definitions
            .iter()
            .map(|(k, v)| (k.clone(), v.value().clone()))
            .collect();
    }

    /// Set definitions directly from a Value HashMap.
    pub fn set_definitions_raw(&mut self, definitions: HashMap<String, Value>) {
        self.definitions = definitions;
    }

    /// Set an output value.
    pub fn set_output(&mut self, name: impl Into<String>, value: Value) {
        self.outputs.insert(name.into(), value);
    }

    /// Set an output value with type specification enforcement.
    ///
    /// If a TypeSpec is provided, the value will be transformed according to
    /// its constraints (min/max clamping, precision rounding, unit conversion).
    pub fn set_output_with_spec(
        &mut self,
        name: impl Into<String>,
        value: Value,
        spec: Option<&TypeSpec>,
    ) {
        let enforced_value = match spec {
            Some(type_spec) => type_spec.enforce(value),
            None => value,
        };
        self.outputs.insert(name.into(), enforced_value);
    }

    /// Get an output value.
    pub fn get_output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// Get all outputs.
    pub fn outputs(&self) -> &HashMap<String, Value> {
        &self.outputs
    }

    /// Set a local variable (for FOREACH loops).
    pub fn set_local(&mut self, name: impl Into<String>, value: Value) {
        self.local.insert(name.into(), value);
    }

    /// Clear all local variables.
    pub fn clear_local(&mut self) {
        self.local.clear();
    }

    /// Set a resolved input value (cached cross-law result).
    pub fn set_resolved_input(&mut self, name: impl Into<String>, value: Value) {
        self.resolved_inputs.insert(name.into(), value);
    }

    /// Get all resolved inputs (cached cross-law results).
    pub fn resolved_inputs(&self) -> &HashMap<String, Value> {
        &self.resolved_inputs
    }

    /// Get the reference date.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Get the calculation date as a string (YYYY-MM-DD format).
    pub fn get_calculation_date(&self) -> &str {
        // Extract ISO date string from the cached reference_date_value
        // This is safe because we always set it in new()
        if let Value::Object(obj) = &self.reference_date_value {
            if let Some(Value::String(iso)) = obj.get("iso") {
                return iso.as_str();
            }
        }
        // Fallback - should never happen since we always set iso in new()
        "1970-01-01"
    }

    /// Create a child context for nested evaluation (e.g., FOREACH).
    ///
    /// The child inherits definitions, parameters, resolved_inputs, and outputs,
    /// but starts with an **empty local scope**. This ensures that FOREACH loop
    /// variables from a parent context don't leak into child iterations.
    ///
    /// # Design Note
    ///
    /// This behavior differs from the Python implementation, which copies the
    /// local scope to child contexts. The Rust implementation intentionally
    /// clears local scope to:
    ///
    /// 1. **Prevent variable pollution**: Loop variables shouldn't accidentally
    ///    affect nested operations
    /// 2. **Explicit is better**: If you need values in a child context, pass
    ///    them explicitly via parameters or outputs
    /// 3. **Safety**: Reduces the risk of subtle bugs from shared mutable state
    ///
    /// If Python compatibility is required for specific use cases, pass the
    /// needed values explicitly via parameters before evaluation.
    pub fn create_child(&self) -> Self {
        Self {
            definitions: self.definitions.clone(),
            parameters: self.parameters.clone(),
            outputs: self.outputs.clone(),
            local: HashMap::new(), // Child starts with empty local scope
            resolved_inputs: self.resolved_inputs.clone(),
            reference_date: self.reference_date,
            reference_date_value: self.reference_date_value.clone(),
        }
    }

    /// Resolve a variable name using the priority chain.
    ///
    /// # Resolution Priority
    /// 1. Context variables (referencedate)
    /// 2. Local scope (loop variables)
    /// 3. Outputs (calculated values)
    /// 4. Resolved inputs (cached cross-law results)
    /// 5. Definitions (constants)
    /// 6. Parameters (direct inputs)
    ///
    /// # Dot Notation
    /// Supports nested property access: `referencedate.year`, `person.name`
    fn resolve_variable(&self, path: &str) -> Result<Value> {
        // Handle dot notation for property access
        if let Some((base, property)) = path.split_once('.') {
            let base_value = self.resolve_variable(base)?;
            return get_property(&base_value, property, 0);
        }

        // 1. Context variables (cached)
        if path == "referencedate" {
            return Ok(self.reference_date_value.clone());
        }

        // 2. Local scope (FOREACH loop variables)
        if let Some(value) = self.local.get(path) {
            return Ok(value.clone());
        }

        // 3. Outputs (calculated values)
        if let Some(value) = self.outputs.get(path) {
            return Ok(value.clone());
        }

        // 4. Resolved inputs (cached cross-law results)
        if let Some(value) = self.resolved_inputs.get(path) {
            return Ok(value.clone());
        }

        // 5. Definitions (constants)
        if let Some(value) = self.definitions.get(path) {
            return Ok(value.clone());
        }

        // 6. Parameters (direct inputs)
        if let Some(value) = self.parameters.get(path) {
            return Ok(value.clone());
        }

        // Not found
        Err(EngineError::VariableNotFound(path.to_string()))
    }
}

impl ValueResolver for RuleContext {
    fn resolve(&self, name: &str) -> Result<Value> {
        self.resolve_variable(name)
    }
}

/// Convert a NaiveDate to a Value object with year, month, day properties.
fn date_to_value(date: NaiveDate) -> Value {
    let mut obj = HashMap::new();
    obj.insert("year".to_string(), Value::Int(date.year() as i64));
    obj.insert("month".to_string(), Value::Int(date.month() as i64));
    obj.insert("day".to_string(), Value::Int(date.day() as i64));
    // Also include ISO format string for direct use
    obj.insert(
        "iso".to_string(),
        Value::String(date.format("%Y-%m-%d").to_string()),
    );
    Value::Object(obj)
}

/// Get a property from a Value, supporting nested access.
///
/// Handles:
/// - Object property access: `obj.property`
/// - Nested paths: `obj.nested.property`
/// - Array indexing: `arr.0`, `arr.1`
///
/// # Arguments
/// * `value` - The value to access property from
/// * `property_path` - Property path (may contain dots for nesting)
/// * `depth` - Current recursion depth (for stack overflow protection)
fn get_property(value: &Value, property_path: &str, depth: usize) -> Result<Value> {
    // Prevent stack overflow on deeply nested or malicious input
    if depth >= config::MAX_PROPERTY_DEPTH {
        return Err(EngineError::InvalidOperation(format!(
            "Property access depth exceeds maximum of {}",
            config::MAX_PROPERTY_DEPTH
        )));
    }

    // Handle nested paths recursively
    if let Some((first, rest)) = property_path.split_once('.') {
        let intermediate = get_property(value, first, depth + 1)?;
        return get_property(&intermediate, rest, depth + 1);
    }

    match value {
        Value::Object(obj) => obj
            .get(property_path)
            .cloned()
            .ok_or_else(|| EngineError::VariableNotFound(format!(".{}", property_path))),
        Value::Array(arr) => {
            // Support numeric indexing for arrays
            if let Ok(index) = property_path.parse::<usize>() {
                arr.get(index)
                    .cloned()
                    .ok_or_else(|| EngineError::VariableNotFound(format!("[{}]", index)))
            } else {
                Err(EngineError::TypeMismatch {
                    expected: "object".to_string(),
                    actual: "array".to_string(),
                })
            }
        }
        _ => Err(EngineError::TypeMismatch {
            expected: "object".to_string(),
            actual: value_type_name(value).to_string(),
        }),
    }
}

/// Get the type name of a Value for error messages.
fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Int(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    // =========================================================================
    // TypeSpec Tests
    // =========================================================================

    mod typespec_tests {
        use super::*;

        #[test]
        fn test_typespec_new() {
            let spec = TypeSpec::new();
            assert!(spec.value_type.is_none());
            assert!(spec.unit.is_none());
            assert!(spec.precision.is_none());
            assert!(spec.min.is_none());
            assert!(spec.max.is_none());
        }

        #[test]
        fn test_typespec_builder() {
            let spec = TypeSpec::new()
                .with_type("number")
                .with_unit("EUR")
                .with_precision(2)
                .with_min(0.0)
                .with_max(1000.0);

            assert_eq!(spec.value_type, Some("number".to_string()));
            assert_eq!(spec.unit, Some("EUR".to_string()));
            assert_eq!(spec.precision, Some(2));
            assert_eq!(spec.min, Some(0.0));
            assert_eq!(spec.max, Some(1000.0));
        }

        #[test]
        fn test_typespec_from_spec() {
            let mut spec_map = HashMap::new();
            spec_map.insert("type".to_string(), Value::String("number".to_string()));
            spec_map.insert("unit".to_string(), Value::String("EUR".to_string()));
            spec_map.insert("precision".to_string(), Value::Int(2));
            spec_map.insert("min".to_string(), Value::Float(0.0));
            spec_map.insert("max".to_string(), Value::Int(1000));

            let spec = TypeSpec::from_spec(&spec_map).unwrap();

            assert_eq!(spec.value_type, Some("number".to_string()));
            assert_eq!(spec.unit, Some("EUR".to_string()));
            assert_eq!(spec.precision, Some(2));
            assert_eq!(spec.min, Some(0.0));
            assert_eq!(spec.max, Some(1000.0));
        }

        #[test]
        fn test_typespec_from_spec_empty() {
            let spec_map = HashMap::new();
            let spec = TypeSpec::from_spec(&spec_map);
            assert!(spec.is_none());
        }

        #[test]
        fn test_typespec_from_spec_value_type_key() {
            let mut spec_map = HashMap::new();
            spec_map.insert(
                "value_type".to_string(),
                Value::String("boolean".to_string()),
            );

            let spec = TypeSpec::from_spec(&spec_map).unwrap();
            assert_eq!(spec.value_type, Some("boolean".to_string()));
        }

        #[test]
        fn test_enforce_min() {
            let spec = TypeSpec::new().with_min(10.0);

            assert_eq!(spec.enforce(Value::Int(5)), Value::Int(10));
            assert_eq!(spec.enforce(Value::Int(15)), Value::Int(15));
            assert_eq!(spec.enforce(Value::Float(5.5)), Value::Int(10));
        }

        #[test]
        fn test_enforce_max() {
            let spec = TypeSpec::new().with_max(100.0);

            assert_eq!(spec.enforce(Value::Int(50)), Value::Int(50));
            assert_eq!(spec.enforce(Value::Int(150)), Value::Int(100));
            assert_eq!(spec.enforce(Value::Float(150.5)), Value::Int(100));
        }

        #[test]
        fn test_enforce_min_max() {
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0);

            assert_eq!(spec.enforce(Value::Int(-10)), Value::Int(0));
            assert_eq!(spec.enforce(Value::Int(50)), Value::Int(50));
            assert_eq!(spec.enforce(Value::Int(200)), Value::Int(100));
        }

        #[test]
        fn test_enforce_precision() {
            let spec = TypeSpec::new().with_precision(2);

            assert_eq!(spec.enforce(Value::Float(3.14159)), Value::Float(3.14));
            // 2.999 rounds to 3.0, which is a whole number, so it becomes Int(3)
            assert_eq!(spec.enforce(Value::Float(2.999)), Value::Int(3));
            // Use a value that doesn't have floating point representation issues
            assert_eq!(spec.enforce(Value::Float(1.236)), Value::Float(1.24));
        }

        #[test]
        fn test_enforce_precision_zero() {
            let spec = TypeSpec::new().with_precision(0);

            assert_eq!(spec.enforce(Value::Float(3.7)), Value::Int(4));
            assert_eq!(spec.enforce(Value::Float(3.2)), Value::Int(3));
        }

        #[test]
        fn test_enforce_unit_eurocent() {
            let spec = TypeSpec::new().with_unit("eurocent");

            assert_eq!(spec.enforce(Value::Float(123.45)), Value::Int(123));
            assert_eq!(spec.enforce(Value::Float(123.67)), Value::Int(124));
            assert_eq!(spec.enforce(Value::Int(100)), Value::Int(100));
        }

        #[test]
        fn test_enforce_unit_euro() {
            let spec = TypeSpec::new().with_unit("EUR");

            assert_eq!(spec.enforce(Value::Float(123.456)), Value::Float(123.46));
            assert_eq!(spec.enforce(Value::Float(99.994)), Value::Float(99.99));
        }

        #[test]
        fn test_enforce_unit_days() {
            let spec = TypeSpec::new().with_unit("days");

            assert_eq!(spec.enforce(Value::Float(30.5)), Value::Int(31));
            assert_eq!(spec.enforce(Value::Float(30.4)), Value::Int(30));
        }

        #[test]
        fn test_enforce_combined() {
            // Test min + max + precision together
            let spec = TypeSpec::new()
                .with_min(0.0)
                .with_max(100.0)
                .with_precision(1);

            // Value within range, needs rounding
            assert_eq!(spec.enforce(Value::Float(50.55)), Value::Float(50.6));

            // Value below min (0.0 is whole number, becomes Int)
            assert_eq!(spec.enforce(Value::Float(-10.0)), Value::Int(0));

            // Value above max (100.0 is whole number, becomes Int)
            assert_eq!(spec.enforce(Value::Float(150.0)), Value::Int(100));
        }

        #[test]
        fn test_enforce_non_numeric() {
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0);

            // Non-numeric values pass through unchanged
            assert_eq!(
                spec.enforce(Value::String("hello".to_string())),
                Value::String("hello".to_string())
            );
            assert_eq!(spec.enforce(Value::Bool(true)), Value::Bool(true));
            assert_eq!(spec.enforce(Value::Null), Value::Null);
        }

        #[test]
        fn test_has_constraints() {
            assert!(!TypeSpec::new().has_constraints());
            assert!(TypeSpec::new().with_min(0.0).has_constraints());
            assert!(TypeSpec::new().with_max(100.0).has_constraints());
            assert!(TypeSpec::new().with_precision(2).has_constraints());
            assert!(TypeSpec::new().with_unit("EUR").has_constraints());
            assert!(!TypeSpec::new().with_type("number").has_constraints());
        }

        // Issue 2: NaN/Infinity tests
        #[test]
        fn test_enforce_nan_passthrough() {
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0);
            match spec.enforce(Value::Float(f64::NAN)) {
                Value::Float(f) => assert!(f.is_nan()),
                other => panic!("Expected Float(NaN), got {:?}", other),
            }
        }

        #[test]
        fn test_enforce_infinity_passthrough() {
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0);
            assert_eq!(
                spec.enforce(Value::Float(f64::INFINITY)),
                Value::Float(f64::INFINITY)
            );
            assert_eq!(
                spec.enforce(Value::Float(f64::NEG_INFINITY)),
                Value::Float(f64::NEG_INFINITY)
            );
        }

        // Issue 4: min > max tests
        #[test]
        fn test_enforce_min_greater_than_max() {
            // min=100, max=50 is invalid config - should swap to be forgiving
            let spec = TypeSpec::new().with_min(100.0).with_max(50.0);

            // Value between swapped range (50..100) should be clamped
            let result = spec.enforce(Value::Int(75));
            // After swap: clamp to max(50) first, then min(100)
            // 75.max(50) = 75, 75.min(100) = 75 -> within swapped range
            assert_eq!(result, Value::Int(75));

            // Value below both
            let result = spec.enforce(Value::Int(25));
            // 25.max(50) = 50, 50.min(100) = 50
            assert_eq!(result, Value::Int(50));

            // Value above both
            let result = spec.enforce(Value::Int(150));
            // 150.max(50) = 150, 150.min(100) = 100
            assert_eq!(result, Value::Int(100));
        }

        // Issue 5: Boundary value tests
        #[test]
        fn test_enforce_min_boundary_exact() {
            let spec = TypeSpec::new().with_min(10.0);
            // value == min should stay unchanged
            assert_eq!(spec.enforce(Value::Int(10)), Value::Int(10));
            assert_eq!(spec.enforce(Value::Float(10.0)), Value::Int(10));
        }

        #[test]
        fn test_enforce_max_boundary_exact() {
            let spec = TypeSpec::new().with_max(100.0);
            // value == max should stay unchanged
            assert_eq!(spec.enforce(Value::Int(100)), Value::Int(100));
            assert_eq!(spec.enforce(Value::Float(100.0)), Value::Int(100));
        }

        #[test]
        fn test_enforce_min_max_at_boundaries() {
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0);
            // Exact min
            assert_eq!(spec.enforce(Value::Int(0)), Value::Int(0));
            // Exact max
            assert_eq!(spec.enforce(Value::Int(100)), Value::Int(100));
            // Just inside
            assert_eq!(spec.enforce(Value::Float(0.01)), Value::Float(0.01));
            assert_eq!(spec.enforce(Value::Float(99.99)), Value::Float(99.99));
        }

        // Issue 6: Unit alias and case-insensitivity tests
        #[test]
        fn test_enforce_unit_cent_aliases() {
            // "eurocent", "cent", "cents" should all produce integers
            for unit in &["eurocent", "cent", "cents"] {
                let spec = TypeSpec::new().with_unit(*unit);
                assert_eq!(
                    spec.enforce(Value::Float(123.7)),
                    Value::Int(124),
                    "Failed for unit: {}",
                    unit
                );
            }
        }

        #[test]
        fn test_enforce_unit_euro_aliases() {
            // "eur", "euro", "euros" should all round to 2 decimals
            for unit in &["eur", "euro", "euros"] {
                let spec = TypeSpec::new().with_unit(*unit);
                assert_eq!(
                    spec.enforce(Value::Float(123.456)),
                    Value::Float(123.46),
                    "Failed for unit: {}",
                    unit
                );
            }
        }

        #[test]
        fn test_enforce_unit_time_aliases() {
            // day/days, month/months, year/years should all produce integers
            for unit in &["day", "days", "month", "months", "year", "years"] {
                let spec = TypeSpec::new().with_unit(*unit);
                assert_eq!(
                    spec.enforce(Value::Float(30.7)),
                    Value::Int(31),
                    "Failed for unit: {}",
                    unit
                );
            }
        }

        #[test]
        fn test_enforce_unit_percent_aliases() {
            // "percent" and "percentage" should round to 2 decimals
            for unit in &["percent", "percentage"] {
                let spec = TypeSpec::new().with_unit(*unit);
                assert_eq!(
                    spec.enforce(Value::Float(12.345)),
                    Value::Float(12.35),
                    "Failed for unit: {}",
                    unit
                );
            }
        }

        #[test]
        fn test_enforce_unit_case_insensitive() {
            // Unit matching should be case-insensitive
            for unit in &["EUROCENT", "EuroCent", "Eurocent"] {
                let spec = TypeSpec::new().with_unit(*unit);
                assert_eq!(
                    spec.enforce(Value::Float(123.7)),
                    Value::Int(124),
                    "Failed for unit: {}",
                    unit
                );
            }

            for unit in &["EUR", "Euro", "EUROS"] {
                let spec = TypeSpec::new().with_unit(*unit);
                assert_eq!(
                    spec.enforce(Value::Float(123.456)),
                    Value::Float(123.46),
                    "Failed for unit: {}",
                    unit
                );
            }
        }

        #[test]
        fn test_enforce_unit_unknown() {
            let spec = TypeSpec::new().with_unit("unknown_unit");
            // Unknown unit should pass through with int/float logic
            assert_eq!(spec.enforce(Value::Int(42)), Value::Int(42));
            assert_eq!(spec.enforce(Value::Float(3.14)), Value::Float(3.14));
        }
    }

    // =========================================================================
    // set_output_with_spec Tests (Issue 3)
    // =========================================================================

    mod set_output_with_spec_tests {
        use super::*;

        #[test]
        fn test_set_output_with_spec_applies_constraints() {
            let mut ctx = make_context();
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0).with_precision(0);

            ctx.set_output_with_spec("result", Value::Float(150.7), Some(&spec));
            assert_eq!(ctx.get_output("result"), Some(&Value::Int(100)));
        }

        #[test]
        fn test_set_output_with_spec_none_passthrough() {
            let mut ctx = make_context();

            ctx.set_output_with_spec("result", Value::Float(150.7), None);
            assert_eq!(ctx.get_output("result"), Some(&Value::Float(150.7)));
        }

        #[test]
        fn test_set_output_with_spec_nan_passthrough() {
            let mut ctx = make_context();
            let spec = TypeSpec::new().with_min(0.0).with_max(100.0);

            ctx.set_output_with_spec("result", Value::Float(f64::NAN), Some(&spec));
            match ctx.get_output("result") {
                Some(Value::Float(f)) => assert!(f.is_nan()),
                other => panic!("Expected Float(NaN), got {:?}", other),
            }
        }

        #[test]
        fn test_set_output_with_spec_unit_conversion() {
            let mut ctx = make_context();
            let spec = TypeSpec::new().with_unit("eurocent");

            ctx.set_output_with_spec("amount", Value::Float(1234.56), Some(&spec));
            assert_eq!(ctx.get_output("amount"), Some(&Value::Int(1235)));
        }
    }

    // =========================================================================
    // RuleContext Tests
    // =========================================================================

    fn make_context() -> RuleContext {
        let mut params = HashMap::new();
        params.insert("BSN".to_string(), Value::String("123456789".to_string()));
        params.insert("income".to_string(), Value::Int(30000));

        RuleContext::new(params, "2025-06-15").unwrap()
    }

    // -------------------------------------------------------------------------
    // Basic Resolution Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_resolve_parameter() {
        let ctx = make_context();

        let bsn = ctx.resolve("BSN").unwrap();
        assert_eq!(bsn, Value::String("123456789".to_string()));

        let income = ctx.resolve("income").unwrap();
        assert_eq!(income, Value::Int(30000));
    }

    #[test]
    fn test_resolve_definition() {
        let mut ctx = make_context();
        let mut defs = HashMap::new();
        defs.insert("MAX_INCOME".to_string(), Value::Int(50000));
        defs.insert("TAX_RATE".to_string(), Value::Float(0.21));
        ctx.set_definitions_raw(defs);

        let max = ctx.resolve("MAX_INCOME").unwrap();
        assert_eq!(max, Value::Int(50000));

        let rate = ctx.resolve("TAX_RATE").unwrap();
        assert_eq!(rate, Value::Float(0.21));
    }

    #[test]
    fn test_resolve_output() {
        let mut ctx = make_context();
        ctx.set_output("result", Value::Bool(true));
        ctx.set_output("amount", Value::Int(1000));

        let result = ctx.resolve("result").unwrap();
        assert_eq!(result, Value::Bool(true));

        let amount = ctx.resolve("amount").unwrap();
        assert_eq!(amount, Value::Int(1000));
    }

    #[test]
    fn test_resolve_local() {
        let mut ctx = make_context();
        ctx.set_local("item", Value::String("test".to_string()));
        ctx.set_local("index", Value::Int(0));

        let item = ctx.resolve("item").unwrap();
        assert_eq!(item, Value::String("test".to_string()));

        let index = ctx.resolve("index").unwrap();
        assert_eq!(index, Value::Int(0));
    }

    #[test]
    fn test_resolve_not_found() {
        let ctx = make_context();
        let result = ctx.resolve("nonexistent");
        assert!(matches!(result, Err(EngineError::VariableNotFound(_))));
    }

    // -------------------------------------------------------------------------
    // Priority Chain Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_priority_local_over_output() {
        let mut ctx = make_context();
        ctx.set_output("x", Value::Int(100));
        ctx.set_local("x", Value::Int(200));

        // Local should win
        let x = ctx.resolve("x").unwrap();
        assert_eq!(x, Value::Int(200));

        // After clearing local, output should be visible
        ctx.clear_local();
        let x = ctx.resolve("x").unwrap();
        assert_eq!(x, Value::Int(100));
    }

    #[test]
    fn test_priority_output_over_definition() {
        let mut ctx = make_context();
        let mut defs = HashMap::new();
        defs.insert("x".to_string(), Value::Int(100));
        ctx.set_definitions_raw(defs);
        ctx.set_output("x", Value::Int(200));

        // Output should win over definition
        let x = ctx.resolve("x").unwrap();
        assert_eq!(x, Value::Int(200));
    }

    #[test]
    fn test_priority_definition_over_parameter() {
        let mut ctx = make_context();
        // "income" exists as parameter (30000)
        let mut defs = HashMap::new();
        defs.insert("income".to_string(), Value::Int(50000));
        ctx.set_definitions_raw(defs);

        // Definition should win over parameter
        let income = ctx.resolve("income").unwrap();
        assert_eq!(income, Value::Int(50000));
    }

    // -------------------------------------------------------------------------
    // Reference Date Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_resolve_referencedate() {
        let ctx = make_context();
        let refdate = ctx.resolve("referencedate").unwrap();

        // Should be an object with year, month, day
        let obj = refdate.as_object().unwrap();
        assert_eq!(obj.get("year"), Some(&Value::Int(2025)));
        assert_eq!(obj.get("month"), Some(&Value::Int(6)));
        assert_eq!(obj.get("day"), Some(&Value::Int(15)));
        assert_eq!(
            obj.get("iso"),
            Some(&Value::String("2025-06-15".to_string()))
        );
    }

    #[test]
    fn test_resolve_referencedate_year() {
        let ctx = make_context();
        let year = ctx.resolve("referencedate.year").unwrap();
        assert_eq!(year, Value::Int(2025));
    }

    #[test]
    fn test_resolve_referencedate_month() {
        let ctx = make_context();
        let month = ctx.resolve("referencedate.month").unwrap();
        assert_eq!(month, Value::Int(6));
    }

    // -------------------------------------------------------------------------
    // Dot Notation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_dot_notation_object() {
        let mut ctx = make_context();

        let mut person = HashMap::new();
        person.insert("name".to_string(), Value::String("Jan".to_string()));
        person.insert("age".to_string(), Value::Int(35));
        ctx.set_output("person", Value::Object(person));

        let name = ctx.resolve("person.name").unwrap();
        assert_eq!(name, Value::String("Jan".to_string()));

        let age = ctx.resolve("person.age").unwrap();
        assert_eq!(age, Value::Int(35));
    }

    #[test]
    fn test_dot_notation_nested() {
        let mut ctx = make_context();

        let mut address = HashMap::new();
        address.insert("city".to_string(), Value::String("Amsterdam".to_string()));
        address.insert("zip".to_string(), Value::String("1012AB".to_string()));

        let mut person = HashMap::new();
        person.insert("name".to_string(), Value::String("Jan".to_string()));
        person.insert("address".to_string(), Value::Object(address));
        ctx.set_output("person", Value::Object(person));

        let city = ctx.resolve("person.address.city").unwrap();
        assert_eq!(city, Value::String("Amsterdam".to_string()));
    }

    #[test]
    fn test_dot_notation_array_index() {
        let mut ctx = make_context();

        let items = vec![
            Value::String("first".to_string()),
            Value::String("second".to_string()),
            Value::String("third".to_string()),
        ];
        ctx.set_output("items", Value::Array(items));

        let first = ctx.resolve("items.0").unwrap();
        assert_eq!(first, Value::String("first".to_string()));

        let second = ctx.resolve("items.1").unwrap();
        assert_eq!(second, Value::String("second".to_string()));
    }

    #[test]
    fn test_dot_notation_not_found() {
        let mut ctx = make_context();

        let mut person = HashMap::new();
        person.insert("name".to_string(), Value::String("Jan".to_string()));
        ctx.set_output("person", Value::Object(person));

        let result = ctx.resolve("person.nonexistent");
        assert!(matches!(result, Err(EngineError::VariableNotFound(_))));
    }

    #[test]
    fn test_dot_notation_type_error() {
        let mut ctx = make_context();
        ctx.set_output("value", Value::Int(42));

        // Can't access property on integer
        let result = ctx.resolve("value.something");
        assert!(matches!(result, Err(EngineError::TypeMismatch { .. })));
    }

    // -------------------------------------------------------------------------
    // Child Context Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_child_context_inherits() {
        let mut ctx = make_context();
        ctx.set_output("parent_output", Value::Int(100));
        let mut defs = HashMap::new();
        defs.insert("CONSTANT".to_string(), Value::Int(42));
        ctx.set_definitions_raw(defs);

        let child = ctx.create_child();

        // Child should see parent's output and definition
        assert_eq!(child.resolve("parent_output").unwrap(), Value::Int(100));
        assert_eq!(child.resolve("CONSTANT").unwrap(), Value::Int(42));
        // And parameters
        assert_eq!(
            child.resolve("BSN").unwrap(),
            Value::String("123456789".to_string())
        );
    }

    #[test]
    fn test_child_context_isolation() {
        let mut ctx = make_context();
        ctx.set_output("shared", Value::Int(100));

        let mut child = ctx.create_child();
        child.set_output("shared", Value::Int(200));
        child.set_local("child_only", Value::Int(999));

        // Child's changes shouldn't affect parent
        assert_eq!(ctx.resolve("shared").unwrap(), Value::Int(100));
        assert!(ctx.resolve("child_only").is_err());

        // Child should see its own value
        assert_eq!(child.resolve("shared").unwrap(), Value::Int(200));
    }

    #[test]
    fn test_child_context_empty_local_scope() {
        let mut ctx = make_context();
        ctx.set_local("parent_loop_var", Value::Int(999));
        ctx.set_local("index", Value::Int(5));

        // Create child - should NOT inherit parent's local variables
        let child = ctx.create_child();

        // Child should NOT see parent's loop variables
        assert!(child.resolve("parent_loop_var").is_err());
        assert!(child.resolve("index").is_err());

        // But parent should still have them
        assert_eq!(ctx.resolve("parent_loop_var").unwrap(), Value::Int(999));
        assert_eq!(ctx.resolve("index").unwrap(), Value::Int(5));
    }

    // -------------------------------------------------------------------------
    // Edge Cases
    // -------------------------------------------------------------------------

    #[test]
    fn test_invalid_date() {
        let params = HashMap::new();
        let result = RuleContext::new(params, "not-a-date");
        assert!(matches!(result, Err(EngineError::InvalidDate(_))));
    }

    #[test]
    fn test_empty_context() {
        let ctx = RuleContext::with_defaults(HashMap::new());
        let result = ctx.resolve("anything");
        assert!(matches!(result, Err(EngineError::VariableNotFound(_))));
    }

    #[test]
    fn test_resolved_inputs() {
        let mut ctx = make_context();
        ctx.set_resolved_input("external_value", Value::Int(12345));

        let value = ctx.resolve("external_value").unwrap();
        assert_eq!(value, Value::Int(12345));
    }

    #[test]
    fn test_priority_resolved_input_over_definition() {
        let mut ctx = make_context();
        let mut defs = HashMap::new();
        defs.insert("x".to_string(), Value::Int(100));
        ctx.set_definitions_raw(defs);
        ctx.set_resolved_input("x", Value::Int(200));

        // Resolved input should win over definition
        let x = ctx.resolve("x").unwrap();
        assert_eq!(x, Value::Int(200));
    }

    #[test]
    fn test_recursion_depth_limit() {
        let mut ctx = make_context();

        // Create a deeply nested object (but not exceeding limit)
        // 5 levels of nesting: {n: {n: {n: {n: {n: {value: 42}}}}}}
        let mut deep = HashMap::new();
        deep.insert("value".to_string(), Value::Int(42));

        for _ in 0..5 {
            let mut wrapper = HashMap::new();
            wrapper.insert("n".to_string(), Value::Object(deep));
            deep = wrapper;
        }
        ctx.set_output("deep", Value::Object(deep));

        // This should work: deep.n.n.n.n.n.value (6 property accesses, well within limit of 32)
        let path = "deep.n.n.n.n.n.value";
        let result = ctx.resolve(path);
        assert!(result.is_ok(), "Expected Ok, got: {:?}", result);
        assert_eq!(result.unwrap(), Value::Int(42));

        // Create a structure that's deeper than MAX_PROPERTY_DEPTH (32)
        // We need (MAX_PROPERTY_DEPTH + 3) levels to trigger the depth limit
        let depth = config::MAX_PROPERTY_DEPTH + 3;
        let mut very_deep = HashMap::new();
        very_deep.insert("end".to_string(), Value::Int(999));

        for _ in 0..depth {
            let mut wrapper = HashMap::new();
            wrapper.insert("n".to_string(), Value::Object(very_deep));
            very_deep = wrapper;
        }
        ctx.set_output("very_deep", Value::Object(very_deep));

        // Build a path with (depth) "n"s + "end", exceeding limit
        let excessive_path = format!(
            "very_deep.{}.end",
            (0..depth).map(|_| "n").collect::<Vec<_>>().join(".")
        );

        // This should fail due to depth limit
        let result = ctx.resolve(&excessive_path);
        assert!(
            matches!(result, Err(EngineError::InvalidOperation(ref msg)) if msg.contains("depth exceeds")),
            "Expected InvalidOperation error for excessive depth, got: {:?}",
            result
        );
    }
}
