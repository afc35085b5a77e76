//! Operation execution for the RegelRecht engine
//!
//! This module implements the execution logic for all 16 operation types:
//! - **Comparison (6):** EQUALS, NOT_EQUALS, GREATER_THAN, LESS_THAN, GREATER_THAN_OR_EQUAL, LESS_THAN_OR_EQUAL
//! - **Arithmetic (4):** ADD, SUBTRACT, MULTIPLY, DIVIDE
//! - **Aggregate (2):** MAX, MIN
//! - **Logical (2):** AND, OR
//! - **Conditional (2):** IF, SWITCH

use crate::article::{ActionOperation, ActionValue};
use crate::error::{EngineError, Result};
use crate::types::{Operation, Value};

/// Trait for resolving variable references ($var) during operation execution.
///
/// Implementations should provide variable resolution from context (parameters,
/// inputs, outputs, definitions, etc.)
///
/// # Error Handling
///
/// - Return `Err(EngineError::VariableNotFound)` when a variable doesn't exist
/// - The error will propagate up through the operation execution chain
/// - Callers should handle missing variables appropriately (e.g., default values)
///
/// # Example Implementation
///
/// ```ignore
/// impl ValueResolver for MyContext {
///     fn resolve(&self, name: &str) -> Result<Value> {
///         self.variables.get(name)
///             .cloned()
///             .ok_or_else(|| EngineError::VariableNotFound(name.to_string()))
///     }
/// }
/// ```
pub trait ValueResolver {
    /// Resolve a variable name to its value.
    ///
    /// # Arguments
    /// * `name` - Variable name without the `$` prefix (e.g., "age" not "$age")
    ///
    /// # Returns
    /// * `Ok(Value)` - The resolved value
    /// * `Err(EngineError::VariableNotFound)` - Variable doesn't exist in context
    fn resolve(&self, name: &str) -> Result<Value>;
}

/// Evaluate an ActionValue to a concrete Value.
///
/// Handles:
/// - Literal values (returned directly)
/// - Variable references ($name) - resolved via the resolver
/// - Nested operations - executed recursively
pub fn evaluate_value<R: ValueResolver>(value: &ActionValue, resolver: &R) -> Result<Value> {
    match value {
        ActionValue::Literal(v) => {
            // Check if it's a variable reference (starts with $)
            if let Value::String(s) = v {
                if let Some(var_name) = s.strip_prefix('$') {
                    return resolver.resolve(var_name);
                }
            }
            Ok(v.clone())
        }
        ActionValue::Operation(op) => execute_operation(op, resolver),
    }
}

/// Execute an operation and return the result.
///
/// Dispatches to the appropriate operation handler based on the operation type.
pub fn execute_operation<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    match op.operation {
        // Comparison operations
        Operation::Equals => execute_equals(op, resolver),
        Operation::NotEquals => execute_not_equals(op, resolver),
        Operation::GreaterThan => execute_numeric_comparison(op, resolver, |a, b| a > b),
        Operation::LessThan => execute_numeric_comparison(op, resolver, |a, b| a < b),
        Operation::GreaterThanOrEqual => execute_numeric_comparison(op, resolver, |a, b| a >= b),
        Operation::LessThanOrEqual => execute_numeric_comparison(op, resolver, |a, b| a <= b),

        // Arithmetic operations
        Operation::Add => execute_add(op, resolver),
        Operation::Subtract => execute_subtract(op, resolver),
        Operation::Multiply => execute_multiply(op, resolver),
        Operation::Divide => execute_divide(op, resolver),

        // Aggregate operations
        Operation::Max => execute_aggregate(op, resolver, f64::max),
        Operation::Min => execute_aggregate(op, resolver, f64::min),

        // Logical operations
        Operation::And => execute_and(op, resolver),
        Operation::Or => execute_or(op, resolver),

        // Conditional operations
        Operation::If => execute_if(op, resolver),
        Operation::Switch => execute_switch(op, resolver),
    }
}

// =============================================================================
// Comparison Operations
// =============================================================================

/// Check if two Values are equal, with Python-style numeric coercion.
///
/// This matches Python's behavior where `42 == 42.0` is `True`.
/// For non-numeric types, uses standard equality.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // Numeric comparison: Int and Float are compared as f64
        (Value::Int(i), Value::Float(f)) => (*i as f64) == *f,
        (Value::Float(f), Value::Int(i)) => *f == (*i as f64),
        // Default: use structural equality
        _ => a == b,
    }
}

/// Execute EQUALS operation with Python-style numeric coercion.
///
/// - `Int(42) == Float(42.0)` returns `true` (like Python)
/// - Non-numeric types use structural equality
fn execute_equals<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let subject = op.subject.as_ref().ok_or_else(|| {
        EngineError::InvalidOperation("Comparison requires 'subject'".to_string())
    })?;
    let value = op
        .value
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("Comparison requires 'value'".to_string()))?;

    let subject_val = evaluate_value(subject, resolver)?;
    let value_val = evaluate_value(value, resolver)?;

    Ok(Value::Bool(values_equal(&subject_val, &value_val)))
}

/// Execute NOT_EQUALS operation with Python-style numeric coercion.
fn execute_not_equals<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let subject = op.subject.as_ref().ok_or_else(|| {
        EngineError::InvalidOperation("Comparison requires 'subject'".to_string())
    })?;
    let value = op
        .value
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("Comparison requires 'value'".to_string()))?;

    let subject_val = evaluate_value(subject, resolver)?;
    let value_val = evaluate_value(value, resolver)?;

    Ok(Value::Bool(!values_equal(&subject_val, &value_val)))
}

/// Execute a numeric comparison (>, <, >=, <=).
///
/// Converts values to f64 for comparison to handle both Int and Float types.
fn execute_numeric_comparison<R: ValueResolver, F>(
    op: &ActionOperation,
    resolver: &R,
    compare: F,
) -> Result<Value>
where
    F: Fn(f64, f64) -> bool,
{
    let subject = op.subject.as_ref().ok_or_else(|| {
        EngineError::InvalidOperation("Comparison requires 'subject'".to_string())
    })?;
    let value = op
        .value
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("Comparison requires 'value'".to_string()))?;

    let subject_val = evaluate_value(subject, resolver)?;
    let value_val = evaluate_value(value, resolver)?;

    let subject_num = to_number(&subject_val)?;
    let value_num = to_number(&value_val)?;

    Ok(Value::Bool(compare(subject_num, value_num)))
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

/// Execute ADD operation: sum of all values.
fn execute_add<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let values = get_values(op)?;
    let evaluated = evaluate_values(values, resolver)?;

    let mut sum = 0.0;
    let mut has_float = false;

    for val in &evaluated {
        match val {
            Value::Int(i) => sum += *i as f64,
            Value::Float(f) => {
                sum += f;
                has_float = true;
            }
            _ => return Err(type_error("number", val)),
        }
    }

    Ok(if has_float {
        Value::Float(sum)
    } else {
        Value::Int(sum as i64)
    })
}

/// Execute SUBTRACT operation: first value minus all subsequent values.
fn execute_subtract<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let values = get_values(op)?;
    if values.is_empty() {
        return Err(EngineError::InvalidOperation(
            "SUBTRACT requires at least one value".to_string(),
        ));
    }

    let evaluated = evaluate_values(values, resolver)?;

    let (first, rest) = evaluated.split_first().unwrap();
    let mut result = to_number(first)?;
    let mut has_float = matches!(first, Value::Float(_));

    for val in rest {
        result -= to_number(val)?;
        if matches!(val, Value::Float(_)) {
            has_float = true;
        }
    }

    Ok(if has_float {
        Value::Float(result)
    } else {
        Value::Int(result as i64)
    })
}

/// Execute MULTIPLY operation: product of all values.
fn execute_multiply<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let values = get_values(op)?;
    if values.is_empty() {
        return Err(EngineError::InvalidOperation(
            "MULTIPLY requires at least one value".to_string(),
        ));
    }

    let evaluated = evaluate_values(values, resolver)?;

    let mut result = 1.0;
    let mut has_float = false;

    for val in &evaluated {
        match val {
            Value::Int(i) => result *= *i as f64,
            Value::Float(f) => {
                result *= f;
                has_float = true;
            }
            _ => return Err(type_error("number", val)),
        }
    }

    Ok(if has_float {
        Value::Float(result)
    } else {
        Value::Int(result as i64)
    })
}

/// Execute DIVIDE operation: first value divided by all subsequent values.
///
/// Returns `Err(DivisionByZero)` for division by zero.
/// Returns `Err(InvalidOperation)` for NaN or Infinity results.
fn execute_divide<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let values = get_values(op)?;
    if values.is_empty() {
        return Err(EngineError::InvalidOperation(
            "DIVIDE requires at least one value".to_string(),
        ));
    }

    let evaluated = evaluate_values(values, resolver)?;

    let (first, rest) = evaluated.split_first().unwrap();
    let mut result = to_number(first)?;

    for val in rest {
        let divisor = to_number(val)?;
        if divisor == 0.0 {
            return Err(EngineError::DivisionByZero);
        }
        result /= divisor;
    }

    // Check for invalid results (NaN or Infinity)
    if result.is_nan() {
        return Err(EngineError::InvalidOperation(
            "Division resulted in NaN".to_string(),
        ));
    }
    if result.is_infinite() {
        return Err(EngineError::InvalidOperation(
            "Division resulted in infinity".to_string(),
        ));
    }

    // Division always returns a float (like Python)
    Ok(Value::Float(result))
}

// =============================================================================
// Aggregate Operations
// =============================================================================

/// Execute aggregate operation (MAX, MIN).
fn execute_aggregate<R: ValueResolver, F>(
    op: &ActionOperation,
    resolver: &R,
    combine: F,
) -> Result<Value>
where
    F: Fn(f64, f64) -> f64,
{
    let values = get_values(op)?;
    if values.is_empty() {
        return Err(EngineError::InvalidOperation(
            "Aggregate operation requires at least one value".to_string(),
        ));
    }

    let evaluated = evaluate_values(values, resolver)?;

    let mut has_float = false;
    let nums: Vec<f64> = evaluated
        .iter()
        .map(|v| {
            if matches!(v, Value::Float(_)) {
                has_float = true;
            }
            to_number(v)
        })
        .collect::<Result<Vec<_>>>()?;

    let result = nums.into_iter().reduce(combine).unwrap();

    Ok(if has_float {
        Value::Float(result)
    } else {
        Value::Int(result as i64)
    })
}

// =============================================================================
// Logical Operations
// =============================================================================

/// Execute AND operation: short-circuit evaluation, returns false if any condition is false.
fn execute_and<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let conditions = op
        .conditions
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("AND requires 'conditions'".to_string()))?;

    for condition in conditions {
        let val = evaluate_value(condition, resolver)?;
        if !val.to_bool() {
            return Ok(Value::Bool(false));
        }
    }

    Ok(Value::Bool(true))
}

/// Execute OR operation: short-circuit evaluation, returns true if any condition is true.
fn execute_or<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let conditions = op
        .conditions
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("OR requires 'conditions'".to_string()))?;

    for condition in conditions {
        let val = evaluate_value(condition, resolver)?;
        if val.to_bool() {
            return Ok(Value::Bool(true));
        }
    }

    Ok(Value::Bool(false))
}

// =============================================================================
// Conditional Operations
// =============================================================================

/// Execute IF operation: evaluates condition, returns then or else branch.
fn execute_if<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let when = op
        .when
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("IF requires 'when'".to_string()))?;
    let then = op
        .then
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("IF requires 'then'".to_string()))?;

    let condition_result = evaluate_value(when, resolver)?;

    if condition_result.to_bool() {
        evaluate_value(then, resolver)
    } else if let Some(else_branch) = &op.else_branch {
        evaluate_value(else_branch, resolver)
    } else {
        Ok(Value::Null)
    }
}

/// Execute SWITCH operation: evaluates cases in order, returns first matching case.
fn execute_switch<R: ValueResolver>(op: &ActionOperation, resolver: &R) -> Result<Value> {
    let cases = op
        .cases
        .as_ref()
        .ok_or_else(|| EngineError::InvalidOperation("SWITCH requires 'cases'".to_string()))?;

    for case in cases {
        let condition_result = evaluate_value(&case.when, resolver)?;
        if condition_result.to_bool() {
            return evaluate_value(&case.then, resolver);
        }
    }

    // Return default if no case matched
    if let Some(default) = &op.default {
        evaluate_value(default, resolver)
    } else {
        Ok(Value::Null)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get the 'values' array from an operation, or return an error.
fn get_values(op: &ActionOperation) -> Result<&Vec<ActionValue>> {
    op.values.as_ref().ok_or_else(|| {
        EngineError::InvalidOperation(format!("{:?} requires 'values'", op.operation))
    })
}

/// Evaluate a slice of ActionValues to concrete Values.
fn evaluate_values<R: ValueResolver>(values: &[ActionValue], resolver: &R) -> Result<Vec<Value>> {
    values.iter().map(|v| evaluate_value(v, resolver)).collect()
}

/// Convert a Value to a number (f64).
fn to_number(val: &Value) -> Result<f64> {
    match val {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        _ => Err(type_error("number", val)),
    }
}

/// Create a TypeMismatch error.
fn type_error(expected: &str, actual: &Value) -> EngineError {
    let actual_type = match actual {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Int(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    EngineError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual_type.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
