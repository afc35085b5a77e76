//! Error types for the aggregate decoder

use thiserror::Error;

/// Main error type for decode operations
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Root tag has no registered schema
    #[error("No schema registered for aggregate <{tag}>")]
    UnknownAggregate { tag: String },

    /// A node contains both members of a conflicting sibling pair
    #[error("<{parent}> may not contain both <{first}> and <{second}>")]
    MutuallyExclusiveElements {
        parent: String,
        first: String,
        second: String,
    },

    /// Two substructures under a node flatten to the same field name
    #[error("Flattening <{node}> produced the field '{key}' more than once")]
    FlattenCollision { key: String, node: String },

    /// A field's raw value failed its descriptor's constraint
    #[error("Can't decode {schema}.{field}: {source}")]
    FieldValidation {
        schema: String,
        field: String,
        #[source]
        source: FieldError,
    },

    /// Flattened attributes remained that no field in the schema claims
    #[error("Undefined element(s) for {schema}: {}", keys.join(", "))]
    UnclaimedAttributes { schema: String, keys: Vec<String> },

    /// Aggregate nesting exceeded the depth guard
    #[error("Aggregate nesting exceeds {depth} levels")]
    NestingTooDeep { depth: usize },
}

/// Per-field conversion and validation failures.
///
/// Carried as the `source` of [`DecodeError::FieldValidation`] so callers
/// see both the owning schema/field and the underlying cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Required field with no matching flattened key
    #[error("required value is missing")]
    Missing,

    /// Boolean text other than Y or N
    #[error("invalid boolean '{0}' (expected Y or N)")]
    InvalidBool(String),

    /// Bounded string longer than its limit
    #[error("length {actual} exceeds the maximum of {max}")]
    TooLong { max: usize, actual: usize },

    /// Text does not parse as an integer
    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    /// Integer with more digits than the field allows
    #[error("'{value}' exceeds {max_digits} digits")]
    TooManyDigits { value: String, max_digits: u32 },

    /// Text does not parse as a decimal number
    #[error("invalid decimal '{0}'")]
    InvalidDecimal(String),

    /// Decimal with more fractional digits than the field allows
    #[error("'{value}' carries more than {max_scale} decimal places")]
    ExcessScale { value: String, max_scale: u32 },

    /// Text does not match the date-time grammar
    #[error("invalid date-time '{value}': {reason}")]
    InvalidDateTime { value: String, reason: &'static str },

    /// Text is not a member of the field's closed candidate set
    #[error("'{value}' is not one of: {allowed}")]
    NotInEnumeration { value: String, allowed: String },
}

/// Result type alias for decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;
