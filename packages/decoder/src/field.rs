//! Field descriptors: typed, constrained scalar slots
//!
//! A [`FieldSpec`] describes one named slot of a schema: its value kind,
//! its constraints, and whether the field is required. Descriptors are
//! built once when the schema catalog is composed and are read-only
//! afterwards, so they can be consulted from any number of concurrent
//! decode calls.

use crate::datetime;
use crate::error::FieldError;
use crate::value::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Value kind and constraints of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean, wire form `Y`/`N`
    Bool,
    /// Bounded string; exceeding the bound fails validation
    Text { max_length: usize },
    /// Bounded string that tolerates over-length values from known
    /// nonconforming producers: the value is kept and a warning logged
    LenientText { max_length: usize },
    /// Integer with an optional bound on the number of digits
    Integer { max_digits: Option<u32> },
    /// Exact decimal with an optional bound on fractional digits
    Decimal { max_scale: Option<u32> },
    /// Date-time in the format's grammar
    DateTime,
    /// Closed enumeration; the candidate set is fixed per field
    OneOf { choices: &'static [&'static str] },
}

/// A typed, constrained field slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    kind: FieldKind,
    required: bool,
}

impl FieldSpec {
    fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    /// Boolean field.
    pub fn boolean() -> Self {
        Self::new(FieldKind::Bool)
    }

    /// Bounded string field.
    pub fn text(max_length: usize) -> Self {
        Self::new(FieldKind::Text { max_length })
    }

    /// Bounded string field that accepts over-length values with a warning.
    pub fn lenient_text(max_length: usize) -> Self {
        Self::new(FieldKind::LenientText { max_length })
    }

    /// Integer field with no digit bound.
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer { max_digits: None })
    }

    /// Integer field bounded to `max_digits` digits.
    pub fn integer_digits(max_digits: u32) -> Self {
        Self::new(FieldKind::Integer {
            max_digits: Some(max_digits),
        })
    }

    /// Decimal field with no scale bound.
    pub fn decimal() -> Self {
        Self::new(FieldKind::Decimal { max_scale: None })
    }

    /// Decimal field accepting at most `max_scale` fractional digits.
    pub fn decimal_scale(max_scale: u32) -> Self {
        Self::new(FieldKind::Decimal {
            max_scale: Some(max_scale),
        })
    }

    /// Date-time field.
    pub fn datetime() -> Self {
        Self::new(FieldKind::DateTime)
    }

    /// Closed-enumeration field over a fixed candidate set.
    pub fn one_of(choices: &'static [&'static str]) -> Self {
        Self::new(FieldKind::OneOf { choices })
    }

    /// Mark the field as required, builder style.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether absence of this field is a validation failure.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The field's value kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Convert raw text (already stripped of surrounding whitespace) into
    /// a typed value, or fail with the constraint that was violated.
    pub fn convert(&self, raw: &str) -> Result<Value, FieldError> {
        match &self.kind {
            FieldKind::Bool => match raw {
                "Y" => Ok(Value::Bool(true)),
                "N" => Ok(Value::Bool(false)),
                other => Err(FieldError::InvalidBool(other.to_string())),
            },
            FieldKind::Text { max_length } => {
                let actual = raw.chars().count();
                if actual > *max_length {
                    return Err(FieldError::TooLong {
                        max: *max_length,
                        actual,
                    });
                }
                Ok(Value::String(raw.to_string()))
            }
            FieldKind::LenientText { max_length } => {
                let actual = raw.chars().count();
                if actual > *max_length {
                    tracing::warn!(
                        length = actual,
                        max = max_length,
                        "Accepting over-length value from nonconforming producer"
                    );
                }
                Ok(Value::String(raw.to_string()))
            }
            FieldKind::Integer { max_digits } => {
                let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(FieldError::InvalidInteger(raw.to_string()));
                }
                if let Some(max) = max_digits {
                    if digits.len() as u32 > *max {
                        return Err(FieldError::TooManyDigits {
                            value: raw.to_string(),
                            max_digits: *max,
                        });
                    }
                }
                let value: i64 = raw
                    .parse()
                    .map_err(|_| FieldError::InvalidInteger(raw.to_string()))?;
                Ok(Value::Int(value))
            }
            FieldKind::Decimal { max_scale } => {
                let value = Decimal::from_str(raw)
                    .map_err(|_| FieldError::InvalidDecimal(raw.to_string()))?;
                if let Some(max) = max_scale {
                    if value.scale() > *max {
                        return Err(FieldError::ExcessScale {
                            value: raw.to_string(),
                            max_scale: *max,
                        });
                    }
                }
                Ok(Value::Decimal(value))
            }
            FieldKind::DateTime => datetime::parse(raw).map(Value::DateTime),
            FieldKind::OneOf { choices } => {
                if choices.contains(&raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(FieldError::NotInEnumeration {
                        value: raw.to_string(),
                        allowed: choices.join(", "),
                    })
                }
            }
        }
    }
}
