//! Transaction features accepted by the scoring endpoint.
//!
//! Inputs are coerced leniently: numeric strings and booleans (as 1/0) are
//! accepted, and integer fields accept floats, or float strings, without a
//! fractional part. Every offending field is reported, not just the first one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 4;

/// Input names, in the order the model consumes them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["amount", "time_of_day", "mismatch", "frequency"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionFeatures {
    /// Monetary amount of the transaction
    pub amount: f64,
    pub time_of_day: i64,
    /// Billing/shipping mismatch flag (0 or 1 in practice; not range-checked)
    pub mismatch: i64,
    /// Recent transaction count for the account
    pub frequency: i64,
}

/// A single rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn body(kind: &str, msg: &str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }

    fn field(field: &str, kind: &str, msg: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.to_string(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.loc.join("."), e.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|e| e.loc.get(1).map(String::as_str))
            .collect()
    }
}

impl TransactionFeatures {
    /// Parse and validate a raw request body.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, ValidationErrors> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ValidationErrors(vec![FieldError::body(
                "json_invalid",
                &format!("JSON decode error: {e}"),
            )])
        })?;
        Self::from_value(&value)
    }

    /// Validate an already-decoded JSON document.
    pub fn from_value(value: &Value) -> Result<Self, ValidationErrors> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationErrors(vec![FieldError::body(
                "model_attributes_type",
                "Input should be a valid dictionary or object to extract fields from",
            )]));
        };

        let mut errors = Vec::new();
        let amount = take(obj, "amount", coerce_float, &mut errors);
        let time_of_day = take(obj, "time_of_day", coerce_int, &mut errors);
        let mismatch = take(obj, "mismatch", coerce_int, &mut errors);
        let frequency = take(obj, "frequency", coerce_int, &mut errors);

        match (amount, time_of_day, mismatch, frequency) {
            (Some(amount), Some(time_of_day), Some(mismatch), Some(frequency))
                if errors.is_empty() =>
            {
                Ok(Self {
                    amount,
                    time_of_day,
                    mismatch,
                    frequency,
                })
            }
            _ => Err(ValidationErrors(errors)),
        }
    }

    /// Raw model input in `FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.amount as f32,
            self.time_of_day as f32,
            self.mismatch as f32,
            self.frequency as f32,
        ]
    }
}

type Coercion<T> = fn(&Value) -> Result<T, (&'static str, &'static str)>;

fn take<T>(
    obj: &Map<String, Value>,
    field: &str,
    coerce: Coercion<T>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let Some(raw) = obj.get(field) else {
        errors.push(FieldError::field(field, "missing", "Field required"));
        return None;
    };
    match coerce(raw) {
        Ok(v) => Some(v),
        Err((kind, msg)) => {
            errors.push(FieldError::field(field, kind, msg));
            None
        }
    }
}

fn coerce_float(value: &Value) -> Result<f64, (&'static str, &'static str)> {
    const PARSE: (&str, &str) = (
        "float_parsing",
        "Input should be a valid number, unable to parse string as a number",
    );
    match value {
        Value::Number(n) => n.as_f64().ok_or(PARSE),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        // Finite only: "inf" and "nan" never reach the model.
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(PARSE),
        },
        _ => Err(("float_type", "Input should be a valid number")),
    }
}

const INT_PARSE: (&str, &str) = (
    "int_parsing",
    "Input should be a valid integer, unable to parse string as an integer",
);

fn coerce_int(value: &Value) -> Result<i64, (&'static str, &'static str)> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                // Positive but beyond i64.
                return Err(INT_PARSE);
            }
            let f = n.as_f64().ok_or(INT_PARSE)?;
            if f.fract() != 0.0 {
                return Err((
                    "int_from_float",
                    "Input should be a valid integer, got a number with a fractional part",
                ));
            }
            integral_float(f)
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            // "12.0" is an integer written as a float.
            match s.parse::<f64>() {
                Ok(f) if f.is_finite() && f.fract() == 0.0 => integral_float(f),
                _ => Err(INT_PARSE),
            }
        }
        _ => Err(("int_type", "Input should be a valid integer")),
    }
}

fn integral_float(f: f64) -> Result<i64, (&'static str, &'static str)> {
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(INT_PARSE);
    }
    Ok(f as i64)
}
