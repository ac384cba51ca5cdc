// AnyValue coercion into fixed tagged-value slots
//
// Scalars land in their own slot. Arrays and kvlists are JSON-encoded into the
// string slot, which loses the original key order.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use thiserror::Error;

/// Composite values nested deeper than this are rejected instead of encoded.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Discriminant naming the populated slot of a [`TaggedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    Empty,
    Int,
    String,
    Bool,
    Double,
    Bytes,
}

/// Attribute value spread over one slot per scalar type.
///
/// Only the slot named by `kind` carries data; every other slot keeps its zero
/// value. Booleans are stored in `bool_value` as `0` or `1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaggedValue {
    pub kind: ValueKind,
    pub int_value: i64,
    pub string_value: String,
    pub bool_value: i8,
    pub double_value: f64,
    pub bytes_value: Vec<u8>,
}

impl TaggedValue {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn int(value: i64) -> Self {
        Self {
            kind: ValueKind::Int,
            int_value: value,
            ..Self::default()
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::String,
            string_value: value.into(),
            ..Self::default()
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            kind: ValueKind::Bool,
            bool_value: i8::from(value),
            ..Self::default()
        }
    }

    pub fn double(value: f64) -> Self {
        Self {
            kind: ValueKind::Double,
            double_value: value,
            ..Self::default()
        }
    }

    pub fn bytes(value: Vec<u8>) -> Self {
        Self {
            kind: ValueKind::Bytes,
            bytes_value: value,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ValueKind::Empty
    }

    /// Rebuild the scalar OTLP value this tagged value was coerced from.
    ///
    /// Composite values come back as their JSON text in a string value.
    pub fn to_any_value(&self) -> Option<any_value::Value> {
        match self.kind {
            ValueKind::Empty => None,
            ValueKind::Int => Some(any_value::Value::IntValue(self.int_value)),
            ValueKind::String => Some(any_value::Value::StringValue(self.string_value.clone())),
            ValueKind::Bool => Some(any_value::Value::BoolValue(self.bool_value != 0)),
            ValueKind::Double => Some(any_value::Value::DoubleValue(self.double_value)),
            ValueKind::Bytes => Some(any_value::Value::BytesValue(self.bytes_value.clone())),
        }
    }
}

/// Reasons an attribute value cannot be represented as a [`TaggedValue`].
#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("non-finite double {0} cannot be encoded as JSON")]
    NonFiniteNumber(f64),

    #[error("composite value nested deeper than {MAX_NESTING_DEPTH} levels")]
    NestingTooDeep,

    #[error("failed to encode composite value as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Coerce one OTLP attribute value into its tagged representation.
///
/// A missing value is not an error: it yields an empty tagged value.
pub fn coerce(value: Option<&AnyValue>) -> Result<TaggedValue, CoercionError> {
    let Some(inner) = value.and_then(|value| value.value.as_ref()) else {
        return Ok(TaggedValue::empty());
    };

    let tagged = match inner {
        any_value::Value::StringValue(s) => TaggedValue::string(s.as_str()),
        any_value::Value::IntValue(i) => TaggedValue::int(*i),
        any_value::Value::DoubleValue(d) => TaggedValue::double(*d),
        any_value::Value::BoolValue(b) => TaggedValue::bool(*b),
        any_value::Value::BytesValue(b) => TaggedValue::bytes(b.clone()),
        composite @ (any_value::Value::ArrayValue(_) | any_value::Value::KvlistValue(_)) => {
            let json = value_to_json(Some(composite), 0)?;
            TaggedValue::string(serde_json::to_string(&json)?)
        }
    };
    Ok(tagged)
}

/// Render a log body as text: strings verbatim, everything else as JSON.
pub fn coerce_body(body: Option<&AnyValue>) -> Result<String, CoercionError> {
    let Some(body) = body else {
        return Ok(String::new());
    };
    match &body.value {
        None => Ok(String::new()),
        Some(any_value::Value::StringValue(s)) => Ok(s.clone()),
        Some(_) => Ok(serde_json::to_string(&any_value_to_json(body)?)?),
    }
}

/// Convert an OTLP AnyValue to serde_json::Value
pub fn any_value_to_json(value: &AnyValue) -> Result<JsonValue, CoercionError> {
    value_to_json(value.value.as_ref(), 0)
}

fn value_to_json(
    value: Option<&any_value::Value>,
    depth: usize,
) -> Result<JsonValue, CoercionError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(CoercionError::NestingTooDeep);
    }

    let Some(value) = value else {
        return Ok(JsonValue::Null);
    };

    match value {
        any_value::Value::StringValue(s) => Ok(JsonValue::String(s.clone())),
        any_value::Value::BoolValue(b) => Ok(JsonValue::Bool(*b)),
        any_value::Value::IntValue(i) => Ok(JsonValue::Number(JsonNumber::from(*i))),
        any_value::Value::DoubleValue(d) => JsonNumber::from_f64(*d)
            .map(JsonValue::Number)
            .ok_or(CoercionError::NonFiniteNumber(*d)),
        any_value::Value::BytesValue(b) => Ok(JsonValue::String(BASE64.encode(b))),
        any_value::Value::ArrayValue(arr) => {
            let mut values = Vec::with_capacity(arr.values.len());
            for item in &arr.values {
                values.push(value_to_json(item.value.as_ref(), depth + 1)?);
            }
            Ok(JsonValue::Array(values))
        }
        any_value::Value::KvlistValue(kv) => {
            let mut map = JsonMap::new();
            for entry in &kv.values {
                let inner = entry.value.as_ref().and_then(|v| v.value.as_ref());
                map.insert(entry.key.clone(), value_to_json(inner, depth + 1)?);
            }
            Ok(JsonValue::Object(map))
        }
    }
}
