// Shared flattening helpers
//
// Resource/scope contexts, attribute retention and id formatting used by every
// signal flattener.

use std::collections::HashMap;

use opentelemetry_proto::tonic::{
    common::v1::{InstrumentationScope, KeyValue},
    resource::v1::Resource,
};
use tracing::debug;

use crate::rows::{AttributeOwner, AttributeRow, RowSet};
use crate::table::Table;
use crate::value::{coerce, TaggedValue};

/// Resource an entity was reported under.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceContext<'a> {
    pub attributes: &'a [KeyValue],
}

impl<'a> ResourceContext<'a> {
    pub fn new(resource: Option<&'a Resource>) -> Self {
        Self {
            attributes: resource.map(|r| r.attributes.as_slice()).unwrap_or(&[]),
        }
    }
}

/// Instrumentation scope an entity was reported under.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeContext<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub attributes: &'a [KeyValue],
}

impl<'a> ScopeContext<'a> {
    pub fn new(scope: Option<&'a InstrumentationScope>) -> Self {
        match scope {
            Some(scope) => Self {
                name: scope.name.as_str(),
                version: scope.version.as_str(),
                attributes: scope.attributes.as_slice(),
            },
            None => Self::default(),
        }
    }
}

/// Attributes that survived key and value checks, in first-seen key order.
#[derive(Debug, Default)]
pub(crate) struct RetainedAttributes {
    pub pairs: Vec<(String, TaggedValue)>,
    pub dropped: u64,
}

/// Filter an attribute collection down to materializable pairs.
///
/// Empty keys and values that fail coercion are dropped and counted. A repeated
/// key overwrites the earlier value in place.
pub(crate) fn retain_attributes(attributes: &[KeyValue], collection: &str) -> RetainedAttributes {
    let mut retained = RetainedAttributes {
        pairs: Vec::with_capacity(attributes.len()),
        dropped: 0,
    };
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(attributes.len());

    for attribute in attributes {
        if attribute.key.is_empty() {
            retained.dropped += 1;
            debug!(collection, "dropping attribute with empty key");
            continue;
        }

        match coerce(attribute.value.as_ref()) {
            Ok(value) => match positions.get(attribute.key.as_str()) {
                Some(&index) => retained.pairs[index].1 = value,
                None => {
                    positions.insert(attribute.key.as_str(), retained.pairs.len());
                    retained.pairs.push((attribute.key.clone(), value));
                }
            },
            Err(err) => {
                retained.dropped += 1;
                debug!(
                    collection,
                    key = %attribute.key,
                    error = %err,
                    "dropping attribute that failed coercion"
                );
            }
        }
    }

    retained
}

/// Append one attribute row per retained pair and return the dropped count.
pub(crate) fn push_attributes(
    rows: &mut RowSet,
    table: Table,
    owner: &AttributeOwner,
    attributes: &[KeyValue],
) -> u64 {
    let retained = retain_attributes(attributes, table.as_str());
    for (key, value) in retained.pairs {
        rows.push(
            table,
            AttributeRow {
                owner: owner.clone(),
                key,
                value,
            },
        );
    }
    retained.dropped
}

/// OTLP nanosecond timestamps are unsigned; rows store them as i64.
pub(crate) fn nanos(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// An id is absent when it has no bytes or only zero bytes.
pub(crate) fn is_empty_id(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

/// Lower-case hex for present ids, empty string for absent ones.
pub(crate) fn hex_id(bytes: &[u8]) -> String {
    if is_empty_id(bytes) {
        String::new()
    } else {
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;
    use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue};

    fn kv(key: &str, value: any_value::Value) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Some(AnyValue { value: Some(value) }),
        }
    }

    #[test]
    fn empty_keys_and_bad_values_are_counted() {
        let attributes = vec![
            kv("", any_value::Value::IntValue(1)),
            kv("ok", any_value::Value::StringValue("yes".to_string())),
            kv(
                "bad",
                any_value::Value::ArrayValue(opentelemetry_proto::tonic::common::v1::ArrayValue {
                    values: vec![AnyValue {
                        value: Some(any_value::Value::DoubleValue(f64::NAN)),
                    }],
                }),
            ),
        ];

        let retained = retain_attributes(&attributes, "test");
        assert_eq!(retained.dropped, 2);
        assert_eq!(retained.pairs.len(), 1);
        assert_eq!(retained.pairs[0].0, "ok");
    }

    #[test]
    fn duplicate_key_keeps_last_value_at_first_position() {
        let attributes = vec![
            kv("a", any_value::Value::IntValue(1)),
            kv("b", any_value::Value::IntValue(2)),
            kv("a", any_value::Value::IntValue(3)),
        ];

        let retained = retain_attributes(&attributes, "test");
        let keys: Vec<_> = retained.pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(retained.pairs[0].1.kind, ValueKind::Int);
        assert_eq!(retained.pairs[0].1.int_value, 3);
    }

    #[test]
    fn id_helpers() {
        assert!(is_empty_id(&[]));
        assert!(is_empty_id(&[0; 16]));
        assert_eq!(hex_id(&[0; 8]), "");
        assert_eq!(hex_id(&[0xab, 0x01]), "ab01");
        assert_eq!(nanos(u64::MAX), i64::MAX);
        assert_eq!(nanos(42), 42);
    }
}
