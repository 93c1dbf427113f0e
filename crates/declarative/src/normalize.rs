//! Translate raw provider resources into the canonical schema
//!
//! Normalization is a pure, total function of the raw resource: it renames
//! provider keys, unwraps first-element list shapes and coerces each value
//! according to its field's [`FieldKind`]. Remote keys outside the schema
//! are dropped.

use crate::schema::{CanonicalField, FieldKind, RemoteSource, Schema};
use crate::types::FieldValue;
use serde_json::Value;

/// A resource exactly as the provider returned it.
pub type RawResource = serde_json::Map<String, Value>;

/// Remote resource in canonical names and kinds.
///
/// Only fields whose source key the provider actually reported are present.
/// A key reported as `null` is present with [`FieldValue::Null`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedResource {
    values: Vec<(&'static str, FieldValue)>,
}

impl NormalizedResource {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalize a raw remote resource against `schema`.
pub fn normalize(schema: &Schema, raw: &RawResource) -> NormalizedResource {
    let values = schema
        .fields
        .iter()
        .filter_map(|field| {
            let reported = raw.get(field.remote_key())?;
            Some((field.name, coerce_remote(field, reported)))
        })
        .collect();
    NormalizedResource { values }
}

/// Read the identity value of a raw listing entry as text.
pub fn remote_identity(schema: &Schema, raw: &RawResource) -> Option<String> {
    let field = schema.identity_field()?;
    raw.get(field.remote_key()).map(scalar_text)
}

fn coerce_remote(field: &CanonicalField, reported: &Value) -> FieldValue {
    let value = match field.source {
        RemoteSource::FirstElement { member, .. } => first_element(reported, member),
        RemoteSource::Wire | RemoteSource::Renamed(_) => reported,
    };
    coerce(field.kind, value)
}

fn first_element<'a>(value: &'a Value, member: Option<&str>) -> &'a Value {
    let element = match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    match (element, member) {
        (Some(el), Some(member)) => el.get(member).unwrap_or(&Value::Null),
        (Some(el), None) => el,
        (None, _) => &Value::Null,
    }
}

/// Coerce a remote value to the canonical representation for `kind`.
fn coerce(kind: FieldKind, value: &Value) -> FieldValue {
    match (kind, value) {
        (_, Value::Null) => FieldValue::Null,
        (FieldKind::CommaList | FieldKind::String, Value::Array(items)) => {
            FieldValue::Text(items.iter().map(scalar_text).collect::<Vec<_>>().join(","))
        }
        (FieldKind::Bool | FieldKind::Int, Value::Bool(b)) => FieldValue::Int(i64::from(*b)),
        (FieldKind::Bool | FieldKind::Int, Value::Number(n)) => n
            .as_i64()
            .map_or_else(|| FieldValue::Text(n.to_string()), FieldValue::Int),
        (FieldKind::Bool, Value::String(s)) => match s.trim() {
            "true" | "True" => FieldValue::Int(1),
            "false" | "False" => FieldValue::Int(0),
            other => parse_int_or_text(other),
        },
        (FieldKind::Int, Value::String(s)) => parse_int_or_text(s.trim()),
        (_, other) => FieldValue::Text(scalar_text(other)),
    }
}

fn parse_int_or_text(s: &str) -> FieldValue {
    s.parse::<i64>()
        .map_or_else(|_| FieldValue::text(s), FieldValue::Int)
}

/// Plain text form of a JSON scalar; strings lose their quotes.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
