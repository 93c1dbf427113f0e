//! Desired state for a remote resource
//!
//! [`DesiredResource`] is built once per invocation from caller parameters
//! and never mutated afterwards. Building applies schema defaults, coerces
//! values to their canonical kind, rewrites JSON text fields and enforces the
//! required-field rules of the requested intent. No network access happens
//! here.

use crate::error::{Error, Result};
use crate::normalize::scalar_text;
use crate::schema::{CanonicalField, FieldKind, Literal, Schema};
use crate::types::{FieldValue, Intent};
use serde_json::Value;

/// Caller-supplied parameters keyed by canonical field name.
pub type Params = serde_json::Map<String, Value>;

/// Create/update payload as `(wire key, value)` pairs in schema order.
pub type Payload = Vec<(&'static str, String)>;

/// Desired state of one resource, in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredResource {
    schema: &'static Schema,
    values: Vec<(&'static CanonicalField, FieldValue)>,
}

impl DesiredResource {
    /// Build the desired state for `intent` from caller parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for unknown fields, values that cannot be
    /// coerced to their field kind, and missing required fields.
    pub fn build(schema: &'static Schema, intent: Intent, params: &Params) -> Result<Self> {
        if let Some(unknown) = params.keys().find(|k| schema.field(k).is_none()) {
            return Err(Error::validation(format!(
                "unknown field '{unknown}' for {}",
                schema.resource
            )));
        }

        let mut values = Vec::with_capacity(schema.fields.len());
        for field in schema.fields {
            let given = match params.get(field.name) {
                Some(raw) if !raw.is_null() => Some(coerce_input(field, raw)?),
                _ => None,
            };
            let value = match (given, field.default) {
                (Some(value), _) if value.is_set() || field.kind == FieldKind::Bool => value,
                (_, Some(default)) => literal(default),
                (given, None) => given.unwrap_or(FieldValue::Null),
            };
            values.push((field, rewrite_json_text(field, value)));
        }

        let desired = Self { schema, values };
        desired.validate(intent)?;
        Ok(desired)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Canonical value of a field; `None` if the schema has no such field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(f, _)| f.name == name)
            .map(|(_, v)| v)
    }

    /// Identity value (the resource name, or domain) as text.
    pub fn identity(&self) -> String {
        self.get(self.schema.identity)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Fields with their desired values, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static CanonicalField, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    /// Full write payload, ignored-in-diff fields included.
    ///
    /// Null values are left out: a form body has no way to carry them.
    pub fn payload(&self) -> Payload {
        self.values
            .iter()
            .filter(|(_, v)| !matches!(v, FieldValue::Null))
            .map(|(f, v)| (f.wire, v.to_string()))
            .collect()
    }

    fn validate(&self, intent: Intent) -> Result<()> {
        let required: Vec<&str> = match intent {
            Intent::Present => self.schema.required_present.to_vec(),
            Intent::Absent => vec![self.schema.identity],
            Intent::List => return Ok(()),
        };

        let missing: Vec<&str> = required
            .into_iter()
            .filter(|name| !self.get(name).is_some_and(FieldValue::is_set))
            .collect();
        if !missing.is_empty() {
            return Err(Error::validation(format!(
                "state is {intent} but all of the following are missing: {}",
                missing.join(", ")
            )));
        }

        for cond in self.schema.conditions {
            let triggered = self
                .get(cond.when)
                .is_some_and(|v| v.to_string() == cond.equals);
            let satisfied = self.get(cond.requires).is_some_and(FieldValue::is_set);
            if triggered && !satisfied {
                return Err(Error::validation(format!(
                    "{} is {} but all of the following are missing: {}",
                    cond.when, cond.equals, cond.requires
                )));
            }
        }
        Ok(())
    }
}

fn literal(default: Literal) -> FieldValue {
    match default {
        Literal::Int(n) => FieldValue::Int(n),
        Literal::Bool(b) => FieldValue::Int(i64::from(b)),
        Literal::Text(s) => FieldValue::text(s),
    }
}

fn rewrite_json_text(field: &CanonicalField, value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(s) if field.json_text => FieldValue::Text(s.replace('\'', "\"")),
        other => other,
    }
}

/// Coerce one caller value to the field's canonical kind.
fn coerce_input(field: &CanonicalField, raw: &Value) -> Result<FieldValue> {
    let mismatch = |expected: &str| {
        Error::validation(format!(
            "field '{}' expects {expected}, got {raw}",
            field.name
        ))
    };

    match field.kind {
        FieldKind::String => match raw {
            Value::Array(_) | Value::Object(_) => Err(mismatch("text")),
            other => Ok(FieldValue::Text(scalar_text(other))),
        },
        FieldKind::CommaList => match raw {
            Value::Array(items) => Ok(FieldValue::Text(
                items.iter().map(scalar_text).collect::<Vec<_>>().join(","),
            )),
            Value::Object(_) => Err(mismatch("a comma separated list")),
            other => Ok(FieldValue::Text(scalar_text(other))),
        },
        FieldKind::Int => match raw {
            Value::Number(n) => n.as_i64().map(FieldValue::Int).ok_or_else(|| mismatch("an integer")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| mismatch("an integer")),
            _ => Err(mismatch("an integer")),
        },
        FieldKind::Bool => match raw {
            Value::Bool(b) => Ok(FieldValue::Int(i64::from(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(v @ (0 | 1)) => Ok(FieldValue::Int(v)),
                _ => Err(mismatch("0 or 1")),
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(FieldValue::Int(1)),
                "false" | "no" | "0" => Ok(FieldValue::Int(0)),
                _ => Err(mismatch("a boolean")),
            },
            _ => Err(mismatch("a boolean")),
        },
    }
}
