//! Canonical schema shared by desired and remote representations
//!
//! A [`Schema`] is pure data: an ordered list of [`CanonicalField`]s plus the
//! rules that pick out a resource's identity and its required inputs. One
//! schema exists per resource type; the reconciler is generic over it.

/// Value kind of a canonical field. Drives coercion on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain text.
    String,
    /// Integer.
    Int,
    /// Boolean, held canonically as integer 0/1.
    Bool,
    /// Comma-joined list; remote lists are joined with `,`.
    CommaList,
}

/// Where the normalizer reads a field from a raw remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteSource {
    /// The remote key equals the field's wire key.
    Wire,
    /// The provider reports the field under another key.
    Renamed(&'static str),
    /// First element of a remote list, optionally one member of that element.
    FirstElement {
        key: &'static str,
        member: Option<&'static str>,
    },
}

/// Default applied by the builder when a field is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Text(&'static str),
    Bool(bool),
}

/// One field of the canonical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalField {
    /// Canonical name, used in caller input and in diffs.
    pub name: &'static str,
    /// Provider key used in create/update payloads.
    pub wire: &'static str,
    pub kind: FieldKind,
    /// Sent on every write but never drives the update decision.
    pub ignored_in_diff: bool,
    pub source: RemoteSource,
    pub default: Option<Literal>,
    /// Free text that must survive as embedded JSON: `'` becomes `"`.
    pub json_text: bool,
}

impl CanonicalField {
    /// A field read back from the remote under its own wire key.
    pub const fn new(name: &'static str, wire: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire,
            kind,
            ignored_in_diff: false,
            source: RemoteSource::Wire,
            default: None,
            json_text: false,
        }
    }

    pub const fn ignored(mut self) -> Self {
        self.ignored_in_diff = true;
        self
    }

    pub const fn from_remote(mut self, source: RemoteSource) -> Self {
        self.source = source;
        self
    }

    pub const fn with_default(mut self, default: Literal) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn json_text(mut self) -> Self {
        self.json_text = true;
        self
    }

    /// Top-level key the normalizer looks for in a raw remote resource.
    pub fn remote_key(&self) -> &'static str {
        match self.source {
            RemoteSource::Wire => self.wire,
            RemoteSource::Renamed(key) | RemoteSource::FirstElement { key, .. } => key,
        }
    }
}

/// `when == equals` requires `requires` to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub when: &'static str,
    pub equals: &'static str,
    pub requires: &'static str,
}

/// Field contract for one resource type.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    /// Resource type label, e.g. "uptime test".
    pub resource: &'static str,
    /// Canonical name of the identity field.
    pub identity: &'static str,
    /// Provider key holding the remote identifier in listing entries.
    pub id_key: &'static str,
    /// Fields in declaration order. Diffs follow this order.
    pub fields: &'static [CanonicalField],
    /// Fields required when the resource should be present.
    pub required_present: &'static [&'static str],
    pub conditions: &'static [Condition],
}

impl Schema {
    /// Look up a field by canonical name.
    pub fn field(&self, name: &str) -> Option<&'static CanonicalField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The identity field.
    ///
    /// Schemas are static tables; one whose identity names no field is a
    /// programming error caught by [`Schema::check`] in tests.
    pub fn identity_field(&self) -> Option<&'static CanonicalField> {
        self.field(self.identity)
    }

    /// Validate the schema's internal references.
    ///
    /// Returns a description of the first broken reference.
    pub fn check(&self) -> Result<(), String> {
        if self.identity_field().is_none() {
            return Err(format!("identity '{}' is not a field", self.identity));
        }
        for name in self.required_present {
            if self.field(name).is_none() {
                return Err(format!("required field '{name}' is not a field"));
            }
        }
        for cond in self.conditions {
            for name in [cond.when, cond.requires] {
                if self.field(name).is_none() {
                    return Err(format!("condition field '{name}' is not a field"));
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        for field in self.fields {
            if !seen.insert(field.name) {
                return Err(format!("duplicate field '{}'", field.name));
            }
        }
        Ok(())
    }
}
