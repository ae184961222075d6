//! Flat dictionary export
//!
//! Output formatters (tables, CSV, JSON) consume metadata as plain
//! `tag -> primitive or list` maps grouped by namespace.

use crate::types::key::Namespace;
use crate::types::value::{Scalar, Value};

/// A primitive-or-list value in the flat export
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// Text (also used for dates, in canonical form)
    Text(String),
    /// Integer
    Integer(i64),
    /// Real number
    Real(f64),
    /// Boolean
    Boolean(bool),
    /// List or set items
    List(Vec<FlatValue>),
    /// Struct fields, `prefix:local` names
    Map(Vec<(String, FlatValue)>),
}

impl FlatValue {
    /// Flatten a value: language alternatives collapse to their default text
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Scalar(Scalar::Text(s)) => FlatValue::Text(s.clone()),
            Value::Scalar(Scalar::Integer(i)) => FlatValue::Integer(*i),
            Value::Scalar(Scalar::Real(r)) => FlatValue::Real(*r),
            Value::Scalar(Scalar::Boolean(b)) => FlatValue::Boolean(*b),
            Value::Scalar(Scalar::Date(dt)) => FlatValue::Text(dt.format()),
            Value::OrderedList(items) | Value::UnorderedSet(items) => {
                FlatValue::List(items.iter().map(FlatValue::from_value).collect())
            }
            Value::LangAlt(alt) => FlatValue::Text(alt.default_text().to_string()),
            Value::Struct(st) => FlatValue::Map(
                st.fields()
                    .map(|(name, v)| (name.to_string(), FlatValue::from_value(v)))
                    .collect(),
            ),
        }
    }

    /// Get the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlatValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Flat export of a whole store, grouped by namespace
///
/// Groups appear in `XMP`, `EXIF`, `IPTC` order; empty groups are kept so
/// every export has the same shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatDict {
    pub(crate) groups: Vec<(Namespace, Vec<(String, FlatValue)>)>,
}

impl FlatDict {
    /// Entries of one namespace, in insertion order
    pub fn group(&self, namespace: Namespace) -> &[(String, FlatValue)] {
        self.groups
            .iter()
            .find(|(ns, _)| *ns == namespace)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or_default()
    }

    /// Look up a tag (`dc:subject`, `LensMake`) within a namespace
    pub fn get(&self, namespace: Namespace, tag: &str) -> Option<&FlatValue> {
        self.group(namespace)
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v)
    }

    /// Iterate groups
    pub fn iter(&self) -> impl Iterator<Item = (Namespace, &[(String, FlatValue)])> {
        self.groups.iter().map(|(ns, entries)| (*ns, entries.as_slice()))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{FlatDict, FlatValue};
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    impl Serialize for FlatValue {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                FlatValue::Text(s) => serializer.serialize_str(s),
                FlatValue::Integer(i) => serializer.serialize_i64(*i),
                FlatValue::Real(r) => serializer.serialize_f64(*r),
                FlatValue::Boolean(b) => serializer.serialize_bool(*b),
                FlatValue::List(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                FlatValue::Map(fields) => {
                    let mut map = serializer.serialize_map(Some(fields.len()))?;
                    for (name, value) in fields {
                        map.serialize_entry(name, value)?;
                    }
                    map.end()
                }
            }
        }
    }

    struct Group<'a>(&'a [(String, FlatValue)]);

    impl Serialize for Group<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.0.len()))?;
            for (tag, value) in self.0 {
                map.serialize_entry(tag, value)?;
            }
            map.end()
        }
    }

    impl Serialize for FlatDict {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.groups.len()))?;
            for (ns, entries) in &self.groups {
                map.serialize_entry(ns.as_str(), &Group(entries))?;
            }
            map.end()
        }
    }
}
