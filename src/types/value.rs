//! Metadata value types
//!
//! This module defines the closed set of shapes a metadata field can take.
//! EXIF and IPTC only ever produce scalars, ordered lists and unordered sets;
//! XMP adds language alternatives and structs.

use crate::core::error::{MetaError, MetaResult};
use crate::types::key::QualifiedName;
use crate::types::lang_alt::LangAlt;
use crate::utils::datetime::MetaDateTime;
use std::borrow::Cow;
use std::fmt;

/// An atomic metadata value
///
/// XMP carries no type information on the wire, so scalars compare by their
/// XMP lexical form: `Integer(72)` equals `Text("72")`, and `Boolean(true)`
/// equals `Text("True")`.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Real value (EXIF rationals end up here)
    Real(f64),
    /// Boolean value (`True`/`False` in XMP)
    Boolean(bool),
    /// Date/time value, canonical by construction
    Date(MetaDateTime),
}

impl Scalar {
    /// Create a date scalar, normalizing the text
    ///
    /// Fails with [`MetaError::InvalidDate`] when the text is not a date in
    /// any supported form; the caller decides whether to keep it as text.
    pub fn date(s: &str) -> MetaResult<Self> {
        MetaDateTime::parse(s).map(Scalar::Date)
    }

    /// The XMP lexical form of this value
    pub fn lexical(&self) -> Cow<'_, str> {
        match self {
            Scalar::Text(s) => Cow::Borrowed(s),
            Scalar::Integer(i) => Cow::Owned(i.to_string()),
            Scalar::Real(r) => Cow::Owned(r.to_string()),
            Scalar::Boolean(true) => Cow::Borrowed("True"),
            Scalar::Boolean(false) => Cow::Borrowed("False"),
            Scalar::Date(dt) => Cow::Owned(dt.format()),
        }
    }

    /// Get the value as a string, if it is a text scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a real number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Real(r) => Some(*r),
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            Scalar::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Scalar::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Interpret the value as a date
    pub fn as_date(&self) -> Option<MetaDateTime> {
        match self {
            Scalar::Date(dt) => Some(*dt),
            Scalar::Text(s) => MetaDateTime::parse(s).ok(),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.lexical() == other.lexical()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexical())
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self {
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Integer(i) => serializer.serialize_i64(*i),
            Scalar::Real(r) => serializer.serialize_f64(*r),
            Scalar::Boolean(b) => serializer.serialize_bool(*b),
            Scalar::Date(dt) => serializer.serialize_str(&dt.format()),
        }
    }
}

/// An XMP struct: ordered named fields
///
/// Field order is kept for deterministic serialization but is not part of
/// equality.
#[derive(Debug, Clone, Default)]
pub struct XmpStruct {
    fields: Vec<(QualifiedName, Value)>,
}

impl XmpStruct {
    /// Create an empty struct
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field (builder form)
    pub fn with_field(mut self, name: QualifiedName, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Add or replace a field
    pub fn set_field(&mut self, name: QualifiedName, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field by name
    pub fn get_field(&self, name: &QualifiedName) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a field by local name, ignoring the prefix
    pub fn get_local(&self, local: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n.local == local)
            .map(|(_, v)| v)
    }

    /// Remove a field
    pub fn remove_field(&mut self, name: &QualifiedName) -> Option<Value> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Iterate fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&QualifiedName, &Value)> {
        self.fields.iter().map(|(n, v)| (n, v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the struct has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for XmpStruct {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(n, v)| other.get_field(n) == Some(v))
    }
}

/// A metadata value of any shape
#[derive(Debug, Clone)]
pub enum Value {
    /// Single value
    Scalar(Scalar),
    /// Ordered list (XMP `rdf:Seq`)
    OrderedList(Vec<Value>),
    /// Unordered set (XMP `rdf:Bag`); insertion order is kept, equality is by membership
    UnorderedSet(Vec<Value>),
    /// Localized text (XMP `rdf:Alt`)
    LangAlt(LangAlt),
    /// Struct with named fields
    Struct(XmpStruct),
}

impl Value {
    /// Text scalar
    pub fn text(s: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Text(s.into()))
    }

    /// Date scalar, normalized
    pub fn date(s: &str) -> MetaResult<Self> {
        Scalar::date(s).map(Value::Scalar)
    }

    /// Ordered list from items
    pub fn ordered<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::OrderedList(items.into_iter().map(Into::into).collect())
    }

    /// Unordered set from items
    pub fn unordered<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::UnorderedSet(items.into_iter().map(Into::into).collect())
    }

    /// Language alternative holding only a default text
    pub fn lang_alt(default_text: impl Into<String>) -> Self {
        Value::LangAlt(LangAlt::new(default_text))
    }

    /// Name of the value shape, for messages
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::OrderedList(_) => "ordered list",
            Value::UnorderedSet(_) => "unordered set",
            Value::LangAlt(_) => "language alternative",
            Value::Struct(_) => "struct",
        }
    }

    /// Get the scalar, if this is a scalar
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Get the text, if this is a text scalar
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Get the items of an ordered list or unordered set
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::OrderedList(items) | Value::UnorderedSet(items) => Some(items),
            _ => None,
        }
    }

    /// Get the language alternative, if this is one
    pub fn as_lang_alt(&self) -> Option<&LangAlt> {
        match self {
            Value::LangAlt(alt) => Some(alt),
            _ => None,
        }
    }

    /// Get the struct, if this is one
    pub fn as_struct(&self) -> Option<&XmpStruct> {
        match self {
            Value::Struct(st) => Some(st),
            _ => None,
        }
    }

    /// Resolve to a single text: scalar lexical form or default language text
    pub fn resolve_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Scalar(s) => Some(s.lexical()),
            Value::LangAlt(alt) => Some(Cow::Borrowed(alt.default_text())),
            _ => None,
        }
    }

    /// Check the Value Model invariants
    ///
    /// List and set items must be scalars or structs, reals must be finite,
    /// struct field names must be valid XML names and language tags must be
    /// well-formed.
    pub fn validate(&self) -> MetaResult<()> {
        match self {
            Value::Scalar(Scalar::Real(r)) if !r.is_finite() => Err(MetaError::Validation(
                format!("Real value must be finite, got {}", r),
            )),
            Value::Scalar(_) => Ok(()),
            Value::OrderedList(items) | Value::UnorderedSet(items) => {
                for item in items {
                    match item {
                        Value::Scalar(_) | Value::Struct(_) => item.validate()?,
                        other => {
                            return Err(MetaError::Validation(format!(
                                "{} items must be scalars or structs, found {}",
                                self.shape(),
                                other.shape()
                            )))
                        }
                    }
                }
                Ok(())
            }
            Value::LangAlt(alt) => alt.validate(),
            Value::Struct(st) => {
                for (name, value) in st.fields() {
                    name.validate()?;
                    value.validate()?;
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            (Value::OrderedList(a), Value::OrderedList(b)) => a == b,
            (Value::UnorderedSet(a), Value::UnorderedSet(b)) => same_members(a, b),
            (Value::LangAlt(a), Value::LangAlt(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            _ => false,
        }
    }
}

/// Multiset comparison, ignoring order
fn same_members(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        match b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate == item)
        {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{}", s),
            Value::OrderedList(items) | Value::UnorderedSet(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::LangAlt(alt) => write!(f, "{}", alt),
            Value::Struct(_) => write!(f, "[Struct]"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<LangAlt> for Value {
    fn from(alt: LangAlt) -> Self {
        Value::LangAlt(alt)
    }
}

impl From<XmpStruct> for Value {
    fn from(st: XmpStruct) -> Self {
        Value::Struct(st)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Integer(i))
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Scalar(Scalar::Real(r))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Boolean(b))
    }
}
