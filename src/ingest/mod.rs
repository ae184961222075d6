//! Ingest adapters
//!
//! The platform metadata service hands over loosely typed property trees.
//! Adapters are the only place that inspects those trees: each maps one
//! schema's raw tags into keys and values of the closed value model, and
//! records per-tag problems as diagnostics instead of failing the ingest.

use crate::core::error::{MetaError, MetaResult};
use crate::core::metadata::MetadataStore;
use crate::types::key::{Key, Namespace};
use crate::types::value::{Scalar, Value};
use log::warn;
use std::fmt;

pub mod exif;
pub mod gps;
pub mod iptc;

pub use exif::ExifAdapter;
pub use gps::GpsCoordinate;
pub use iptc::IptcAdapter;

/// A primitive from the platform property tree
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// String value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Real(f64),
    /// Unreduced rational (numerator, denominator)
    Rational(i64, i64),
    /// Boolean value
    Bool(bool),
    /// Array of primitives
    Array(Vec<RawValue>),
}

impl RawValue {
    /// Rational value
    pub fn rational(numerator: i64, denominator: i64) -> Self {
        RawValue::Rational(numerator, denominator)
    }

    /// Get the text, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Integer(i) => Some(*i as f64),
            RawValue::Real(r) => Some(*r),
            RawValue::Rational(n, d) if *d != 0 => Some(*n as f64 / *d as f64),
            RawValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl TryFrom<&Value> for RawValue {
    type Error = MetaError;

    /// Flatten a value for write-back
    ///
    /// Lists and sets become arrays, a language alternative becomes its
    /// default text and dates their canonical text. Structs have no flat
    /// form and fail with [`MetaError::Validation`].
    fn try_from(value: &Value) -> MetaResult<Self> {
        match value {
            Value::Scalar(Scalar::Text(s)) => Ok(RawValue::Text(s.clone())),
            Value::Scalar(Scalar::Integer(i)) => Ok(RawValue::Integer(*i)),
            Value::Scalar(Scalar::Real(r)) => Ok(RawValue::Real(*r)),
            Value::Scalar(Scalar::Boolean(b)) => Ok(RawValue::Bool(*b)),
            Value::Scalar(Scalar::Date(dt)) => Ok(RawValue::Text(dt.format())),
            Value::OrderedList(items) | Value::UnorderedSet(items) => items
                .iter()
                .map(RawValue::try_from)
                .collect::<MetaResult<Vec<_>>>()
                .map(RawValue::Array),
            Value::LangAlt(alt) => Ok(RawValue::Text(alt.default_text().to_string())),
            Value::Struct(_) => Err(MetaError::Validation(
                "struct values cannot be written to a flat tree".to_string(),
            )),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Integer(i)
    }
}

impl From<f64> for RawValue {
    fn from(r: f64) -> Self {
        RawValue::Real(r)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        RawValue::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A flat `tag -> primitive` tree for one schema, in platform order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTree {
    entries: Vec<(String, RawValue)>,
}

impl RawTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag (builder form)
    pub fn with(mut self, tag: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Add or replace a tag
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<RawValue>) {
        let tag = tag.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == tag) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    /// Get a tag
    pub fn get(&self, tag: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    /// Iterate tags in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the tree has no tags
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten one partition of a store for write-back
    ///
    /// XMP tags are written as `prefix:local`.
    pub fn from_partition(store: &MetadataStore, namespace: Namespace) -> MetaResult<Self> {
        let mut tree = RawTree::new();
        for (key, value) in store.partition(namespace) {
            let raw = RawValue::try_from(value)
                .map_err(|e| MetaError::Validation(format!("{}: {}", key, e)))?;
            tree.insert(key.tag_name(), raw);
        }
        Ok(tree)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = RawTree::new();
        for (tag, value) in iter {
            tree.insert(tag, value);
        }
        tree
    }
}

/// What happened to a tag that could not be mapped cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// The tag was left out of the result
    Dropped,
    /// The tag was kept as its raw text
    KeptRaw,
}

/// Diagnostic for one malformed tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSkip {
    /// Namespace of the adapter that saw the tag
    pub namespace: Namespace,
    /// Raw tag name
    pub tag: String,
    /// Outcome for the tag
    pub kind: SkipKind,
    /// Human readable reason
    pub reason: String,
}

impl fmt::Display for AdapterSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.kind {
            SkipKind::Dropped => "dropped",
            SkipKind::KeptRaw => "kept as text",
        };
        write!(f, "{}:{} {}: {}", self.namespace, self.tag, outcome, self.reason)
    }
}

/// Result of mapping one tag
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped {
    /// Clean mapping
    Value(Value),
    /// Kept as raw text, with the reason the coercion failed
    KeptRaw(Value, String),
    /// Left out, with the reason
    Dropped(String),
}

/// Entries produced by an adapter plus the diagnostics it recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Mapped entries, in raw tree order
    pub entries: Vec<(Key, Value)>,
    /// One diagnostic per tag that was dropped or kept raw
    pub diagnostics: Vec<AdapterSkip>,
}

impl IngestReport {
    /// Insert every entry into `store`
    ///
    /// Entries the store rejects are turned into `Dropped` diagnostics.
    pub fn apply_to(self, store: &mut MetadataStore) -> Vec<AdapterSkip> {
        let mut diagnostics = self.diagnostics;
        for (key, value) in self.entries {
            if let Err(e) = store.set(key.clone(), value) {
                warn!("Dropping {}: {}", key, e);
                diagnostics.push(AdapterSkip {
                    namespace: key.namespace(),
                    tag: key.tag_name(),
                    kind: SkipKind::Dropped,
                    reason: e.to_string(),
                });
            }
        }
        diagnostics
    }

    /// Build a new store holding these entries
    pub fn into_store(self) -> (MetadataStore, Vec<AdapterSkip>) {
        let mut store = MetadataStore::new();
        let diagnostics = self.apply_to(&mut store);
        (store, diagnostics)
    }
}

/// Maps one schema's raw property tree into the value model
pub trait IngestAdapter {
    /// Namespace the adapter produces keys in
    fn namespace(&self) -> Namespace;

    /// Map a single tag
    fn map_tag(&self, tag: &str, raw: &RawValue) -> Mapped;

    /// Map a whole tree; never fails because of a single tag
    fn ingest(&self, tree: &RawTree) -> IngestReport {
        let namespace = self.namespace();
        let mut report = IngestReport::default();

        for (tag, raw) in tree.iter() {
            let key = match Key::from_parts(namespace, tag) {
                Ok(key) => key,
                Err(e) => {
                    record(&mut report, namespace, tag, SkipKind::Dropped, e.to_string());
                    continue;
                }
            };
            match self.map_tag(tag, raw) {
                Mapped::Value(value) => report.entries.push((key, value)),
                Mapped::KeptRaw(value, reason) => {
                    record(&mut report, namespace, tag, SkipKind::KeptRaw, reason);
                    report.entries.push((key, value));
                }
                Mapped::Dropped(reason) => {
                    record(&mut report, namespace, tag, SkipKind::Dropped, reason);
                }
            }
        }

        report
    }
}

fn record(report: &mut IngestReport, namespace: Namespace, tag: &str, kind: SkipKind, reason: String) {
    warn!("{}:{}: {}", namespace, tag, reason);
    report.diagnostics.push(AdapterSkip {
        namespace,
        tag: tag.to_string(),
        kind,
        reason,
    });
}

/// Coerce a primitive into a scalar
///
/// Rationals become reals; arrays and degenerate numbers are rejected.
pub(crate) fn scalar_from_raw(raw: &RawValue) -> Result<Scalar, String> {
    match raw {
        RawValue::Text(s) => Ok(Scalar::Text(s.clone())),
        RawValue::Integer(i) => Ok(Scalar::Integer(*i)),
        RawValue::Real(r) if r.is_finite() => Ok(Scalar::Real(*r)),
        RawValue::Real(r) => Err(format!("non-finite number {}", r)),
        RawValue::Rational(_, 0) => Err("rational with zero denominator".to_string()),
        RawValue::Rational(n, d) => Ok(Scalar::Real(*n as f64 / *d as f64)),
        RawValue::Bool(b) => Ok(Scalar::Boolean(*b)),
        RawValue::Array(_) => Err("nested array".to_string()),
    }
}

/// Coerce every array item into a scalar
pub(crate) fn scalars_from_raw(items: &[RawValue]) -> Result<Vec<Value>, String> {
    items
        .iter()
        .map(|item| scalar_from_raw(item).map(Value::Scalar))
        .collect()
}

/// Run both adapters over their trees and collect everything in one store
pub fn ingest_all(exif: &RawTree, iptc: &RawTree) -> (MetadataStore, Vec<AdapterSkip>) {
    let mut store = MetadataStore::new();
    let mut diagnostics = ExifAdapter::default().ingest(exif).apply_to(&mut store);
    diagnostics.extend(IptcAdapter::default().ingest(iptc).apply_to(&mut store));
    (store, diagnostics)
}
