//! Metadata store
//!
//! This module provides [`MetadataStore`], the unified container holding EXIF,
//! IPTC and XMP entries side by side.

use crate::core::error::{MetaError, MetaResult};
use crate::core::namespace::{resolve_prefix, resolve_uri, NamespaceMap};
use crate::core::packet::XmpPacket;
use crate::core::parser::{ParseOptions, XmpParser};
use crate::core::serializer::{SerializeOptions, XmpSerializer};
use crate::core::xpath::parse_path;
use crate::types::key::{Key, Namespace, QualifiedName};
use crate::types::value::{Value, XmpStruct};
use log::{debug, warn};
use std::borrow::Cow;
use std::str::FromStr;

mod flat;
mod partition;

pub use flat::{FlatDict, FlatValue};
use partition::Partition;

/// Namespace-qualified metadata container
///
/// Entries are kept per namespace in insertion order. XMP prefixes resolve
/// through the store's own bindings first, then the built-in namespaces.
/// A store is owned by one caller at a time and is not internally
/// synchronized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataStore {
    exif: Partition,
    iptc: Partition,
    xmp: Partition,
    namespaces: NamespaceMap,
}

impl MetadataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XMP packet into a new store
    ///
    /// The packet wrapper is optional. Fails with
    /// [`MetaError::MalformedXmp`] if the text is not well-formed RDF/XML.
    pub fn from_xmp(text: &str) -> MetaResult<Self> {
        Self::from_xmp_with(text, &ParseOptions::default())
    }

    /// Parse an XMP packet into a new store with custom parse options
    pub fn from_xmp_with(text: &str, options: &ParseOptions) -> MetaResult<Self> {
        let packet = XmpParser::with_options(options.clone()).parse(text)?;
        Ok(Self::from_xmp_packet(packet))
    }

    /// Build a store from an already parsed packet
    ///
    /// Properties that fail validation are skipped with a warning.
    pub fn from_xmp_packet(packet: XmpPacket) -> Self {
        let mut store = Self {
            namespaces: packet.bindings,
            ..Self::default()
        };
        for (name, value) in packet.properties {
            let key = Key::Xmp(name);
            if let Err(e) = store.set(key.clone(), value) {
                warn!("Skipping XMP property {}: {}", key, e);
            }
        }
        store
    }

    /// Get a value; `None` if the key is absent
    ///
    /// An XMP key whose prefix is an alias of a namespace already in use
    /// finds the entry stored under that namespace's prefix.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.slot(key.namespace()).get(&self.canonical_key(key))
    }

    /// Check if a key is present
    pub fn contains(&self, key: &Key) -> bool {
        self.slot(key.namespace()).contains(&self.canonical_key(key))
    }

    /// Insert or replace a value
    ///
    /// The key, the value and every XMP prefix they use are validated first;
    /// on failure the store is unchanged. The XMP partition uses one prefix
    /// per namespace URI: the first one stored. A key or struct field using
    /// another prefix bound to the same URI is renamed to it, so
    /// `dc:title` and `purl:title` name one entry when both prefixes are
    /// bound to Dublin Core.
    pub fn set(&mut self, key: Key, value: impl Into<Value>) -> MetaResult<()> {
        let value = value.into();
        key.validate()?;
        value.validate()?;
        if let Key::Xmp(name) = &key {
            self.check_bound(name)?;
            self.check_value_bound(&value)?;
        }
        let (key, value) = self.canonicalize(key, value);
        self.slot_mut(key.namespace()).insert(key, value);
        Ok(())
    }

    /// Remove a value, returning it; no-op if absent
    pub fn delete(&mut self, key: &Key) -> Option<Value> {
        let key = self.canonical_key(key).into_owned();
        self.slot_mut(key.namespace()).remove(&key)
    }

    /// Check that both stores hold the same entries in one namespace
    ///
    /// Order is ignored, as are the prefixes an XMP namespace is spelled
    /// with. This is the equality of the round-trip law:
    /// `MetadataStore::from_xmp(&store.to_xmp(..)?)?` holds the same XMP
    /// entries as `store`, while `==` also compares order and bindings.
    ///
    /// ```
    /// use metakit::{Key, MetadataStore, Namespace, SerializeOptions};
    ///
    /// let mut store = MetadataStore::new();
    /// store.set(Key::xmp("xmp", "Rating"), 4i64).unwrap();
    /// store.set(Key::xmp("dc", "format"), "image/jpeg").unwrap();
    ///
    /// let text = store.to_xmp(&SerializeOptions::default()).unwrap();
    /// let reparsed = MetadataStore::from_xmp(&text).unwrap();
    /// assert!(reparsed.same_entries(&store, Namespace::Xmp));
    /// ```
    pub fn same_entries(&self, other: &MetadataStore, namespace: Namespace) -> bool {
        self.count(namespace) == other.count(namespace)
            && self
                .partition(namespace)
                .all(|(key, value)| other.get(key) == Some(value))
    }

    /// Iterate one namespace's entries in insertion order
    ///
    /// Each call starts a fresh pass over the current contents.
    pub fn partition(&self, namespace: Namespace) -> impl Iterator<Item = (&Key, &Value)> {
        self.slot(namespace).iter()
    }

    /// Number of entries in a namespace
    pub fn count(&self, namespace: Namespace) -> usize {
        self.slot(namespace).len()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        Namespace::ALL.iter().map(|ns| self.count(*ns)).sum()
    }

    /// Check if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Namespaces holding at least one entry, in `XMP`, `EXIF`, `IPTC` order
    pub fn populated_namespaces(&self) -> Vec<Namespace> {
        Namespace::ALL
            .into_iter()
            .filter(|ns| !self.slot(*ns).is_empty())
            .collect()
    }

    /// Drop every entry of a namespace
    pub fn clear_namespace(&mut self, namespace: Namespace) {
        self.slot_mut(namespace).clear();
    }

    /// Bind an XMP prefix to a namespace URI for this store
    pub fn register_namespace(&mut self, uri: &str, prefix: &str) -> MetaResult<()> {
        self.namespaces.register(uri, prefix)
    }

    /// Resolve an XMP prefix to its namespace URI
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        resolve_uri(&self.namespaces, prefix)
    }

    /// Prefix bindings registered on this store (built-ins excluded)
    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// Copy one namespace's entries from `other`
    ///
    /// With `overwrite` false, keys already present are kept. XMP prefixes
    /// from `other` are rebound to this store's prefix for the same URI; a
    /// prefix that this store binds to a different URI (with no alternative
    /// prefix available) fails the merge before anything is copied.
    pub fn merge(&mut self, other: &MetadataStore, namespace: Namespace, overwrite: bool) -> MetaResult<()> {
        let mut bindings = self.namespaces.clone();
        let mut renames: Vec<(String, String)> = Vec::new();

        if namespace == Namespace::Xmp {
            for (prefix, uri) in other.used_bindings()? {
                if resolve_uri(&bindings, &prefix) == Some(uri.as_str()) {
                    continue;
                }
                if let Some(existing) = resolve_prefix(&bindings, &uri) {
                    debug!("Merging XMP prefix '{}' as '{}'", prefix, existing);
                    renames.push((prefix, existing.to_string()));
                } else if resolve_uri(&bindings, &prefix).is_none() {
                    bindings.register(&uri, &prefix)?;
                } else {
                    return Err(MetaError::Validation(format!(
                        "XMP prefix '{}' is bound to a different namespace than '{}'",
                        prefix, uri
                    )));
                }
            }
        }

        self.namespaces = bindings;
        for (key, value) in other.partition(namespace) {
            let (key, value) = if renames.is_empty() {
                (key.clone(), value.clone())
            } else {
                (rename_key(key, &renames), rename_value(value, &renames))
            };
            let (key, value) = self.canonicalize(key, value);
            if !overwrite && self.contains(&key) {
                continue;
            }
            self.slot_mut(namespace).insert(key, value);
        }
        Ok(())
    }

    /// Resolve a path such as `dc:creator[0]` or `exif:Flash/exif:Fired`
    /// inside the XMP partition
    pub fn get_path(&self, path: &str) -> MetaResult<Option<Value>> {
        let path = parse_path(path)?;
        let key = Key::Xmp(path.property()?);
        Ok(self.get(&key).and_then(|value| path.resolve(value)))
    }

    /// The XMP partition as packet triples plus the bindings it uses
    pub fn to_xmp_packet(&self) -> MetaResult<XmpPacket> {
        let mut bindings = NamespaceMap::new();
        for (prefix, uri) in self.used_bindings()? {
            bindings.register(&uri, &prefix)?;
        }
        let properties = self
            .xmp_entries()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Ok(XmpPacket {
            bindings,
            properties,
        })
    }

    /// Serialize the XMP partition into packet text
    pub fn to_xmp(&self, options: &SerializeOptions) -> MetaResult<String> {
        XmpSerializer::with_options(options.clone()).serialize(self.xmp_entries(), &self.namespaces)
    }

    /// Flat `tag -> primitive or list` export, grouped by namespace
    pub fn to_flat_dict(&self) -> FlatDict {
        FlatDict {
            groups: Namespace::ALL
                .into_iter()
                .map(|ns| {
                    let entries = self
                        .partition(ns)
                        .map(|(key, value)| (key.tag_name(), FlatValue::from_value(value)))
                        .collect();
                    (ns, entries)
                })
                .collect(),
        }
    }

    /// Render the flat export as JSON (`indent` 0 = compact)
    #[cfg(feature = "serde")]
    pub fn to_json(&self, indent: usize) -> MetaResult<String> {
        use serde::Serialize;

        let dict = self.to_flat_dict();
        if indent == 0 {
            return serde_json::to_string(&dict)
                .map_err(|e| MetaError::Serialization(e.to_string()));
        }
        let indent = b" ".repeat(indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        dict.serialize(&mut serializer)
            .map_err(|e| MetaError::Serialization(e.to_string()))?;
        String::from_utf8(out).map_err(|e| MetaError::Serialization(e.to_string()))
    }

    fn slot(&self, namespace: Namespace) -> &Partition {
        match namespace {
            Namespace::Exif => &self.exif,
            Namespace::Iptc => &self.iptc,
            Namespace::Xmp => &self.xmp,
        }
    }

    fn slot_mut(&mut self, namespace: Namespace) -> &mut Partition {
        match namespace {
            Namespace::Exif => &mut self.exif,
            Namespace::Iptc => &mut self.iptc,
            Namespace::Xmp => &mut self.xmp,
        }
    }

    fn xmp_entries(&self) -> impl Iterator<Item = (&QualifiedName, &Value)> {
        self.xmp.iter().filter_map(|(key, value)| match key {
            Key::Xmp(name) => Some((name, value)),
            _ => None,
        })
    }

    fn canonical_key<'k>(&self, key: &'k Key) -> Cow<'k, Key> {
        let renames = self.prefix_renames(key, None);
        if renames.is_empty() {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(rename_key(key, &renames))
        }
    }

    fn canonicalize(&self, key: Key, value: Value) -> (Key, Value) {
        let renames = self.prefix_renames(&key, Some(&value));
        if renames.is_empty() {
            return (key, value);
        }
        debug!("Storing XMP property {} under prefixes {:?}", key, renames);
        (rename_key(&key, &renames), rename_value(&value, &renames))
    }

    /// `(alias, prefix)` pairs mapping every prefix of an incoming XMP entry
    /// to the prefix its URI already has in the partition
    ///
    /// A URI new to the partition keeps the first prefix the entry uses.
    fn prefix_renames(&self, key: &Key, value: Option<&Value>) -> Vec<(String, String)> {
        let Key::Xmp(name) = key else {
            return Vec::new();
        };

        let mut in_use: Vec<&str> = Vec::new();
        for (stored, stored_value) in self.xmp_entries() {
            collect_prefixes(stored, stored_value, &mut in_use);
        }
        let mut incoming: Vec<&str> = vec![name.prefix.as_str()];
        if let Some(value) = value {
            collect_prefixes(name, value, &mut incoming);
        }

        let mut chosen: Vec<(&str, String)> = Vec::new();
        let mut renames = Vec::new();
        for prefix in incoming {
            let Some(uri) = self.namespace_uri(prefix) else {
                continue;
            };
            let canonical = match chosen.iter().find(|(u, _)| *u == uri) {
                Some((_, p)) => p.clone(),
                None => {
                    let p = in_use
                        .iter()
                        .copied()
                        .find(|p| self.namespace_uri(p) == Some(uri))
                        .unwrap_or(prefix)
                        .to_string();
                    chosen.push((uri, p.clone()));
                    p
                }
            };
            if canonical != prefix {
                renames.push((prefix.to_string(), canonical));
            }
        }
        renames
    }

    fn check_bound(&self, name: &QualifiedName) -> MetaResult<()> {
        if self.namespace_uri(&name.prefix).is_none() {
            return Err(MetaError::Validation(format!(
                "Unbound XMP namespace prefix '{}' in '{}'; register the namespace first",
                name.prefix, name
            )));
        }
        Ok(())
    }

    fn check_value_bound(&self, value: &Value) -> MetaResult<()> {
        match value {
            Value::Struct(st) => {
                for (field, field_value) in st.fields() {
                    self.check_bound(field)?;
                    self.check_value_bound(field_value)?;
                }
                Ok(())
            }
            Value::OrderedList(items) | Value::UnorderedSet(items) => {
                items.iter().try_for_each(|item| self.check_value_bound(item))
            }
            Value::Scalar(_) | Value::LangAlt(_) => Ok(()),
        }
    }

    /// `(prefix, uri)` for every prefix the XMP partition uses, first-seen order
    fn used_bindings(&self) -> MetaResult<Vec<(String, String)>> {
        let mut prefixes: Vec<&str> = Vec::new();
        for (name, value) in self.xmp_entries() {
            collect_prefixes(name, value, &mut prefixes);
        }
        prefixes
            .into_iter()
            .map(|prefix| {
                let uri = self.namespace_uri(prefix).ok_or_else(|| {
                    MetaError::Validation(format!("Unbound XMP namespace prefix '{}'", prefix))
                })?;
                Ok((prefix.to_string(), uri.to_string()))
            })
            .collect()
    }
}

impl FromStr for MetadataStore {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xmp(s)
    }
}

fn collect_prefixes<'a>(name: &'a QualifiedName, value: &'a Value, out: &mut Vec<&'a str>) {
    if !out.contains(&name.prefix.as_str()) {
        out.push(&name.prefix);
    }
    match value {
        Value::Struct(st) => {
            for (field, field_value) in st.fields() {
                collect_prefixes(field, field_value, out);
            }
        }
        Value::OrderedList(items) | Value::UnorderedSet(items) => {
            for item in items {
                if let Value::Struct(st) = item {
                    for (field, field_value) in st.fields() {
                        collect_prefixes(field, field_value, out);
                    }
                }
            }
        }
        Value::Scalar(_) | Value::LangAlt(_) => {}
    }
}

fn rename(name: &QualifiedName, renames: &[(String, String)]) -> QualifiedName {
    match renames.iter().find(|(from, _)| *from == name.prefix) {
        Some((_, to)) => QualifiedName::new(to.clone(), name.local.clone()),
        None => name.clone(),
    }
}

fn rename_key(key: &Key, renames: &[(String, String)]) -> Key {
    match key {
        Key::Xmp(name) => Key::Xmp(rename(name, renames)),
        other => other.clone(),
    }
}

fn rename_value(value: &Value, renames: &[(String, String)]) -> Value {
    match value {
        Value::Struct(st) => {
            let mut renamed = XmpStruct::new();
            for (field, field_value) in st.fields() {
                renamed.set_field(rename(field, renames), rename_value(field_value, renames));
            }
            Value::Struct(renamed)
        }
        Value::OrderedList(items) => {
            Value::OrderedList(items.iter().map(|v| rename_value(v, renames)).collect())
        }
        Value::UnorderedSet(items) => {
            Value::UnorderedSet(items.iter().map(|v| rename_value(v, renames)).collect())
        }
        other => other.clone(),
    }
}
