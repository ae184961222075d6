//! IPTC adapter
//!
//! IPTC is flat, with some datasets natively repeatable. Repeatable tags
//! always map to unordered sets, even when a single value is present.

use super::{scalar_from_raw, scalars_from_raw, IngestAdapter, Mapped, RawValue};
use crate::types::key::Namespace;
use crate::types::value::{Scalar, Value};
use crate::utils::datetime::MetaDateTime;
use log::debug;

/// IPTC datasets that may occur more than once
pub const REPEATABLE_TAGS: &[&str] = &[
    "Keywords",
    "SupplementalCategory",
    "Byline",
    "BylineTitle",
    "Contact",
    "SubjectReference",
    "ContentLocationCode",
    "ContentLocationName",
    "ObjectAttributeReference",
    "ReferenceService",
    "ReferenceDate",
    "ReferenceNumber",
];

/// IPTC datasets holding a `CCYYMMDD` date
pub const DATE_TAGS: &[&str] = &[
    "DateCreated",
    "DigitalCreationDate",
    "ReleaseDate",
    "ExpirationDate",
];

/// Adapter for the IPTC property tree
#[derive(Debug, Clone)]
pub struct IptcAdapter {
    repeatable: Vec<String>,
}

impl Default for IptcAdapter {
    fn default() -> Self {
        Self {
            repeatable: REPEATABLE_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl IptcAdapter {
    /// Create an adapter with the standard repeatable datasets
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat an extra tag as repeatable
    pub fn with_repeatable(mut self, tag: impl Into<String>) -> Self {
        self.repeatable.push(tag.into());
        self
    }

    /// Check whether a tag is repeatable
    pub fn is_repeatable(&self, tag: &str) -> bool {
        self.repeatable.iter().any(|t| t == tag)
    }
}

impl IngestAdapter for IptcAdapter {
    fn namespace(&self) -> Namespace {
        Namespace::Iptc
    }

    fn map_tag(&self, tag: &str, raw: &RawValue) -> Mapped {
        let items = match raw {
            RawValue::Array(items) => Some(items.as_slice()),
            _ => None,
        };

        if self.is_repeatable(tag) {
            let items = items.unwrap_or(std::slice::from_ref(raw));
            return match scalars_from_raw(items) {
                Ok(values) => Mapped::Value(Value::UnorderedSet(values)),
                Err(reason) => Mapped::Dropped(reason),
            };
        }

        if let Some(items) = items {
            debug!("IPTC tag {} is not repeatable but holds {} values", tag, items.len());
            return match scalars_from_raw(items) {
                Ok(values) => Mapped::Value(Value::UnorderedSet(values)),
                Err(reason) => Mapped::Dropped(reason),
            };
        }

        if DATE_TAGS.contains(&tag) {
            if let RawValue::Text(text) = raw {
                return match MetaDateTime::parse_iptc(text) {
                    Ok(dt) => Mapped::Value(Value::Scalar(Scalar::Date(dt))),
                    Err(e) => Mapped::KeptRaw(Value::text(text.clone()), e.to_string()),
                };
            }
        }

        match scalar_from_raw(raw) {
            Ok(scalar) => Mapped::Value(Value::Scalar(scalar)),
            Err(reason) => Mapped::Dropped(reason),
        }
    }
}
