//! EXIF adapter
//!
//! EXIF is flat and typed per tag. Rationals become reals, multi-value tags
//! (lens specification, bits per sample, ...) become ordered lists, and date
//! tags are normalized from EXIF's `YYYY:MM:DD HH:MM:SS` form.

use super::{scalar_from_raw, scalars_from_raw, IngestAdapter, Mapped, RawValue};
use crate::types::key::Namespace;
use crate::types::value::{Scalar, Value};
use crate::utils::datetime::MetaDateTime;

/// EXIF tags holding a date or date/time
pub const DATE_TAGS: &[&str] = &[
    "DateTime",
    "DateTimeOriginal",
    "DateTimeDigitized",
    "GPSDateStamp",
];

/// Adapter for the EXIF property tree
#[derive(Debug, Clone)]
pub struct ExifAdapter {
    date_tags: Vec<String>,
}

impl Default for ExifAdapter {
    fn default() -> Self {
        Self {
            date_tags: DATE_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ExifAdapter {
    /// Create an adapter with the standard date tags
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat an extra tag as a date
    pub fn with_date_tag(mut self, tag: impl Into<String>) -> Self {
        self.date_tags.push(tag.into());
        self
    }

    fn is_date_tag(&self, tag: &str) -> bool {
        self.date_tags.iter().any(|t| t == tag)
    }

    fn map_date(&self, raw: &RawValue) -> Mapped {
        let Some(text) = raw.as_str() else {
            return match scalar_from_raw(raw) {
                Ok(scalar) => Mapped::KeptRaw(
                    Value::Scalar(scalar),
                    "date tag holds a non-text value".to_string(),
                ),
                Err(reason) => Mapped::Dropped(reason),
            };
        };
        match MetaDateTime::parse_exif(text) {
            Ok(dt) => Mapped::Value(Value::Scalar(Scalar::Date(dt))),
            Err(e) => Mapped::KeptRaw(Value::text(text), e.to_string()),
        }
    }
}

impl IngestAdapter for ExifAdapter {
    fn namespace(&self) -> Namespace {
        Namespace::Exif
    }

    fn map_tag(&self, tag: &str, raw: &RawValue) -> Mapped {
        if self.is_date_tag(tag) {
            return self.map_date(raw);
        }
        match raw {
            RawValue::Array(items) => match scalars_from_raw(items) {
                Ok(items) => Mapped::Value(Value::OrderedList(items)),
                Err(reason) => Mapped::Dropped(reason),
            },
            other => match scalar_from_raw(other) {
                Ok(scalar) => Mapped::Value(Value::Scalar(scalar)),
                Err(reason) => Mapped::Dropped(reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{RawTree, SkipKind};
    use crate::types::key::Key;

    #[test]
    fn test_coercion() {
        let tree = RawTree::new()
            .with("FNumber", RawValue::rational(28, 10))
            .with(
                "LensSpecification",
                vec![
                    RawValue::rational(24, 1),
                    RawValue::rational(70, 1),
                    RawValue::rational(28, 10),
                    RawValue::rational(28, 10),
                ],
            )
            .with("ISOSpeedRatings", vec![100i64])
            .with("LensMake", "Apple");
        let report = ExifAdapter::new().ingest(&tree);
        assert!(report.diagnostics.is_empty());

        let get = |tag: &str| {
            report
                .entries
                .iter()
                .find(|(k, _)| *k == Key::exif(tag))
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("FNumber"), Some(Value::from(2.8)));
        assert_eq!(
            get("LensSpecification"),
            Some(Value::ordered([24.0, 70.0, 2.8, 2.8]))
        );
        assert_eq!(get("ISOSpeedRatings"), Some(Value::ordered([100i64])));
        assert_eq!(get("LensMake"), Some(Value::text("Apple")));
    }

    #[test]
    fn test_date_normalized() {
        let tree = RawTree::new().with("DateTimeOriginal", "2019:07:04 16:24:35");
        let report = ExifAdapter::new().ingest(&tree);
        assert_eq!(report.entries[0].1.to_string(), "2019-07-04T16:24:35");
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_date_kept_raw() {
        let tree = RawTree::new()
            .with("Make", "Canon")
            .with("DateTimeOriginal", "not-a-date")
            .with("Model", "R5");
        let report = ExifAdapter::new().ingest(&tree);

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[1].1, Value::text("not-a-date"));
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].tag, "DateTimeOriginal");
        assert_eq!(report.diagnostics[0].kind, SkipKind::KeptRaw);
    }

    #[test]
    fn test_bad_rational_dropped() {
        let tree = RawTree::new()
            .with("ExposureTime", RawValue::rational(1, 0))
            .with("Make", "Canon");
        let report = ExifAdapter::new().ingest(&tree);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.diagnostics[0].kind, SkipKind::Dropped);
    }

    #[test]
    fn test_custom_date_tag() {
        let adapter = ExifAdapter::new().with_date_tag("OffsetDate");
        let mapped = adapter.map_tag("OffsetDate", &RawValue::from("2020:01:02"));
        assert_eq!(mapped, Mapped::Value(Value::date("2020-01-02").unwrap()));
    }
}
