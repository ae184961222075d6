//! GPS coordinates
//!
//! Derives signed decimal coordinates from the EXIF GPS property tree
//! (`Latitude` + `LatitudeRef`, `Longitude` + `LongitudeRef`) or from an
//! ISO 6709 location string as found in video containers.

use super::{RawTree, RawValue};
use crate::core::error::{MetaError, MetaResult};
use crate::utils::iso6709::Iso6709;

/// A signed decimal latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinate {
    /// Latitude in degrees, negative south of the equator
    pub latitude: f64,
    /// Longitude in degrees, negative west of Greenwich
    pub longitude: f64,
    /// Altitude in metres, negative below sea level
    pub altitude: Option<f64>,
}

impl GpsCoordinate {
    /// Read coordinates from an EXIF GPS tree
    ///
    /// Fails with [`MetaError::BadParam`] if latitude or longitude is missing
    /// or not numeric.
    pub fn from_gps_tree(tree: &RawTree) -> MetaResult<Self> {
        let latitude = degrees(tree.get("Latitude"));
        let longitude = degrees(tree.get("Longitude"));
        let (Some(mut latitude), Some(mut longitude)) = (latitude, longitude) else {
            return Err(MetaError::BadParam(
                "Could not extract latitude and/or longitude from GPS data".to_string(),
            ));
        };

        if reference(tree, "LatitudeRef").is_some_and(|r| r.eq_ignore_ascii_case("S")) {
            latitude = -latitude.abs();
        }
        if reference(tree, "LongitudeRef").is_some_and(|r| r.eq_ignore_ascii_case("W")) {
            longitude = -longitude.abs();
        }

        let altitude = tree.get("Altitude").and_then(RawValue::as_f64).map(|alt| {
            let below = tree
                .get("AltitudeRef")
                .and_then(RawValue::as_f64)
                .is_some_and(|r| r == 1.0);
            if below {
                -alt.abs()
            } else {
                alt
            }
        });

        Ok(Self {
            latitude,
            longitude,
            altitude,
        })
    }

    /// Read coordinates from an ISO 6709 string
    pub fn from_iso6709(s: &str) -> MetaResult<Self> {
        Iso6709::parse(s).map(Self::from)
    }
}

impl From<Iso6709> for GpsCoordinate {
    fn from(point: Iso6709) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            altitude: point.height,
        }
    }
}

/// Decimal degrees from a number or a `[degrees, minutes, seconds]` array
fn degrees(raw: Option<&RawValue>) -> Option<f64> {
    match raw? {
        RawValue::Array(parts) => {
            let mut total = 0.0;
            for (part, scale) in parts.iter().zip([1.0, 60.0, 3600.0]) {
                total += part.as_f64()? / scale;
            }
            (!parts.is_empty()).then_some(total)
        }
        other => other.as_f64(),
    }
}

fn reference<'a>(tree: &'a RawTree, tag: &str) -> Option<&'a str> {
    tree.get(tag).and_then(RawValue::as_str).map(str::trim)
}
