//! ISO 6709 location strings
//!
//! Video containers store capture location as a compact ISO 6709 string such
//! as `+27.5916+086.5640+8850CRSWGS_84/`: signed latitude, signed longitude,
//! an optional signed height, an optional coordinate reference system (only
//! allowed after a height) and an optional trailing `/`.

use crate::core::error::{MetaError, MetaResult};

/// A parsed ISO 6709 point
#[derive(Debug, Clone, PartialEq)]
pub struct Iso6709 {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Height in metres
    pub height: Option<f64>,
    /// Coordinate reference system identifier (e.g. `WGS_84`)
    pub crs: Option<String>,
}

impl Iso6709 {
    /// Parse an ISO 6709 string
    pub fn parse(s: &str) -> MetaResult<Self> {
        let invalid = || MetaError::BadParam(format!("Invalid ISO 6709 location string: {}", s));

        let mut rest = s;
        let latitude = take_signed_number(&mut rest).ok_or_else(invalid)?;
        let longitude = take_signed_number(&mut rest).ok_or_else(invalid)?;
        let height = take_signed_number(&mut rest);

        let crs = match rest.strip_prefix("CRS") {
            Some(tail) => {
                if height.is_none() {
                    return Err(MetaError::BadParam(format!(
                        "CRS cannot be present without height: {}",
                        s
                    )));
                }
                let crs = tail.strip_suffix('/').unwrap_or(tail);
                rest = "";
                (!crs.is_empty()).then(|| crs.to_string())
            }
            None => None,
        };

        if !(rest.is_empty() || rest == "/") {
            return Err(invalid());
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid());
        }

        Ok(Self {
            latitude,
            longitude,
            height,
            crs,
        })
    }
}

/// Consume `[+-]digits[.digits]` from the front of `rest`
fn take_signed_number(rest: &mut &str) -> Option<f64> {
    let bytes = rest.as_bytes();
    if !matches!(bytes.first(), Some(b'+' | b'-')) {
        return None;
    }
    let mut end = 1;
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == int_start {
        return None;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            end = frac_end;
        }
    }
    let value = rest[..end].parse().ok()?;
    *rest = &rest[end..];
    Some(value)
}
