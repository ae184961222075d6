//! Namespace bindings for XMP
//!
//! XMP properties are named `prefix:local`, where the prefix is bound to a
//! namespace URI by the packet (or by the caller). A set of well-known
//! bindings is always available; stores and packets layer their own bindings
//! on top of it.

use crate::core::error::{MetaError, MetaResult};
use crate::types::key::is_xml_name;
use std::sync::OnceLock;

static BUILTIN_NAMESPACES: OnceLock<NamespaceMap> = OnceLock::new();

/// Built-in XMP namespaces
pub mod ns {
    /// XMP Basic namespace
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// EXIF namespace
    pub const EXIF: &str = "http://ns.adobe.com/exif/1.0/";
    /// EXIF Aux namespace
    pub const EXIF_AUX: &str = "http://ns.adobe.com/exif/1.0/aux/";
    /// EXIF 2.3+ namespace (CIPA)
    pub const EXIF_EX: &str = "http://cipa.jp/exif/1.0/";
    /// TIFF namespace
    pub const TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
    /// IPTC Core namespace
    pub const IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
    /// IPTC Extension namespace
    pub const IPTC_EXT: &str = "http://iptc.org/std/Iptc4xmpExt/2008-02-29/";
    /// Photoshop namespace
    pub const PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
    /// Camera Raw namespace
    pub const CAMERA_RAW: &str = "http://ns.adobe.com/camera-raw-settings/1.0/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// XMP Media Management namespace
    pub const XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
    /// XMP Dynamic Media namespace
    pub const XMP_DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Adobe meta wrapper namespace (`x:xmpmeta`)
    pub const X: &str = "adobe:ns:meta/";

    /// XMP prefix
    pub const XMP_PREFIX: &str = "xmp";
    /// Dublin Core prefix
    pub const DC_PREFIX: &str = "dc";
    /// EXIF prefix
    pub const EXIF_PREFIX: &str = "exif";
    /// EXIF Aux prefix
    pub const EXIF_AUX_PREFIX: &str = "aux";
    /// EXIF 2.3+ prefix
    pub const EXIF_EX_PREFIX: &str = "exifEX";
    /// TIFF prefix
    pub const TIFF_PREFIX: &str = "tiff";
    /// IPTC Core prefix
    pub const IPTC_CORE_PREFIX: &str = "Iptc4xmpCore";
    /// IPTC Extension prefix
    pub const IPTC_EXT_PREFIX: &str = "Iptc4xmpExt";
    /// Photoshop prefix
    pub const PHOTOSHOP_PREFIX: &str = "photoshop";
    /// Camera Raw prefix
    pub const CAMERA_RAW_PREFIX: &str = "crs";
    /// XMP Rights prefix
    pub const XMP_RIGHTS_PREFIX: &str = "xmpRights";
    /// XMP Media Management prefix
    pub const XMP_MM_PREFIX: &str = "xmpMM";
    /// XMP Dynamic Media prefix
    pub const XMP_DM_PREFIX: &str = "xmpDM";
    /// RDF prefix
    pub const RDF_PREFIX: &str = "rdf";
    /// XML prefix
    pub const XML_PREFIX: &str = "xml";
    /// Adobe meta wrapper prefix
    pub const X_PREFIX: &str = "x";
}

const BUILTIN_TABLE: &[(&str, &str)] = &[
    (ns::XMP_PREFIX, ns::XMP),
    (ns::DC_PREFIX, ns::DC),
    (ns::EXIF_PREFIX, ns::EXIF),
    (ns::EXIF_AUX_PREFIX, ns::EXIF_AUX),
    (ns::EXIF_EX_PREFIX, ns::EXIF_EX),
    (ns::TIFF_PREFIX, ns::TIFF),
    (ns::IPTC_CORE_PREFIX, ns::IPTC_CORE),
    (ns::IPTC_EXT_PREFIX, ns::IPTC_EXT),
    (ns::PHOTOSHOP_PREFIX, ns::PHOTOSHOP),
    (ns::CAMERA_RAW_PREFIX, ns::CAMERA_RAW),
    (ns::XMP_RIGHTS_PREFIX, ns::XMP_RIGHTS),
    (ns::XMP_MM_PREFIX, ns::XMP_MM),
    (ns::XMP_DM_PREFIX, ns::XMP_DM),
    (ns::RDF_PREFIX, ns::RDF),
    (ns::XML_PREFIX, ns::XML),
];

/// Ordered prefix/URI bindings
///
/// A prefix maps to exactly one URI. A URI may be reachable through several
/// prefixes; the first one bound is its canonical prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    bindings: Vec<(String, String)>,
}

impl NamespaceMap {
    /// Create an empty namespace map
    pub fn new() -> Self {
        Self::default()
    }

    /// The well-known bindings (`dc`, `xmp`, `exif`, `tiff`, `photoshop`, ...)
    pub fn builtin() -> &'static NamespaceMap {
        BUILTIN_NAMESPACES.get_or_init(|| NamespaceMap {
            bindings: BUILTIN_TABLE
                .iter()
                .map(|(p, u)| (p.to_string(), u.to_string()))
                .collect(),
        })
    }

    /// Bind a prefix to a namespace URI
    ///
    /// Returns an error if the prefix is already bound to a different URI
    /// or if either half is malformed. Re-binding the same pair is a no-op.
    pub fn register(&mut self, uri: &str, prefix: &str) -> MetaResult<()> {
        if uri.is_empty() {
            return Err(MetaError::BadParam("URI cannot be empty".to_string()));
        }
        if !is_xml_name(prefix) {
            return Err(MetaError::BadParam(format!(
                "Invalid namespace prefix '{}'",
                prefix
            )));
        }
        if let Some(existing_uri) = self.get_uri(prefix) {
            if existing_uri != uri {
                return Err(MetaError::BadParam(format!(
                    "Prefix '{}' is already bound to '{}'",
                    prefix, existing_uri
                )));
            }
            return Ok(());
        }
        self.bindings.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    /// Get the canonical prefix for a namespace URI
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    /// Check if a namespace prefix is bound
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.get_uri(prefix).is_some()
    }

    /// Iterate `(prefix, uri)` bindings in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the map has no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Resolve a prefix against local bindings, then the built-in ones
pub fn resolve_uri<'a>(local: &'a NamespaceMap, prefix: &str) -> Option<&'a str> {
    local
        .get_uri(prefix)
        .or_else(|| NamespaceMap::builtin().get_uri(prefix))
}

/// Resolve the canonical prefix of a URI against local bindings, then the built-in ones
pub fn resolve_prefix<'a>(local: &'a NamespaceMap, uri: &str) -> Option<&'a str> {
    local.get_prefix(uri).or_else(|| {
        NamespaceMap::builtin()
            .get_prefix(uri)
            .filter(|p| !local.has_prefix(p))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin() {
        let map = NamespaceMap::builtin();
        assert_eq!(map.get_uri("dc"), Some(ns::DC));
        assert_eq!(map.get_prefix(ns::PHOTOSHOP), Some("photoshop"));
        assert!(map.has_prefix("Iptc4xmpCore"));
        assert!(!map.has_prefix("foo"));
    }

    #[test]
    fn test_register() {
        let mut map = NamespaceMap::new();
        assert!(map.register("http://example.com/ns", "ex").is_ok());
        assert_eq!(map.get_prefix("http://example.com/ns"), Some("ex"));
        assert_eq!(map.get_uri("ex"), Some("http://example.com/ns"));
    }

    #[test]
    fn test_duplicate_prefix() {
        let mut map = NamespaceMap::new();
        assert!(map.register("http://example.com/ns1", "ex").is_ok());
        assert!(map.register("http://example.com/ns2", "ex").is_err());
        assert!(map.register("http://example.com/ns1", "ex").is_ok());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_alias_keeps_first_prefix() {
        let mut map = NamespaceMap::new();
        map.register(ns::DC, "dcx").unwrap();
        map.register(ns::DC, "dc").unwrap();
        assert_eq!(map.get_prefix(ns::DC), Some("dcx"));
        assert_eq!(map.get_uri("dc"), Some(ns::DC));
    }

    #[test]
    fn test_register_invalid() {
        let mut map = NamespaceMap::new();
        assert!(map.register("", "ex").is_err());
        assert!(map.register("http://example.com/", "1ex").is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_builtin() {
        let mut local = NamespaceMap::new();
        local.register("http://example.com/tiff", "tiff").unwrap();
        assert_eq!(resolve_uri(&local, "tiff"), Some("http://example.com/tiff"));
        assert_eq!(resolve_uri(&local, "dc"), Some(ns::DC));
        assert_eq!(resolve_prefix(&local, ns::XMP), Some("xmp"));
        assert_eq!(resolve_prefix(&local, ns::TIFF), None);
        assert_eq!(resolve_uri(&local, "nope"), None);
    }
}
