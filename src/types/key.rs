//! Namespace-qualified keys
//!
//! Every entry in a [`MetadataStore`](crate::MetadataStore) is addressed by a
//! [`Key`]: a closed [`Namespace`] plus a tag. EXIF and IPTC tags are bare
//! names (`LensMake`, `Keywords`); XMP tags are [`QualifiedName`]s
//! (`dc:description`).

use crate::core::error::{MetaError, MetaResult};
use std::fmt;
use std::str::FromStr;

/// The three metadata partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// XMP (RDF/XML packet)
    Xmp,
    /// EXIF (camera/capture tags)
    Exif,
    /// IPTC (descriptive/editorial tags)
    Iptc,
}

impl Namespace {
    /// All namespaces, in export order
    pub const ALL: [Namespace; 3] = [Namespace::Xmp, Namespace::Exif, Namespace::Iptc];

    /// Canonical upper-case name (`"XMP"`, `"EXIF"`, `"IPTC"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Xmp => "XMP",
            Namespace::Exif => "EXIF",
            Namespace::Iptc => "IPTC",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = MetaError;

    fn from_str(s: &str) -> MetaResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "XMP" => Ok(Namespace::Xmp),
            "EXIF" => Ok(Namespace::Exif),
            "IPTC" => Ok(Namespace::Iptc),
            _ => Err(MetaError::BadParam(format!("Unknown namespace '{}'", s))),
        }
    }
}

/// An XMP property name: namespace prefix plus local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Namespace prefix (e.g. `dc`)
    pub prefix: String,
    /// Local name (e.g. `description`)
    pub local: String,
}

impl QualifiedName {
    /// Create a new qualified name
    pub fn new(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// Check that both halves are valid XML names
    pub fn validate(&self) -> MetaResult<()> {
        if !is_xml_name(&self.prefix) {
            return Err(MetaError::Validation(format!(
                "Invalid namespace prefix '{}'",
                self.prefix
            )));
        }
        if !is_xml_name(&self.local) {
            return Err(MetaError::Validation(format!(
                "Invalid local name '{}' in '{}'",
                self.local, self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

impl FromStr for QualifiedName {
    type Err = MetaError;

    fn from_str(s: &str) -> MetaResult<Self> {
        let Some((prefix, local)) = s.split_once(':') else {
            return Err(MetaError::BadParam(format!(
                "Expected 'prefix:name', got '{}'",
                s
            )));
        };
        if prefix.is_empty() || local.is_empty() {
            return Err(MetaError::BadParam(format!(
                "Expected 'prefix:name', got '{}'",
                s
            )));
        }
        Ok(Self::new(prefix, local))
    }
}

/// A namespace-qualified metadata key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Bare EXIF tag
    Exif(String),
    /// Bare IPTC tag
    Iptc(String),
    /// XMP property
    Xmp(QualifiedName),
}

impl Key {
    /// EXIF key
    pub fn exif(tag: impl Into<String>) -> Self {
        Key::Exif(tag.into())
    }

    /// IPTC key
    pub fn iptc(tag: impl Into<String>) -> Self {
        Key::Iptc(tag.into())
    }

    /// XMP key
    pub fn xmp(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Key::Xmp(QualifiedName::new(prefix, local))
    }

    /// Namespace this key belongs to
    pub fn namespace(&self) -> Namespace {
        match self {
            Key::Exif(_) => Namespace::Exif,
            Key::Iptc(_) => Namespace::Iptc,
            Key::Xmp(_) => Namespace::Xmp,
        }
    }

    /// Tag as used in the flat dictionary export (`LensMake`, `dc:subject`)
    pub fn tag_name(&self) -> String {
        match self {
            Key::Exif(tag) | Key::Iptc(tag) => tag.clone(),
            Key::Xmp(name) => name.to_string(),
        }
    }

    /// Parse `NAMESPACE:tag`, e.g. `XMP:dc:subject` or `EXIF:LensMake`
    pub fn parse(s: &str) -> MetaResult<Self> {
        let Some((ns, tag)) = s.split_once(':') else {
            return Err(MetaError::BadParam(format!(
                "Expected 'NAMESPACE:tag', got '{}'",
                s
            )));
        };
        Self::from_parts(ns.parse()?, tag)
    }

    /// Build a key from a namespace and its textual tag
    pub fn from_parts(namespace: Namespace, tag: &str) -> MetaResult<Self> {
        if tag.is_empty() {
            return Err(MetaError::BadParam("Tag cannot be empty".to_string()));
        }
        Ok(match namespace {
            Namespace::Exif => Key::Exif(tag.to_string()),
            Namespace::Iptc => Key::Iptc(tag.to_string()),
            Namespace::Xmp => Key::Xmp(tag.parse()?),
        })
    }

    /// Check the key is well-formed for storage
    pub fn validate(&self) -> MetaResult<()> {
        match self {
            Key::Exif(tag) | Key::Iptc(tag) => {
                if tag.is_empty() || tag.chars().any(|c| c.is_control()) {
                    return Err(MetaError::Validation(format!(
                        "Invalid {} tag '{}'",
                        self.namespace(),
                        tag
                    )));
                }
                Ok(())
            }
            Key::Xmp(name) => name.validate(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace(), self.tag_name())
    }
}

impl FromStr for Key {
    type Err = MetaError;

    fn from_str(s: &str) -> MetaResult<Self> {
        Key::parse(s)
    }
}

/// Check whether `s` is an XML NCName (no colon)
///
/// Uses the `NameStartChar` and `NameChar` classes of XML 1.0 (fifth edition).
pub fn is_xml_name(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start_char(first) && chars.all(is_name_char)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_from_str() {
        assert_eq!("xmp".parse::<Namespace>().unwrap(), Namespace::Xmp);
        assert_eq!("EXIF".parse::<Namespace>().unwrap(), Namespace::Exif);
        assert_eq!("Iptc".parse::<Namespace>().unwrap(), Namespace::Iptc);
        assert!("TIFF".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_qualified_name_parse() {
        let name: QualifiedName = "dc:description".parse().unwrap();
        assert_eq!(name.prefix, "dc");
        assert_eq!(name.local, "description");
        assert_eq!(name.to_string(), "dc:description");
        assert!("description".parse::<QualifiedName>().is_err());
        assert!(":description".parse::<QualifiedName>().is_err());
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(
            Key::parse("XMP:dc:subject").unwrap(),
            Key::xmp("dc", "subject")
        );
        assert_eq!(Key::parse("EXIF:LensMake").unwrap(), Key::exif("LensMake"));
        assert_eq!(Key::parse("iptc:Keywords").unwrap(), Key::iptc("Keywords"));
        assert!(Key::parse("XMP:subject").is_err());
        assert!(Key::parse("LensMake").is_err());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::xmp("dc", "title").to_string(), "XMP:dc:title");
        assert_eq!(Key::exif("FNumber").to_string(), "EXIF:FNumber");
        assert_eq!(Key::xmp("dc", "title").tag_name(), "dc:title");
    }

    #[test]
    fn test_key_validate() {
        assert!(Key::xmp("dc", "title").validate().is_ok());
        assert!(Key::xmp("1dc", "title").validate().is_err());
        assert!(Key::xmp("dc", "ti tle").validate().is_err());
        assert!(Key::exif("").validate().is_err());
        assert!(Key::iptc("Keywords").validate().is_ok());
    }

    #[test]
    fn test_is_xml_name() {
        assert!(is_xml_name("Iptc4xmpCore"));
        assert!(is_xml_name("_x"));
        assert!(is_xml_name("exif-ex.v2"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("-x"));
        assert!(!is_xml_name("a:b"));
        assert!(!is_xml_name("1a"));
        assert!(!is_xml_name("a b"));
    }

    #[test]
    fn test_is_xml_name_unicode_classes() {
        // combining acute accent after a base letter
        assert!(is_xml_name("Cafe\u{301}"));
        assert!(is_xml_name("\u{D1}ame"));
        assert!(is_xml_name("\u{65E5}\u{4ED8}"));
        assert!(is_xml_name("a\u{203F}b"));
        assert!(!is_xml_name("\u{301}a"));
        assert!(!is_xml_name("\u{B7}a"));
        assert!(!is_xml_name("a\u{D7}b"));
    }
}
