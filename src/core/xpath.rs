//! Path expressions into XMP values
//!
//! Paths address a value inside an XMP property:
//! - `xmp:CreatorTool` - the property itself
//! - `dc:creator[0]` - list or set item (0-based)
//! - `dc:title[en-US]` - language alternative entry
//! - `exif:Flash/exif:Fired` - struct field (a bare `Fired` matches any prefix)
//! - `Iptc4xmpExt:LocationShown[0]/Iptc4xmpExt:City` - nested path

use crate::core::error::{MetaError, MetaResult};
use crate::types::key::QualifiedName;
use crate::types::value::Value;
use std::fmt;

/// A component of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// A property or struct field name (`prefix:local` or bare `local`)
    Name(String),
    /// A list or set index (0-based)
    Index(usize),
    /// A language alternative selector
    Lang(String),
}

/// Parsed path components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponents {
    /// Components in path order, the property name first
    pub components: Vec<PathComponent>,
}

impl PathComponents {
    /// The property the path starts from
    pub fn property(&self) -> MetaResult<QualifiedName> {
        match self.components.first() {
            Some(PathComponent::Name(name)) => name.parse(),
            _ => Err(MetaError::BadParam(
                "Path must start with a property name".to_string(),
            )),
        }
    }

    /// Components after the property name
    pub fn rest(&self) -> &[PathComponent] {
        self.components.get(1..).unwrap_or_default()
    }

    /// Walk the remaining components through `value`
    ///
    /// A language selector yields the matching entry as a text value.
    pub fn resolve(&self, value: &Value) -> Option<Value> {
        resolve_in(value, self.rest())
    }
}

impl fmt::Display for PathComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_path(self))
    }
}

/// Parse a path expression
pub fn parse_path(path: &str) -> MetaResult<PathComponents> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for ch in path.chars() {
        match ch {
            '[' if !in_brackets => {
                if !current.is_empty() {
                    components.push(PathComponent::Name(std::mem::take(&mut current)));
                }
                in_brackets = true;
            }
            ']' if in_brackets => {
                let selector = std::mem::take(&mut current);
                if selector.is_empty() {
                    return Err(MetaError::BadParam("Empty selector '[]'".to_string()));
                }
                components.push(if selector.bytes().all(|b| b.is_ascii_digit()) {
                    PathComponent::Index(selector.parse().map_err(|_| {
                        MetaError::BadParam(format!("Invalid index: {}", selector))
                    })?)
                } else {
                    PathComponent::Lang(selector)
                });
                in_brackets = false;
            }
            '[' | ']' => {
                return Err(MetaError::BadParam(format!("Unexpected '{}' in path", ch)));
            }
            '/' if !in_brackets => {
                if !current.is_empty() {
                    components.push(PathComponent::Name(std::mem::take(&mut current)));
                }
            }
            _ => current.push(ch),
        }
    }

    if in_brackets {
        return Err(MetaError::BadParam("Unclosed bracket".to_string()));
    }
    if !current.is_empty() {
        components.push(PathComponent::Name(current));
    }
    if components.is_empty() {
        return Err(MetaError::BadParam("Empty path".to_string()));
    }

    Ok(PathComponents { components })
}

/// Build a path from components
pub fn build_path(components: &PathComponents) -> String {
    let mut result = String::new();
    for (i, comp) in components.components.iter().enumerate() {
        match comp {
            PathComponent::Name(name) => {
                if i > 0 {
                    result.push('/');
                }
                result.push_str(name);
            }
            PathComponent::Index(idx) => {
                result.push('[');
                result.push_str(&idx.to_string());
                result.push(']');
            }
            PathComponent::Lang(lang) => {
                result.push('[');
                result.push_str(lang);
                result.push(']');
            }
        }
    }
    result
}

fn resolve_in(value: &Value, rest: &[PathComponent]) -> Option<Value> {
    let Some((head, tail)) = rest.split_first() else {
        return Some(value.clone());
    };
    match (head, value) {
        (PathComponent::Index(i), Value::OrderedList(items) | Value::UnorderedSet(items)) => {
            resolve_in(items.get(*i)?, tail)
        }
        (PathComponent::Name(name), Value::Struct(st)) => {
            let field = match name.parse::<QualifiedName>() {
                Ok(qualified) => st.get_field(&qualified),
                Err(_) => st.get_local(name),
            }?;
            resolve_in(field, tail)
        }
        (PathComponent::Lang(lang), Value::LangAlt(alt)) if tail.is_empty() => {
            alt.get(lang).map(Value::text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::value::XmpStruct;

    #[test]
    fn test_parse_simple_path() {
        let path = parse_path("xmp:CreatorTool").unwrap();
        assert_eq!(path.components.len(), 1);
        assert_eq!(
            path.property().unwrap(),
            QualifiedName::new("xmp", "CreatorTool")
        );
    }

    #[test]
    fn test_parse_selectors() {
        let path = parse_path("dc:creator[1]").unwrap();
        assert_eq!(path.components[1], PathComponent::Index(1));

        let path = parse_path("dc:title[en-US]").unwrap();
        assert_eq!(path.components[1], PathComponent::Lang("en-US".to_string()));
    }

    #[test]
    fn test_parse_nested_path() {
        let path = parse_path("exif:Flash/Fired").unwrap();
        assert_eq!(path.components.len(), 2);
        assert_eq!(path.components[1], PathComponent::Name("Fired".to_string()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_path("").is_err());
        assert!(parse_path("dc:creator[1").is_err());
        assert!(parse_path("dc:creator]").is_err());
        assert!(parse_path("dc:creator[]").is_err());
        assert!(parse_path("[0]").unwrap().property().is_err());
    }

    #[test]
    fn test_build_path() {
        let path = "Iptc4xmpExt:LocationShown[0]/Iptc4xmpExt:City";
        assert_eq!(build_path(&parse_path(path).unwrap()), path);
    }

    #[test]
    fn test_resolve() {
        let location = XmpStruct::new().with_field(QualifiedName::new("ext", "City"), "Paris");
        let value = Value::OrderedList(vec![Value::Struct(location)]);
        let path = parse_path("ext:LocationShown[0]/ext:City").unwrap();
        assert_eq!(path.resolve(&value), Some(Value::text("Paris")));

        let bare = parse_path("ext:LocationShown[0]/City").unwrap();
        assert_eq!(bare.resolve(&value), Some(Value::text("Paris")));

        let missing = parse_path("ext:LocationShown[3]").unwrap();
        assert_eq!(missing.resolve(&value), None);
    }

    #[test]
    fn test_resolve_lang() {
        let value = Value::lang_alt("Pears").as_lang_alt().cloned().unwrap();
        let value = Value::LangAlt(value.with_language("fr", "Poires"));
        let path = parse_path("dc:title[FR]").unwrap();
        assert_eq!(path.resolve(&value), Some(Value::text("Poires")));
        assert_eq!(parse_path("dc:title[de]").unwrap().resolve(&value), None);
    }
}
