//! Language alternatives
//!
//! XMP localizes text with an `rdf:Alt` whose items carry `xml:lang`. The
//! item tagged `x-default` is the default text every reader falls back to.

use crate::core::error::{MetaError, MetaResult};
use std::fmt;

/// The language tag of the default alternative
pub const X_DEFAULT: &str = "x-default";

/// Localized text: language tag to text, with a designated default
///
/// The first alternative is always tagged `x-default`. Construction from
/// entries that lack one inserts an `x-default` copy of the first entry, so
/// the default survives serialization and parsing unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangAlt {
    alternatives: Vec<(String, String)>,
}

impl LangAlt {
    /// Create a language alternative holding only a default text
    pub fn new(default_text: impl Into<String>) -> Self {
        Self {
            alternatives: vec![(X_DEFAULT.to_string(), default_text.into())],
        }
    }

    /// Build from `(language, text)` entries
    ///
    /// The `x-default` entry (or, absent that, the first entry) becomes the
    /// default. Later duplicates of a language replace earlier ones.
    pub fn from_entries<I, L, T>(entries: I) -> MetaResult<Self>
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        let mut collected: Vec<(String, String)> = Vec::new();
        for (lang, text) in entries {
            let lang = lang.into();
            let text = text.into();
            match collected
                .iter_mut()
                .find(|(l, _)| l.eq_ignore_ascii_case(&lang))
            {
                Some(slot) => slot.1 = text,
                None => collected.push((lang, text)),
            }
        }

        if collected.is_empty() {
            return Err(MetaError::Validation(
                "Language alternative needs at least one entry".to_string(),
            ));
        }

        let default_pos = collected
            .iter()
            .position(|(l, _)| l.eq_ignore_ascii_case(X_DEFAULT));
        match default_pos {
            Some(pos) => {
                let (_, text) = collected.remove(pos);
                collected.insert(0, (X_DEFAULT.to_string(), text));
            }
            None => {
                let text = collected[0].1.clone();
                collected.insert(0, (X_DEFAULT.to_string(), text));
            }
        }

        Ok(Self {
            alternatives: collected,
        })
    }

    /// Add or replace an alternative (builder form)
    pub fn with_language(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.set(lang, text);
        self
    }

    /// Add or replace an alternative
    ///
    /// Setting `x-default` replaces the default text.
    pub fn set(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        let lang = lang.into();
        let text = text.into();
        match self
            .alternatives
            .iter_mut()
            .find(|(l, _)| l.eq_ignore_ascii_case(&lang))
        {
            Some(slot) => slot.1 = text,
            None => self.alternatives.push((lang, text)),
        }
    }

    /// The default text
    pub fn default_text(&self) -> &str {
        &self.alternatives[0].1
    }

    /// Text for a language tag (case-insensitive)
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.alternatives
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(lang))
            .map(|(_, t)| t.as_str())
    }

    /// Iterate `(language, text)` pairs, default first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.alternatives
            .iter()
            .map(|(l, t)| (l.as_str(), t.as_str()))
    }

    /// Number of alternatives, including `x-default`
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Always false: a language alternative has at least the default
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub(crate) fn validate(&self) -> MetaResult<()> {
        for (lang, _) in &self.alternatives {
            if lang.is_empty() || lang.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(MetaError::Validation(format!(
                    "Invalid language tag '{}'",
                    lang
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for LangAlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let alt = LangAlt::new("A pair of pears on a tree");
        assert_eq!(alt.default_text(), "A pair of pears on a tree");
        assert_eq!(alt.get("X-Default"), Some("A pair of pears on a tree"));
        assert_eq!(alt.len(), 1);
    }

    #[test]
    fn test_from_entries_moves_default_first() {
        let alt = LangAlt::from_entries([("en", "Pears"), ("x-default", "Poires")]).unwrap();
        let langs: Vec<_> = alt.iter().map(|(l, _)| l).collect();
        assert_eq!(langs, vec!["x-default", "en"]);
        assert_eq!(alt.default_text(), "Poires");
    }

    #[test]
    fn test_from_entries_without_default() {
        let alt = LangAlt::from_entries([("de", "Birnen"), ("en", "Pears")]).unwrap();
        assert_eq!(alt.default_text(), "Birnen");
        assert_eq!(alt.len(), 3);
        assert_eq!(alt.get("en"), Some("Pears"));
    }

    #[test]
    fn test_from_entries_empty() {
        let entries: Vec<(String, String)> = Vec::new();
        assert!(LangAlt::from_entries(entries).is_err());
    }

    #[test]
    fn test_set_replaces() {
        let mut alt = LangAlt::new("old").with_language("en-US", "hello");
        alt.set("x-default", "new");
        alt.set("EN-us", "hi");
        assert_eq!(alt.default_text(), "new");
        assert_eq!(alt.get("en-US"), Some("hi"));
        assert_eq!(alt.len(), 2);
    }

    #[test]
    fn test_validate_lang() {
        let alt = LangAlt::new("x").with_language("en US", "y");
        assert!(alt.validate().is_err());
    }
}
