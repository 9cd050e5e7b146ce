//! Core types shared by the codec and the record API.

use std::fmt::{self, Display};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::error::Error;

/// Characters that delimit locale markers in an encoded slot.
pub const MARKER_DELIMITERS: [char; 3] = ['<', '>', '/'];

/// Checks that a locale identifier can be written inside a locale marker.
pub fn validate_locale(locale: &str) -> Result<(), Error> {
    if locale.is_empty() || locale.contains(MARKER_DELIMITERS) {
        return Err(Error::InvalidLocale(locale.to_string()));
    }
    Ok(())
}

/// An insertion-ordered mapping from locale identifier to text.
///
/// Inserting an existing locale overwrites its value in place, so each locale
/// appears at most once and keeps the position of its first insertion.
/// Equality compares contents and ignores order.
#[derive(Debug, Clone, Default)]
pub struct TranslationSet {
    entries: Vec<(String, String)>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.entries.iter().any(|(l, _)| l == locale)
    }

    /// Inserts or overwrites the value for `locale`, returning the previous value.
    pub fn insert(&mut self, locale: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let locale = locale.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == locale) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((locale, value));
                None
            }
        }
    }

    pub fn remove(&mut self, locale: &str) -> Option<String> {
        let index = self.entries.iter().position(|(l, _)| l == locale)?;
        Some(self.entries.remove(index).1)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.entries.retain(|(l, v)| keep(l.as_str(), v.as_str()));
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for TranslationSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(l, v)| other.get(l) == Some(v))
    }
}

impl Eq for TranslationSet {}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for TranslationSet {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut set = TranslationSet::new();
        for (locale, value) in iter {
            set.insert(locale, value);
        }
        set
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TranslationSet {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for TranslationSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Display for TranslationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TranslationSet {{ {} }}",
            self.entries
                .iter()
                .map(|(l, v)| format!("{}: {}", l, v))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

// Serialized as a JSON object whose key order follows insertion order.
impl Serialize for TranslationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (locale, value) in &self.entries {
            map.serialize_entry(locale, value)?;
        }
        map.end()
    }
}

struct TranslationSetVisitor;

impl<'de> Visitor<'de> for TranslationSetVisitor {
    type Value = TranslationSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map from locale to text")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = TranslationSet::new();
        while let Some((locale, value)) = access.next_entry::<String, String>()? {
            set.insert(locale, value);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for TranslationSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TranslationSetVisitor)
    }
}

/// Snapshot of one successful translation write, handed to a [`crate::traits::ChangeSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationChange {
    pub field: String,
    pub locale: String,
    pub old_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub new_value: Option<String>,
}

impl Display for TranslationChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TranslationChange {{ field: {}, locale: {}, old: {:?}, new: {:?} }}",
            self.field, self.locale, self.old_value, self.new_value
        )
    }
}

/// A value assigned through the generic attribute setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A single text, applied to the current locale of translatable fields.
    Text(String),

    /// A full per-locale mapping, replacing translations locale by locale.
    Translations(TranslationSet),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<TranslationSet> for AttributeValue {
    fn from(value: TranslationSet) -> Self {
        AttributeValue::Translations(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut set = TranslationSet::from([("en", "Hello"), ("fr", "Bonjour")]);
        let previous = set.insert("en", "Hi");
        assert_eq!(previous.as_deref(), Some("Hello"));
        assert_eq!(set.locales().collect::<Vec<_>>(), vec!["en", "fr"]);
        assert_eq!(set.get("en"), Some("Hi"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = TranslationSet::from([("en", "Hello"), ("fr", "Bonjour")]);
        let b = TranslationSet::from([("fr", "Bonjour"), ("en", "Hello")]);
        assert_eq!(a, b);
        assert_ne!(a, TranslationSet::from([("en", "Hello")]));
        assert_ne!(a, TranslationSet::from([("en", "Hello"), ("fr", "Salut")]));
    }

    #[test]
    fn test_remove_and_retain() {
        let mut set = TranslationSet::from([("en", "Hello"), ("fr", ""), ("de", "Hallo")]);
        assert_eq!(set.remove("de").as_deref(), Some("Hallo"));
        assert!(set.remove("de").is_none());
        set.retain(|_, v| !v.is_empty());
        assert_eq!(set.len(), 1);
        assert!(set.contains_locale("en"));
    }

    #[test]
    fn test_serde_preserves_order() {
        let set = TranslationSet::from([("nl", "Hallo"), ("de", "Hallo"), ("en", "Hello")]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"nl":"Hallo","de":"Hallo","en":"Hello"}"#);

        let parsed: TranslationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_validate_locale() {
        assert!(validate_locale("fr-CA").is_ok());
        assert!(validate_locale("pt_BR").is_ok());
        assert!(matches!(validate_locale(""), Err(Error::InvalidLocale(_))));
        assert!(matches!(validate_locale("en/us"), Err(Error::InvalidLocale(_))));
        assert!(matches!(validate_locale("<en>"), Err(Error::InvalidLocale(_))));
    }

    #[test]
    fn test_change_display() {
        let change = TranslationChange {
            field: "title".to_string(),
            locale: "fr".to_string(),
            old_value: String::new(),
            new_value: Some("Bonjour".to_string()),
        };
        let display = change.to_string();
        assert!(display.contains("title"));
        assert!(display.contains("Bonjour"));
    }
}
