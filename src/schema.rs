//! Per-record-type registration of translatable fields.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::traits::AttributeStore;

/// Suffix of the physical key that holds a field's encoded translations.
pub const ENCODED_SUFFIX: &str = "Translations";

/// Transforms a text read from a translatable field.
pub type GetMutator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Transforms a `(value, locale)` pair into the text to store.
pub type SetMutator = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Describes which fields of a record type are translatable and how they behave.
///
/// # Example
///
/// ```rust
/// use translatable_fields::Schema;
///
/// let schema = Schema::new()
///     .with_fields(["title", "body"])
///     .with_get_mutator("title", |text| text.to_uppercase());
/// assert!(schema.declares("title"));
/// ```
#[derive(Clone)]
pub struct Schema {
    fields: Option<Vec<String>>,
    get_mutators: HashMap<String, GetMutator>,
    set_mutators: HashMap<String, SetMutator>,
    fallback_locale: Option<String>,
    use_fallback_locale: bool,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            fields: None,
            get_mutators: HashMap::new(),
            set_mutators: HashMap::new(),
            fallback_locale: None,
            use_fallback_locale: true,
        }
    }
}

impl Schema {
    /// Creates a schema that infers its fields from the stored keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the translatable fields explicitly.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_get_mutator<F>(mut self, field: impl Into<String>, mutator: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.get_mutators.insert(field.into(), Arc::new(mutator));
        self
    }

    pub fn with_set_mutator<F>(mut self, field: impl Into<String>, mutator: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.set_mutators.insert(field.into(), Arc::new(mutator));
        self
    }

    /// Overrides the configured fallback locale for records of this type.
    pub fn with_fallback_locale(mut self, fallback_locale: Option<String>) -> Self {
        self.fallback_locale = fallback_locale;
        self
    }

    /// Controls whether attribute reads use fallback.
    pub fn with_use_fallback_locale(mut self, use_fallback_locale: bool) -> Self {
        self.use_fallback_locale = use_fallback_locale;
        self
    }

    pub fn declares(&self, field: &str) -> bool {
        self.fields
            .as_ref()
            .is_some_and(|fields| fields.iter().any(|f| f == field))
    }

    /// Returns the translatable fields for a record backed by `store`.
    ///
    /// Without an explicit declaration this is a best-effort guess: every stored key
    /// `F` for which `F` + [`ENCODED_SUFFIX`] is also stored. A field whose two slots
    /// have never been written is not found this way.
    pub fn fields(&self, store: &dyn AttributeStore) -> Vec<String> {
        if let Some(fields) = &self.fields {
            return fields.clone();
        }

        let keys = store.keys();
        keys.iter()
            .filter(|key| {
                let encoded = encoded_key(key);
                keys.iter().any(|k| *k == encoded)
            })
            .cloned()
            .collect()
    }

    pub fn get_mutator(&self, field: &str) -> Option<&GetMutator> {
        self.get_mutators.get(field)
    }

    pub fn set_mutator(&self, field: &str) -> Option<&SetMutator> {
        self.set_mutators.get(field)
    }

    pub fn fallback_locale(&self) -> Option<&str> {
        self.fallback_locale.as_deref()
    }

    pub fn use_fallback_locale(&self) -> bool {
        self.use_fallback_locale
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("get_mutators", &self.get_mutators.keys().collect::<Vec<_>>())
            .field("set_mutators", &self.set_mutators.keys().collect::<Vec<_>>())
            .field("fallback_locale", &self.fallback_locale)
            .field("use_fallback_locale", &self.use_fallback_locale)
            .finish()
    }
}

/// Physical key of the encoded slot for `field`.
pub fn encoded_key(field: &str) -> String {
    format!("{}{}", field, ENCODED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_declared_fields() {
        let schema = Schema::new().with_fields(["title", "body"]);
        let store = MemoryStore::new();
        assert_eq!(schema.fields(&store), vec!["title", "body"]);
        assert!(schema.declares("body"));
        assert!(!schema.declares("slug"));
    }

    #[test]
    fn test_inferred_fields() {
        let store = MemoryStore::from_pairs([
            ("title", Some("Hello")),
            ("titleTranslations", Some("<fr>Bonjour</fr>")),
            ("body", None),
            ("bodyTranslations", None),
            ("slug", Some("hello")),
        ]);
        let schema = Schema::new();
        let mut fields = schema.fields(&store);
        fields.sort();
        assert_eq!(fields, vec!["body", "title"]);
    }

    #[test]
    fn test_encoded_key() {
        assert_eq!(encoded_key("title"), "titleTranslations");
    }

    #[test]
    fn test_mutators_registered() {
        let schema = Schema::new()
            .with_get_mutator("title", |text| text.trim().to_string())
            .with_set_mutator("title", |value, locale| format!("{}:{}", locale, value));
        assert_eq!((schema.get_mutator("title").unwrap())("  a "), "a");
        assert_eq!((schema.set_mutator("title").unwrap())("a", "fr"), "fr:a");
        assert!(schema.get_mutator("body").is_none());
    }
}
