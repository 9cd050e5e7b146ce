//! Per-locale access to the translatable fields of one stored record.
//!
//! Each translatable field `F` occupies two slots of the underlying
//! [`AttributeStore`]: `F` holds the main-locale text and `FTranslations` holds
//! every other locale, encoded by [`crate::codec`]. Nothing is cached: every
//! read decodes the slots again and every write re-encodes them.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    codec,
    config::{MissingKey, TranslatableConfig},
    error::Error,
    query::{self, LocalePredicate},
    schema::{Schema, encoded_key},
    traits::{AttributeStore, ChangeSink},
    types::{AttributeValue, TranslationChange, TranslationSet, validate_locale},
};

/// Wraps a record's attribute storage with the translation API.
///
/// # Example
///
/// ```rust
/// use translatable_fields::{MemoryStore, Schema, TranslatableConfig, TranslatableRecord};
///
/// let config = TranslatableConfig::new("en").fallback(Some("en".to_string()), false, None);
/// let schema = Schema::new().with_fields(["title"]);
/// let mut record = TranslatableRecord::new(MemoryStore::new(), config.shared(), schema.shared());
///
/// record
///     .set_translation("title", "en", "Hello")?
///     .set_translation("title", "fr", "Bonjour")?;
///
/// assert_eq!(record.get_translation("title", "fr", true)?, "Bonjour");
/// assert_eq!(record.get_translation("title", "de", true)?, "Hello");
/// assert_eq!(record.get_translation("title", "de", false)?, "");
/// # Ok::<(), translatable_fields::Error>(())
/// ```
pub struct TranslatableRecord<S: AttributeStore> {
    store: S,
    config: Arc<TranslatableConfig>,
    schema: Arc<Schema>,
    sink: Option<Arc<dyn ChangeSink>>,
    locale: Option<String>,
}

impl<S: AttributeStore> TranslatableRecord<S> {
    pub fn new(store: S, config: Arc<TranslatableConfig>, schema: Arc<Schema>) -> Self {
        Self {
            store,
            config,
            schema,
            sink: None,
            locale: None,
        }
    }

    /// Attaches the sink that receives a [`TranslationChange`] for every write.
    pub fn with_sink(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the current locale up front.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn main_locale(&self) -> &str {
        &self.config.main_locale
    }

    /// Returns the locale set on this record, or the configured application locale.
    pub fn locale(&self) -> &str {
        self.locale
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.config.app_locale)
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) -> &mut Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn translatable_attributes(&self) -> Vec<String> {
        self.schema.fields(&self.store)
    }

    pub fn is_translatable_attribute(&self, field: &str) -> bool {
        self.schema.declares(field) || self.translatable_attributes().iter().any(|f| f == field)
    }

    // ---- read path ----

    /// Returns the non-empty translations of `field`, main locale first.
    ///
    /// With `allowed_locales`, entries for other locales are dropped.
    pub fn get_translations(
        &self,
        field: &str,
        allowed_locales: Option<&[&str]>,
    ) -> Result<TranslationSet, Error> {
        self.guard_against_non_translatable(field)?;
        let mut translations = self.read_translations(field);
        if let Some(allowed) = allowed_locales {
            translations.retain(|locale, _| allowed.iter().any(|a| *a == locale));
        }
        Ok(translations)
    }

    /// Returns the translations of every translatable field, keyed by field.
    pub fn all_translations(
        &self,
        allowed_locales: Option<&[&str]>,
    ) -> BTreeMap<String, TranslationSet> {
        self.translatable_attributes()
            .into_iter()
            .map(|field| {
                let mut translations = self.read_translations(&field);
                if let Some(allowed) = allowed_locales {
                    translations.retain(|locale, _| allowed.iter().any(|a| *a == locale));
                }
                (field, translations)
            })
            .collect()
    }

    pub fn translations(&self) -> BTreeMap<String, TranslationSet> {
        self.all_translations(None)
    }

    pub fn get_translation(
        &self,
        field: &str,
        locale: &str,
        use_fallback: bool,
    ) -> Result<String, Error> {
        self.guard_against_non_translatable(field)?;
        let translations = self.read_translations(field);
        let resolved = self.resolve_in(&translations, locale, use_fallback);

        let mut translation = translations.get(resolved).unwrap_or_default().to_string();

        if resolved != locale
            && let Some(handler) = &self.config.missing_key_handler
        {
            let missing = MissingKey {
                record: &self.store,
                field,
                requested_locale: locale,
                current_value: &translation,
                resolved_locale: resolved,
            };
            let outcome = handler(&missing);
            match outcome {
                Ok(Some(replacement)) => translation = replacement,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(field, locale, %err, "missing key handler failed");
                }
            }
        }

        match self.schema.get_mutator(field) {
            Some(mutator) => Ok(mutator(&translation)),
            None => Ok(translation),
        }
    }

    /// Like [`Self::get_translation`]; an empty `locale` means the current locale.
    pub fn translate(&self, field: &str, locale: &str, use_fallback: bool) -> Result<String, Error> {
        let locale = if locale.is_empty() { self.locale() } else { locale };
        self.get_translation(field, locale, use_fallback)
    }

    pub fn get_translation_with_fallback(&self, field: &str, locale: &str) -> Result<String, Error> {
        self.get_translation(field, locale, true)
    }

    pub fn get_translation_without_fallback(
        &self,
        field: &str,
        locale: &str,
    ) -> Result<String, Error> {
        self.get_translation(field, locale, false)
    }

    /// Returns the locale whose value a read of `locale` would use.
    pub fn resolve_locale(
        &self,
        field: &str,
        locale: &str,
        use_fallback: bool,
    ) -> Result<String, Error> {
        self.guard_against_non_translatable(field)?;
        let translations = self.read_translations(field);
        Ok(self.resolve_in(&translations, locale, use_fallback).to_string())
    }

    pub fn get_translated_locales(&self, field: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .get_translations(field, None)?
            .locales()
            .map(str::to_string)
            .collect())
    }

    /// Checks for a non-empty translation; `None` or `""` checks the current locale.
    pub fn has_translation(&self, field: &str, locale: Option<&str>) -> Result<bool, Error> {
        let locale = locale
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.locale());
        Ok(self.get_translations(field, None)?.contains_locale(locale))
    }

    /// Returns every locale translated in at least one field, without duplicates.
    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = Vec::new();
        for field in self.translatable_attributes() {
            for locale in self.read_translations(&field).locales() {
                if !locales.iter().any(|l| l == locale) {
                    locales.push(locale.to_string());
                }
            }
        }
        locales
    }

    // ---- write path ----

    pub fn set_translation(
        &mut self,
        field: &str,
        locale: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, Error> {
        self.guard_against_non_translatable(field)?;
        validate_locale(locale)?;
        self.write_translation(field, locale, Some(value.into()));
        Ok(self)
    }

    /// Sets each translation of `translations` in order.
    ///
    /// An empty mapping clears both slots of the field to null instead.
    pub fn set_translations(
        &mut self,
        field: &str,
        translations: &TranslationSet,
    ) -> Result<&mut Self, Error> {
        self.guard_against_non_translatable(field)?;
        for locale in translations.locales() {
            validate_locale(locale)?;
        }

        let entries = translations
            .iter()
            .map(|(locale, value)| (locale.to_string(), Some(value.to_string())))
            .collect();
        self.write_translations(field, entries);
        Ok(self)
    }

    pub fn forget_translation(&mut self, field: &str, locale: &str) -> Result<&mut Self, Error> {
        self.guard_against_non_translatable(field)?;
        validate_locale(locale)?;

        let mut entries: Vec<(String, Option<String>)> = self
            .read_translations(field)
            .into_iter()
            .map(|(l, v)| (l, Some(v)))
            .collect();
        match entries.iter_mut().find(|(l, _)| l == locale) {
            Some((_, value)) => *value = None,
            None => entries.push((locale.to_string(), None)),
        }

        self.write_translations(field, entries);
        Ok(self)
    }

    pub fn forget_translations(&mut self, field: &str) -> Result<&mut Self, Error> {
        for locale in self.get_translated_locales(field)? {
            self.forget_translation(field, &locale)?;
        }
        Ok(self)
    }

    /// Forgets `locale` in every translatable field.
    pub fn forget_all_translations(&mut self, locale: &str) -> Result<&mut Self, Error> {
        validate_locale(locale)?;
        for field in self.translatable_attributes() {
            self.forget_translation(&field, locale)?;
        }
        Ok(self)
    }

    /// Forgets every translation of `field`, then sets `translations`.
    pub fn replace_translations(
        &mut self,
        field: &str,
        translations: &TranslationSet,
    ) -> Result<&mut Self, Error> {
        for locale in translations.locales() {
            validate_locale(locale)?;
        }
        for locale in self.get_translated_locales(field)? {
            self.forget_translation(field, &locale)?;
        }
        self.set_translations(field, translations)
    }

    // ---- generic attribute access ----

    /// Reads `key` the way a plain attribute read would.
    ///
    /// Translatable fields resolve the current locale, with fallback unless the
    /// schema disables it.
    pub fn get_attribute_value(&self, key: &str) -> Result<Option<String>, Error> {
        if !self.is_translatable_attribute(key) {
            return Ok(self.store.get(key));
        }
        self.get_translation(key, self.locale(), self.schema.use_fallback_locale())
            .map(Some)
    }

    /// Writes `key` the way a plain attribute assignment would.
    ///
    /// On a translatable field a text sets the current locale and a mapping goes
    /// through [`Self::set_translations`]; other keys take text verbatim.
    pub fn set_attribute(
        &mut self,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<&mut Self, Error> {
        let translatable = self.is_translatable_attribute(key);
        match value.into() {
            AttributeValue::Translations(translations) if translatable => {
                self.set_translations(key, &translations)
            }
            AttributeValue::Text(text) if translatable => {
                let locale = self.locale().to_string();
                self.set_translation(key, &locale, text)
            }
            AttributeValue::Text(text) => {
                self.store.set(key, Some(text));
                Ok(self)
            }
            AttributeValue::Translations(_) => Err(Error::not_translatable(key)),
        }
    }

    // ---- query predicates ----

    pub fn where_locale(&self, column: &str, locale: &str) -> LocalePredicate {
        query::where_locale(column, locale, self.main_locale())
    }

    pub fn where_locales<I, L>(&self, column: &str, locales: I) -> LocalePredicate
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        query::where_locales(column, locales, self.main_locale())
    }

    // ---- internals ----

    fn guard_against_non_translatable(&self, field: &str) -> Result<(), Error> {
        if self.is_translatable_attribute(field) {
            Ok(())
        } else {
            Err(Error::not_translatable(field))
        }
    }

    /// Merges the main slot with the decoded slot and drops empty values.
    fn read_translations(&self, field: &str) -> TranslationSet {
        let main_locale = self.main_locale();
        let mut translations = TranslationSet::new();
        translations.insert(main_locale, self.store.get(field).unwrap_or_default());

        let encoded = self.store.get(&encoded_key(field)).unwrap_or_default();
        for (locale, text) in codec::decode(&encoded) {
            if locale != main_locale {
                translations.insert(locale, text);
            }
        }

        translations.retain(|_, value| !value.is_empty());
        translations
    }

    fn resolve_in<'a>(
        &'a self,
        translations: &'a TranslationSet,
        locale: &'a str,
        use_fallback: bool,
    ) -> &'a str {
        if translations.contains_locale(locale) || !use_fallback {
            return locale;
        }

        let fallback_locale = self
            .schema
            .fallback_locale()
            .or(self.config.fallback_locale.as_deref())
            .or(self.config.app_fallback_locale.as_deref());

        if let Some(fallback) = fallback_locale
            && translations.contains_locale(fallback)
        {
            return fallback;
        }

        if self.config.fallback_any
            && let Some(first) = translations.locales().next()
        {
            return first;
        }

        locale
    }

    fn write_translations(&mut self, field: &str, entries: Vec<(String, Option<String>)>) {
        if entries.is_empty() {
            tracing::debug!(field, "clearing all translations");
            self.store.set(field, None);
            self.store.set(&encoded_key(field), None);
            return;
        }

        for (locale, value) in entries {
            self.write_translation(field, &locale, value);
        }
    }

    /// The single mutation primitive; `None` removes the locale.
    fn write_translation(&mut self, field: &str, locale: &str, value: Option<String>) {
        let mut translations = self.read_translations(field);
        let old_value = translations.get(locale).unwrap_or_default().to_string();

        let value = match (value, self.schema.set_mutator(field)) {
            (Some(value), Some(mutator)) => Some(mutator(&value, locale)),
            (value, _) => value,
        };

        match &value {
            Some(text) => {
                translations.insert(locale, text.as_str());
            }
            None => {
                translations.remove(locale);
            }
        }

        let main_locale = self.main_locale().to_string();
        let main_value = if locale == main_locale && value.is_none() {
            None
        } else {
            Some(translations.get(&main_locale).unwrap_or_default().to_string())
        };
        let encoded = codec::encode(&translations, &main_locale);

        tracing::debug!(field, locale, removed = value.is_none(), "setting translation");
        self.store.set(field, main_value);
        self.store.set(&encoded_key(field), Some(encoded));

        if let Some(sink) = &self.sink {
            let change = TranslationChange {
                field: field.to_string(),
                locale: locale.to_string(),
                old_value,
                new_value: value,
            };
            sink.translation_has_been_set(&self.store, &change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ChangeLog, MemoryStore};

    fn record_with(config: TranslatableConfig) -> TranslatableRecord<MemoryStore> {
        TranslatableRecord::new(
            MemoryStore::new(),
            config.shared(),
            Schema::new().with_fields(["title", "body"]).shared(),
        )
    }

    #[test]
    fn test_main_locale_goes_to_plain_slot() {
        let mut record = record_with(TranslatableConfig::new("en"));
        record.set_translation("title", "en", "X").unwrap();

        assert_eq!(record.store().get("title").as_deref(), Some("X"));
        assert_eq!(record.store().get("titleTranslations").as_deref(), Some(""));
    }

    #[test]
    fn test_other_locale_goes_to_encoded_slot() {
        let mut record = record_with(TranslatableConfig::new("en"));
        record.set_translation("title", "fr", "Bonjour").unwrap();

        assert_eq!(record.store().raw("title"), Some(Some("")));
        assert_eq!(
            record.store().get("titleTranslations").as_deref(),
            Some("<fr>Bonjour</fr>")
        );
    }

    #[test]
    fn test_stray_main_span_is_ignored() {
        let store = MemoryStore::from_pairs([
            ("title", Some("Hello")),
            ("titleTranslations", Some("<en>Stale</en><fr>Bonjour</fr>")),
        ]);
        let record = TranslatableRecord::new(
            store,
            TranslatableConfig::new("en").shared(),
            Schema::new().with_fields(["title"]).shared(),
        );
        assert_eq!(
            record.get_translations("title", None).unwrap(),
            TranslationSet::from([("en", "Hello"), ("fr", "Bonjour")])
        );
    }

    #[test]
    fn test_resolve_order() {
        let config = TranslatableConfig::new("en")
            .fallback(Some("de".to_string()), true, None)
            .with_app_fallback_locale(Some("nl".to_string()));
        let mut record = record_with(config);
        record
            .set_translation("title", "fr", "Bonjour")
            .unwrap()
            .set_translation("title", "nl", "Hallo")
            .unwrap();

        assert_eq!(record.resolve_locale("title", "fr", true).unwrap(), "fr");
        assert_eq!(record.resolve_locale("title", "es", false).unwrap(), "es");
        // "de" has no value, so fallback_any picks the first known locale
        assert_eq!(record.resolve_locale("title", "es", true).unwrap(), "fr");
    }

    #[test]
    fn test_schema_fallback_overrides_config() {
        let config = TranslatableConfig::new("en").fallback(Some("fr".to_string()), false, None);
        let schema = Schema::new()
            .with_fields(["title"])
            .with_fallback_locale(Some("nl".to_string()));
        let mut record = TranslatableRecord::new(MemoryStore::new(), config.shared(), schema.shared());
        record
            .set_translation("title", "fr", "Bonjour")
            .unwrap()
            .set_translation("title", "nl", "Hallo")
            .unwrap();

        assert_eq!(record.get_translation("title", "de", true).unwrap(), "Hallo");
    }

    #[test]
    fn test_app_fallback_used_without_config_fallback() {
        let config = TranslatableConfig::new("en").with_app_fallback_locale(Some("fr".to_string()));
        let mut record = record_with(config);
        record.set_translation("title", "fr", "Bonjour").unwrap();

        assert_eq!(record.get_translation("title", "de", true).unwrap(), "Bonjour");
    }

    #[test]
    fn test_change_events() {
        let log = Arc::new(ChangeLog::new());
        let mut record = record_with(TranslatableConfig::new("en")).with_sink(log.clone());
        record
            .set_translation("title", "fr", "Bonjour")
            .unwrap()
            .set_translation("title", "fr", "Salut")
            .unwrap();

        let changes = log.changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].old_value, "");
        assert_eq!(changes[0].new_value.as_deref(), Some("Bonjour"));
        assert_eq!(changes[1].old_value, "Bonjour");
        assert_eq!(changes[1].new_value.as_deref(), Some("Salut"));
    }

    #[test]
    fn test_forget_main_locale_nulls_plain_slot() {
        let mut record = record_with(TranslatableConfig::new("en"));
        record
            .set_translation("title", "en", "Hello")
            .unwrap()
            .forget_translation("title", "en")
            .unwrap();

        assert_eq!(record.store().raw("title"), Some(None));
        assert!(record.get_translations("title", None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_locale_rejected() {
        let mut record = record_with(TranslatableConfig::new("en"));
        let err = record.set_translation("title", "fr</fr>", "x").err().unwrap();
        assert!(matches!(err, Error::InvalidLocale(_)));
        assert!(record.store().keys().is_empty());
    }

    #[test]
    fn test_invalid_locale_in_batch_leaves_slots_untouched() {
        let mut record = record_with(TranslatableConfig::new("en"));
        record
            .set_translation("title", "en", "Hello")
            .unwrap()
            .set_translation("title", "de", "Hallo")
            .unwrap();

        let batch = TranslationSet::from([("en", "Hi"), ("fr", "Bonjour"), ("nl/be", "Hoi")]);
        let err = record.set_translations("title", &batch).err().unwrap();
        assert!(matches!(err, Error::InvalidLocale(_)));
        assert_eq!(record.store().raw("title"), Some(Some("Hello")));
        assert_eq!(
            record.store().raw("titleTranslations"),
            Some(Some("<de>Hallo</de>"))
        );
    }
}
