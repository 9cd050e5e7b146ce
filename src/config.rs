//! Process-wide resolution policy shared by every translatable record.
//!
//! A [`TranslatableConfig`] is built once at start-up from the main locale, may be
//! amended once with [`TranslatableConfig::fallback`], and is then shared as an
//! `Arc` with every record.

use std::{fmt, io::BufRead, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{error::Error, traits::AttributeStore, traits::SettingsSource, types::validate_locale};

/// Error type a missing-key handler may return; it is always discarded.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Arguments passed to a [`MissingKeyHandler`].
pub struct MissingKey<'a> {
    pub record: &'a dyn AttributeStore,
    pub field: &'a str,
    pub requested_locale: &'a str,
    pub current_value: &'a str,
    pub resolved_locale: &'a str,
}

/// Called when a read had to fall back to another locale.
///
/// Returning `Ok(Some(text))` replaces the value; `Ok(None)` and `Err(_)` keep it.
pub type MissingKeyHandler =
    Arc<dyn Fn(&MissingKey<'_>) -> Result<Option<String>, HandlerError> + Send + Sync>;

/// Wraps a closure as a [`MissingKeyHandler`].
pub fn missing_key_handler<F>(handler: F) -> MissingKeyHandler
where
    F: Fn(&MissingKey<'_>) -> Result<Option<String>, HandlerError> + Send + Sync + 'static,
{
    Arc::new(handler)
}

pub struct TranslatableConfig {
    pub main_locale: String,

    /// Locale used when a translation is missing for the requested locale.
    pub fallback_locale: Option<String>,

    /// When the fallback locale has no translation either, pick any translated locale.
    pub fallback_any: bool,

    pub missing_key_handler: Option<MissingKeyHandler>,

    /// Default current locale for records without an explicit one.
    pub app_locale: String,

    /// Last-resort fallback locale when neither the record nor this config names one.
    pub app_fallback_locale: Option<String>,
}

impl TranslatableConfig {
    pub fn new(main_locale: impl Into<String>) -> Self {
        let main_locale = main_locale.into();
        Self {
            app_locale: main_locale.clone(),
            main_locale,
            fallback_locale: None,
            fallback_any: false,
            missing_key_handler: None,
            app_fallback_locale: None,
        }
    }

    /// Sets the fallback settings, replacing any earlier ones.
    pub fn fallback(
        mut self,
        fallback_locale: Option<String>,
        fallback_any: bool,
        missing_key_handler: Option<MissingKeyHandler>,
    ) -> Self {
        self.fallback_locale = fallback_locale;
        self.fallback_any = fallback_any;
        self.missing_key_handler = missing_key_handler;
        self
    }

    pub fn with_app_locale(mut self, app_locale: impl Into<String>) -> Self {
        self.app_locale = app_locale.into();
        self
    }

    pub fn with_app_fallback_locale(mut self, app_fallback_locale: Option<String>) -> Self {
        self.app_fallback_locale = app_fallback_locale;
        self
    }

    /// Wraps the config for sharing between records.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for TranslatableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatableConfig")
            .field("main_locale", &self.main_locale)
            .field("fallback_locale", &self.fallback_locale)
            .field("fallback_any", &self.fallback_any)
            .field("missing_key_handler", &self.missing_key_handler.is_some())
            .field("app_locale", &self.app_locale)
            .field("app_fallback_locale", &self.app_fallback_locale)
            .finish()
    }
}

/// Serializable form of [`TranslatableConfig`], minus the handler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub main_locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_locale: Option<String>,
    pub fallback_any: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_fallback_locale: Option<String>,
}

impl Settings {
    /// Validates the settings and builds a config without a missing-key handler.
    pub fn into_config(self) -> Result<TranslatableConfig, Error> {
        if self.main_locale.is_empty() {
            return Err(Error::InvalidConfig("main_locale is required".to_string()));
        }
        validate_locale(&self.main_locale)?;

        let mut config = TranslatableConfig::new(self.main_locale)
            .fallback(self.fallback_locale, self.fallback_any, None)
            .with_app_fallback_locale(self.app_fallback_locale);
        if let Some(app_locale) = self.app_locale {
            config = config.with_app_locale(app_locale);
        }
        Ok(config)
    }
}

impl SettingsSource for Settings {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        serde_json::from_reader(reader).map_err(Error::Parse)
    }
}
