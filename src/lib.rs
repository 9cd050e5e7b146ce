#![forbid(unsafe_code)]
//! Per-locale text variants for the string fields of a stored record.
//!
//! Every translatable field keeps its main-locale text in a plain slot, so it can be
//! indexed and searched directly, and all other locales in one encoded slot next to it.
//! [`TranslatableRecord`] exposes the pair as if each locale were stored on its own.
//!
//! # Quick Start
//!
//! ```rust
//! use translatable_fields::{MemoryStore, Schema, TranslatableConfig, TranslatableRecord};
//!
//! let config = TranslatableConfig::new("en").fallback(Some("en".to_string()), false, None);
//! let schema = Schema::new().with_fields(["title"]);
//! let mut record = TranslatableRecord::new(MemoryStore::new(), config.shared(), schema.shared());
//!
//! record.set_translation("title", "en", "Hello")?;
//! record.set_translation("title", "fr", "Bonjour")?;
//!
//! assert_eq!(record.get_translation("title", "nl", true)?, "Hello");
//! assert_eq!(record.get_translated_locales("title")?, vec!["en", "fr"]);
//! # Ok::<(), translatable_fields::Error>(())
//! ```
//!
//! # Storage layout
//!
//! - `title`: the main-locale text
//! - `titleTranslations`: `<fr>Bonjour</fr><de>Hallo</de>`, see [`codec`]

pub mod codec;
pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod schema;
pub mod store;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    config::{MissingKey, MissingKeyHandler, Settings, TranslatableConfig, missing_key_handler},
    error::Error,
    query::{LocalePredicate, PredicateBuilder},
    record::TranslatableRecord,
    schema::Schema,
    store::{ChangeLog, MemoryStore, TracingSink},
    traits::{AttributeStore, ChangeSink, SettingsSource},
    types::{AttributeValue, TranslationChange, TranslationSet},
};
