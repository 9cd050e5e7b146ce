//! Traits for the collaborators a [`crate::TranslatableRecord`] talks to.

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
};

use crate::{error::Error, types::TranslationChange};

/// Key-value attribute storage backing one record.
///
/// A key may be present with a null value; `get` returns `None` for both null and
/// absent keys, while `keys` lists every present key.
pub trait AttributeStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`; `None` stores a null.
    fn set(&mut self, key: &str, value: Option<String>);

    fn keys(&self) -> Vec<String>;

    fn contains_key(&self, key: &str) -> bool {
        self.keys().iter().any(|k| k == key)
    }
}

/// Receives a [`TranslationChange`] after every successful translation write.
pub trait ChangeSink: Send + Sync {
    fn translation_has_been_set(&self, record: &dyn AttributeStore, change: &TranslationChange);
}

/// Loading of settings documents from readers, strings and files.
///
/// # Example
///
/// ```rust,no_run
/// use translatable_fields::{Settings, traits::SettingsSource};
/// let settings = Settings::read_from("translatable.json")?;
/// let config = settings.into_config()?;
/// # Ok::<(), translatable_fields::Error>(())
/// ```
pub trait SettingsSource {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }
}
