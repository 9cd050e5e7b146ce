//! In-memory attribute storage and bundled change sinks.

use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use crate::{
    traits::{AttributeStore, ChangeSink},
    types::TranslationChange,
};

/// An [`AttributeStore`] kept in memory, with keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    attributes: BTreeMap<String, Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attributes: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        }
    }

    /// Returns the raw slot: `None` if absent, `Some(None)` if null.
    pub fn raw(&self, key: &str) -> Option<Option<&str>> {
        self.attributes.get(key).map(|v| v.as_deref())
    }
}

impl AttributeStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.attributes.get(key).cloned().flatten()
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        self.attributes.insert(key.to_string(), value);
    }

    fn keys(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

/// A [`ChangeSink`] that keeps every change it receives.
#[derive(Debug, Default)]
pub struct ChangeLog {
    changes: Mutex<Vec<TranslationChange>>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<TranslationChange> {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ChangeSink for ChangeLog {
    fn translation_has_been_set(&self, _record: &dyn AttributeStore, change: &TranslationChange) {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(change.clone());
    }
}

/// A [`ChangeSink`] that reports each change as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ChangeSink for TracingSink {
    fn translation_has_been_set(&self, _record: &dyn AttributeStore, change: &TranslationChange) {
        tracing::info!(
            field = %change.field,
            locale = %change.locale,
            old_value = %change.old_value,
            new_value = ?change.new_value,
            "translation has been set"
        );
    }
}
