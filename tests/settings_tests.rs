use std::io::Write;

use tempfile::NamedTempFile;
use translatable_fields::{
    Error, MemoryStore, Schema, Settings, SettingsSource, TranslatableRecord,
};

#[test]
fn test_read_settings_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"main_locale": "en", "fallback_locale": "fr", "fallback_any": true}}"#
    )
    .unwrap();

    let settings = Settings::read_from(file.path()).unwrap();
    assert_eq!(settings.main_locale, "en");
    assert_eq!(settings.fallback_locale.as_deref(), Some("fr"));
    assert!(settings.fallback_any);

    let config = settings.into_config().unwrap().shared();
    let mut record = TranslatableRecord::new(
        MemoryStore::new(),
        config,
        Schema::new().with_fields(["title"]).shared(),
    );
    record.set_translation("title", "fr", "Bonjour").unwrap();
    assert_eq!(record.get_translation("title", "de", true).unwrap(), "Bonjour");
}

#[test]
fn test_missing_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Settings::read_from(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_malformed_settings() {
    let result = Settings::from_str("{ not json");
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn test_settings_serialize_skips_unset() {
    let settings = Settings {
        main_locale: "en".to_string(),
        ..Settings::default()
    };
    let json = serde_json::to_string(&settings).unwrap();
    assert_eq!(json, r#"{"main_locale":"en","fallback_any":false}"#);
}
