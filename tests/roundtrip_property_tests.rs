use proptest::prelude::*;
use translatable_fields::{
    MemoryStore, Schema, TranslatableConfig, TranslatableRecord, TranslationSet, codec,
};

fn locale_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{2}(-[A-Z]{2})?").expect("valid locale regex")
}

// Includes marker and entity characters so escaping is exercised.
fn text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 <>/\\\\&;\\n\\-\\.,!\\?éü]{1,30}").expect("valid text regex")
}

fn translation_set_strategy() -> impl Strategy<Value = TranslationSet> {
    prop::collection::vec((locale_strategy(), text_strategy()), 0..6)
        .prop_map(|pairs| pairs.into_iter().collect::<TranslationSet>())
}

fn record() -> TranslatableRecord<MemoryStore> {
    TranslatableRecord::new(
        MemoryStore::new(),
        TranslatableConfig::new("en").shared(),
        Schema::new().with_fields(["title"]).shared(),
    )
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(set in translation_set_strategy()) {
        let blob = codec::encode(&set, "root");
        prop_assert_eq!(codec::decode(&blob), set);
    }

    #[test]
    fn prop_set_translations_then_read(set in translation_set_strategy()) {
        let mut record = record();
        record.set_translations("title", &set).unwrap();
        prop_assert_eq!(record.get_translations("title", None).unwrap(), set);
    }

    #[test]
    fn prop_set_translation_idempotent(locale in locale_strategy(), text in text_strategy()) {
        let mut record = record();
        record.set_translation("title", &locale, text.as_str()).unwrap();
        let first = record.get_translations("title", None).unwrap();
        record.set_translation("title", &locale, text.as_str()).unwrap();
        prop_assert_eq!(record.get_translations("title", None).unwrap(), first);
    }

    #[test]
    fn prop_decode_never_panics(blob in "\\PC{0,80}") {
        let _ = codec::decode(&blob);
    }
}
