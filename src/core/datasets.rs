// File: src/core/datasets.rs
//
// Bundled reference datasets: static, loosely-typed records consumed at
// load time. These go through the normalizer like everything else, so the
// shapes here are "as authored" (some french values are bare strings).
//
// Note: there is deliberately no bundled verb dataset. The verb snapshot
// is populated from user-authored verbs only.

use crate::core::types::{Kind, RawRecord};
use serde_json::json;

/// The bundled records for `kind`. Empty for `Kind::Verb`.
pub fn bundled(kind: Kind) -> Vec<RawRecord> {
    let docs = match kind {
        Kind::Word => word_docs(),
        Kind::Verb => vec![],
        Kind::Sentence => sentence_docs(),
        Kind::Number => number_docs(),
    };
    docs.into_iter()
        .filter_map(|doc| serde_json::from_value(doc).ok())
        .collect()
}

fn word_docs() -> Vec<serde_json::Value> {
    vec![
        json!({"id": "word-0", "english": "hello", "french": ["bonjour", "salut"], "category": "general", "isPredefined": true}),
        json!({"id": "word-1", "english": "thank you", "french": ["merci"], "category": "general", "isPredefined": true}),
        json!({"id": "word-2", "english": "cat", "french": ["chat"], "category": "general", "isPredefined": true}),
        json!({"id": "word-3", "english": "dog", "french": ["chien"], "category": "general", "isPredefined": true}),
        json!({"id": "word-4", "english": "bread", "french": ["pain"], "category": "food", "isPredefined": true}),
        json!({"id": "word-5", "english": "cheese", "french": ["fromage"], "category": "food", "isPredefined": true}),
        json!({"id": "word-6", "english": "train station", "french": ["gare"], "category": "travel", "isPredefined": true}),
        json!({"id": "word-7", "english": "ticket", "french": ["billet"], "category": "travel", "isPredefined": true}),
        json!({"id": "word-8", "english": "brother", "french": ["frère"], "category": "family", "isPredefined": true}),
        json!({"id": "word-9", "english": "sister", "french": ["sœur"], "category": "family", "isPredefined": true}),
    ]
}

fn sentence_docs() -> Vec<serde_json::Value> {
    vec![
        json!({"id": "sentence-0", "english": "How are you?", "french": ["Comment ça va ?", "Ça va ?"], "isPredefined": true}),
        json!({"id": "sentence-1", "english": "My name is Paul.", "french": ["Je m'appelle Paul."], "isPredefined": true}),
        json!({"id": "sentence-2", "english": "Where is the station?", "french": ["Où est la gare ?"], "isPredefined": true}),
        json!({"id": "sentence-3", "english": "I would like a coffee.", "french": ["Je voudrais un café."], "isPredefined": true}),
        // Authored as a bare string; the normalizer coerces it.
        json!({"id": "sentence-4", "english": "See you tomorrow.", "french": "À demain.", "isPredefined": true}),
    ]
}

fn number_docs() -> Vec<serde_json::Value> {
    vec![
        json!({"id": "number-0", "english": "one", "french": "un", "isPredefined": true}),
        json!({"id": "number-1", "english": "two", "french": "deux", "isPredefined": true}),
        json!({"id": "number-2", "english": "three", "french": "trois", "isPredefined": true}),
        json!({"id": "number-3", "english": "four", "french": "quatre", "isPredefined": true}),
        json!({"id": "number-4", "english": "five", "french": "cinq", "isPredefined": true}),
        json!({"id": "number-5", "english": "ten", "french": "dix", "isPredefined": true}),
        json!({"id": "number-6", "english": "twenty", "french": "vingt", "isPredefined": true}),
        json!({"id": "number-7", "english": "hundred", "french": "cent", "isPredefined": true}),
    ]
}
