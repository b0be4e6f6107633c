// src/core/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The six fixed subject keys every verb conjugation table carries.
pub const SUBJECTS: [&str; 6] = ["je", "tu", "il", "nous", "vous", "ils"];

/// Id prefixes reserved for bundled/fallback content. User-authored records
/// must never be admitted with one of these (enforced on the write path).
pub const RESERVED_PREFIXES: [&str; 5] =
    ["word-", "verb-", "sentence-", "number-", "fallback-"];

pub fn has_reserved_prefix(id: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|p| id.starts_with(p))
}

/// The four content entity kinds, each backed by its own store collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Word,
    Verb,
    Sentence,
    Number,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Word, Kind::Verb, Kind::Sentence, Kind::Number];

    /// Store collection name for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Kind::Word => "words",
            Kind::Verb => "verbs",
            Kind::Sentence => "sentences",
            Kind::Number => "numbers",
        }
    }

    /// Reserved id prefix for bundled records of this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Kind::Word => "word-",
            Kind::Verb => "verb-",
            Kind::Sentence => "sentence-",
            Kind::Number => "number-",
        }
    }
}

/// Verb group on the wire is "1".."4"; four is the irregular catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerbGroup {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
    #[serde(rename = "4")]
    Irregular,
}

impl VerbGroup {
    /// Derives the group from the infinitive's ending.
    pub fn from_infinitive(infinitive: &str) -> Self {
        let inf = infinitive.trim();
        if inf.ends_with("er") {
            VerbGroup::First
        } else if inf.ends_with("ir") {
            VerbGroup::Second
        } else if inf.ends_with("re") {
            VerbGroup::Third
        } else {
            VerbGroup::Irregular
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(VerbGroup::First),
            "2" => Some(VerbGroup::Second),
            "3" => Some(VerbGroup::Third),
            "4" => Some(VerbGroup::Irregular),
            _ => None,
        }
    }
}

/// A complete conjugation table: all six subjects, each a non-empty list of
/// acceptable forms once normalized (placeholder `[""]` when repaired).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conjugations {
    pub je: Vec<String>,
    pub tu: Vec<String>,
    pub il: Vec<String>,
    pub nous: Vec<String>,
    pub vous: Vec<String>,
    pub ils: Vec<String>,
}

impl Conjugations {
    /// A table with every subject mapped to the empty-string placeholder.
    pub fn placeholder() -> Self {
        let blank = || vec![String::new()];
        Self {
            je: blank(),
            tu: blank(),
            il: blank(),
            nous: blank(),
            vous: blank(),
            ils: blank(),
        }
    }

    pub fn get(&self, subject: &str) -> Option<&[String]> {
        match subject {
            "je" => Some(&self.je),
            "tu" => Some(&self.tu),
            "il" => Some(&self.il),
            "nous" => Some(&self.nous),
            "vous" => Some(&self.vous),
            "ils" => Some(&self.ils),
            _ => None,
        }
    }

    /// True when every subject maps to a non-empty sequence.
    pub fn is_complete(&self) -> bool {
        SUBJECTS
            .iter()
            .all(|s| self.get(s).map(|forms| !forms.is_empty()).unwrap_or(false))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub english: String,
    pub french: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verb {
    pub id: String,
    pub english: String,
    pub infinitive: String,
    pub group: VerbGroup,
    pub conjugations: Conjugations,
    #[serde(default)]
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    pub english: String,
    pub french: Vec<String>,
    #[serde(default)]
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Number {
    pub id: String,
    pub english: String,
    pub french: Vec<String>,
    #[serde(default)]
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A canonical, normalized content record. Downstream code only ever sees
/// these; the normalizer is the single admission gate from raw documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Word(Word),
    Verb(Verb),
    Sentence(Sentence),
    Number(Number),
}

impl Record {
    pub fn kind(&self) -> Kind {
        match self {
            Record::Word(_) => Kind::Word,
            Record::Verb(_) => Kind::Verb,
            Record::Sentence(_) => Kind::Sentence,
            Record::Number(_) => Kind::Number,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Word(w) => &w.id,
            Record::Verb(v) => &v.id,
            Record::Sentence(s) => &s.id,
            Record::Number(n) => &n.id,
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            Record::Word(w) => w.id = id,
            Record::Verb(v) => v.id = id,
            Record::Sentence(s) => s.id = id,
            Record::Number(n) => n.id = id,
        }
    }

    pub fn english(&self) -> &str {
        match self {
            Record::Word(w) => &w.english,
            Record::Verb(v) => &v.english,
            Record::Sentence(s) => &s.english,
            Record::Number(n) => &n.english,
        }
    }

    /// Acceptable answers for a translation prompt: the french list, or the
    /// infinitive for verbs.
    pub fn answers(&self) -> Vec<String> {
        match self {
            Record::Word(w) => w.french.clone(),
            Record::Verb(v) => vec![v.infinitive.clone()],
            Record::Sentence(s) => s.french.clone(),
            Record::Number(n) => n.french.clone(),
        }
    }

    pub fn is_predefined(&self) -> bool {
        match self {
            Record::Word(w) => w.is_predefined,
            Record::Verb(v) => v.is_predefined,
            Record::Sentence(s) => s.is_predefined,
            Record::Number(n) => n.is_predefined,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::Word(w) => w.created_at,
            Record::Verb(v) => v.created_at,
            Record::Sentence(s) => s.created_at,
            Record::Number(n) => n.created_at,
        }
    }

    /// Serializes to the store's document shape. Collections are per-kind,
    /// so no variant tag ever appears on disk.
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Record::Word(w) => serde_json::to_value(w),
            Record::Verb(v) => serde_json::to_value(v),
            Record::Sentence(s) => serde_json::to_value(s),
            Record::Number(n) => serde_json::to_value(n),
        }
    }
}

/// A translation value as authored: either a bare string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// The loosely-shaped, pre-admission form of a record: fields present or
/// absent unpredictably, translations authored as string or list. Both the
/// bundled datasets and the store's documents deserialize into this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub id: Option<String>,
    pub english: Option<String>,
    pub french: Option<OneOrMany>,
    pub category: Option<String>,
    pub infinitive: Option<String>,
    pub group: Option<String>,
    pub conjugations: Option<HashMap<String, OneOrMany>>,
    pub is_predefined: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_derived_from_ending() {
        assert_eq!(VerbGroup::from_infinitive("parler"), VerbGroup::First);
        assert_eq!(VerbGroup::from_infinitive("finir"), VerbGroup::Second);
        assert_eq!(VerbGroup::from_infinitive("vendre"), VerbGroup::Third);
        assert_eq!(VerbGroup::from_infinitive("aller "), VerbGroup::First);
        assert_eq!(VerbGroup::from_infinitive("xyz"), VerbGroup::Irregular);
    }

    #[test]
    fn raw_record_accepts_string_or_list_french() {
        let raw: RawRecord =
            serde_json::from_value(serde_json::json!({"english": "cat", "french": "chat"}))
                .unwrap();
        assert_eq!(raw.french, Some(OneOrMany::One("chat".into())));

        let raw: RawRecord = serde_json::from_value(
            serde_json::json!({"english": "hello", "french": ["bonjour", "salut"]}),
        )
        .unwrap();
        assert_eq!(
            raw.french,
            Some(OneOrMany::Many(vec!["bonjour".into(), "salut".into()]))
        );
    }

    #[test]
    fn reserved_prefix_detection() {
        assert!(has_reserved_prefix("word-12"));
        assert!(has_reserved_prefix("fallback-w0"));
        assert!(!has_reserved_prefix("user-abc"));
    }

    #[test]
    fn verb_group_round_trips_as_digit_string() {
        let v = serde_json::to_value(VerbGroup::Irregular).unwrap();
        assert_eq!(v, serde_json::json!("4"));
        assert_eq!(VerbGroup::parse("2"), Some(VerbGroup::Second));
        assert_eq!(VerbGroup::parse("5"), None);
    }
}
