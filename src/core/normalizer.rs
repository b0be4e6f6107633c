// File: src/core/normalizer.rs
//
// The single admission gate: every record entering a snapshot (bundled,
// persisted, or user-authored) passes through `normalize` first. Pure and
// idempotent, so re-normalizing a stored record is always safe.

use chrono::Utc;
use thiserror::Error;

use crate::core::types::{
    Conjugations, Kind, Number, OneOrMany, RawRecord, Record, Sentence, Verb, VerbGroup, Word,
};

/// A record that stays structurally unusable after every repair was tried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRecord {
    #[error("missing or empty `english`")]
    MissingEnglish,
    #[error("missing or empty `french` translations")]
    MissingFrench,
    #[error("missing or empty `infinitive`")]
    MissingInfinitive,
}

/// Validates and repairs a raw record into the canonical shape for `kind`.
///
/// Recoverable defects are fixed in place: string translations become
/// one-element lists, missing conjugation subjects get the `[""]`
/// placeholder, absent timestamps are stamped now. Unrecoverable ones
/// (`english`/`infinitive`/`french` truly absent) are rejected.
pub fn normalize(kind: Kind, raw: RawRecord) -> Result<Record, InvalidRecord> {
    match kind {
        Kind::Word => {
            let (english, french) = translation_fields(&raw)?;
            Ok(Record::Word(Word {
                id: raw.id.clone().unwrap_or_default(),
                english,
                french,
                category: raw
                    .category
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "general".to_string()),
                is_predefined: raw.is_predefined.unwrap_or(false),
                created_at: raw.created_at.unwrap_or_else(Utc::now),
                updated_at: raw.updated_at.unwrap_or_else(Utc::now),
            }))
        }
        Kind::Sentence => {
            let (english, french) = translation_fields(&raw)?;
            Ok(Record::Sentence(Sentence {
                id: raw.id.clone().unwrap_or_default(),
                english,
                french,
                is_predefined: raw.is_predefined.unwrap_or(false),
                created_at: raw.created_at.unwrap_or_else(Utc::now),
                updated_at: raw.updated_at.unwrap_or_else(Utc::now),
            }))
        }
        Kind::Number => {
            let (english, french) = translation_fields(&raw)?;
            Ok(Record::Number(Number {
                id: raw.id.clone().unwrap_or_default(),
                english,
                french,
                is_predefined: raw.is_predefined.unwrap_or(false),
                created_at: raw.created_at.unwrap_or_else(Utc::now),
                updated_at: raw.updated_at.unwrap_or_else(Utc::now),
            }))
        }
        Kind::Verb => normalize_verb(raw),
    }
}

fn translation_fields(raw: &RawRecord) -> Result<(String, Vec<String>), InvalidRecord> {
    let english = raw
        .english
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(InvalidRecord::MissingEnglish)?
        .to_string();

    let french = match raw.french.clone() {
        Some(value) => value.into_vec(),
        None => return Err(InvalidRecord::MissingFrench),
    };
    if french.is_empty() {
        return Err(InvalidRecord::MissingFrench);
    }
    Ok((english, french))
}

fn normalize_verb(raw: RawRecord) -> Result<Record, InvalidRecord> {
    let infinitive = raw
        .infinitive
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .ok_or(InvalidRecord::MissingInfinitive)?
        .to_string();

    let english = raw
        .english
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(InvalidRecord::MissingEnglish)?
        .to_string();

    let group = raw
        .group
        .as_deref()
        .and_then(VerbGroup::parse)
        .unwrap_or_else(|| VerbGroup::from_infinitive(&infinitive));

    // A verb is never admitted half-formed: absent table -> all placeholder,
    // partial table -> only the missing subjects filled.
    let conjugations = match raw.conjugations {
        None => Conjugations::placeholder(),
        Some(mut map) => {
            let mut subject = |key: &str| -> Vec<String> {
                match map.remove(key).map(OneOrMany::into_vec) {
                    Some(forms) if !forms.is_empty() => forms,
                    _ => vec![String::new()],
                }
            };
            Conjugations {
                je: subject("je"),
                tu: subject("tu"),
                il: subject("il"),
                nous: subject("nous"),
                vous: subject("vous"),
                ils: subject("ils"),
            }
        }
    };

    Ok(Record::Verb(Verb {
        id: raw.id.unwrap_or_default(),
        english,
        infinitive,
        group,
        conjugations,
        is_predefined: raw.is_predefined.unwrap_or(false),
        created_at: raw.created_at.unwrap_or_else(Utc::now),
        updated_at: raw.updated_at.unwrap_or_else(Utc::now),
    }))
}
