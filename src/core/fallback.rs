// File: src/core/fallback.rs
//
// Minimal hard-coded dataset served when the store or the load pipeline
// fails outright. Already normalized, pure, never fails: the application
// must never render with zero content.

use chrono::Utc;

use crate::core::types::{Conjugations, Kind, Number, Record, Sentence, Verb, VerbGroup, Word};

/// 2–3 ready-to-serve records per kind.
pub fn fallback(kind: Kind) -> Vec<Record> {
    let now = Utc::now();
    match kind {
        Kind::Word => vec![
            Record::Word(Word {
                id: "fallback-w0".into(),
                english: "hello".into(),
                french: vec!["bonjour".into()],
                category: "general".into(),
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
            Record::Word(Word {
                id: "fallback-w1".into(),
                english: "yes".into(),
                french: vec!["oui".into()],
                category: "general".into(),
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
            Record::Word(Word {
                id: "fallback-w2".into(),
                english: "no".into(),
                french: vec!["non".into()],
                category: "general".into(),
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
        ],
        Kind::Verb => vec![
            Record::Verb(Verb {
                id: "fallback-v0".into(),
                english: "to be".into(),
                infinitive: "être".into(),
                group: VerbGroup::Irregular,
                conjugations: Conjugations {
                    je: vec!["suis".into()],
                    tu: vec!["es".into()],
                    il: vec!["est".into()],
                    nous: vec!["sommes".into()],
                    vous: vec!["êtes".into()],
                    ils: vec!["sont".into()],
                },
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
            Record::Verb(Verb {
                id: "fallback-v1".into(),
                english: "to speak".into(),
                infinitive: "parler".into(),
                group: VerbGroup::First,
                conjugations: Conjugations {
                    je: vec!["parle".into()],
                    tu: vec!["parles".into()],
                    il: vec!["parle".into()],
                    nous: vec!["parlons".into()],
                    vous: vec!["parlez".into()],
                    ils: vec!["parlent".into()],
                },
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
        ],
        Kind::Sentence => vec![
            Record::Sentence(Sentence {
                id: "fallback-s0".into(),
                english: "How are you?".into(),
                french: vec!["Comment ça va ?".into()],
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
            Record::Sentence(Sentence {
                id: "fallback-s1".into(),
                english: "Thank you very much.".into(),
                french: vec!["Merci beaucoup.".into()],
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
        ],
        Kind::Number => vec![
            Record::Number(Number {
                id: "fallback-n0".into(),
                english: "one".into(),
                french: vec!["un".into()],
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
            Record::Number(Number {
                id: "fallback-n1".into(),
                english: "two".into(),
                french: vec!["deux".into()],
                is_predefined: true,
                created_at: now,
                updated_at: now,
            }),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_nonempty_fallback() {
        for kind in Kind::ALL {
            let records = fallback(kind);
            assert!((2..=3).contains(&records.len()), "{kind:?}");
            for rec in records {
                assert_eq!(rec.kind(), kind);
                assert!(rec.id().starts_with("fallback-"));
                assert!(rec.is_predefined());
            }
        }
    }

    #[test]
    fn fallback_verbs_have_complete_tables() {
        for rec in fallback(Kind::Verb) {
            match rec {
                Record::Verb(v) => assert!(v.conjugations.is_complete()),
                other => panic!("expected verb, got {other:?}"),
            }
        }
    }
}
