use crossterm::style::Stylize;
use std::io::{stdin, stdout, Write};
use trainer_core::core::engine::{ContentEngine, LoadState};
use trainer_core::core::types::{Kind, RawRecord, Record};

const STORE_DIR: &str = "trainer_data";

fn main() {
    env_logger::init();

    let mut engine = ContentEngine::new(STORE_DIR);
    engine.initialize(Some("local"));

    println!("{}", "French Smart Trainer. Type 'exit' to quit.".bold());
    println!("Commands: [Enter] next word, 'add <english> = <french>', 'verbs', 'status'.");
    println!("---------------------------------------------------------------");

    let mut current: Option<Record> = None;
    loop {
        if current.is_none() {
            current = engine.next_item(Kind::Word);
        }
        if let Some(item) = &current {
            println!("\nTranslate: {}", item.english().bold().cyan());
        } else {
            println!("\nNo content available.");
        }
        print!("> ");
        stdout().flush().unwrap();

        let mut input = String::new();
        stdin().read_line(&mut input).unwrap();
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "status" => {
                for status in engine.cache_status() {
                    let state = match status.state {
                        LoadState::Ready => "ready".green(),
                        LoadState::Degraded => "degraded".red(),
                        _ => "pending".yellow(),
                    };
                    println!("  {:?}: {} records ({})", status.kind, status.count, state);
                }
            }
            "verbs" => {
                for rec in engine.get_all(Kind::Verb) {
                    if let Record::Verb(v) = rec {
                        println!("  {} ({}) group {:?}", v.infinitive, v.english, v.group);
                    }
                }
            }
            s if s.starts_with("add ") => match parse_add(&s[4..]) {
                Some(raw) => match engine.add(Kind::Word, raw) {
                    Ok(rec) => println!("{} {}", "Added".green(), rec.id()),
                    Err(e) => println!("{} {}", "Rejected:".red(), e),
                },
                None => println!("Usage: add <english> = <french>"),
            },
            answer => {
                if let Some(item) = current.take() {
                    let correct = item
                        .answers()
                        .iter()
                        .any(|a| a.eq_ignore_ascii_case(answer));
                    if correct {
                        println!("{}", "Correct!".green());
                    } else {
                        println!("{} {}", "Answer:".yellow(), item.answers().join(" / "));
                    }
                    engine.mark_seen(Kind::Word, item.id());
                }
            }
        }
    }
}

fn parse_add(spec: &str) -> Option<RawRecord> {
    let (english, french) = spec.split_once('=')?;
    let mut raw = RawRecord::default();
    raw.english = Some(english.trim().to_string());
    raw.french = Some(trainer_core::core::types::OneOrMany::One(
        french.trim().to_string(),
    ));
    Some(raw)
}
