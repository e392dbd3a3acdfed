//! The `lingodrill init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("lingodrill.toml").exists() {
        println!("lingodrill.toml already exists, skipping.");
    } else {
        std::fs::write("lingodrill.toml", SAMPLE_CONFIG)?;
        println!("Created lingodrill.toml");
    }

    std::fs::create_dir_all("content")?;
    let deck_path = Path::new("content/starter.toml");
    if deck_path.exists() {
        println!("content/starter.toml already exists, skipping.");
    } else {
        std::fs::write(deck_path, STARTER_DECK)?;
        println!("Created content/starter.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add words and grammar rules to content/");
    println!("  2. Run: lingodrill validate --content content");
    println!("  3. Run: lingodrill study --mode multiple-choice");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lingodrill configuration

default_question_count = 10
option_count = 4

[learning]
randomize_word_order = true
check_accents = true
check_capitalization = true
check_punctuation = true
skip_question_enabled = true
timer_enabled = true
remember_progress = true
show_example_sentence = true
show_pronunciation_audio = true

[storage]
dir = "./.lingodrill"
prefix = "app"

# Milliseconds feedback stays up before the next question.
[feedback]
choice_ms = 1500
free_text_ms = 2000
skip_ms = 500
"#;

const STARTER_DECK: &str = r#"[deck]
name = "Starter deck"
native_language = "Nederlands"
foreign_language = "Deutsch"
native_locale = "nl-NL"
foreign_locale = "de-DE"

[[words]]
id = "hund"
foreign = "der Hund"
native = "de hond"
category = "Dieren"
difficulty = "beginner"

[[words.examples]]
foreign = "Der Hund bellt."
native = "De hond blaft."

[[words]]
id = "katze"
foreign = "die Katze"
native = "de kat"
category = "Dieren"
difficulty = "beginner"

[[words]]
id = "haus"
foreign = "das Haus"
native = "het huis"
category = "Wonen"
difficulty = "beginner"

[[words]]
id = "buch"
foreign = "das Buch"
native = "het boek"
category = "School"
difficulty = "beginner"

[[rules]]
id = "articles"
title = "Lidwoorden"
description = "Duitse zelfstandige naamwoorden hebben der, die of das."
difficulty = "beginner"

[[rules.exercises]]
question = "___ Hund bellt."
options = ["Der", "Die", "Das"]
correct_answer = "Der"
explanation = "Hund is mannelijk: der Hund."

[[rules.exercises]]
question = "Vul in: ___ Buch ist neu."
correct_answer = "Das"
explanation = "Buch is onzijdig: das Buch."
"#;
