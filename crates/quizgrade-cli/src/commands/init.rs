//! The `quizgrade init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizgrade.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("question-sets")?;
    write_if_missing(Path::new("question-sets/example.toml"), EXAMPLE_QUESTION_SET)?;
    write_if_missing(Path::new("question-sets/example-answers.json"), EXAMPLE_ANSWERS)?;

    println!("\nNext steps:");
    println!("  1. Run: quizgrade validate --question-set question-sets/example.toml");
    println!("  2. Run: quizgrade normalize --question-set question-sets/example.toml");
    println!("  3. Run: quizgrade grade --question-set question-sets/example.toml \\");
    println!("            --answers question-sets/example-answers.json");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgrade configuration

partial_credit_enabled = true
default_points = 1.0
output_format = "text"
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
id = "example"
name = "Example Question Set"
description = "A small question set to get started"

[[questions]]
id = "capital"
prompt = "What is the capital of France?"
question_type = "multiple_choice"
question_config = { options = ["Paris", "London", "Berlin"] }
correct_answer_data = { correctIndex = 0 }

[[questions]]
id = "moon-landing"
prompt = "In which year did humans first land on the Moon?"
points = 2
question_type = "year"
question_config = { tolerance = 5 }
correct_answer_data = { correctYear = 1969 }

[[questions]]
id = "primes"
prompt = "Select every prime number."
question_type = "multi_select"
question_config = { options = ["2", "4", "5", "9"] }
correct_answer_data = { correctIndices = [0, 2] }
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "capital": { "selectedIndex": 0 },
  "moon-landing": 1971,
  "primes": { "selectedIndices": [0, 1, 2] }
}
"#;
