use crossword_engine::{Error, Puzzle, PuzzleDefinition, conflicts};
use std::env;
use std::fs;
use std::process::ExitCode;
use tracing::{info, warn};

fn load_puzzle(path: &str) -> Result<Puzzle, Error> {
  let json = fs::read_to_string(path)?;
  let definition = PuzzleDefinition::from_json(&json)?;
  for conflict in conflicts(&definition) {
    warn!(
      "{}: {} wants '{}' at {:?} but {} wants '{}'",
      path, conflict.across.0, conflict.across.1, conflict.pos, conflict.down.0, conflict.down.1
    );
  }
  Puzzle::new(definition)
}

fn usage(args: &[String]) -> String {
  let program = args.first().map_or("crossword-engine", String::as_str);
  format!("Usage: {program} <puzzle.json | directory>")
}

/// A simple CLI for checking puzzle files before publishing them
fn main() -> Result<ExitCode, Error> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into()),
    )
    .with_writer(std::io::stderr)
    .init();

  let args: Vec<String> = env::args().collect();
  let Some(path) = args.get(1) else {
    eprintln!("{}", usage(&args));
    return Ok(ExitCode::FAILURE);
  };

  if fs::metadata(path)?.is_dir() {
    let mut success = 0;
    let mut failure = 0;

    for entry in fs::read_dir(path)? {
      let puzzle_path = entry?.path();
      if puzzle_path.extension().is_none_or(|ext| ext != "json") {
        continue;
      }
      if let Some(p) = puzzle_path.to_str() {
        match load_puzzle(p) {
          Ok(puzzle) => {
            println!("Loaded '{}' successfully from {}", puzzle.title(), p);
            success += 1;
          }
          Err(e) => {
            println!("Failed with {} from {}", e, p);
            failure += 1;
          }
        }
      }
    }
    info!(success, failure, "checked directory");
    println!("{success} loaded, {failure} failed");
    if failure > 0 {
      return Ok(ExitCode::FAILURE);
    }
  } else {
    match load_puzzle(path) {
      Ok(puzzle) => {
        let definition = puzzle.definition();
        println!(
          "Loaded '{}' successfully: {}x{}, {} across and {} down clues",
          puzzle.title(),
          definition.rows,
          definition.cols,
          definition.clues.across.len(),
          definition.clues.down.len()
        );
        println!("{}", puzzle.grid());
      }
      Err(e) => {
        println!("Failed with: {}", e);
        return Ok(ExitCode::FAILURE);
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn usage_names_the_program() {
    let args = vec!["./validate".to_string()];
    assert_eq!(usage(&args), "Usage: ./validate <puzzle.json | directory>");
    assert_eq!(usage(&[]), "Usage: crossword-engine <puzzle.json | directory>");
  }
}
