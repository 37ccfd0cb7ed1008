//! Puzzle definitions: the clue lists a puzzle is built from, and the JSON
//! documents they are delivered in.

use crate::Direction::{self, Across, Down};
use crate::{Error, Pos};
use serde::Deserialize;
use std::collections::HashSet;

/// The largest number of rows or columns a puzzle may have.
pub const MAX_SIDE: usize = 256;

/// One word of a puzzle: where it starts, which way it runs, its answer and its clue text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueSpec {
  pub number: u32,
  pub direction: Direction,
  pub row: usize,
  pub col: usize,
  /// Uppercase ASCII letters only.
  pub answer: String,
  pub clue: String,
}

impl ClueSpec {
  /// The position of the first letter of this word.
  pub fn start(&self) -> Pos {
    (self.row, self.col)
  }

  /// Number of letters in the answer.
  pub fn len(&self) -> usize {
    self.answer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.answer.is_empty()
  }
}

/// The across and down clue lists of a puzzle, each in the order they are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clues {
  pub across: Vec<ClueSpec>,
  pub down: Vec<ClueSpec>,
}

/// Everything needed to build a puzzle. A definition is only data: it has not been
/// checked against its own dimensions until a [Board](crate::Board) is built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDefinition {
  pub title: String,
  pub rows: usize,
  pub cols: usize,
  pub clues: Clues,
}

impl PuzzleDefinition {
  /// Decodes a puzzle document. Answers are uppercased; anything else that does not
  /// look like a puzzle is reported as [Error::SchemaError].
  pub fn from_json(json: &str) -> Result<Self, Error> {
    let raw: RawPuzzle =
      serde_json::from_str(json).map_err(|e| Error::SchemaError(e.to_string()))?;

    let definition = Self {
      title: raw.metadata.title,
      rows: raw.metadata.size.rows,
      cols: raw.metadata.size.cols,
      clues: Clues {
        across: convert_clues(raw.clues.across, Across)?,
        down: convert_clues(raw.clues.down, Down)?,
      },
    };
    definition.validate()?;
    Ok(definition)
  }

  /// All clues: the across list followed by the down list.
  pub fn clues(&self) -> impl Iterator<Item = &ClueSpec> {
    self.clues.across.iter().chain(self.clues.down.iter())
  }

  /// The clue list for one direction.
  pub fn clue_list(&self, direction: Direction) -> &[ClueSpec] {
    match direction {
      Across => &self.clues.across,
      Down => &self.clues.down,
    }
  }

  /// Looks up a clue by its number and direction, e.g. `clue(12, Down)`.
  pub fn clue(&self, number: u32, direction: Direction) -> Option<&ClueSpec> {
    self
      .clue_list(direction)
      .iter()
      .find(|clue| clue.number == number)
  }

  /// Checks the parts of the definition that don't depend on geometry: dimensions are
  /// positive, answers are non-empty uppercase letters, every clue sits in the list
  /// for its direction, and no clue is listed twice.
  pub fn validate(&self) -> Result<(), Error> {
    if self.rows == 0 || self.cols == 0 {
      return Err(Error::SchemaError(format!(
        "grid size must be positive, got {}x{}",
        self.rows, self.cols
      )));
    }
    if self.rows > MAX_SIDE || self.cols > MAX_SIDE {
      return Err(Error::SchemaError(format!(
        "grid size {}x{} is larger than {MAX_SIDE}x{MAX_SIDE}",
        self.rows, self.cols
      )));
    }

    let mut seen = HashSet::new();
    for direction in [Across, Down] {
      for clue in self.clue_list(direction) {
        if clue.direction != direction {
          return Err(Error::SchemaError(format!(
            "{} {} is listed with the {} clues",
            clue.number, clue.direction, direction
          )));
        }
        if clue.number == 0 {
          return Err(Error::SchemaError(format!(
            "clue numbers start at 1, got 0 {direction}"
          )));
        }
        if clue.answer.is_empty() {
          return Err(Error::SchemaError(format!(
            "{} {} has an empty answer",
            clue.number, direction
          )));
        }
        if let Some(c) = clue.answer.chars().find(|c| !c.is_ascii_uppercase()) {
          return Err(Error::SchemaError(format!(
            "answer to {} {} contains '{}', expected only the letters A-Z",
            clue.number, direction, c
          )));
        }
        if !seen.insert((clue.number, direction)) {
          return Err(Error::SchemaError(format!(
            "{} {} is defined more than once",
            clue.number, direction
          )));
        }
      }
    }

    Ok(())
  }
}

fn convert_clues(raw: Vec<RawClue>, direction: Direction) -> Result<Vec<ClueSpec>, Error> {
  raw
    .into_iter()
    .map(|clue| {
      if let Some(stated) = clue.direction {
        if stated != direction {
          return Err(Error::SchemaError(format!(
            "{} {} is listed with the {} clues",
            clue.number, stated, direction
          )));
        }
      }
      Ok(ClueSpec {
        number: clue.number,
        direction,
        row: clue.row,
        col: clue.col,
        answer: clue.answer.to_ascii_uppercase(),
        clue: clue.clue,
      })
    })
    .collect()
}

#[derive(Deserialize)]
struct RawPuzzle {
  metadata: RawMetadata,
  clues: RawClues,
}

#[derive(Deserialize)]
struct RawMetadata {
  #[serde(default)]
  title: String,
  size: RawSize,
}

#[derive(Deserialize)]
struct RawSize {
  rows: usize,
  cols: usize,
}

#[derive(Deserialize)]
struct RawClues {
  #[serde(default)]
  across: Vec<RawClue>,
  #[serde(default)]
  down: Vec<RawClue>,
}

#[derive(Deserialize)]
struct RawClue {
  number: u32,
  row: usize,
  col: usize,
  answer: String,
  #[serde(default)]
  clue: String,
  #[serde(default)]
  direction: Option<Direction>,
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINI: &str = r#"{
    "metadata": { "title": "Mini", "size": { "rows": 3, "cols": 5 } },
    "clues": {
      "across": [
        { "number": 1, "row": 0, "col": 0, "answer": "crane", "clue": "Wading bird", "direction": "across" },
        { "number": 3, "row": 2, "col": 0, "answer": "TOTAL", "clue": "Sum" }
      ],
      "down": [
        { "number": 1, "row": 0, "col": 0, "answer": "CAT", "clue": "Mouser", "direction": "down" },
        { "number": 2, "row": 0, "col": 4, "answer": "EEL", "clue": "Slippery fish" }
      ]
    }
  }"#;

  #[test]
  fn parses_wire_format() {
    let definition = PuzzleDefinition::from_json(MINI).unwrap();

    assert_eq!(definition.title, "Mini");
    assert_eq!((definition.rows, definition.cols), (3, 5));
    assert_eq!(definition.clues.across.len(), 2);
    assert_eq!(definition.clues.down.len(), 2);

    let crane = definition.clue(1, Across).unwrap();
    assert_eq!(crane.answer, "CRANE");
    assert_eq!(crane.start(), (0, 0));
    assert_eq!(crane.clue, "Wading bird");

    let eel = definition.clue(2, Down).unwrap();
    assert_eq!(eel.direction, Down);
    assert_eq!(eel.start(), (0, 4));
    assert!(definition.clue(2, Across).is_none());

    let numbers: Vec<_> = definition.clues().map(|c| (c.number, c.direction)).collect();
    assert_eq!(numbers, [(1, Across), (3, Across), (1, Down), (2, Down)]);
  }

  #[test]
  fn missing_fields_are_schema_errors() {
    let json = r#"{ "metadata": { "title": "x" }, "clues": {} }"#;
    assert!(matches!(
      PuzzleDefinition::from_json(json),
      Err(Error::SchemaError(_))
    ));

    assert!(matches!(
      PuzzleDefinition::from_json("not json"),
      Err(Error::SchemaError(_))
    ));
  }

  #[test]
  fn negative_coordinates_are_schema_errors() {
    let json = r#"{
      "metadata": { "size": { "rows": 3, "cols": 3 } },
      "clues": { "across": [ { "number": 1, "row": -1, "col": 0, "answer": "ABC" } ] }
    }"#;
    assert!(matches!(
      PuzzleDefinition::from_json(json),
      Err(Error::SchemaError(_))
    ));
  }

  #[test]
  fn clue_in_wrong_list_is_rejected() {
    let json = r#"{
      "metadata": { "size": { "rows": 3, "cols": 3 } },
      "clues": { "across": [ { "number": 1, "row": 0, "col": 0, "answer": "ABC", "direction": "down" } ] }
    }"#;
    assert!(matches!(
      PuzzleDefinition::from_json(json),
      Err(Error::SchemaError(_))
    ));
  }

  #[test]
  fn answers_must_be_letters() {
    let json = r#"{
      "metadata": { "size": { "rows": 3, "cols": 3 } },
      "clues": { "across": [ { "number": 1, "row": 0, "col": 0, "answer": "A-B" } ] }
    }"#;
    let err = PuzzleDefinition::from_json(json).unwrap_err();
    assert!(err.to_string().contains("'-'"), "{err}");

    let json = r#"{
      "metadata": { "size": { "rows": 3, "cols": 3 } },
      "clues": { "across": [ { "number": 1, "row": 0, "col": 0, "answer": "" } ] }
    }"#;
    assert!(matches!(
      PuzzleDefinition::from_json(json),
      Err(Error::SchemaError(_))
    ));
  }

  #[test]
  fn duplicate_clues_are_rejected() {
    let json = r#"{
      "metadata": { "size": { "rows": 3, "cols": 3 } },
      "clues": { "across": [
        { "number": 1, "row": 0, "col": 0, "answer": "ABC" },
        { "number": 1, "row": 1, "col": 0, "answer": "DEF" }
      ] }
    }"#;
    assert!(matches!(
      PuzzleDefinition::from_json(json),
      Err(Error::SchemaError(_))
    ));
  }

  #[test]
  fn empty_grid_is_rejected() {
    let json = r#"{ "metadata": { "size": { "rows": 0, "cols": 4 } }, "clues": {} }"#;
    assert!(matches!(
      PuzzleDefinition::from_json(json),
      Err(Error::SchemaError(_))
    ));
  }

  #[test]
  fn oversized_grids_are_rejected() {
    for size in ["4294967296", "1000000", "257"] {
      let json = format!(
        r#"{{ "metadata": {{ "size": {{ "rows": {size}, "cols": {size} }} }}, "clues": {{}} }}"#
      );
      assert!(
        matches!(PuzzleDefinition::from_json(&json), Err(Error::SchemaError(_))),
        "{size}"
      );
    }
    let json = r#"{ "metadata": { "size": { "rows": 256, "cols": 1 } }, "clues": {} }"#;
    assert!(PuzzleDefinition::from_json(json).is_ok());
  }
}
