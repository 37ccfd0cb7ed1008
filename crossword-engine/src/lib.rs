//! This crate is meant to be used as the foundation for a crossword puzzle app.
//! It provides no UI itself, but see `crosstui` for an example of how you can use it
//! to produce a crossword app.
//!
//! Puzzles are described by a [PuzzleDefinition]: the grid size and a list of across
//! and down clues, each with its position and answer, usually loaded from a JSON
//! document (see [PuzzleDefinition::from_json]). A [Puzzle] lays the clues out on a
//! [Grid], tracks the solver's cursor and letters, and reports back whenever
//! something the UI shows has changed.

use Direction::{Across, Down};
use serde::Deserialize;
use std::fmt::Debug;
use std::fmt::Display;
use std::ops::Not;
use thiserror::Error;
use tracing::{debug, info};

mod check;
mod cursor;
mod definition;
mod entries;
mod fill;
mod grid;
mod prefetch;
mod source;
mod word;

pub use check::{CellStatus, Validation};
pub use cursor::{Arrow, CursorState};
pub use definition::{ClueSpec, Clues, MAX_SIDE, PuzzleDefinition};
pub use entries::{Entries, Entry};
pub use grid::{Board, Cell, Conflict, Grid, GridPosIter, WordRef, conflicts};
pub use prefetch::{PrefetchConfig, Prefetcher};
pub use source::{Difficulty, FileSource, PuzzleSource};
pub use word::Span;

use cursor::Cursor;

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Across,
  Down,
}

impl Direction {
  /// The position `n` squares from `pos` when reading in this direction.
  pub fn step(self, (row, col): Pos, n: usize) -> Pos {
    match self {
      Across => (row, col + n),
      Down => (row + n, col),
    }
  }
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Across => write!(f, "Across"),
      Down => write!(f, "Down"),
    }
  }
}

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);

/// Represents a crossword puzzle being solved: the grid, the cursor, and the letters
/// entered so far. When implementing a crossword app, this will be the main
/// structure you will use.
pub struct Puzzle {
  board: Board,
  cursor: Cursor,
  entries: Entries,
  redraw: Option<Box<dyn FnMut()>>,
}

impl Debug for Puzzle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Puzzle")
      .field("board", &self.board)
      .field("cursor", &self.cursor)
      .field("entries", &self.entries)
      .finish_non_exhaustive()
  }
}

impl Puzzle {
  /// Builds a puzzle from a definition, with a blank grid and no cursor.
  pub fn new(definition: PuzzleDefinition) -> Result<Self, Error> {
    let board = Board::new(definition)?;
    info!(title = %board.definition().title, "loaded puzzle");
    Ok(Self {
      entries: Entries::for_grid(board.grid()),
      cursor: Cursor::default(),
      board,
      redraw: None,
    })
  }

  /// Builds a puzzle from a JSON puzzle document.
  pub fn from_json(json: &str) -> Result<Self, Error> {
    Self::new(PuzzleDefinition::from_json(json)?)
  }

  /// Replaces the current puzzle with a new one. If the definition is rejected, the
  /// current puzzle is left exactly as it was.
  pub fn load(&mut self, definition: PuzzleDefinition) -> Result<(), Error> {
    let Self {
      board,
      cursor,
      entries,
      ..
    } = Self::new(definition)?;
    self.board = board;
    self.cursor = cursor;
    self.entries = entries;
    self.notify();
    Ok(())
  }

  /// Registers the function to call whenever the grid, the cursor, the entered letters
  /// or the highlighted word change. Replaces any previous listener.
  pub fn on_redraw(&mut self, listener: impl FnMut() + 'static) {
    self.redraw = Some(Box::new(listener));
  }

  fn notify(&mut self) {
    if let Some(redraw) = self.redraw.as_mut() {
      redraw();
    }
  }

  fn notify_if(&mut self, changed: bool) {
    if changed {
      self.notify();
    }
  }

  pub fn title(&self) -> &str {
    &self.board.definition().title
  }

  pub fn definition(&self) -> &PuzzleDefinition {
    self.board.definition()
  }

  /// Returns a reference to the puzzle grid, which holds the solution.
  pub fn grid(&self) -> &Grid {
    self.board.grid()
  }

  /// Returns the letters entered so far.
  pub fn entries(&self) -> &Entries {
    &self.entries
  }

  /// The cursor, or `None` if nothing has been focused since the puzzle was loaded.
  pub fn cursor(&self) -> Option<CursorState> {
    self.cursor.state()
  }

  /// The clue of the word the cursor is in.
  pub fn active_word(&self) -> Option<&ClueSpec> {
    let CursorState { pos, direction } = self.cursor.state()?;
    self.board.resolve(pos, direction)
  }

  /// Returns the text of the clue corresponding to the cursor.
  pub fn current_clue(&self) -> Option<&str> {
    self.active_word().map(|clue| clue.clue.as_str())
  }

  /// Whether the square at `pos` is part of the active word.
  pub fn is_highlighted(&self, pos: Pos) -> bool {
    self.active_word().is_some_and(|word| word.covers(pos))
  }

  /// Determines how a particular square should be styled.
  /// See [SquareStyle].
  pub fn square_style(&self, pos: Pos) -> SquareStyle {
    if !self.grid().contains(pos) {
      SquareStyle::Blocked
    } else if self.cursor.pos() == Some(pos) {
      SquareStyle::Cursor
    } else if self.is_highlighted(pos) {
      SquareStyle::Word
    } else {
      SquareStyle::Standard
    }
  }

  /// Whether the puzzle is fully filled in, and matches the solution.
  pub fn is_solved(&self) -> bool {
    check::check(self.grid(), &self.entries).is_complete()
  }

  /// The user focused the square at `pos` (clicked it, for instance). Focusing the
  /// square that already has the cursor swaps direction where both directions have
  /// a word.
  pub fn focus(&mut self, pos: Pos) {
    let changed = self.cursor.focus(self.board.grid(), pos);
    self.notify_if(changed);
  }

  /// Moves the cursor one square, if there is a square there. Returns whether the
  /// key was used.
  pub fn arrow(&mut self, arrow: Arrow) -> bool {
    let moved = self.cursor.arrow(self.board.grid(), arrow);
    self.notify_if(moved);
    moved
  }

  /// Writes the given letter at `pos`, then moves the cursor to the next empty square
  /// of the active word after `pos`, if there is one. Anything but an ASCII letter is
  /// ignored, as is typing into a locked square.
  pub fn enter_character(&mut self, pos: Pos, letter: char) {
    if !letter.is_ascii_alphabetic() {
      debug!(?letter, "ignoring non-letter");
      return;
    }
    if !self.grid().contains(pos) || self.entries.is_locked(pos) {
      return;
    }

    let mut changed = false;
    if self.cursor.pos() != Some(pos) {
      changed |= self.cursor.focus(self.board.grid(), pos);
    }
    changed |= self.entries.set(pos, letter);
    changed |= self.cursor.advance(&self.board, &self.entries, pos);
    self.notify_if(changed);
  }

  /// Erases the letter at `pos`. If there is nothing to erase (or the square is
  /// locked), moves the cursor back one square instead, unless `pos` starts the
  /// active word.
  pub fn backspace(&mut self, pos: Pos) {
    if !self.grid().contains(pos) {
      return;
    }

    let mut changed = false;
    if self.cursor.pos() != Some(pos) {
      changed |= self.cursor.focus(self.board.grid(), pos);
    }
    if self.entries.clear(pos) {
      changed = true;
    } else {
      changed |= self.cursor.backup(&self.board, pos);
    }
    self.notify_if(changed);
  }

  /// Checks every square. Squares found correct are locked so they can't be changed
  /// again; every other square is unlocked.
  pub fn check(&mut self) -> Validation {
    let validation = check::check(self.board.grid(), &self.entries);
    check::apply_locks(&mut self.entries, &validation);
    info!(
      correct = validation.count(CellStatus::Correct),
      incorrect = validation.count(CellStatus::Incorrect),
      empty = validation.count(CellStatus::Empty),
      complete = validation.is_complete(),
      "checked puzzle"
    );
    self.notify();
    validation
  }

  /// Types `text` into every square of `word`. Fails with
  /// [Error::LengthMismatchError] unless `text` is empty or exactly as long as the
  /// word, in which case nothing is changed.
  pub fn fill_word(&mut self, word: WordRef, text: &str) -> Result<(), Error> {
    let clue = self
      .board
      .definition()
      .clue(word.number, word.direction)
      .ok_or(Error::UnknownClueError(word))?;
    let changed = fill::fill(&mut self.entries, clue, text)?;
    self.notify_if(changed);
    Ok(())
  }

  /// [Puzzle::fill_word] for the active word. Does nothing if there is no active word.
  pub fn fill_active_word(&mut self, text: &str) -> Result<(), Error> {
    match self.active_word().map(ClueSpec::word_ref) {
      Some(word) => self.fill_word(word, text),
      None => Ok(()),
    }
  }

  /// Puts the cursor at the start of the given clue's word, facing its direction.
  pub fn select_clue(&mut self, word: WordRef) -> Result<(), Error> {
    let clue = self
      .board
      .definition()
      .clue(word.number, word.direction)
      .ok_or(Error::UnknownClueError(word))?;
    let changed = self.cursor.select(clue);
    self.notify_if(changed);
    Ok(())
  }

  /// Moves to the start of the next clue: through the across clues, then the down
  /// clues, then back around.
  pub fn next_clue(&mut self) {
    let changed = self.cursor.next_clue(&self.board);
    self.notify_if(changed);
  }

  /// Moves to the start of the previous clue.
  pub fn previous_clue(&mut self) {
    let changed = self.cursor.previous_clue(&self.board);
    self.notify_if(changed);
  }
}

/// Indicates how a particular square should look. For instance, [Standard](Self::Standard)
/// might map to white, [Cursor](Self::Cursor) to yellow, and [Word](Self::Word) to gray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareStyle {
  /// No letter goes here.
  Blocked,
  /// Default styling
  Standard,
  /// The cursor is positioned on this square.
  Cursor,
  /// The cursor is not on this square, but the word indicated by the cursor includes this square.
  Word,
}

/// The errors that may be produced by functions in this crate.
#[derive(Debug, Error)]
pub enum Error {
  /// A puzzle document or definition is missing fields or has malformed ones.
  #[error("malformed puzzle: {0}")]
  SchemaError(String),
  /// A word doesn't fit inside the grid.
  #[error("{word} at {start:?} is {len} letters long and doesn't fit in a {rows}x{cols} grid")]
  BoundsError {
    word: WordRef,
    start: Pos,
    len: usize,
    rows: usize,
    cols: usize,
  },
  /// Text for a word has a different number of letters than the word.
  #[error("expected {expected} letters but got {actual}")]
  LengthMismatchError { expected: usize, actual: usize },
  /// Text for a word contains something other than a letter.
  #[error("'{0}' is not a letter")]
  NotALetterError(char),
  /// The puzzle has no such clue.
  #[error("there is no {0} clue")]
  UnknownClueError(WordRef),
  /// A puzzle could not be fetched.
  #[error("could not fetch puzzle: {0}")]
  NetworkError(String),
  /// An [I/O error](std::io::Error) occurred.
  #[error(transparent)]
  IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::tests::{clue, mini};
  use std::cell::Cell as Counter;
  use std::rc::Rc;

  fn at(pos: Pos, direction: Direction) -> Option<CursorState> {
    Some(CursorState { pos, direction })
  }

  fn type_word(puzzle: &mut Puzzle, start: Pos, word: &str) {
    puzzle.focus(start);
    for letter in word.chars() {
      let pos = puzzle.cursor().unwrap().pos;
      puzzle.enter_character(pos, letter);
    }
  }

  fn solve(puzzle: &mut Puzzle) {
    let answers: Vec<_> = puzzle
      .grid()
      .cells()
      .map(|(pos, cell)| (pos, cell.answer()))
      .collect();
    for (pos, letter) in answers {
      puzzle.enter_character(pos, letter);
    }
  }

  #[test]
  fn typing_fills_the_word_and_advances() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.focus((0, 0));

    puzzle.enter_character((0, 0), 'c');
    assert_eq!(puzzle.entries().letter((0, 0)), Some('C'));
    assert_eq!(puzzle.cursor(), at((0, 1), Across));

    for letter in "rane".chars() {
      let pos = puzzle.cursor().unwrap().pos;
      puzzle.enter_character(pos, letter);
    }
    assert_eq!(puzzle.cursor(), at((0, 4), Across));
    let word: String = (0..5)
      .filter_map(|c| puzzle.entries().letter((0, c)))
      .collect();
    assert_eq!(word, "CRANE");
  }

  #[test]
  fn typing_skips_letters_already_there() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.enter_character((2, 2), 'T');
    puzzle.enter_character((2, 3), 'A');

    puzzle.focus((2, 0));
    puzzle.focus((2, 0));
    puzzle.focus((2, 0));
    assert_eq!(puzzle.cursor(), at((2, 0), Across));
    puzzle.enter_character((2, 0), 'T');
    puzzle.enter_character((2, 1), 'O');
    assert_eq!(puzzle.cursor(), at((2, 4), Across));
  }

  #[test]
  fn non_letters_are_ignored() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.focus((0, 0));
    puzzle.enter_character((0, 0), '7');
    puzzle.enter_character((0, 0), ' ');
    assert!(puzzle.entries().is_blank((0, 0)));
    assert_eq!(puzzle.cursor(), at((0, 0), Across));

    puzzle.enter_character((1, 1), 'A');
    assert!(puzzle.entries().is_blank((1, 1)));
  }

  #[test]
  fn backspace_clears_then_moves_back() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    type_word(&mut puzzle, (0, 0), "CRA");
    assert_eq!(puzzle.cursor(), at((0, 3), Across));

    // Nothing at (0, 3): move back without touching (0, 2).
    puzzle.backspace((0, 3));
    assert_eq!(puzzle.cursor(), at((0, 2), Across));
    assert_eq!(puzzle.entries().letter((0, 2)), Some('A'));

    // Something at (0, 2): clear it and stay.
    puzzle.backspace((0, 2));
    assert_eq!(puzzle.cursor(), at((0, 2), Across));
    assert!(puzzle.entries().is_blank((0, 2)));

    puzzle.backspace((0, 2));
    puzzle.backspace((0, 1));
    puzzle.backspace((0, 1));
    assert_eq!(puzzle.cursor(), at((0, 0), Across));
    puzzle.backspace((0, 0));
    assert!(puzzle.entries().is_blank((0, 0)));

    // Start of the word with nothing to erase.
    puzzle.backspace((0, 0));
    assert_eq!(puzzle.cursor(), at((0, 0), Across));
  }

  #[test]
  fn backspace_runs_down_words_too() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.focus((2, 4));
    assert_eq!(puzzle.cursor(), at((2, 4), Across));
    puzzle.focus((2, 4));
    assert_eq!(puzzle.cursor(), at((2, 4), Down));

    puzzle.backspace((2, 4));
    assert_eq!(puzzle.cursor(), at((1, 4), Down));
    puzzle.backspace((1, 4));
    assert_eq!(puzzle.cursor(), at((0, 4), Down));
    puzzle.backspace((0, 4));
    assert_eq!(puzzle.cursor(), at((0, 4), Down));
  }

  #[test]
  fn check_reports_and_locks() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    solve(&mut puzzle);
    assert!(puzzle.is_solved());

    let validation = puzzle.check();
    assert!(validation.is_complete());
    assert_eq!(
      validation.count(CellStatus::Correct),
      puzzle.grid().cells().count()
    );
    assert!(puzzle.entries().is_locked((1, 0)));
  }

  #[test]
  fn one_wrong_letter_is_the_only_incorrect_cell() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    solve(&mut puzzle);
    let all_correct = check::check(puzzle.grid(), puzzle.entries());

    puzzle.enter_character((2, 1), 'X');
    let validation = puzzle.check();
    assert!(!validation.is_complete());
    for (pos, status) in validation.cells() {
      if pos == (2, 1) {
        assert_eq!(status, CellStatus::Incorrect);
      } else {
        assert_eq!(Some(status), all_correct.status(pos));
      }
    }
    assert!(!puzzle.entries().is_locked((2, 1)));
  }

  #[test]
  fn locked_squares_refuse_edits() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    type_word(&mut puzzle, (0, 0), "CRXNE");
    puzzle.check();

    puzzle.enter_character((0, 0), 'Z');
    assert_eq!(puzzle.entries().letter((0, 0)), Some('C'));

    // Backspace on a locked square moves back instead of erasing.
    puzzle.focus((0, 1));
    puzzle.backspace((0, 1));
    assert_eq!(puzzle.entries().letter((0, 1)), Some('R'));
    assert_eq!(puzzle.cursor(), at((0, 0), Across));

    // The wrong square stays editable.
    puzzle.enter_character((0, 2), 'A');
    assert_eq!(puzzle.entries().letter((0, 2)), Some('A'));
    assert!(!puzzle.check().is_complete());
  }

  #[test]
  fn advance_skips_locked_squares() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.enter_character((0, 2), 'A');
    puzzle.check();
    assert!(puzzle.entries().is_locked((0, 2)));

    puzzle.focus((0, 0));
    puzzle.enter_character((0, 0), 'C');
    puzzle.enter_character((0, 1), 'R');
    assert_eq!(puzzle.cursor(), at((0, 3), Across));
  }

  #[test]
  fn fill_word_checks_length() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    let crane = WordRef {
      number: 1,
      direction: Across,
    };

    assert!(matches!(
      puzzle.fill_word(crane, "CRANES"),
      Err(Error::LengthMismatchError {
        expected: 5,
        actual: 6
      })
    ));
    assert!(puzzle.grid().cells().all(|(pos, _)| puzzle.entries().is_blank(pos)));

    puzzle.fill_word(crane, "crane").unwrap();
    assert_eq!(puzzle.entries().letter((0, 4)), Some('E'));

    let missing = WordRef {
      number: 9,
      direction: Down,
    };
    assert!(matches!(
      puzzle.fill_word(missing, "A"),
      Err(Error::UnknownClueError(_))
    ));
  }

  #[test]
  fn fill_active_word_uses_the_cursor() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.fill_active_word("CAT").unwrap();
    assert!(puzzle.entries().is_blank((0, 0)));

    puzzle.focus((1, 0));
    puzzle.fill_active_word("CAT").unwrap();
    assert_eq!(puzzle.entries().letter((2, 0)), Some('T'));
    assert_eq!(puzzle.cursor(), at((1, 0), Down));
  }

  #[test]
  fn highlight_follows_the_active_word() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    assert_eq!(puzzle.square_style((0, 0)), SquareStyle::Standard);
    assert_eq!(puzzle.square_style((1, 1)), SquareStyle::Blocked);
    assert!(puzzle.current_clue().is_none());

    puzzle.focus((0, 4));
    assert_eq!(puzzle.square_style((0, 4)), SquareStyle::Cursor);
    assert_eq!(puzzle.square_style((0, 0)), SquareStyle::Word);
    assert_eq!(puzzle.square_style((1, 4)), SquareStyle::Standard);
    assert_eq!(puzzle.current_clue(), Some("Clue for 1 Across"));

    puzzle.focus((0, 4));
    assert_eq!(puzzle.square_style((1, 4)), SquareStyle::Word);
    assert_eq!(puzzle.square_style((0, 0)), SquareStyle::Standard);
    assert_eq!(puzzle.current_clue(), Some("Clue for 2 Down"));
  }

  #[test]
  fn select_clue_faces_its_direction() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    puzzle.focus((0, 0));
    puzzle
      .select_clue(WordRef {
        number: 1,
        direction: Down,
      })
      .unwrap();
    assert_eq!(puzzle.cursor(), at((0, 0), Down));
    assert_eq!(puzzle.active_word().unwrap().answer, "CAT");
  }

  #[test]
  fn failed_load_keeps_the_current_puzzle() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    type_word(&mut puzzle, (0, 0), "CR");

    let mut bad = mini();
    bad.clues.across.push(clue(4, Across, (1, 1), "TOOLONG"));
    assert!(matches!(
      puzzle.load(bad),
      Err(Error::BoundsError { .. })
    ));
    assert_eq!(puzzle.title(), "Mini");
    assert_eq!(puzzle.entries().letter((0, 1)), Some('R'));
    assert_eq!(puzzle.cursor(), at((0, 2), Across));
  }

  #[test]
  fn documents_with_huge_coordinates_are_rejected() {
    let json = r#"{
      "metadata": { "title": "Far away", "size": { "rows": 3, "cols": 3 } },
      "clues": {
        "across": [
          { "number": 1, "row": 0, "col": 18446744073709551615, "answer": "CAT", "clue": "Pet" }
        ]
      }
    }"#;
    assert!(matches!(
      Puzzle::from_json(json),
      Err(Error::BoundsError { .. })
    ));
  }

  #[test]
  fn load_resets_everything() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    type_word(&mut puzzle, (2, 0), "TO");
    puzzle.focus((0, 0));
    puzzle.focus((0, 0));

    let mut next = mini();
    next.title = "Next".to_string();
    puzzle.load(next).unwrap();
    assert_eq!(puzzle.title(), "Next");
    assert_eq!(puzzle.cursor(), None);
    assert!(puzzle.entries().is_blank((2, 0)));

    // The first focus after a load starts out across again.
    puzzle.focus((0, 0));
    assert_eq!(puzzle.cursor(), at((0, 0), Across));
  }

  #[test]
  fn redraw_is_requested_only_on_change() {
    let mut puzzle = Puzzle::new(mini()).unwrap();
    let redraws = Rc::new(Counter::new(0));
    let counter = Rc::clone(&redraws);
    puzzle.on_redraw(move || counter.set(counter.get() + 1));

    puzzle.focus((1, 1));
    assert_eq!(redraws.get(), 0);
    puzzle.focus((0, 0));
    assert_eq!(redraws.get(), 1);
    assert!(!puzzle.arrow(Arrow::Up));
    assert_eq!(redraws.get(), 1);
    assert!(puzzle.arrow(Arrow::Right));
    assert_eq!(redraws.get(), 2);
    puzzle.enter_character((0, 1), 'R');
    assert_eq!(redraws.get(), 3);
    puzzle.check();
    assert_eq!(redraws.get(), 4);
    puzzle.load(mini()).unwrap();
    assert_eq!(redraws.get(), 5);
  }
}
