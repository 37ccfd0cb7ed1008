//! Finding the word a square belongs to, and the squares a word covers.

use crate::definition::ClueSpec;
use crate::grid::{Board, WordRef};
use crate::{Direction, Pos};

impl Board {
  /// The clue whose word runs through `pos` in `direction`, or `None` if `pos` is
  /// not a cell or no word passes through it that way.
  pub fn resolve(&self, pos: Pos, direction: Direction) -> Option<&ClueSpec> {
    let number = self.grid().get(pos)?.word(direction)?;
    self.definition().clue(number, direction)
  }
}

impl ClueSpec {
  /// The positions of this word's letters, in reading order.
  pub fn span(&self) -> Span {
    Span {
      start: self.start(),
      direction: self.direction,
      index: 0,
      len: self.len(),
    }
  }

  /// How far into this word `pos` is, or `None` if the word doesn't cover `pos`.
  pub fn index_of(&self, (row, col): Pos) -> Option<usize> {
    let index = match self.direction {
      Direction::Across if row == self.row => col.checked_sub(self.col)?,
      Direction::Down if col == self.col => row.checked_sub(self.row)?,
      _ => return None,
    };
    (index < self.len()).then_some(index)
  }

  /// Whether this word covers `pos`.
  pub fn covers(&self, pos: Pos) -> bool {
    self.index_of(pos).is_some()
  }

  pub fn word_ref(&self) -> WordRef {
    WordRef {
      number: self.number,
      direction: self.direction,
    }
  }
}

/// Iterator over the positions of a word. See [ClueSpec::span].
#[derive(Debug, Clone)]
pub struct Span {
  start: Pos,
  direction: Direction,
  index: usize,
  len: usize,
}

impl Iterator for Span {
  type Item = Pos;

  fn next(&mut self) -> Option<Pos> {
    if self.index == self.len {
      return None;
    }
    let pos = self.direction.step(self.start, self.index);
    self.index += 1;
    Some(pos)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.len - self.index;
    (remaining, Some(remaining))
  }
}

impl ExactSizeIterator for Span {}
