//! The letters the solver has typed, kept apart from the solution in the [Grid].

use crate::Pos;
use crate::grid::Grid;

/// What the solver has written in one square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entry {
  /// Always uppercase.
  pub letter: Option<char>,
  /// Set once a check has found this square correct. A locked square can't be changed.
  pub locked: bool,
}

/// One [Entry] per grid position, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries {
  cols: usize,
  entries: Vec<Entry>,
}

impl Entries {
  /// A blank entry layer the size of `grid`.
  pub fn for_grid(grid: &Grid) -> Self {
    let (rows, cols) = grid.size();
    Self {
      cols,
      entries: vec![Entry::default(); rows * cols],
    }
  }

  fn index(&self, (row, col): Pos) -> Option<usize> {
    if col >= self.cols {
      return None;
    }
    let index = row.checked_mul(self.cols)?.checked_add(col)?;
    (index < self.entries.len()).then_some(index)
  }

  /// The entry at `pos`. Positions outside the grid read as blank.
  pub fn get(&self, pos: Pos) -> Entry {
    self
      .index(pos)
      .map(|i| self.entries[i])
      .unwrap_or_default()
  }

  pub fn letter(&self, pos: Pos) -> Option<char> {
    self.get(pos).letter
  }

  pub fn is_blank(&self, pos: Pos) -> bool {
    self.letter(pos).is_none()
  }

  pub fn is_locked(&self, pos: Pos) -> bool {
    self.get(pos).locked
  }

  /// Writes an uppercased `letter` at `pos` unless the square is locked.
  /// Returns whether anything changed.
  pub(crate) fn set(&mut self, pos: Pos, letter: char) -> bool {
    let letter = letter.to_ascii_uppercase();
    match self.index(pos) {
      Some(i) if !self.entries[i].locked && self.entries[i].letter != Some(letter) => {
        self.entries[i].letter = Some(letter);
        true
      }
      _ => false,
    }
  }

  /// Erases the letter at `pos` unless the square is locked. Returns whether anything changed.
  pub(crate) fn clear(&mut self, pos: Pos) -> bool {
    match self.index(pos) {
      Some(i) if !self.entries[i].locked && self.entries[i].letter.is_some() => {
        self.entries[i].letter = None;
        true
      }
      _ => false,
    }
  }

  pub(crate) fn set_locked(&mut self, pos: Pos, locked: bool) {
    if let Some(i) = self.index(pos) {
      self.entries[i].locked = locked;
    }
  }
}
