use crate::Direction::{Across, Down};
use crate::definition::ClueSpec;
use crate::entries::Entries;
use crate::grid::{Board, Cell, Grid};
use crate::{Direction, Pos};
use tracing::debug;

/// Where the user is typing: the focused square and the direction of the word they
/// are entering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorState {
  pub pos: Pos,
  pub direction: Direction,
}

/// The four arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
  Up,
  Down,
  Left,
  Right,
}

/// The interaction state machine. Before the first focus there is no position, only
/// the direction (across) that the first focus will start from.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Cursor {
  pos: Option<Pos>,
  direction: Direction,
}

impl Default for Cursor {
  fn default() -> Self {
    Self {
      pos: None,
      direction: Across,
    }
  }
}

impl Cursor {
  pub(crate) fn state(&self) -> Option<CursorState> {
    self.pos.map(|pos| CursorState {
      pos,
      direction: self.direction,
    })
  }

  pub(crate) fn pos(&self) -> Option<Pos> {
    self.pos
  }

  /// Focuses `pos`. Focusing the square that already has focus swaps direction, if the
  /// square has words both ways. Returns whether the state changed.
  pub(crate) fn focus(&mut self, grid: &Grid, pos: Pos) -> bool {
    let Some(cell) = grid.get(pos) else {
      return false;
    };
    let before = self.state();

    if self.pos == Some(pos) {
      if cell.supports(Across) && cell.supports(Down) {
        self.direction = !self.direction;
      }
    } else {
      self.pos = Some(pos);
      self.adjust_direction(cell);
    }

    debug!(?pos, direction = ?self.direction, "focus");
    self.state() != before
  }

  /// Moves one square in the direction of the arrow if there is a cell there.
  /// Returns whether the cursor moved.
  pub(crate) fn arrow(&mut self, grid: &Grid, arrow: Arrow) -> bool {
    let Some(pos) = self.pos else {
      return false;
    };
    let next = match arrow {
      Arrow::Up => grid.up_neighbor(pos),
      Arrow::Down => grid.down_neighbor(pos),
      Arrow::Left => grid.left_neighbor(pos),
      Arrow::Right => grid.right_neighbor(pos),
    };
    match next {
      Some(next) => self.focus(grid, next),
      None => false,
    }
  }

  /// If the current direction has no word at `cell`, switch to the one that does.
  fn adjust_direction(&mut self, cell: &Cell) {
    if !cell.supports(self.direction) {
      self.direction = if cell.supports(Across) { Across } else { Down };
    }
  }

  /// After a letter was typed at `from`: moves to the next blank, unlocked square
  /// of the active word after `from`. Stays put if there is none.
  pub(crate) fn advance(&mut self, board: &Board, entries: &Entries, from: Pos) -> bool {
    let Some(word) = board.resolve(from, self.direction) else {
      return false;
    };
    let Some(index) = word.index_of(from) else {
      return false;
    };
    let next = word
      .span()
      .skip(index + 1)
      .find(|&pos| entries.is_blank(pos) && !entries.is_locked(pos));

    match next {
      Some(pos) => self.focus(board.grid(), pos),
      None => false,
    }
  }

  /// Moves back one square along the current direction, unless `from` is the first
  /// square of the active word.
  pub(crate) fn backup(&mut self, board: &Board, from: Pos) -> bool {
    if let Some(word) = board.resolve(from, self.direction) {
      if word.start() == from {
        return false;
      }
    }
    match board.grid().previous(from, self.direction) {
      Some(pos) => self.focus(board.grid(), pos),
      None => false,
    }
  }

  /// Puts the cursor on the first square of `clue`, facing the clue's direction.
  pub(crate) fn select(&mut self, clue: &ClueSpec) -> bool {
    let before = self.state();
    self.pos = Some(clue.start());
    self.direction = clue.direction;
    debug!(number = clue.number, direction = ?clue.direction, "selected clue");
    self.state() != before
  }

  /// Selects the clue listed after the active one (across list, then down list,
  /// wrapping around), or the first clue if there is no active word.
  pub(crate) fn next_clue(&mut self, board: &Board) -> bool {
    self.step_clue(board, 1)
  }

  /// Selects the clue listed before the active one.
  pub(crate) fn previous_clue(&mut self, board: &Board) -> bool {
    self.step_clue(board, -1)
  }

  fn step_clue(&mut self, board: &Board, step: isize) -> bool {
    let clues: Vec<&ClueSpec> = board.definition().clues().collect();
    if clues.is_empty() {
      return false;
    }

    let active = self
      .pos
      .and_then(|pos| board.resolve(pos, self.direction))
      .and_then(|active| clues.iter().position(|clue| *clue == active));

    let len = clues.len() as isize;
    let target = match active {
      Some(i) => (i as isize + step).rem_euclid(len) as usize,
      None if step > 0 => 0,
      None => clues.len() - 1,
    };
    self.select(clues[target])
  }
}
