//! Comparing the solver's letters with the solution.

use crate::Pos;
use crate::entries::Entries;
use crate::grid::Grid;
use std::collections::BTreeMap;

/// The outcome of checking one square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStatus {
  Correct,
  Incorrect,
  Empty,
}

/// The result of checking the whole grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
  per_cell: BTreeMap<Pos, CellStatus>,
  complete: bool,
}

impl Validation {
  /// The status of the cell at `pos`, or `None` if `pos` is not a cell.
  pub fn status(&self, pos: Pos) -> Option<CellStatus> {
    self.per_cell.get(&pos).copied()
  }

  /// Whether every cell is correct.
  pub fn is_complete(&self) -> bool {
    self.complete
  }

  /// Every cell with its status, in reading order.
  pub fn cells(&self) -> impl Iterator<Item = (Pos, CellStatus)> + '_ {
    self.per_cell.iter().map(|(&pos, &status)| (pos, status))
  }

  /// How many cells have the given status.
  pub fn count(&self, status: CellStatus) -> usize {
    self.per_cell.values().filter(|&&s| s == status).count()
  }
}

/// Checks every cell of `grid` against `entries`. Pure: nothing is locked here.
pub fn check(grid: &Grid, entries: &Entries) -> Validation {
  let per_cell: BTreeMap<Pos, CellStatus> = grid
    .cells()
    .map(|(pos, cell)| {
      let status = match entries.letter(pos) {
        None => CellStatus::Empty,
        Some(letter) if letter.to_ascii_uppercase() == cell.answer() => CellStatus::Correct,
        Some(_) => CellStatus::Incorrect,
      };
      (pos, status)
    })
    .collect();

  let complete = per_cell.values().all(|&s| s == CellStatus::Correct);
  Validation { per_cell, complete }
}

/// Locks the cells `validation` found correct and unlocks all others.
pub(crate) fn apply_locks(entries: &mut Entries, validation: &Validation) {
  for (pos, status) in validation.cells() {
    entries.set_locked(pos, status == CellStatus::Correct);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grid::tests::mini;

  fn solved() -> (Grid, Entries) {
    let grid = Grid::build(&mini()).unwrap();
    let mut entries = Entries::for_grid(&grid);
    for (pos, cell) in grid.cells() {
      entries.set(pos, cell.answer());
    }
    (grid, entries)
  }

  #[test]
  fn solved_grid_is_complete() {
    let (grid, entries) = solved();
    let validation = check(&grid, &entries);
    assert!(validation.is_complete());
    assert_eq!(validation.count(CellStatus::Correct), grid.cells().count());
    assert_eq!(validation.status((1, 1)), None);
  }

  #[test]
  fn one_wrong_letter_marks_one_cell() {
    let (grid, mut entries) = solved();
    entries.set((2, 2), 'X');

    let validation = check(&grid, &entries);
    assert!(!validation.is_complete());
    assert_eq!(validation.status((2, 2)), Some(CellStatus::Incorrect));
    assert_eq!(validation.count(CellStatus::Incorrect), 1);
    assert_eq!(validation.count(CellStatus::Correct), grid.cells().count() - 1);
  }

  #[test]
  fn blank_grid_is_all_empty() {
    let grid = Grid::build(&mini()).unwrap();
    let entries = Entries::for_grid(&grid);
    let validation = check(&grid, &entries);
    assert!(!validation.is_complete());
    assert_eq!(validation.count(CellStatus::Empty), grid.cells().count());
  }

  #[test]
  fn locks_follow_the_latest_check() {
    let grid = Grid::build(&mini()).unwrap();
    let mut entries = Entries::for_grid(&grid);
    entries.set((0, 0), 'C');
    entries.set((0, 1), 'X');

    let validation = check(&grid, &entries);
    apply_locks(&mut entries, &validation);
    assert!(entries.is_locked((0, 0)));
    assert!(!entries.is_locked((0, 1)));
    assert!(!entries.is_locked((0, 2)));
  }
}
