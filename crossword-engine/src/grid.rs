use crate::Direction::{self, Across, Down};
use crate::definition::{ClueSpec, PuzzleDefinition};
use crate::{Error, Pos};
use std::fmt::{Debug, Display};
use tracing::debug;

/// Identifies one word of the puzzle, e.g. 12 Down.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct WordRef {
  pub number: u32,
  pub direction: Direction,
}

impl Display for WordRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.number, self.direction)
  }
}

/// A square of the grid where a letter belongs. Positions not covered by any clue
/// have no `Cell` at all.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Cell {
  answer: char,
  clue_number: Option<u32>,
  across: Option<u32>,
  down: Option<u32>,
}

impl Cell {
  /// The letter the solution has here.
  pub fn answer(&self) -> char {
    self.answer
  }

  /// The number printed in this square, if a word starts here.
  pub fn clue_number(&self) -> Option<u32> {
    self.clue_number
  }

  /// The number of the word running through this cell in the given direction.
  pub fn word(&self, direction: Direction) -> Option<u32> {
    match direction {
      Across => self.across,
      Down => self.down,
    }
  }

  /// Whether some word runs through this cell in the given direction.
  pub fn supports(&self, direction: Direction) -> bool {
    self.word(direction).is_some()
  }

}

/// The letter grid of a puzzle, addressed by `(row, col)`. Built once from a
/// [PuzzleDefinition] and never modified afterwards.
#[derive(Clone, Eq, PartialEq)]
pub struct Grid {
  rows: usize,
  cols: usize,
  /// Row-major.
  cells: Vec<Option<Cell>>,
}

impl Grid {
  /// Lays out every clue of the definition. Across clues are placed before down clues,
  /// so where an across and a down answer disagree about a shared square, the down
  /// answer's letter is the one that ends up in the grid.
  pub fn build(definition: &PuzzleDefinition) -> Result<Self, Error> {
    let (rows, cols) = (definition.rows, definition.cols);
    let size = rows.checked_mul(cols).ok_or_else(|| {
      Error::SchemaError(format!("grid size {rows}x{cols} is too large"))
    })?;
    for clue in definition.clues() {
      check_bounds(clue, rows, cols)?;
    }

    let mut grid = Self {
      rows,
      cols,
      cells: vec![None; size],
    };

    for clue in definition.clues() {
      grid.place(clue)?;
    }

    debug!(
      rows,
      cols,
      cells = grid.cells.iter().flatten().count(),
      "built grid"
    );
    Ok(grid)
  }

  fn place(&mut self, clue: &ClueSpec) -> Result<(), Error> {
    let cols = self.cols;
    for (i, letter) in clue.answer.chars().enumerate() {
      let pos = clue.direction.step(clue.start(), i);
      let cell = self.cells[pos.0 * cols + pos.1].get_or_insert(Cell {
        answer: letter,
        clue_number: None,
        across: None,
        down: None,
      });
      cell.answer = letter;

      let slot = match clue.direction {
        Across => &mut cell.across,
        Down => &mut cell.down,
      };
      match *slot {
        Some(other) if other != clue.number => {
          return Err(Error::SchemaError(format!(
            "{} {} and {} {} both cover square {:?}",
            other, clue.direction, clue.number, clue.direction, pos
          )));
        }
        _ => *slot = Some(clue.number),
      }

      if i == 0 && cell.clue_number.is_none() {
        cell.clue_number = Some(clue.number);
      }
    }
    Ok(())
  }

  /// The size of this grid, expressed as (rows, cols).
  pub fn size(&self) -> (usize, usize) {
    (self.rows, self.cols)
  }

  /// An iterator over all the positions of this grid, from left to right and top to bottom.
  pub fn positions(&self) -> GridPosIter {
    GridPosIter::new(self.size())
  }

  /// Every cell of the grid with its position, in reading order.
  pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> {
    self
      .positions()
      .zip(self.cells.iter())
      .filter_map(|(pos, cell)| cell.as_ref().map(|cell| (pos, cell)))
  }

  /// Returns the [Cell] at the given [Pos], or `None` for blocked or out-of-range positions.
  pub fn get(&self, (r, c): Pos) -> Option<&Cell> {
    if r >= self.rows || c >= self.cols {
      return None;
    }
    self.cells[r * self.cols + c].as_ref()
  }

  /// Whether there is a cell at `pos`.
  pub fn contains(&self, pos: Pos) -> bool {
    self.get(pos).is_some()
  }

  /// The cell immediately above `pos`, if there is one.
  pub fn up_neighbor(&self, (row, col): Pos) -> Option<Pos> {
    let pos = (row.checked_sub(1)?, col);
    self.contains(pos).then_some(pos)
  }

  /// The cell immediately below `pos`, if there is one.
  pub fn down_neighbor(&self, (row, col): Pos) -> Option<Pos> {
    let pos = (row.checked_add(1)?, col);
    self.contains(pos).then_some(pos)
  }

  /// The cell immediately to the left of `pos`, if there is one.
  pub fn left_neighbor(&self, (row, col): Pos) -> Option<Pos> {
    let pos = (row, col.checked_sub(1)?);
    self.contains(pos).then_some(pos)
  }

  /// The cell immediately to the right of `pos`, if there is one.
  pub fn right_neighbor(&self, (row, col): Pos) -> Option<Pos> {
    let pos = (row, col.checked_add(1)?);
    self.contains(pos).then_some(pos)
  }

  /// The cell one step back from `pos` when reading in `direction`.
  pub fn previous(&self, pos: Pos, direction: Direction) -> Option<Pos> {
    match direction {
      Across => self.left_neighbor(pos),
      Down => self.up_neighbor(pos),
    }
  }
}

fn check_bounds(clue: &ClueSpec, rows: usize, cols: usize) -> Result<(), Error> {
  let (row, col) = clue.start();
  let fits = match clue.direction {
    Across => row < rows && col < cols && clue.len() <= cols - col,
    Down => col < cols && row < rows && clue.len() <= rows - row,
  };
  if fits {
    Ok(())
  } else {
    Err(Error::BoundsError {
      word: WordRef {
        number: clue.number,
        direction: clue.direction,
      },
      start: clue.start(),
      len: clue.len(),
      rows,
      cols,
    })
  }
}

/// A square where two crossing answers want different letters.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Conflict {
  pub pos: Pos,
  pub across: (WordRef, char),
  pub down: (WordRef, char),
}

/// Finds every square where an across answer and a down answer disagree. The grid
/// builder tolerates these (the down letter wins), so this is only a diagnostic for
/// whoever produced the puzzle.
pub fn conflicts(definition: &PuzzleDefinition) -> Vec<Conflict> {
  let mut conflicts = Vec::new();
  for across in &definition.clues.across {
    for down in &definition.clues.down {
      let (row, col) = (across.row, down.col);
      let i = col.wrapping_sub(across.col);
      let j = row.wrapping_sub(down.row);
      if i >= across.len() || j >= down.len() {
        continue;
      }
      let (a, d) = (across.answer.as_bytes()[i], down.answer.as_bytes()[j]);
      if a != d {
        conflicts.push(Conflict {
          pos: (row, col),
          across: (
            WordRef {
              number: across.number,
              direction: Across,
            },
            a as char,
          ),
          down: (
            WordRef {
              number: down.number,
              direction: Down,
            },
            d as char,
          ),
        });
      }
    }
  }
  conflicts
}

/// Iterator over all the positions in the grid.
pub struct GridPosIter {
  pos: Pos,
  size: (usize, usize),
}

impl GridPosIter {
  fn new(size: (usize, usize)) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for GridPosIter {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (rows, cols) = self.size;
    let (row, col) = self.pos;

    if row == rows || cols == 0 {
      return None;
    }

    if col == cols - 1 {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in self.cells.chunks(self.cols) {
      for cell in row {
        match cell {
          Some(cell) => write!(f, "{}", cell.answer)?,
          None => write!(f, "■")?,
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

/// A validated definition together with the grid built from it. This is the
/// immutable part of a loaded puzzle.
#[derive(Debug, Clone)]
pub struct Board {
  definition: PuzzleDefinition,
  grid: Grid,
}

impl Board {
  /// Validates the definition and builds its grid. Fails with [Error::SchemaError] or
  /// [Error::BoundsError] if the definition can't be laid out.
  pub fn new(definition: PuzzleDefinition) -> Result<Self, Error> {
    definition.validate()?;
    let grid = Grid::build(&definition)?;
    Ok(Self { definition, grid })
  }

  pub fn definition(&self) -> &PuzzleDefinition {
    &self.definition
  }

  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn into_definition(self) -> PuzzleDefinition {
    self.definition
  }
}
