//! Where puzzle definitions come from.

use crate::Error;
use crate::definition::PuzzleDefinition;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Puzzle difficulty tiers, easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
  Expert,
}

impl Difficulty {
  pub const ALL: [Difficulty; 4] = [
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Expert,
  ];

  /// The tier for a 1-based level: each tier lasts `levels_per_tier` levels, and
  /// everything past the last tier stays at [Difficulty::Expert].
  pub fn for_level(level: u32, levels_per_tier: u32) -> Self {
    let tier = level.saturating_sub(1) / levels_per_tier.max(1);
    let last = Self::ALL.len() - 1;
    Self::ALL[(tier as usize).min(last)]
  }

  /// The lowercase name used in file names and query strings.
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
      Difficulty::Expert => "expert",
    }
  }
}

impl Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Something that can produce a puzzle of a given difficulty. Implementations report
/// transport failures as [Error::NetworkError] and bad documents as [Error::SchemaError].
pub trait PuzzleSource {
  fn fetch(&self, difficulty: Difficulty) -> Result<PuzzleDefinition, Error>;

  /// A short description for logs and the admin panel.
  fn describe(&self) -> String;
}

/// Reads static puzzle documents from a directory: `<difficulty>.json` if it exists,
/// otherwise `puzzle.json`.
#[derive(Debug, Clone)]
pub struct FileSource {
  dir: PathBuf,
}

impl FileSource {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, difficulty: Difficulty) -> PathBuf {
    let tiered = self.dir.join(format!("{difficulty}.json"));
    if tiered.is_file() {
      tiered
    } else {
      self.dir.join("puzzle.json")
    }
  }
}

impl PuzzleSource for FileSource {
  fn fetch(&self, difficulty: Difficulty) -> Result<PuzzleDefinition, Error> {
    let path = self.path_for(difficulty);
    debug!(path = %path.display(), %difficulty, "reading puzzle");
    let json = fs::read_to_string(&path)
      .map_err(|e| Error::NetworkError(format!("{}: {}", path.display(), e)))?;
    PuzzleDefinition::from_json(&json)
  }

  fn describe(&self) -> String {
    format!("directory {}", self.dir.display())
  }
}
