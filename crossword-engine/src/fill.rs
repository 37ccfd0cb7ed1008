//! Typing a whole word at once.

use crate::Error;
use crate::definition::ClueSpec;
use crate::entries::Entries;

/// Writes `text` into the squares of `word`. `text` must be empty (nothing happens) or
/// exactly as long as the word; on any error no square is touched. Locked squares
/// keep their letter.
pub(crate) fn fill(entries: &mut Entries, word: &ClueSpec, text: &str) -> Result<bool, Error> {
  let letters: Vec<char> = text.chars().collect();
  if letters.is_empty() {
    return Ok(false);
  }
  if letters.len() != word.len() {
    return Err(Error::LengthMismatchError {
      expected: word.len(),
      actual: letters.len(),
    });
  }
  if let Some(&c) = letters.iter().find(|c| !c.is_ascii_alphabetic()) {
    return Err(Error::NotALetterError(c));
  }

  let mut changed = false;
  for (pos, letter) in word.span().zip(letters) {
    changed |= entries.set(pos, letter);
  }
  Ok(changed)
}
