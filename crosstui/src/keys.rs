//! Secret key sequences that open the admin panel and the developer overlays.
//! Typing `~` (or a backtick) starts a sequence; letters typed after it go here
//! instead of into the grid until a code matches or the sequence gets too long.

/// What a recognized sequence asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {
  ToggleAdmin,
  /// Dev mode with the answers shown.
  DevAnswers,
  ToggleDev,
  StopDev,
}

const CODES: [(&str, Secret); 4] = [
  ("~asd", Secret::ToggleAdmin),
  ("~ans", Secret::DevAnswers),
  ("~dev", Secret::ToggleDev),
  ("~sdev", Secret::StopDev),
];

const MAX_LEN: usize = 10;

#[derive(Debug, Default)]
pub struct KeySequence {
  buffer: String,
}

impl KeySequence {
  /// Whether a sequence has been started, so keys should come here.
  pub fn is_armed(&self) -> bool {
    !self.buffer.is_empty()
  }

  pub fn reset(&mut self) {
    self.buffer.clear();
  }

  /// Adds a key to the sequence. Returns the secret if this key completed one.
  pub fn push(&mut self, key: char) -> Option<Secret> {
    let key = match key {
      '`' | '~' => '~',
      c => c.to_ascii_lowercase(),
    };

    if key == '~' {
      self.buffer.clear();
    } else if self.buffer.is_empty() {
      return None;
    }
    self.buffer.push(key);

    if let Some(&(_, secret)) = CODES.iter().find(|(code, _)| self.buffer.ends_with(code)) {
      self.buffer.clear();
      return Some(secret);
    }
    if self.buffer.len() > MAX_LEN {
      self.buffer.clear();
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn type_keys(keys: &mut KeySequence, text: &str) -> Vec<Secret> {
    text.chars().filter_map(|c| keys.push(c)).collect()
  }

  #[test]
  fn recognizes_codes() {
    let mut keys = KeySequence::default();
    assert_eq!(type_keys(&mut keys, "~asd"), [Secret::ToggleAdmin]);
    assert!(!keys.is_armed());
    assert_eq!(type_keys(&mut keys, "`DEV"), [Secret::ToggleDev]);
    assert_eq!(type_keys(&mut keys, "~ans"), [Secret::DevAnswers]);
    assert_eq!(type_keys(&mut keys, "~sdev"), [Secret::StopDev]);
  }

  #[test]
  fn ignores_keys_until_armed() {
    let mut keys = KeySequence::default();
    assert!(type_keys(&mut keys, "asd").is_empty());
    assert!(!keys.is_armed());
    keys.push('~');
    assert!(keys.is_armed());
  }

  #[test]
  fn tilde_restarts_the_sequence() {
    let mut keys = KeySequence::default();
    assert_eq!(type_keys(&mut keys, "~as~asd"), [Secret::ToggleAdmin]);
  }

  #[test]
  fn long_sequences_reset() {
    let mut keys = KeySequence::default();
    assert!(type_keys(&mut keys, "~abcdefghij").is_empty());
    assert!(!keys.is_armed());
    assert!(type_keys(&mut keys, "dev").is_empty());
  }
}
