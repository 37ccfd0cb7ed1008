use crossword_engine::{Difficulty, Error, PuzzleDefinition, PuzzleSource};
use std::time::Duration;
use tracing::debug;

/// Fetches puzzles from a generation endpoint: `GET <endpoint>?difficulty=<tier>`.
#[derive(Debug)]
pub struct HttpSource {
  client: reqwest::blocking::Client,
  endpoint: String,
}

impl HttpSource {
  pub fn new(endpoint: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(timeout)
      .build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
    })
  }
}

impl PuzzleSource for HttpSource {
  fn fetch(&self, difficulty: Difficulty) -> Result<PuzzleDefinition, Error> {
    debug!(endpoint = %self.endpoint, %difficulty, "requesting puzzle");
    let body = self
      .client
      .get(&self.endpoint)
      .query(&[("difficulty", difficulty.as_str())])
      .send()
      .and_then(|response| response.error_for_status())
      .and_then(|response| response.text())
      .map_err(|e| Error::NetworkError(e.to_string()))?;
    PuzzleDefinition::from_json(&body)
  }

  fn describe(&self) -> String {
    format!("endpoint {}", self.endpoint)
  }
}
