//! Fetching the next puzzle in the background while the current one is being solved.

use crate::definition::PuzzleDefinition;
use crate::grid::Board;
use crate::source::{Difficulty, PuzzleSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retry behavior for background fetches.
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
  /// How long to wait after a failed attempt before trying again.
  pub retry_delay: Duration,
  /// Attempts per request, including the first. At least one attempt is always made.
  pub max_attempts: u32,
}

impl Default for PrefetchConfig {
  fn default() -> Self {
    Self {
      retry_delay: Duration::from_secs(2),
      max_attempts: 5,
    }
  }
}

/// Fetches one puzzle at a time on a worker thread. The host calls [Prefetcher::request]
/// when it knows what it will need next, and [Prefetcher::take] when it needs it.
/// Nothing here blocks the caller.
pub struct Prefetcher<S: ?Sized> {
  source: Arc<S>,
  config: PrefetchConfig,
  in_flight: Arc<AtomicBool>,
  sender: Sender<(Difficulty, PuzzleDefinition)>,
  receiver: Receiver<(Difficulty, PuzzleDefinition)>,
  ready: Option<(Difficulty, PuzzleDefinition)>,
}

impl<S> Prefetcher<S>
where
  S: PuzzleSource + Send + Sync + ?Sized + 'static,
{
  pub fn new(source: Arc<S>, config: PrefetchConfig) -> Self {
    let (sender, receiver) = mpsc::channel();
    Self {
      source,
      config,
      in_flight: Arc::new(AtomicBool::new(false)),
      sender,
      receiver,
      ready: None,
    }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Whether a fetch is running right now.
  pub fn is_in_flight(&self) -> bool {
    self.in_flight.load(Ordering::Acquire)
  }

  /// Starts fetching a puzzle of the given difficulty, unless a fetch is already
  /// running or one of that difficulty is already waiting. Returns whether a fetch
  /// was started.
  pub fn request(&mut self, difficulty: Difficulty) -> bool {
    if self.is_ready(difficulty) {
      debug!(%difficulty, "prefetch already satisfied");
      return false;
    }
    if self.in_flight.swap(true, Ordering::AcqRel) {
      debug!(%difficulty, "prefetch already in flight");
      return false;
    }

    let source = Arc::clone(&self.source);
    let config = self.config.clone();
    let sender = self.sender.clone();
    let in_flight = Arc::clone(&self.in_flight);

    let spawned = thread::Builder::new()
      .name("puzzle-prefetch".to_string())
      .spawn(move || {
        let _in_flight = InFlight(in_flight);
        if let Some(definition) = fetch_with_retry(&*source, difficulty, &config) {
          // The receiver only goes away with the Prefetcher itself.
          let _ = sender.send((difficulty, definition));
        }
      });

    match spawned {
      Ok(_) => {
        debug!(%difficulty, "prefetch started");
        true
      }
      Err(e) => {
        warn!(%difficulty, error = %e, "could not start prefetch thread");
        self.in_flight.store(false, Ordering::Release);
        false
      }
    }
  }

  /// Whether a puzzle of the given difficulty has arrived and not been taken yet.
  pub fn is_ready(&mut self, difficulty: Difficulty) -> bool {
    self.poll();
    matches!(&self.ready, Some((d, _)) if *d == difficulty)
  }

  /// Hands over the fetched puzzle if it has the given difficulty.
  pub fn take(&mut self, difficulty: Difficulty) -> Option<PuzzleDefinition> {
    self.poll();
    match self.ready.take() {
      Some((d, definition)) if d == difficulty => Some(definition),
      other => {
        self.ready = other;
        None
      }
    }
  }

  fn poll(&mut self) {
    while let Ok(fetched) = self.receiver.try_recv() {
      self.ready = Some(fetched);
    }
  }
}

/// Clears the in-flight flag when the worker exits, even by panicking.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

/// Tries the source until it produces a puzzle that can actually be laid out, sleeping
/// `retry_delay` between attempts. Gives up after `max_attempts`.
fn fetch_with_retry<S>(
  source: &S,
  difficulty: Difficulty,
  config: &PrefetchConfig,
) -> Option<PuzzleDefinition>
where
  S: PuzzleSource + ?Sized,
{
  let attempts = config.max_attempts.max(1);
  for attempt in 1..=attempts {
    match source.fetch(difficulty).and_then(Board::new) {
      Ok(board) => {
        info!(%difficulty, attempt, "prefetched puzzle");
        return Some(board.into_definition());
      }
      Err(e) => {
        warn!(%difficulty, attempt, attempts, error = %e, "prefetch failed");
        if attempt < attempts {
          thread::sleep(config.retry_delay);
        }
      }
    }
  }
  warn!(%difficulty, "giving up on prefetch");
  None
}
