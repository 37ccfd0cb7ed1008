use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossword_engine::{Difficulty, FileSource, PrefetchConfig, Prefetcher};
use tracing::info;

use crate::app::{App, Source};
use crate::source::HttpSource;

mod app;
mod keys;
mod logging;
mod source;

/// Solve crossword puzzles in your terminal, one level after another.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
  /// Directory of puzzle files: `<difficulty>.json`, or `puzzle.json` for every level
  #[arg(env = "CROSSTUI_PUZZLES", default_value = ".")]
  puzzles: PathBuf,

  /// Fetch puzzles from this URL instead of reading them from disk
  #[arg(long, env = "CROSSTUI_ENDPOINT")]
  endpoint: Option<String>,

  /// How many levels to play at each difficulty
  #[arg(long, env = "CROSSTUI_LEVELS_PER_TIER", default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..))]
  levels_per_tier: u32,

  /// Wait this long after a failed fetch before trying again
  #[arg(long, env = "CROSSTUI_RETRY_DELAY_MS", default_value_t = 2000)]
  retry_delay_ms: u64,

  /// Give up on a fetch after this many attempts
  #[arg(long, env = "CROSSTUI_MAX_ATTEMPTS", default_value_t = 5)]
  max_attempts: u32,

  /// Timeout for each request to the endpoint
  #[arg(long, env = "CROSSTUI_TIMEOUT_SECS", default_value_t = 10)]
  timeout_secs: u64,

  /// Where to write log files. Defaults to the platform cache directory
  #[arg(long, env = "CROSSTUI_LOG_DIR")]
  log_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  let _guard = logging::init(args.log_dir.as_deref()).context("could not set up logging")?;

  let source: Arc<Source> = match &args.endpoint {
    Some(endpoint) => Arc::new(
      HttpSource::new(endpoint.as_str(), Duration::from_secs(args.timeout_secs))
        .context("could not create the HTTP client")?,
    ),
    None => Arc::new(FileSource::new(&args.puzzles)),
  };
  info!(source = %source.describe(), levels_per_tier = args.levels_per_tier, "starting");

  let first = source
    .fetch(Difficulty::for_level(1, args.levels_per_tier))
    .context("could not load the initial puzzle")?;

  let config = PrefetchConfig {
    retry_delay: Duration::from_millis(args.retry_delay_ms),
    max_attempts: args.max_attempts,
  };
  let prefetcher = Prefetcher::new(source, config);
  let app = App::new(first, prefetcher, args.levels_per_tier)
    .context("the initial puzzle is not valid")?;

  let terminal = ratatui::init();
  execute!(stdout(), EnableMouseCapture)?;
  let result = app.run(terminal);
  let _ = execute!(stdout(), DisableMouseCapture);
  ratatui::restore();
  result?;
  Ok(())
}
