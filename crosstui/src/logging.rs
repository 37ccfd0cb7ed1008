//! Logging goes to a file: the terminal belongs to the UI.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Sets up a per-session log file under `log_dir` (or the platform cache directory).
/// Keep the returned guard alive until exit so buffered lines get written.
pub fn init(log_dir: Option<&Path>) -> std::io::Result<WorkerGuard> {
  let log_dir = log_dir.map(Path::to_path_buf).unwrap_or_else(default_log_dir);

  let timestamp = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or_default();
  let session_log_dir = log_dir.join(format!("session_{timestamp}"));
  std::fs::create_dir_all(&session_log_dir)?;

  let file_appender = tracing_appender::rolling::never(&session_log_dir, "crosstui.log");
  let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

  let env_filter =
    tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

  let file_layer = tracing_subscriber::fmt::layer()
    .with_writer(non_blocking_file)
    .with_ansi(false);

  tracing_subscriber::registry()
    .with(env_filter)
    .with(file_layer)
    .init();

  tracing::info!("Log file: {}/crosstui.log", session_log_dir.display());
  Ok(guard)
}

fn default_log_dir() -> PathBuf {
  if let Some(cache) = std::env::var_os("XDG_CACHE_HOME") {
    return PathBuf::from(cache).join("crosstui").join("logs");
  }

  #[cfg(target_os = "windows")]
  {
    if let Some(local_appdata) = std::env::var_os("LOCALAPPDATA") {
      return PathBuf::from(local_appdata).join("crosstui").join("logs");
    }
  }

  #[cfg(target_os = "macos")]
  {
    if let Some(home) = std::env::var_os("HOME") {
      return PathBuf::from(home)
        .join("Library")
        .join("Caches")
        .join("crosstui")
        .join("logs");
    }
  }

  if let Some(home) = std::env::var_os("HOME") {
    return PathBuf::from(home)
      .join(".cache")
      .join("crosstui")
      .join("logs");
  }

  std::env::temp_dir().join("crosstui").join("logs")
}
