use std::process::ExitCode;

use caffeine_icons::{batch, init_logger, Config, APP_NAME};
use log::LevelFilter;

pub fn main() -> ExitCode {
  let config = Config::load();
  let level = match &config {
    Ok(Some(config)) => config.log_level,
    _ => LevelFilter::Info,
  };
  if let Err(err) = init_logger(level) {
    eprintln!("{}", err);
  }

  let config = match config {
    Ok(config) => config.unwrap_or_default(),
    Err(err) => {
      log::error!("[icongen] {}: {}", Config::path().display(), err);
      return ExitCode::FAILURE;
    }
  };

  log::info!("[icongen.started] {} ({} icons)", APP_NAME, config.icons.len());
  match batch::generate(&config) {
    Ok(summary) => {
      log::info!(
        "[icongen.finished] {} written, {} skipped, {} failed, {} previews failed",
        summary.written.len(),
        summary.skipped.len(),
        summary.failed.len(),
        summary.failed_previews.len()
      );
      ExitCode::SUCCESS
    }
    Err(err) => {
      log::error!("[icongen] {}", err);
      ExitCode::FAILURE
    }
  }
}
