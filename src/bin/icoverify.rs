use std::process::ExitCode;

use caffeine_icons::{batch, init_logger, Config};
use log::LevelFilter;

pub fn main() -> ExitCode {
  let config = Config::load();
  let level = match &config {
    Ok(Some(config)) => config.log_level,
    _ => LevelFilter::Warn,
  };
  if let Err(err) = init_logger(level) {
    eprintln!("{}", err);
  }

  let config = match config {
    Ok(config) => config.unwrap_or_default(),
    Err(err) => {
      log::error!("[icoverify] {}: {}", Config::path().display(), err);
      return ExitCode::FAILURE;
    }
  };

  let rule = "=".repeat(50);
  println!("{}", rule);
  println!("ICO File Structure Verification");
  println!("{}", rule);

  let results = batch::verify(&config);
  for result in &results {
    println!();
    println!("{}", result);
  }

  println!();
  println!("{}", rule);
  let ok = batch::all_ok(&results);
  if ok {
    println!("Overall Status: [OK] All icons valid");
  } else {
    println!("Overall Status: [FAILED] Some icons have issues");
  }
  println!("{}", rule);

  if ok {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}
