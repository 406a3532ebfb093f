//! The two batch jobs: render and pack every configured icon, and read the
//! packed icons back.

use std::{
  fmt, fs,
  path::{Path, PathBuf},
};

use crate::{
  config::{Config, IconJob, IconSource},
  container::{verify_file, write_icon, Report},
  error::Error,
  raster::{Artwork, SvgDrawing},
};

pub enum Outcome {
  /// Icon on disk; the artwork is kept for its previews.
  Written {
    path: PathBuf,
    bytes: usize,
    artwork: Box<dyn Artwork>,
  },
  /// Source drawing missing.
  Skipped(PathBuf),
}

#[derive(Debug, Default)]
pub struct Summary {
  pub written: Vec<PathBuf>,
  pub previews: Vec<PathBuf>,
  pub skipped: Vec<String>,
  pub failed: Vec<(String, Error)>,
  /// Previews that could not be written; their icon still counts as written.
  pub failed_previews: Vec<(PathBuf, Error)>,
}

impl Summary {
  pub fn is_clean(&self) -> bool {
    self.skipped.is_empty() && self.failed.is_empty() && self.failed_previews.is_empty()
  }
}

fn artwork(config: &Config, job: &IconJob) -> Result<Option<Box<dyn Artwork>>, Error> {
  let artwork: Box<dyn Artwork> = match &job.source {
    IconSource::Svg(relative) => {
      let path = config.source_path(relative);
      if !path.exists() {
        return Ok(None);
      }
      Box::new(SvgDrawing::load(path)?)
    }
    IconSource::Style(key) => Box::new(config.style(key)?),
  };
  Ok(Some(artwork))
}

/// Render, pack and write one icon. Previews are written separately by
/// [`write_previews`] once the icon is on disk.
pub fn generate_one(config: &Config, job: &IconJob) -> Result<Outcome, Error> {
  let Some(artwork) = artwork(config, job)? else {
    let missing = match &job.source {
      IconSource::Svg(relative) => config.source_path(relative),
      IconSource::Style(_) => PathBuf::new(),
    };
    return Ok(Outcome::Skipped(missing));
  };

  let bitmaps = artwork.render_all(&config.sizes)?;
  for bitmap in &bitmaps {
    log::debug!(
      "[icongen.rendered] {} {}x{}",
      job.name,
      bitmap.width(),
      bitmap.height()
    );
  }

  let path = config.icon_path(&job.name);
  let bytes = write_icon(&path, &bitmaps)?;
  Ok(Outcome::Written {
    path,
    bytes,
    artwork,
  })
}

fn write_preview(
  config: &Config,
  artwork: &dyn Artwork,
  preview: &Path,
  size: u32,
) -> Result<(), Error> {
  fs::create_dir_all(config.preview_dir())?;
  fs::write(preview, artwork.render(size)?.to_png()?)?;
  Ok(())
}

/// Write every preview PNG for one icon. A failed preview is logged and
/// recorded; the rest are still attempted.
pub fn write_previews(
  config: &Config,
  job: &IconJob,
  artwork: &dyn Artwork,
  summary: &mut Summary,
) {
  for &size in &config.preview_sizes {
    let preview = config.preview_path(&job.name, size);
    match write_preview(config, artwork, &preview, size) {
      Ok(()) => summary.previews.push(preview),
      Err(err) => {
        log::error!("[icongen.preview_failed] {}: {}", preview.display(), err);
        summary.failed_previews.push((preview, err));
      }
    }
  }
}

/// Generate every configured icon. Only an invalid configuration is fatal;
/// a missing or broken icon is logged and the batch moves on.
pub fn generate(config: &Config) -> Result<Summary, Error> {
  config.validate()?;
  fs::create_dir_all(&config.output_dir)?;

  let mut summary = Summary::default();
  for job in &config.icons {
    match generate_one(config, job) {
      Ok(Outcome::Written {
        path,
        bytes,
        artwork,
      }) => {
        log::info!("[icongen.created] {} ({} bytes)", path.display(), bytes);
        summary.written.push(path);
        write_previews(config, job, artwork.as_ref(), &mut summary);
      }
      Ok(Outcome::Skipped(missing)) => {
        log::warn!(
          "[icongen.skipped] {}: {} not found",
          job.name,
          missing.display()
        );
        summary.skipped.push(job.name.clone());
      }
      Err(err) => {
        log::error!("[icongen.failed] {}: {}", job.name, err);
        summary.failed.push((job.name.clone(), err));
      }
    }
  }
  Ok(summary)
}

pub struct Verification {
  pub name: String,
  pub path: PathBuf,
  /// `None` when the icon file does not exist.
  pub report: Option<Report>,
}

impl Verification {
  pub fn is_ok(&self) -> bool {
    self.report.as_ref().is_some_and(Report::is_ok)
  }
}

impl fmt::Display for Verification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let file = self
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.name.clone());
    match &self.report {
      None => write!(f, "{}: [NOT FOUND]", file),
      Some(report) => {
        writeln!(f, "Analyzing: {}", file)?;
        writeln!(f, "{}", "-".repeat(50))?;
        write!(f, "{}", report)
      }
    }
  }
}

/// Check every configured icon against the configured size set.
pub fn verify(config: &Config) -> Vec<Verification> {
  let expected = config.expected_sizes();
  config
    .icons
    .iter()
    .map(|job| {
      let path = config.icon_path(&job.name);
      let report = path
        .exists()
        .then(|| verify_file(&path, &expected, config.deep_verify));
      match &report {
        None => log::warn!("[icoverify.missing] {}", path.display()),
        Some(report) if !report.is_ok() => {
          log::warn!("[icoverify.failed] {}: {:?}", job.name, report.status())
        }
        Some(_) => log::debug!("[icoverify.ok] {}", job.name),
      }
      Verification {
        name: job.name.clone(),
        path,
        report,
      }
    })
    .collect()
}

pub fn all_ok(results: &[Verification]) -> bool {
  results.iter().all(Verification::is_ok)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::container::Status;

  fn config_in(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.source_dir = dir.join("Sources");
    config.output_dir = dir.to_path_buf();
    config
  }

  #[test]
  fn missing_svg_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.icons = vec![
      IconJob::svg("logo", "logo.svg"),
      IconJob::styled("tray-active", "active"),
    ];
    let summary = generate(&config).unwrap();
    assert_eq!(summary.skipped, ["logo"]);
    assert_eq!(summary.written, [dir.path().join("tray-active.ico")]);
    assert!(!dir.path().join("logo.ico").exists());
  }

  #[test]
  fn broken_svg_fails_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    fs::create_dir_all(&config.source_dir).unwrap();
    fs::write(config.source_dir.join("logo.svg"), "<svg").unwrap();
    config.icons = vec![
      IconJob::svg("logo", "logo.svg"),
      IconJob::styled("caffeine", "app"),
    ];
    let summary = generate(&config).unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "logo");
    assert_eq!(summary.written.len(), 1);
    assert!(!summary.is_clean());
  }

  #[test]
  fn unknown_style_stops_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path().join("out").as_path());
    config.icons.push(IconJob::styled("tray-busy", "busy"));
    assert!(matches!(generate(&config), Err(Error::UnknownStyle(_))));
    assert!(!dir.path().join("out").exists());
  }

  #[test]
  fn previews_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.icons = vec![IconJob::styled("tray-paused", "paused")];
    let summary = generate(&config).unwrap();
    assert_eq!(
      summary.previews,
      [
        dir.path().join("previews/tray-paused-48.png"),
        dir.path().join("previews/tray-paused-256.png"),
      ]
    );
    let png = fs::read(&summary.previews[1]).unwrap();
    let image = ico::IconImage::read_png(png.as_slice()).unwrap();
    assert_eq!(image.width(), 256);
  }

  #[test]
  fn broken_preview_keeps_the_icon() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    fs::write(dir.path().join("previews"), "not a directory").unwrap();
    config.icons = vec![IconJob::styled("tray-active", "active")];

    let summary = generate(&config).unwrap();
    assert_eq!(summary.written, [dir.path().join("tray-active.ico")]);
    assert!(summary.failed.is_empty());
    assert!(summary.previews.is_empty());
    let failed: Vec<_> = summary.failed_previews.iter().map(|(path, _)| path.clone()).collect();
    assert_eq!(
      failed,
      [
        config.preview_path("tray-active", 48),
        config.preview_path("tray-active", 256),
      ]
    );
    assert!(!summary.is_clean());
    assert!(verify(&config)[0].is_ok());
  }

  #[test]
  fn verify_reports_missing_and_present() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.icons = vec![IconJob::styled("tray-active", "active")];
    config.preview_sizes.clear();
    generate(&config).unwrap();

    config.icons.push(IconJob::styled("tray-paused", "paused"));
    let results = verify(&config);
    assert!(results[0].is_ok());
    assert_eq!(results[0].report.as_ref().unwrap().status(), Status::Ok);
    assert!(results[1].report.is_none());
    assert_eq!(results[1].to_string(), "tray-paused.ico: [NOT FOUND]");
    assert!(!all_ok(&results));
  }
}
