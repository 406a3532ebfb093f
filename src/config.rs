use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::{
  container::{verify::square_sizes, verify::SizeSet, MAX_DIMENSION},
  error::Error,
  raster::{builtin_styles, Style},
};

pub const CONFIG_FILE: &str = "icons.json";

/// Where an icon's artwork comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSource {
  /// SVG file, relative to `source_dir`.
  Svg(PathBuf),
  /// Key of a configured or built-in style.
  Style(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconJob {
  pub name: String,
  #[serde(flatten)]
  pub source: IconSource,
}

impl IconJob {
  pub fn styled(name: &str, style: &str) -> Self {
    Self {
      name: name.to_string(),
      source: IconSource::Style(style.to_string()),
    }
  }
  pub fn svg(name: &str, path: impl Into<PathBuf>) -> Self {
    Self {
      name: name.to_string(),
      source: IconSource::Svg(path.into()),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
  #[serde(default = "default_source_dir")]
  pub source_dir: PathBuf,
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,

  /// Sizes packed into every icon, in this order.
  #[serde(default = "default_sizes")]
  pub sizes: Vec<u32>,
  #[serde(default = "default_preview_sizes")]
  pub preview_sizes: Vec<u32>,
  /// Decode every payload while verifying.
  #[serde(default = "default_deep_verify")]
  pub deep_verify: bool,
  #[serde(default = "default_log_level")]
  pub log_level: LevelFilter,

  /// Extra styles; these shadow built-ins with the same key.
  #[serde(default)]
  pub styles: BTreeMap<String, Style>,
  #[serde(default = "default_icons")]
  pub icons: Vec<IconJob>,
}

impl Config {
  pub fn new() -> Self {
    Self {
      source_dir: default_source_dir(),
      output_dir: default_output_dir(),
      sizes: default_sizes(),
      preview_sizes: default_preview_sizes(),
      deep_verify: default_deep_verify(),
      log_level: default_log_level(),
      styles: BTreeMap::new(),
      icons: default_icons(),
    }
  }

  /// Load `icons.json` from the working directory, if there is one.
  pub fn load() -> Result<Option<Self>, Error> {
    Self::load_from(Self::path())
  }
  pub fn load_from(path: impl AsRef<Path>) -> Result<Option<Self>, Error> {
    let path = path.as_ref();
    if !path.exists() {
      return Ok(None);
    }
    let file = fs::File::open(path)?;
    Ok(Some(serde_json::from_reader(file)?))
  }

  pub fn save(&self) -> Result<(), Error> {
    self.save_to(Self::path())
  }
  pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), Error> {
    let json = serde_json::to_vec_pretty(self)?;
    fs::write(path, json)?;
    Ok(())
  }
  pub fn path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
  }

  /// Resolve a style key against configured styles, then built-ins.
  pub fn style(&self, key: &str) -> Result<Style, Error> {
    if let Some(style) = self.styles.get(key) {
      return Ok(style.clone());
    }
    builtin_styles()
      .remove(key)
      .ok_or_else(|| Error::UnknownStyle(key.to_string()))
  }

  /// Reject configurations that would make the batch meaningless.
  pub fn validate(&self) -> Result<(), Error> {
    if self.sizes.is_empty() {
      return Err(Error::NoSizes);
    }
    if let Some(&size) = self
      .sizes
      .iter()
      .find(|&&size| size == 0 || size > MAX_DIMENSION)
    {
      return Err(Error::InvalidSize(size));
    }
    if let Some(&size) = self
      .preview_sizes
      .iter()
      .find(|&&size| size == 0 || size > MAX_DIMENSION)
    {
      return Err(Error::InvalidSize(size));
    }
    for job in &self.icons {
      if !is_plain_name(&job.name) {
        return Err(Error::InvalidName(job.name.clone()));
      }
      if let IconSource::Style(key) = &job.source {
        self.style(key)?;
      }
    }
    Ok(())
  }

  pub fn expected_sizes(&self) -> SizeSet {
    square_sizes(&self.sizes)
  }

  pub fn icon_path(&self, name: &str) -> PathBuf {
    self.output_dir.join(format!("{}.ico", name))
  }
  pub fn preview_dir(&self) -> PathBuf {
    self.output_dir.join("previews")
  }
  pub fn preview_path(&self, name: &str, size: u32) -> PathBuf {
    self.preview_dir().join(format!("{}-{}.png", name, size))
  }
  pub fn source_path(&self, relative: &Path) -> PathBuf {
    self.source_dir.join(relative)
  }
}

/// Icon names become file names inside `output_dir`.
fn is_plain_name(name: &str) -> bool {
  !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl Default for Config {
  fn default() -> Self {
    Self::new()
  }
}

fn default_source_dir() -> PathBuf { PathBuf::from("Assets/Icons/Sources") }
fn default_output_dir() -> PathBuf { PathBuf::from("Assets/Icons") }
fn default_sizes() -> Vec<u32> { vec![16, 24, 32, 48, 256] }
fn default_preview_sizes() -> Vec<u32> { vec![48, 256] }
fn default_deep_verify() -> bool { true }
fn default_log_level() -> LevelFilter { LevelFilter::Info }
fn default_icons() -> Vec<IconJob> {
  vec![
    IconJob::styled("caffeine", "app"),
    IconJob::styled("tray-active", "active"),
    IconJob::styled("tray-inactive", "inactive"),
    IconJob::styled("tray-paused", "paused"),
  ]
}
