use std::{io, path::PathBuf};

use thiserror::Error;

use crate::container::IcoError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Ico(#[from] IcoError),
  #[error("failed to parse svg {}: {}", .path.display(), .source)]
  Svg {
    path: PathBuf,
    #[source]
    source: resvg::usvg::Error,
  },
  #[error("invalid config: {0}")]
  Config(#[from] serde_json::Error),
  #[error("unknown style `{0}`")]
  UnknownStyle(String),
  #[error("icon size {0} is outside 1..=256")]
  InvalidSize(u32),
  #[error("icon name `{0}` must be a plain file name")]
  InvalidName(String),
  #[error("no icon sizes configured")]
  NoSizes,
  #[error("bitmap buffer holds {actual} bytes, {width}x{height} rgba needs {expected}")]
  BufferSize {
    width: u32,
    height: u32,
    expected: usize,
    actual: usize,
  },
  #[error("failed to allocate a {0}x{0} canvas")]
  Canvas(u32),
  #[error("failed to start logger: {0}")]
  Logger(String),
  #[error(transparent)]
  Io(#[from] io::Error),
}
