use std::{
  fs,
  path::{Path, PathBuf},
};

use resvg::{tiny_skia, usvg};

use super::Artwork;
use crate::{bitmap::Bitmap, error::Error};

/// A parsed vector drawing, rendered once per requested size.
pub struct SvgDrawing {
  path: PathBuf,
  tree: usvg::Tree,
}

impl SvgDrawing {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    Self::from_data(&data, path)
  }

  /// `path` is only used in error messages.
  pub fn from_data(data: &[u8], path: impl Into<PathBuf>) -> Result<Self, Error> {
    let path = path.into();
    match usvg::Tree::from_data(data, &usvg::Options::default()) {
      Ok(tree) => Ok(Self { path, tree }),
      Err(source) => Err(Error::Svg { path, source }),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl Artwork for SvgDrawing {
  fn render(&self, size: u32) -> Result<Bitmap, Error> {
    if size == 0 {
      return Err(Error::InvalidSize(size));
    }
    let mut pixmap = tiny_skia::Pixmap::new(size, size).ok_or(Error::Canvas(size))?;
    let view = self.tree.size();
    let transform = tiny_skia::Transform::from_scale(
      size as f32 / view.width(),
      size as f32 / view.height(),
    );
    resvg::render(&self.tree, transform, &mut pixmap.as_mut());
    Ok(Bitmap::from_pixmap(&pixmap))
  }
}
