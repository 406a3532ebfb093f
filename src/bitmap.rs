use std::io::{self, Write};

use ico::IconImage;

use crate::{container::MAX_DIMENSION, error::Error};

/// Straight-alpha RGBA8 raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
  width: u32,
  height: u32,
  rgba: Vec<u8>,
}

impl Bitmap {
  pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, Error> {
    if width == 0 || height == 0 {
      return Err(Error::InvalidSize(width.min(height)));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
      return Err(Error::BufferSize {
        width,
        height,
        expected,
        actual: rgba.len(),
      });
    }
    Ok(Self {
      width,
      height,
      rgba,
    })
  }

  /// Fully transparent square.
  pub fn transparent(size: u32) -> Self {
    Self {
      width: size,
      height: size,
      rgba: vec![0; size as usize * size as usize * 4],
    }
  }

  /// Copy a tiny-skia canvas, undoing its premultiplied alpha.
  pub fn from_pixmap(pixmap: &tiny_skia::Pixmap) -> Self {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
      let color = pixel.demultiply();
      rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Self {
      width: pixmap.width(),
      height: pixmap.height(),
      rgba,
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }
  pub fn height(&self) -> u32 {
    self.height
  }
  pub fn is_square(&self) -> bool {
    self.width == self.height
  }
  pub fn rgba(&self) -> &[u8] {
    &self.rgba
  }

  pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
    if x >= self.width || y >= self.height {
      return None;
    }
    let i = (y as usize * self.width as usize + x as usize) * 4;
    Some([
      self.rgba[i],
      self.rgba[i + 1],
      self.rgba[i + 2],
      self.rgba[i + 3],
    ])
  }

  /// Number of pixels with any coverage.
  pub fn opaque_pixels(&self) -> usize {
    self.rgba.chunks_exact(4).filter(|px| px[3] > 0).count()
  }

  /// Smallest box holding every pixel with at least `min_alpha` coverage, as
  /// `(left, top, right, bottom)` with exclusive right and bottom edges.
  pub fn coverage_bounds(&self, min_alpha: u8) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in self.rgba.chunks_exact(4).enumerate() {
      if px[3] == 0 || px[3] < min_alpha {
        continue;
      }
      let (x, y) = (i as u32 % self.width, i as u32 / self.width);
      bounds = Some(match bounds {
        None => (x, y, x + 1, y + 1),
        Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
      });
    }
    bounds
  }

  /// Encode as a standalone PNG stream. Sides must be within 1..=256.
  pub fn write_png<W: Write>(&self, writer: W) -> io::Result<()> {
    let side_ok = |side: u32| (1..=MAX_DIMENSION).contains(&side);
    if !side_ok(self.width) || !side_ok(self.height) {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("cannot encode a {}x{} png payload", self.width, self.height),
      ));
    }
    let image = IconImage::from_rgba_data(self.width, self.height, self.rgba.clone());
    image.write_png(writer)
  }

  pub fn to_png(&self) -> io::Result<Vec<u8>> {
    let mut png = Vec::new();
    self.write_png(&mut png)?;
    Ok(png)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_short_buffer() {
    let err = Bitmap::new(2, 2, vec![0; 15]).unwrap_err();
    assert!(matches!(err, Error::BufferSize { expected: 16, actual: 15, .. }));
  }

  #[test]
  fn rejects_empty_dimensions() {
    assert!(matches!(Bitmap::new(0, 0, vec![]), Err(Error::InvalidSize(0))));
    assert!(matches!(Bitmap::new(4, 0, vec![]), Err(Error::InvalidSize(0))));
  }

  #[test]
  fn png_rejects_out_of_range_sides() {
    let err = Bitmap::transparent(0).to_png().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    let err = Bitmap::transparent(257).to_png().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
  }

  #[test]
  fn pixel_lookup() {
    let mut rgba = vec![0; 16];
    rgba[12..16].copy_from_slice(&[1, 2, 3, 4]);
    let bitmap = Bitmap::new(2, 2, rgba).unwrap();
    assert_eq!(bitmap.pixel(1, 1), Some([1, 2, 3, 4]));
    assert_eq!(bitmap.pixel(2, 0), None);
    assert_eq!(bitmap.opaque_pixels(), 1);
  }

  #[test]
  fn bounds_of_covered_pixels() {
    let mut rgba = vec![0; 4 * 4 * 4];
    rgba[(4 + 1) * 4 + 3] = 255;
    rgba[(2 * 4 + 2) * 4 + 3] = 40;
    let bitmap = Bitmap::new(4, 4, rgba).unwrap();
    assert_eq!(bitmap.coverage_bounds(1), Some((1, 1, 3, 3)));
    assert_eq!(bitmap.coverage_bounds(128), Some((1, 1, 2, 2)));
    assert_eq!(Bitmap::transparent(4).coverage_bounds(1), None);
  }

  #[test]
  fn png_keeps_dimensions() {
    let png = Bitmap::transparent(24).to_png().unwrap();
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    let decoded = IconImage::read_png(png.as_slice()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (24, 24));
  }

  #[test]
  fn demultiplies_pixmap() {
    let mut pixmap = tiny_skia::Pixmap::new(1, 1).unwrap();
    pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 50, 255));
    let bitmap = Bitmap::from_pixmap(&pixmap);
    assert_eq!(bitmap.pixel(0, 0), Some([200, 100, 50, 255]));
  }
}
