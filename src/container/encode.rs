use std::{fs, io::Write, path::Path};

use super::{DirEntry, Header, IcoError, ENTRY_SIZE, HEADER_SIZE, MAX_DIMENSION};
use crate::bitmap::Bitmap;

/// A fully built container: directory entries and their PNG payloads, in
/// generation order.
#[derive(Debug, Clone)]
pub struct IconFile {
  entries: Vec<DirEntry>,
  payloads: Vec<Vec<u8>>,
}

impl IconFile {
  /// Validate every bitmap, then PNG encode them and lay out the directory.
  pub fn from_bitmaps(bitmaps: &[Bitmap]) -> Result<Self, IcoError> {
    validate(bitmaps)?;

    let payloads = bitmaps
      .iter()
      .map(Bitmap::to_png)
      .collect::<Result<Vec<_>, _>>()?;

    let mut offset = (HEADER_SIZE + ENTRY_SIZE * bitmaps.len()) as u64;
    let mut entries = Vec::with_capacity(bitmaps.len());
    for (bitmap, payload) in bitmaps.iter().zip(&payloads) {
      let size = u32::try_from(payload.len()).map_err(|_| IcoError::TooLarge)?;
      let start = u32::try_from(offset).map_err(|_| IcoError::TooLarge)?;
      entries.push(DirEntry::png(bitmap.width(), size, start));
      offset += size as u64;
    }
    u32::try_from(offset).map_err(|_| IcoError::TooLarge)?;

    Ok(Self { entries, payloads })
  }

  pub fn entries(&self) -> &[DirEntry] {
    &self.entries
  }
  pub fn payloads(&self) -> &[Vec<u8>] {
    &self.payloads
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Total serialized size in bytes.
  pub fn byte_len(&self) -> usize {
    HEADER_SIZE
      + ENTRY_SIZE * self.entries.len()
      + self.payloads.iter().map(Vec::len).sum::<usize>()
  }

  pub fn write<W: Write>(&self, mut writer: W) -> Result<(), IcoError> {
    Header::icon(self.entries.len() as u16).write_to(&mut writer)?;
    for entry in &self.entries {
      entry.write_to(&mut writer)?;
    }
    for payload in &self.payloads {
      writer.write_all(payload)?;
    }
    Ok(())
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>, IcoError> {
    let mut bytes = Vec::with_capacity(self.byte_len());
    self.write(&mut bytes)?;
    Ok(bytes)
  }
}

fn validate(bitmaps: &[Bitmap]) -> Result<(), IcoError> {
  if bitmaps.is_empty() {
    return Err(IcoError::Empty);
  }
  if bitmaps.len() > u16::MAX as usize {
    return Err(IcoError::TooManyImages(bitmaps.len()));
  }
  for (index, bitmap) in bitmaps.iter().enumerate() {
    if !bitmap.is_square() {
      return Err(IcoError::NotSquare {
        index,
        width: bitmap.width(),
        height: bitmap.height(),
      });
    }
    let size = bitmap.width();
    if size == 0 || size > MAX_DIMENSION {
      return Err(IcoError::BadDimension { index, size });
    }
  }
  Ok(())
}

/// Encode `bitmaps` into ICO bytes.
pub fn encode(bitmaps: &[Bitmap]) -> Result<Vec<u8>, IcoError> {
  IconFile::from_bitmaps(bitmaps)?.to_bytes()
}

/// Encode and write an icon file. Nothing touches `path` unless encoding
/// succeeds. Returns the number of bytes written.
pub fn write_icon(path: impl AsRef<Path>, bitmaps: &[Bitmap]) -> Result<usize, IcoError> {
  let bytes = encode(bitmaps)?;
  fs::write(path, &bytes)?;
  Ok(bytes.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::container::PNG_SIGNATURE;

  fn squares(sizes: &[u32]) -> Vec<Bitmap> {
    sizes.iter().map(|&s| Bitmap::transparent(s)).collect()
  }

  #[test]
  fn offsets_follow_payloads() {
    let file = IconFile::from_bitmaps(&squares(&[16, 24, 32, 48, 256])).unwrap();
    let n = file.len() as u32;
    let mut expected = 6 + 16 * n;
    for (entry, payload) in file.entries().iter().zip(file.payloads()) {
      assert_eq!(entry.offset, expected);
      assert_eq!(entry.size as usize, payload.len());
      assert!(payload.starts_with(PNG_SIGNATURE));
      expected += entry.size;
    }
    let last = file.entries().last().unwrap();
    assert_eq!(last.end() as usize, file.byte_len());
    assert_eq!(file.to_bytes().unwrap().len(), file.byte_len());
  }

  #[test]
  fn header_and_dimension_bytes() {
    let bytes = encode(&squares(&[255, 256, 48])).unwrap();
    assert_eq!(&bytes[..6], &[0, 0, 1, 0, 3, 0]);
    // width and height bytes of each entry
    assert_eq!(&bytes[6..8], &[255, 255]);
    assert_eq!(&bytes[22..24], &[0, 0]);
    assert_eq!(&bytes[38..40], &[48, 48]);
    // color count, reserved, planes, bpp
    assert_eq!(&bytes[8..14], &[0, 0, 1, 0, 32, 0]);
  }

  #[test]
  fn order_is_generation_order() {
    let file = IconFile::from_bitmaps(&squares(&[48, 16, 32])).unwrap();
    let sides: Vec<_> = file.entries().iter().map(|e| e.width).collect();
    assert_eq!(sides, [48, 16, 32]);
  }

  #[test]
  fn rejects_bad_input() {
    assert!(matches!(encode(&[]), Err(IcoError::Empty)));

    let wide = Bitmap::new(32, 16, vec![0; 32 * 16 * 4]).unwrap();
    assert!(matches!(
      encode(&[Bitmap::transparent(16), wide]),
      Err(IcoError::NotSquare { index: 1, width: 32, height: 16 })
    ));

    assert!(matches!(
      encode(&squares(&[16, 512])),
      Err(IcoError::BadDimension { index: 1, size: 512 })
    ));
  }

  #[test]
  fn failed_validation_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ico");
    assert!(write_icon(&path, &squares(&[16, 300])).is_err());
    assert!(!path.exists());
  }

  #[test]
  fn readable_by_ico_crate() {
    let bytes = encode(&squares(&[16, 32, 256])).unwrap();
    let dir = ico::IconDir::read(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(dir.resource_type(), ico::ResourceType::Icon);
    let sizes: Vec<_> = dir.entries().iter().map(|e| (e.width(), e.height())).collect();
    assert_eq!(sizes, [(16, 16), (32, 32), (256, 256)]);
    assert!(dir.entries().iter().all(|e| e.is_png()));
  }
}
