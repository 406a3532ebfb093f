//! The Windows ICO container: a 6 byte header, one 16 byte directory entry
//! per image, then the image payloads back to back.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

pub mod encode;
pub mod verify;

pub use encode::{encode, write_icon, IconFile};
pub use verify::{read_directory, verify_bytes, verify_file, Issue, Report, Status};

pub const HEADER_SIZE: usize = 6;
pub const ENTRY_SIZE: usize = 16;
pub const MAX_DIMENSION: u32 = 256;

/// Resource type for icons; cursors use 2.
pub const ICON_TYPE: u16 = 1;
pub const PLANES: u16 = 1;
pub const BITS_PER_PIXEL: u16 = 32;

pub const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Error)]
pub enum IcoError {
  #[error("an icon needs at least one image")]
  Empty,
  #[error("{0} images do not fit in an icon directory")]
  TooManyImages(usize),
  #[error("image {index} is {width}x{height}, icon images must be square")]
  NotSquare { index: usize, width: u32, height: u32 },
  #[error("image {index} is {size}px, icon images must be 1..=256px")]
  BadDimension { index: usize, size: u32 },
  #[error("header truncated: {0} of 6 bytes")]
  TruncatedHeader(usize),
  #[error("reserved header field is {0}, expected 0")]
  BadReserved(u16),
  #[error("resource type is {0}, expected 1 (icon)")]
  NotAnIcon(u16),
  #[error("directory entry #{index} truncated: {available} of 16 bytes")]
  TruncatedEntry { index: usize, available: usize },
  #[error("icon data exceeds 4 GiB")]
  TooLarge,
  #[error(transparent)]
  Io(#[from] io::Error),
}

/// Store a 1..=256 dimension in a directory byte.
pub fn dimension_byte(size: u32) -> u8 {
  if size >= MAX_DIMENSION {
    0
  } else {
    size as u8
  }
}

pub fn dimension_from_byte(byte: u8) -> u32 {
  if byte == 0 {
    MAX_DIMENSION
  } else {
    byte as u32
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
  pub reserved: u16,
  pub resource_type: u16,
  pub count: u16,
}

impl Header {
  pub fn icon(count: u16) -> Self {
    Self {
      reserved: 0,
      resource_type: ICON_TYPE,
      count,
    }
  }

  pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
    writer.write_u16::<LittleEndian>(self.reserved)?;
    writer.write_u16::<LittleEndian>(self.resource_type)?;
    writer.write_u16::<LittleEndian>(self.count)
  }

  /// Parse the header without judging its fields.
  pub fn read_from<R: Read>(reader: R) -> Result<Self, IcoError> {
    let bytes = read_up_to(reader, HEADER_SIZE)?;
    if bytes.len() < HEADER_SIZE {
      return Err(IcoError::TruncatedHeader(bytes.len()));
    }
    let mut bytes = bytes.as_slice();
    Ok(Self {
      reserved: bytes.read_u16::<LittleEndian>()?,
      resource_type: bytes.read_u16::<LittleEndian>()?,
      count: bytes.read_u16::<LittleEndian>()?,
    })
  }
}

/// One ICONDIRENTRY with its dimensions already widened (0 read as 256).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
  pub width: u32,
  pub height: u32,
  pub color_count: u8,
  pub reserved: u8,
  pub planes: u16,
  pub bits_per_pixel: u16,
  pub size: u32,
  pub offset: u32,
}

impl DirEntry {
  pub fn png(side: u32, size: u32, offset: u32) -> Self {
    Self {
      width: side,
      height: side,
      color_count: 0,
      reserved: 0,
      planes: PLANES,
      bits_per_pixel: BITS_PER_PIXEL,
      size,
      offset,
    }
  }

  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  /// First byte past this entry's payload.
  pub fn end(&self) -> u64 {
    self.offset as u64 + self.size as u64
  }

  pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
    writer.write_u8(dimension_byte(self.width))?;
    writer.write_u8(dimension_byte(self.height))?;
    writer.write_u8(self.color_count)?;
    writer.write_u8(self.reserved)?;
    writer.write_u16::<LittleEndian>(self.planes)?;
    writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
    writer.write_u32::<LittleEndian>(self.size)?;
    writer.write_u32::<LittleEndian>(self.offset)
  }

  /// Read entry `index`; fewer than 16 remaining bytes is a truncation.
  pub fn read_from<R: Read>(reader: R, index: usize) -> Result<Self, IcoError> {
    let bytes = read_up_to(reader, ENTRY_SIZE)?;
    if bytes.len() < ENTRY_SIZE {
      return Err(IcoError::TruncatedEntry {
        index,
        available: bytes.len(),
      });
    }
    let mut bytes = bytes.as_slice();
    Ok(Self {
      width: dimension_from_byte(bytes.read_u8()?),
      height: dimension_from_byte(bytes.read_u8()?),
      color_count: bytes.read_u8()?,
      reserved: bytes.read_u8()?,
      planes: bytes.read_u16::<LittleEndian>()?,
      bits_per_pixel: bytes.read_u16::<LittleEndian>()?,
      size: bytes.read_u32::<LittleEndian>()?,
      offset: bytes.read_u32::<LittleEndian>()?,
    })
  }
}

fn read_up_to<R: Read>(reader: R, len: usize) -> io::Result<Vec<u8>> {
  let mut bytes = Vec::with_capacity(len);
  reader.take(len as u64).read_to_end(&mut bytes)?;
  Ok(bytes)
}
