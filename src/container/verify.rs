use std::{
  collections::BTreeSet,
  fmt, fs,
  io::Read,
  path::Path,
};

use ico::IconImage;

use super::{DirEntry, Header, IcoError, ENTRY_SIZE, HEADER_SIZE, ICON_TYPE, PNG_SIGNATURE};

pub type SizeSet = BTreeSet<(u32, u32)>;

/// Square size set, e.g. `[16, 32]` -> `{(16, 16), (32, 32)}`.
pub fn square_sizes(sizes: &[u32]) -> SizeSet {
  sizes.iter().map(|&s| (s, s)).collect()
}

/// Read the header and exactly `count` directory entries.
///
/// Stops at the first problem; entries read before it are kept in `entries`.
fn scan<R: Read>(
  mut reader: R,
  header: &mut Option<Header>,
  entries: &mut Vec<DirEntry>,
) -> Result<(), IcoError> {
  let parsed = Header::read_from(&mut reader)?;
  *header = Some(parsed);
  if parsed.reserved != 0 {
    return Err(IcoError::BadReserved(parsed.reserved));
  }
  if parsed.resource_type != ICON_TYPE {
    return Err(IcoError::NotAnIcon(parsed.resource_type));
  }
  for index in 0..parsed.count as usize {
    entries.push(DirEntry::read_from(&mut reader, index)?);
  }
  Ok(())
}

/// Strictly parse the header and directory of an icon.
pub fn read_directory<R: Read>(reader: R) -> Result<(Header, Vec<DirEntry>), IcoError> {
  let mut header = None;
  let mut entries = Vec::new();
  scan(reader, &mut header, &mut entries)?;
  match header {
    Some(header) => Ok((header, entries)),
    None => Err(IcoError::TruncatedHeader(0)),
  }
}

/// Layout problems found after the directory parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
  PayloadOutside {
    index: usize,
    end: u64,
    file_size: u64,
  },
  Overlap {
    index: usize,
    offset: u32,
    previous_end: u64,
  },
  Gap {
    index: usize,
    bytes: u64,
  },
  TrailingBytes(u64),
  Undecodable {
    index: usize,
    reason: String,
  },
  DimensionMismatch {
    index: usize,
    entry: (u32, u32),
    payload: (u32, u32),
  },
}

impl fmt::Display for Issue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Issue::PayloadOutside {
        index,
        end,
        file_size,
      } => write!(
        f,
        "image #{} ends at byte {} past the {} byte file",
        index + 1,
        end,
        file_size
      ),
      Issue::Overlap {
        index,
        offset,
        previous_end,
      } => write!(
        f,
        "image #{} starts at {} before the previous data ends at {}",
        index + 1,
        offset,
        previous_end
      ),
      Issue::Gap { index, bytes } => {
        write!(f, "{} unused bytes before image #{}", bytes, index + 1)
      }
      Issue::TrailingBytes(bytes) => write!(f, "{} bytes after the last image", bytes),
      Issue::Undecodable { index, reason } => {
        write!(f, "image #{} is not a readable png: {}", index + 1, reason)
      }
      Issue::DimensionMismatch {
        index,
        entry,
        payload,
      } => write!(
        f,
        "image #{} is listed as {}x{} but its png is {}x{}",
        index + 1,
        entry.0,
        entry.1,
        payload.0,
        payload.1
      ),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Ok,
  UnexpectedSizes,
  Layout,
  Structural,
}

#[derive(Debug)]
pub struct Report {
  pub file_size: u64,
  pub header: Option<Header>,
  pub entries: Vec<DirEntry>,
  pub error: Option<IcoError>,
  pub issues: Vec<Issue>,
  pub expected: SizeSet,
}

impl Report {
  fn new(file_size: u64, expected: &SizeSet) -> Self {
    Self {
      file_size,
      header: None,
      entries: Vec::new(),
      error: None,
      issues: Vec::new(),
      expected: expected.clone(),
    }
  }

  /// Distinct (width, height) pairs found in the directory.
  pub fn sizes(&self) -> SizeSet {
    self.entries.iter().map(DirEntry::dimensions).collect()
  }

  pub fn status(&self) -> Status {
    if self.error.is_some() {
      Status::Structural
    } else if !self.issues.is_empty() {
      Status::Layout
    } else if self.sizes() != self.expected {
      Status::UnexpectedSizes
    } else {
      Status::Ok
    }
  }

  pub fn is_ok(&self) -> bool {
    self.status() == Status::Ok
  }
}

fn check_layout(bytes: &[u8], entries: &[DirEntry], deep: bool) -> Vec<Issue> {
  let file_size = bytes.len() as u64;
  let mut issues = Vec::new();

  let mut order: Vec<usize> = (0..entries.len()).collect();
  order.sort_by_key(|&i| entries[i].offset);

  let mut previous_end = (HEADER_SIZE + ENTRY_SIZE * entries.len()) as u64;
  for &index in &order {
    let entry = &entries[index];
    let offset = entry.offset as u64;
    if offset < previous_end {
      issues.push(Issue::Overlap {
        index,
        offset: entry.offset,
        previous_end,
      });
    } else if offset > previous_end {
      issues.push(Issue::Gap {
        index,
        bytes: offset - previous_end,
      });
    }
    if entry.end() > file_size {
      issues.push(Issue::PayloadOutside {
        index,
        end: entry.end(),
        file_size,
      });
    }
    previous_end = previous_end.max(entry.end());
  }
  if previous_end < file_size {
    issues.push(Issue::TrailingBytes(file_size - previous_end));
  }

  if deep {
    for (index, entry) in entries.iter().enumerate() {
      if entry.end() > file_size {
        continue;
      }
      let payload = &bytes[entry.offset as usize..entry.end() as usize];
      // legacy BMP payloads are valid ICO data but outside what we decode
      if !payload.starts_with(PNG_SIGNATURE) {
        continue;
      }
      match IconImage::read_png(payload) {
        Ok(image) => {
          let decoded = (image.width(), image.height());
          if decoded != entry.dimensions() {
            issues.push(Issue::DimensionMismatch {
              index,
              entry: entry.dimensions(),
              payload: decoded,
            });
          }
        }
        Err(err) => issues.push(Issue::Undecodable {
          index,
          reason: err.to_string(),
        }),
      }
    }
  }

  issues
}

/// Verify an in-memory icon against the expected size set.
///
/// `deep` also decodes every PNG payload and compares its dimensions.
pub fn verify_bytes(bytes: &[u8], expected: &SizeSet, deep: bool) -> Report {
  let mut report = Report::new(bytes.len() as u64, expected);
  match scan(bytes, &mut report.header, &mut report.entries) {
    Ok(()) => report.issues = check_layout(bytes, &report.entries, deep),
    Err(err) => report.error = Some(err),
  }
  report
}

pub fn verify_file(path: impl AsRef<Path>, expected: &SizeSet, deep: bool) -> Report {
  match fs::read(path) {
    Ok(bytes) => verify_bytes(&bytes, expected, deep),
    Err(err) => {
      let mut report = Report::new(0, expected);
      report.error = Some(err.into());
      report
    }
  }
}

fn list(sizes: &SizeSet) -> String {
  let items: Vec<_> = sizes.iter().map(|(w, h)| format!("{}x{}", w, h)).collect();
  format!("[{}]", items.join(", "))
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(header) = &self.header {
      writeln!(f, "ICO Header:")?;
      writeln!(f, "  Reserved: {} (should be 0)", header.reserved)?;
      writeln!(f, "  Type: {} (1 = ICO, 2 = CUR)", header.resource_type)?;
      writeln!(f, "  Image Count: {}", header.count)?;
      writeln!(f)?;
    }

    if !self.entries.is_empty() {
      writeln!(f, "Image Entries:")?;
      for (i, entry) in self.entries.iter().enumerate() {
        writeln!(f, "  Image #{}:", i + 1)?;
        writeln!(f, "    Size: {}x{}", entry.width, entry.height)?;
        writeln!(f, "    Bit Depth: {} bits/pixel", entry.bits_per_pixel)?;
        writeln!(f, "    Data Size: {} bytes", entry.size)?;
        writeln!(f, "    Offset: {}", entry.offset)?;
      }
      writeln!(f)?;
    }

    writeln!(f, "Total sizes found: {}", self.entries.len())?;
    writeln!(f, "Sizes: {}", list(&self.sizes()))?;
    writeln!(f, "File size: {} bytes", self.file_size)?;
    for issue in &self.issues {
      writeln!(f, "  [WARNING] {}", issue)?;
    }

    match self.status() {
      Status::Ok => write!(f, "Status: [OK] All expected sizes present"),
      Status::UnexpectedSizes => write!(
        f,
        "Status: [WARNING] Expected {}, got {}",
        list(&self.expected),
        list(&self.sizes())
      ),
      Status::Layout => write!(f, "Status: [ERROR] {} layout issue(s)", self.issues.len()),
      Status::Structural => match &self.error {
        Some(err) => write!(f, "Status: [ERROR] {}", err),
        None => write!(f, "Status: [ERROR]"),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{bitmap::Bitmap, container::encode};

  fn icon(sizes: &[u32]) -> Vec<u8> {
    let bitmaps: Vec<_> = sizes.iter().map(|&s| Bitmap::transparent(s)).collect();
    encode(&bitmaps).unwrap()
  }

  #[test]
  fn clean_icon_is_ok() {
    let sizes = [16, 24, 32, 48];
    let report = verify_bytes(&icon(&sizes), &square_sizes(&sizes), true);
    assert_eq!(report.status(), Status::Ok, "{}", report);
    assert_eq!(report.entries.len(), 4);
    assert!(report.to_string().contains("Status: [OK]"));
  }

  #[test]
  fn size_mismatch_is_reported() {
    let report = verify_bytes(&icon(&[16, 32]), &square_sizes(&[16, 24, 32, 48]), false);
    assert_eq!(report.status(), Status::UnexpectedSizes);
    assert!(report.to_string().contains("Expected [16x16, 24x24, 32x32, 48x48], got [16x16, 32x32]"));
  }

  #[test]
  fn cursor_type_stops_parsing() {
    let mut bytes = icon(&[16]);
    bytes[2] = 2;
    let report = verify_bytes(&bytes, &square_sizes(&[16]), false);
    assert!(matches!(report.error, Some(IcoError::NotAnIcon(2))));
    assert!(report.entries.is_empty());
    assert_eq!(report.status(), Status::Structural);
  }

  #[test]
  fn reserved_must_be_zero() {
    let mut bytes = icon(&[16]);
    bytes[0] = 7;
    let report = verify_bytes(&bytes, &square_sizes(&[16]), false);
    assert!(matches!(report.error, Some(IcoError::BadReserved(7))));
  }

  #[test]
  fn truncated_directory_fails_fast() {
    let bytes = icon(&[16, 24, 32, 48]);
    let cut = &bytes[..6 + 16 * 2 + 5];
    let report = verify_bytes(cut, &square_sizes(&[16, 24, 32, 48]), false);
    assert!(matches!(
      report.error,
      Some(IcoError::TruncatedEntry {
        index: 2,
        available: 5
      })
    ));
    assert_eq!(report.entries.len(), 2);
    assert!(!report.is_ok());
    assert!(read_directory(cut).is_err());
  }

  #[test]
  fn truncated_payload_is_layout_issue() {
    let bytes = icon(&[16, 24]);
    let cut = &bytes[..bytes.len() - 3];
    let report = verify_bytes(cut, &square_sizes(&[16, 24]), false);
    assert_eq!(report.status(), Status::Layout);
    assert!(matches!(report.issues[0], Issue::PayloadOutside { index: 1, .. }));
  }

  #[test]
  fn trailing_bytes_are_flagged() {
    let mut bytes = icon(&[16]);
    bytes.extend_from_slice(&[0; 4]);
    let report = verify_bytes(&bytes, &square_sizes(&[16]), false);
    assert_eq!(report.issues, [Issue::TrailingBytes(4)]);
  }

  #[test]
  fn deep_check_catches_lying_directory() {
    let mut bytes = icon(&[16]);
    // relabel the 16px entry as 24px
    bytes[6] = 24;
    bytes[7] = 24;
    assert!(verify_bytes(&bytes, &square_sizes(&[24]), false).is_ok());
    let report = verify_bytes(&bytes, &square_sizes(&[24]), true);
    assert_eq!(
      report.issues,
      [Issue::DimensionMismatch {
        index: 0,
        entry: (24, 24),
        payload: (16, 16)
      }]
    );
  }

  #[test]
  fn missing_file_is_structural() {
    let dir = tempfile::tempdir().unwrap();
    let report = verify_file(dir.path().join("nope.ico"), &square_sizes(&[16]), false);
    assert!(matches!(report.error, Some(IcoError::Io(_))));
  }
}
