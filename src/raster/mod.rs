//! Icon artwork.
//!
//! Every design is laid out on a 48px grid and scaled linearly to the
//! requested size. Radii and stroke widths never drop below one pixel.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{bitmap::Bitmap, error::Error};

pub mod badge;
pub mod canvas;
pub mod cup;
pub mod svg;

pub use badge::BadgeLayout;
pub use cup::CupLayout;
pub use svg::SvgDrawing;

pub const BASE_SIZE: f32 = 48.0;

/// Something that can be drawn at any square size.
pub trait Artwork {
  fn render(&self, size: u32) -> Result<Bitmap, Error>;

  fn render_all(&self, sizes: &[u32]) -> Result<Vec<Bitmap>, Error> {
    sizes.iter().map(|&size| self.render(size)).collect()
  }
}

/// Linear mapping from the 48px base grid to a target size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f32);

impl Scale {
  pub fn new(size: u32) -> Self {
    Self(size as f32 / BASE_SIZE)
  }
  pub fn factor(&self) -> f32 {
    self.0
  }
  /// Scale a base length.
  pub fn of(&self, base: f32) -> f32 {
    base * self.0
  }
  /// Scale a base length and round to whole pixels.
  pub fn px(&self, base: f32) -> i32 {
    self.of(base).round() as i32
  }
  /// Whole pixels, never thinner than one pixel.
  pub fn px_min1(&self, base: f32) -> i32 {
    self.px(base).max(1)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
  /// Multiply every channel, used for shading.
  pub fn shade(self, factor: f32) -> Self {
    let ch = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Rgb(ch(self.0), ch(self.1), ch(self.2))
  }
}

impl FromStr for Rgb {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
      return Err(format!("`{}` is not a #rrggbb color", s));
    }
    let channel = |i: usize| {
      u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("`{}` is not a #rrggbb color", s))
    };
    Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
  }
}

impl Serialize for Rgb {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Rgb {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Design {
  /// Rounded cup with a handle and optional steam.
  SteamCup,
  /// Cup cut out of a colored disc with an optional status dot.
  Badge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
  pub design: Design,
  /// Cup color.
  pub primary: Rgb,
  /// Steam color.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub accent: Option<Rgb>,
  /// Status dot color.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<Rgb>,
  /// Disc behind the cup.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub background: Option<Rgb>,
}

impl Style {
  pub fn steam_cup(primary: Rgb, accent: Option<Rgb>) -> Self {
    Self {
      design: Design::SteamCup,
      primary,
      accent,
      status: None,
      background: None,
    }
  }

  pub fn badge(primary: Rgb, background: Rgb, status: Option<Rgb>) -> Self {
    Self {
      design: Design::Badge,
      primary,
      accent: None,
      status,
      background: Some(background),
    }
  }
}

impl Artwork for Style {
  fn render(&self, size: u32) -> Result<Bitmap, Error> {
    if size == 0 {
      return Err(Error::InvalidSize(size));
    }
    match self.design {
      Design::SteamCup => cup::draw(size, self),
      Design::Badge => badge::draw(size, self),
    }
  }
}

pub const BROWN: Rgb = Rgb(0x8B, 0x45, 0x13);
pub const GRAY: Rgb = Rgb(0x80, 0x80, 0x80);
pub const GREEN: Rgb = Rgb(0x4C, 0xAF, 0x50);
pub const ORANGE: Rgb = Rgb(0xFF, 0x98, 0x00);
pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
pub const BADGE_ORANGE: Rgb = Rgb(0xFF, 0xA0, 0x1A);
pub const STATUS_GREY: Rgb = Rgb(0x9E, 0x9E, 0x9E);
pub const AMBER: Rgb = Rgb(0xFF, 0xC1, 0x07);

/// Styles available without any configuration, keyed by style name.
pub fn builtin_styles() -> BTreeMap<String, Style> {
  [
    ("steam-active", Style::steam_cup(BROWN, Some(GREEN))),
    ("steam-inactive", Style::steam_cup(GRAY, None)),
    ("steam-paused", Style::steam_cup(BROWN, Some(ORANGE))),
    ("app", Style::badge(BLACK, BADGE_ORANGE, None)),
    ("active", Style::badge(BLACK, BADGE_ORANGE, Some(GREEN))),
    ("inactive", Style::badge(BLACK, BADGE_ORANGE, Some(STATUS_GREY))),
    ("paused", Style::badge(BLACK, BADGE_ORANGE, Some(AMBER))),
  ]
  .into_iter()
  .map(|(key, style)| (key.to_string(), style))
  .collect()
}
