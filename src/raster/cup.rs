use super::{canvas::Canvas, Scale, Style};
use crate::{bitmap::Bitmap, error::Error};

/// Steam wisps on the base grid: center x, center y, radius x, radius y.
const STEAM: [(f32, f32, f32, f32); 3] = [
  (21.0, 16.0, 2.0, 2.0),
  (25.0, 13.5, 2.0, 2.5),
  (29.0, 16.0, 2.0, 2.0),
];

/// Coffee surface is the cup color at 70%.
const SURFACE_SHADE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wisp {
  pub cx: i32,
  pub cy: i32,
  pub rx: i32,
  pub ry: i32,
}

/// Pixel geometry of the steam cup at one size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CupLayout {
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
  pub corner_radius: i32,
  pub surface_rx: i32,
  pub surface_ry: i32,
  pub handle_cy: i32,
  pub handle_rx: i32,
  pub handle_ry: i32,
  pub handle_width: i32,
  pub steam: [Wisp; 3],
  pub steam_width: i32,
}

impl CupLayout {
  pub fn at(size: u32) -> Self {
    let s = Scale::new(size);
    Self {
      x: s.px(16.0),
      y: s.px(22.0),
      width: s.px(16.0),
      height: s.px(18.0),
      corner_radius: s.px_min1(2.0),
      surface_rx: s.px_min1(8.0),
      surface_ry: s.px_min1(2.0),
      handle_cy: s.px(32.0),
      handle_rx: s.px_min1(4.0),
      handle_ry: s.px_min1(4.0),
      handle_width: s.px_min1(2.5),
      steam: STEAM.map(|(cx, cy, rx, ry)| Wisp {
        cx: s.px(cx),
        cy: s.px(cy),
        rx: s.px_min1(rx),
        ry: s.px_min1(ry),
      }),
      steam_width: s.px_min1(2.0),
    }
  }

  /// Radii and stroke widths.
  pub fn strokes(&self) -> Vec<(&'static str, f32)> {
    let mut strokes = vec![
      ("corner_radius", self.corner_radius as f32),
      ("surface_rx", self.surface_rx as f32),
      ("surface_ry", self.surface_ry as f32),
      ("handle_rx", self.handle_rx as f32),
      ("handle_ry", self.handle_ry as f32),
      ("handle_width", self.handle_width as f32),
      ("steam_width", self.steam_width as f32),
    ];
    for wisp in &self.steam {
      strokes.push(("steam_rx", wisp.rx as f32));
      strokes.push(("steam_ry", wisp.ry as f32));
    }
    strokes
  }

  /// Every linear measure, positions included.
  pub fn features(&self) -> Vec<(&'static str, f32)> {
    let mut features = vec![
      ("x", self.x as f32),
      ("y", self.y as f32),
      ("width", self.width as f32),
      ("height", self.height as f32),
      ("handle_cy", self.handle_cy as f32),
    ];
    for wisp in &self.steam {
      features.push(("steam_cx", wisp.cx as f32));
      features.push(("steam_cy", wisp.cy as f32));
    }
    features.extend(self.strokes());
    features
  }
}

pub fn draw(size: u32, style: &Style) -> Result<Bitmap, Error> {
  let l = CupLayout::at(size);
  let mut canvas = Canvas::new(size)?;

  let (x, y, w, h) = (l.x as f32, l.y as f32, l.width as f32, l.height as f32);
  canvas.fill_rounded_rect(x, y, w, h, l.corner_radius as f32, style.primary);

  canvas.fill_ellipse(
    x + (l.width / 2) as f32,
    y,
    l.surface_rx as f32,
    l.surface_ry as f32,
    style.primary.shade(SURFACE_SHADE),
  );

  // right half of an ellipse hanging off the cup wall
  canvas.stroke_arc(
    (x + w, l.handle_cy as f32),
    (l.handle_rx as f32, l.handle_ry as f32),
    270.0,
    90.0,
    l.handle_width as f32,
    style.primary,
  );

  if let Some(steam) = style.accent {
    for wisp in &l.steam {
      canvas.stroke_arc(
        (wisp.cx as f32, wisp.cy as f32),
        (wisp.rx as f32, wisp.ry as f32),
        180.0,
        0.0,
        l.steam_width as f32,
        steam,
      );
    }
  }

  Ok(canvas.into_bitmap())
}
