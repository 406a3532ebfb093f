use super::{
  canvas::{Canvas, Ink},
  Scale, Style,
};
use crate::{bitmap::Bitmap, error::Error};

const DISC_CENTER: f32 = 24.0;
const DISC_RADIUS: f32 = 18.24;
/// The cup is drawn on its own 48 unit grid, shrunk and shifted into the disc.
const CUP_OFFSET: f32 = 7.2;
const CUP_SHRINK: f32 = 0.7;

const BODY: [(f32, f32); 4] = [(14.1, 16.0), (33.9, 16.0), (31.1, 42.0), (16.9, 42.0)];

/// Geometry of the badge icon at one size, in (fractional) pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeLayout {
  pub center: f32,
  pub radius: f32,
  pub lid: [f32; 4],
  pub body: [(f32, f32); 4],
  pub inner: [(f32, f32); 4],
  pub margin: f32,
  pub line_y: f32,
  pub line_height: f32,
  pub dot: (f32, f32),
  pub dot_radius: f32,
}

impl BadgeLayout {
  pub fn at(size: u32) -> Self {
    let s = Scale::new(size);
    let cup = |v: f32| CUP_OFFSET * s.factor() + v * CUP_SHRINK * s.factor();
    let margin = s.of(2.0).max(1.0);

    let body = BODY.map(|(x, y)| (cup(x), cup(y)));
    // inset each corner towards the middle of the body
    let inner = [
      (body[0].0 + margin, body[0].1 + margin),
      (body[1].0 - margin, body[1].1 + margin),
      (body[2].0 - margin, body[2].1 - margin),
      (body[3].0 + margin, body[3].1 - margin),
    ];

    Self {
      center: s.of(DISC_CENTER),
      radius: s.of(DISC_RADIUS).max(1.0),
      lid: [cup(12.0), cup(9.0), cup(36.0), cup(14.0)],
      body,
      inner,
      margin,
      line_y: cup(11.0),
      line_height: s.of(1.0).max(1.0),
      dot: (cup(24.0), cup(30.0)),
      dot_radius: (6.0 * CUP_SHRINK * s.factor()).max(2.0),
    }
  }

  pub fn strokes(&self) -> Vec<(&'static str, f32)> {
    vec![
      ("radius", self.radius),
      ("margin", self.margin),
      ("line_height", self.line_height),
      ("dot_radius", self.dot_radius),
    ]
  }
}

pub fn draw(size: u32, style: &Style) -> Result<Bitmap, Error> {
  let l = BadgeLayout::at(size);
  let mut canvas = Canvas::new(size)?;
  // without a disc the cutouts become transparent
  let hollow = style.background.map_or(Ink::Clear, Ink::Color);

  if let Some(background) = style.background {
    canvas.fill_ellipse(l.center, l.center, l.radius, l.radius, background);
  }

  let [left, top, right, bottom] = l.lid;
  canvas.fill_rect(left, top, right - left, bottom - top, style.primary);
  canvas.fill_polygon(&l.body, style.primary);
  canvas.fill_polygon(&l.inner, hollow);
  canvas.fill_rect(
    left + l.margin,
    l.line_y,
    right - left - 2.0 * l.margin,
    l.line_height,
    hollow,
  );

  if let Some(status) = style.status {
    canvas.fill_ellipse(l.dot.0, l.dot.1, l.dot_radius, l.dot_radius, status);
  }

  Ok(canvas.into_bitmap())
}
