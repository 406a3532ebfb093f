use std::f32::consts::PI;

use tiny_skia::{
  BlendMode, FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

use super::Rgb;
use crate::{bitmap::Bitmap, error::Error};

const ARC_SEGMENTS: usize = 32;

/// What a shape is filled with. `Clear` punches a transparent hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
  Color(Rgb),
  Clear,
}

impl From<Rgb> for Ink {
  fn from(color: Rgb) -> Self {
    Ink::Color(color)
  }
}

fn paint(ink: Ink) -> Paint<'static> {
  let mut paint = Paint::default();
  paint.anti_alias = true;
  match ink {
    Ink::Color(Rgb(r, g, b)) => paint.set_color_rgba8(r, g, b, 255),
    Ink::Clear => paint.blend_mode = BlendMode::Clear,
  }
  paint
}

/// Transparent square canvas. Degenerate shapes are skipped.
pub struct Canvas {
  pixmap: Pixmap,
}

impl Canvas {
  pub fn new(size: u32) -> Result<Self, Error> {
    let pixmap = Pixmap::new(size, size).ok_or(Error::Canvas(size))?;
    Ok(Self { pixmap })
  }

  pub fn size(&self) -> u32 {
    self.pixmap.width()
  }

  fn fill(&mut self, path: Option<Path>, ink: Ink) {
    if let Some(path) = path {
      self
        .pixmap
        .fill_path(&path, &paint(ink), FillRule::Winding, Transform::identity(), None);
    }
  }

  pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, ink: impl Into<Ink>) {
    if w <= 0.0 || h <= 0.0 {
      return;
    }
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
      self.fill(Some(PathBuilder::from_rect(rect)), ink.into());
    }
  }

  pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, ink: impl Into<Ink>) {
    if w <= 0.0 || h <= 0.0 {
      return;
    }
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    self.fill(pb.finish(), ink.into());
  }

  pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, ink: impl Into<Ink>) {
    if rx <= 0.0 || ry <= 0.0 {
      return;
    }
    let oval = Rect::from_ltrb(cx - rx, cy - ry, cx + rx, cy + ry);
    self.fill(oval.and_then(PathBuilder::from_oval), ink.into());
  }

  pub fn fill_polygon(&mut self, points: &[(f32, f32)], ink: impl Into<Ink>) {
    let Some((&(x0, y0), rest)) = points.split_first() else {
      return;
    };
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    for &(x, y) in rest {
      pb.line_to(x, y);
    }
    pb.close();
    self.fill(pb.finish(), ink.into());
  }

  /// Stroke part of an ellipse outline. Angles are in degrees, zero at three
  /// o'clock, growing clockwise on screen; the arc runs from `start` to `end`.
  pub fn stroke_arc(
    &mut self,
    (cx, cy): (f32, f32),
    (rx, ry): (f32, f32),
    start: f32,
    end: f32,
    width: f32,
    ink: impl Into<Ink>,
  ) {
    let sweep = if end > start { end - start } else { end + 360.0 - start };
    let mut pb = PathBuilder::new();
    for step in 0..=ARC_SEGMENTS {
      let angle = (start + sweep * step as f32 / ARC_SEGMENTS as f32) * PI / 180.0;
      let (x, y) = (cx + rx * angle.cos(), cy + ry * angle.sin());
      if step == 0 {
        pb.move_to(x, y);
      } else {
        pb.line_to(x, y);
      }
    }
    let Some(path) = pb.finish() else {
      return;
    };
    let stroke = Stroke {
      width,
      line_cap: LineCap::Round,
      ..Stroke::default()
    };
    self
      .pixmap
      .stroke_path(&path, &paint(ink.into()), &stroke, Transform::identity(), None);
  }

  pub fn into_bitmap(self) -> Bitmap {
    Bitmap::from_pixmap(&self.pixmap)
  }
}
