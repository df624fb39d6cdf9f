//! Declarative diagrams and the fixed SVG renderer that draws them.
//!
//! A diagram is a list of shapes described in a tiny line-based language:
//!
//! ```text
//! point A 0 0
//! point B 4 0
//! point C 0 3
//! polygon A B C
//! segment A B
//! circle 0 0 2.5
//! polyline 0 0 1 1 2 4
//! label "hypotenuse = ?" 2 1.5
//! ```
//!
//! Nothing in a description is ever executed. Unknown keywords, bad numbers and
//! references to undefined points are parse errors.

use std::collections::HashMap;
use std::fmt::Write as _;

use thiserror::Error;

use crate::domain::Diagram;

const WIDTH: f64 = 320.0;
const HEIGHT: f64 = 240.0;
const MARGIN: f64 = 24.0;

pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiagramError {
  #[error("line {line}: {message}")]
  Syntax { line: usize, message: String },

  #[error("line {line}: unknown point '{name}'")]
  UnknownPoint { line: usize, name: String },

  #[error("diagram has no shapes")]
  Empty,

  #[error("diagram coordinates are too large to draw")]
  OutOfRange,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
  Point { name: String, x: f64, y: f64 },
  Segment { from: String, to: String },
  Polygon { vertices: Vec<String> },
  Circle { cx: f64, cy: f64, r: f64 },
  Polyline { points: Vec<(f64, f64)> },
  Label { text: String, x: f64, y: f64 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagramSpec {
  pub shapes: Vec<Shape>,
}

impl DiagramSpec {
  pub fn point(mut self, name: &str, x: f64, y: f64) -> Self {
    self.shapes.push(Shape::Point { name: name.to_string(), x, y });
    self
  }

  pub fn segment(mut self, from: &str, to: &str) -> Self {
    self.shapes.push(Shape::Segment { from: from.to_string(), to: to.to_string() });
    self
  }

  pub fn polygon(mut self, vertices: &[&str]) -> Self {
    self.shapes.push(Shape::Polygon { vertices: vertices.iter().map(|v| v.to_string()).collect() });
    self
  }

  pub fn polyline(mut self, points: Vec<(f64, f64)>) -> Self {
    self.shapes.push(Shape::Polyline { points });
    self
  }

  pub fn label(mut self, text: &str, x: f64, y: f64) -> Self {
    self.shapes.push(Shape::Label { text: text.to_string(), x, y });
    self
  }

  fn points(&self) -> HashMap<&str, (f64, f64)> {
    self
      .shapes
      .iter()
      .filter_map(|s| match s {
        Shape::Point { name, x, y } => Some((name.as_str(), (*x, *y))),
        _ => None,
      })
      .collect()
  }

  /// Every segment and polygon must refer to a declared point.
  fn check_references(&self, lines: &[usize]) -> Result<(), DiagramError> {
    let points = self.points();
    for (idx, shape) in self.shapes.iter().enumerate() {
      let names: Vec<&String> = match shape {
        Shape::Segment { from, to } => vec![from, to],
        Shape::Polygon { vertices } => vertices.iter().collect(),
        _ => continue,
      };
      for name in names {
        if !points.contains_key(name.as_str()) {
          return Err(DiagramError::UnknownPoint {
            line: lines.get(idx).copied().unwrap_or(0),
            name: name.clone(),
          });
        }
      }
    }
    Ok(())
  }
}

/// Split a line into tokens, keeping double-quoted text together.
fn tokenize(line: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut cur = String::new();
  let mut quoted = false;
  for ch in line.chars() {
    match ch {
      '"' => {
        if quoted {
          out.push(std::mem::take(&mut cur));
        }
        quoted = !quoted;
      }
      c if c.is_whitespace() && !quoted => {
        if !cur.is_empty() {
          out.push(std::mem::take(&mut cur));
        }
      }
      c => cur.push(c),
    }
  }
  if !cur.is_empty() {
    out.push(cur);
  }
  out
}

fn number(tok: &str, line: usize) -> Result<f64, DiagramError> {
  tok
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .ok_or_else(|| DiagramError::Syntax { line, message: format!("'{tok}' is not a number") })
}

fn arity(tokens: &[String], want: usize, line: usize) -> Result<(), DiagramError> {
  if tokens.len() != want {
    return Err(DiagramError::Syntax {
      line,
      message: format!("'{}' takes {} argument(s), got {}", tokens[0], want - 1, tokens.len() - 1),
    });
  }
  Ok(())
}

pub fn parse(src: &str) -> Result<DiagramSpec, DiagramError> {
  let mut spec = DiagramSpec::default();
  let mut lines = Vec::new();

  for (i, raw) in src.lines().enumerate() {
    let line = i + 1;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("```") {
      continue;
    }
    let t = tokenize(trimmed);
    let Some(head) = t.first() else {
      return Err(DiagramError::Syntax { line, message: "empty statement".into() });
    };
    let shape = match head.to_ascii_lowercase().as_str() {
      "point" => {
        arity(&t, 4, line)?;
        Shape::Point { name: t[1].clone(), x: number(&t[2], line)?, y: number(&t[3], line)? }
      }
      "segment" => {
        arity(&t, 3, line)?;
        Shape::Segment { from: t[1].clone(), to: t[2].clone() }
      }
      "polygon" => {
        if t.len() < 4 {
          return Err(DiagramError::Syntax { line, message: "polygon needs at least 3 points".into() });
        }
        Shape::Polygon { vertices: t[1..].to_vec() }
      }
      "circle" => {
        arity(&t, 4, line)?;
        let r = number(&t[3], line)?;
        if r <= 0.0 {
          return Err(DiagramError::Syntax { line, message: "circle radius must be positive".into() });
        }
        Shape::Circle { cx: number(&t[1], line)?, cy: number(&t[2], line)?, r }
      }
      "polyline" => {
        let coords = t[1..].iter().map(|tok| number(tok, line)).collect::<Result<Vec<_>, _>>()?;
        if coords.len() < 4 || coords.len() % 2 != 0 {
          return Err(DiagramError::Syntax { line, message: "polyline needs at least 2 x/y pairs".into() });
        }
        Shape::Polyline { points: coords.chunks(2).map(|c| (c[0], c[1])).collect() }
      }
      "label" => {
        arity(&t, 4, line)?;
        Shape::Label { text: t[1].clone(), x: number(&t[2], line)?, y: number(&t[3], line)? }
      }
      other => {
        return Err(DiagramError::Syntax { line, message: format!("unknown shape '{other}'") });
      }
    };
    spec.shapes.push(shape);
    lines.push(line);
  }

  if spec.shapes.is_empty() {
    return Err(DiagramError::Empty);
  }
  spec.check_references(&lines)?;
  Ok(spec)
}

fn escape(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

struct Frame {
  min_x: f64,
  min_y: f64,
  scale: f64,
}

impl Frame {
  /// Every drawn coordinate must map to a finite SVG position.
  fn fit(spec: &DiagramSpec) -> Result<Self, DiagramError> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for shape in &spec.shapes {
      match shape {
        Shape::Point { x, y, .. } | Shape::Label { x, y, .. } => {
          xs.push(*x);
          ys.push(*y);
        }
        Shape::Circle { cx, cy, r } => {
          xs.extend([cx - r, cx + r]);
          ys.extend([cy - r, cy + r]);
        }
        Shape::Polyline { points } => {
          for (x, y) in points {
            xs.push(*x);
            ys.push(*y);
          }
        }
        Shape::Segment { .. } | Shape::Polygon { .. } => {}
      }
    }
    if xs.iter().chain(&ys).any(|v| !v.is_finite()) {
      return Err(DiagramError::OutOfRange);
    }
    let bounds = |vs: &[f64]| Some((vs.iter().copied().reduce(f64::min)?, vs.iter().copied().reduce(f64::max)?));
    let ((min_x, max_x), (min_y, max_y)) = bounds(xs.as_slice())
      .zip(bounds(ys.as_slice()))
      .ok_or(DiagramError::Empty)?;
    let w = (max_x - min_x).max(1e-9);
    let h = (max_y - min_y).max(1e-9);
    let scale = ((WIDTH - 2.0 * MARGIN) / w).min((HEIGHT - 2.0 * MARGIN) / h);
    if !w.is_finite() || !h.is_finite() || !scale.is_finite() || scale <= 0.0 {
      return Err(DiagramError::OutOfRange);
    }
    Ok(Self { min_x, min_y, scale })
  }

  fn map(&self, x: f64, y: f64) -> (f64, f64) {
    (
      MARGIN + (x - self.min_x) * self.scale,
      HEIGHT - MARGIN - (y - self.min_y) * self.scale,
    )
  }
}

/// Draw a checked description as SVG.
pub fn render_svg(spec: &DiagramSpec) -> Result<Diagram, DiagramError> {
  spec.check_references(&[])?;
  let frame = Frame::fit(spec)?;
  let points = spec.points();
  let at = |name: &str| points.get(name).map(|(x, y)| frame.map(*x, *y)).unwrap_or((0.0, 0.0));
  const STROKE: &str = r#"fill="none" stroke="black" stroke-width="1.5""#;

  let mut svg = format!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
  );
  for shape in &spec.shapes {
    let _ = match shape {
      Shape::Segment { from, to } => {
        let ((x1, y1), (x2, y2)) = (at(from.as_str()), at(to.as_str()));
        write!(svg, r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" {STROKE}/>"#)
      }
      Shape::Polygon { vertices } => {
        let pts: Vec<String> = vertices
          .iter()
          .map(|v| at(v.as_str()))
          .map(|(x, y)| format!("{x:.1},{y:.1}"))
          .collect();
        write!(svg, r#"<polygon points="{}" {STROKE}/>"#, pts.join(" "))
      }
      Shape::Circle { cx, cy, r } => {
        let (x, y) = frame.map(*cx, *cy);
        write!(svg, r#"<circle cx="{x:.1}" cy="{y:.1}" r="{:.1}" {STROKE}/>"#, r * frame.scale)
      }
      Shape::Polyline { points } => {
        let pts: Vec<String> = points
          .iter()
          .map(|(x, y)| frame.map(*x, *y))
          .map(|(x, y)| format!("{x:.1},{y:.1}"))
          .collect();
        write!(svg, r#"<polyline points="{}" {STROKE}/>"#, pts.join(" "))
      }
      Shape::Point { name, x, y } => {
        let (x, y) = frame.map(*x, *y);
        write!(
          svg,
          r#"<circle cx="{x:.1}" cy="{y:.1}" r="2.5" fill="black"/><text x="{:.1}" y="{:.1}" font-size="12">{}</text>"#,
          x + 4.0,
          y - 4.0,
          escape(name)
        )
      }
      Shape::Label { text, x, y } => {
        let (x, y) = frame.map(*x, *y);
        write!(svg, r#"<text x="{x:.1}" y="{y:.1}" font-size="12">{}</text>"#, escape(text))
      }
    };
  }
  svg.push_str("</svg>");

  Ok(Diagram { media_type: SVG_MEDIA_TYPE.to_string(), bytes: svg.into_bytes() })
}

/// Parse and draw in one step.
pub fn render_source(src: &str) -> Result<Diagram, DiagramError> {
  render_svg(&parse(src)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  const TRIANGLE: &str = r#"
    # right triangle
    point A 0 0
    point B 4 0
    point C 0 3
    polygon A B C
    label "5" 2.2 1.7
  "#;

  #[test]
  fn parses_the_documented_shapes() {
    let spec = parse(TRIANGLE).expect("parse");
    assert_eq!(spec.shapes.len(), 5);
    assert_eq!(spec.shapes[4], Shape::Label { text: "5".into(), x: 2.2, y: 1.7 });

    let spec = parse("circle 0 0 2\npolyline 0 0 1 1 2 4\nlabel \"two words\" 1 1").expect("parse");
    assert_eq!(spec.shapes[1], Shape::Polyline { points: vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)] });
    assert_eq!(spec.shapes[2], Shape::Label { text: "two words".into(), x: 1.0, y: 1.0 });
  }

  #[test]
  fn rejects_unknown_keywords_and_points() {
    assert_eq!(
      parse("import os\npoint A 0 0"),
      Err(DiagramError::Syntax { line: 1, message: "unknown shape 'import'".into() })
    );
    assert_eq!(
      parse("point A 0 0\n\nsegment A Z"),
      Err(DiagramError::UnknownPoint { line: 3, name: "Z".into() })
    );
    assert!(matches!(parse("point A zero 0"), Err(DiagramError::Syntax { line: 1, .. })));
    assert!(matches!(parse("circle 0 0 -1"), Err(DiagramError::Syntax { .. })));
    assert!(matches!(parse("polyline 0 0 1"), Err(DiagramError::Syntax { .. })));
    assert_eq!(parse("# only a comment\n"), Err(DiagramError::Empty));
  }

  #[test]
  fn renders_svg_payload() {
    let d = render_source(TRIANGLE).expect("render");
    assert_eq!(d.media_type, SVG_MEDIA_TYPE);
    let svg = String::from_utf8(d.bytes).expect("utf8");
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains("<polygon"));
    assert_eq!(svg.matches("<text").count(), 4);
  }

  #[test]
  fn rendering_is_deterministic_and_escapes_text() {
    let src = "point P 1 1\nlabel \"a<b & c\" 0 0";
    let a = render_source(src).expect("render");
    let b = render_source(src).expect("render");
    assert_eq!(a, b);
    let svg = String::from_utf8(a.bytes).expect("utf8");
    assert!(svg.contains("a&lt;b &amp; c"));
  }

  #[test]
  fn extreme_coordinates_are_rejected() {
    assert_eq!(render_source("point A -1e308 0\npoint B 1e308 0"), Err(DiagramError::OutOfRange));
    assert_eq!(render_source("circle 1e308 0 1e308"), Err(DiagramError::OutOfRange));
    let spec = DiagramSpec::default().point("A", f64::NAN, 0.0).point("B", 1.0, 1.0);
    assert_eq!(render_svg(&spec), Err(DiagramError::OutOfRange));

    let far = render_source("point A 1e300 1e300\npoint B 2e300 2e300\nsegment A B").expect("render");
    let svg = String::from_utf8(far.bytes).expect("utf8");
    assert!(!svg.contains("NaN") && !svg.contains("inf"));
  }

  #[test]
  fn builder_matches_parser() {
    let built = DiagramSpec::default()
      .point("A", 0.0, 0.0)
      .point("B", 4.0, 0.0)
      .point("C", 0.0, 3.0)
      .polygon(&["A", "B", "C"])
      .label("5", 2.2, 1.7);
    assert_eq!(built, parse(TRIANGLE).expect("parse"));
  }
}
