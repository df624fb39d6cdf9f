//! Quadratic functions in vertex form.

use super::format::{coef_prefix, lead_term, next_term, shifted};
use super::{Ranges, Template};
use crate::diagram::{render_svg, DiagramSpec};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler, DEFAULT_MAX_TRIES};
use tracing::warn;

// ---------------------------------------------------------------------------
// Projectile maximum
// ---------------------------------------------------------------------------

const PEAK_TIME: IntRange = IntRange::new(2, 6);
const PEAK_HEIGHT: IntRange = IntRange::new(20, 100);
const GRAVITY: &[i64] = &[-1, -2, -5];

/// `h(t) = a(t - h)² + k` expanded to `a·t² + b·t + c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadraticVertex {
  pub a: i64,
  pub h: i64,
  pub k: i64,
}

impl QuadraticVertex {
  pub fn b(&self) -> i64 {
    -2 * self.a * self.h
  }

  pub fn c(&self) -> i64 {
    self.a * self.h * self.h + self.k
  }

  pub fn standard_form(&self) -> String {
    format!(
      "{}{}{}",
      lead_term(self.a, "t^{2}"),
      next_term(self.b(), "t"),
      next_term(self.c(), "")
    )
  }

  fn height_at(&self, t: f64) -> f64 {
    let d = t - self.h as f64;
    self.a as f64 * d * d + self.k as f64
  }

  fn diagram_spec(&self) -> DiagramSpec {
    let end = 2.0 * self.h as f64;
    let curve = (0..=20).map(|i| end * i as f64 / 20.0).map(|t| (t, self.height_at(t))).collect();
    DiagramSpec::default()
      .point("O", 0.0, 0.0)
      .point("T", end, 0.0)
      .segment("O", "T")
      .polyline(curve)
      .point("V", self.h as f64, self.k as f64)
      .label("t", end, -(self.k as f64) * 0.08)
      .label("h", 0.0, self.k as f64 * 1.05)
  }
}

impl Template for QuadraticVertex {
  const TOPIC: Topic = Topic::QuadraticVertex;
  const RANGES: Ranges = &[("peak_time", PEAK_TIME), ("peak_height", PEAK_HEIGHT)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| Ok(Self { a: *s.choose(GRAVITY)?, h: s.int(&PEAK_TIME)?, k: s.int(&PEAK_HEIGHT)? }),
      |q| q.c() >= 0,
    )
  }

  fn build(&self) -> Item {
    let Self { a, h, k } = *self;
    let item = Item::new(
      Self::TOPIC,
      format!(
        "A ball is thrown upward. Its height after $t$ seconds is $h(t) = {}$ meters. \
         After how many seconds does it reach its highest point, and what is that height?",
        self.standard_form()
      ),
      format!("{h} seconds, {k} meters"),
      format!(
        "Complete the square: $h(t) = {}{}^{{2}}{}$. The leading coefficient {a} is negative, \
         so the maximum {k} is reached at $t = {h}$.",
        coef_prefix(a),
        shifted("t", h),
        next_term(k, "")
      ),
    );
    match render_svg(&self.diagram_spec()) {
      Ok(d) => item.with_diagram(d),
      Err(e) => {
        warn!(
          target: "exam",
          topic = Self::TOPIC.id(),
          error = %e,
          "Diagram render failed; item kept without diagram"
        );
        item
      }
    }
  }
}

// ---------------------------------------------------------------------------
// Horizontal shift
// ---------------------------------------------------------------------------

const LEAD: IntRange = IntRange::new(-3, 3).excluding(&[0]);
const VERTEX_X: IntRange = IntRange::new(-6, 6);
const VERTEX_Y: IntRange = IntRange::new(-9, 9);
const SHIFT: IntRange = IntRange::new(1, 6);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
  Left,
  Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadraticShift {
  pub a: i64,
  pub h: i64,
  pub k: i64,
  pub shift: i64,
  pub direction: Direction,
}

impl QuadraticShift {
  pub fn new_vertex(&self) -> (i64, i64) {
    match self.direction {
      Direction::Left => (self.h - self.shift, self.k),
      Direction::Right => (self.h + self.shift, self.k),
    }
  }
}

impl Template for QuadraticShift {
  const TOPIC: Topic = Topic::QuadraticShift;
  const RANGES: Ranges = &[("a", LEAD), ("h", VERTEX_X), ("k", VERTEX_Y), ("shift", SHIFT)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    Ok(Self {
      a: s.int(&LEAD)?,
      h: s.int(&VERTEX_X)?,
      k: s.int(&VERTEX_Y)?,
      shift: s.int(&SHIFT)?,
      direction: if s.coin() { Direction::Left } else { Direction::Right },
    })
  }

  fn build(&self) -> Item {
    let Self { a, h, k, shift, direction } = *self;
    let (nx, ny) = self.new_vertex();
    let (side, op) = match direction {
      Direction::Left => ("left", "-"),
      Direction::Right => ("right", "+"),
    };
    let unit = if shift == 1 { "unit" } else { "units" };
    Item::new(
      Self::TOPIC,
      format!(
        "The graph of $y = {}{}^{{2}}{}$ is shifted {shift} {unit} to the {side}. \
         What is the vertex of the new graph?",
        coef_prefix(a),
        shifted("x", h),
        next_term(k, "")
      ),
      format!("$({nx}, {ny})$"),
      format!(
        "The original vertex is $({h}, {k})$. A horizontal shift to the {side} changes only the \
         x-coordinate: $({h} {op} {shift}, {k}) = ({nx}, {ny})$."
      ),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generators::strategy::declared;
  use proptest::prelude::*;

  #[test]
  fn ball_peaks_at_three_seconds() {
    let q = QuadraticVertex { a: -5, h: 3, k: 50 };
    assert_eq!((q.b(), q.c()), (30, 5));
    let item = q.build();
    assert!(item.prompt.contains("$h(t) = -5t^{2} + 30t + 5$"));
    assert_eq!(item.answer, "3 seconds, 50 meters");
    assert!(item.explanation.contains("-5(t - 3)^{2} + 50"));
    assert!(item.diagram.is_some());
  }

  proptest! {
    #[test]
    fn vertex_form_expands_consistently(seed in any::<u64>()) {
      let q = QuadraticVertex::sample(&mut Sampler::seeded(seed)).expect("sample");
      prop_assert!(q.c() >= 0);
      for t in 0..10 {
        let expanded = q.a * t * t + q.b() * t + q.c();
        prop_assert_eq!(expanded, q.a * (t - q.h) * (t - q.h) + q.k);
      }
    }

    #[test]
    fn every_trajectory_draws_its_diagram(
      a in proptest::sample::select(GRAVITY),
      h in declared::<QuadraticVertex>("peak_time"),
      k in declared::<QuadraticVertex>("peak_height"),
    ) {
      let q = QuadraticVertex { a, h, k };
      prop_assert!(render_svg(&q.diagram_spec()).is_ok());
      prop_assert!(q.build().diagram.is_some());
    }
  }

  #[test]
  fn unit_leading_coefficient_and_zero_launch_height() {
    // a = -1, h = 5, k = 25 gives c = 0, so the constant term disappears.
    let q = QuadraticVertex { a: -1, h: 5, k: 25 };
    assert_eq!(q.standard_form(), "-t^{2} + 10t");
  }

  #[test]
  fn shift_moves_only_the_x_coordinate() {
    let left = QuadraticShift { a: 2, h: 3, k: 1, shift: 4, direction: Direction::Left };
    let item = left.build();
    assert!(item.prompt.contains("$y = 2(x - 3)^{2} + 1$"));
    assert!(item.prompt.contains("4 units to the left"));
    assert_eq!(item.answer, "$(-1, 1)$");

    let right = QuadraticShift { direction: Direction::Right, ..left };
    assert_eq!(right.new_vertex(), (7, 1));
    assert_eq!(right.build().answer, "$(7, 1)$");
  }

  #[test]
  fn shift_renders_negative_vertex() {
    let q = QuadraticShift { a: -1, h: -2, k: -5, shift: 1, direction: Direction::Right };
    let item = q.build();
    assert!(item.prompt.contains("$y = -(x + 2)^{2} - 5$"));
    assert!(item.prompt.contains("1 unit to the right"));
    assert_eq!(item.answer, "$(-1, -5)$");
  }
}
