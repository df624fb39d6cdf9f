//! Right triangles, triangle angle sums and gear ratios.

use super::format::gcd;
use super::{Ranges, Template};
use crate::diagram::{render_svg, DiagramSpec};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler, DEFAULT_MAX_TRIES};
use tracing::warn;

// ---------------------------------------------------------------------------
// Pythagorean triples
// ---------------------------------------------------------------------------

pub const TRIPLES: &[(i64, i64, i64)] = &[
  (3, 4, 5),
  (5, 12, 13),
  (6, 8, 10),
  (8, 15, 17),
  (7, 24, 25),
  (9, 12, 15),
  (20, 21, 29),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unknown {
  Hypotenuse,
  Leg,
}

/// Legs `a`, `b` and hypotenuse `c` from the fixed triple table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pythagorean {
  pub a: i64,
  pub b: i64,
  pub c: i64,
  pub unknown: Unknown,
}

impl Pythagorean {
  fn diagram_spec(&self) -> DiagramSpec {
    let (a, b) = (self.a as f64, self.b as f64);
    let off = a.max(b) * 0.06;
    let (leg_b, hyp) = match self.unknown {
      Unknown::Hypotenuse => (self.b.to_string(), "?".to_string()),
      Unknown::Leg => ("?".to_string(), self.c.to_string()),
    };
    DiagramSpec::default()
      .point("C", 0.0, 0.0)
      .point("B", a, 0.0)
      .point("A", 0.0, b)
      .polygon(&["C", "B", "A"])
      .polyline(vec![(off, 0.0), (off, off), (0.0, off)])
      .label(&self.a.to_string(), a / 2.0, -off * 2.0)
      .label(&leg_b, -off * 3.0, b / 2.0)
      .label(&hyp, a / 2.0 + off, b / 2.0 + off)
  }
}

impl Template for Pythagorean {
  const TOPIC: Topic = Topic::Pythagorean;
  const RANGES: Ranges = &[];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let (a, b, c) = *s.choose(TRIPLES)?;
    let unknown = *s.choose(&[Unknown::Hypotenuse, Unknown::Hypotenuse, Unknown::Leg])?;
    Ok(Self { a, b, c, unknown })
  }

  fn build(&self) -> Item {
    let Self { a, b, c, unknown } = *self;
    let item = match unknown {
      Unknown::Hypotenuse => Item::new(
        Self::TOPIC,
        format!("A right triangle has legs {a} and {b}. Find the length of the hypotenuse."),
        c.to_string(),
        format!(
          "By the Pythagorean theorem $c^{{2}} = a^{{2}} + b^{{2}} = {} + {} = {}$, so $c = {c}$.",
          a * a,
          b * b,
          c * c
        ),
      ),
      Unknown::Leg => Item::new(
        Self::TOPIC,
        format!(
          "A right triangle has hypotenuse {c} and one leg {a}. Find the length of the other leg."
        ),
        b.to_string(),
        format!(
          "By the Pythagorean theorem $b^{{2}} = c^{{2}} - a^{{2}} = {} - {} = {}$, so $b = {b}$.",
          c * c,
          a * a,
          b * b
        ),
      ),
    };
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
// Angle sum
// ---------------------------------------------------------------------------

const ANGLE: IntRange = IntRange::new(20, 120).step(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AngleSum {
  pub a1: i64,
  pub a2: i64,
}

impl Template for AngleSum {
  const TOPIC: Topic = Topic::AngleSum;
  const RANGES: Ranges = &[("angle", ANGLE)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let (a1, a2) = s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| Ok((s.int(&ANGLE)?, s.int(&ANGLE)?)),
      |(a1, a2)| a1 + a2 < 180,
    )?;
    Ok(Self { a1, a2 })
  }

  fn build(&self) -> Item {
    let Self { a1, a2 } = *self;
    let third = 180 - a1 - a2;
    Item::new(
      Self::TOPIC,
      format!("Two interior angles of a triangle measure {a1}° and {a2}°. Find the third angle."),
      format!("{third}°"),
      format!("The interior angles of a triangle add up to 180°: 180° - {a1}° - {a2}° = {third}°."),
    )
  }
}

// ---------------------------------------------------------------------------
// Gear ratio
// ---------------------------------------------------------------------------

const TEETH: IntRange = IntRange::new(10, 60);

/// Gear sizes available for the second pair, searched in ascending order.
pub const GEAR_SIZES: &[i64] = &[
  12, 16, 18, 20, 24, 30, 32, 36, 40, 45, 48, 54, 60, 64, 72, 80, 90, 96,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GearRatio {
  pub driver: i64,
  pub driven: i64,
}

impl GearRatio {
  pub fn reduced(&self) -> (i64, i64) {
    let g = gcd(self.driver, self.driven).max(1);
    (self.driver / g, self.driven / g)
  }

  /// First gear pair from `GEAR_SIZES` with the same ratio and a different
  /// driving gear. `None` when the table has no such pair.
  pub fn matching_pair(&self) -> Option<(i64, i64)> {
    let (p, q) = self.reduced();
    GEAR_SIZES
      .iter()
      .copied()
      .filter(|&u| u != self.driver && u % p == 0)
      .map(|u| (u, u / p * q))
      .find(|(_, v)| GEAR_SIZES.contains(v))
  }
}

impl Template for GearRatio {
  const TOPIC: Topic = Topic::GearRatio;
  const RANGES: Ranges = &[("teeth", TEETH)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let (driver, driven) = s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| Ok((s.int(&TEETH)?, s.int(&TEETH)?)),
      |(a, b)| a != b,
    )?;
    Ok(Self { driver, driven })
  }

  fn build(&self) -> Item {
    let Self { driver, driven } = *self;
    let (p, q) = self.reduced();
    let setup = format!("A driving gear with {driver} teeth turns a driven gear with {driven} teeth.");
    match self.matching_pair() {
      Some((u, v)) => Item::new(
        Self::TOPIC,
        format!(
          "{setup} A second pair of gears must turn in the same ratio, and its driving gear has {u} teeth. \
           How many teeth does its driven gear need?"
        ),
        format!("{v} teeth"),
        format!(
          "The ratio is {driver}:{driven} = {p}:{q}. Keeping it means {u}:x = {p}:{q}, \
           so $x = {u} \\times {q} \\div {p} = {v}$."
        ),
      ),
      // No pair in the table keeps the ratio: ask for the ratio itself.
      None => Item::new(
        Self::TOPIC,
        format!("{setup} Write the gear ratio (driving : driven) in simplest form."),
        format!("{p}:{q}"),
        format!(
          "The greatest common divisor of {driver} and {driven} is {}, so {driver}:{driven} = {p}:{q}.",
          gcd(driver, driven)
        ),
      ),
    }
  }
}
