//! Bounded random parameter sampling for the item generators.
//!
//! Every generator declares the integer ranges it draws from as `IntRange`
//! constants. The registry validates those declarations once at startup, so a
//! range that collapses to nothing is a configuration error long before any
//! request is served.
//!
//! Randomness is always threaded explicitly through a `Sampler`; there is no
//! ambient RNG. A seeded sampler replays the exact same draw sequence.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Upper bound for `draw_until` loops used by the generators.
pub const DEFAULT_MAX_TRIES: usize = 1_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SampleError {
  #[error("range [{lo}, {hi}] step {step} has no admissible values")]
  EmptyRange { lo: i64, hi: i64, step: i64 },

  #[error("constraint not satisfied after {tries} draws")]
  Exhausted { tries: usize },

  #[error("cannot choose from an empty table")]
  EmptyTable,
}

/// Inclusive integer range with an optional step and excluded values.
///
/// `IntRange::new(-5, 5).excluding(&[0])` is the usual "nonzero coefficient".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntRange {
  pub lo: i64,
  pub hi: i64,
  pub step: i64,
  pub exclude: &'static [i64],
}

impl IntRange {
  pub const fn new(lo: i64, hi: i64) -> Self {
    Self { lo, hi, step: 1, exclude: &[] }
  }

  pub const fn step(self, step: i64) -> Self {
    Self { step, ..self }
  }

  pub const fn excluding(self, exclude: &'static [i64]) -> Self {
    Self { exclude, ..self }
  }

  /// All admissible values in ascending order.
  pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
    let step = self.step.max(1) as usize;
    (self.lo..=self.hi)
      .step_by(step)
      .filter(move |v| !self.exclude.contains(v))
  }

  pub fn admissible_count(&self) -> usize {
    if self.step <= 0 || self.lo > self.hi {
      return 0;
    }
    self.values().count()
  }

  pub fn validate(&self) -> Result<(), SampleError> {
    if self.admissible_count() == 0 {
      return Err(SampleError::EmptyRange { lo: self.lo, hi: self.hi, step: self.step });
    }
    Ok(())
  }

  pub fn contains(&self, v: i64) -> bool {
    self.step > 0
      && v >= self.lo
      && v <= self.hi
      && (v - self.lo) % self.step == 0
      && !self.exclude.contains(&v)
  }
}

/// Per-request randomness source.
pub struct Sampler {
  rng: StdRng,
}

impl Sampler {
  pub fn seeded(seed: u64) -> Self {
    Self { rng: StdRng::seed_from_u64(seed) }
  }

  pub fn from_entropy() -> Self {
    Self { rng: StdRng::from_entropy() }
  }

  /// Uniform draw over the admissible values of `range`.
  pub fn int(&mut self, range: &IntRange) -> Result<i64, SampleError> {
    let n = range.admissible_count();
    if n == 0 {
      return Err(SampleError::EmptyRange { lo: range.lo, hi: range.hi, step: range.step });
    }
    let idx = self.rng.gen_range(0..n);
    range
      .values()
      .nth(idx)
      .ok_or(SampleError::EmptyRange { lo: range.lo, hi: range.hi, step: range.step })
  }

  pub fn choose<'a, T>(&mut self, table: &'a [T]) -> Result<&'a T, SampleError> {
    table.choose(&mut self.rng).ok_or(SampleError::EmptyTable)
  }

  pub fn coin(&mut self) -> bool {
    self.rng.gen_bool(0.5)
  }

  pub fn shuffle<T>(&mut self, items: &mut [T]) {
    items.shuffle(&mut self.rng);
  }

  /// Re-draw a whole tuple until `accept` holds.
  ///
  /// Used for constraints that span several parameters (angle sums, nonzero
  /// determinants, ...). Single-value exclusions belong in `IntRange`.
  pub fn draw_until<T>(
    &mut self,
    max_tries: usize,
    mut draw: impl FnMut(&mut Self) -> Result<T, SampleError>,
    accept: impl Fn(&T) -> bool,
  ) -> Result<T, SampleError> {
    for _ in 0..max_tries {
      let candidate = draw(self)?;
      if accept(&candidate) {
        return Ok(candidate);
      }
    }
    Err(SampleError::Exhausted { tries: max_tries })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn excluded_values_are_never_drawn() {
    let r = IntRange::new(-2, 2).excluding(&[0]);
    let mut s = Sampler::seeded(7);
    for _ in 0..500 {
      let v = s.int(&r).expect("draw");
      assert_ne!(v, 0);
      assert!((-2..=2).contains(&v));
    }
  }

  #[test]
  fn stepped_ranges_respect_step() {
    let r = IntRange::new(30, 80).step(5);
    assert_eq!(r.admissible_count(), 11);
    let mut s = Sampler::seeded(1);
    for _ in 0..200 {
      assert_eq!(s.int(&r).expect("draw") % 5, 0);
    }
  }

  #[test]
  fn collapsed_range_is_a_configuration_error() {
    let r = IntRange::new(0, 0).excluding(&[0]);
    assert!(matches!(r.validate(), Err(SampleError::EmptyRange { .. })));
    assert!(IntRange::new(3, 1).validate().is_err());
    assert!(IntRange::new(1, 3).step(0).validate().is_err());
    let mut s = Sampler::seeded(0);
    assert!(s.int(&r).is_err());
  }

  #[test]
  fn seeded_samplers_replay() {
    let r = IntRange::new(-100, 100);
    let mut a = Sampler::seeded(42);
    let mut b = Sampler::seeded(42);
    let xs: Vec<i64> = (0..20).map(|_| a.int(&r).expect("draw")).collect();
    let ys: Vec<i64> = (0..20).map(|_| b.int(&r).expect("draw")).collect();
    assert_eq!(xs, ys);
  }

  #[test]
  fn draw_until_reports_unsatisfiable_constraints() {
    let r = IntRange::new(1, 3);
    let mut s = Sampler::seeded(3);
    let got = s.draw_until(50, |s| s.int(&r), |v| *v > 10);
    assert_eq!(got, Err(SampleError::Exhausted { tries: 50 }));

    let ok = s.draw_until(DEFAULT_MAX_TRIES, |s| s.int(&r), |v| *v == 2);
    assert_eq!(ok, Ok(2));
  }

  #[test]
  fn contains_matches_values() {
    let r = IntRange::new(-5, 5).excluding(&[-1, 0, 1]);
    for v in -7..=7 {
      assert_eq!(r.contains(v), r.values().any(|x| x == v), "value {v}");
    }
  }

  #[test]
  fn choose_from_empty_table_fails() {
    let mut s = Sampler::seeded(0);
    let empty: [u8; 0] = [];
    assert_eq!(s.choose(&empty), Err(SampleError::EmptyTable));
  }
}
