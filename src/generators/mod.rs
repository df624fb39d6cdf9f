//! Item generators, one template per topic.
//!
//! Each template is split in two: `sample` draws a parameter tuple from the
//! declared ranges, `build` is a pure function from that tuple to an `Item`.
//! Prompt, answer and explanation are all rendered from the same tuple, so a
//! test can construct the parameters by hand and check the exact output.

use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler};

pub mod algebra;
pub mod applications;
pub mod format;
pub mod geometry;
pub mod number;
pub mod quadratic;
pub mod radical;
pub mod sequence;

/// Named range declarations, validated once by the registry.
pub type Ranges = &'static [(&'static str, IntRange)];

pub trait Template: Sized {
  const TOPIC: Topic;
  const RANGES: Ranges;

  fn sample(s: &mut Sampler) -> Result<Self, SampleError>;

  fn build(&self) -> Item;
}

pub fn generate<T: Template>(s: &mut Sampler) -> Result<Item, SampleError> {
  Ok(T::sample(s)?.build())
}

/// English ordinal suffix (`1st`, `12th`, `23rd`).
pub fn ordinal(n: i64) -> String {
  let suffix = match (n % 10, n % 100) {
    (_, 11..=13) => "th",
    (1, _) => "st",
    (2, _) => "nd",
    (3, _) => "rd",
    _ => "th",
  };
  format!("{n}{suffix}")
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ordinals() {
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(22), "22nd");
    assert_eq!(ordinal(50), "50th");
  }
}
