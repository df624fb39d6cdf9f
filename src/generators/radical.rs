//! Simplifying and combining square-root terms.

use std::collections::BTreeMap;

use super::format::{lead_term, next_term, split_square};
use super::{Ranges, Template};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler};

const SQUARE_FREE: &[i64] = &[2, 3, 5, 6, 7];
const COEF: IntRange = IntRange::new(-3, 3).excluding(&[0]);
const SQUARE: IntRange = IntRange::new(1, 4);

/// `coef·√radicand`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadicalTerm {
  pub coef: i64,
  pub radicand: i64,
}

fn sqrt_of(inner: i64) -> String {
  if inner == 1 { String::new() } else { format!("\\sqrt{{{inner}}}") }
}

fn sum_of(terms: impl IntoIterator<Item = (i64, String)>) -> String {
  let mut out = String::new();
  for (coef, var) in terms {
    if out.is_empty() {
      out = lead_term(coef, &var);
    } else {
      out.push_str(&next_term(coef, &var));
    }
  }
  if out.is_empty() { "0".to_string() } else { out }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadicalSimplification {
  pub terms: Vec<RadicalTerm>,
}

impl RadicalSimplification {
  /// Like radicals combined, keyed by square-free part in ascending order.
  /// Terms that cancel are dropped.
  pub fn combined(&self) -> BTreeMap<i64, i64> {
    let mut by_inner = BTreeMap::new();
    for t in &self.terms {
      let (outer, inner) = split_square(t.radicand);
      *by_inner.entry(inner).or_insert(0) += t.coef * outer;
    }
    by_inner.retain(|_, c| *c != 0);
    by_inner
  }

  fn expression(&self) -> String {
    sum_of(self.terms.iter().map(|t| (t.coef, format!("\\sqrt{{{}}}", t.radicand))))
  }

  fn simplified(&self) -> String {
    sum_of(self.combined().into_iter().map(|(inner, c)| (c, sqrt_of(inner))))
  }
}

impl Template for RadicalSimplification {
  const TOPIC: Topic = Topic::RadicalSimplification;
  const RANGES: Ranges = &[("coef", COEF), ("square", SQUARE)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let shared = *s.choose(SQUARE_FREE)?;
    let other = *s.choose(SQUARE_FREE)?;
    let mut terms = Vec::with_capacity(3);
    for base in [shared, shared, other] {
      let sq = s.int(&SQUARE)?;
      terms.push(RadicalTerm { coef: s.int(&COEF)?, radicand: sq * sq * base });
    }
    s.shuffle(&mut terms);
    Ok(Self { terms })
  }

  fn build(&self) -> Item {
    let steps: Vec<String> = self
      .terms
      .iter()
      .filter_map(|t| {
        let (outer, inner) = split_square(t.radicand);
        (outer > 1).then(|| {
          format!("$\\sqrt{{{}}} = {}$", t.radicand, lead_term(outer, &sqrt_of(inner)))
        })
      })
      .collect();
    let rewrite = if steps.is_empty() {
      "Every radicand is already square-free.".to_string()
    } else {
      format!("Take out the square factors: {}.", steps.join(", "))
    };
    Item::new(
      Self::TOPIC,
      format!("Simplify: ${}$", self.expression()),
      format!("${}$", self.simplified()),
      format!("{rewrite} Combining like radicals gives ${}$.", self.simplified()),
    )
  }
}
