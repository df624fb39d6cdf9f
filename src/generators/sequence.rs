//! Arithmetic sequences, plain and as matchstick patterns.

use super::format::operand;
use super::{ordinal, Ranges, Template};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler};

const FIRST: IntRange = IntRange::new(-10, 20);
const DIFF: IntRange = IntRange::new(-6, 9).excluding(&[0]);
const TERMS: IntRange = IntRange::new(8, 30);
const SHAPES: IntRange = IntRange::new(10, 50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
  Plain,
  /// Connected squares: 4, 7, 10, ...
  Squares,
  /// Connected triangles: 3, 5, 7, ...
  Triangles,
}

impl Context {
  fn shape(self) -> Option<&'static str> {
    match self {
      Context::Plain => None,
      Context::Squares => Some("squares"),
      Context::Triangles => Some("triangles"),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ask {
  NthTerm,
  Sum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArithmeticSequence {
  pub a1: i64,
  pub d: i64,
  pub n: i64,
  pub context: Context,
  pub ask: Ask,
}

impl ArithmeticSequence {
  pub fn nth(&self) -> i64 {
    self.a1 + (self.n - 1) * self.d
  }

  /// `n(a1 + an)` is always even for integer `a1` and `d`.
  pub fn sum(&self) -> i64 {
    self.n * (self.a1 + self.nth()) / 2
  }

  fn leading_terms(&self) -> String {
    (0..3)
      .map(|i| (self.a1 + i * self.d).to_string())
      .collect::<Vec<_>>()
      .join(", ")
  }

  fn nth_steps(&self) -> String {
    let Self { a1, d, n, .. } = *self;
    format!("$a_{{n}} = a_{{1}} + (n-1)d = {a1} + ({n}-1) \\times {} = {}$", operand(d), self.nth())
  }
}

impl Template for ArithmeticSequence {
  const TOPIC: Topic = Topic::ArithmeticSequence;
  const RANGES: Ranges = &[("a1", FIRST), ("d", DIFF), ("n", TERMS), ("shapes", SHAPES)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let context = *s.choose(&[Context::Plain, Context::Plain, Context::Squares, Context::Triangles])?;
    Ok(match context {
      Context::Plain => Self {
        a1: s.int(&FIRST)?,
        d: s.int(&DIFF)?,
        n: s.int(&TERMS)?,
        context,
        ask: if s.coin() { Ask::NthTerm } else { Ask::Sum },
      },
      Context::Squares => Self { a1: 4, d: 3, n: s.int(&SHAPES)?, context, ask: Ask::NthTerm },
      Context::Triangles => Self { a1: 3, d: 2, n: s.int(&SHAPES)?, context, ask: Ask::NthTerm },
    })
  }

  fn build(&self) -> Item {
    let Self { a1, d, n, context, ask } = *self;
    if let Some(shape) = context.shape() {
      return Item::new(
        Self::TOPIC,
        format!(
          "Matchsticks are arranged into a row of connected {shape}. One shape takes {a1} matchsticks, \
           two take {} and three take {}. Following the pattern, how many matchsticks are needed for {n} {shape}?",
          a1 + d,
          a1 + 2 * d
        ),
        format!("{} matchsticks", self.nth()),
        format!(
          "The counts form an arithmetic sequence with first term $a_{{1}} = {a1}$ and common difference $d = {d}$. {}.",
          self.nth_steps()
        ),
      );
    }

    let terms = self.leading_terms();
    match ask {
      Ask::NthTerm => Item::new(
        Self::TOPIC,
        format!("In the arithmetic sequence ${terms}, \\ldots$, what is the {} term?", ordinal(n)),
        self.nth().to_string(),
        format!("Here $a_{{1}} = {a1}$ and $d = {d}$, so {}.", self.nth_steps()),
      ),
      Ask::Sum => Item::new(
        Self::TOPIC,
        format!("Find the sum of the first {n} terms of the arithmetic sequence ${terms}, \\ldots$."),
        self.sum().to_string(),
        format!(
          "First {}. Then $S_{{n}} = \\frac{{n(a_{{1}} + a_{{n}})}}{{2}} = \\frac{{{n} \\times ({a1} + {})}}{{2}} = {}$.",
          self.nth_steps(),
          operand(self.nth()),
          self.sum()
        ),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn plain(a1: i64, d: i64, n: i64, ask: Ask) -> ArithmeticSequence {
    ArithmeticSequence { a1, d, n, context: Context::Plain, ask }
  }

  #[test]
  fn tenth_term_of_four_seven_ten() {
    let item = plain(4, 3, 10, Ask::NthTerm).build();
    assert!(item.prompt.contains("4, 7, 10"));
    assert!(item.prompt.contains("10th term"));
    assert_eq!(item.answer, "31");
  }

  #[test]
  fn sums_are_exact() {
    let seq = plain(4, 3, 10, Ask::Sum);
    assert_eq!(seq.sum(), 175);
    assert_eq!(seq.build().answer, "175");
  }

  proptest! {
    #[test]
    fn sampled_sums_match_term_by_term_addition(seed in any::<u64>()) {
      let seq = ArithmeticSequence::sample(&mut Sampler::seeded(seed)).expect("sample");
      let brute: i64 = (0..seq.n).map(|i| seq.a1 + i * seq.d).sum();
      prop_assert_eq!(seq.sum(), brute);
    }
  }

  #[test]
  fn matchstick_patterns_ask_for_the_nth_count() {
    let seq = ArithmeticSequence { a1: 4, d: 3, n: 12, context: Context::Squares, ask: Ask::NthTerm };
    let item = seq.build();
    assert!(item.prompt.contains("connected squares"));
    assert!(item.prompt.contains("two take 7 and three take 10"));
    assert_eq!(item.answer, "37 matchsticks");

    let seq = ArithmeticSequence { a1: 3, d: 2, n: 10, context: Context::Triangles, ask: Ask::NthTerm };
    assert_eq!(seq.build().answer, "21 matchsticks");
  }
}
