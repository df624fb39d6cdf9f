//! Linear equations, inequalities and 2×2 systems, built backwards from the solution.

use super::format::{fraction, lead_term, next_term, operand};
use super::{Ranges, Template};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler, DEFAULT_MAX_TRIES};

const SOLUTION: IntRange = IntRange::new(-15, 15);
const COEFFICIENT: IntRange = IntRange::new(-5, 5).excluding(&[-1, 0, 1]);
const OFFSET: IntRange = IntRange::new(-20, 20).excluding(&[0]);
const DELTA: IntRange = IntRange::new(1, 10);

fn lhs(a: i64, b: i64) -> String {
  format!("{}{}", lead_term(a, "x"), next_term(b, ""))
}

// ---------------------------------------------------------------------------
// a·x + b = c
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearEquation {
  pub a: i64,
  pub b: i64,
  pub x: i64,
}

impl LinearEquation {
  pub fn rhs(&self) -> i64 {
    self.a * self.x + self.b
  }
}

impl Template for LinearEquation {
  const TOPIC: Topic = Topic::LinearEquation;
  const RANGES: Ranges = &[("x", SOLUTION), ("a", COEFFICIENT), ("b", OFFSET)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    Ok(Self { x: s.int(&SOLUTION)?, a: s.int(&COEFFICIENT)?, b: s.int(&OFFSET)? })
  }

  fn build(&self) -> Item {
    let Self { a, b, x } = *self;
    let c = self.rhs();
    let prompt = format!("Solve the equation ${} = {c}$.", lhs(a, b));
    let explanation = format!(
      "Move the constant to the right: ${} = {c} - {} = {}$. Divide both sides by {}: $x = {x}$.",
      lead_term(a, "x"),
      operand(b),
      c - b,
      operand(a)
    );
    Item::new(Self::TOPIC, prompt, format!("$x = {x}$"), explanation)
  }
}

// ---------------------------------------------------------------------------
// a·x + b (op) c
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
  Gt,
  Ge,
  Lt,
  Le,
}

impl Cmp {
  pub fn symbol(self) -> &'static str {
    match self {
      Cmp::Gt => ">",
      Cmp::Ge => "\\ge",
      Cmp::Lt => "<",
      Cmp::Le => "\\le",
    }
  }

  pub fn flipped(self) -> Self {
    match self {
      Cmp::Gt => Cmp::Lt,
      Cmp::Ge => Cmp::Le,
      Cmp::Lt => Cmp::Gt,
      Cmp::Le => Cmp::Ge,
    }
  }
}

/// The right-hand side is `a·x + b − delta`, so the boundary is
/// `x − delta/a` rather than the sampled `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearInequality {
  pub a: i64,
  pub b: i64,
  pub x: i64,
  pub delta: i64,
  pub cmp: Cmp,
}

impl LinearInequality {
  pub fn rhs(&self) -> i64 {
    self.a * self.x + self.b - self.delta
  }

  /// Comparison after isolating `x`: reversed when dividing by a negative.
  pub fn solution_cmp(&self) -> Cmp {
    if self.a < 0 { self.cmp.flipped() } else { self.cmp }
  }
}

impl Template for LinearInequality {
  const TOPIC: Topic = Topic::LinearInequality;
  const RANGES: Ranges = &[
    ("x", SOLUTION),
    ("a", COEFFICIENT),
    ("b", OFFSET),
    ("delta", DELTA),
  ];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    Ok(Self {
      x: s.int(&SOLUTION)?,
      a: s.int(&COEFFICIENT)?,
      b: s.int(&OFFSET)?,
      delta: s.int(&DELTA)?,
      cmp: *s.choose(&[Cmp::Gt, Cmp::Ge, Cmp::Lt, Cmp::Le])?,
    })
  }

  fn build(&self) -> Item {
    let Self { a, b, cmp, .. } = *self;
    let c = self.rhs();
    let out = self.solution_cmp();
    let boundary = fraction(c - b, a);
    let prompt = format!("Solve the inequality ${} {} {c}$.", lhs(a, b), cmp.symbol());
    let answer = format!("$x {} {boundary}$", out.symbol());
    let division = if a < 0 {
      format!("Dividing both sides by the negative number {a} reverses the inequality sign")
    } else {
      format!("Dividing both sides by the positive number {a} keeps the inequality sign")
    };
    let explanation = format!(
      "Move the constant to the right: ${} {} {} = {}$. {division}: {answer}.",
      lead_term(a, "x"),
      cmp.symbol(),
      format!("{c} - {}", operand(b)),
      c - b
    );
    Item::new(Self::TOPIC, prompt, answer, explanation)
  }
}

// ---------------------------------------------------------------------------
// 2×2 system, asked for p·x + q·y
// ---------------------------------------------------------------------------

const SYS_VALUE: IntRange = IntRange::new(-6, 6);
const SYS_COEFFICIENT: IntRange = IntRange::new(-5, 5).excluding(&[0]);
const QUERY_P: IntRange = IntRange::new(1, 4);
const QUERY_Q: IntRange = IntRange::new(-4, 4).excluding(&[0]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearSystem {
  pub x: i64,
  pub y: i64,
  pub a1: i64,
  pub b1: i64,
  pub a2: i64,
  pub b2: i64,
  pub p: i64,
  pub q: i64,
}

impl LinearSystem {
  pub fn determinant(&self) -> i64 {
    self.a1 * self.b2 - self.a2 * self.b1
  }

  pub fn constants(&self) -> (i64, i64) {
    (self.a1 * self.x + self.b1 * self.y, self.a2 * self.x + self.b2 * self.y)
  }

  pub fn query_value(&self) -> i64 {
    self.p * self.x + self.q * self.y
  }
}

impl Template for LinearSystem {
  const TOPIC: Topic = Topic::LinearSystem;
  const RANGES: Ranges = &[
    ("value", SYS_VALUE),
    ("coefficient", SYS_COEFFICIENT),
    ("p", QUERY_P),
    ("q", QUERY_Q),
  ];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let x = s.int(&SYS_VALUE)?;
    let y = s.int(&SYS_VALUE)?;
    let (a1, b1, a2, b2) = s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| {
        Ok((
          s.int(&SYS_COEFFICIENT)?,
          s.int(&SYS_COEFFICIENT)?,
          s.int(&SYS_COEFFICIENT)?,
          s.int(&SYS_COEFFICIENT)?,
        ))
      },
      |(a1, b1, a2, b2)| a1 * b2 - a2 * b1 != 0,
    )?;
    Ok(Self { x, y, a1, b1, a2, b2, p: s.int(&QUERY_P)?, q: s.int(&QUERY_Q)? })
  }

  fn build(&self) -> Item {
    let (c1, c2) = self.constants();
    let eq1 = format!("{}{} = {c1}", lead_term(self.a1, "x"), next_term(self.b1, "y"));
    let eq2 = format!("{}{} = {c2}", lead_term(self.a2, "x"), next_term(self.b2, "y"));
    let query = format!("{}{}", lead_term(self.p, "x"), next_term(self.q, "y"));
    let value = self.query_value();
    let prompt = format!(
      "The numbers $x$ and $y$ satisfy ${eq1}$ and ${eq2}$. Find the value of ${query}$."
    );
    let explanation = format!(
      "The determinant is ${} \\times {} - {} \\times {} = {}$, which is not zero, so the system has exactly one solution. \
       Eliminating one variable gives $x = {}$ and $y = {}$. Then ${query} = {} \\times {} + {} \\times {} = {value}$.",
      operand(self.a1), operand(self.b2), operand(self.a2), operand(self.b1), self.determinant(),
      self.x, self.y,
      self.p, operand(self.x), operand(self.q), operand(self.y)
    );
    Item::new(Self::TOPIC, prompt, value.to_string(), explanation)
  }
}
