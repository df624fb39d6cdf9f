//! Number sense: signed arithmetic, scientific notation, exponent laws, GCD/LCM.

use super::format::{gcd, lcm, operand};
use super::{Ranges, Template};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler, DEFAULT_MAX_TRIES};

// ---------------------------------------------------------------------------
// Arithmetic expression
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
  Add,
  Sub,
  Mul,
  Div,
}

impl Op {
  fn symbol(self) -> &'static str {
    match self {
      Op::Add => "+",
      Op::Sub => "-",
      Op::Mul => "\\times",
      Op::Div => "\\div",
    }
  }

  fn binds_tight(self) -> bool {
    matches!(self, Op::Mul | Op::Div)
  }

  /// Division is exact by construction (`b = q·c`, `c ≠ 0`).
  fn apply(self, l: i64, r: i64) -> i64 {
    match self {
      Op::Add => l + r,
      Op::Sub => l - r,
      Op::Mul => l * r,
      Op::Div => l / r,
    }
  }
}

const EXPR_A: IntRange = IntRange::new(-20, 20);
const EXPR_B: IntRange = IntRange::new(-20, 20);
const EXPR_C: IntRange = IntRange::new(-10, 10).excluding(&[0]);
const EXPR_QUOTIENT: IntRange = IntRange::new(-10, 10);

/// `a op1 b op2 c` with `op1 ∈ {+, -}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expression {
  pub a: i64,
  pub op1: Op,
  pub b: i64,
  pub op2: Op,
  pub c: i64,
}

impl Expression {
  pub fn value(&self) -> i64 {
    if self.op2.binds_tight() && !self.op1.binds_tight() {
      self.op1.apply(self.a, self.op2.apply(self.b, self.c))
    } else {
      self.op2.apply(self.op1.apply(self.a, self.b), self.c)
    }
  }
}

impl Template for Expression {
  const TOPIC: Topic = Topic::ArithmeticExpression;
  const RANGES: Ranges = &[
    ("a", EXPR_A),
    ("b", EXPR_B),
    ("c", EXPR_C),
    ("quotient", EXPR_QUOTIENT),
  ];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let a = s.int(&EXPR_A)?;
    let op1 = *s.choose(&[Op::Add, Op::Sub])?;
    let op2 = *s.choose(&[Op::Add, Op::Sub, Op::Mul, Op::Div])?;
    let c = s.int(&EXPR_C)?;
    let b = if op2 == Op::Div { s.int(&EXPR_QUOTIENT)? * c } else { s.int(&EXPR_B)? };
    Ok(Self { a, op1, b, op2, c })
  }

  fn build(&self) -> Item {
    let Self { a, op1, b, op2, c } = *self;
    let value = self.value();
    let prompt = format!(
      "Evaluate: ${} {} {} {} {}$",
      a,
      op1.symbol(),
      operand(b),
      op2.symbol(),
      operand(c)
    );
    let explanation = if op2.binds_tight() {
      let inner = op2.apply(b, c);
      format!(
        "Multiply and divide before adding and subtracting: ${} {} {} = {}$, then ${} {} {} = {}$.",
        operand(b), op2.symbol(), operand(c), inner,
        a, op1.symbol(), operand(inner), value
      )
    } else {
      let first = op1.apply(a, b);
      format!(
        "Only addition and subtraction, so work left to right: ${} {} {} = {}$, then ${} {} {} = {}$.",
        a, op1.symbol(), operand(b), first,
        first, op2.symbol(), operand(c), value
      )
    };
    Item::new(Self::TOPIC, prompt, value.to_string(), explanation)
  }
}

// ---------------------------------------------------------------------------
// Scientific notation
// ---------------------------------------------------------------------------

const SCI_BASE: IntRange = IntRange::new(1, 9);
const SCI_EXPONENT: IntRange = IntRange::new(-8, 8);

/// `base × 10^exponent`; already normalized since `1 ≤ base < 10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scientific {
  pub base: i64,
  pub exponent: i64,
}

impl Scientific {
  /// The value written out in positional notation.
  pub fn positional(&self) -> String {
    if self.exponent >= 0 {
      (self.base * 10_i64.pow(self.exponent as u32)).to_string()
    } else {
      let zeros = "0".repeat((-self.exponent - 1) as usize);
      format!("0.{zeros}{}", self.base)
    }
  }
}

impl Template for Scientific {
  const TOPIC: Topic = Topic::ScientificNotation;
  const RANGES: Ranges = &[("base", SCI_BASE), ("exponent", SCI_EXPONENT)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    Ok(Self { base: s.int(&SCI_BASE)?, exponent: s.int(&SCI_EXPONENT)? })
  }

  fn build(&self) -> Item {
    let value = self.positional();
    let answer = format!("${} \\times 10^{{{}}}$", self.base, self.exponent);
    let explanation = match self.exponent {
      0 => format!(
        "{value} is already between 1 and 10, so the power of ten is $10^{{0}}$: {answer}."
      ),
      e => format!(
        "Scientific notation has the form $a \\times 10^{{n}}$ with $1 \\le a < 10$. \
         Moving the decimal point {} place(s) to the {} gives $a = {}$, so {value} = {answer}.",
        e.abs(),
        if e > 0 { "left" } else { "right" },
        self.base
      ),
    };
    Item::new(
      Self::TOPIC,
      format!("Write {value} in scientific notation."),
      answer,
      explanation,
    )
  }
}

// ---------------------------------------------------------------------------
// Exponent laws
// ---------------------------------------------------------------------------

const EXP_BASE: IntRange = IntRange::new(2, 5);
const EXP_INNER: IntRange = IntRange::new(-3, 5).excluding(&[0, 1]);
const EXP_OUTER: IntRange = IntRange::new(2, 5);

/// `(b^p1)^p2 ÷ b^p2 = b^(p1·p2 − p2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExponentLaw {
  pub base: i64,
  pub p1: i64,
  pub p2: i64,
}

impl ExponentLaw {
  pub fn result_exponent(&self) -> i64 {
    self.p1 * self.p2 - self.p2
  }
}

impl Template for ExponentLaw {
  const TOPIC: Topic = Topic::ExponentLaw;
  const RANGES: Ranges = &[("base", EXP_BASE), ("p1", EXP_INNER), ("p2", EXP_OUTER)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    Ok(Self { base: s.int(&EXP_BASE)?, p1: s.int(&EXP_INNER)?, p2: s.int(&EXP_OUTER)? })
  }

  fn build(&self) -> Item {
    let Self { base, p1, p2 } = *self;
    let product = p1 * p2;
    let e = self.result_exponent();
    let prompt = format!("Simplify: $({base}^{{{p1}}})^{{{p2}}} \\div {base}^{{{p2}}}$");
    let answer = format!("${base}^{{{e}}}$");
    let tail = match e {
      0 => " = 1".to_string(),
      e if e < 0 => format!(" = \\frac{{1}}{{{base}^{{{}}}}}", -e),
      _ => String::new(),
    };
    let explanation = format!(
      "Power of a power multiplies exponents: $({base}^{{{p1}}})^{{{p2}}} = {base}^{{{product}}}$. \
       Dividing subtracts exponents: ${base}^{{{product}}} \\div {base}^{{{p2}}} = {base}^{{{product} - {p2}}} = {base}^{{{e}}}{tail}$."
    );
    Item::new(Self::TOPIC, prompt, answer, explanation)
  }
}

// ---------------------------------------------------------------------------
// GCD / LCM
// ---------------------------------------------------------------------------

const GCD_FACTOR: IntRange = IntRange::new(2, 12);
const GCD_MULTIPLIER: IntRange = IntRange::new(2, 9);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Divisibility {
  Gcd,
  Lcm,
}

/// Two numbers built as multiples of a common factor. The answer is always
/// computed from the numbers themselves, not from the factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GcdLcm {
  pub a: i64,
  pub b: i64,
  pub ask: Divisibility,
}

impl Template for GcdLcm {
  const TOPIC: Topic = Topic::GcdLcm;
  const RANGES: Ranges = &[("factor", GCD_FACTOR), ("multiplier", GCD_MULTIPLIER)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    let factor = s.int(&GCD_FACTOR)?;
    let (m1, m2) = s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| Ok((s.int(&GCD_MULTIPLIER)?, s.int(&GCD_MULTIPLIER)?)),
      |(m1, m2)| m1 != m2,
    )?;
    let ask = *s.choose(&[Divisibility::Gcd, Divisibility::Lcm])?;
    Ok(Self { a: factor * m1, b: factor * m2, ask })
  }

  fn build(&self) -> Item {
    let Self { a, b, ask } = *self;
    let g = gcd(a, b);
    let (ra, rb) = (a / g, b / g);
    let split = format!(
      "$({a}, {b})$ share the factor {g}: ${a} = {g} \\times {ra}$ and ${b} = {g} \\times {rb}$, \
       and {ra} and {rb} have no common factor other than 1"
    );
    match ask {
      Divisibility::Gcd => Item::new(
        Self::TOPIC,
        format!("Find the greatest common divisor of {a} and {b}."),
        g.to_string(),
        format!("{split}, so the greatest common divisor is {g}."),
      ),
      Divisibility::Lcm => {
        let l = lcm(a, b);
        Item::new(
          Self::TOPIC,
          format!("Find the least common multiple of {a} and {b}."),
          l.to_string(),
          format!(
            "{split}. The least common multiple is ${g} \\times {ra} \\times {rb} = {l}$."
          ),
        )
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generators::generate;
  use crate::generators::strategy::declared;
  use proptest::prelude::*;

  #[test]
  fn precedence_is_respected() {
    let e = Expression { a: 3, op1: Op::Sub, b: 4, op2: Op::Mul, c: -2 };
    assert_eq!(e.value(), 11);
    let item = e.build();
    assert_eq!(item.prompt, "Evaluate: $3 - 4 \\times (-2)$");
    assert_eq!(item.answer, "11");

    // a - b - c is (a - b) - c, never a - (b - c).
    let e = Expression { a: 10, op1: Op::Sub, b: 4, op2: Op::Sub, c: 3 };
    assert_eq!(e.value(), 3);
    let e = Expression { a: 1, op1: Op::Add, b: -12, op2: Op::Div, c: 4 };
    assert_eq!(e.value(), -2);
  }

  proptest! {
    #[test]
    fn sampled_divisions_are_exact(seed in any::<u64>()) {
      let e = Expression::sample(&mut Sampler::seeded(seed)).expect("sample");
      prop_assert_ne!(e.c, 0);
      if e.op2 == Op::Div {
        prop_assert_eq!(e.b % e.c, 0);
      }
      prop_assert_eq!(e.build().answer, e.value().to_string());
    }

    #[test]
    fn exponent_answers_match_formula(
      base in declared::<ExponentLaw>("base"),
      p1 in declared::<ExponentLaw>("p1"),
      p2 in declared::<ExponentLaw>("p2"),
    ) {
      let item = ExponentLaw { base, p1, p2 }.build();
      prop_assert_eq!(item.answer, format!("${base}^{{{}}}$", p1 * p2 - p2));
    }

    #[test]
    fn sampled_gcd_items_are_consistent(seed in any::<u64>()) {
      let p = GcdLcm::sample(&mut Sampler::seeded(seed)).expect("sample");
      prop_assert_ne!(p.a, p.b);
      let expected = match p.ask {
        Divisibility::Gcd => gcd(p.a, p.b),
        Divisibility::Lcm => lcm(p.a, p.b),
      };
      prop_assert_eq!(p.build().answer, expected.to_string());
    }
  }

  #[test]
  fn scientific_notation_positional_forms() {
    assert_eq!(Scientific { base: 3, exponent: 4 }.positional(), "30000");
    assert_eq!(Scientific { base: 7, exponent: -3 }.positional(), "0.007");
    assert_eq!(Scientific { base: 9, exponent: -8 }.positional(), "0.00000009");
    let item = Scientific { base: 4, exponent: -2 }.build();
    assert_eq!(item.prompt, "Write 0.04 in scientific notation.");
    assert_eq!(item.answer, "$4 \\times 10^{-2}$");
  }

  #[test]
  fn exponent_law_uses_signed_arithmetic() {
    let item = ExponentLaw { base: 2, p1: 3, p2: 4 }.build();
    assert_eq!(item.answer, "$2^{8}$");

    let law = ExponentLaw { base: 3, p1: -2, p2: 3 };
    assert_eq!(law.result_exponent(), -9);
    let item = law.build();
    assert_eq!(item.prompt, "Simplify: $(3^{-2})^{3} \\div 3^{3}$");
    assert_eq!(item.answer, "$3^{-9}$");
    assert!(item.explanation.contains("\\frac{1}{3^{9}}"));
  }

  #[test]
  fn gcd_reports_true_divisor() {
    let item = GcdLcm { a: 24, b: 36, ask: Divisibility::Gcd }.build();
    assert_eq!(item.answer, "12");
    // Built from factor 4 with multipliers 6 and 9: the true GCD is still 12.
    let item = GcdLcm { a: 4 * 6, b: 4 * 9, ask: Divisibility::Gcd }.build();
    assert_eq!(item.answer, "12");
    let item = GcdLcm { a: 24, b: 36, ask: Divisibility::Lcm }.build();
    assert_eq!(item.answer, "72");
  }

  #[test]
  fn generate_tags_the_topic() {
    let item = generate::<GcdLcm>(&mut Sampler::seeded(9)).expect("item");
    assert_eq!(item.topic, Topic::GcdLcm);
  }
}
