//! Word problems that reduce to one linear inequality or equation.

use super::format::{ceil_div, fraction, smallest_int_above};
use super::{Ranges, Template};
use crate::domain::{Item, Topic};
use crate::sampler::{IntRange, SampleError, Sampler, DEFAULT_MAX_TRIES};

/// `n / 100` as a short decimal (`90` -> `0.9`, `2550` -> `25.5`).
pub fn hundredths(n: i64) -> String {
  let sign = if n < 0 { "-" } else { "" };
  let (whole, frac) = (n.abs() / 100, n.abs() % 100);
  match frac {
    0 => format!("{sign}{whole}"),
    f if f % 10 == 0 => format!("{sign}{whole}.{}", f / 10),
    f => format!("{sign}{whole}.{f:02}"),
  }
}

fn plural(n: i64, one: &str, many: &str) -> String {
  format!("{n} {}", if n == 1 { one } else { many })
}

// ---------------------------------------------------------------------------
// Group ticket threshold
// ---------------------------------------------------------------------------

const TICKET_PRICES: &[i64] = &[100, 200, 250, 300, 500];
const GROUP_SIZES: &[i64] = &[20, 30, 40, 50];
const PERCENT_OFF: &[i64] = &[10, 15, 20, 25, 30];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscountThreshold {
  pub price: i64,
  pub group: i64,
  pub percent_off: i64,
}

impl DiscountThreshold {
  /// Smallest party with `x·price >= group·price·rate`.
  pub fn threshold(&self) -> i64 {
    ceil_div(self.group * (100 - self.percent_off), 100)
  }
}

impl Template for DiscountThreshold {
  const TOPIC: Topic = Topic::DiscountThreshold;
  const RANGES: Ranges = &[];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    Ok(Self {
      price: *s.choose(TICKET_PRICES)?,
      group: *s.choose(GROUP_SIZES)?,
      percent_off: *s.choose(PERCENT_OFF)?,
    })
  }

  fn build(&self) -> Item {
    let Self { price, group, percent_off } = *self;
    let rate = hundredths(100 - percent_off);
    let boundary = hundredths(group * (100 - percent_off));
    let x = self.threshold();
    Item::new(
      Self::TOPIC,
      format!(
        "Park tickets cost {price} dollars each. Groups of {group} or more get {percent_off}% off every ticket. \
         A party has fewer than {group} people. What is the smallest party size for which buying {group} \
         discounted group tickets costs no more than paying full price for everyone?"
      ),
      format!("{x} people"),
      format!(
        "Let $x$ be the number of people. Group tickets are no more expensive when \
         ${price}x \\ge {price} \\times {group} \\times {rate}$, so $x \\ge {boundary}$. \
         The smallest whole number is {x}."
      ),
    )
  }
}

// ---------------------------------------------------------------------------
// Plan comparison
// ---------------------------------------------------------------------------

const FEE_A: IntRange = IntRange::new(20, 60).step(5);
const FEE_B: IntRange = IntRange::new(0, 15).step(5);
const RATE_A: IntRange = IntRange::new(1, 11);
const RATE_B: IntRange = IntRange::new(5, 12);

/// Plan A has the higher monthly fee and the lower per-visit rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostBreakeven {
  pub fee_a: i64,
  pub rate_a: i64,
  pub fee_b: i64,
  pub rate_b: i64,
}

impl CostBreakeven {
  /// Smallest visit count where A is strictly cheaper.
  pub fn breakeven(&self) -> i64 {
    smallest_int_above(self.fee_a - self.fee_b, self.rate_b - self.rate_a)
  }
}

impl Template for CostBreakeven {
  const TOPIC: Topic = Topic::CostBreakeven;
  const RANGES: Ranges = &[("fee_a", FEE_A), ("fee_b", FEE_B), ("rate_a", RATE_A), ("rate_b", RATE_B)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| {
        Ok(Self {
          fee_a: s.int(&FEE_A)?,
          rate_a: s.int(&RATE_A)?,
          fee_b: s.int(&FEE_B)?,
          rate_b: s.int(&RATE_B)?,
        })
      },
      |p| p.rate_a < p.rate_b && p.fee_a > p.fee_b,
    )
  }

  fn build(&self) -> Item {
    let Self { fee_a, rate_a, fee_b, rate_b } = *self;
    let plan_b = if fee_b == 0 {
      format!("Plan B has no monthly fee and costs {rate_b} dollars per visit.")
    } else {
      format!("Plan B costs {fee_b} dollars a month plus {rate_b} dollars per visit.")
    };
    let x = self.breakeven();
    Item::new(
      Self::TOPIC,
      format!(
        "A gym offers two plans. Plan A costs {fee_a} dollars a month plus {rate_a} dollars per visit. \
         {plan_b} What is the smallest number of visits in a month for which Plan A is cheaper?"
      ),
      plural(x, "visit", "visits"),
      format!(
        "Plan A is cheaper when ${fee_a} + {rate_a}x < {fee_b} + {rate_b}x$, that is ${}x > {}$, \
         so $x > {}$. The smallest whole number of visits is {x}.",
        rate_b - rate_a,
        fee_a - fee_b,
        fraction(fee_a - fee_b, rate_b - rate_a)
      ),
    )
  }
}

// ---------------------------------------------------------------------------
// Savings goal
// ---------------------------------------------------------------------------

const START: IntRange = IntRange::new(0, 200).step(10);
const WEEKLY: IntRange = IntRange::new(15, 60).step(5);
const GOAL: IntRange = IntRange::new(300, 1200).step(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavingsGoal {
  pub start: i64,
  pub weekly: i64,
  pub goal: i64,
}

impl SavingsGoal {
  pub fn weeks(&self) -> i64 {
    ceil_div(self.goal - self.start, self.weekly)
  }
}

impl Template for SavingsGoal {
  const TOPIC: Topic = Topic::SavingsGoal;
  const RANGES: Ranges = &[("start", START), ("weekly", WEEKLY), ("goal", GOAL)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    // goal >= 300 > start always holds for these ranges
    Ok(Self { start: s.int(&START)?, weekly: s.int(&WEEKLY)?, goal: s.int(&GOAL)? })
  }

  fn build(&self) -> Item {
    let Self { start, weekly, goal } = *self;
    let opening = if start == 0 {
      "A student starts with no savings".to_string()
    } else {
      format!("A student has saved {start} dollars")
    };
    let n = self.weeks();
    Item::new(
      Self::TOPIC,
      format!(
        "{opening} and adds {weekly} dollars every week. After how many weeks will the savings \
         first reach at least {goal} dollars?"
      ),
      plural(n, "week", "weeks"),
      format!(
        "After $n$ weeks the savings are ${start} + {weekly}n$. We need ${start} + {weekly}n \\ge {goal}$, \
         so $n \\ge {}$. The smallest whole number of weeks is {n}.",
        fraction(goal - start, weekly)
      ),
    )
  }
}

// ---------------------------------------------------------------------------
// Two-product revenue
// ---------------------------------------------------------------------------

const UNIT_COST: IntRange = IntRange::new(200, 1000).step(10);
const MARKUP_A: &[i64] = &[20, 30, 40];
const MARKUP_B: &[i64] = &[10, 20, 50];
const UNITS: IntRange = IntRange::new(5, 20);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfitMix {
  pub cost_a: i64,
  pub cost_b: i64,
  pub markup_a: i64,
  pub markup_b: i64,
  pub count_a: i64,
  pub count_b: i64,
}

impl ProfitMix {
  /// Costs are multiples of 10 and markups multiples of 10%, so prices stay whole.
  pub fn prices(&self) -> (i64, i64) {
    (
      self.cost_a * (100 + self.markup_a) / 100,
      self.cost_b * (100 + self.markup_b) / 100,
    )
  }

  pub fn total_units(&self) -> i64 {
    self.count_a + self.count_b
  }

  pub fn revenue(&self) -> i64 {
    let (sell_a, sell_b) = self.prices();
    sell_a * self.count_a + sell_b * self.count_b
  }
}

impl Template for ProfitMix {
  const TOPIC: Topic = Topic::ProfitMix;
  const RANGES: Ranges = &[("unit_cost", UNIT_COST), ("units", UNITS)];

  fn sample(s: &mut Sampler) -> Result<Self, SampleError> {
    s.draw_until(
      DEFAULT_MAX_TRIES,
      |s| {
        Ok(Self {
          cost_a: s.int(&UNIT_COST)?,
          cost_b: s.int(&UNIT_COST)?,
          markup_a: *s.choose(MARKUP_A)?,
          markup_b: *s.choose(MARKUP_B)?,
          count_a: s.int(&UNITS)?,
          count_b: s.int(&UNITS)?,
        })
      },
      |p| {
        let (a, b) = p.prices();
        a != b
      },
    )
  }

  fn build(&self) -> Item {
    let Self { cost_a, cost_b, markup_a, markup_b, count_a, .. } = *self;
    let (sell_a, sell_b) = self.prices();
    let total = self.total_units();
    let revenue = self.revenue();
    Item::new(
      Self::TOPIC,
      format!(
        "A shop buys {total} units of products A and B in total. Product A costs {cost_a} dollars per unit \
         and is priced {markup_a}% above cost. Product B costs {cost_b} dollars per unit and is priced \
         {markup_b}% above cost. After everything sells, the revenue is {revenue} dollars. \
         How many units of product A did the shop buy?"
      ),
      plural(count_a, "unit", "units"),
      format!(
        "A sells for {sell_a} dollars and B for {sell_b} dollars. Let $x$ be the number of A units, \
         so there are ${total} - x$ units of B. Then ${sell_a}x + {sell_b}({total} - x) = {revenue}$, \
         which gives $x = {count_a}$."
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
  fn decimals() {
    assert_eq!(hundredths(90), "0.9");
    assert_eq!(hundredths(85), "0.85");
    assert_eq!(hundredths(2700), "27");
    assert_eq!(hundredths(2550), "25.5");
    assert_eq!(hundredths(-5), "-0.05");
  }

  #[test]
  fn ticket_threshold_uses_the_ceiling() {
    let p = DiscountThreshold { price: 100, group: 30, percent_off: 10 };
    assert_eq!(p.threshold(), 27);
    let item = p.build();
    assert_eq!(item.answer, "27 people");
    assert!(item.explanation.contains("x \\ge 27"));

    let p = DiscountThreshold { price: 250, group: 30, percent_off: 15 };
    assert_eq!(p.threshold(), 26);
    assert!(p.build().explanation.contains("x \\ge 25.5"));
  }

  #[test]
  fn breakeven_is_strict() {
    // 30 / 6 = 5 exactly: at 5 visits the plans tie, so A wins from 6.
    let p = CostBreakeven { fee_a: 40, rate_a: 3, fee_b: 10, rate_b: 9 };
    assert_eq!(p.breakeven(), 6);
    assert_eq!(p.build().answer, "6 visits");

    let p = CostBreakeven { fee_a: 45, rate_a: 2, fee_b: 0, rate_b: 9 };
    assert_eq!(p.breakeven(), 7);
    let item = p.build();
    assert!(item.prompt.contains("no monthly fee"));
    assert!(item.explanation.contains("x > \\frac{45}{7}"));
  }

  proptest! {
    #[test]
    fn sampled_breakeven_is_the_first_cheaper_count(seed in any::<u64>()) {
      let p = CostBreakeven::sample(&mut Sampler::seeded(seed)).expect("sample");
      let cost_a = |x: i64| p.fee_a + p.rate_a * x;
      let cost_b = |x: i64| p.fee_b + p.rate_b * x;
      let x = p.breakeven();
      prop_assert!(cost_a(x) < cost_b(x));
      prop_assert!(cost_a(x - 1) >= cost_b(x - 1));
    }

    #[test]
    fn savings_weeks_are_the_first_to_reach_the_goal(
      start in declared::<SavingsGoal>("start"),
      weekly in declared::<SavingsGoal>("weekly"),
      goal in declared::<SavingsGoal>("goal"),
    ) {
      let p = SavingsGoal { start, weekly, goal };
      let n = p.weeks();
      prop_assert!(start + weekly * n >= goal);
      prop_assert!(start + weekly * (n - 1) < goal);
      let expected_prefix = format!("{n} week");
      prop_assert!(p.build().answer.starts_with(&expected_prefix));
    }

    #[test]
    fn revenue_determines_units_of_a(seed in any::<u64>()) {
      let p = ProfitMix::sample(&mut Sampler::seeded(seed)).expect("sample");
      let (sell_a, sell_b) = p.prices();
      prop_assert_ne!(sell_a, sell_b);
      // Solve sell_a·x + sell_b·(total - x) = revenue from the stated numbers.
      let x = (p.revenue() - sell_b * p.total_units()) / (sell_a - sell_b);
      prop_assert_eq!(x, p.count_a);
      prop_assert_eq!(p.build().answer, format!("{} units", p.count_a));
    }
  }

  #[test]
  fn savings_goal_reached_exactly_or_just_after() {
    let p = SavingsGoal { start: 50, weekly: 25, goal: 300 };
    assert_eq!(p.build().answer, "10 weeks");

    let p = SavingsGoal { start: 0, weekly: 60, goal: 350 };
    let item = p.build();
    assert_eq!(item.answer, "6 weeks");
    assert!(item.prompt.starts_with("A student starts with no savings"));
  }

  #[test]
  fn profit_mix_prices_are_whole() {
    let p = ProfitMix { cost_a: 250, cost_b: 310, markup_a: 30, markup_b: 50, count_a: 8, count_b: 12 };
    assert_eq!(p.prices(), (325, 465));
    assert_eq!(p.revenue(), 325 * 8 + 465 * 12);
  }
}
