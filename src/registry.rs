//! Topic registry: the static, order-preserving table of generators.
//!
//! `Topic` is a closed enum, so lookup by id and dispatch to a generator are
//! both exhaustive matches. The table itself is built once on first use, after
//! every declared parameter range has been validated.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{Item, Topic, TopicGroup};
use crate::generators::{
  algebra::{LinearEquation, LinearInequality, LinearSystem},
  applications::{CostBreakeven, DiscountThreshold, ProfitMix, SavingsGoal},
  generate,
  geometry::{AngleSum, GearRatio, Pythagorean},
  number::{Expression, ExponentLaw, GcdLcm, Scientific},
  quadratic::{QuadraticShift, QuadraticVertex},
  radical::RadicalSimplification,
  sequence::ArithmeticSequence,
  Ranges, Template,
};
use crate::sampler::{SampleError, Sampler};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
  #[error("unknown topic '{0}'")]
  UnknownTopic(String),

  #[error("topic '{topic}' declares an invalid range '{name}': {source}")]
  InvalidRange {
    topic: &'static str,
    name: &'static str,
    #[source]
    source: SampleError,
  },
}

/// Public description of one registered topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSpec {
  pub topic: Topic,
  pub id: &'static str,
  pub label: &'static str,
  pub short_label: &'static str,
  pub group: TopicGroup,
}

impl Topic {
  /// Registry order. Topic pickers and `list_topics` follow it.
  pub const ALL: [Topic; 18] = [
    Topic::ArithmeticExpression,
    Topic::ScientificNotation,
    Topic::ExponentLaw,
    Topic::GcdLcm,
    Topic::LinearEquation,
    Topic::LinearInequality,
    Topic::LinearSystem,
    Topic::Pythagorean,
    Topic::AngleSum,
    Topic::ArithmeticSequence,
    Topic::RadicalSimplification,
    Topic::QuadraticShift,
    Topic::QuadraticVertex,
    Topic::DiscountThreshold,
    Topic::CostBreakeven,
    Topic::SavingsGoal,
    Topic::ProfitMix,
    Topic::GearRatio,
  ];

  pub fn id(self) -> &'static str {
    match self {
      Topic::ArithmeticExpression => "arithmetic-expression",
      Topic::ScientificNotation => "scientific-notation",
      Topic::ExponentLaw => "exponent-law",
      Topic::LinearEquation => "linear-equation",
      Topic::LinearInequality => "linear-inequality",
      Topic::Pythagorean => "pythagorean",
      Topic::AngleSum => "angle-sum",
      Topic::ArithmeticSequence => "arithmetic-sequence",
      Topic::GcdLcm => "gcd-lcm",
      Topic::QuadraticVertex => "quadratic-vertex",
      Topic::QuadraticShift => "quadratic-shift",
      Topic::LinearSystem => "linear-system",
      Topic::RadicalSimplification => "radical-simplification",
      Topic::DiscountThreshold => "discount-threshold",
      Topic::CostBreakeven => "cost-breakeven",
      Topic::SavingsGoal => "savings-goal",
      Topic::ProfitMix => "profit-mix",
      Topic::GearRatio => "gear-ratio",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Topic::ArithmeticExpression => "Order of operations",
      Topic::ScientificNotation => "Scientific notation",
      Topic::ExponentLaw => "Laws of exponents",
      Topic::LinearEquation => "Linear equations",
      Topic::LinearInequality => "Linear inequalities",
      Topic::Pythagorean => "Pythagorean theorem",
      Topic::AngleSum => "Angles in a triangle",
      Topic::ArithmeticSequence => "Arithmetic sequences and patterns",
      Topic::GcdLcm => "GCD and LCM",
      Topic::QuadraticVertex => "Quadratic maximum (projectile)",
      Topic::QuadraticShift => "Shifting a parabola",
      Topic::LinearSystem => "Systems of linear equations",
      Topic::RadicalSimplification => "Simplifying radicals",
      Topic::DiscountThreshold => "Group discount threshold",
      Topic::CostBreakeven => "Comparing price plans",
      Topic::SavingsGoal => "Savings goal",
      Topic::ProfitMix => "Sales and revenue",
      Topic::GearRatio => "Gear ratios",
    }
  }

  /// Tag printed in front of each question in exported documents.
  pub fn short_label(self) -> &'static str {
    match self {
      Topic::ArithmeticExpression | Topic::ScientificNotation | Topic::ExponentLaw | Topic::GcdLcm => {
        "Number"
      }
      Topic::LinearEquation
      | Topic::LinearInequality
      | Topic::LinearSystem
      | Topic::RadicalSimplification => "Algebra",
      Topic::Pythagorean | Topic::AngleSum => "Geometry",
      Topic::ArithmeticSequence => "Patterns",
      Topic::QuadraticVertex | Topic::QuadraticShift => "Functions",
      Topic::DiscountThreshold | Topic::CostBreakeven | Topic::SavingsGoal | Topic::ProfitMix => {
        "Applications"
      }
      Topic::GearRatio => "Ratio",
    }
  }

  pub fn group(self) -> TopicGroup {
    match self {
      Topic::ArithmeticExpression
      | Topic::ScientificNotation
      | Topic::ExponentLaw
      | Topic::GcdLcm
      | Topic::LinearEquation
      | Topic::LinearInequality
      | Topic::Pythagorean
      | Topic::AngleSum => TopicGroup::Basic,
      Topic::ArithmeticSequence
      | Topic::QuadraticVertex
      | Topic::QuadraticShift
      | Topic::LinearSystem
      | Topic::RadicalSimplification
      | Topic::DiscountThreshold
      | Topic::CostBreakeven
      | Topic::SavingsGoal
      | Topic::ProfitMix
      | Topic::GearRatio => TopicGroup::Advanced,
    }
  }

  pub fn spec(self) -> GeneratorSpec {
    GeneratorSpec {
      topic: self,
      id: self.id(),
      label: self.label(),
      short_label: self.short_label(),
      group: self.group(),
    }
  }

  /// Produce one fresh item for this topic.
  pub fn generate(self, s: &mut Sampler) -> Result<Item, SampleError> {
    match self {
      Topic::ArithmeticExpression => generate::<Expression>(s),
      Topic::ScientificNotation => generate::<Scientific>(s),
      Topic::ExponentLaw => generate::<ExponentLaw>(s),
      Topic::LinearEquation => generate::<LinearEquation>(s),
      Topic::LinearInequality => generate::<LinearInequality>(s),
      Topic::Pythagorean => generate::<Pythagorean>(s),
      Topic::AngleSum => generate::<AngleSum>(s),
      Topic::ArithmeticSequence => generate::<ArithmeticSequence>(s),
      Topic::GcdLcm => generate::<GcdLcm>(s),
      Topic::QuadraticVertex => generate::<QuadraticVertex>(s),
      Topic::QuadraticShift => generate::<QuadraticShift>(s),
      Topic::LinearSystem => generate::<LinearSystem>(s),
      Topic::RadicalSimplification => generate::<RadicalSimplification>(s),
      Topic::DiscountThreshold => generate::<DiscountThreshold>(s),
      Topic::CostBreakeven => generate::<CostBreakeven>(s),
      Topic::SavingsGoal => generate::<SavingsGoal>(s),
      Topic::ProfitMix => generate::<ProfitMix>(s),
      Topic::GearRatio => generate::<GearRatio>(s),
    }
  }

  pub fn declared_ranges(self) -> Ranges {
    fn of<T: Template>() -> Ranges {
      T::RANGES
    }
    match self {
      Topic::ArithmeticExpression => of::<Expression>(),
      Topic::ScientificNotation => of::<Scientific>(),
      Topic::ExponentLaw => of::<ExponentLaw>(),
      Topic::LinearEquation => of::<LinearEquation>(),
      Topic::LinearInequality => of::<LinearInequality>(),
      Topic::Pythagorean => of::<Pythagorean>(),
      Topic::AngleSum => of::<AngleSum>(),
      Topic::ArithmeticSequence => of::<ArithmeticSequence>(),
      Topic::GcdLcm => of::<GcdLcm>(),
      Topic::QuadraticVertex => of::<QuadraticVertex>(),
      Topic::QuadraticShift => of::<QuadraticShift>(),
      Topic::LinearSystem => of::<LinearSystem>(),
      Topic::RadicalSimplification => of::<RadicalSimplification>(),
      Topic::DiscountThreshold => of::<DiscountThreshold>(),
      Topic::CostBreakeven => of::<CostBreakeven>(),
      Topic::SavingsGoal => of::<SavingsGoal>(),
      Topic::ProfitMix => of::<ProfitMix>(),
      Topic::GearRatio => of::<GearRatio>(),
    }
  }
}

impl FromStr for Topic {
  type Err = RegistryError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    lookup(s).map(|spec| spec.topic)
  }
}

/// Check every declared range. An empty range is a configuration error.
pub fn validate() -> Result<(), RegistryError> {
  for topic in Topic::ALL {
    for &(name, range) in topic.declared_ranges() {
      range
        .validate()
        .map_err(|source| RegistryError::InvalidRange { topic: topic.id(), name, source })?;
      debug!(target: "exam", topic = topic.id(), range = name, admissible = range.admissible_count(), "Range ok");
    }
  }
  Ok(())
}

static REGISTRY: OnceLock<Result<Vec<GeneratorSpec>, RegistryError>> = OnceLock::new();

/// The single initializer: validation runs before the table exists, whichever
/// accessor gets there first.
fn table() -> &'static Result<Vec<GeneratorSpec>, RegistryError> {
  REGISTRY.get_or_init(|| {
    validate()?;
    let table: Vec<GeneratorSpec> = Topic::ALL.iter().map(|t| t.spec()).collect();
    info!(target: "exam", topics = table.len(), "Topic registry ready");
    Ok(table)
  })
}

/// Validate and build the table. Startup refuses to continue on error.
pub fn init() -> Result<&'static [GeneratorSpec], RegistryError> {
  table().as_deref().map_err(Clone::clone)
}

/// The registered topics in order; empty if validation failed.
pub fn registry() -> &'static [GeneratorSpec] {
  match table() {
    Ok(table) => table.as_slice(),
    Err(e) => {
      error!(target: "exam", error = %e, "Topic registry unavailable");
      &[]
    }
  }
}

/// Exact-match lookup by id.
pub fn lookup(id: &str) -> Result<GeneratorSpec, RegistryError> {
  registry()
    .iter()
    .find(|spec| spec.id == id)
    .copied()
    .ok_or_else(|| RegistryError::UnknownTopic(id.to_string()))
}
