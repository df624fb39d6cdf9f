//! Domain models used by the backend: topics, items, diagrams and exam sets.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Every topic the generator knows about. Adding a topic is a compile-time
/// change: the registry dispatches through an exhaustive `match`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
  ArithmeticExpression,
  ScientificNotation,
  ExponentLaw,
  LinearEquation,
  LinearInequality,
  Pythagorean,
  AngleSum,
  ArithmeticSequence,
  GcdLcm,
  QuadraticVertex,
  QuadraticShift,
  LinearSystem,
  RadicalSimplification,
  DiscountThreshold,
  CostBreakeven,
  SavingsGoal,
  ProfitMix,
  GearRatio,
}

/// Coarse grouping shown in topic pickers and document headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicGroup {
  /// Computation and single-concept drills.
  Basic,
  /// Multi-step word problems in the style of past exam papers.
  Advanced,
}

/// Where an item came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
  #[default]
  Template,
  /// Parsed from a complete AI response block.
  Variant,
  /// Best-effort text from an incomplete AI response block.
  Unparsed,
}

/// Opaque rendering payload attached to an item. Never interpreted after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
  pub media_type: String,
  #[serde(serialize_with = "ser_b64", deserialize_with = "de_b64")]
  pub bytes: Vec<u8>,
}

impl Diagram {
  pub fn to_data_uri(&self) -> String {
    format!("data:{};base64,{}", self.media_type, B64.encode(&self.bytes))
  }
}

fn ser_b64<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
  s.serialize_str(&B64.encode(bytes))
}

fn de_b64<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
  let s = String::deserialize(d)?;
  B64.decode(s.as_bytes()).map_err(serde::de::Error::custom)
}

/// The unit of output: one question with its answer key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub topic: Topic,
  pub prompt: String,
  pub answer: String,
  pub explanation: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diagram: Option<Diagram>,
  #[serde(default)]
  pub origin: Origin,
}

impl Item {
  pub fn new(topic: Topic, prompt: String, answer: String, explanation: String) -> Self {
    Self { topic, prompt, answer, explanation, diagram: None, origin: Origin::Template }
  }

  pub fn with_diagram(mut self, diagram: Diagram) -> Self {
    self.diagram = Some(diagram);
    self
  }
}

/// Ordered list of items plus a display title.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamSet {
  pub title: String,
  pub items: Vec<Item>,
}
