//! AI variants: turning uploaded question images into new items.
//!
//! The model answers in free text structured by section delimiters:
//!
//! ```text
//! [QUESTION]
//! ...
//! [ANSWER]
//! ...
//! [EXPLANATION]
//! ...
//! [DIAGRAM]
//! point A 0 0
//! ...
//! ```
//!
//! The text is split into blocks at each question delimiter. A block with a
//! question, an answer and an explanation becomes a `variant` item. Any other
//! non-empty block becomes one best-effort `unparsed` item. Text without any
//! delimiter yields no items at all, which is a valid outcome.
//!
//! Each uploaded source is converted on its own: a failing source is reported
//! in `failures` and never stops the remaining ones.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::diagram::render_source;
use crate::domain::{Item, Origin, Topic};
use crate::util::trunc_for_log;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariantError {
  #[error("AI variants are disabled (OPENAI_API_KEY is not set)")]
  Disabled,

  #[error("'{0}' is not a base64-encoded image")]
  InvalidImage(String),

  #[error("request failed: {0}")]
  Transport(String),

  #[error("model returned HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("still rate limited after {attempts} attempts")]
  RateLimited { attempts: u32 },

  #[error("model returned an empty response")]
  EmptyResponse,
}

/// Section markers the model is asked to use.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Delimiters {
  pub question: String,
  pub answer: String,
  pub explanation: String,
  pub diagram: String,
}

impl Default for Delimiters {
  fn default() -> Self {
    Self {
      question: "[QUESTION]".into(),
      answer: "[ANSWER]".into(),
      explanation: "[EXPLANATION]".into(),
      diagram: "[DIAGRAM]".into(),
    }
  }
}

impl Delimiters {
  /// Format description substituted for `{delimiters}` in the user prompt.
  pub fn format_guide(&self) -> String {
    format!(
      "{}\n<the new question; write math inline as $...$>\n{}\n<the final answer only>\n{}\n<a short worked solution>\n{}\n<optional; only lines of the form: point NAME X Y | segment A B | polygon A B C ... | circle X Y R | polyline X1 Y1 X2 Y2 ... | label \"TEXT\" X Y>",
      self.question, self.answer, self.explanation, self.diagram
    )
  }

  fn marks(&self, text: &str) -> Vec<Mark> {
    let mut marks: Vec<Mark> = [
      (&self.question, Section::Question),
      (&self.answer, Section::Answer),
      (&self.explanation, Section::Explanation),
      (&self.diagram, Section::Diagram),
    ]
    .into_iter()
    .filter(|(d, _)| !d.is_empty())
    .flat_map(|(d, section)| {
      text.match_indices(d.as_str()).map(move |(at, m)| Mark { at, end: at + m.len(), section })
    })
    .collect();
    // Earliest first; on a tie the longer delimiter wins.
    marks.sort_by(|a, b| a.at.cmp(&b.at).then(b.end.cmp(&a.end)));
    let mut out: Vec<Mark> = Vec::with_capacity(marks.len());
    for m in marks {
      if out.last().map_or(true, |prev| m.at >= prev.end) {
        out.push(m);
      }
    }
    out
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
  Question,
  Answer,
  Explanation,
  Diagram,
}

#[derive(Clone, Copy, Debug)]
struct Mark {
  at: usize,
  end: usize,
  section: Section,
}

#[derive(Debug, Default)]
struct Block<'a> {
  raw: &'a str,
  question: Option<&'a str>,
  answer: Option<&'a str>,
  explanation: Option<&'a str>,
  diagram: Option<&'a str>,
}

impl<'a> Block<'a> {
  fn set(&mut self, section: Section, content: &'a str) {
    let slot = match section {
      Section::Question => &mut self.question,
      Section::Answer => &mut self.answer,
      Section::Explanation => &mut self.explanation,
      Section::Diagram => &mut self.diagram,
    };
    if slot.is_none() {
      *slot = Some(content);
    }
  }
}

fn filled(s: Option<&str>) -> Option<&str> {
  s.filter(|s| !s.is_empty())
}

/// Items parsed from one response, plus non-fatal warnings.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedText {
  pub items: Vec<Item>,
  pub warnings: Vec<String>,
}

pub fn parse_response(text: &str, delims: &Delimiters, topic: Topic) -> ParsedText {
  let marks = delims.marks(text);
  let mut parsed = ParsedText::default();
  if marks.is_empty() {
    return parsed;
  }

  // Group marks into blocks; each question mark opens a new block.
  let mut blocks: Vec<Block> = Vec::new();
  let mut block_start = marks[0].at;
  let mut current = Block::default();
  for (i, m) in marks.iter().enumerate() {
    if m.section == Section::Question && i > 0 {
      current.raw = text[block_start..m.at].trim();
      blocks.push(std::mem::take(&mut current));
      block_start = m.at;
    }
    let stop = marks.get(i + 1).map_or(text.len(), |next| next.at);
    current.set(m.section, text[m.end..stop].trim());
  }
  current.raw = text[block_start..].trim();
  blocks.push(current);

  for (n, block) in blocks.iter().enumerate() {
    let complete = (filled(block.question), filled(block.answer), filled(block.explanation));
    let mut item = match complete {
      (Some(q), Some(a), Some(e)) => {
        let mut item = Item::new(topic, q.to_string(), a.to_string(), e.to_string());
        item.origin = Origin::Variant;
        item
      }
      _ => {
        let prompt = filled(block.question).unwrap_or(block.raw);
        if prompt.is_empty() {
          continue;
        }
        let mut item = Item::new(
          topic,
          prompt.to_string(),
          block.answer.unwrap_or_default().to_string(),
          block.explanation.unwrap_or_default().to_string(),
        );
        item.origin = Origin::Unparsed;
        parsed.warnings.push(format!("block {}: incomplete sections, kept as unparsed", n + 1));
        item
      }
    };
    if let Some(src) = filled(block.diagram) {
      match render_source(src) {
        Ok(d) => item = item.with_diagram(d),
        Err(e) => parsed.warnings.push(format!("block {}: diagram ignored: {e}", n + 1)),
      }
    }
    parsed.items.push(item);
  }
  parsed
}

// ---------------------------------------------------------------------------
// Sources and the model seam
// ---------------------------------------------------------------------------

/// One uploaded image as it arrives on the wire.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceImage {
  pub name: String,
  pub mime: String,
  pub data_base64: String,
}

/// Validated, decoded image handed to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
  pub name: String,
  pub mime: String,
  pub bytes: Vec<u8>,
}

impl ImageData {
  pub fn to_data_uri(&self) -> String {
    format!("data:{};base64,{}", self.mime, B64.encode(&self.bytes))
  }
}

impl TryFrom<&SourceImage> for ImageData {
  type Error = VariantError;

  fn try_from(src: &SourceImage) -> Result<Self, Self::Error> {
    if !src.mime.starts_with("image/") {
      return Err(VariantError::InvalidImage(src.name.clone()));
    }
    let bytes = B64
      .decode(src.data_base64.trim().as_bytes())
      .map_err(|_| VariantError::InvalidImage(src.name.clone()))?;
    if bytes.is_empty() {
      return Err(VariantError::InvalidImage(src.name.clone()));
    }
    Ok(Self { name: src.name.clone(), mime: src.mime.clone(), bytes })
  }
}

/// Anything that can paraphrase a question image into delimited text.
#[async_trait]
pub trait VariantModel: Send + Sync {
  async fn paraphrase(&self, topic: Topic, image: &ImageData) -> Result<String, VariantError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
  pub source: String,
  pub reason: String,
}

#[derive(Debug, Default, PartialEq)]
pub struct VariantReport {
  pub items: Vec<Item>,
  pub failures: Vec<SourceFailure>,
  pub warnings: Vec<String>,
  /// Sources that were converted without error (possibly into zero items).
  pub succeeded: usize,
}

impl VariantReport {
  pub fn unparsed(&self) -> usize {
    self.items.iter().filter(|i| i.origin == Origin::Unparsed).count()
  }

  pub fn failed(&self) -> usize {
    self.failures.len()
  }
}

/// Convert every source, isolating failures per source.
#[instrument(level = "info", skip(model, sources, delims), fields(topic = topic.id(), sources = sources.len()))]
pub async fn convert_sources(
  model: &dyn VariantModel,
  topic: Topic,
  sources: &[SourceImage],
  delims: &Delimiters,
) -> VariantReport {
  let mut report = VariantReport::default();
  for src in sources {
    let text = match ImageData::try_from(src) {
      Ok(image) => model.paraphrase(topic, &image).await,
      Err(e) => Err(e),
    };
    match text {
      Ok(text) => {
        let parsed = parse_response(&text, delims, topic);
        info!(target: "variant", source = %src.name, items = parsed.items.len(), warnings = parsed.warnings.len(), "Source converted");
        if parsed.items.is_empty() {
          warn!(target: "variant", source = %src.name, preview = %trunc_for_log(&text, 120), "No delimited questions in response");
          report.warnings.push(format!("{}: no delimited questions in the response", src.name));
        }
        report
          .warnings
          .extend(parsed.warnings.into_iter().map(|w| format!("{}: {w}", src.name)));
        report.items.extend(parsed.items);
        report.succeeded += 1;
      }
      Err(e) => {
        warn!(target: "variant", source = %src.name, error = %e, "Source failed");
        report.failures.push(SourceFailure { source: src.name.clone(), reason: e.to_string() });
      }
    }
  }
  report
}
