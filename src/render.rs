//! Answer-key rendering.
//!
//! `Student` output never contains an item's answer or explanation, not even
//! hidden. `AnswerKey` output carries both verbatim. Rendering is pure: the
//! same item in the same mode always yields the same bytes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::domain::{ExamSet, Item, Origin};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
  #[default]
  Student,
  AnswerKey,
}

impl RenderMode {
  pub fn caption(self) -> &'static str {
    match self {
      RenderMode::Student => "Student copy",
      RenderMode::AnswerKey => "Answer key",
    }
  }

  /// Used in exported file names.
  pub fn slug(self) -> &'static str {
    match self {
      RenderMode::Student => "student",
      RenderMode::AnswerKey => "answer_key",
    }
  }

  pub fn reveals(self) -> bool {
    matches!(self, RenderMode::AnswerKey)
  }
}

/// `Display` keeps the TeX-lite markup; `Plain` converts it to Unicode text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderStyle {
  #[default]
  Display,
  Plain,
}

impl RenderStyle {
  pub fn apply(self, s: &str) -> Cow<'_, str> {
    match self {
      RenderStyle::Display => Cow::Borrowed(s),
      RenderStyle::Plain => Cow::Owned(to_plain(s)),
    }
  }
}

pub fn header(title: &str, mode: RenderMode) -> String {
  format!("{title} ({})", mode.caption())
}

/// One numbered question, plus answer and explanation in answer-key mode.
pub fn render_item(item: &Item, number: usize, mode: RenderMode, style: RenderStyle) -> String {
  let marker = if item.origin == Origin::Unparsed { " (unparsed)" } else { "" };
  let mut out = format!(
    "Q{number}. [{}]{marker} {}",
    item.topic.short_label(),
    style.apply(&item.prompt)
  );
  if let Some(d) = &item.diagram {
    out.push_str(&format!("\n    [diagram: {}]", d.media_type));
  }
  if mode.reveals() {
    out.push_str(&format!("\n    Answer: {}", style.apply(&item.answer)));
    out.push_str(&format!("\n    Explanation: {}", style.apply(&item.explanation)));
  }
  out
}

pub fn render_exam(exam: &ExamSet, mode: RenderMode, style: RenderStyle) -> String {
  let head = header(&exam.title, mode);
  let rule = "=".repeat(head.chars().count());
  let body: Vec<String> = exam
    .items
    .iter()
    .enumerate()
    .map(|(i, item)| render_item(item, i + 1, mode, style))
    .collect();
  format!("{head}\n{rule}\n\n{}\n", body.join("\n\n"))
}

// ---------------------------------------------------------------------------
// TeX-lite to plain text
// ---------------------------------------------------------------------------

/// Groups nested deeper than this are copied through verbatim.
const MAX_NESTING: usize = 32;

/// Convert inline TeX-lite (`$…$`, `\frac`, `\sqrt`, `^{}`, `_{}`, symbols)
/// to plain Unicode text. Unknown commands keep their name.
pub fn to_plain(src: &str) -> String {
  let chars: Vec<char> = src.chars().collect();
  let mut pos = 0;
  plain_until(&chars, &mut pos, false, 0)
}

fn plain_until(c: &[char], pos: &mut usize, in_group: bool, depth: usize) -> String {
  let mut out = String::new();
  while *pos < c.len() {
    let ch = c[*pos];
    *pos += 1;
    match ch {
      '}' if in_group => return out,
      '$' => {}
      '{' => out.push_str(&group(c, pos, depth)),
      '^' | '_' => {
        let arg = argument(c, pos, depth);
        out.push(ch);
        out.push_str(&wrap(arg));
      }
      '\\' => {
        let start = *pos;
        while *pos < c.len() && c[*pos].is_ascii_alphabetic() {
          *pos += 1;
        }
        let name: String = c[start..*pos].iter().collect();
        match name.as_str() {
          // escaped single character such as `\{` or `\%`
          "" => {
            if let Some(&next) = c.get(*pos) {
              *pos += 1;
              out.push(next);
            }
          }
          "frac" => {
            let num = argument(c, pos, depth);
            let den = argument(c, pos, depth);
            out.push_str(&wrap(num));
            out.push('/');
            out.push_str(&wrap(den));
          }
          "sqrt" => {
            let radicand = argument(c, pos, depth);
            out.push('√');
            out.push_str(&wrap(radicand));
          }
          other => out.push_str(symbol(other)),
        }
      }
      other => out.push(other),
    }
  }
  out
}

/// A braced group or a single character.
fn argument(c: &[char], pos: &mut usize, depth: usize) -> String {
  while *pos < c.len() && c[*pos] == ' ' {
    *pos += 1;
  }
  match c.get(*pos) {
    Some('{') => {
      *pos += 1;
      group(c, pos, depth)
    }
    Some(&ch) => {
      *pos += 1;
      ch.to_string()
    }
    None => String::new(),
  }
}

/// Body of a group whose `{` was just consumed.
fn group(c: &[char], pos: &mut usize, depth: usize) -> String {
  if depth < MAX_NESTING {
    return plain_until(c, pos, true, depth + 1);
  }
  let mut out = String::from("{");
  let mut open = 1usize;
  while *pos < c.len() {
    let ch = c[*pos];
    *pos += 1;
    out.push(ch);
    match ch {
      '{' => open += 1,
      '}' => {
        open -= 1;
        if open == 0 {
          break;
        }
      }
      _ => {}
    }
  }
  out
}

fn wrap(s: String) -> String {
  let simple = !s.is_empty()
    && s
      .chars()
      .enumerate()
      .all(|(i, ch)| ch.is_alphanumeric() || ch == '.' || ch == '√' || (i == 0 && ch == '-'));
  if simple { s } else { format!("({s})") }
}

fn symbol(name: &str) -> &str {
  match name {
    "times" => "×",
    "div" => "÷",
    "cdot" => "·",
    "le" | "leq" => "≤",
    "ge" | "geq" => "≥",
    "lt" => "<",
    "gt" => ">",
    "ne" | "neq" => "≠",
    "pm" => "±",
    "ldots" | "cdots" | "dots" => "…",
    "Rightarrow" => "⇒",
    "circ" => "°",
    "pi" => "π",
    "angle" => "∠",
    "triangle" => "△",
    "left" | "right" => "",
    other => other,
  }
}
