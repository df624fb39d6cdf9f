//! A4 PDF export with the built-in Helvetica face.
//!
//! The page layout is computed as plain lines first and drawn afterwards.
//! Built-in PDF fonts only cover Latin-1, so every line is folded to ASCII.

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};

use super::ExportError;
use crate::domain::{ExamSet, Origin};
use crate::render::{header, to_plain, RenderMode};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_MM: f32 = 6.0;
const FOOTER_Y: f32 = 10.0;
const FOOTER_PT: f32 = 9.0;
const WRAP_AT: usize = 90;
const INDENT: &str = "    ";
/// Blank lines left under each question in the student copy.
const ANSWER_SPACE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
  Title,
  Question,
  Answer,
  Note,
}

impl Tone {
  fn size(self) -> f32 {
    match self {
      Tone::Title => 15.0,
      Tone::Question | Tone::Answer => 11.0,
      Tone::Note => 10.0,
    }
  }

  fn color(self) -> Color {
    let (r, g, b) = match self {
      Tone::Title | Tone::Question => (0.0, 0.0, 0.0),
      Tone::Answer => (0.78, 0.0, 0.0),
      Tone::Note => (0.4, 0.4, 0.4),
    };
    Color::Rgb(Rgb::new(r, g, b, None))
  }
}

#[derive(Clone, Debug, PartialEq)]
struct Line {
  text: String,
  tone: Tone,
}

impl Line {
  fn blank() -> Self {
    Self { text: String::new(), tone: Tone::Question }
  }
}

#[derive(Clone, Debug, PartialEq)]
struct Page {
  lines: Vec<Line>,
  footer: String,
}

fn lines_per_page() -> usize {
  ((PAGE_H - 2.0 * MARGIN) / LINE_MM) as usize
}

/// Title, then one block per question. Student blocks end in blank answer
/// space; answer-key blocks carry the answer and explanation instead.
fn layout(exam: &ExamSet, mode: RenderMode) -> Vec<Page> {
  let mut lines = wrapped(&header(&exam.title, mode), Tone::Title);
  lines.push(Line::blank());

  for (i, item) in exam.items.iter().enumerate() {
    let marker = if item.origin == Origin::Unparsed { " (unparsed)" } else { "" };
    let question = format!("Q{}. [{}]{marker} {}", i + 1, item.topic.short_label(), to_plain(&item.prompt));
    lines.extend(wrapped(&question, Tone::Question));
    if item.diagram.is_some() {
      lines.extend(wrapped("(diagram in the Markdown and JSON exports)", Tone::Note));
    }
    if mode.reveals() {
      lines.extend(wrapped(&format!("Answer: {}", to_plain(&item.answer)), Tone::Answer));
      lines.extend(wrapped(&format!("Explanation: {}", to_plain(&item.explanation)), Tone::Note));
    } else {
      lines.extend(std::iter::repeat_with(Line::blank).take(ANSWER_SPACE));
    }
    lines.push(Line::blank());
  }

  lines
    .chunks(lines_per_page())
    .enumerate()
    .map(|(n, chunk)| Page { lines: chunk.to_vec(), footer: format!("Page {}", n + 1) })
    .collect()
}

/// Greedy word wrap. Continuation lines are indented; words longer than a
/// line are split.
fn wrapped(text: &str, tone: Tone) -> Vec<Line> {
  let folded = fold_ascii(text);
  let mut lines = Vec::new();
  let mut current = String::new();
  for word in folded.split_whitespace() {
    for piece in word.as_bytes().chunks(WRAP_AT - INDENT.len()) {
      let piece = String::from_utf8_lossy(piece);
      if !current.trim().is_empty() && current.len() + 1 + piece.len() > WRAP_AT {
        lines.push(Line { text: std::mem::replace(&mut current, INDENT.to_string()), tone });
      }
      if !current.is_empty() && !current.ends_with(' ') {
        current.push(' ');
      }
      current.push_str(&piece);
    }
  }
  if !current.trim().is_empty() {
    lines.push(Line { text: current, tone });
  }
  lines
}

fn fold_ascii(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      ' '..='~' => out.push(ch),
      '\t' | '\n' => out.push(' '),
      '×' => out.push('x'),
      '÷' => out.push('/'),
      '·' => out.push('*'),
      '−' | '–' | '—' => out.push('-'),
      '≤' => out.push_str("<="),
      '≥' => out.push_str(">="),
      '≠' => out.push_str("!="),
      '±' => out.push_str("+/-"),
      '…' => out.push_str("..."),
      '⇒' => out.push_str("=>"),
      '°' => out.push_str(" deg"),
      'π' => out.push_str("pi"),
      '√' => out.push_str("sqrt"),
      '∠' => out.push_str("angle "),
      '△' => out.push_str("triangle "),
      _ => out.push('?'),
    }
  }
  out
}

/// Approximate Helvetica advance: half an em per character.
fn centered_x(text: &str, size_pt: f32) -> f32 {
  let width_mm = text.len() as f32 * size_pt * 0.5 * 25.4 / 72.0;
  ((PAGE_W - width_mm) / 2.0).max(MARGIN)
}

fn pdf_error(e: impl std::fmt::Display) -> ExportError {
  ExportError::Pdf(e.to_string())
}

pub(super) fn render(exam: &ExamSet, mode: RenderMode) -> Result<Vec<u8>, ExportError> {
  let pages = layout(exam, mode);
  let (doc, first_page, first_layer) =
    PdfDocument::new(fold_ascii(&header(&exam.title, mode)), Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
  let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
  let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

  for (n, page) in pages.iter().enumerate() {
    let layer = if n == 0 {
      doc.get_page(first_page).get_layer(first_layer)
    } else {
      let (p, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
      doc.get_page(p).get_layer(l)
    };

    let mut y = PAGE_H - MARGIN;
    for line in &page.lines {
      if !line.text.is_empty() {
        let font = if line.tone == Tone::Title { &bold } else { &regular };
        layer.set_fill_color(line.tone.color());
        layer.use_text(line.text.as_str(), line.tone.size(), Mm(MARGIN), Mm(y), font);
      }
      y -= LINE_MM;
    }

    layer.set_fill_color(Tone::Note.color());
    layer.use_text(
      page.footer.as_str(),
      FOOTER_PT,
      Mm(centered_x(&page.footer, FOOTER_PT)),
      Mm(FOOTER_Y),
      &regular,
    );
  }

  doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assembly::{assemble, ExamRequest};
  use crate::domain::{Item, Topic};
  use crate::sampler::Sampler;

  fn exam(count: usize) -> ExamSet {
    let req = ExamRequest {
      topics: vec![Topic::LinearInequality, Topic::Pythagorean, Topic::RadicalSimplification],
      count,
      title: "Unit 5 quiz".into(),
    };
    assemble(&req, &mut Sampler::seeded(21)).expect("assemble")
  }

  fn all_text(pages: &[Page]) -> Vec<&str> {
    pages.iter().flat_map(|p| p.lines.iter().map(|l| l.text.as_str())).collect()
  }

  #[test]
  fn student_pages_hold_questions_and_blank_space_only() {
    let exam = exam(6);
    let pages = layout(&exam, RenderMode::Student);
    let text = all_text(&pages);
    assert_eq!(text[0], "Unit 5 quiz (Student copy)");
    for n in 1..=exam.items.len() {
      assert_eq!(text.iter().filter(|t| t.starts_with(&format!("Q{n}. ["))).count(), 1);
    }
    assert!(text.iter().all(|t| !t.starts_with("Answer:") && !t.starts_with("Explanation:")));
    let blanks = text.iter().filter(|t| t.is_empty()).count();
    assert!(blanks >= exam.items.len() * ANSWER_SPACE);
  }

  #[test]
  fn answer_key_pages_carry_answers_and_explanations() {
    let exam = exam(6);
    let pages = layout(&exam, RenderMode::AnswerKey);
    assert_eq!(pages[0].lines[0].text, "Unit 5 quiz (Answer key)");
    let answers: Vec<&Line> = pages.iter().flat_map(|p| &p.lines).filter(|l| l.text.starts_with("Answer:")).collect();
    assert_eq!(answers.len(), exam.items.len());
    assert!(answers.iter().all(|l| l.tone == Tone::Answer));
    let explanations = all_text(&pages).into_iter().filter(|t| t.starts_with("Explanation:")).count();
    assert_eq!(explanations, exam.items.len());
  }

  #[test]
  fn long_exams_spill_onto_numbered_pages() {
    let pages = layout(&exam(40), RenderMode::Student);
    assert!(pages.len() > 1);
    for (n, page) in pages.iter().enumerate() {
      assert_eq!(page.footer, format!("Page {}", n + 1));
      assert!(page.lines.len() <= lines_per_page());
    }
  }

  #[test]
  fn lines_wrap_and_stay_ascii() {
    let prompt = format!("Simplify $\\sqrt{{72}} \\times 3$ and then {}", "word ".repeat(40));
    let item = Item::new(Topic::RadicalSimplification, prompt, "$18\\sqrt{2}$".into(), "-".into());
    let long = Item::new(Topic::GcdLcm, "x".repeat(200), "1".into(), "-".into());
    let exam = ExamSet { title: "Übung".into(), items: vec![item, long] };
    let pages = layout(&exam, RenderMode::AnswerKey);
    let text = all_text(&pages);
    assert_eq!(text[0], "?bung (Answer key)");
    assert!(text.iter().all(|t| t.is_ascii() && t.len() <= WRAP_AT));
    assert!(text.iter().any(|t| t.contains("sqrt72 x 3")));
    assert!(text.iter().any(|t| t.starts_with(INDENT) && t.contains("word")));
    assert!(text.contains(&"Answer: 18sqrt2"));
  }

  #[test]
  fn symbols_fold_to_ascii() {
    assert_eq!(fold_ascii("x ≥ 2√3 × 4 … π"), "x >= 2sqrt3 x 4 ... pi");
    assert_eq!(fold_ascii("∠A = 40°"), "angle A = 40 deg");
    assert_eq!(fold_ascii("試"), "?");
  }

  #[test]
  fn empty_exam_still_has_a_titled_page() {
    let exam = ExamSet { title: "Empty".into(), items: Vec::new() };
    let pages = layout(&exam, RenderMode::Student);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].footer, "Page 1");
    let bytes = render(&exam, RenderMode::Student).expect("pdf");
    assert!(bytes.starts_with(b"%PDF"));
  }
}
