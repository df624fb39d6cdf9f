//! Document export: plain text, Markdown, JSON or PDF.
//!
//! Student artifacts are built without ever reading `answer` or
//! `explanation`, so nothing can leak through formatting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Diagram, ExamSet, Origin, Topic};
use crate::render::{header, render_exam, RenderMode, RenderStyle};

mod pdf;

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("failed to encode JSON: {0}")]
  Json(#[from] serde_json::Error),
  #[error("failed to write PDF: {0}")]
  Pdf(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
  #[default]
  Text,
  Markdown,
  Json,
  Pdf,
}

impl ExportFormat {
  pub fn extension(self) -> &'static str {
    match self {
      ExportFormat::Text => "txt",
      ExportFormat::Markdown => "md",
      ExportFormat::Json => "json",
      ExportFormat::Pdf => "pdf",
    }
  }

  pub fn content_type(self) -> &'static str {
    match self {
      ExportFormat::Text => "text/plain; charset=utf-8",
      ExportFormat::Markdown => "text/markdown; charset=utf-8",
      ExportFormat::Json => "application/json",
      ExportFormat::Pdf => "application/pdf",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
  pub filename: String,
  pub content_type: &'static str,
  pub body: Vec<u8>,
}

/// `<title_with_underscores>_<mode>.<ext>`, ASCII only so it fits a
/// `Content-Disposition` header as is.
pub fn filename(title: &str, mode: RenderMode, format: ExportFormat) -> String {
  let stem: String = title
    .trim()
    .chars()
    .map(|c| if c.is_whitespace() { '_' } else { c })
    .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
    .collect();
  let stem = if stem.is_empty() { "exam".to_string() } else { stem };
  format!("{stem}_{}.{}", mode.slug(), format.extension())
}

pub fn export(exam: &ExamSet, mode: RenderMode, format: ExportFormat) -> Result<Artifact, ExportError> {
  let body = match format {
    ExportFormat::Text => render_exam(exam, mode, RenderStyle::Plain).into_bytes(),
    ExportFormat::Markdown => markdown(exam, mode).into_bytes(),
    ExportFormat::Json => serde_json::to_vec_pretty(&JsonExam::new(exam, mode))?,
    ExportFormat::Pdf => pdf::render(exam, mode)?,
  };
  Ok(Artifact {
    filename: filename(&exam.title, mode, format),
    content_type: format.content_type(),
    body,
  })
}

fn markdown(exam: &ExamSet, mode: RenderMode) -> String {
  let mut out = format!("# {}\n", header(&exam.title, mode));
  for (i, item) in exam.items.iter().enumerate() {
    let n = i + 1;
    let marker = if item.origin == Origin::Unparsed { " *(unparsed)*" } else { "" };
    out.push_str(&format!("\n**Q{n}.** *[{}]*{marker} {}\n", item.topic.short_label(), item.prompt));
    if let Some(d) = &item.diagram {
      out.push_str(&format!("\n![Diagram for question {n}]({})\n", d.to_data_uri()));
    }
    if mode.reveals() {
      out.push_str(&format!("\n> **Answer:** {}\n>\n> **Explanation:** {}\n", item.answer, item.explanation));
    }
  }
  out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExam<'a> {
  title: &'a str,
  mode: RenderMode,
  items: Vec<JsonItem<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonItem<'a> {
  number: usize,
  topic: Topic,
  prompt: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  answer: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  explanation: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  diagram: Option<&'a Diagram>,
  origin: Origin,
}

impl<'a> JsonExam<'a> {
  fn new(exam: &'a ExamSet, mode: RenderMode) -> Self {
    let items = exam
      .items
      .iter()
      .enumerate()
      .map(|(i, item)| JsonItem {
        number: i + 1,
        topic: item.topic,
        prompt: &item.prompt,
        answer: mode.reveals().then_some(item.answer.as_str()),
        explanation: mode.reveals().then_some(item.explanation.as_str()),
        diagram: item.diagram.as_ref(),
        origin: item.origin,
      })
      .collect();
    Self { title: &exam.title, mode, items }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assembly::{assemble, ExamRequest};
  use crate::sampler::Sampler;

  fn text(art: &Artifact) -> &str {
    std::str::from_utf8(&art.body).expect("utf8 body")
  }

  fn exam() -> ExamSet {
    let req = ExamRequest {
      topics: vec![Topic::Pythagorean, Topic::LinearEquation, Topic::QuadraticVertex],
      count: 6,
      title: "Unit 4 review".into(),
    };
    assemble(&req, &mut Sampler::seeded(77)).expect("assemble")
  }

  #[test]
  fn filenames_use_title_and_mode() {
    assert_eq!(filename("Unit 4 review", RenderMode::Student, ExportFormat::Text), "Unit_4_review_student.txt");
    assert_eq!(filename("Mid-term: set B", RenderMode::AnswerKey, ExportFormat::Json), "Mid-term_set_B_answer_key.json");
    assert_eq!(filename("  ", RenderMode::Student, ExportFormat::Markdown), "exam_student.md");
    assert_eq!(filename("Week 2", RenderMode::Student, ExportFormat::Pdf), "Week_2_student.pdf");
  }

  #[test]
  fn filenames_drop_non_ascii_letters() {
    let name = filename("Übung 3: Brüche – Teil β", RenderMode::Student, ExportFormat::Text);
    assert_eq!(name, "bung_3_Brche__Teil__student.txt");
    assert!(name.is_ascii());
    assert_eq!(filename("試験", RenderMode::AnswerKey, ExportFormat::Pdf), "exam_answer_key.pdf");
  }

  #[test]
  fn student_artifacts_contain_no_answer_text() {
    let exam = exam();
    for format in [ExportFormat::Text, ExportFormat::Markdown, ExportFormat::Json] {
      let art = export(&exam, RenderMode::Student, format).expect("export");
      let body = text(&art);
      assert!(!body.contains("Answer:"), "{format:?}");
      assert!(!body.contains("Explanation"), "{format:?}");
      for item in &exam.items {
        assert!(!body.contains(&item.explanation), "{format:?}");
      }
    }

    let art = export(&exam, RenderMode::Student, ExportFormat::Json).expect("export");
    let v: serde_json::Value = serde_json::from_slice(&art.body).expect("json");
    for item in v["items"].as_array().expect("items") {
      assert!(item.get("answer").is_none());
      assert!(item.get("explanation").is_none());
    }
  }

  #[test]
  fn answer_key_artifacts_carry_every_answer() {
    let exam = exam();
    let art = export(&exam, RenderMode::AnswerKey, ExportFormat::Json).expect("export");
    assert_eq!(art.content_type, "application/json");
    let v: serde_json::Value = serde_json::from_slice(&art.body).expect("json");
    assert_eq!(v["mode"], "answer-key");
    let items = v["items"].as_array().expect("items");
    assert_eq!(items.len(), exam.items.len());
    for (json, item) in items.iter().zip(&exam.items) {
      assert_eq!(json["answer"], item.answer.as_str());
      assert_eq!(json["explanation"], item.explanation.as_str());
    }

    let md = export(&exam, RenderMode::AnswerKey, ExportFormat::Markdown).expect("export");
    assert!(text(&md).starts_with("# Unit 4 review (Answer key)\n"));
    assert_eq!(text(&md).matches("> **Answer:**").count(), exam.items.len());
  }

  #[test]
  fn markdown_inlines_diagrams() {
    let exam = exam();
    let with_diagrams = exam.items.iter().filter(|i| i.diagram.is_some()).count();
    assert!(with_diagrams > 0);
    let md = export(&exam, RenderMode::Student, ExportFormat::Markdown).expect("export");
    assert_eq!(text(&md).matches("](data:image/svg+xml;base64,").count(), with_diagrams);
  }

  #[test]
  fn pdf_artifacts_are_pdf_documents() {
    let exam = exam();
    for mode in [RenderMode::Student, RenderMode::AnswerKey] {
      let art = export(&exam, mode, ExportFormat::Pdf).expect("export");
      assert_eq!(art.content_type, "application/pdf");
      assert!(art.filename.ends_with(".pdf"));
      assert!(art.body.starts_with(b"%PDF"));
    }
  }
}
