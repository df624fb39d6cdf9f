//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Generating exams (defaults, count clamping, seeded or fresh sampling)
//!   - Viewing cached exams with or without the answer key
//!   - Exporting cached exams as downloadable artifacts
//!   - Converting uploaded question images into AI variants

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::assembly::{assemble, ExamRequest};
use crate::domain::ExamSet;
use crate::export::{export, Artifact, ExportError, ExportFormat};
use crate::protocol::{ExamView, GenerateExamIn, ItemView, VariantsIn, VariantsOut};
use crate::registry::{lookup, registry, GeneratorSpec, RegistryError};
use crate::render::RenderMode;
use crate::sampler::{SampleError, Sampler};
use crate::state::AppState;
use crate::variant::{convert_sources, SourceFailure, VariantError, VariantReport};

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Registry(#[from] RegistryError),

  #[error("unknown examId: {0}")]
  NotFound(String),

  #[error("generation failed: {0}")]
  Generation(#[from] SampleError),

  #[error("export failed: {0}")]
  Export(#[from] ExportError),
}

pub fn list_topics() -> Vec<GeneratorSpec> {
  registry().to_vec()
}

/// Missing fields fall back to the configured defaults. An explicit empty
/// topic list or a negative count yields an empty exam.
#[instrument(level = "info", skip(state, req), fields(seeded = req.seed.is_some()))]
pub async fn generate_exam(state: &AppState, req: GenerateExamIn) -> Result<ExamView, ApiError> {
  let exam_cfg = &state.config.exam;
  let count = exam_cfg.clamp_count(req.count.unwrap_or(exam_cfg.default_count as i64));
  let title = req
    .title
    .filter(|t| !t.trim().is_empty())
    .unwrap_or_else(|| exam_cfg.default_title.clone());

  let request = match req.topics {
    Some(ids) => ExamRequest::from_ids(&ids, count, title)?,
    None => ExamRequest {
      topics: state.default_topics.clone(),
      count: usize::try_from(count).unwrap_or(0),
      title,
    },
  };

  let mut sampler = match req.seed {
    Some(seed) => Sampler::seeded(seed),
    None => Sampler::from_entropy(),
  };
  let exam = assemble(&request, &mut sampler)?;
  let items = exam.items.len();
  let id = state.insert_exam(exam.clone()).await;
  info!(target: "exam", %id, items, topics = request.topics.len(), "Exam generated");
  Ok(ExamView::new(id, &exam, false))
}

#[instrument(level = "info", skip(state), fields(%id, reveal))]
pub async fn view_exam(state: &AppState, id: &str, reveal: bool) -> Result<ExamView, ApiError> {
  let exam = state.get_exam(id).await.ok_or_else(|| ApiError::NotFound(id.to_string()))?;
  Ok(ExamView::new(id.to_string(), &exam, reveal))
}

#[instrument(level = "info", skip(state), fields(%id, ?mode, ?format))]
pub async fn export_exam(
  state: &AppState,
  id: &str,
  mode: RenderMode,
  format: ExportFormat,
) -> Result<Artifact, ApiError> {
  let exam = state.get_exam(id).await.ok_or_else(|| ApiError::NotFound(id.to_string()))?;
  let artifact = export(&exam, mode, format)?;
  info!(target: "exam", %id, filename = %artifact.filename, bytes = artifact.body.len(), "Exam exported");
  Ok(artifact)
}

/// Per-source failures never fail the whole request. Without a vision model
/// every source is reported as failed.
#[instrument(level = "info", skip(state, body), fields(topic = %body.topic, sources = body.images.len()))]
pub async fn convert_variants(state: &AppState, body: VariantsIn) -> Result<VariantsOut, ApiError> {
  let topic = lookup(&body.topic)?.topic;

  let report = match &state.vision {
    Some(model) => convert_sources(model.as_ref(), topic, &body.images, &state.config.variant.delimiters).await,
    None => {
      warn!(target: "variant", sources = body.images.len(), "Variant request while AI is disabled");
      VariantReport {
        failures: body
          .images
          .iter()
          .map(|img| SourceFailure { source: img.name.clone(), reason: VariantError::Disabled.to_string() })
          .collect(),
        ..VariantReport::default()
      }
    }
  };

  let unparsed = report.unparsed();
  let failed = report.failed();
  let exam = ExamSet { title: format!("{} variants", topic.label()), items: report.items };
  let items = exam.items.iter().enumerate().map(|(i, it)| ItemView::new(i + 1, it, true)).collect();
  let exam_id = state.insert_exam(exam).await;
  info!(target: "variant", %exam_id, succeeded = report.succeeded, failed, unparsed, "Variants converted");

  Ok(VariantsOut {
    exam_id,
    items,
    failures: report.failures,
    warnings: report.warnings,
    unparsed,
    succeeded: report.succeeded,
    failed,
  })
}
