//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Registry(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Generation(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      error!(target: "math_exam_backend", error = %self, "Request failed");
    }
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, ai_enabled: state.vision.is_some() })
}

#[instrument(level = "info")]
pub async fn http_get_topics() -> impl IntoResponse {
  Json(TopicsOut { topics: list_topics() })
}

#[instrument(level = "info", skip(state, body), fields(count = ?body.count, seed = ?body.seed))]
pub async fn http_post_exam(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateExamIn>,
) -> Result<Json<ExamView>, ApiError> {
  let view = generate_exam(&state, body).await?;
  info!(target: "exam", id = %view.exam_id, items = view.items.len(), "HTTP exam served");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state), fields(%id, reveal = q.reveal))]
pub async fn http_get_exam(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<ViewQuery>,
) -> Result<Json<ExamView>, ApiError> {
  Ok(Json(view_exam(&state, &id, q.reveal).await?))
}

#[instrument(level = "info", skip(state), fields(%id, mode = ?q.mode, format = ?q.format))]
pub async fn http_get_export(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<ExportQuery>,
) -> Result<Response, ApiError> {
  let artifact = export_exam(&state, &id, q.mode, q.format).await?;
  let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
  Ok(
    (
      [(header::CONTENT_TYPE, artifact.content_type.to_string()), (header::CONTENT_DISPOSITION, disposition)],
      artifact.body,
    )
      .into_response(),
  )
}

#[instrument(level = "info", skip(state, body), fields(topic = %body.topic, sources = body.images.len()))]
pub async fn http_post_variants(
  State(state): State<Arc<AppState>>,
  Json(body): Json<VariantsIn>,
) -> Result<Json<VariantsOut>, ApiError> {
  Ok(Json(convert_variants(&state, body).await?))
}
