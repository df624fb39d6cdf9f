//! Math Exam Generator Backend
//!
//! - Template-based item generators with a deterministic answer key
//! - Axum HTTP + WebSocket API, exports as PDF / text / Markdown / JSON
//! - Optional OpenAI vision integration for question variants
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   EXAM_CONFIG_PATH    : path to TOML config (exam defaults + variant prompts)
//!   OPENAI_API_KEY      : enables AI variants if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_VISION_MODEL : default "gpt-4o"
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod sampler;
mod generators;
mod registry;
mod assembly;
mod diagram;
mod render;
mod export;
mod variant;
mod config;
mod state;
mod protocol;
mod logic;
mod openai;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // A topic with an unsatisfiable range is a build-time mistake: refuse to start.
  let topics = registry::init()?;
  info!(target: "math_exam_backend", topics = topics.len(), "Generators registered");

  // Shared state: exam cache, config, optional vision client.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "math_exam_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
