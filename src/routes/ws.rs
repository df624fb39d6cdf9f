//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "math_exam_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "math_exam_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let out = reply_to_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "math_exam_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "math_exam_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize.
async fn reply_to_text(txt: &str, state: &AppState) -> String {
  let reply = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "math_exam_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };
  serde_json::to_string(&reply).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListTopics => ServerWsMessage::Topics { topics: list_topics() },

    ClientWsMessage::GenerateExam(req) => match generate_exam(state, req).await {
      Ok(exam) => {
        info!(target: "exam", id = %exam.exam_id, items = exam.items.len(), "WS exam served");
        ServerWsMessage::Exam { exam }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::ViewExam { exam_id, reveal } => match view_exam(state, &exam_id, reveal).await {
      Ok(exam) => ServerWsMessage::Exam { exam },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::Value;

  use crate::config::AppConfig;

  fn state() -> AppState {
    AppState::new(AppConfig::default(), None).expect("state")
  }

  async fn ask(state: &AppState, txt: &str) -> Value {
    serde_json::from_str(&reply_to_text(txt, state).await).expect("json reply")
  }

  #[tokio::test]
  async fn ping_and_topics() {
    let st = state();
    assert_eq!(ask(&st, r#"{"type":"ping"}"#).await["type"], "pong");
    let topics = ask(&st, r#"{"type":"list_topics"}"#).await;
    assert_eq!(topics["type"], "topics");
    assert_eq!(topics["topics"].as_array().map(Vec::len), Some(18));
  }

  #[tokio::test]
  async fn generate_then_view_with_answers() {
    let st = state();
    let made = ask(&st, r#"{"type":"generate_exam","topics":["pythagorean"],"count":2,"seed":7}"#).await;
    assert_eq!(made["type"], "exam");
    assert!(made["exam"]["items"][0].get("answer").is_none());

    let id = made["exam"]["examId"].as_str().expect("id").to_string();
    let msg = format!(r#"{{"type":"view_exam","examId":"{id}","reveal":true}}"#);
    let shown = ask(&st, &msg).await;
    assert_eq!(shown["exam"]["reveal"], true);
    assert!(shown["exam"]["items"][1]["answer"].is_string());
  }

  #[tokio::test]
  async fn bad_messages_become_errors() {
    let st = state();
    assert_eq!(ask(&st, "not json").await["type"], "error");
    let unknown = ask(&st, r#"{"type":"generate_exam","topics":["age-problem"]}"#).await;
    assert_eq!(unknown["type"], "error");
    let missing = ask(&st, r#"{"type":"view_exam","examId":"gone"}"#).await;
    assert_eq!(missing["message"], "unknown examId: gone");
  }
}
