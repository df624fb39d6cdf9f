//! Minimal OpenAI vision client for question variants.
//!
//! We only call chat.completions with one text part and one image part and
//! expect plain delimited text back. Calls are instrumented and log model
//! names, latencies and response sizes (not contents).
//!
//! NOTE: We never log the API key or the image payload.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::VariantConfig;
use crate::domain::Topic;
use crate::util::fill_template;
use crate::variant::{ImageData, VariantError, VariantModel};

#[derive(Clone)]
pub struct VisionClient {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub cfg: VariantConfig,
}

impl VisionClient {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(cfg: VariantConfig) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| "gpt-4o".into());
    Self::new(api_key, base_url, model, cfg)
  }

  pub fn new(api_key: String, base_url: String, model: String, cfg: VariantConfig) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .ok()?;
    Some(Self { client, api_key, base_url, model, cfg })
  }

  fn user_prompt(&self, topic: Topic) -> String {
    fill_template(
      &self.cfg.user_template,
      &[("topic", topic.label()), ("delimiters", &self.cfg.delimiters.format_guide())],
    )
  }

  fn backoff(&self, attempt: u32) -> Duration {
    Duration::from_millis(self.cfg.retry_base_ms.saturating_mul(1u64 << attempt.min(16)))
  }

  /// Text + image chat completion. Retries on HTTP 429 with exponential backoff.
  #[instrument(level = "info", skip(self, user, image), fields(model = %self.model, image = %image.name))]
  async fn chat_vision(&self, user: &str, image: &ImageData) -> Result<String, VariantError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: MessageContent::Text(self.cfg.system_prompt.clone()) },
        ChatMessageReq {
          role: "user".into(),
          content: MessageContent::Parts(vec![
            ContentPart::Text { text: user.to_string() },
            ContentPart::ImageUrl { image_url: ImageUrl { url: image.to_data_uri() } },
          ]),
        },
      ],
      temperature: 0.7,
    };

    let attempts = self.cfg.max_retries.max(1);
    for attempt in 1..=attempts {
      let start = Instant::now();
      let res = self.client.post(&url)
        .header(USER_AGENT, "math-exam-backend/0.1")
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
        .json(&req).send().await.map_err(|e| VariantError::Transport(e.to_string()))?;

      let status = res.status();
      if status == StatusCode::TOO_MANY_REQUESTS {
        if attempt < attempts {
          let wait = self.backoff(attempt - 1);
          warn!(target: "variant", attempt, ?wait, "Rate limited; backing off");
          tokio::time::sleep(wait).await;
          continue;
        }
        error!(target: "variant", attempts, "Rate limited; giving up");
        return Err(VariantError::RateLimited { attempts });
      }
      if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        let message = extract_openai_error(&body).unwrap_or(body);
        return Err(VariantError::Http { status: status.as_u16(), message });
      }

      let body: ChatCompletionResponse =
        res.json().await.map_err(|e| VariantError::Transport(e.to_string()))?;
      if let Some(usage) = &body.usage {
        info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
      }
      let text = body.choices.first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default().trim().to_string();
      info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
      if text.is_empty() {
        return Err(VariantError::EmptyResponse);
      }
      return Ok(text);
    }
    Err(VariantError::RateLimited { attempts })
  }
}

#[async_trait]
impl VariantModel for VisionClient {
  #[instrument(level = "info", skip(self, image), fields(topic = topic.id(), bytes = image.bytes.len()))]
  async fn paraphrase(&self, topic: Topic, image: &ImageData) -> Result<String, VariantError> {
    let user = self.user_prompt(topic);
    self.chat_vision(&user, image).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: MessageContent }
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
  Text(String),
  Parts(Vec<ContentPart>),
}
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
  Text { text: String },
  ImageUrl { image_url: ImageUrl },
}
#[derive(Serialize)]
struct ImageUrl { url: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
