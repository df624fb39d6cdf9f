//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ExamSet, Item, Origin, Topic};
use crate::export::ExportFormat;
use crate::registry::GeneratorSpec;
use crate::render::RenderMode;
use crate::variant::{SourceFailure, SourceImage};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListTopics,
    GenerateExam(GenerateExamIn),
    ViewExam {
        #[serde(rename = "examId")]
        exam_id: String,
        #[serde(default)]
        reveal: bool,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Topics { topics: Vec<GeneratorSpec> },
    Exam { exam: ExamView },
    Error { message: String },
}

//
// Exam views
//

/// Diagram as the browser needs it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramView {
    pub media_type: String,
    pub data_uri: String,
}

/// One item as shown in the interactive page. Answer fields are absent
/// (not just empty) unless answers are revealed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub number: usize,
    pub topic: Topic,
    pub topic_label: &'static str,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramView>,
    pub origin: Origin,
}

impl ItemView {
    pub fn new(number: usize, item: &Item, reveal: bool) -> Self {
        Self {
            number,
            topic: item.topic,
            topic_label: item.topic.short_label(),
            prompt: item.prompt.clone(),
            answer: reveal.then(|| item.answer.clone()),
            explanation: reveal.then(|| item.explanation.clone()),
            diagram: item.diagram.as_ref().map(|d| DiagramView {
                media_type: d.media_type.clone(),
                data_uri: d.to_data_uri(),
            }),
            origin: item.origin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamView {
    pub exam_id: String,
    pub title: String,
    pub reveal: bool,
    pub items: Vec<ItemView>,
}

impl ExamView {
    pub fn new(exam_id: String, exam: &ExamSet, reveal: bool) -> Self {
        Self {
            exam_id,
            title: exam.title.clone(),
            reveal,
            items: exam
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| ItemView::new(i + 1, item, reveal))
                .collect(),
        }
    }
}

//
// HTTP request/response DTOs
//

/// Body of `POST /api/v1/exams` and of the WS `generate_exam` message.
/// Every field is optional; configured defaults fill the gaps.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateExamIn {
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Replays the exact same exam when set.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub reveal: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
pub struct VariantsIn {
    pub topic: String,
    #[serde(default)]
    pub images: Vec<SourceImage>,
}

/// Successful items and failed sources are reported separately.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantsOut {
    pub exam_id: String,
    pub items: Vec<ItemView>,
    pub failures: Vec<SourceFailure>,
    pub warnings: Vec<String>,
    pub unparsed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Serialize)]
pub struct TopicsOut {
    pub topics: Vec<GeneratorSpec>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub ai_enabled: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}
