//! Application state: exam cache, configuration and the optional vision model.
//!
//! This module owns:
//!   - the bounded in-memory cache of generated exams (for view/export)
//!   - the config (from TOML or defaults) with default topics resolved
//!   - the optional AI variant model
//!
//! Exams live only for the duration of one user interaction: the cache drops
//! the oldest entry once `cache_limit` is reached and nothing is persisted.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, AppConfig, ConfigError};
use crate::domain::{ExamSet, Topic};
use crate::openai::VisionClient;
use crate::variant::VariantModel;

/// Insertion-ordered map that evicts the oldest exam past `limit`.
#[derive(Debug, Default)]
pub struct ExamCache {
    limit: usize,
    order: VecDeque<String>,
    by_id: HashMap<String, ExamSet>,
}

impl ExamCache {
    pub fn new(limit: usize) -> Self {
        Self { limit: limit.max(1), ..Self::default() }
    }

    pub fn insert(&mut self, id: String, exam: ExamSet) {
        if self.by_id.insert(id.clone(), exam).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.limit {
            if let Some(old) = self.order.pop_front() {
                self.by_id.remove(&old);
                debug!(target: "exam", evicted = %old, "Exam cache full; dropped oldest");
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ExamSet> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub exams: Arc<RwLock<ExamCache>>,
    pub config: AppConfig,
    pub default_topics: Vec<Topic>,
    pub vision: Option<Arc<dyn VariantModel>>,
}

impl AppState {
    /// Build state from env: load config, resolve default topics, init the vision client.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = load_config_from_env().unwrap_or_default();

        let vision = VisionClient::from_env(config.variant.clone());
        if let Some(v) = &vision {
            info!(target: "math_exam_backend", base_url = %v.base_url, model = %v.model, "OpenAI vision enabled.");
        } else {
            info!(target: "math_exam_backend", "OpenAI disabled (no OPENAI_API_KEY). Template items only.");
        }

        Self::new(config, vision.map(|v| Arc::new(v) as Arc<dyn VariantModel>))
    }

    pub fn new(config: AppConfig, vision: Option<Arc<dyn VariantModel>>) -> Result<Self, ConfigError> {
        config.validate()?;
        let default_topics = config.exam.default_topic_list()?;
        info!(
            target: "math_exam_backend",
            default_topics = default_topics.len(),
            max_count = config.exam.max_count,
            cache_limit = config.exam.cache_limit,
            "Exam defaults"
        );
        Ok(Self {
            exams: Arc::new(RwLock::new(ExamCache::new(config.exam.cache_limit))),
            config,
            default_topics,
            vision,
        })
    }

    /// Store an exam and return its id.
    #[instrument(level = "debug", skip(self, exam), fields(items = exam.items.len()))]
    pub async fn insert_exam(&self, exam: ExamSet) -> String {
        let id = Uuid::new_v4().to_string();
        let mut exams = self.exams.write().await;
        exams.insert(id.clone(), exam);
        debug!(target: "exam", %id, cached = exams.len(), "Exam stored");
        id
    }

    /// Read-only access to an exam by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_exam(&self, id: &str) -> Option<ExamSet> {
        self.exams.read().await.get(id).cloned()
    }
}
