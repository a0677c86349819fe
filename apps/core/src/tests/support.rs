//! Test doubles shared by the cross-module tests.

use crate::dataset::table::Table;
use crate::dataset::{DataSource, DatasetCache};
use crate::error::AppError;
use crate::llm::{LlmClient, Relay};
use crate::models::{GenerationConfig, ModelTurn};
use crate::router::Router;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock LLM that returns a fixed result and records every history it receives.
pub struct MockLlm {
    response: Result<String, AppError>,
    pub calls: Mutex<Vec<Vec<ModelTurn>>>,
}

impl MockLlm {
    pub fn answering(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: AppError) -> Self {
        Self {
            response: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn generate(
        &self,
        turns: &[ModelTurn],
        _config: &GenerationConfig,
    ) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(turns.to_vec());
        self.response.clone()
    }
}

/// Data source serving a fixed table.
pub struct StaticSource(pub Table);

#[async_trait]
impl DataSource for StaticSource {
    async fn load(&self) -> Result<Table, AppError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static table".to_string()
    }
}

pub fn router_with(llm: Arc<MockLlm>, table: Table) -> Router<MockLlm, StaticSource> {
    let dataset = Arc::new(DatasetCache::new(StaticSource(table), Duration::from_secs(3600)));
    Router::new(dataset, Relay::new(llm, GenerationConfig::default()))
}
