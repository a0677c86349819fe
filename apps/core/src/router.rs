//! Per-turn dispatch between the HR dataset and the language model.

use crate::brain::{answer, IntentClassifier};
use crate::dataset::{DataSource, DatasetCache};
use crate::llm::{LlmClient, Relay};
use crate::session::Session;
use std::sync::Arc;
use tracing::{info, instrument};

/// Routes each user message to a structured answer or to the language model.
///
/// One call is one turn:
/// 1. Appends the user message to the session transcript.
/// 2. Classifies it.
/// 3. Structured intents are answered from the cached dataset.
/// 4. General messages go to the relay with the whole transcript.
/// 5. Appends the reply as an assistant message and returns it.
///
/// There are no retries or timeouts here; the relay owns failure handling.
pub struct Router<L: LlmClient, S: DataSource> {
    classifier: IntentClassifier,
    dataset: Arc<DatasetCache<S>>,
    relay: Relay<L>,
}

impl<L: LlmClient, S: DataSource> Router<L, S> {
    pub fn new(dataset: Arc<DatasetCache<S>>, relay: Relay<L>) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            dataset,
            relay,
        }
    }

    #[instrument(skip(self, session, text), fields(session_id = %session.id()))]
    pub async fn route(&self, session: &mut Session, text: &str) -> String {
        session.push_user(text);

        let intent = self.classifier.classify(text);
        info!(intent = %intent, "Routing user message");

        let reply = if intent.is_structured() {
            let table = self.dataset.get().await;
            answer(intent, &table)
        } else {
            None
        };
        let reply = match reply {
            Some(reply) => reply,
            None => self.relay.relay(session.transcript()).await,
        };

        session.push_assistant(reply.clone());
        reply
    }

    /// Drops the cached dataset so the next structured turn reloads it.
    pub async fn reload_dataset(&self) {
        info!("Dataset reload requested");
        self.dataset.invalidate().await;
    }
}
