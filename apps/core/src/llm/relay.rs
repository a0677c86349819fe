use crate::llm::traits::LlmClient;
use crate::models::{GenerationConfig, Message, ModelTurn, Role, TurnRole};
use std::sync::Arc;
use tracing::{error, instrument};

/// Fixed instruction folded into the first user turn; transcripts carry no system role.
pub const SYSTEM_INSTRUCTION: &str = "You are Apexnuera's helpful and professional HR Chatbot. Your primary goal is to assist users with their inquiries in a friendly and informative manner.
If a question is about specific 'courses', 'job openings', or 'timings', and you have **already stated** that you don't have specific data for them (e.g., \"I don't have information about specific courses right now.\"), then provide a general helpful answer or suggest how the user might find that information (e.g., \"You might want to check the official Apexnuera website or contact the HR department directly for the most up-to-date details.\").
For all other general HR-related questions, provide a clear and concise response based on your training data. Do not make up information.";

/// Forwards a transcript to the language model and relays its answer.
///
/// Failures never escape: any error from the client becomes an apology reply
/// carrying the error detail, and the conversation carries on.
pub struct Relay<L: LlmClient> {
    client: Arc<L>,
    config: GenerationConfig,
}

impl<L: LlmClient> Relay<L> {
    pub fn new(client: Arc<L>, config: GenerationConfig) -> Self {
        Self { client, config }
    }

    /// Maps the transcript onto model turns.
    ///
    /// The system instruction goes in front of the first user message in the
    /// transcript, and only that one, wherever it sits.
    pub fn build_history(transcript: &[Message]) -> Vec<ModelTurn> {
        let mut instructed = false;
        transcript
            .iter()
            .map(|msg| match msg.role {
                Role::User if !instructed => {
                    instructed = true;
                    ModelTurn {
                        role: TurnRole::User,
                        text: format!("{}\n\nUser: {}", SYSTEM_INSTRUCTION, msg.content),
                    }
                }
                Role::User => ModelTurn {
                    role: TurnRole::User,
                    text: msg.content.clone(),
                },
                Role::Assistant => ModelTurn {
                    role: TurnRole::Model,
                    text: msg.content.clone(),
                },
            })
            .collect()
    }

    /// Asks the model for the next assistant reply.
    #[instrument(skip(self, transcript), fields(turns = transcript.len()))]
    pub async fn relay(&self, transcript: &[Message]) -> String {
        let history = Self::build_history(transcript);
        match self.client.generate(&history, &self.config).await {
            Ok(text) => text,
            Err(e) => {
                let reply = apology(&e);
                error!("{}", reply);
                reply
            }
        }
    }
}

/// The user-facing reply when the model cannot be reached.
pub fn apology(detail: &dyn std::fmt::Display) -> String {
    format!(
        "I apologize, but I'm having trouble connecting to Google's AI at the moment. Please try again shortly. (Error: {})",
        detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::session::GREETING;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted client that records the history it was given.
    struct ScriptedClient {
        response: Result<String, AppError>,
        seen: Mutex<Vec<Vec<ModelTurn>>>,
    }

    impl ScriptedClient {
        fn new(response: Result<String, AppError>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn generate(
            &self,
            turns: &[ModelTurn],
            _config: &GenerationConfig,
        ) -> Result<String, AppError> {
            self.seen.lock().unwrap().push(turns.to_vec());
            self.response.clone()
        }
    }

    fn transcript() -> Vec<Message> {
        vec![
            Message::assistant(GREETING),
            Message::user("How many leave days do I get?"),
        ]
    }

    #[test]
    fn test_history_roles_and_instruction_placement() {
        let mut messages = transcript();
        messages.push(Message::assistant("20 days."));
        messages.push(Message::user("And sick leave?"));

        let history = Relay::<ScriptedClient>::build_history(&messages);

        let roles: Vec<TurnRole> = history.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            [TurnRole::Model, TurnRole::User, TurnRole::Model, TurnRole::User]
        );
        assert_eq!(history[0].text, GREETING);
        assert!(history[1].text.starts_with(SYSTEM_INSTRUCTION));
        assert!(history[1].text.ends_with("\n\nUser: How many leave days do I get?"));
        assert_eq!(history[3].text, "And sick leave?");
    }

    #[test]
    fn test_instruction_on_first_user_turn_without_greeting() {
        let messages = vec![Message::user("hi"), Message::assistant("hello"), Message::user("bye")];
        let history = Relay::<ScriptedClient>::build_history(&messages);

        assert!(history[0].text.starts_with(SYSTEM_INSTRUCTION));
        assert_eq!(history[2].text, "bye");
    }

    #[tokio::test]
    async fn test_relay_returns_model_text() {
        let client = Arc::new(ScriptedClient::new(Ok("You get 20 days.".to_string())));
        let relay = Relay::new(client.clone(), GenerationConfig::default());

        let reply = relay.relay(&transcript()).await;

        assert_eq!(reply, "You get 20 days.");
        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 2);
    }

    #[tokio::test]
    async fn test_relay_failure_becomes_apology() {
        let client = Arc::new(ScriptedClient::new(Err(AppError::Http(
            "connection refused".to_string(),
        ))));
        let relay = Relay::new(client, GenerationConfig::default());

        let reply = relay.relay(&transcript()).await;

        assert!(reply.starts_with("I apologize, but I'm having trouble connecting to Google's AI"));
        assert!(reply.contains("(Error: HTTP error: connection refused)"));
    }
}
