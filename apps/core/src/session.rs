use crate::models::Message;
use uuid::Uuid;

/// First message of every transcript.
pub const GREETING: &str = "Hello! I'm your Apexnuera HR Chatbot. How can I assist you today? You can ask me about **courses**, **job openings**, or **general HR queries**. 😊";

/// One user's conversation.
///
/// The transcript is append-only and always opens with exactly one assistant
/// greeting. The caller owns the session and passes it into the router on each
/// turn; creating and discarding sessions is up to the caller too.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    transcript: Vec<Message>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transcript: vec![Message::assistant(GREETING)],
        }
    }

    /// Rebuilds a session from stored messages. An empty history gets the greeting.
    pub fn from_transcript(id: impl Into<String>, messages: Vec<Message>) -> Self {
        if messages.is_empty() {
            return Self::with_id(id);
        }
        Self {
            id: id.into(),
            transcript: messages,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(Message::assistant(content));
    }

    /// Starts over with a new id and only the greeting.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_new_session_starts_with_one_greeting() {
        let session = Session::new();
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0], Message::assistant(GREETING));
        assert!(Uuid::parse_str(session.id()).is_ok());
    }

    #[test]
    fn test_appends_keep_order() {
        let mut session = Session::with_id("s1");
        session.push_user("hi");
        session.push_assistant("hello");

        let roles: Vec<Role> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.transcript().last().unwrap().content, "hello");
    }

    #[test]
    fn test_reset_discards_history() {
        let mut session = Session::with_id("s1");
        session.push_user("hi");
        session.reset();

        assert_ne!(session.id(), "s1");
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_from_transcript() {
        let restored = Session::from_transcript(
            "s2",
            vec![Message::assistant(GREETING), Message::user("hi")],
        );
        assert_eq!(restored.transcript().len(), 2);

        let empty = Session::from_transcript("s3", Vec::new());
        assert_eq!(empty.transcript(), [Message::assistant(GREETING)]);
        assert_eq!(empty.id(), "s3");
    }
}
