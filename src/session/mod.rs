use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod coordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "ARIA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }
}

/// Conversation history for one session. Insertion order is display order.
///
/// Only grows, except through [`Transcript::reset`]. Every reset bumps the
/// generation so late replies can be told apart from the current chat.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    generation: u64,
}

impl Transcript {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.generation += 1;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn find(&self, id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Message, Sender, Transcript};

    #[test]
    fn transcript_keeps_insertion_order() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("first"));
        transcript.push(Message::assistant("second"));

        let contents: Vec<&str> = transcript
            .messages()
            .iter()
            .map(|message| message.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(
            transcript.messages().last().map(|m| m.sender),
            Some(Sender::Assistant)
        );
    }

    #[test]
    fn reset_empties_and_advances_generation() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("hello"));
        let before = transcript.generation();

        transcript.reset();

        assert!(transcript.is_empty());
        assert_eq!(transcript.generation(), before + 1);
    }

    #[test]
    fn find_returns_message_by_id() {
        let mut transcript = Transcript::default();
        let message = Message::assistant("copy me");
        let id = message.id;
        transcript.push(message);
        transcript.push(Message::user("other"));

        assert_eq!(
            transcript.find(id).map(|m| m.content.as_str()),
            Some("copy me")
        );
        assert!(transcript.find(uuid::Uuid::new_v4()).is_none());
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn sender_serializes_snake_case() {
        let json = serde_json::to_string(&Message::assistant("hi")).expect("message should serialize");
        assert!(json.contains("\"sender\":\"assistant\""));
    }
}
