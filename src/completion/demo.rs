use super::{CompletionClient, CompletionError};
use crate::session::Message;
use async_trait::async_trait;
use std::time::Duration;

const CANNED_REPLIES: [&str; 5] = [
    "I'm ARIA, your AI assistant! I'm currently running in demo mode. To enable full AI functionality, configure an API key.",
    "That's a great question! In demo mode, I can show you how the interface works. For real AI responses, connect an API key.",
    "I'd love to help you with that! This is a demonstration of the chat interface. Add an API key to unlock full AI capabilities.",
    "Interesting! I'm designed to be helpful, harmless, and honest. Right now I'm showing you the UI - add an API key for real conversations.",
    "I understand what you're asking. This interface is ready for real AI conversations once you configure an API key!",
];

/// Offline backend: answers with a canned reply after a simulated network delay.
pub struct DemoClient {
    min_delay: Duration,
    max_delay: Duration,
}

impl DemoClient {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let max_delay = max_delay.max(min_delay);
        Self {
            min_delay,
            max_delay,
        }
    }

    fn delay(&self) -> Duration {
        if self.max_delay == self.min_delay {
            return self.min_delay;
        }
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::random_range(min..=max))
    }
}

impl Default for DemoClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(3000))
    }
}

#[async_trait]
impl CompletionClient for DemoClient {
    fn name(&self) -> &str {
        "Demo"
    }

    async fn complete(&self, _transcript: &[Message]) -> Result<String, CompletionError> {
        tokio::time::sleep(self.delay()).await;
        let index = rand::random_range(0..CANNED_REPLIES.len());
        Ok(CANNED_REPLIES[index].to_string())
    }
}
