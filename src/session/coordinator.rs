use crate::completion::{CompletionClient, CompletionError};
use crate::event::AppEvent;
use crate::notify::Notification;
use crate::session::{Message, Transcript};
use std::sync::{mpsc, Arc};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Assistant reply recorded when a round trip fails for any reason.
pub const FAILURE_REPLY: &str =
    "⚠️ Sorry, I couldn't get a response. Please check your API key and connection, then try again.";
pub const FAILURE_TOAST: &str = "Failed to get response from the assistant.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl SubmitOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// State changes the view reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    TranscriptChanged,
    BusyChanged(bool),
    Notify(Notification),
}

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Owns one conversation and runs at most one round trip at a time.
pub struct SendCoordinator {
    transcript: Transcript,
    busy: bool,
    client: Arc<dyn CompletionClient>,
    runtime: Handle,
    tx: mpsc::Sender<AppEvent>,
    view_events: Vec<ViewEvent>,
}

impl SendCoordinator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        runtime: Handle,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            transcript: Transcript::default(),
            busy: false,
            client,
            runtime,
            tx,
            view_events: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn backend_name(&self) -> &str {
        self.client.name()
    }

    pub fn take_view_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.view_events)
    }

    /// Appends the user message and starts the completion call.
    ///
    /// Blank input and input arriving while a call is outstanding are dropped
    /// without touching the transcript.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        let prompt = text.trim();
        if prompt.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::Empty);
        }
        if self.busy {
            debug!("submission ignored while a reply is pending");
            return SubmitOutcome::Rejected(RejectReason::Busy);
        }

        self.transcript.push(Message::user(prompt));
        self.view_events.push(ViewEvent::TranscriptChanged);
        self.set_busy(true);

        let history = self.transcript.messages().to_vec();
        let generation = self.transcript.generation();
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        info!(
            backend = client.name(),
            turns = self.transcript.len(),
            "requesting completion"
        );

        self.runtime.spawn(async move {
            let result = client.complete(&history).await;
            let _ = tx.send(AppEvent::CompletionSettled { generation, result });
        });

        SubmitOutcome::Accepted
    }

    /// Records the outcome of the outstanding call and clears the busy flag.
    pub fn settle(&mut self, generation: u64, result: Result<String, CompletionError>) {
        if !self.busy {
            debug!("dropping settlement with no outstanding call");
            return;
        }

        if generation != self.transcript.generation() {
            debug!(generation, "dropping reply for a cleared conversation");
            self.set_busy(false);
            return;
        }

        match result {
            Ok(text) => {
                debug!(chars = text.len(), "completion settled");
                self.transcript.push(Message::assistant(text));
            }
            Err(err) => {
                warn!(error = %err, network = err.is_network(), "completion failed");
                self.transcript.push(Message::assistant(FAILURE_REPLY));
                self.view_events
                    .push(ViewEvent::Notify(Notification::error(FAILURE_TOAST)));
            }
        }
        self.view_events.push(ViewEvent::TranscriptChanged);
        self.set_busy(false);
    }

    /// Empties the transcript. A pending reply is discarded when it lands.
    pub fn reset(&mut self) {
        self.transcript.reset();
        self.view_events.push(ViewEvent::TranscriptChanged);
    }

    pub fn new_chat(&mut self) {
        self.reset();
        self.view_events
            .push(ViewEvent::Notify(Notification::info("New chat started")));
    }

    pub fn copy_message(&mut self, id: Uuid, clipboard: &mut dyn Clipboard) {
        let copied = match self.transcript.find(id) {
            Some(message) => clipboard.copy_text(&message.content),
            None => Err(ClipboardError(format!("no message with id {id}"))),
        };

        let notification = match copied {
            Ok(()) => Notification::success("Message copied!"),
            Err(err) => {
                warn!(error = %err, "copy failed");
                Notification::error("Failed to copy message")
            }
        };
        self.view_events.push(ViewEvent::Notify(notification));
    }

    fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.view_events.push(ViewEvent::BusyChanged(busy));
        }
    }
}
