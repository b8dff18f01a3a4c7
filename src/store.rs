//! In-memory conversation state.
//!
//! The store is the only place conversation state is mutated. It performs no
//! I/O; every mutation is synchronous and is announced to subscribers so a
//! view can react (for example by scrolling to the newest message).

use tokio::sync::mpsc;

use crate::error::ChatError;
use crate::message::{Message, MessageId, Role};

/// Change notifications delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    MessageAppended(MessageId),
    PendingInputChanged,
    AwaitingChanged(bool),
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    pending_input: String,
    awaiting_reply: bool,
    subscribers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Dropping the receiver unsubscribes it.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Commit a new message. Content that is blank once trimmed is rejected
    /// without touching the state.
    pub fn append_message(&mut self, role: Role, content: &str) -> Result<Message, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::Validation);
        }

        let message = Message::new(MessageId::next(), role, content.to_string());
        self.messages.push(message.clone());

        tracing::debug!(id = %message.id(), role = role.as_str(), "message appended");
        self.notify(StoreEvent::MessageAppended(message.id()));
        Ok(message)
    }

    /// Replace the draft text. Raw input, no validation.
    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
        self.notify(StoreEvent::PendingInputChanged);
    }

    pub fn set_awaiting(&mut self, flag: bool) {
        if self.awaiting_reply != flag {
            self.awaiting_reply = flag;
            self.notify(StoreEvent::AwaitingChanged(flag));
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    fn notify(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}
