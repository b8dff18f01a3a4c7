//! Turns the draft input into a committed user message, performs the single
//! outbound call and commits the reply or raises a notification.
//!
//! The cycle is split into `begin`, `dispatch` and `finish` so an event loop
//! can run the call in a background task and resume when it settles.
//! `submit` chains the three for callers that can simply await.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::client::ChatBackend;
use crate::error::ChatError;
use crate::message::{Message, Role};
use crate::notification::Toasts;
use crate::store::ConversationStore;

/// Result of one submission cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Replied(Message),
    Failed(ChatError),
}

/// An accepted submission whose outbound call has not settled yet
#[derive(Debug, Clone)]
pub struct Submission {
    user_message: Message,
    cancel: CancellationToken,
}

impl Submission {
    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[derive(Clone)]
pub struct SubmissionController {
    backend: Arc<dyn ChatBackend>,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Commit the trimmed draft as a user message and mark the store as
    /// awaiting. Returns `None` (and changes nothing) when the draft is
    /// blank or a reply is already outstanding.
    pub fn begin(&self, store: &mut ConversationStore) -> Option<Submission> {
        if store.is_awaiting_reply() || store.pending_input().trim().is_empty() {
            return None;
        }

        let draft = store.pending_input().trim().to_string();
        let user_message = store.append_message(Role::User, &draft).ok()?;
        store.set_pending_input(String::new());
        store.set_awaiting(true);

        tracing::info!(id = %user_message.id(), "submission started");
        Some(Submission {
            user_message,
            cancel: CancellationToken::new(),
        })
    }

    /// Perform the outbound call for `submission`. Settles early with
    /// `ChatError::Cancelled` if its token is cancelled.
    pub async fn dispatch(&self, submission: &Submission) -> Result<String, ChatError> {
        let content = submission.user_message.content();
        tokio::select! {
            _ = submission.cancel.cancelled() => Err(ChatError::Cancelled),
            result = self.backend.send(content) => result,
        }
    }

    /// Settle a submission: commit the bot reply, or raise one notification
    /// on any failure. Always clears the awaiting flag.
    pub fn finish(
        &self,
        store: &mut ConversationStore,
        toasts: &mut Toasts,
        result: Result<String, ChatError>,
    ) -> SubmissionOutcome {
        let committed = result.and_then(|text| {
            store
                .append_message(Role::Bot, &text)
                .map_err(|_| ChatError::Response("reply text is empty".to_string()))
        });

        let outcome = match committed {
            Ok(reply) => {
                tracing::info!(id = %reply.id(), "reply committed");
                SubmissionOutcome::Replied(reply)
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed");
                toasts.push_reply_failed();
                SubmissionOutcome::Failed(err)
            }
        };

        store.set_awaiting(false);
        outcome
    }

    /// Run a whole cycle in place. `None` when the guard rejects the draft.
    pub async fn submit(
        &self,
        store: &mut ConversationStore,
        toasts: &mut Toasts,
    ) -> Option<SubmissionOutcome> {
        let submission = self.begin(store)?;
        let result = self.dispatch(&submission).await;
        Some(self.finish(store, toasts, result))
    }
}
