pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod message;
pub mod notification;
pub mod store;

// Re-export main types for convenience
pub use client::{ChatBackend, ChatClient};
pub use config::Config;
pub use controller::{Submission, SubmissionController, SubmissionOutcome};
pub use error::ChatError;
pub use message::{Message, MessageId, Role};
pub use notification::{Notification, Toasts};
pub use store::{ConversationStore, StoreEvent};
