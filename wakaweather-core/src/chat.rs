//! View-model behind the chat assistant.
//!
//! The conversation log only grows: user messages are appended before the
//! request goes out, then exactly one assistant message (the reply or
//! [`FAILURE_REPLY`]) follows when it completes. Only `clear` removes entries.

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    backend::ChatBackend,
    model::{ChatMessage, MessageStatus},
};

/// Appended to the log in place of a reply when a send fails.
pub const FAILURE_REPLY: &str = "Could not reach server. Tap Retry.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub is_sending: bool,
    pub error_message: Option<String>,
}

impl ChatState {
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_user)
    }

    fn set_status(&mut self, id: Uuid, status: MessageStatus) -> bool {
        match self.messages.iter_mut().rev().find(|m| m.id == id) {
            Some(message) => {
                message.status = status;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, nothing happened.
    Ignored,
    /// A send was already in flight; the new text was dropped.
    Busy,
    Delivered,
    Failed,
}

#[derive(Debug)]
pub struct ChatSession<B> {
    backend: B,
    state: watch::Sender<ChatState>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self { backend, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let message = ChatMessage::user(text);
        let id = message.id;
        let mut message = Some(message);

        let started = self.state.send_if_modified(|state| {
            if state.is_sending {
                return false;
            }
            state.is_sending = true;
            state.error_message = None;
            state.messages.extend(message.take());
            true
        });
        if !started {
            debug!("chat send already in flight, dropping message");
            return SendOutcome::Busy;
        }

        let in_flight = InFlight {
            state: &self.state,
            user_message: id,
            finished: false,
        };

        match self.backend.send_chat(text).await {
            Ok(reply) => {
                in_flight.finish(|state| {
                    // A reply to a message the user already cleared is dropped.
                    if state.set_status(id, MessageStatus::Delivered) {
                        state.messages.push(ChatMessage::assistant(reply));
                    }
                });
                SendOutcome::Delivered
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "chat send failed");
                let description = err.to_string();
                in_flight.finish(|state| {
                    state.error_message = Some(description);
                    if state.set_status(id, MessageStatus::Failed) {
                        state.messages.push(ChatMessage::failure(FAILURE_REPLY));
                    }
                });
                SendOutcome::Failed
            }
        }
    }

    /// Sends the latest user message again as a new entry. `None` when there is none.
    pub async fn retry_last_user_message(&self) -> Option<SendOutcome> {
        let text = self.state.borrow().last_user_message()?.text.clone();
        Some(self.send(&text).await)
    }

    /// Sends the text of a specific earlier user message again.
    pub async fn resend(&self, id: Uuid) -> Option<SendOutcome> {
        let text = self
            .state
            .borrow()
            .messages
            .iter()
            .find(|m| m.is_user && m.id == id)?
            .text
            .clone();
        Some(self.send(&text).await)
    }

    pub fn clear(&self) {
        self.state.send_if_modified(|state| {
            if state.messages.is_empty() {
                return false;
            }
            state.messages.clear();
            true
        });
    }
}

/// Clears `is_sending` and settles a still-pending user message if the send is dropped.
struct InFlight<'a> {
    state: &'a watch::Sender<ChatState>,
    user_message: Uuid,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self, apply: impl FnOnce(&mut ChatState)) {
        self.state.send_modify(|state| {
            apply(state);
            state.is_sending = false;
        });
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let id = self.user_message;
        self.state.send_modify(|state| {
            state.is_sending = false;
            state.set_status(id, MessageStatus::Failed);
        });
    }
}
