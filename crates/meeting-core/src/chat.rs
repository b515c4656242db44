//! Meeting chat log
//!
//! Append-only, arrival-ordered, deduplicated by message id. The channel
//! may deliver a message more than once (including the sender's own echo),
//! so insertion is guarded by an idempotent id check. Once inserted, a
//! message never moves or disappears; cross-client ordering is best-effort
//! but each local log is internally consistent.

use std::collections::HashSet;

use crate::types::ChatMessage;

/// Deduplicated chat log scoped to one meeting attempt
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    seen: HashSet<String>,
}

impl ChatLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Insert a message, collapsing duplicates by id
    ///
    /// Returns `true` if the message was appended, `false` if its id was
    /// already present (the existing entry is left untouched).
    pub fn insert(&mut self, message: ChatMessage) -> bool {
        if !self.seen.insert(message.id.clone()) {
            tracing::debug!(id = %message.id, "dropping duplicate chat message");
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Messages in arrival order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages in the log
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
