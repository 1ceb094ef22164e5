use super::models::{Message, NewMessage};

pub const GREETING: &str = "Hello! Upload a document and let's talk about its contents.";

/// Line placed between exported message blocks.
pub const EXPORT_SEPARATOR: &str = "\n\n-------------------\n\n";

/// Append-only, ordered log of the session's messages.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    next_ordinal: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// A transcript holding only the seed greeting.
    pub fn new() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_ordinal: 1,
        };
        transcript.seed();
        transcript
    }

    fn seed(&mut self) {
        self.append(NewMessage::assistant(GREETING));
    }

    /// Assigns the next ordinal and stores the message.
    pub fn append(&mut self, message: NewMessage) -> Message {
        let message = Message {
            ordinal: self.next_ordinal,
            role: message.role,
            content: message.content,
            bound_document_id: message.bound_document_id,
            error: message.error,
            superseded: message.superseded,
        };
        self.next_ordinal += 1;
        self.messages.push(message.clone());
        message
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

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn bound_to<'a>(&'a self, document_id: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages
            .iter()
            .filter(move |m| m.is_bound_to(document_id))
    }

    /// Flag every bound message whose document is not `active_id`.
    /// Returns how many messages changed.
    pub fn mark_superseded(&mut self, active_id: &str) -> usize {
        let mut changed = 0;
        for message in &mut self.messages {
            let stale = matches!(&message.bound_document_id, Some(id) if id != active_id);
            if stale && !message.superseded {
                message.superseded = true;
                changed += 1;
            }
        }
        changed
    }

    /// Role-labeled plain-text rendering. `None` while the transcript holds
    /// fewer than two messages (the greeting alone is not worth saving).
    pub fn export(&self) -> Option<String> {
        if self.messages.len() < 2 {
            return None;
        }
        let blocks: Vec<String> = self
            .messages
            .iter()
            .map(|m| format!("[{}] {}", m.role.label(), m.content))
            .collect();
        Some(blocks.join(EXPORT_SEPARATOR))
    }

    /// Drop every message and re-seed the greeting. Ordinals keep counting.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.seed();
    }
}
