//! Conversation log
//!
//! Append-only message log for one session. Appends are published on a
//! broadcast channel so a rendering layer can subscribe and redraw without
//! the orchestrator knowing about it; the log itself is never pruned or
//! mutated and is discarded with the session.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Fixed phrase prefixing a successful generation reply; the UI extracts the
/// link from the parenthesized form that follows it.
pub const REPLY_READY_PREFIX: &str = "Your presentation is ready! Open it here";

/// Reply when the backend responded but declined to produce a deck.
pub const REPLY_DECLINED: &str =
    "Sorry, I couldn't create a presentation for that topic. Please try rephrasing it.";

/// Reply when the generation call itself failed.
pub const REPLY_TRY_AGAIN: &str =
    "Something went wrong while generating your presentation. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::System,
            text: text.into(),
        }
    }
}

/// Build the success reply embedding a retrievable link.
pub fn presentation_ready(url: &str) -> String {
    format!("{REPLY_READY_PREFIX} ({url})")
}

/// Recover the link from a success reply's trailing parenthesized form.
pub fn extract_link(text: &str) -> Option<&str> {
    let open = text.rfind('(')?;
    let rest = &text[open + 1..];
    let close = rest.find(')')?;
    let link = &rest[..close];
    if link.is_empty() { None } else { Some(link) }
}

/// The single conversation of a session.
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: bool,
    events: broadcast::Sender<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            messages: Vec::new(),
            in_flight: false,
            events,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a submission is outstanding; further submits are refused.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    /// Subscribe to append events. Receivers that lag simply miss messages;
    /// the log itself remains the source of truth.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.events.subscribe()
    }

    pub(crate) fn append(&mut self, message: Message) {
        // Send fails when nobody is subscribed, which is fine.
        let _ = self.events.send(message.clone());
        self.messages.push(message);
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_reply_link_is_extractable() {
        let text = presentation_ready("https://slides.example/abc");

        assert!(text.starts_with(REPLY_READY_PREFIX));
        assert_eq!(extract_link(&text), Some("https://slides.example/abc"));
    }

    #[test]
    fn test_extract_link_ignores_text_without_parens() {
        assert_eq!(extract_link(REPLY_DECLINED), None);
        assert_eq!(extract_link("no link here ()"), None);
        assert_eq!(extract_link("unbalanced (https://x"), None);
    }

    #[test]
    fn test_append_is_observable_by_subscribers() {
        let mut convo = Conversation::new();
        let mut rx = convo.subscribe();

        convo.append(Message::user("Machine Learning"));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.sender, Sender::User);
        assert_eq!(event.text, "Machine Learning");
        assert_eq!(convo.messages().len(), 1);
    }
}
