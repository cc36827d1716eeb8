//! Conversation transcript: messages and the append-only log.

pub mod parser;

use std::sync::Arc;

use crate::surface::DisplaySurface;

use parser::parse_answer;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Bot,
    System,
}

/// One transcript entry. Immutable once created; removed only when the
/// whole log is cleared.
#[derive(Debug, Clone)]
pub struct Message {
    pub origin: Origin,
    /// The exact text submitted or received.
    pub raw_text: String,
    /// Display text. For bot messages this is the parsed answer segment;
    /// for user and system messages it equals `raw_text`.
    pub rendered_answer: String,
    /// True when a leading `Answer:` label was stripped from a bot payload
    /// and should be re-rendered emphasized.
    pub answer_labeled: bool,
    /// Opaque citation block (`"Source(s):\n- ..."`), bot messages only.
    pub sources: Option<String>,
    /// Unix timestamp at creation.
    pub at: i64,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(Origin::User, text.into())
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::plain(Origin::System, text.into())
    }

    /// Build a bot message by running the raw payload through the answer
    /// parser.
    pub fn bot(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let parsed = parse_answer(&raw_text);
        Self {
            origin: Origin::Bot,
            raw_text,
            rendered_answer: parsed.answer,
            answer_labeled: parsed.labeled,
            sources: parsed.sources,
            at: chrono::Utc::now().timestamp(),
        }
    }

    fn plain(origin: Origin, raw_text: String) -> Self {
        Self {
            origin,
            rendered_answer: raw_text.clone(),
            raw_text,
            answer_labeled: false,
            sources: None,
            at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Append-only ordered record of the conversation.
///
/// Notifies the display surface synchronously after each mutation so the
/// most recent entry is immediately visible.
pub struct MessageLog {
    messages: Vec<Message>,
    surface: Arc<dyn DisplaySurface>,
}

impl MessageLog {
    pub fn new(surface: Arc<dyn DisplaySurface>) -> Self {
        Self {
            messages: Vec::new(),
            surface,
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        if let Some(newest) = self.messages.last() {
            self.surface.message_appended(newest);
        }
    }

    /// Used only on session reset or on a successful upload replacing any
    /// prior conversation.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.surface.log_cleared();
    }

    /// Read-only snapshot for rendering.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Affordances, StatusKind};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Counts notifications; enough to pin the mutation→notify contract.
    #[derive(Default)]
    struct CountingSurface {
        appended: Mutex<Vec<(Origin, String)>>,
        cleared: Mutex<usize>,
    }

    #[async_trait]
    impl DisplaySurface for CountingSurface {
        fn message_appended(&self, message: &Message) {
            self.appended
                .lock()
                .unwrap()
                .push((message.origin, message.rendered_answer.clone()));
        }

        fn log_cleared(&self) {
            *self.cleared.lock().unwrap() += 1;
        }

        fn set_status(&self, _text: &str, _kind: StatusKind) {}
        fn set_affordances(&self, _affordances: Affordances) {}
        fn notice(&self, _text: &str) {}

        async fn confirm_reset(&self, _prompt: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_append_preserves_order_and_notifies() {
        let surface = Arc::new(CountingSurface::default());
        let mut log = MessageLog::new(surface.clone());

        log.append(Message::user("first"));
        log.append(Message::system("second"));

        let all = log.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].raw_text, "first");
        assert_eq!(all[1].raw_text, "second");

        let appended = surface.appended.lock().unwrap();
        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0], (Origin::User, "first".to_string()));
        assert_eq!(appended[1], (Origin::System, "second".to_string()));
    }

    #[test]
    fn test_clear_empties_and_notifies() {
        let surface = Arc::new(CountingSurface::default());
        let mut log = MessageLog::new(surface.clone());

        log.append(Message::user("gone"));
        log.clear();

        assert!(log.all().is_empty());
        assert_eq!(*surface.cleared.lock().unwrap(), 1);
    }

    #[test]
    fn test_bot_message_runs_parser() {
        let message = Message::bot("Answer: $500\n\nSource(s):\n- p.3");
        assert_eq!(message.origin, Origin::Bot);
        assert_eq!(message.raw_text, "Answer: $500\n\nSource(s):\n- p.3");
        assert_eq!(message.rendered_answer, "$500");
        assert!(message.answer_labeled);
        assert_eq!(message.sources.as_deref(), Some("Source(s):\n- p.3"));
    }

    #[test]
    fn test_plain_messages_render_verbatim() {
        let message = Message::user("Answer: not parsed");
        assert_eq!(message.rendered_answer, "Answer: not parsed");
        assert!(!message.answer_labeled);
        assert!(message.sources.is_none());
    }
}
