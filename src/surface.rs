//! Boundary to the rendering substrate.
//!
//! The core never paints anything itself: it writes structured content
//! through this trait and the shell decides how it looks. The terminal
//! implementation lives in [`crate::terminal`].

use async_trait::async_trait;

use crate::chat::Message;

/// Severity of a status-line update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Enabled/disabled state of the three interactive controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub upload: bool,
    pub send: bool,
    pub reset: bool,
}

impl Affordances {
    /// All controls disabled — exactly while one operation is in flight.
    pub fn busy() -> Self {
        Self {
            upload: false,
            send: false,
            reset: false,
        }
    }

    /// Idle state: upload and reset available, send gated on the session
    /// being ready for questions.
    pub fn idle(chat_enabled: bool) -> Self {
        Self {
            upload: true,
            send: chat_enabled,
            reset: true,
        }
    }
}

/// The display surface the session writes into.
///
/// `message_appended` and `log_cleared` are invoked synchronously after each
/// log mutation so the newest entry is immediately visible.
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    fn message_appended(&self, message: &Message);

    fn log_cleared(&self);

    /// Reflect the most recent operation's outcome on the status line.
    fn set_status(&self, text: &str, kind: StatusKind);

    fn set_affordances(&self, affordances: Affordances);

    /// Transient validation notice; not part of the transcript.
    fn notice(&self, text: &str);

    /// Explicit yes/no gate shown before a reset request is issued.
    async fn confirm_reset(&self, prompt: &str) -> bool;
}
