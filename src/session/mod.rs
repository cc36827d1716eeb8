//! Session lifecycle: one loaded document and its conversation.

pub mod orchestrator;

pub use orchestrator::Orchestrator;

/// Where the session is in its lifecycle.
///
/// `Resetting` records which state it was entered from so a failed reset can
/// return there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoDocument,
    Processing,
    Ready,
    AwaitingAnswer,
    Resetting { was_awaiting: bool },
}

/// The closed event vocabulary driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    FileChosen,
    UploadSucceeded,
    UploadFailed,
    AskStarted,
    AskSucceeded,
    AskFailed,
    ResetRequested,
    ResetSucceeded,
    ResetFailed,
}

/// Defensive rejection of an undefined (state, event) pair. The state is
/// left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{event:?} is not valid while the session is {state:?}")]
pub struct InvalidTransition {
    pub state: SessionState,
    pub event: SessionEvent,
}

/// Owns the session state. No side effects beyond the state update —
/// reacting to transitions (affordances, log, status) is the orchestrator's
/// job.
pub struct SessionController {
    state: SessionState,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            state: SessionState::NoDocument,
        }
    }

    pub fn current_state(&self) -> SessionState {
        self.state
    }

    /// The question input and send control are enabled iff the session is
    /// exactly `Ready`.
    pub fn chat_enabled(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Apply an event, returning the new state. Undefined pairs are
    /// rejected even though correct affordance gating never produces them.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionState, InvalidTransition> {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (self.state, event) {
            // FileChosen is valid from Ready too: uploading a new document
            // replaces the loaded one and its conversation.
            (NoDocument | Ready, FileChosen) => Processing,
            (Processing, UploadSucceeded) => Ready,
            (Processing, UploadFailed) => NoDocument,
            (Ready, AskStarted) => AwaitingAnswer,
            (AwaitingAnswer, AskSucceeded | AskFailed) => Ready,
            (Ready, ResetRequested) => Resetting {
                was_awaiting: false,
            },
            (AwaitingAnswer, ResetRequested) => Resetting { was_awaiting: true },
            (Resetting { .. }, ResetSucceeded) => NoDocument,
            (Resetting { was_awaiting }, ResetFailed) => {
                if was_awaiting {
                    AwaitingAnswer
                } else {
                    Ready
                }
            }
            (state, event) => return Err(InvalidTransition { state, event }),
        };

        self.state = next;
        Ok(next)
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
