//! One-at-a-time orchestration of the three remote operations.
//!
//! Every operation runs inside the same envelope: validate locally, apply
//! the entry transition, disable all three affordances, perform the single
//! remote call, classify the outcome into log/status updates plus a
//! completion transition, and re-enable the affordances from the resulting
//! state. Affordances are released on every completion path, so a failed
//! call can never leave the surface locked.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{QaService, ServiceError};
use crate::chat::parser::compose_payload;
use crate::chat::{Message, MessageLog};
use crate::session::{SessionController, SessionEvent};
use crate::surface::{Affordances, DisplaySurface, StatusKind};

pub const WELCOME_MESSAGE: &str =
    "Welcome! Upload a document (PDF, DOCX, TXT) to begin asking questions about its content.";

const RESET_CONFIRM_PROMPT: &str = "Are you sure you want to reset the chatbot? \
     This will clear the conversation and remove the loaded document from memory.";

pub struct Orchestrator {
    session: SessionController,
    log: MessageLog,
    service: Arc<dyn QaService>,
    surface: Arc<dyn DisplaySurface>,
}

impl Orchestrator {
    /// Seeds the transcript with the welcome message and publishes the
    /// initial affordance state (chat disabled until a document is loaded).
    pub fn new(service: Arc<dyn QaService>, surface: Arc<dyn DisplaySurface>) -> Self {
        let mut log = MessageLog::new(surface.clone());
        log.append(Message::system(WELCOME_MESSAGE));
        surface.set_affordances(Affordances::idle(false));

        Self {
            session: SessionController::new(),
            log,
            service,
            surface,
        }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Upload a document for remote processing. A successful upload
    /// replaces any loaded document and clears the prior conversation.
    pub async fn upload_document(&mut self, path: Option<&Path>) {
        let Some(path) = path else {
            self.surface.set_status("No file selected.", StatusKind::Error);
            return;
        };
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => path.display().to_string(),
        };
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.surface.set_status(
                    &format!("Could not read \"{}\": {}", path.display(), e),
                    StatusKind::Error,
                );
                return;
            }
        };
        if let Err(rejected) = self.session.apply(SessionEvent::FileChosen) {
            self.surface.notice(&rejected.to_string());
            return;
        }

        info!(filename, size = bytes.len(), "Document upload started");
        self.surface
            .set_status(&format!("Processing \"{}\"...", filename), StatusKind::Info);
        self.surface.set_affordances(Affordances::busy());

        match self.service.upload_document(&filename, bytes).await {
            Ok(()) => {
                info!(filename, "Document processed");
                self.surface.set_status(
                    &format!("\"{}\" processed successfully!", filename),
                    StatusKind::Success,
                );
                // The new document replaces any prior conversation.
                self.log.clear();
                self.log.append(Message::system(format!(
                    "Document \"{}\" processed. You can now ask questions!",
                    filename
                )));
                self.complete(SessionEvent::UploadSucceeded);
            }
            Err(ServiceError::Rejected { detail }) => {
                warn!(filename, detail, "Document upload rejected");
                self.surface
                    .set_status(&format!("Error: {}", detail), StatusKind::Error);
                self.log.append(Message::system(format!(
                    "Error processing document: {}",
                    detail
                )));
                self.complete(SessionEvent::UploadFailed);
            }
            Err(ServiceError::Transport(err)) => {
                warn!(filename, error = %err, "Document upload hit a transport failure");
                self.surface.set_status(
                    &format!("Network error: {}. Is backend running?", err),
                    StatusKind::Error,
                );
                self.log.append(Message::system(format!(
                    "A network error occurred: {}. Ensure backend is running.",
                    err
                )));
                self.complete(SessionEvent::UploadFailed);
            }
        }

        self.release();
    }

    /// Ask a question about the loaded document. The question lands in the
    /// transcript before the request is sent.
    pub async fn ask_question(&mut self, text: &str) {
        let question = text.trim();
        if question.is_empty() {
            self.surface.notice("Please enter a question.");
            return;
        }
        if let Err(rejected) = self.session.apply(SessionEvent::AskStarted) {
            warn!(%rejected, "ask attempted without a ready session");
            self.surface.notice(
                "No document has been uploaded and processed yet. \
                 Please upload a document first to enable chat functionality.",
            );
            return;
        }

        self.log.append(Message::user(question));
        self.surface.set_affordances(Affordances::busy());
        info!(question, "Chat query started");

        match self.service.ask(question).await {
            Ok(chat) => {
                info!(
                    answer_len = chat.answer.len(),
                    source_count = chat.sources.len(),
                    "Chat query complete"
                );
                let raw = compose_payload(&chat.answer, &chat.sources);
                self.log.append(Message::bot(raw));
                self.complete(SessionEvent::AskSucceeded);
            }
            Err(ServiceError::Rejected { detail }) => {
                warn!(detail, "Chat query rejected");
                self.log.append(Message::system(format!(
                    "Error: {}. Please try your question again or re-upload the document.",
                    detail
                )));
                self.complete(SessionEvent::AskFailed);
            }
            Err(ServiceError::Transport(err)) => {
                warn!(error = %err, "Chat query hit a transport failure");
                self.log.append(Message::system(format!(
                    "Network error during chat: {}. Is the backend server running?",
                    err
                )));
                self.complete(SessionEvent::AskFailed);
            }
        }

        self.release();
    }

    /// Reset the remote session after an explicit confirmation. Declining
    /// sends nothing and changes nothing.
    pub async fn reset_session(&mut self) {
        if !self.surface.confirm_reset(RESET_CONFIRM_PROMPT).await {
            return;
        }
        if let Err(rejected) = self.session.apply(SessionEvent::ResetRequested) {
            warn!(%rejected, "reset attempted with nothing to reset");
            self.surface
                .notice("No document is loaded; there is nothing to reset.");
            return;
        }

        info!("Session reset started");
        self.surface.set_status("Resetting...", StatusKind::Info);
        self.surface.set_affordances(Affordances::busy());

        match self.service.reset().await {
            Ok(()) => {
                info!("Session reset complete");
                self.surface
                    .set_status("Chatbot reset successfully.", StatusKind::Success);
                self.complete(SessionEvent::ResetSucceeded);
                self.log.clear();
                self.log.append(Message::system(WELCOME_MESSAGE));
            }
            Err(ServiceError::Rejected { detail }) => {
                warn!(detail, "Session reset rejected");
                self.surface
                    .set_status(&format!("Error: {}", detail), StatusKind::Error);
                self.log.append(Message::system(format!(
                    "Error resetting chatbot: {}",
                    detail
                )));
                self.complete(SessionEvent::ResetFailed);
            }
            Err(ServiceError::Transport(err)) => {
                warn!(error = %err, "Session reset hit a transport failure");
                self.surface.set_status(
                    &format!("Network error during reset: {}.", err),
                    StatusKind::Error,
                );
                self.log.append(Message::system(format!(
                    "A network error occurred during reset: {}.",
                    err
                )));
                self.complete(SessionEvent::ResetFailed);
            }
        }

        self.release();
    }

    /// Completion transitions cannot be rejected while the affordance
    /// gating holds; a rejection here means a broken invariant, so it is
    /// logged rather than propagated.
    fn complete(&mut self, event: SessionEvent) {
        if let Err(err) = self.session.apply(event) {
            warn!(%err, "completion event rejected");
        }
        debug!(?event, state = ?self.session.current_state(), "operation complete");
    }

    fn release(&self) {
        self.surface
            .set_affordances(Affordances::idle(self.session.chat_enabled()));
    }
}
