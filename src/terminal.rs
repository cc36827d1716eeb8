//! Terminal shell over the display surface.
//!
//! Everything here is rendering and input plumbing; session behavior lives
//! behind the `DisplaySurface` boundary in the core.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::chat::{Message, Origin};
use crate::session::Orchestrator;
use crate::surface::{Affordances, DisplaySurface, StatusKind};

const HELP: &str = "Commands:\n  \
    :open <path>   upload a document (PDF, DOCX, TXT)\n  \
    :reset         reset the chatbot\n  \
    :history       reprint the conversation\n  \
    :help          show this help\n  \
    :quit          exit\n\
    Anything else is sent as a question about the loaded document.";

pub struct TerminalSurface {
    // Shared between the command loop and the confirm prompt; the two never
    // read concurrently because operations are serialized.
    input: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
    affordances: StdMutex<Affordances>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            input: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            affordances: StdMutex::new(Affordances::idle(false)),
        }
    }

    fn prompt(&self) -> &'static str {
        let send_enabled = self.affordances.lock().map(|a| a.send).unwrap_or(false);
        if send_enabled {
            "ask> "
        } else {
            "> "
        }
    }

    async fn read_line(&self) -> Option<String> {
        self.input.lock().await.next_line().await.ok().flatten()
    }

    fn render(message: &Message) {
        match message.origin {
            Origin::User => println!("You: {}", message.rendered_answer),
            Origin::System => println!("[system] {}", message.rendered_answer),
            Origin::Bot => {
                if message.answer_labeled {
                    println!("Bot: Answer: {}", message.rendered_answer);
                } else {
                    println!("Bot: {}", message.rendered_answer);
                }
                if let Some(sources) = &message.sources {
                    // Citation text is shown verbatim, never interpreted.
                    println!("{}", sources);
                }
            }
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplaySurface for TerminalSurface {
    fn message_appended(&self, message: &Message) {
        Self::render(message);
    }

    fn log_cleared(&self) {
        println!("--- conversation cleared ---");
    }

    fn set_status(&self, text: &str, kind: StatusKind) {
        match kind {
            StatusKind::Info | StatusKind::Success => println!("* {}", text),
            StatusKind::Error => eprintln!("! {}", text),
        }
    }

    fn set_affordances(&self, affordances: Affordances) {
        if let Ok(mut current) = self.affordances.lock() {
            *current = affordances;
        }
    }

    fn notice(&self, text: &str) {
        eprintln!("! {}", text);
    }

    async fn confirm_reset(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        match self.read_line().await {
            Some(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }
}

/// Read commands until `:quit` or end of input, dispatching one operation
/// at a time.
pub async fn run(orchestrator: &mut Orchestrator, surface: Arc<TerminalSurface>) -> Result<()> {
    println!("{}", HELP);

    loop {
        print!("{}", surface.prompt());
        std::io::stdout().flush()?;

        let Some(line) = surface.read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == ":open" {
            orchestrator.upload_document(None).await;
        } else if let Some(path) = line.strip_prefix(":open ") {
            orchestrator
                .upload_document(Some(Path::new(path.trim())))
                .await;
        } else if line == ":reset" {
            orchestrator.reset_session().await;
        } else if line == ":history" {
            for message in orchestrator.log().all() {
                let stamp = chrono::DateTime::from_timestamp(message.at, 0)
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                print!("[{}] ", stamp);
                TerminalSurface::render(message);
            }
        } else if line == ":help" {
            println!("{}", HELP);
        } else if line == ":quit" || line == ":q" {
            break;
        } else if line.starts_with(':') {
            eprintln!("! Unknown command: {}. Type :help for usage.", line);
        } else {
            orchestrator.ask_question(line).await;
        }
    }

    Ok(())
}
