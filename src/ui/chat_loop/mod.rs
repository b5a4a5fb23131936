//! Interactive chat loop.
//!
//! Reads lines from stdin, routes slash commands, and hands everything else
//! to the [`ChatSession`]. Ctrl+C interrupts an exchange in flight; pressed
//! while idle it leaves the chat.

mod setup;

pub use setup::bootstrap_session;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::commands::{process_input, topics_text, CommandContext, CommandResult};
use crate::core::config::{Config, ThemePreference};
use crate::core::orchestrator::{ChatSession, ExchangeOutcome, InterruptHandle, SubmitError};
use crate::core::surface::Surface;
use crate::ui::terminal::TerminalSurface;
use crate::ui::theme::Theme;

pub const PROMPT: &str = "> ";

/// Terminal-side extras the loop needs beyond transcript rendering.
pub trait Console: Surface {
    fn prompt(&mut self, _text: &str) {}

    fn end_line(&mut self) {}

    fn apply_theme(&mut self, _preference: ThemePreference) {}
}

impl<W: io::Write> Console for TerminalSurface<W> {
    fn prompt(&mut self, text: &str) {
        TerminalSurface::prompt(self, text);
    }

    fn end_line(&mut self) {
        TerminalSurface::end_line(self);
    }

    fn apply_theme(&mut self, preference: ThemePreference) {
        self.set_theme(Theme::for_preference(preference));
    }
}

pub struct ChatApp<S: Console> {
    pub session: ChatSession<S>,
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl<S: Console> ChatApp<S> {
    pub fn new(session: ChatSession<S>, config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            session,
            config,
            config_path,
        }
    }

    fn greet(&mut self) {
        let model = self.session.model_id().to_string();
        let surface = self.session.surface_mut();
        surface.notice(&format!(
            "Loan payment assistant ({model}). Ask a question, or type /help."
        ));
        surface.notice(&topics_text());
    }

    /// Handle one line of input. Returns `false` once the user asked to leave.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        let result = {
            let mut ctx = CommandContext {
                session: &mut self.session,
                config: &mut self.config,
                config_path: self.config_path.as_deref(),
            };
            process_input(&mut ctx, line)
        };

        match result {
            CommandResult::Continue => {}
            CommandResult::Quit => return false,
            CommandResult::ThemeChanged(preference) => {
                self.session.surface_mut().apply_theme(preference);
            }
            CommandResult::Submit(submission) => {
                let outcome = self.session.submit(submission).await;
                self.session.surface_mut().end_line();
                match outcome {
                    Ok(ExchangeOutcome::Answered(_)) => {}
                    Ok(ExchangeOutcome::RevealInterrupted(_)) => {
                        self.session.surface_mut().notice("(reply cut short)");
                    }
                    Ok(ExchangeOutcome::Failed(result)) => {
                        debug!(kind = result.kind(), detail = %result, "exchange failed");
                    }
                    Err(SubmitError::EmptyInput) => {}
                    Err(err @ SubmitError::Busy(_)) => {
                        self.session.surface_mut().notice(&err.to_string());
                    }
                }
            }
        }
        true
    }

    /// Drive the loop until input ends, `/quit`, or a quit signal arrives.
    pub async fn drive<R>(
        &mut self,
        input: R,
        quit: &mut mpsc::UnboundedReceiver<()>,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            self.session.surface_mut().prompt(PROMPT);
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = quit.recv() => None,
            };
            let Some(line) = line else {
                break;
            };
            if !self.handle_line(&line).await {
                break;
            }
        }
        self.session.surface_mut().end_line();
        Ok(())
    }
}

/// Forward Ctrl+C: interrupt the exchange in flight, or ask the loop to quit
/// when there is nothing to interrupt.
fn spawn_interrupt_listener(handle: InterruptHandle) -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if handle.interrupt() {
                debug!("exchange interrupted");
            } else if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

pub async fn run_chat(model: Option<String>, log: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut app = bootstrap_session(model, log)?;
    info!(model = %app.session.model_id(), "chat session started");

    let mut quit = spawn_interrupt_listener(app.session.interrupt_handle());
    app.greet();
    app.drive(BufReader::new(tokio::io::stdin()), &mut quit).await?;

    info!(turns = app.session.history().len(), "chat session ended");
    Ok(())
}
