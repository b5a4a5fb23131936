//! TUI-less "ask" command

use std::error::Error;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use tracing::debug;

use crate::core::config::Config;
use crate::core::gateway::GeminiGateway;
use crate::core::message::Role;
use crate::core::orchestrator::{ChatSession, ExchangeOutcome, Submission, SubmitError};
use crate::core::providers::{report, resolve_env_settings, ProviderResolutionError};
use crate::core::reveal::RevealConfig;
use crate::core::surface::{MessageBody, Surface};
use crate::utils::logging::LoggingState;

/// Prints only the reply; the question is already on the command line.
struct ReplyPrinter<W: Write> {
    out: W,
    printing: bool,
}

impl<W: Write> ReplyPrinter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            printing: false,
        }
    }

    fn write(&mut self, text: &str) {
        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            debug!(error = %err, "stdout write failed");
        }
    }
}

impl<W: Write> Surface for ReplyPrinter<W> {
    fn append_message(&mut self, role: Role, body: MessageBody) {
        self.printing = role.is_model();
        if let (true, MessageBody::Text(text)) = (self.printing, body) {
            self.write(&text);
        }
    }

    fn append_text(&mut self, delta: &str) {
        if self.printing {
            self.write(delta);
        }
    }

    fn remove_last(&mut self) {}
}

pub async fn run_ask(
    prompt: Vec<String>,
    model: Option<String>,
    log: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: loanchat ask <prompt>");
        std::process::exit(1);
    }

    let config = match Config::get_config_path() {
        Ok(path) => Config::load_from_path(&path)?,
        Err(_) => Config::default(),
    };

    let settings = match resolve_env_settings(&config, model.as_deref()) {
        Ok(settings) => settings,
        Err(err) => std::process::exit(report(&err)),
    };
    let gateway = match GeminiGateway::new(settings) {
        Ok(gateway) => gateway,
        Err(err) => std::process::exit(report(&ProviderResolutionError::client_setup(&err))),
    };

    // Typing effect only when someone is watching.
    let reveal_config = if io::stdout().is_terminal() {
        config.reveal_config()
    } else {
        RevealConfig::instant()
    };

    let mut session = ChatSession::new(Arc::new(gateway), ReplyPrinter::new(io::stdout()), reveal_config)
        .with_logging(LoggingState::new(log)?);

    let interrupt = session.interrupt_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.interrupt();
        }
    });

    let outcome = session.submit(Submission::Text(prompt)).await;
    ctrl_c.abort();

    match outcome {
        Ok(ExchangeOutcome::Answered(_)) | Ok(ExchangeOutcome::RevealInterrupted(_)) => {
            println!();
            Ok(())
        }
        Ok(ExchangeOutcome::Failed(failure)) => {
            println!();
            eprintln!("❌ {failure}");
            std::process::exit(1);
        }
        Err(SubmitError::EmptyInput) | Err(SubmitError::Busy(_)) => {
            eprintln!("Usage: loanchat ask <prompt>");
            std::process::exit(1);
        }
    }
}
