//! The chat session: one exchange at a time through
//! `Idle → AwaitingResponse → Revealing → Idle`.
//!
//! [`ChatSession`] owns the conversation history, the pending indicator, and
//! the cancellation token of the exchange in flight. Gateway failures never
//! escape [`ChatSession::submit`]; they become a model-role notice in the
//! history so the session stays usable.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::constants::{topic_prompt, ERROR_NOTICE};
use crate::core::conversation::ConversationStore;
use crate::core::gateway::{CompletionGateway, CompletionResult};
use crate::core::message::{Role, Turn};
use crate::core::reveal::{reveal, RevealConfig};
use crate::core::surface::{MessageBody, Surface};
use crate::utils::logging::LoggingState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    AwaitingResponse,
    Revealing,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExchangeState::Idle => "idle",
            ExchangeState::AwaitingResponse => "awaiting response",
            ExchangeState::Revealing => "revealing",
        })
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Text(String),
    /// A predefined topic, expanded to "Tell me more about {topic}."
    Topic(String),
}

impl Submission {
    pub fn prompt(&self) -> String {
        match self {
            Submission::Text(text) => text.trim().to_string(),
            Submission::Topic(topic) if topic.trim().is_empty() => String::new(),
            Submission::Topic(topic) => topic_prompt(topic),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Nothing but whitespace was submitted.
    EmptyInput,
    /// Another exchange is still in flight.
    Busy(ExchangeState),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptyInput => write!(f, "Nothing to send"),
            SubmitError::Busy(state) => write!(f, "Still busy ({state}); wait for the reply"),
        }
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The reply was fully revealed and recorded.
    Answered(String),
    /// The reply was recorded but its reveal was cut short.
    RevealInterrupted(String),
    /// The gateway failed; the error notice was recorded instead.
    Failed(CompletionResult),
}

/// Marker for the placeholder currently on the surface.
#[derive(Debug)]
struct PendingIndicator;

/// Holds the session for the length of one exchange. If the exchange future
/// is dropped part way, the session is settled back to idle.
struct Exchange<'a, S: Surface> {
    session: &'a mut ChatSession<S>,
}

impl<S: Surface> Drop for Exchange<'_, S> {
    fn drop(&mut self) {
        self.session.settle();
    }
}

/// Cancels whatever exchange is in flight. Cheap to clone and safe to use
/// from a signal handler task.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    current: Arc<Mutex<Option<CancellationToken>>>,
}

impl InterruptHandle {
    /// Returns true if there was an exchange to interrupt.
    pub fn interrupt(&self) -> bool {
        let guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    fn install(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = guard.replace(token.clone()) {
            stale.cancel();
        }
        token
    }

    fn clear(&self) {
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = guard.take() {
            token.cancel();
        }
    }
}

pub struct ChatSession<S: Surface> {
    store: ConversationStore,
    state: ExchangeState,
    pending: Option<PendingIndicator>,
    // Reply being drawn, kept so an abandoned reveal can still be recorded.
    revealing: Option<String>,
    interrupt: InterruptHandle,
    gateway: Arc<dyn CompletionGateway>,
    surface: S,
    reveal_config: RevealConfig,
    logging: LoggingState,
}

impl<S: Surface> ChatSession<S> {
    pub fn new(gateway: Arc<dyn CompletionGateway>, surface: S, reveal_config: RevealConfig) -> Self {
        Self {
            store: ConversationStore::new(),
            state: ExchangeState::Idle,
            pending: None,
            revealing: None,
            interrupt: InterruptHandle::default(),
            gateway,
            surface,
            reveal_config,
            logging: LoggingState::default(),
        }
    }

    pub fn with_logging(mut self, logging: LoggingState) -> Self {
        self.logging = logging;
        self
    }

    pub fn history(&self) -> &[Turn] {
        self.store.snapshot()
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn pending_count(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    pub fn model_id(&self) -> &str {
        self.gateway.model_id()
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn logging_mut(&mut self) -> &mut LoggingState {
        &mut self.logging
    }

    pub fn set_reveal_config(&mut self, config: RevealConfig) {
        self.reveal_config = config;
    }

    /// Run one full exchange for `submission`.
    pub async fn submit(&mut self, submission: Submission) -> Result<ExchangeOutcome, SubmitError> {
        let cancel = self.begin(&submission)?;
        let mut exchange = Exchange { session: self };
        let result = exchange.session.await_response(&cancel).await;
        let outcome = exchange.session.resolve(result, &cancel).await;
        Ok(outcome)
    }

    /// Return to idle whatever state the exchange was left in. A dropped
    /// request records the error notice; a dropped reveal records the reply.
    fn settle(&mut self) {
        match self.state {
            ExchangeState::Idle => {}
            ExchangeState::AwaitingResponse => {
                debug!("exchange abandoned while awaiting a response");
                self.clear_pending();
                self.surface
                    .append_message(Role::Model, MessageBody::Text(ERROR_NOTICE.to_string()));
                self.commit(Turn::model(ERROR_NOTICE));
            }
            ExchangeState::Revealing => {
                debug!("exchange abandoned while revealing");
                self.clear_pending();
                if let Some(text) = self.revealing.take() {
                    self.commit(Turn::model(text));
                }
            }
        }
        self.state = ExchangeState::Idle;
        self.interrupt.clear();
    }

    /// Idle: validate, record the user turn, raise the pending indicator.
    fn begin(&mut self, submission: &Submission) -> Result<CancellationToken, SubmitError> {
        if self.state != ExchangeState::Idle {
            debug!(state = %self.state, "ignoring submission while an exchange is in flight");
            return Err(SubmitError::Busy(self.state));
        }

        let prompt = submission.prompt();
        if prompt.is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        self.surface
            .append_message(Role::User, MessageBody::Text(prompt.clone()));
        self.commit(Turn::user(prompt));

        self.state = ExchangeState::AwaitingResponse;
        self.show_pending();
        Ok(self.interrupt.install())
    }

    /// AwaitingResponse: the only network suspension point.
    async fn await_response(&self, cancel: &CancellationToken) -> CompletionResult {
        let history = self.store.snapshot();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                CompletionResult::TransportError("request interrupted".to_string())
            }
            result = self.gateway.complete(history) => result,
        }
    }

    /// Leave AwaitingResponse. The indicator is cleared first on every path.
    async fn resolve(
        &mut self,
        result: CompletionResult,
        cancel: &CancellationToken,
    ) -> ExchangeOutcome {
        self.clear_pending();

        match result {
            CompletionResult::Success(text) => {
                self.state = ExchangeState::Revealing;
                self.reveal_reply(text, cancel).await
            }
            failure => {
                warn!(kind = failure.kind(), detail = %failure, "exchange failed");
                self.surface
                    .append_message(Role::Model, MessageBody::Text(ERROR_NOTICE.to_string()));
                self.commit(Turn::model(ERROR_NOTICE));
                self.state = ExchangeState::Idle;
                ExchangeOutcome::Failed(failure)
            }
        }
    }

    /// Revealing: pace the reply onto the surface, then record it.
    async fn reveal_reply(&mut self, text: String, cancel: &CancellationToken) -> ExchangeOutcome {
        self.surface
            .append_message(Role::Model, MessageBody::Text(String::new()));
        self.revealing = Some(text.clone());

        let surface = &mut self.surface;
        let revealed = reveal(text.clone(), self.reveal_config, cancel.clone())
            .run_deltas(|delta| surface.append_text(delta))
            .await;

        let outcome = match revealed {
            Ok(full) => ExchangeOutcome::Answered(full),
            Err(interrupted) => {
                debug!(shown = interrupted.shown_chars, "reveal interrupted");
                ExchangeOutcome::RevealInterrupted(text.clone())
            }
        };
        // The history always gets the whole reply, however much was drawn.
        self.revealing = None;
        self.commit(Turn::model(text));
        self.state = ExchangeState::Idle;
        outcome
    }

    fn commit(&mut self, turn: Turn) {
        if let Err(err) = self.logging.log_turn(&turn) {
            warn!(error = %err, "failed to write transcript log");
        }
        self.store.append(turn);
    }

    fn show_pending(&mut self) {
        if self.pending.is_none() {
            self.surface.append_message(Role::Model, MessageBody::Pending);
            self.pending = Some(PendingIndicator);
        }
    }

    fn clear_pending(&mut self) {
        if self.pending.take().is_some() {
            self.surface.remove_last();
        }
    }
}

impl<S: Surface> Drop for ChatSession<S> {
    fn drop(&mut self) {
        self.interrupt.clear();
    }
}
