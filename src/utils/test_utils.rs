use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::gateway::{CompletionGateway, CompletionResult};
use crate::core::message::{Role, Turn};
use crate::core::surface::{MessageBody, Surface};

/// Gateway that replays canned results and records every history it saw.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<CompletionResult>>,
    requests: Mutex<Vec<Vec<Turn>>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new(replies: impl IntoIterator<Item = CompletionResult>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_replies<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            texts
                .into_iter()
                .map(|text| CompletionResult::Success(text.to_string())),
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, history: &[Turn]) -> CompletionResult {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(history.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| CompletionResult::TransportError("script exhausted".to_string()))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    Append(Role, MessageBody),
    AppendText(String),
    RemoveLast,
    Notice(String),
}

/// Surface that remembers every command and can replay them into the
/// currently visible transcript.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<RenderCommand>,
    max_pending: usize,
}

impl RecordingSurface {
    /// Transcript commands, without out-of-band notices.
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.commands
            .iter()
            .filter(|command| !matches!(command, RenderCommand::Notice(_)))
            .cloned()
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Notice(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn replay(&self) -> Vec<(Role, MessageBody)> {
        let mut messages: Vec<(Role, MessageBody)> = Vec::new();
        for command in &self.commands {
            match command {
                RenderCommand::Append(role, body) => messages.push((*role, body.clone())),
                RenderCommand::AppendText(delta) => {
                    if let Some((_, MessageBody::Text(text))) = messages.last_mut() {
                        text.push_str(delta);
                    }
                }
                RenderCommand::RemoveLast => {
                    messages.pop();
                }
                RenderCommand::Notice(_) => {}
            }
        }
        messages
    }

    /// Messages on screen right now, placeholders excluded.
    pub fn visible(&self) -> Vec<(Role, String)> {
        self.replay()
            .into_iter()
            .filter_map(|(role, body)| match body {
                MessageBody::Text(text) => Some((role, text)),
                MessageBody::Pending => None,
            })
            .collect()
    }

    pub fn pending_visible(&self) -> usize {
        self.replay()
            .iter()
            .filter(|(_, body)| *body == MessageBody::Pending)
            .count()
    }

    /// Highest number of placeholders ever on screen at once.
    pub fn max_pending_visible(&self) -> usize {
        self.max_pending
    }

    fn record(&mut self, command: RenderCommand) {
        self.commands.push(command);
        self.max_pending = self.max_pending.max(self.pending_visible());
    }
}

impl Surface for RecordingSurface {
    fn append_message(&mut self, role: Role, body: MessageBody) {
        self.record(RenderCommand::Append(role, body));
    }

    fn append_text(&mut self, delta: &str) {
        self.record(RenderCommand::AppendText(delta.to_string()));
    }

    fn remove_last(&mut self) {
        self.record(RenderCommand::RemoveLast);
    }

    fn notice(&mut self, text: &str) {
        self.record(RenderCommand::Notice(text.to_string()));
    }
}

pub fn sample_transcript() -> Vec<Turn> {
    vec![
        Turn::user("What would I pay monthly on 100000 at 5% over 30 years?"),
        Turn::model("Using M = P [ i(1 + i)^n ] / [ (1 + i)^n – 1 ] with i = 0.05/12 and n = 360, the monthly payment is about 536.82."),
        Turn::user("Any fees I should ask about?"),
        Turn::model("Ask about processing fees and prepayment penalties."),
    ]
}
