//! Render commands the orchestrator issues to whatever displays the chat.

use crate::core::message::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    /// The "response in flight" placeholder.
    Pending,
}

/// A presentation target. Implementations only draw; they never feed back
/// into the conversation.
pub trait Surface {
    fn append_message(&mut self, role: Role, body: MessageBody);

    /// Extend the most recently appended message.
    fn append_text(&mut self, delta: &str);

    /// Drop the most recently appended message. Only used to discard the
    /// pending placeholder.
    fn remove_last(&mut self);

    /// Out-of-band notice (command feedback, status). Not part of the
    /// transcript.
    fn notice(&mut self, _text: &str) {}
}
