//! Append-only conversation history.

use crate::core::message::Turn;

#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full history in creation order.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    #[test]
    fn snapshot_preserves_append_order() {
        let mut store = ConversationStore::new();
        assert!(store.is_empty());

        store.append(Turn::user("first"));
        store.append(Turn::model("second"));
        store.append(Turn::user("third"));

        let roles: Vec<Role> = store.snapshot().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::User]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.snapshot()[2].text, "third");
    }
}
