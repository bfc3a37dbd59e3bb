//! Append-only chat transcript.

use eshop_core::ChatRole;

use crate::ai::ChatTurn;

/// Ordered turns of one conversation.
///
/// The first turn is always the system instruction given at construction.
/// It cannot be removed, and later turns can only be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    /// Start a transcript with its system instruction.
    #[must_use]
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::system(system_instruction)],
        }
    }

    /// Append a user or assistant turn.
    ///
    /// System turns after the first are ignored.
    pub fn push(&mut self, turn: ChatTurn) {
        if turn.role == ChatRole::System {
            tracing::warn!("Ignoring additional system turn");
            return;
        }
        self.turns.push(turn);
    }

    /// All turns, system instruction first.
    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Turns after the system instruction.
    pub fn conversation(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().skip(1)
    }

    #[must_use]
    pub fn system_instruction(&self) -> &str {
        self.turns.first().map_or("", |t| t.content.as_str())
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: the system instruction is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
