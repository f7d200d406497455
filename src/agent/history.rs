use crate::llm::types::ActionKind;

/// Trailing entries handed to the model as decision context.
pub const CONTEXT_WINDOW: usize = 2;
/// Trailing entries emitted to the display after each step.
pub const DISPLAY_WINDOW: usize = 3;

/// Append-only in-memory session log. Entries are never mutated or removed
/// except by a full reset, and readers only ever see bounded trailing
/// windows.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<String>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_instruction(&mut self, instruction: &str) {
        self.entries.push(format!("User: {instruction}"));
    }

    pub fn push_decision(&mut self, action: ActionKind, reasoning: &str) {
        self.entries.push(format!("{action}: {reasoning}"));
    }

    pub fn context_window(&self) -> &[String] {
        self.tail(CONTEXT_WINDOW)
    }

    pub fn display_window(&self) -> &[String] {
        self.tail(DISPLAY_WINDOW)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn tail(&self, n: usize) -> &[String] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }
}
