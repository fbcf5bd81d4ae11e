//! Interactive terminal session: spinner, notes, and pickers.
//!
//! The orchestrator only talks to the [`Session`] trait, so the prompts can
//! be scripted in tests. Every prompt returns an [`Answer`] that the caller
//! must check for cancellation before moving on.

pub mod terminal;

use crate::error::SessionError;

pub use terminal::TerminalSession;

/// Result of an interactive prompt: either the user's answer or a
/// cancellation (Esc, `q`, Ctrl+C).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Cancelled,
    Value(T),
}

impl<T> Answer<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Answer::Cancelled => None,
            Answer::Value(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Answer<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Answer::Cancelled, Answer::Value)
    }
}

/// One entry of a select or multi-select prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub hint: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Label with the hint appended, as shown to the user.
    pub fn display(&self) -> String {
        match &self.hint {
            Some(hint) => format!("{} ({})", self.label, hint),
            None => self.label.clone(),
        }
    }
}

/// The user-facing side of one run.
pub trait Session {
    /// Start a spinner for a long-running step.
    fn spinner_start(&mut self, label: &str);

    /// Replace the running spinner's label.
    fn spinner_message(&mut self, label: &str);

    /// Stop the spinner, leaving `label` as the step's final line.
    fn spinner_stop(&mut self, label: &str);

    /// Non-blocking informational box.
    fn note(&mut self, text: &str, title: &str);

    fn confirm(&mut self, prompt: &str) -> Result<Answer<bool>, SessionError>;

    /// Pick one option; returns its index.
    fn select(
        &mut self,
        prompt: &str,
        options: &[SelectOption],
    ) -> Result<Answer<usize>, SessionError>;

    /// Pick any number of options; returns their indices in display order.
    fn multiselect(
        &mut self,
        prompt: &str,
        options: &[SelectOption],
    ) -> Result<Answer<Vec<usize>>, SessionError>;

    /// Early, non-error end of the run.
    fn done(&mut self, message: &str);

    /// Successful end of the run.
    fn complete(&mut self, message: &str);
}
