//! Append-only conversation transcript.

use crate::llm::{ToolCall, Turn};
use crate::{Error, Result};
use std::collections::HashSet;

/// The ordered list of turns exchanged with the model.
///
/// Turns are only ever appended. Every tool call of an assistant turn must be
/// answered by exactly one tool-result turn before any user or assistant turn
/// may follow; [`Conversation::push`] enforces this.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, rejecting it if it would break result correlation.
    pub fn push(&mut self, turn: Turn) -> Result<()> {
        match &turn {
            Turn::ToolResult { tool_call_id, .. } => {
                if !self.pending_calls().iter().any(|c| &c.id == tool_call_id) {
                    return Err(Error::InvalidState(format!(
                        "no pending tool call with id {tool_call_id}"
                    )));
                }
            }
            Turn::User { .. } | Turn::Assistant { .. } => {
                let pending = self.pending_calls().len();
                if pending > 0 {
                    return Err(Error::InvalidState(format!(
                        "{pending} tool call(s) still awaiting results"
                    )));
                }
            }
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Calls from the latest assistant turn that have no result yet, in the
    /// order the model emitted them.
    pub fn pending_calls(&self) -> Vec<&ToolCall> {
        let Some(pos) = self
            .turns
            .iter()
            .rposition(|t| matches!(t, Turn::Assistant { .. }))
        else {
            return Vec::new();
        };

        let answered: HashSet<&str> = self.turns[pos + 1..]
            .iter()
            .filter_map(|t| match t {
                Turn::ToolResult { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();

        self.turns[pos]
            .tool_calls()
            .iter()
            .filter(|c| !answered.contains(c.id.as_str()))
            .collect()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
