//! Terminal rendering of the chat loop.

use runtime::{Error, Observer, ToolCall};
use std::io::Write;

const BLUE: &str = "\u{1b}[94m";
const YELLOW: &str = "\u{1b}[93m";
const GREEN: &str = "\u{1b}[92m";
const RED: &str = "\u{1b}[91m";
const RESET: &str = "\u{1b}[0m";

/// Writes prompts, replies, and tool traces with coloured role labels.
///
/// Write failures are ignored: a closed stdout must not stop the loop from
/// reaching end of input.
pub struct Console<W> {
    out: W,
    assistant_label: String,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, assistant_label: impl Into<String>) -> Self {
        Self {
            out,
            assistant_label: assistant_label.into(),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Observer for Console<W> {
    fn prompt(&mut self) {
        let _ = write!(self.out, "{BLUE}You{RESET}: ");
        let _ = self.out.flush();
    }

    fn assistant(&mut self, text: &str) {
        let _ = writeln!(self.out, "{YELLOW}{}{RESET}: {text}", self.assistant_label);
    }

    fn tool_call(&mut self, call: &ToolCall) {
        let _ = writeln!(self.out, "{GREEN}tool{RESET}: {}({})", call.name, call.arguments);
    }

    fn error(&mut self, error: &Error) {
        let _ = writeln!(self.out, "{RED}Error{RESET}: {error}");
    }
}
