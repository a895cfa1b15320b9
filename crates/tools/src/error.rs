//! Tool error types.

use thiserror::Error;

/// Errors that can occur while dispatching or executing a tool.
///
/// Every variant is recoverable from the dispatch loop's point of view: its
/// display text becomes the content of the tool-result turn the model sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// No handler is registered under the requested name.
    #[error("tool not found")]
    UnknownTool(String),

    /// A tool with this name is already registered.
    #[error("tool already registered: {0}")]
    Duplicate(String),

    /// Arguments failed to decode or violated a constraint. No I/O was done.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The target path must exist but does not.
    #[error("{what} does not exist: {path}")]
    NotFound { what: &'static str, path: String },

    /// `edit_file` was asked to replace text that is not in the file.
    #[error("old_str not found in file")]
    NoMatch,

    /// The underlying OS operation failed.
    #[error("{0}")]
    Io(String),

    /// A command exceeded its time bound and was killed.
    #[error("command timed out after {0}s")]
    Timeout(u64),
}

impl ToolError {
    /// Wrap an I/O error with a short description of what was attempted.
    pub fn io(context: &str, err: std::io::Error) -> Self {
        Self::Io(format!("{context}: {err}"))
    }

    pub(crate) fn not_found(what: &'static str, path: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_message_is_fixed() {
        assert_eq!(
            ToolError::UnknownTool("frobnicate".into()).to_string(),
            "tool not found"
        );
    }

    #[test]
    fn not_found_names_the_path() {
        let err = ToolError::not_found("source file", "a/b.txt");
        assert_eq!(err.to_string(), "source file does not exist: a/b.txt");
    }

    #[test]
    fn io_keeps_context() {
        let err = ToolError::io(
            "failed to delete file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to delete file: denied");
    }
}
