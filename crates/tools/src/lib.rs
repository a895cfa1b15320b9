//! Local-system tools for the deckhand agent.
//!
//! A [`Registry`] pairs each [`ToolSpec`] (what the model sees) with a
//! [`Handler`] (what actually runs). Handlers take the model's raw argument
//! bytes, validate them before touching anything, perform one filesystem or
//! process operation, and return a short message or a [`ToolError`].
//!
//! [`builtin`] assembles the standard set:
//!
//! | Tool | Effect |
//! |---|---|
//! | `read_file` | return file content |
//! | `list_files` | recursive listing, directories suffixed `/` |
//! | `edit_file` | replace-all, or create when `old_str` is empty |
//! | `create_file` | write, overwriting, creating parents |
//! | `delete_file` | remove an existing file |
//! | `rename_file` | move a file, creating destination parents |
//! | `create_folder` | `mkdir -p` |
//! | `delete_folder` | recursive remove |
//! | `rename_folder` | move a directory tree |
//! | `terminal_run` | shell command with timeout |

mod builtin;
mod error;
mod files;
mod folders;
mod handler;
mod registry;
mod terminal;

pub use builtin::builtin;
pub use error::{Result, ToolError};
pub use files::{create_file, delete_file, edit_file, list_files, read_file, rename_file};
pub use folders::{create_folder, delete_folder, rename_folder};
pub use handler::{Handler, HandlerFuture};
pub use registry::{Registry, ToolSpec};
pub use terminal::{DEFAULT_TIMEOUT, terminal_run};
