//! The built-in tool set.

use crate::files::{create_file, delete_file, edit_file, list_files, read_file, rename_file};
use crate::folders::{create_folder, delete_folder, rename_folder};
use crate::terminal::terminal_run;
use crate::{Registry, Result, ToolSpec};
use serde_json::{Value, json};

/// Build a registry holding every built-in tool, in presentation order.
pub fn builtin() -> Result<Registry> {
    Registry::new()
        .with_tool(
            ToolSpec::new(
                "read_file",
                "Read the contents of a given relative file path. Use this when you want to see \
                 what's inside a file. Do not use this with directory names.",
                object(
                    json!({ "path": string("The relative path of a file in the working directory.") }),
                    &["path"],
                ),
            ),
            read_file,
        )?
        .with_tool(
            ToolSpec::new(
                "list_files",
                "List files and directories at a given path. If no path is provided, lists files \
                 in the current directory.",
                object(
                    json!({ "path": string("Optional relative path to list files from. Defaults to current directory if not provided.") }),
                    &[],
                ),
            ),
            list_files,
        )?
        .with_tool(
            ToolSpec::new(
                "edit_file",
                "Make edits to a text file.\n\nReplaces 'old_str' with 'new_str' in the given \
                 file. 'old_str' and 'new_str' MUST be different from each other.\n\nIf the file \
                 specified with path doesn't exist, it will be created.",
                object(
                    json!({
                        "path": string("The path to the file"),
                        "old_str": string("Text to search for - must match exactly"),
                        "new_str": string("Text to replace old_str with"),
                    }),
                    &["path", "old_str", "new_str"],
                ),
            ),
            edit_file,
        )?
        .with_tool(
            ToolSpec::new(
                "create_file",
                "Create a new file with specified content. If the file already exists, it will \
                 be overwritten.",
                object(
                    json!({
                        "path": string("The path where the file should be created"),
                        "content": string("The content to write to the file"),
                    }),
                    &["path", "content"],
                ),
            ),
            create_file,
        )?
        .with_tool(
            ToolSpec::new(
                "delete_file",
                "Delete an existing file. Use with caution as this action cannot be undone.",
                object(
                    json!({ "path": string("The path of the file to delete") }),
                    &["path"],
                ),
            ),
            delete_file,
        )?
        .with_tool(
            ToolSpec::new(
                "rename_file",
                "Rename or move a file from one location to another.",
                object(
                    json!({
                        "old_path": string("The current path of the file"),
                        "new_path": string("The new path for the file"),
                    }),
                    &["old_path", "new_path"],
                ),
            ),
            rename_file,
        )?
        .with_tool(
            ToolSpec::new(
                "create_folder",
                "Create a new directory/folder. Creates parent directories if they don't exist.",
                object(
                    json!({ "path": string("The path of the directory to create") }),
                    &["path"],
                ),
            ),
            create_folder,
        )?
        .with_tool(
            ToolSpec::new(
                "delete_folder",
                "Delete a directory/folder and all its contents. Use with extreme caution as this \
                 action cannot be undone.",
                object(
                    json!({ "path": string("The path of the directory to delete") }),
                    &["path"],
                ),
            ),
            delete_folder,
        )?
        .with_tool(
            ToolSpec::new(
                "rename_folder",
                "Rename or move a directory from one location to another.",
                object(
                    json!({
                        "old_path": string("The current path of the directory"),
                        "new_path": string("The new path for the directory"),
                    }),
                    &["old_path", "new_path"],
                ),
            ),
            rename_folder,
        )?
        .with_tool(
            ToolSpec::new(
                "terminal_run",
                "Execute a terminal/command line command and return its output. Use with caution \
                 as this can execute any system command.",
                object(
                    json!({
                        "command": string("The command to execute in the terminal"),
                        "timeout": {
                            "type": "integer",
                            "description": "Timeout in seconds (default: 30)",
                        },
                    }),
                    &["command"],
                ),
            ),
            terminal_run,
        )
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Handler;

    #[test]
    fn builtin_tools_in_order() {
        let registry = builtin().unwrap();
        let names: Vec<_> = registry.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "read_file",
                "list_files",
                "edit_file",
                "create_file",
                "delete_file",
                "rename_file",
                "create_folder",
                "delete_folder",
                "rename_folder",
                "terminal_run",
            ]
        );
    }

    #[test]
    fn schemas_list_required_fields() {
        let registry = builtin().unwrap();
        let spec = |name: &str| {
            registry
                .specs()
                .iter()
                .find(|s| s.name == name)
                .cloned()
                .unwrap()
        };

        assert_eq!(spec("list_files").input_schema["required"], json!([]));
        assert_eq!(
            spec("edit_file").input_schema["required"],
            json!(["path", "old_str", "new_str"])
        );
        assert_eq!(
            spec("terminal_run").input_schema["properties"]["timeout"]["type"],
            "integer"
        );
    }

    #[tokio::test]
    async fn builtin_handlers_are_wired() {
        let registry = builtin().unwrap();
        let read_file = registry.lookup("read_file").unwrap();
        let err = read_file.invoke(b"{}").await.unwrap_err();
        assert!(err.to_string().starts_with("invalid input"));
    }
}
