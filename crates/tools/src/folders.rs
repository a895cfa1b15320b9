//! Directory tools.

use crate::files::{RenameArgs, exists, move_path};
use crate::handler::{decode, require};
use crate::{Result, ToolError};
use serde::Deserialize;
use tokio::fs;

#[derive(Debug, Deserialize)]
struct FolderArgs {
    path: String,
}

/// `create_folder`: create a directory tree. Existing directories are fine.
pub async fn create_folder(arguments: Vec<u8>) -> Result<String> {
    let args: FolderArgs = decode(&arguments)?;
    require("path", &args.path)?;

    fs::create_dir_all(&args.path)
        .await
        .map_err(|e| ToolError::io("failed to create directory", e))?;

    Ok(format!("Successfully created directory {}", args.path))
}

/// `delete_folder`: recursively remove a directory tree.
pub async fn delete_folder(arguments: Vec<u8>) -> Result<String> {
    let args: FolderArgs = decode(&arguments)?;
    require("path", &args.path)?;

    if !exists(&args.path).await? {
        return Err(ToolError::not_found("directory", args.path));
    }
    fs::remove_dir_all(&args.path)
        .await
        .map_err(|e| ToolError::io("failed to delete directory", e))?;

    Ok(format!("Successfully deleted directory {}", args.path))
}

/// `rename_folder`: move a directory tree.
pub async fn rename_folder(arguments: Vec<u8>) -> Result<String> {
    let args: RenameArgs = decode(&arguments)?;
    move_path(&args, "source directory").await?;
    Ok(format!(
        "Successfully renamed directory {} to {}",
        args.old_path, args.new_path
    ))
}
