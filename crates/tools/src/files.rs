//! File tools: read, list, edit, create, delete, rename.

use crate::handler::{decode, require};
use crate::{Result, ToolError};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ListFilesArgs {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditFileArgs {
    path: String,
    old_str: String,
    new_str: String,
}

#[derive(Debug, Deserialize)]
struct CreateFileArgs {
    path: String,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenameArgs {
    pub old_path: String,
    pub new_path: String,
}

/// `read_file`: return the file's contents.
pub async fn read_file(arguments: Vec<u8>) -> Result<String> {
    let args: PathArgs = decode(&arguments)?;
    require("path", &args.path)?;

    match fs::read(&args.path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ToolError::not_found("file", args.path)),
        Err(e) => Err(ToolError::io("failed to read file", e)),
    }
}

/// `list_files`: recursively list a directory as a JSON array of relative
/// paths, directories suffixed with `/`.
pub async fn list_files(arguments: Vec<u8>) -> Result<String> {
    let args: ListFilesArgs = decode(&arguments)?;
    let dir = args
        .path
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string());

    let files = tokio::task::spawn_blocking(move || walk(&dir))
        .await
        .map_err(|e| ToolError::Io(format!("directory walk failed: {e}")))??;

    serde_json::to_string(&files).map_err(|e| ToolError::Io(e.to_string()))
}

/// Depth-first walk, entries sorted by name within each directory.
fn walk(dir: &str) -> Result<Vec<String>> {
    let root = Path::new(dir);
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| match e.io_error().map(|io| io.kind()) {
            Some(ErrorKind::NotFound) => ToolError::not_found("directory", dir),
            _ => ToolError::Io(format!("failed to list {dir}: {e}")),
        })?;

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ToolError::Io(e.to_string()))?;
        let mut relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            relative.push('/');
        }
        files.push(relative);
    }

    Ok(files)
}

/// `edit_file`: replace every occurrence of `old_str` with `new_str`.
///
/// An absent file with an empty `old_str` is created holding `new_str`.
pub async fn edit_file(arguments: Vec<u8>) -> Result<String> {
    let args: EditFileArgs = decode(&arguments)?;
    if args.path.is_empty() || args.old_str == args.new_str {
        return Err(ToolError::InvalidInput(
            "path cannot be empty and old_str must differ from new_str".into(),
        ));
    }

    let content = match fs::read(&args.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if args.old_str.is_empty() {
                return write_new_file(&args.path, &args.new_str).await;
            }
            return Err(ToolError::not_found("file", args.path));
        }
        Err(e) => return Err(ToolError::io("failed to read file", e)),
    };

    if args.old_str.is_empty() {
        return Err(ToolError::InvalidInput(
            "old_str cannot be empty when the file already exists".into(),
        ));
    }
    let updated = replace_all(&content, args.old_str.as_bytes(), args.new_str.as_bytes())
        .ok_or(ToolError::NoMatch)?;
    fs::write(&args.path, updated)
        .await
        .map_err(|e| ToolError::io("failed to write file", e))?;

    Ok("OK".to_string())
}

/// Replace every occurrence of a non-empty `needle`, leaving all other bytes
/// untouched. `None` when there is no occurrence.
fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    let mut replaced = false;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(replacement);
        rest = &rest[pos + needle.len()..];
        replaced = true;
    }
    if !replaced {
        return None;
    }
    out.extend_from_slice(rest);
    Some(out)
}

/// `create_file`: write content, overwriting any existing file.
pub async fn create_file(arguments: Vec<u8>) -> Result<String> {
    let args: CreateFileArgs = decode(&arguments)?;
    require("path", &args.path)?;
    write_new_file(&args.path, &args.content).await
}

async fn write_new_file(path: &str, content: &str) -> Result<String> {
    create_parent_dirs(path).await?;
    fs::write(path, content)
        .await
        .map_err(|e| ToolError::io("failed to create file", e))?;
    Ok(format!("Successfully created file {path}"))
}

/// Create the parent directories of `path`, if it has any.
pub(crate) async fn create_parent_dirs(path: &str) -> Result<()> {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::io("failed to create directory", e)),
        _ => Ok(()),
    }
}

pub(crate) async fn exists(path: &str) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| ToolError::io(&format!("failed to stat {path}"), e))
}

/// `delete_file`: remove an existing file.
pub async fn delete_file(arguments: Vec<u8>) -> Result<String> {
    let args: PathArgs = decode(&arguments)?;
    require("path", &args.path)?;

    if !exists(&args.path).await? {
        return Err(ToolError::not_found("file", args.path));
    }
    fs::remove_file(&args.path)
        .await
        .map_err(|e| ToolError::io("failed to delete file", e))?;

    Ok(format!("Successfully deleted file {}", args.path))
}

/// `rename_file`: move a file, creating the destination's parent directories.
pub async fn rename_file(arguments: Vec<u8>) -> Result<String> {
    let args: RenameArgs = decode(&arguments)?;
    move_path(&args, "source file").await?;
    Ok(format!(
        "Successfully renamed {} to {}",
        args.old_path, args.new_path
    ))
}

/// Shared by the file and folder renames. The source is checked before
/// anything is created at the destination.
pub(crate) async fn move_path(args: &RenameArgs, what: &'static str) -> Result<()> {
    if args.old_path.is_empty() || args.new_path.is_empty() {
        return Err(ToolError::InvalidInput(
            "both old_path and new_path must be provided".into(),
        ));
    }
    if !exists(&args.old_path).await? {
        return Err(ToolError::not_found(what, args.old_path.clone()));
    }

    create_parent_dirs(&args.new_path).await?;
    fs::rename(&args.old_path, &args.new_path)
        .await
        .map_err(|e| ToolError::io("failed to rename", e))
}
