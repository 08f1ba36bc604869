//! Confined file operations.
//!
//! Every operation validates its path first and refuses anything that
//! resolves outside the sandbox root; no filesystem call is ever attempted
//! on a rejected path.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde_json::{Value, json};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use tool_sandbox::PathValidator;

use crate::clock::TIMESTAMP_FORMAT;
use crate::error::BuiltinError;

/// Per-file cap on reported matching lines during a search.
const MAX_MATCHES_PER_FILE: usize = 10;

/// File operations confined to a validator's root.
#[derive(Debug, Clone)]
pub struct FileTools {
    validator: PathValidator,
}

impl FileTools {
    /// Creates file tools confined to the validator's root.
    #[must_use]
    pub fn new(validator: PathValidator) -> Self {
        Self { validator }
    }

    /// Returns the validator used for confinement.
    #[must_use]
    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    fn resolve(&self, requested: &str) -> Result<PathBuf, BuiltinError> {
        let decision = self.validator.validate(requested);
        if decision.is_within_bounds() {
            Ok(decision.resolved().to_path_buf())
        } else {
            Err(BuiltinError::PathOutOfBounds {
                path: requested.into(),
            })
        }
    }

    /// Creates (or overwrites) a file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns [`BuiltinError::PathOutOfBounds`] for escaping paths and
    /// [`BuiltinError::Io`] for filesystem failures.
    pub async fn create_file(&self, path: &str, content: &str) -> Result<Value, BuiltinError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&resolved, content).await?;
        debug!(path = %resolved.display(), bytes = content.len(), "file created");

        Ok(json!({
            "path": resolved.display().to_string(),
            "bytes_written": content.len(),
        }))
    }

    /// Reads a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`BuiltinError::PathOutOfBounds`], [`BuiltinError::NotFound`],
    /// or [`BuiltinError::Io`].
    pub async fn read_file(&self, path: &str) -> Result<Value, BuiltinError> {
        let resolved = self.resolve(path)?;
        if !fs::try_exists(&resolved).await? {
            return Err(BuiltinError::NotFound { path: path.into() });
        }

        let content = fs::read_to_string(&resolved).await?;
        let metadata = fs::metadata(&resolved).await?;

        Ok(json!({
            "path": resolved.display().to_string(),
            "content": content,
            "size": metadata.len(),
            "last_modified": format_modified(metadata.modified().ok()),
        }))
    }

    /// Lists a directory, directories first, then files, each sorted by
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`BuiltinError::PathOutOfBounds`], [`BuiltinError::NotFound`],
    /// [`BuiltinError::NotADirectory`], or [`BuiltinError::Io`].
    pub async fn list_directory(&self, path: &str) -> Result<Value, BuiltinError> {
        let resolved = self.resolve(path)?;
        if !fs::try_exists(&resolved).await? {
            return Err(BuiltinError::NotFound { path: path.into() });
        }
        if !fs::metadata(&resolved).await?.is_dir() {
            return Err(BuiltinError::NotADirectory { path: path.into() });
        }

        let mut entries = Vec::new();
        let mut reader = fs::read_dir(&resolved).await?;
        while let Some(entry) = reader.next_entry().await? {
            let metadata = entry.metadata().await?;
            let kind = if metadata.is_dir() { "directory" } else { "file" };
            entries.push((
                kind,
                entry.file_name().to_string_lossy().into_owned(),
                metadata.is_file().then(|| metadata.len()),
            ));
        }

        entries.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        let total = entries.len();
        let items: Vec<Value> = entries
            .into_iter()
            .map(|(kind, name, size)| {
                json!({
                    "name": name,
                    "kind": kind,
                    "size": size,
                })
            })
            .collect();

        Ok(json!({
            "directory": resolved.display().to_string(),
            "items": items,
            "total_items": total,
        }))
    }

    /// Searches files under a directory for a case-insensitive substring,
    /// optionally filtered by file extension. Unreadable and non-UTF-8 files
    /// are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns [`BuiltinError::PathOutOfBounds`], [`BuiltinError::NotFound`],
    /// [`BuiltinError::NotADirectory`], or [`BuiltinError::Io`] from the
    /// directory walk.
    pub async fn search_files(
        &self,
        directory: &str,
        pattern: &str,
        extension: Option<&str>,
    ) -> Result<Value, BuiltinError> {
        let root = self.resolve(directory)?;
        if !fs::try_exists(&root).await? {
            return Err(BuiltinError::NotFound {
                path: directory.into(),
            });
        }
        if !fs::metadata(&root).await?.is_dir() {
            return Err(BuiltinError::NotADirectory {
                path: directory.into(),
            });
        }

        let needle = pattern.to_lowercase();
        let mut matches = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut reader = fs::read_dir(&dir).await?;
            while let Some(entry) = reader.next_entry().await? {
                let path = entry.path();
                let metadata = entry.metadata().await?;

                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }

                if let Some(ext) = extension {
                    let wanted = ext.trim_start_matches('.');
                    let has_ext = path
                        .extension()
                        .is_some_and(|found| found.eq_ignore_ascii_case(wanted));
                    if !has_ext {
                        continue;
                    }
                }

                let Ok(content) = fs::read_to_string(&path).await else {
                    continue;
                };

                let matching_lines = matching_lines(&content, &needle);
                if !matching_lines.is_empty() {
                    let relative = path
                        .strip_prefix(&root)
                        .unwrap_or(&path)
                        .display()
                        .to_string();
                    matches.push(json!({
                        "file": relative,
                        "matching_lines": matching_lines,
                    }));
                }
            }
        }

        Ok(json!({
            "directory": root.display().to_string(),
            "pattern": pattern,
            "matches": matches,
            "total_files_with_matches": matches.len(),
        }))
    }

    /// Creates a uniquely named scratch file inside the sandbox root.
    ///
    /// Unlike a system temp directory, the file stays confined to the root
    /// so it remains reachable by the other file tools. The suffix is
    /// caller-controlled, so the generated name goes through the validator
    /// like any other path.
    ///
    /// # Errors
    ///
    /// Returns [`BuiltinError::PathOutOfBounds`] when the suffix escapes the
    /// root and [`BuiltinError::Io`] for filesystem failures.
    pub async fn create_temp_file(
        &self,
        content: &str,
        suffix: &str,
    ) -> Result<Value, BuiltinError> {
        let name = format!("tmp-{}{suffix}", Uuid::new_v4());
        let resolved = self.resolve(&name)?;
        fs::write(&resolved, content).await?;

        Ok(json!({
            "path": resolved.display().to_string(),
            "bytes_written": content.len(),
        }))
    }
}

fn matching_lines(content: &str, needle: &str) -> Vec<Value> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(needle))
        .take(MAX_MATCHES_PER_FILE)
        .map(|(index, line)| {
            json!({
                "line_number": index + 1,
                "content": line.trim(),
            })
        })
        .collect()
}

fn format_modified(modified: Option<SystemTime>) -> Option<String> {
    modified.map(|time| {
        DateTime::<Local>::from(time)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn tools() -> (TempDir, FileTools) {
        let dir = TempDir::new().unwrap();
        let validator = PathValidator::new(dir.path()).unwrap();
        (dir, FileTools::new(validator))
    }

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let (_dir, tools) = tools();
        tools
            .create_file("notes/today.txt", "remember the milk")
            .await
            .unwrap();

        let read = tools.read_file("notes/today.txt").await.unwrap();
        assert_eq!(read["content"], "remember the milk");
        assert_eq!(read["size"], 17);
        assert!(read["last_modified"].is_string());
    }

    #[tokio::test]
    async fn escaping_paths_never_reach_the_filesystem() {
        let (_dir, tools) = tools();
        let err = tools
            .create_file("../../tmp/escape.txt", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, BuiltinError::PathOutOfBounds { .. }));

        let err = tools.read_file("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, BuiltinError::PathOutOfBounds { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, tools) = tools();
        let err = tools.read_file("absent.txt").await.unwrap_err();
        assert!(matches!(err, BuiltinError::NotFound { .. }));
    }

    #[tokio::test]
    async fn listing_sorts_directories_first() {
        let (_dir, tools) = tools();
        tools.create_file("zebra.txt", "z").await.unwrap();
        tools.create_file("aardvark/nested.txt", "a").await.unwrap();

        let listing = tools.list_directory(".").await.unwrap();
        let items = listing["items"].as_array().unwrap();
        assert_eq!(listing["total_items"], 2);
        assert_eq!(items[0]["name"], "aardvark");
        assert_eq!(items[0]["kind"], "directory");
        assert_eq!(items[1]["name"], "zebra.txt");
        assert_eq!(items[1]["size"], 1);
    }

    #[tokio::test]
    async fn listing_a_file_is_not_a_directory() {
        let (_dir, tools) = tools();
        tools.create_file("plain.txt", "x").await.unwrap();
        let err = tools.list_directory("plain.txt").await.unwrap_err();
        assert!(matches!(err, BuiltinError::NotADirectory { .. }));
    }

    #[tokio::test]
    async fn search_finds_lines_recursively_and_respects_extension() {
        let (_dir, tools) = tools();
        tools
            .create_file("src/main.rs", "fn main() {\n    // TODO: wire up\n}\n")
            .await
            .unwrap();
        tools
            .create_file("docs/notes.md", "TODO: write docs\n")
            .await
            .unwrap();

        let all = tools.search_files(".", "todo", None).await.unwrap();
        assert_eq!(all["total_files_with_matches"], 2);

        let rust_only = tools.search_files(".", "todo", Some(".rs")).await.unwrap();
        assert_eq!(rust_only["total_files_with_matches"], 1);
        let matches = rust_only["matches"].as_array().unwrap();
        assert_eq!(matches[0]["matching_lines"][0]["line_number"], 2);
    }

    #[tokio::test]
    async fn temp_files_stay_inside_the_root() {
        let (_dir, tools) = tools();
        let created = tools.create_temp_file("scratch", ".txt").await.unwrap();
        let path = created["path"].as_str().unwrap();
        assert!(Path::new(path).starts_with(tools.validator().root()));
        assert!(path.ends_with(".txt"));
    }

    #[tokio::test]
    async fn temp_file_suffix_cannot_escape_the_root() {
        let (_dir, tools) = tools();
        let err = tools
            .create_temp_file("x", "/../../../../escape.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, BuiltinError::PathOutOfBounds { .. }));
    }
}
