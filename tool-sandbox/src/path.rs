//! Path confinement against a configured root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors surfaced while constructing a validator.
#[derive(Debug, Error)]
pub enum PathError {
    /// The allowed root could not be canonicalized.
    #[error("allowed root `{path}` is not usable: {source}")]
    Root {
        /// The configured root path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Outcome of validating one requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDecision {
    resolved: PathBuf,
    within_bounds: bool,
}

impl PathDecision {
    /// Returns the resolved absolute path.
    #[must_use]
    pub fn resolved(&self) -> &Path {
        &self.resolved
    }

    /// Returns `true` when the resolved path is the root or a descendant.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.within_bounds
    }
}

/// Confines caller-supplied paths to a single allowed root.
///
/// Validation never errors and performs no I/O beyond path resolution:
/// existing prefixes are canonicalized (so a symlink escaping the root fails
/// containment), while non-existent remainders are normalized lexically.
/// Callers decide whether non-existence itself is an error.
#[derive(Debug, Clone)]
pub struct PathValidator {
    root: PathBuf,
}

impl PathValidator {
    /// Creates a validator rooted at the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Root`] when the root does not exist or cannot be
    /// canonicalized; a misconfigured root is a deployment error, not a
    /// per-request condition.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PathError> {
        let path = root.into();
        let root = fs::canonicalize(&path).map_err(|source| PathError::Root { path, source })?;
        Ok(Self { root })
    }

    /// Returns the canonical allowed root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a requested path and decides whether it stays in bounds.
    ///
    /// Relative paths are interpreted against the root. Any `..` escape,
    /// absolute path outside the root, or symlink resolving outside the root
    /// yields `within_bounds = false`.
    #[must_use]
    pub fn validate(&self, requested: impl AsRef<Path>) -> PathDecision {
        let requested = requested.as_ref();
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let normalized = lexical_normalize(&candidate);
        let resolved = resolve_existing_prefix(&normalized);
        let within_bounds = resolved.starts_with(&self.root);

        if !within_bounds {
            debug!(requested = %requested.display(), resolved = %resolved.display(),
                "path escapes the allowed root");
        }

        PathDecision {
            resolved,
            within_bounds,
        }
    }
}

/// Removes `.` components and applies `..` components lexically.
///
/// A `..` at the filesystem root is dropped, matching how the OS resolves
/// `/..`; the containment check still rejects anything that climbed out.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::RootDir.as_os_str());
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Canonicalizes the deepest existing ancestor and re-joins the remainder,
/// so symlinks in the existing portion of the path are resolved.
fn resolve_existing_prefix(normalized: &Path) -> PathBuf {
    for ancestor in normalized.ancestors() {
        if let Ok(canonical) = fs::canonicalize(ancestor) {
            let remainder = normalized
                .strip_prefix(ancestor)
                .unwrap_or_else(|_| Path::new(""));
            return canonical.join(remainder);
        }
    }
    normalized.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn validator() -> (TempDir, PathValidator) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/file.txt"), "content").unwrap();
        let validator = PathValidator::new(dir.path()).unwrap();
        (dir, validator)
    }

    #[test]
    fn relative_descendant_is_in_bounds() {
        let (_dir, validator) = validator();
        let decision = validator.validate("sub/file.txt");
        assert!(decision.is_within_bounds());
        assert!(decision.resolved().ends_with("sub/file.txt"));
    }

    #[test]
    fn parent_escape_is_out_of_bounds() {
        let (_dir, validator) = validator();
        assert!(!validator.validate("../../etc/passwd").is_within_bounds());
        assert!(!validator.validate("sub/../../outside").is_within_bounds());
    }

    #[test]
    fn dotdot_inside_the_root_is_fine() {
        let (_dir, validator) = validator();
        let decision = validator.validate("sub/../sub/file.txt");
        assert!(decision.is_within_bounds());
    }

    #[test]
    fn absolute_path_outside_root_is_rejected() {
        let (_dir, validator) = validator();
        assert!(!validator.validate("/etc/passwd").is_within_bounds());
    }

    #[test]
    fn absolute_path_inside_root_is_accepted() {
        let (_dir, validator) = validator();
        let inside = validator.root().join("sub/file.txt");
        assert!(validator.validate(&inside).is_within_bounds());
    }

    #[test]
    fn nonexistent_leaf_is_still_validated() {
        let (_dir, validator) = validator();
        let decision = validator.validate("sub/new-dir/new-file.txt");
        assert!(decision.is_within_bounds());
        assert!(!decision.resolved().exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_the_root_is_rejected() {
        let (dir, validator) = validator();
        std::os::unix::fs::symlink("/etc/passwd", dir.path().join("escape.txt")).unwrap();
        assert!(!validator.validate("escape.txt").is_within_bounds());
    }

    #[test]
    fn missing_root_is_a_construction_error() {
        let err = PathValidator::new("/definitely/not/a/real/root").unwrap_err();
        assert!(matches!(err, PathError::Root { .. }));
    }

    #[test]
    fn validation_is_idempotent() {
        let (_dir, validator) = validator();
        assert_eq!(
            validator.validate("sub/file.txt"),
            validator.validate("sub/file.txt")
        );
    }
}
