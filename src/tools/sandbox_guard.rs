//! Path sandboxing and the secret/test-overwrite guards the dispatcher
//! applies before any filesystem tool touches disk.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSetBuilder};

use crate::error::{Error, Result};

/// Resolve a user-supplied path against `root`, refusing anything outside
/// the workspace unless `allow_outside_root` is set.
///
/// Canonicalizes before the containment check — a `.join()` without
/// canonicalizing lets `../../etc/passwd` pass a naive `starts_with` test.
pub fn resolve_path(user_path: &str, root: &Path, allow_outside_root: bool) -> Result<PathBuf> {
    let stripped = user_path.trim().trim_start_matches('@');
    let candidate = if Path::new(stripped).is_absolute() {
        PathBuf::from(stripped)
    } else {
        root.join(stripped)
    };

    let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let canonical_candidate = canonicalize_best_effort(&candidate);

    if allow_outside_root {
        return Ok(canonical_candidate);
    }

    if canonical_candidate == canonical_root || canonical_candidate.starts_with(&canonical_root) {
        Ok(canonical_candidate)
    } else {
        Err(Error::PathEscapesRoot(user_path.to_string()))
    }
}

/// `canonicalize()` requires the path to exist; fall back to canonicalizing
/// the deepest existing ancestor and re-appending the rest, so a guard check
/// still works for a path that is about to be created (e.g. `write_file`).
fn canonicalize_best_effort(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let mut ancestor = path.to_path_buf();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = ancestor.canonicalize() {
            let mut result = canonical;
            for component in tail.into_iter().rev() {
                result.push(component);
            }
            return result;
        }
        match ancestor.file_name().map(|n| n.to_owned()) {
            Some(name) => {
                tail.push(name);
                ancestor.pop();
            }
            None => return path.to_path_buf(),
        }
    }
}

/// True if `path` matches one of `secret_globs` and should be refused unless
/// `allow_read_secrets`.
pub fn is_secret_path(path: &Path, secret_globs: &[String]) -> bool {
    let mut builder = GlobSetBuilder::new();
    for pattern in secret_globs {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    match builder.build() {
        Ok(set) => set.is_match(path),
        Err(_) => false,
    }
}

const OVERWRITE_VERBS: &[&str] = &["overwrite", "replace", "rewrite", "regenerate", "recreate", "reset"];
const WRITE_VERBS: &[&str] = &["write", "add", "update", "create", "implement", "generate"];

/// True if `path` looks like a test file (`test_*.py`, `*_test.py`, or any
/// path under a `tests/`/`test/` directory).
pub fn looks_like_test_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.starts_with("test_") || name.ends_with("_test.py") {
        return true;
    }
    path.components().any(|c| {
        let s = c.as_os_str().to_str().unwrap_or("");
        s == "tests" || s == "test"
    })
}

/// Refuse an overwrite of an existing test file unless the human message
/// explicitly names the file (or "test") together with an overwrite or
/// write verb.
pub fn test_overwrite_allowed(path: &Path, path_exists: bool, human_message: &str) -> bool {
    if !path_exists || !looks_like_test_file(path) {
        return true;
    }
    let lowered = human_message.to_lowercase();
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let references_file = lowered.contains(&name.to_lowercase()) || lowered.contains("test");
    let has_verb = OVERWRITE_VERBS.iter().any(|v| lowered.contains(v)) || WRITE_VERBS.iter().any(|v| lowered.contains(v));
    references_file && has_verb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_path_rejects_escape() {
        let dir = tempdir().unwrap();
        let err = resolve_path("../../etc/passwd", dir.path(), false);
        assert!(err.is_err());
    }

    #[test]
    fn test_resolve_path_allows_descendant() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();
        let resolved = resolve_path("a.txt", dir.path(), false).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn test_resolve_path_allows_escape_when_flagged() {
        let dir = tempdir().unwrap();
        let resolved = resolve_path("/etc/hostname", dir.path(), true);
        assert!(resolved.is_ok());
    }

    #[test]
    fn test_secret_glob_matches_env_file() {
        let globs = vec!["*.env".to_string(), "**/*.pem".to_string()];
        assert!(is_secret_path(Path::new(".env"), &globs));
        assert!(is_secret_path(Path::new("certs/server.pem"), &globs));
        assert!(!is_secret_path(Path::new("main.rs"), &globs));
    }

    #[test]
    fn test_overwrite_guard_blocks_bare_write() {
        let path = Path::new("tests/test_foo.py");
        assert!(!test_overwrite_allowed(path, true, "please fix the bug in main.py"));
    }

    #[test]
    fn test_overwrite_guard_allows_explicit_request() {
        let path = Path::new("tests/test_foo.py");
        assert!(test_overwrite_allowed(path, true, "please regenerate test_foo.py with new fixtures"));
    }

    #[test]
    fn test_overwrite_guard_ignores_new_files() {
        let path = Path::new("tests/test_new.py");
        assert!(test_overwrite_allowed(path, false, "anything goes"));
    }
}
