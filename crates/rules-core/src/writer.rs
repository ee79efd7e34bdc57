//! Destination-file conflict handling.
//!
//! The writer never picks a policy. When the destination already has content
//! the caller-supplied decision function is consulted, and the chosen action is
//! carried out through an atomic temp-file-then-rename write.

use crate::error::Result;
use crate::io;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Line placed between existing content and a merged document.
pub const MERGE_SEPARATOR: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDecision {
    Overwrite,
    Merge,
    Abort,
}

impl WriteDecision {
    pub fn all() -> &'static [WriteDecision] {
        &[
            WriteDecision::Overwrite,
            WriteDecision::Merge,
            WriteDecision::Abort,
        ]
    }

    pub fn describe(self) -> &'static str {
        match self {
            WriteDecision::Overwrite => "Overwrite the existing file",
            WriteDecision::Merge => "Merge: append below a --- separator",
            WriteDecision::Abort => "Abort: leave the file untouched",
        }
    }
}

impl std::str::FromStr for WriteDecision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(WriteDecision::Overwrite),
            "merge" => Ok(WriteDecision::Merge),
            "abort" => Ok(WriteDecision::Abort),
            other => Err(format!("expected overwrite, merge, or abort, got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Created,
    Overwritten,
    Merged,
    Aborted,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WriteOutcome::Created => "created",
            WriteOutcome::Overwritten => "overwritten",
            WriteOutcome::Merged => "merged",
            WriteOutcome::Aborted => "aborted",
        })
    }
}

/// `existing`, then a separator line, then `new`. Existing bytes are kept verbatim.
pub fn merged(existing: &[u8], new: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(existing.len() + new.len() + MERGE_SEPARATOR.len() + 2);
    out.extend_from_slice(existing);
    if !existing.is_empty() && !existing.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(MERGE_SEPARATOR.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(new);
    out
}

/// Write `data` to `path`, asking `decide` only when `path` already exists.
pub fn write<F>(path: &Path, data: &[u8], decide: F) -> Result<WriteOutcome>
where
    F: FnOnce(&Path) -> Result<WriteDecision>,
{
    let Some(existing) = io::read_if_exists(path)? else {
        io::atomic_write(path, data)?;
        return Ok(WriteOutcome::Created);
    };

    match decide(path)? {
        WriteDecision::Overwrite => {
            io::atomic_write(path, data)?;
            Ok(WriteOutcome::Overwritten)
        }
        WriteDecision::Merge => {
            io::atomic_write(path, &merged(&existing, data))?;
            Ok(WriteOutcome::Merged)
        }
        WriteDecision::Abort => Ok(WriteOutcome::Aborted),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RulesError;
    use tempfile::TempDir;

    fn never(_: &Path) -> Result<WriteDecision> {
        panic!("decision requested for a new file")
    }

    #[test]
    fn creates_missing_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cursor/rules/team-rules.mdc");
        let outcome = write(&path, b"# Team Rules\n", never).unwrap();
        assert_eq!(outcome, WriteOutcome::Created);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Team Rules\n");
    }

    #[test]
    fn merge_appends_below_separator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CLAUDE.md");
        std::fs::write(&path, "OLD").unwrap();
        let outcome = write(&path, b"# Rules\n", |_| Ok(WriteDecision::Merge)).unwrap();
        assert_eq!(outcome, WriteOutcome::Merged);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "OLD\n---\n# Rules\n");
    }

    #[test]
    fn merge_does_not_double_newline() {
        assert_eq!(merged(b"OLD\n", b"NEW"), b"OLD\n---\nNEW");
        assert_eq!(merged(b"", b"NEW"), b"---\nNEW");
    }

    #[test]
    fn overwrite_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AGENTS.md");
        std::fs::write(&path, "old old old").unwrap();
        let outcome = write(&path, b"new", |_| Ok(WriteDecision::Overwrite)).unwrap();
        assert_eq!(outcome, WriteOutcome::Overwritten);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn abort_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GEMINI.md");
        std::fs::write(&path, "keep me").unwrap();
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();
        let outcome = write(&path, b"new", |_| Ok(WriteDecision::Abort)).unwrap();
        assert_eq!(outcome, WriteOutcome::Aborted);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn decision_errors_propagate_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.md");
        std::fs::write(&path, "x").unwrap();
        let err = write(&path, b"y", |_| Err(RulesError::Prompt("closed".into()))).unwrap_err();
        assert!(matches!(err, RulesError::Prompt(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn decision_parses() {
        assert_eq!("Merge".parse::<WriteDecision>(), Ok(WriteDecision::Merge));
        assert!("append".parse::<WriteDecision>().is_err());
    }
}
