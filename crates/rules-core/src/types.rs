use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// User-wide rules, shared by every project.
    Global,
    /// Project rules committed for the whole team.
    Team,
    /// Project-local personal rules, usually git-ignored.
    Dev,
}

impl Scope {
    pub fn all() -> &'static [Scope] {
        &[Scope::Global, Scope::Team, Scope::Dev]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Team => "team",
            Scope::Dev => "dev",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Scope::Global => "global (user-wide, every project)",
            Scope::Team => "team (project-shared, committed)",
            Scope::Dev => "dev (project-local, personal)",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = crate::error::RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Scope::Global),
            "team" => Ok(Scope::Team),
            "dev" => Ok(Scope::Dev),
            _ => Err(crate::error::RulesError::InvalidScope(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A named section of a generated rules document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    ProjectStack,
    CorePrinciples,
    Communication,
    Workflow,
    TaskManagement,
    CodeQuality,
    Testing,
    Git,
    Documentation,
    LocalEnvironment,
    Skills,
}

impl Block {
    pub fn heading(self) -> &'static str {
        match self {
            Block::ProjectStack => "Project Stack",
            Block::CorePrinciples => "Core Principles",
            Block::Communication => "Communication",
            Block::Workflow => "Workflow",
            Block::TaskManagement => "Task Management",
            Block::CodeQuality => "Code Quality",
            Block::Testing => "Testing",
            Block::Git => "Git",
            Block::Documentation => "Documentation",
            Block::LocalEnvironment => "Local Environment",
            Block::Skills => "Skills",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

// ---------------------------------------------------------------------------
// SizeLimit / FormatKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "max", rename_all = "snake_case")]
pub enum SizeLimit {
    Chars(usize),
    Lines(usize),
}

impl SizeLimit {
    pub fn max(self) -> usize {
        match self {
            SizeLimit::Chars(n) | SizeLimit::Lines(n) => n,
        }
    }

    /// Size of `text` in this limit's unit.
    pub fn measure(self, text: &str) -> usize {
        match self {
            SizeLimit::Chars(_) => text.chars().count(),
            SizeLimit::Lines(_) => text.lines().count(),
        }
    }
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeLimit::Chars(n) => write!(f, "{n} characters"),
            SizeLimit::Lines(n) => write!(f, "{n} lines"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatKind {
    Plain,
    /// Wrapped in a `---` delimiter pair enclosing a single `key: value` line.
    Frontmatter { line: &'static str },
}
