//! Static table of supported coding agents and where each scope's rules live.
//!
//! Adding an agent means adding one row to [`AGENTS`]; nothing else in the
//! pipeline references agent identity except the format adapter, which only
//! reads the row.

use crate::error::{Result, RulesError};
use crate::paths::Locations;
use crate::types::{FormatKind, Scope, SizeLimit};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeTarget {
    /// `~/`-anchored for user paths, otherwise relative to the project root.
    pub path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_limit: Option<SizeLimit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_limit: Option<SizeLimit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub format: FormatKind,
    pub global: ScopeTarget,
    pub team: ScopeTarget,
    pub dev: ScopeTarget,
}

impl AgentProfile {
    pub fn target(&self, scope: Scope) -> &ScopeTarget {
        match scope {
            Scope::Global => &self.global,
            Scope::Team => &self.team,
            Scope::Dev => &self.dev,
        }
    }
}

const fn plain(path: &'static str) -> ScopeTarget {
    ScopeTarget {
        path,
        hard_limit: None,
        soft_limit: None,
    }
}

const fn hard(path: &'static str, limit: SizeLimit) -> ScopeTarget {
    ScopeTarget {
        path,
        hard_limit: Some(limit),
        soft_limit: None,
    }
}

const fn soft(path: &'static str, limit: SizeLimit) -> ScopeTarget {
    ScopeTarget {
        path,
        hard_limit: None,
        soft_limit: Some(limit),
    }
}

pub const AGENTS: &[AgentProfile] = &[
    AgentProfile {
        id: "claude",
        name: "Claude Code",
        format: FormatKind::Plain,
        global: soft("~/.claude/CLAUDE.md", SizeLimit::Lines(200)),
        team: plain("CLAUDE.md"),
        dev: plain("CLAUDE.local.md"),
    },
    AgentProfile {
        id: "cursor",
        name: "Cursor",
        format: FormatKind::Frontmatter {
            line: "alwaysApply: true",
        },
        global: soft("~/.cursor/rules/agentic-rules.mdc", SizeLimit::Lines(500)),
        team: soft(".cursor/rules/team-rules.mdc", SizeLimit::Lines(500)),
        dev: soft(".cursor/rules/personal-rules.mdc", SizeLimit::Lines(500)),
    },
    AgentProfile {
        id: "windsurf",
        name: "Windsurf",
        format: FormatKind::Frontmatter {
            line: "trigger: always_on",
        },
        global: hard(
            "~/.codeium/windsurf/memories/global_rules.md",
            SizeLimit::Chars(12_000),
        ),
        team: hard(".windsurf/rules/team-rules.md", SizeLimit::Chars(12_000)),
        dev: hard(".windsurf/rules/personal-rules.md", SizeLimit::Chars(12_000)),
    },
    AgentProfile {
        id: "copilot",
        name: "GitHub Copilot",
        format: FormatKind::Plain,
        global: plain("~/.copilot/copilot-instructions.md"),
        team: plain(".github/copilot-instructions.md"),
        dev: plain(".github/instructions/personal.instructions.md"),
    },
    AgentProfile {
        id: "gemini",
        name: "Gemini CLI",
        format: FormatKind::Plain,
        global: plain("~/.gemini/GEMINI.md"),
        team: plain("GEMINI.md"),
        dev: plain(".gemini/GEMINI.md"),
    },
    AgentProfile {
        id: "codex",
        name: "OpenAI Codex",
        format: FormatKind::Plain,
        global: hard("~/.codex/AGENTS.md", SizeLimit::Chars(32_768)),
        team: hard("AGENTS.md", SizeLimit::Chars(32_768)),
        dev: hard("AGENTS.override.md", SizeLimit::Chars(32_768)),
    },
    AgentProfile {
        id: "cline",
        name: "Cline",
        format: FormatKind::Plain,
        global: plain("~/Documents/Cline/Rules/agentic-rules.md"),
        team: plain(".clinerules/team-rules.md"),
        dev: plain(".clinerules/personal-rules.md"),
    },
];

/// Fuzzy-match `query` against agent ids and names.
///
/// Case-insensitive substring match; when several agents match, the one with
/// the shortest name wins, then table order.
pub fn find(query: &str) -> Result<&'static AgentProfile> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(RulesError::UnknownAgent(query.to_string()));
    }
    AGENTS
        .iter()
        .filter(|a| a.id.contains(&needle) || a.name.to_lowercase().contains(&needle))
        .min_by_key(|a| a.name.len())
        .ok_or_else(|| RulesError::UnknownAgent(query.to_string()))
}

/// Resolve the agent and the concrete destination path for `scope`.
pub fn resolve(
    query: &str,
    scope: Scope,
    locations: &Locations,
) -> Result<(PathBuf, &'static AgentProfile)> {
    let profile = find(query)?;
    let path = locations.expand(profile.target(scope).path);
    Ok((path, profile))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
