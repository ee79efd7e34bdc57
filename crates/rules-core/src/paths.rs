use crate::error::{Result, RulesError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = ".agentic-rules/config.yaml";

pub const PROJECT_SKILL_DIRS: &[&str] = &[".claude/skills", ".agents/skills"];
pub const USER_SKILL_DIRS: &[&str] = &[".claude/skills", ".agents/skills"];
pub const PLUGIN_SKILL_GLOB: &str = ".claude/plugins/**/skills";

/// Manifest glob, one level below a `skills` directory.
pub const MANIFEST_GLOB: &str = "*/SKILL.md";

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// The two anchors every output path template is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub home: PathBuf,
    pub project: PathBuf,
}

impl Locations {
    pub fn new(home: impl Into<PathBuf>, project: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            project: project.into(),
        }
    }

    /// Resolve `home` from an explicit override, falling back to the OS home dir.
    pub fn detect(home: Option<&Path>, project: &Path) -> Result<Self> {
        let home = match home {
            Some(h) => h.to_path_buf(),
            None => home::home_dir().ok_or(RulesError::HomeNotFound)?,
        };
        Ok(Self::new(home, project))
    }

    /// Expand a path template: `~/` anchors at home, anything else at the project root.
    pub fn expand(&self, template: &str) -> PathBuf {
        match template.strip_prefix("~/") {
            Some(rest) => self.home.join(rest),
            None => self.project.join(template),
        }
    }

    /// Render `path` the way templates are written, for display.
    pub fn display(&self, path: &Path) -> String {
        if let Ok(rel) = path.strip_prefix(&self.project) {
            return rel.display().to_string();
        }
        if let Ok(rel) = path.strip_prefix(&self.home) {
            return format!("~/{}", rel.display());
        }
        path.display().to_string()
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_anchors_templates() {
        let loc = Locations::new("/home/ada", "/work/app");
        assert_eq!(
            loc.expand("~/.claude/CLAUDE.md"),
            PathBuf::from("/home/ada/.claude/CLAUDE.md")
        );
        assert_eq!(
            loc.expand(".cursor/rules/team.mdc"),
            PathBuf::from("/work/app/.cursor/rules/team.mdc")
        );
    }

    #[test]
    fn display_prefers_short_forms() {
        let loc = Locations::new("/home/ada", "/work/app");
        assert_eq!(loc.display(Path::new("/work/app/AGENTS.md")), "AGENTS.md");
        assert_eq!(
            loc.display(Path::new("/home/ada/.gemini/GEMINI.md")),
            "~/.gemini/GEMINI.md"
        );
        assert_eq!(loc.display(Path::new("/etc/x")), "/etc/x");
    }

    #[test]
    fn explicit_home_wins() {
        let loc = Locations::detect(Some(Path::new("/tmp/h")), Path::new("/tmp/p")).unwrap();
        assert_eq!(loc.home, PathBuf::from("/tmp/h"));
        assert_eq!(
            config_path(&loc.home),
            PathBuf::from("/tmp/h/.agentic-rules/config.yaml")
        );
    }
}
