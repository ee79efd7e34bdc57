use crate::error::Result;
use crate::paths;
use crate::registry;
use crate::skills::CatalogEntry;
use crate::types::Scope;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RulesConfig
// ---------------------------------------------------------------------------

/// User preferences read from `~/.agentic-rules/config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Agent used when none is named on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,
    /// Extra user-level skill directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skill_roots: Vec<PathBuf>,
    /// Extra entries for the recommended-skills catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<CatalogEntry>,
}

impl RulesConfig {
    /// Load the config under `home`. A missing file is the default config.
    pub fn load(home: &Path) -> Result<Self> {
        let path = paths::config_path(home);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: RulesConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// The configured default scope, if it parses.
    pub fn scope(&self) -> Option<Scope> {
        self.default_scope.as_deref().and_then(|s| s.parse().ok())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(agent) = &self.default_agent {
            if registry::find(agent).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("default_agent '{agent}' matches no known agent"),
                });
            }
        }

        if let Some(scope) = &self.default_scope {
            if scope.parse::<Scope>().is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("default_scope '{scope}' is not global, team, or dev"),
                });
            }
        }

        for root in &self.skill_roots {
            if !root.is_dir() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("skill root {} does not exist", root.display()),
                });
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.catalog {
            if !seen.insert(entry.name.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("catalog entry '{}' is listed more than once", entry.name),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
