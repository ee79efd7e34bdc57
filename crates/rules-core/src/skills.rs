//! Skill manifest discovery.
//!
//! A skill is a directory holding a `SKILL.md` whose YAML frontmatter carries
//! at least `name` and `description`. Scanning walks a fixed list of roots,
//! skips anything unreadable or malformed, and deduplicates by name with
//! project > user > plugin precedence.

use crate::config::RulesConfig;
use crate::format;
use crate::paths::{self, Locations};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// SkillSource / SkillRoot
// ---------------------------------------------------------------------------

/// Where a manifest was found. Declaration order is precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Project,
    User,
    Plugin,
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkillSource::Project => "project",
            SkillSource::User => "user",
            SkillSource::Plugin => "plugin",
        })
    }
}

/// A glob pattern that yields manifest files, tagged with its source level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRoot {
    pub source: SkillSource,
    pub pattern: String,
}

impl SkillRoot {
    /// Manifests one directory level below `skills_dir`.
    pub fn under(source: SkillSource, skills_dir: &Path) -> Self {
        Self::matching(source, skills_dir, paths::MANIFEST_GLOB)
    }

    /// `base` taken literally, followed by the glob `pattern`.
    pub fn matching(source: SkillSource, base: &Path, pattern: &str) -> Self {
        let base = glob::Pattern::escape(&base.to_string_lossy());
        Self {
            source,
            pattern: Path::new(&base).join(pattern).to_string_lossy().into_owned(),
        }
    }
}

/// The standard search roots, plus any extra user-level roots from config.
pub fn default_roots(locations: &Locations, config: &RulesConfig) -> Vec<SkillRoot> {
    let mut roots = Vec::new();
    for dir in paths::PROJECT_SKILL_DIRS {
        roots.push(SkillRoot::under(
            SkillSource::Project,
            &locations.project.join(dir),
        ));
    }
    for dir in paths::USER_SKILL_DIRS {
        roots.push(SkillRoot::under(SkillSource::User, &locations.home.join(dir)));
    }
    for dir in &config.skill_roots {
        roots.push(SkillRoot::under(SkillSource::User, dir));
    }
    let plugin = Path::new(paths::PLUGIN_SKILL_GLOB).join(paths::MANIFEST_GLOB);
    roots.push(SkillRoot::matching(
        SkillSource::Plugin,
        &locations.home,
        &plugin.to_string_lossy(),
    ));
    roots
}

// ---------------------------------------------------------------------------
// SkillManifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillManifest {
    pub name: String,
    pub description: String,
    pub source: SkillSource,
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct ManifestHeader {
    name: String,
    description: String,
}

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:\-]*$").unwrap())
}

/// Parse the frontmatter header of a manifest. Unknown keys are ignored.
pub fn parse_manifest(content: &str) -> Result<(String, String), String> {
    let content = content.trim_start_matches('\u{feff}').trim_start();
    let Some(after_open) = content.strip_prefix("---") else {
        return Err("missing frontmatter delimiter".to_string());
    };
    let Some(close) = after_open.find("\n---") else {
        return Err("unclosed frontmatter".to_string());
    };
    let header: ManifestHeader =
        serde_yaml::from_str(&after_open[..close]).map_err(|e| e.to_string())?;

    let name = header.name.trim().to_string();
    if !name_re().is_match(&name) {
        return Err(format!("invalid skill name '{name}'"));
    }
    let description = format::one_line(&header.description);
    if description.is_empty() {
        return Err("empty description".to_string());
    }
    Ok((name, description))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
}

/// Skills shipped alongside the rules writer, recommended when missing.
pub const KNOWN_SKILLS: &[(&str, &str)] = &[
    (
        "agentic-rules-writer",
        "Generate rule files for coding agents from a short questionnaire",
    ),
    (
        "debugging",
        "Systematic root-cause debugging before proposing a fix",
    ),
    (
        "design-patterns",
        "Choosing and applying classic design patterns",
    ),
    (
        "html-report",
        "Render findings into a self-contained HTML report",
    ),
    (
        "refactoring",
        "Catalog of refactorings with motivation and mechanics",
    ),
    (
        "solid-principles",
        "Reviewing code against the SOLID principles",
    ),
    (
        "symfony-components",
        "Reference for Symfony components and their usage",
    ),
    (
        "test-driven-development",
        "Red-green-refactor workflow for new behaviour",
    ),
];

/// Shipped catalog plus config extras, first occurrence of a name wins.
pub fn catalog(config: &RulesConfig) -> Vec<CatalogEntry> {
    let mut seen = BTreeSet::new();
    KNOWN_SKILLS
        .iter()
        .map(|(name, description)| CatalogEntry {
            name: name.to_string(),
            description: description.to_string(),
        })
        .chain(config.catalog.iter().map(|e| CatalogEntry {
            name: format::one_line(&e.name),
            description: format::one_line(&e.description),
        }))
        .filter(|e| seen.insert(e.name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// SkillIndex / scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillIndex {
    /// Sorted by name, one entry per name.
    pub installed: Vec<SkillManifest>,
    /// Catalog entries with no installed counterpart, sorted by name.
    pub recommended: Vec<CatalogEntry>,
}

/// Scan every root and build the deduplicated index.
///
/// Missing roots contribute nothing; unreadable paths and malformed manifests
/// are logged and skipped. The result depends only on filesystem contents,
/// never on root or directory iteration order.
pub fn scan(roots: &[SkillRoot], known: &[CatalogEntry]) -> SkillIndex {
    let mut found = Vec::new();
    for root in roots {
        scan_root(root, &mut found);
    }

    found.sort_by(|a: &SkillManifest, b| {
        a.name
            .cmp(&b.name)
            .then(a.source.cmp(&b.source))
            .then_with(|| a.path.cmp(&b.path))
    });
    found.dedup_by(|later, kept| {
        let dup = later.name == kept.name;
        if dup {
            tracing::debug!(
                "skill '{}' from {} shadowed by {}",
                later.name,
                later.path.display(),
                kept.path.display()
            );
        }
        dup
    });

    let mut recommended: Vec<CatalogEntry> = known
        .iter()
        .filter(|entry| {
            found
                .binary_search_by(|m| m.name.as_str().cmp(&entry.name))
                .is_err()
        })
        .cloned()
        .collect();
    recommended.sort_by(|a, b| a.name.cmp(&b.name));

    SkillIndex {
        installed: found,
        recommended,
    }
}

fn scan_root(root: &SkillRoot, out: &mut Vec<SkillManifest>) {
    let entries = match glob::glob(&root.pattern) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("invalid skill root pattern {}: {e}", root.pattern);
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("cannot read {}: {}", e.path().display(), e.error());
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("skipping {}: {e}", path.display());
                continue;
            }
        };
        match parse_manifest(&content) {
            Ok((name, description)) => {
                tracing::debug!("found {} skill '{name}' at {}", root.source, path.display());
                out.push(SkillManifest {
                    name,
                    description,
                    source: root.source,
                    path,
                });
            }
            Err(reason) => tracing::warn!("skipping {}: {reason}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_skill(skills_dir: &Path, dir_name: &str, content: &str) {
        let dir = skills_dir.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), content).unwrap();
    }

    fn installed<'a>(index: &'a SkillIndex, name: &str) -> &'a SkillManifest {
        index.installed.iter().find(|m| m.name == name).unwrap()
    }

    fn manifest(name: &str, description: &str) -> String {
        format!("---\nname: {name}\ndescription: {description}\n---\n# Body\n")
    }

    #[test]
    fn parse_valid_manifest() {
        let (name, desc) = parse_manifest(
            "---\nname: refactoring\ndescription: >\n  Catalog of\n  refactorings.\nversion: 2\n---\nbody",
        )
        .unwrap();
        assert_eq!(name, "refactoring");
        assert_eq!(desc, "Catalog of refactorings.");
    }

    #[test]
    fn parse_rejects_malformed_headers() {
        assert!(parse_manifest("no frontmatter").unwrap_err().contains("missing"));
        assert!(parse_manifest("---\nname: x\n").unwrap_err().contains("unclosed"));
        assert!(parse_manifest("---\nname: x\n---\n").is_err());
        assert!(parse_manifest("---\nname: has space\ndescription: d\n---\n").is_err());
        assert!(parse_manifest("---\nname: ok\ndescription: \"  \"\n---\n").is_err());
    }

    #[test]
    fn missing_roots_are_empty() {
        let dir = TempDir::new().unwrap();
        let roots = [SkillRoot::under(SkillSource::User, &dir.path().join("nope"))];
        let index = scan(&roots, &[]);
        assert!(index.installed.is_empty());
    }

    #[test]
    fn malformed_manifest_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_skill(dir.path(), "good", &manifest("good", "Works."));
        write_skill(dir.path(), "bad", "no frontmatter");
        let index = scan(&[SkillRoot::under(SkillSource::User, dir.path())], &[]);
        assert_eq!(index.installed.len(), 1);
        assert_eq!(index.installed[0].name, "good");
    }

    #[test]
    fn project_beats_user_beats_plugin() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let plugin = TempDir::new().unwrap();
        write_skill(user.path(), "tdd", &manifest("tdd", "User copy"));
        write_skill(project.path(), "tdd", &manifest("tdd", "Project copy"));
        write_skill(plugin.path(), "tdd", &manifest("tdd", "Plugin copy"));
        write_skill(plugin.path(), "lint", &manifest("lint", "Plugin only"));

        // Root order is deliberately lowest precedence first.
        let roots = [
            SkillRoot::under(SkillSource::Plugin, plugin.path()),
            SkillRoot::under(SkillSource::User, user.path()),
            SkillRoot::under(SkillSource::Project, project.path()),
        ];
        let index = scan(&roots, &[]);
        assert_eq!(index.installed.len(), 2);
        let tdd = installed(&index, "tdd");
        assert_eq!(tdd.source, SkillSource::Project);
        assert_eq!(tdd.description, "Project copy");
        assert_eq!(installed(&index, "lint").source, SkillSource::Plugin);
    }

    #[test]
    fn output_is_sorted_and_order_independent() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write_skill(a.path(), "zeta", &manifest("zeta", "Z."));
        write_skill(b.path(), "alpha", &manifest("alpha", "A."));
        let ra = SkillRoot::under(SkillSource::User, a.path());
        let rb = SkillRoot::under(SkillSource::User, b.path());
        let one = scan(&[ra.clone(), rb.clone()], &[]);
        let two = scan(&[rb, ra], &[]);
        assert_eq!(one, two);
        let names: Vec<_> = one.installed.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn recommended_is_catalog_minus_installed() {
        let dir = TempDir::new().unwrap();
        write_skill(dir.path(), "refactoring", &manifest("refactoring", "Installed."));
        let known = catalog(&RulesConfig::default());
        let index = scan(&[SkillRoot::under(SkillSource::User, dir.path())], &known);
        assert!(index.recommended.iter().all(|e| e.name != "refactoring"));
        assert_eq!(index.recommended.len(), KNOWN_SKILLS.len() - 1);
        let mut sorted = index.recommended.clone();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(sorted, index.recommended);
    }

    #[test]
    fn config_extends_catalog_without_duplicates() {
        let config = RulesConfig {
            catalog: vec![
                CatalogEntry {
                    name: "debugging".into(),
                    description: "shadowed".into(),
                },
                CatalogEntry {
                    name: "house-style".into(),
                    description: "Team conventions".into(),
                },
            ],
            ..RulesConfig::default()
        };
        let known = catalog(&config);
        assert_eq!(known.len(), KNOWN_SKILLS.len() + 1);
        let debugging = known.iter().find(|e| e.name == "debugging").unwrap();
        assert_ne!(debugging.description, "shadowed");
    }

    #[test]
    fn glob_characters_in_root_are_literal() {
        let dir = TempDir::new().unwrap();
        let skills_dir = dir.path().join("proj[1]").join(".claude/skills");
        write_skill(&skills_dir, "debugging", &manifest("debugging", "Find bugs"));

        let index = scan(&[SkillRoot::under(SkillSource::Project, &skills_dir)], &[]);
        assert_eq!(installed(&index, "debugging").source, SkillSource::Project);
    }

    #[test]
    fn plugin_root_escapes_home_but_keeps_wildcards() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("me[x]");
        write_skill(
            &home.join(".claude/plugins/acme/tools/skills"),
            "lint",
            &manifest("lint", "Lint everything"),
        );

        let loc = Locations::new(&home, "/nonexistent-project");
        let index = scan(&default_roots(&loc, &RulesConfig::default()), &[]);
        assert_eq!(installed(&index, "lint").source, SkillSource::Plugin);
    }

    #[test]
    fn config_catalog_text_is_single_line() {
        let config = RulesConfig {
            catalog: vec![CatalogEntry {
                name: "house-style".into(),
                description: "Team\n\n## Workflow\nconventions".into(),
            }],
            ..RulesConfig::default()
        };
        let known = catalog(&config);
        let entry = known.iter().find(|e| e.name == "house-style").unwrap();
        assert_eq!(entry.description, "Team ## Workflow conventions");
    }

    #[test]
    fn default_roots_cover_all_levels() {
        let loc = Locations::new("/h", "/p");
        let config = RulesConfig {
            skill_roots: vec![PathBuf::from("/extra")],
            ..RulesConfig::default()
        };
        let roots = default_roots(&loc, &config);
        assert_eq!(roots.first().unwrap().source, SkillSource::Project);
        assert_eq!(roots.last().unwrap().source, SkillSource::Plugin);
        assert!(roots
            .iter()
            .any(|r| r.pattern.starts_with("/extra") && r.source == SkillSource::User));
    }
}
