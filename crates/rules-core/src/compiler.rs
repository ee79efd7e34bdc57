//! Answer set + skill index -> ordered rule blocks.
//!
//! Compilation is a pure function: the same inputs always produce the same
//! document. Which blocks a scope may contain is fixed by [`outline`].

use crate::questionnaire::AnswerSet;
use crate::questions::QUESTIONS;
use crate::skills::{SkillIndex, SkillManifest};
use crate::types::{Block, Scope};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl Fragment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            examples: Vec::new(),
        }
    }
}

/// A titled list nested under a block, e.g. skills worth installing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubBlock {
    pub title: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleBlock {
    pub block: Block,
    pub fragments: Vec<Fragment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<SubBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDocument {
    pub scope: Scope,
    pub title: &'static str,
    pub blocks: Vec<RuleBlock>,
}

impl GeneratedDocument {
    pub fn block(&self, block: Block) -> Option<&RuleBlock> {
        self.blocks.iter().find(|b| b.block == block)
    }
}

// ---------------------------------------------------------------------------
// Static tables
// ---------------------------------------------------------------------------

/// Blocks each scope may contain, in document order.
pub fn outline(scope: Scope) -> &'static [Block] {
    match scope {
        Scope::Global => &[
            Block::CorePrinciples,
            Block::Communication,
            Block::Workflow,
            Block::TaskManagement,
            Block::CodeQuality,
            Block::Testing,
            Block::Git,
            Block::Skills,
        ],
        Scope::Team => &[
            Block::ProjectStack,
            Block::CorePrinciples,
            Block::CodeQuality,
            Block::Testing,
            Block::Git,
            Block::Documentation,
        ],
        Scope::Dev => &[
            Block::ProjectStack,
            Block::Communication,
            Block::Workflow,
            Block::TaskManagement,
            Block::LocalEnvironment,
        ],
    }
}

pub fn title(scope: Scope) -> &'static str {
    match scope {
        Scope::Global => "Agent Rules",
        Scope::Team => "Team Rules",
        Scope::Dev => "Personal Rules",
    }
}

pub const CORE_PRINCIPLES: [&str; 4] = [
    "Simplicity first: make every change as simple as possible and touch as little code as needed.",
    "Fix root causes, not symptoms; no temporary workarounds.",
    "Keep the blast radius small: change only what the task requires.",
    "Verify before calling anything done: prove it works, don't assume it.",
];

pub const RECOMMENDED_TITLE: &str = "Recommended skills (not installed)";

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

pub fn compile(answers: &AnswerSet, skills: &SkillIndex, scope: Scope) -> GeneratedDocument {
    assert_eq!(
        answers.scope, scope,
        "answer set for {} compiled as {}",
        answers.scope, scope
    );
    let declared = outline(scope);

    let blocks: Vec<RuleBlock> = declared
        .iter()
        .map(|&block| {
            let mut fragments = Vec::new();
            if block == Block::CorePrinciples {
                fragments.extend(CORE_PRINCIPLES.iter().map(|p| Fragment::plain(*p)));
            }
            for question in QUESTIONS {
                if !question.blocks_for(scope).any(|b| b == block) {
                    continue;
                }
                if let Some(fragment) = answers.get(question.id).and_then(|a| question.fragment(a))
                {
                    fragments.push(fragment);
                }
            }

            let mut recommended = None;
            if block == Block::Skills {
                fragments.extend(skills.installed.iter().map(skill_line));
                if !skills.recommended.is_empty() {
                    recommended = Some(SubBlock {
                        title: RECOMMENDED_TITLE.to_string(),
                        items: skills
                            .recommended
                            .iter()
                            .map(|e| format!("`{}`: {}", e.name, e.description))
                            .collect(),
                    });
                }
            }

            RuleBlock {
                block,
                fragments,
                recommended,
            }
        })
        .filter(|b| !b.fragments.is_empty() || b.recommended.is_some())
        .collect();

    for b in &blocks {
        assert!(
            declared.contains(&b.block),
            "{} scope emitted undeclared block {}",
            scope,
            b.block
        );
    }

    GeneratedDocument {
        scope,
        title: title(scope),
        blocks,
    }
}

/// "When <situation>, use the `<name>` skill."
fn skill_line(skill: &SkillManifest) -> Fragment {
    let situation = skill.description.trim().trim_end_matches('.');
    let mut chars = situation.chars();
    let situation = match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && !second.is_uppercase() => {
            first.to_lowercase().chain(situation.chars().skip(1)).collect()
        }
        _ => situation.to_string(),
    };
    Fragment::plain(format!("When {situation}, use the `{}` skill.", skill.name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{Questionnaire, ScriptedPrompter};
    use crate::skills::{CatalogEntry, SkillSource};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn answers(scope: Scope, pairs: &[(&str, &str)]) -> AnswerSet {
        let mut script: HashMap<String, String> = crate::questions::applicable_ids(scope)
            .into_iter()
            .map(|id| {
                let q = crate::questions::get(id).unwrap();
                (id.to_string(), q.choices[0].key.to_string())
            })
            .collect();
        for (k, v) in pairs {
            script.insert(k.to_string(), v.to_string());
        }
        Questionnaire::run(scope, &mut ScriptedPrompter::new(script))
            .unwrap()
            .unwrap()
    }

    fn skill(name: &str, description: &str) -> SkillManifest {
        SkillManifest {
            name: name.into(),
            description: description.into(),
            source: SkillSource::User,
            path: PathBuf::from(format!("/s/{name}/SKILL.md")),
        }
    }

    fn index() -> SkillIndex {
        SkillIndex {
            installed: vec![
                skill("debugging", "Systematic root-cause debugging."),
                skill("html-report", "HTML reports for findings"),
            ],
            recommended: vec![CatalogEntry {
                name: "refactoring".into(),
                description: "Refactoring catalog".into(),
            }],
        }
    }

    #[test]
    fn team_scope_has_no_workflow_blocks() {
        let doc = compile(
            &answers(Scope::Team, &[("stack", "TypeScript+React"), ("testing", "Test alongside")]),
            &index(),
            Scope::Team,
        );
        assert!(doc.block(Block::Workflow).is_none());
        assert!(doc.block(Block::TaskManagement).is_none());
        assert!(doc.block(Block::Skills).is_none());
        let testing = doc.block(Block::Testing).unwrap();
        assert!(testing.fragments[0].text.contains("alongside"));
    }

    #[test]
    fn blocks_follow_outline_order() {
        for scope in Scope::all() {
            let doc = compile(&answers(*scope, &[]), &index(), *scope);
            let order: Vec<_> = doc.blocks.iter().map(|b| b.block).collect();
            let expected: Vec<_> = outline(*scope)
                .iter()
                .copied()
                .filter(|b| order.contains(b))
                .collect();
            assert_eq!(order, expected);
        }
    }

    #[test]
    fn core_principles_in_global_and_team_only() {
        for scope in [Scope::Global, Scope::Team] {
            let doc = compile(&answers(scope, &[]), &index(), scope);
            let core = doc.block(Block::CorePrinciples).unwrap();
            assert_eq!(core.fragments[0].text, CORE_PRINCIPLES[0]);
        }
        let dev = compile(&answers(Scope::Dev, &[]), &index(), Scope::Dev);
        assert!(dev.block(Block::CorePrinciples).is_none());
    }

    #[test]
    fn autonomy_lands_in_core_principles_for_team() {
        let doc = compile(&answers(Scope::Team, &[("autonomy", "ask-first")]), &index(), Scope::Team);
        let core = doc.block(Block::CorePrinciples).unwrap();
        assert_eq!(core.fragments.len(), CORE_PRINCIPLES.len() + 1);
        assert!(core.fragments.last().unwrap().text.starts_with("Ask before"));
    }

    #[test]
    fn global_skills_block_lists_installed_and_recommended() {
        let doc = compile(&answers(Scope::Global, &[]), &index(), Scope::Global);
        let skills = doc.block(Block::Skills).unwrap();
        assert_eq!(
            skills.fragments[0].text,
            "When systematic root-cause debugging, use the `debugging` skill."
        );
        assert_eq!(
            skills.fragments[1].text,
            "When HTML reports for findings, use the `html-report` skill."
        );
        let rec = skills.recommended.as_ref().unwrap();
        assert_eq!(rec.items, ["`refactoring`: Refactoring catalog"]);
    }

    #[test]
    fn skills_block_needs_installed_or_recommended() {
        let recommended_only = SkillIndex {
            installed: vec![],
            recommended: index().recommended,
        };
        let doc = compile(&answers(Scope::Global, &[]), &recommended_only, Scope::Global);
        let skills = doc.block(Block::Skills).unwrap();
        assert!(skills.fragments.is_empty());
        assert!(skills.recommended.is_some());

        let doc = compile(&answers(Scope::Global, &[]), &SkillIndex::default(), Scope::Global);
        assert!(doc.block(Block::Skills).is_none());
    }

    #[test]
    fn compilation_is_deterministic() {
        let a = answers(Scope::Global, &[("git", "no-commits")]);
        let one = compile(&a, &index(), Scope::Global);
        let two = compile(&a.clone(), &index(), Scope::Global);
        assert_eq!(one, two);
    }
}
