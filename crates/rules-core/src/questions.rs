//! The questionnaire catalog: questions, their choices, the rule text each
//! choice contributes, and the (question, scope) applicability table.
//!
//! Everything here is literal data. The engine and the compiler only read it.

use crate::compiler::Fragment;
use crate::format;
use crate::types::{Block, Scope};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub key: &'static str,
    pub label: &'static str,
    /// Rule text this choice contributes. `{answer}` is replaced by free text.
    pub rule: &'static str,
    /// Illustrations rendered as sub-bullets; first to go under condensation.
    pub examples: &'static [&'static str],
    pub free_text: bool,
}

/// Block a question feeds, and the scopes in which it feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub block: Block,
    pub scopes: &'static [Scope],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub choices: &'static [Choice],
    pub targets: &'static [Target],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Choice(&'static str),
    Text(String),
}

impl Question {
    /// Interpret raw input as a choice key, a label, a 1-based option number,
    /// or free text when the question allows it.
    pub fn resolve(&self, input: &str) -> Result<Answer, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("an answer is required".to_string());
        }

        let picked = match input.parse::<usize>() {
            Ok(n) if (1..=self.choices.len()).contains(&n) => Some(&self.choices[n - 1]),
            _ => self.choices.iter().find(|c| {
                c.key.eq_ignore_ascii_case(input) || c.label.eq_ignore_ascii_case(input)
            }),
        };

        match picked {
            Some(choice) if choice.free_text => Err(format!(
                "type your own answer instead of selecting '{}'",
                choice.label
            )),
            Some(choice) => Ok(Answer::Choice(choice.key)),
            None if self.allows_free_text() => free_text(input).map(Answer::Text),
            None => Err(format!(
                "expected one of: {}",
                self.choices
                    .iter()
                    .map(|c| c.key)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }

    pub fn allows_free_text(&self) -> bool {
        self.choices.iter().any(|c| c.free_text)
    }

    /// The rule fragment an accepted answer contributes.
    pub fn fragment(&self, answer: &Answer) -> Option<Fragment> {
        let (choice, text) = match answer {
            Answer::Choice(key) => (self.choices.iter().find(|c| c.key == *key)?, None),
            Answer::Text(text) => (self.choices.iter().find(|c| c.free_text)?, Some(text)),
        };
        let rule = match text {
            Some(t) => choice.rule.replace("{answer}", t),
            None => choice.rule.to_string(),
        };
        Some(Fragment {
            text: rule,
            examples: choice.examples.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// Blocks this question feeds in `scope`.
    pub fn blocks_for(&self, scope: Scope) -> impl Iterator<Item = Block> + '_ {
        self.targets
            .iter()
            .filter(move |t| t.scopes.contains(&scope))
            .map(|t| t.block)
    }
}

/// Free text ends up inside a single rule line.
fn free_text(input: &str) -> Result<String, String> {
    if input.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return Err("control characters are not allowed".to_string());
    }
    Ok(format::one_line(input))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

const ALL: &[Scope] = &[Scope::Global, Scope::Team, Scope::Dev];
const GLOBAL_DEV: &[Scope] = &[Scope::Global, Scope::Dev];
const GLOBAL_TEAM: &[Scope] = &[Scope::Global, Scope::Team];
const TEAM_DEV: &[Scope] = &[Scope::Team, Scope::Dev];
const TEAM: &[Scope] = &[Scope::Team];
const DEV: &[Scope] = &[Scope::Dev];

pub const QUESTIONS: &[Question] = &[
    Question {
        id: "stack",
        prompt: "What is the project's primary stack?",
        choices: &[
            Choice {
                key: "typescript-react",
                label: "TypeScript+React",
                rule: "The project is TypeScript with React; keep components typed and prefer function components with hooks.",
                examples: &["Props get an explicit interface, never `any`."],
                free_text: false,
            },
            Choice {
                key: "php-symfony",
                label: "PHP+Symfony",
                rule: "The project is PHP on Symfony; follow Symfony conventions and use the framework's components before adding libraries.",
                examples: &["Wire services through autowiring rather than manual container calls."],
                free_text: false,
            },
            Choice {
                key: "python",
                label: "Python",
                rule: "The project is Python; use type hints on public functions and keep modules importable without side effects.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "go",
                label: "Go",
                rule: "The project is Go; return errors instead of panicking and keep packages small and focused.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "rust",
                label: "Rust",
                rule: "The project is Rust; propagate errors with `?` and keep `unwrap()` out of non-test code.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "other",
                label: "Other",
                rule: "The project's primary stack is {answer}; follow its established conventions.",
                examples: &[],
                free_text: true,
            },
        ],
        targets: &[Target {
            block: Block::ProjectStack,
            scopes: TEAM_DEV,
        }],
    },
    Question {
        id: "communication",
        prompt: "How should the agent communicate?",
        choices: &[
            Choice {
                key: "concise",
                label: "Concise",
                rule: "Keep responses short: lead with the result, skip preamble and recaps.",
                examples: &["\"Fixed the null check in parser.rs; tests pass.\" instead of a narrated walkthrough."],
                free_text: false,
            },
            Choice {
                key: "detailed",
                label: "Detailed",
                rule: "Explain what changed and why, including trade-offs that were considered.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "teaching",
                label: "Teaching",
                rule: "Explain reasoning as you go so the user learns the codebase and the technique.",
                examples: &["Name the pattern being applied and link to where it is used elsewhere."],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::Communication,
            scopes: GLOBAL_DEV,
        }],
    },
    Question {
        id: "autonomy",
        prompt: "How much autonomy should the agent have?",
        choices: &[
            Choice {
                key: "ask-first",
                label: "Ask first",
                rule: "Ask before making changes beyond the literal request.",
                examples: &["Renaming a public function outside the task needs a confirmation."],
                free_text: false,
            },
            Choice {
                key: "balanced",
                label: "Balanced",
                rule: "Proceed on clear tasks; stop and ask when requirements are ambiguous or a change is hard to reverse.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "autonomous",
                label: "Autonomous",
                rule: "Work through tasks end to end without check-ins; report decisions in the final summary.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[
            Target {
                block: Block::Workflow,
                scopes: GLOBAL_DEV,
            },
            Target {
                block: Block::CorePrinciples,
                scopes: TEAM,
            },
        ],
    },
    Question {
        id: "planning",
        prompt: "When should the agent plan before coding?",
        choices: &[
            Choice {
                key: "always",
                label: "Always",
                rule: "Write a short plan before any code change and confirm it first.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "non-trivial",
                label: "Non-trivial tasks",
                rule: "Plan first for any task with three or more steps or an architectural decision; re-plan when something goes sideways.",
                examples: &["A one-line typo fix needs no plan; a new endpoint does."],
                free_text: false,
            },
            Choice {
                key: "on-request",
                label: "Only when asked",
                rule: "Go straight to implementation unless a plan is requested.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::Workflow,
            scopes: GLOBAL_DEV,
        }],
    },
    Question {
        id: "task_tracking",
        prompt: "How should the agent track multi-step work?",
        choices: &[
            Choice {
                key: "todo-file",
                label: "Todo file",
                rule: "Track multi-step work as checkable items in `tasks/todo.md` and mark items done as you go.",
                examples: &["Add a review section to `tasks/todo.md` when the work is finished."],
                free_text: false,
            },
            Choice {
                key: "checklist",
                label: "Inline checklist",
                rule: "Keep a checklist in the conversation and update it after each step.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "none",
                label: "No tracking",
                rule: "Do not maintain task lists; summarise progress only at the end.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::TaskManagement,
            scopes: GLOBAL_DEV,
        }],
    },
    Question {
        id: "verification",
        prompt: "How should work be verified before it is called done?",
        choices: &[
            Choice {
                key: "tests",
                label: "Run tests",
                rule: "Never mark a task complete without running the relevant tests and reading the result.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "tests-and-lint",
                label: "Tests and linters",
                rule: "Run tests, linters and the type checker before reporting completion.",
                examples: &["Report the exact commands that were run and their outcome."],
                free_text: false,
            },
            Choice {
                key: "demo",
                label: "Demonstrate",
                rule: "Demonstrate the change working (logs, output or a diff of behaviour) before reporting completion.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::Workflow,
            scopes: GLOBAL_DEV,
        }],
    },
    Question {
        id: "code_style",
        prompt: "What matters most in code style?",
        choices: &[
            Choice {
                key: "readability",
                label: "Readability",
                rule: "Prefer clear names and straightforward control flow over cleverness.",
                examples: &["Extract a well-named function instead of commenting a dense block."],
                free_text: false,
            },
            Choice {
                key: "consistency",
                label: "Consistency",
                rule: "Match the surrounding code's conventions even where you would choose differently.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "performance",
                label: "Performance",
                rule: "Keep hot paths allocation-aware and measure before and after optimising.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::CodeQuality,
            scopes: GLOBAL_TEAM,
        }],
    },
    Question {
        id: "testing",
        prompt: "What is the testing approach?",
        choices: &[
            Choice {
                key: "tdd",
                label: "Test first",
                rule: "Write a failing test before the implementation, then make it pass.",
                examples: &["Bug fixes start with a test that reproduces the bug."],
                free_text: false,
            },
            Choice {
                key: "alongside",
                label: "Test alongside",
                rule: "Write tests alongside the implementation, in the same change.",
                examples: &["A new public function ships with its unit tests in the same commit."],
                free_text: false,
            },
            Choice {
                key: "after",
                label: "Test after",
                rule: "Add tests once the implementation has settled, before the work is merged.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "critical-only",
                label: "Critical paths only",
                rule: "Test critical paths and bug fixes; skip tests for trivial glue code.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::Testing,
            scopes: GLOBAL_TEAM,
        }],
    },
    Question {
        id: "git",
        prompt: "How should the agent work with git?",
        choices: &[
            Choice {
                key: "conventional",
                label: "Conventional commits",
                rule: "Use Conventional Commits messages (`feat:`, `fix:`, `refactor:`).",
                examples: &["fix(parser): handle empty input"],
                free_text: false,
            },
            Choice {
                key: "feature-branches",
                label: "Feature branches",
                rule: "Work on a feature branch and never commit directly to the default branch.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "no-commits",
                label: "Never commit",
                rule: "Never create commits or push; leave changes staged for review.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::Git,
            scopes: GLOBAL_TEAM,
        }],
    },
    Question {
        id: "documentation",
        prompt: "What documentation does the team expect?",
        choices: &[
            Choice {
                key: "public-api",
                label: "Public API docs",
                rule: "Document every public type and function; keep internal comments rare and factual.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "decisions",
                label: "Decision records",
                rule: "Record architectural decisions in `docs/adr/` and update the README when behaviour changes.",
                examples: &["One ADR per decision: context, decision, consequences."],
                free_text: false,
            },
            Choice {
                key: "minimal",
                label: "Minimal",
                rule: "Only document what the code cannot say itself.",
                examples: &[],
                free_text: false,
            },
        ],
        targets: &[Target {
            block: Block::Documentation,
            scopes: TEAM,
        }],
    },
    Question {
        id: "local_env",
        prompt: "How is your local environment run?",
        choices: &[
            Choice {
                key: "docker",
                label: "Docker Compose",
                rule: "Run commands inside the Docker Compose services, not on the host.",
                examples: &["`docker compose exec app make test`"],
                free_text: false,
            },
            Choice {
                key: "native",
                label: "Native toolchain",
                rule: "Run commands directly with the host toolchain.",
                examples: &[],
                free_text: false,
            },
            Choice {
                key: "other",
                label: "Other",
                rule: "Local environment: {answer}.",
                examples: &[],
                free_text: true,
            },
        ],
        targets: &[Target {
            block: Block::LocalEnvironment,
            scopes: DEV,
        }],
    },
];

/// Applicability keyed by (question id, scope): `[global, team, dev]`.
pub const APPLICABILITY: &[(&str, [bool; 3])] = &[
    ("stack", [false, true, true]),
    ("communication", [true, false, true]),
    ("autonomy", [true, true, true]),
    ("planning", [true, false, true]),
    ("task_tracking", [true, false, true]),
    ("verification", [true, false, true]),
    ("code_style", [true, true, false]),
    ("testing", [true, true, false]),
    ("git", [true, true, false]),
    ("documentation", [false, true, false]),
    ("local_env", [false, false, true]),
];

pub fn is_applicable(id: &str, scope: Scope) -> bool {
    APPLICABILITY
        .iter()
        .find(|(qid, _)| *qid == id)
        .map(|(_, flags)| flags[scope.index()])
        .unwrap_or(false)
}

pub fn get(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Ids of every question asked in `scope`, in catalog order.
pub fn applicable_ids(scope: Scope) -> Vec<&'static str> {
    QUESTIONS
        .iter()
        .filter(|q| is_applicable(q.id, scope))
        .map(|q| q.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn applicability_covers_every_question_once() {
        let ids: Vec<_> = QUESTIONS.iter().map(|q| q.id).collect();
        let table: Vec<_> = APPLICABILITY.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, table);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    }

    #[test]
    fn question_feeds_a_block_exactly_where_applicable() {
        for q in QUESTIONS {
            for scope in Scope::all() {
                let feeds = q.blocks_for(*scope).count() > 0;
                assert_eq!(feeds, is_applicable(q.id, *scope), "{} / {scope}", q.id);
            }
        }
    }

    #[test]
    fn choice_keys_unique_within_question() {
        for q in QUESTIONS {
            let keys: HashSet<_> = q.choices.iter().map(|c| c.key).collect();
            assert_eq!(keys.len(), q.choices.len(), "{}", q.id);
        }
    }

    #[test]
    fn resolve_by_key_label_and_number() {
        let q = get("testing").unwrap();
        assert_eq!(q.resolve("alongside"), Ok(Answer::Choice("alongside")));
        assert_eq!(q.resolve("Test Alongside"), Ok(Answer::Choice("alongside")));
        assert_eq!(q.resolve("2"), Ok(Answer::Choice("alongside")));
        assert!(q.resolve("9").is_err());
        assert!(q.resolve("sometimes").is_err());
        assert!(q.resolve("   ").is_err());
    }

    #[test]
    fn free_text_needs_actual_text() {
        let q = get("stack").unwrap();
        assert_eq!(q.resolve("TypeScript+React"), Ok(Answer::Choice("typescript-react")));
        assert_eq!(q.resolve("Elixir/Phoenix"), Ok(Answer::Text("Elixir/Phoenix".into())));
        assert!(q.resolve("other").is_err());
        assert!(q.resolve("6").is_err());
    }

    #[test]
    fn multi_line_free_text_stays_on_one_line() {
        let q = get("stack").unwrap();
        let answer = q.resolve("Elixir\n\n## Workflow\n\n- injected").unwrap();
        assert_eq!(answer, Answer::Text("Elixir ## Workflow - injected".into()));
        let frag = q.fragment(&answer).unwrap();
        assert!(!frag.text.contains('\n'));

        assert!(q.resolve("Elixir\u{1b}[2J").is_err());
        assert!(q.resolve("Elixir\tPhoenix").is_ok());
    }

    #[test]
    fn free_text_is_substituted_into_rule() {
        let q = get("stack").unwrap();
        let frag = q.fragment(&Answer::Text("Elixir".into())).unwrap();
        assert!(frag.text.contains("primary stack is Elixir"));
        assert!(!frag.text.contains("{answer}"));
    }

    #[test]
    fn autonomy_feeds_scope_dependent_blocks() {
        let q = get("autonomy").unwrap();
        assert_eq!(q.blocks_for(Scope::Global).collect::<Vec<_>>(), [Block::Workflow]);
        assert_eq!(q.blocks_for(Scope::Team).collect::<Vec<_>>(), [Block::CorePrinciples]);
    }
}
