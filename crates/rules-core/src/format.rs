//! Rendering and per-agent adaptation of a [`GeneratedDocument`].
//!
//! This is the only place that reads an agent's format and size constraints.
//! Oversized documents are condensed by removing whole lines in the fixed
//! order of [`CONDENSATION_ORDER`]; nothing is ever cut mid-line.

use crate::compiler::GeneratedDocument;
use crate::error::{Result, RulesError};
use crate::registry::AgentProfile;
use crate::types::{FormatKind, SizeLimit};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Condensation tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condensation {
    /// Example sub-bullets, one at a time from the end.
    Examples,
    /// The whole recommended-skills sub-block at once.
    RecommendedSkills,
    /// Blank separator lines, one at a time from the end.
    BlankLines,
}

/// Removal order, lowest-value content first.
pub const CONDENSATION_ORDER: [Condensation; 3] = [
    Condensation::Examples,
    Condensation::RecommendedSkills,
    Condensation::BlankLines,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondensationStep {
    pub tier: Condensation,
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// Line model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Frontmatter,
    Title,
    Heading,
    Rule,
    Example,
    Recommended,
    Blank,
}

#[derive(Debug, Clone)]
struct Line {
    kind: LineKind,
    text: String,
}

impl Line {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(LineKind::Blank, "")
    }
}

fn layout(doc: &GeneratedDocument, format: FormatKind) -> Vec<Line> {
    let mut lines = Vec::new();

    if let FormatKind::Frontmatter { line } = format {
        lines.push(Line::new(LineKind::Frontmatter, "---"));
        lines.push(Line::new(LineKind::Frontmatter, line));
        lines.push(Line::new(LineKind::Frontmatter, "---"));
        lines.push(Line::blank());
    }

    lines.push(Line::new(LineKind::Title, format!("# {}", doc.title)));

    for block in &doc.blocks {
        // A block carrying only recommendations is removed together with them.
        let only_recommended = block.fragments.is_empty();
        let kind = |k| if only_recommended { LineKind::Recommended } else { k };

        lines.push(Line::new(kind(LineKind::Blank), ""));
        lines.push(Line::new(
            kind(LineKind::Heading),
            format!("## {}", block.block.heading()),
        ));
        lines.push(Line::new(kind(LineKind::Blank), ""));
        for fragment in &block.fragments {
            lines.push(Line::new(LineKind::Rule, format!("- {}", fragment.text)));
            for example in &fragment.examples {
                lines.push(Line::new(LineKind::Example, format!("  - e.g. {example}")));
            }
        }
        if let Some(sub) = &block.recommended {
            if !only_recommended {
                lines.push(Line::new(LineKind::Recommended, ""));
            }
            lines.push(Line::new(LineKind::Recommended, format!("### {}", sub.title)));
            lines.push(Line::new(LineKind::Recommended, ""));
            for item in &sub.items {
                lines.push(Line::new(LineKind::Recommended, format!("- {item}")));
            }
        }
    }

    lines
}

fn to_text(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.text);
        out.push('\n');
    }
    out
}

/// Remove one unit of `tier`. Returns false when none is left.
fn remove_unit(lines: &mut Vec<Line>, tier: Condensation) -> bool {
    let kind = match tier {
        Condensation::Examples => LineKind::Example,
        Condensation::BlankLines => LineKind::Blank,
        Condensation::RecommendedSkills => {
            let before = lines.len();
            lines.retain(|l| l.kind != LineKind::Recommended);
            return lines.len() != before;
        }
    };
    match lines.iter().rposition(|l| l.kind == kind) {
        Some(i) => {
            lines.remove(i);
            true
        }
        None => false,
    }
}

fn excess(lines: &[Line], limit: SizeLimit) -> Option<(usize, usize)> {
    let size = limit.measure(&to_text(lines));
    (size > limit.max()).then(|| (size, size - limit.max()))
}

/// Condense until `lines` fits `limit` or every tier is exhausted.
/// Returns the remaining `(size, overage)` on failure.
fn condense(
    lines: &mut Vec<Line>,
    limit: SizeLimit,
    steps: &mut Vec<CondensationStep>,
) -> std::result::Result<(), (usize, usize)> {
    for tier in CONDENSATION_ORDER {
        let mut removed = 0;
        while excess(lines, limit).is_some() && remove_unit(lines, tier) {
            removed += 1;
        }
        if removed > 0 {
            tracing::debug!("condensed {removed} unit(s) of {tier:?} to fit {limit}");
            match steps.iter_mut().find(|s| s.tier == tier) {
                Some(step) => step.removed += removed,
                None => steps.push(CondensationStep { tier, removed }),
            }
        }
    }
    match excess(lines, limit) {
        Some(over) => Err(over),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Adapted {
    #[serde(skip)]
    pub text: String,
    pub bytes: usize,
    pub lines: usize,
    pub condensed: Vec<CondensationStep>,
    pub warnings: Vec<String>,
}

/// Collapse every whitespace run, newlines included, to a single space.
///
/// User-supplied text must pass through this before it becomes a rendered
/// line, or it could open headings of its own.
pub fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain Markdown rendering with no wrapping or size constraints.
pub fn render(doc: &GeneratedDocument) -> String {
    to_text(&layout(doc, FormatKind::Plain))
}

/// Render `doc` for `profile`, wrapping and condensing as the target requires.
pub fn adapt(doc: &GeneratedDocument, profile: &AgentProfile) -> Result<Adapted> {
    let target = profile.target(doc.scope);
    let mut lines = layout(doc, profile.format);
    let mut condensed = Vec::new();
    let mut warnings = Vec::new();

    if let Some(limit) = target.hard_limit {
        if let Err((actual, over_by)) = condense(&mut lines, limit, &mut condensed) {
            return Err(RulesError::DocumentTooLarge {
                limit: limit.to_string(),
                actual,
                over_by,
            });
        }
    }

    if let Some(limit) = target.soft_limit {
        if let Err((actual, over_by)) = condense(&mut lines, limit, &mut condensed) {
            let msg = format!(
                "{} recommends at most {limit} for {} rules; this document is {actual} ({over_by} over)",
                profile.name, doc.scope
            );
            tracing::warn!("{msg}");
            warnings.push(msg);
        }
    }

    let text = to_text(&lines);
    Ok(Adapted {
        bytes: text.len(),
        lines: text.lines().count(),
        text,
        condensed,
        warnings,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
