//! The end-to-end run: agent -> scope -> questionnaire -> scan -> compile ->
//! adapt -> write -> summary.

use crate::output::print_json;
use crate::prompt;
use anyhow::Context;
use rules_core::{
    compiler,
    config::RulesConfig,
    format::{self, Condensation, CondensationStep},
    paths::Locations,
    questionnaire::{Prompter, Questionnaire, ScriptedPrompter},
    registry,
    skills,
    types::{Scope, SizeLimit},
    writer::{self, WriteDecision, WriteOutcome},
};
use serde::Serialize;
use std::path::PathBuf;

pub struct Options {
    pub agent: Option<String>,
    pub scope: Option<Scope>,
    pub answers: Option<PathBuf>,
    pub on_conflict: Option<WriteDecision>,
    pub dry_run: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    agent: &'static str,
    scope: Scope,
    path: String,
    outcome: Option<WriteOutcome>,
    #[serde(flatten)]
    adapted: &'a format::Adapted,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

pub fn run(locations: &Locations, config: &RulesConfig, opts: Options) -> anyhow::Result<()> {
    let mut prompter = prompt::session();

    // 1. Agent
    let query = match opts.agent.or_else(|| config.default_agent.clone()) {
        Some(q) => q,
        None => {
            let items: Vec<String> = registry::AGENTS
                .iter()
                .map(|a| a.name.to_string())
                .collect();
            match prompter.select("Which agent are these rules for?", &items)? {
                Some(i) => registry::AGENTS[i].id.to_string(),
                None => return discarded(opts.json),
            }
        }
    };
    let profile = registry::find(&query)?;

    // 2. Scope
    let scope = match opts.scope.or_else(|| config.scope()) {
        Some(s) => s,
        None => {
            let items: Vec<String> = Scope::all().iter().map(|s| s.describe().to_string()).collect();
            match prompter.select("Which scope?", &items)? {
                Some(i) => Scope::all()[i],
                None => return discarded(opts.json),
            }
        }
    };
    let (path, profile) = registry::resolve(profile.id, scope, locations)?;
    let display = locations.display(&path);
    tracing::debug!("target: {} {} -> {}", profile.name, scope, path.display());

    // 3. Questionnaire
    let answers = match &opts.answers {
        Some(file) => {
            let data = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read answers file {}", file.display()))?;
            let mut script = ScriptedPrompter::from_yaml(&data)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            Questionnaire::run(scope, &mut script)?
        }
        None => Questionnaire::run(scope, prompter.as_mut())?,
    };
    let Some(answers) = answers else {
        return discarded(opts.json);
    };

    // 4. Skills
    let index = skills::scan(
        &skills::default_roots(locations, config),
        &skills::catalog(config),
    );
    tracing::debug!(
        "{} skill(s) installed, {} recommended",
        index.installed.len(),
        index.recommended.len()
    );

    // 5. Compile + adapt
    let doc = compiler::compile(&answers, &index, scope);
    let mut adapted = format::adapt(&doc, profile)
        .with_context(|| format!("cannot fit {} rules for {}", scope, profile.name))?;

    if opts.dry_run {
        if opts.json {
            return print_json(&Summary {
                agent: profile.id,
                scope,
                path: display,
                outcome: None,
                adapted: &adapted,
                content: Some(&adapted.text),
            });
        }
        print!("{}", adapted.text);
        return Ok(());
    }

    // 6. Write
    let outcome = writer::write(&path, adapted.text.as_bytes(), |_| {
        decide(opts.on_conflict, &display, prompter.as_mut())
    })
    .with_context(|| format!("failed to write {display}"))?;

    // Merging keeps the old content, so the file as a whole can outgrow the cap.
    if outcome == WriteOutcome::Merged {
        if let Some(limit) = profile.target(scope).hard_limit {
            let merged = std::fs::read(&path)
                .with_context(|| format!("failed to read back {display}"))?;
            if let Some(msg) = merged_overrun(&String::from_utf8_lossy(&merged), limit, profile.name)
            {
                let line = format!("{display}: {msg}");
                tracing::warn!("{line}");
                adapted.warnings.push(msg);
            }
        }
    }

    // 7. Report
    if opts.json {
        return print_json(&Summary {
            agent: profile.id,
            scope,
            path: display,
            outcome: Some(outcome),
            adapted: &adapted,
            content: None,
        });
    }

    if outcome == WriteOutcome::Aborted {
        println!("Aborted: {display} left untouched.");
        return Ok(());
    }
    println!(
        "  {outcome}: {display} ({} bytes, {} lines)",
        adapted.bytes, adapted.lines
    );
    for step in &adapted.condensed {
        println!("  condensed: {}", describe_step(step));
    }
    for w in &adapted.warnings {
        println!("  warning: {w}");
    }
    Ok(())
}

fn decide(
    preset: Option<WriteDecision>,
    display: &str,
    prompter: &mut dyn Prompter,
) -> rules_core::Result<WriteDecision> {
    if let Some(d) = preset {
        return Ok(d);
    }
    let items: Vec<String> = WriteDecision::all()
        .iter()
        .map(|d| d.describe().to_string())
        .collect();
    let picked = prompter.select(&format!("{display} already exists. What should happen?"), &items)?;
    Ok(picked
        .map(|i| WriteDecision::all()[i])
        .unwrap_or(WriteDecision::Abort))
}

fn merged_overrun(text: &str, limit: SizeLimit, agent: &str) -> Option<String> {
    let size = limit.measure(text);
    (size > limit.max()).then(|| {
        format!(
            "{agent} reads at most {limit}; the merged file is {} over",
            size - limit.max()
        )
    })
}

fn describe_step(step: &CondensationStep) -> String {
    match step.tier {
        Condensation::Examples => format!("removed {} example line(s)", step.removed),
        Condensation::RecommendedSkills => "removed the recommended-skills list".to_string(),
        Condensation::BlankLines => format!("removed {} blank line(s)", step.removed),
    }
}

fn discarded(json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "outcome": "discarded" }))
    } else {
        println!("Discarded: no rules were written.");
        Ok(())
    }
}
