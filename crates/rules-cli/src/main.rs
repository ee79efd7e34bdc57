mod cmd;
mod output;
mod prompt;
mod root;

use clap::Parser;
use rules_core::{config::RulesConfig, paths::Locations, types::Scope, writer::WriteDecision, RulesError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agentic-rules",
    about = "Generate rule files for coding agents from a short questionnaire",
    version
)]
struct Cli {
    /// Target agent, fuzzy-matched (e.g. claude, cursor, windsurf); prompts when omitted
    agent: Option<String>,

    /// Rule scope: global, team, or dev
    #[arg(long, short = 's')]
    scope: Option<Scope>,

    /// YAML file mapping question ids to answers (non-interactive)
    #[arg(long, value_name = "FILE")]
    answers: Option<PathBuf>,

    /// What to do when the destination exists: overwrite, merge, or abort
    #[arg(long, value_name = "DECISION")]
    on_conflict: Option<WriteDecision>,

    /// Print the generated document instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Output as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// List supported agents and their output paths
    #[arg(long, conflicts_with_all = ["list_skills", "check_config"])]
    list_agents: bool,

    /// List installed and recommended skills
    #[arg(long, conflicts_with = "check_config")]
    list_skills: bool,

    /// Validate ~/.agentic-rules/config.yaml
    #[arg(long)]
    check_config: bool,

    /// Project root (default: nearest directory containing .git/)
    #[arg(long, env = "AGENTIC_RULES_ROOT")]
    root: Option<PathBuf>,

    /// Home directory used for user-level paths
    #[arg(long, env = "AGENTIC_RULES_HOME")]
    home: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    use anyhow::Context;

    let project = root::resolve_root(cli.root.as_deref());
    let locations = Locations::detect(cli.home.as_deref(), &project)?;
    let config = RulesConfig::load(&locations.home).context("failed to load config.yaml")?;
    for w in config.validate() {
        tracing::warn!("config: {}", w.message);
    }

    if cli.list_agents {
        return cmd::list::agents(&locations, cli.json);
    }
    if cli.list_skills {
        return cmd::list::skills(&locations, &config, cli.json);
    }
    if cli.check_config {
        return cmd::config::check(&config, cli.json);
    }

    cmd::generate::run(
        &locations,
        &config,
        cmd::generate::Options {
            agent: cli.agent,
            scope: cli.scope,
            answers: cli.answers,
            on_conflict: cli.on_conflict,
            dry_run: cli.dry_run,
            json: cli.json,
        },
    )
}

/// Distinct status per failure class; anything unclassified is 1.
fn exit_code(e: &anyhow::Error) -> i32 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<RulesError>() {
            return err.exit_code();
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return 4;
        }
    }
    1
}
