use crate::output::{print_json, print_table};
use rules_core::{
    config::RulesConfig,
    paths::Locations,
    registry::{self, ScopeTarget},
    skills,
    types::{FormatKind, Scope},
};

pub fn agents(locations: &Locations, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&registry::AGENTS);
    }

    let cell = |target: &ScopeTarget| {
        let path = locations.display(&locations.expand(target.path));
        match (target.hard_limit, target.soft_limit) {
            (Some(limit), _) => format!("{path} (max {limit})"),
            (None, Some(limit)) => format!("{path} (~{limit})"),
            (None, None) => path,
        }
    };
    let rows = registry::AGENTS
        .iter()
        .map(|a| {
            let format = match a.format {
                FormatKind::Plain => "plain".to_string(),
                FormatKind::Frontmatter { line } => format!("frontmatter ({line})"),
            };
            vec![
                a.id.to_string(),
                a.name.to_string(),
                format,
                cell(a.target(Scope::Global)),
                cell(a.target(Scope::Team)),
                cell(a.target(Scope::Dev)),
            ]
        })
        .collect();

    print_table(&["ID", "NAME", "FORMAT", "GLOBAL", "TEAM", "DEV"], rows);
    Ok(())
}

pub fn skills(locations: &Locations, config: &RulesConfig, json: bool) -> anyhow::Result<()> {
    let index = skills::scan(
        &skills::default_roots(locations, config),
        &skills::catalog(config),
    );

    if json {
        return print_json(&index);
    }

    if index.installed.is_empty() {
        println!("No skills installed.");
    } else {
        print_table(
            &["NAME", "SOURCE", "PATH"],
            index
                .installed
                .iter()
                .map(|m| {
                    vec![
                        m.name.clone(),
                        m.source.to_string(),
                        locations.display(&m.path),
                    ]
                })
                .collect(),
        );
    }

    if !index.recommended.is_empty() {
        println!();
        println!("Recommended (not installed):");
        for entry in &index.recommended {
            println!("  {}: {}", entry.name, entry.description);
        }
    }
    Ok(())
}
