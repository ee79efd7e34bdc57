//! Prompter implementations for the terminal and for piped stdin.

use dialoguer::{theme::ColorfulTheme, Input, Select};
use rules_core::questionnaire::{LinePrompter, Prompter, Reply};
use rules_core::questions::Question;
use rules_core::RulesError;
use std::io::IsTerminal;

/// Arrow-key selection on a TTY; Esc aborts.
pub struct TermPrompter {
    theme: ColorfulTheme,
}

impl TermPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

fn prompt_err(e: dialoguer::Error) -> RulesError {
    RulesError::Prompt(e.to_string())
}

impl Prompter for TermPrompter {
    fn ask(
        &mut self,
        question: &Question,
        (step, total): (usize, usize),
        error: Option<&str>,
    ) -> rules_core::Result<Reply> {
        if let Some(e) = error {
            eprintln!("  ! {e}");
        }
        let labels: Vec<&str> = question.choices.iter().map(|c| c.label).collect();
        let picked = Select::with_theme(&self.theme)
            .with_prompt(format!("[{step}/{total}] {}", question.prompt))
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(prompt_err)?;

        let Some(i) = picked else {
            return Ok(Reply::Abort);
        };
        let choice = &question.choices[i];
        if !choice.free_text {
            return Ok(Reply::Answer(choice.key.to_string()));
        }

        let text: String = Input::with_theme(&self.theme)
            .with_prompt(format!("{} (describe)", choice.label))
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)?;
        Ok(Reply::Answer(text))
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> rules_core::Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(prompt_err)
    }
}

/// Terminal prompts when stdin is a TTY, numbered line prompts otherwise.
pub fn session() -> Box<dyn Prompter> {
    if std::io::stdin().is_terminal() {
        Box::new(TermPrompter::new())
    } else {
        Box::new(LinePrompter::new(std::io::stdin().lock(), std::io::stderr()))
    }
}
