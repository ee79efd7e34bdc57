//! Sequential, scope-aware questionnaire.
//!
//! [`Questionnaire`] is a small state machine over the static catalog in
//! [`crate::questions`]. Interaction goes through the [`Prompter`] trait so the
//! same engine drives a terminal UI, piped stdin, or a scripted answer file.

use crate::error::{Result, RulesError};
use crate::questions::{self, Answer, Question};
use crate::types::Scope;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::io::{BufRead, Write};

// ---------------------------------------------------------------------------
// AnswerSet
// ---------------------------------------------------------------------------

/// Completed answers for one scope. Only [`Questionnaire`] builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSet {
    pub scope: Scope,
    answers: BTreeMap<&'static str, Answer>,
}

impl AnswerSet {
    pub fn get(&self, id: &str) -> Option<&Answer> {
        self.answers.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.answers.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting on the question at this catalog index.
    Pending(usize),
    Answered,
    Aborted,
}

#[derive(Debug)]
pub struct Questionnaire {
    scope: Scope,
    state: State,
    answers: BTreeMap<&'static str, Answer>,
}

impl Questionnaire {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            state: next_state(scope, 0),
            answers: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn current(&self) -> Option<&'static Question> {
        match self.state {
            State::Pending(i) => questions::QUESTIONS.get(i),
            _ => None,
        }
    }

    /// (answered so far + 1, total applicable), for progress display.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.answers.len() + 1,
            questions::applicable_ids(self.scope).len(),
        )
    }

    /// Record an answer to the current question.
    ///
    /// A rejected answer leaves the state unchanged so the caller can re-prompt.
    pub fn answer(&mut self, input: &str) -> Result<State> {
        let State::Pending(i) = self.state else {
            return Err(RulesError::InvalidAnswer {
                question: String::new(),
                reason: "questionnaire is not waiting for an answer".to_string(),
            });
        };
        let question = &questions::QUESTIONS[i];
        let answer = question
            .resolve(input)
            .map_err(|reason| RulesError::InvalidAnswer {
                question: question.id.to_string(),
                reason,
            })?;
        self.answers.insert(question.id, answer);
        self.state = next_state(self.scope, i + 1);
        Ok(self.state)
    }

    /// Abandon the run. Everything answered so far is dropped.
    pub fn abort(&mut self) {
        self.answers.clear();
        self.state = State::Aborted;
    }

    /// The finished answer set, or `None` unless the state is `Answered`.
    pub fn finish(self) -> Option<AnswerSet> {
        if self.state != State::Answered {
            return None;
        }
        assert!(
            self.answers
                .keys()
                .copied()
                .eq(applicable_sorted(self.scope)),
            "answer set for {} does not match its applicable questions",
            self.scope
        );
        Some(AnswerSet {
            scope: self.scope,
            answers: self.answers,
        })
    }

    /// Drive the questionnaire to a terminal state through `prompter`.
    pub fn run(scope: Scope, prompter: &mut dyn Prompter) -> Result<Option<AnswerSet>> {
        let mut q = Questionnaire::new(scope);
        let mut error: Option<String> = None;

        while let Some(question) = q.current() {
            let (step, total) = q.progress();
            match prompter.ask(question, (step, total), error.as_deref())? {
                Reply::Abort => {
                    tracing::debug!("questionnaire aborted at '{}'", question.id);
                    q.abort();
                }
                Reply::Answer(input) => match q.answer(&input) {
                    Ok(_) => error = None,
                    Err(RulesError::InvalidAnswer { reason, .. }) => error = Some(reason),
                    Err(e) => return Err(e),
                },
            }
        }

        Ok(q.finish())
    }
}

/// First applicable question at or after `from`, skipping the rest.
fn next_state(scope: Scope, from: usize) -> State {
    questions::QUESTIONS
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, q)| questions::is_applicable(q.id, scope))
        .map(|(i, _)| State::Pending(i))
        .unwrap_or(State::Answered)
}

fn applicable_sorted(scope: Scope) -> impl Iterator<Item = &'static str> {
    let mut ids = questions::applicable_ids(scope);
    ids.sort_unstable();
    ids.into_iter()
}

// ---------------------------------------------------------------------------
// Prompter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    Abort,
}

/// One bounded interaction at a time with whoever is answering.
pub trait Prompter {
    /// Ask `question`. `error` explains why the previous reply was rejected.
    fn ask(&mut self, question: &Question, progress: (usize, usize), error: Option<&str>)
        -> Result<Reply>;

    /// Pick one of `items`; `None` means the user aborted.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>>;
}

/// Line-oriented prompter for piped input: numbered options, `q` or EOF aborts.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_reply(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(
        &mut self,
        question: &Question,
        (step, total): (usize, usize),
        error: Option<&str>,
    ) -> Result<Reply> {
        if let Some(e) = error {
            writeln!(self.output, "  ! {e}")?;
        }
        writeln!(self.output, "[{step}/{total}] {}", question.prompt)?;
        for (i, choice) in question.choices.iter().enumerate() {
            let hint = if choice.free_text { " (type your own)" } else { "" };
            writeln!(self.output, "  {}. {}{hint}", i + 1, choice.label)?;
        }
        write!(self.output, "> ")?;
        self.output.flush()?;
        Ok(match self.read_reply()? {
            Some(line) => Reply::Answer(line),
            None => Reply::Abort,
        })
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        loop {
            writeln!(self.output, "{prompt}")?;
            for (i, item) in items.iter().enumerate() {
                writeln!(self.output, "  {}. {item}", i + 1)?;
            }
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_reply()? else {
                return Ok(None);
            };
            let by_number = line
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=items.len()).contains(n))
                .map(|n| n - 1);
            let by_text = || {
                items
                    .iter()
                    .position(|item| item.to_lowercase().starts_with(&line.to_lowercase()))
            };
            match by_number.or_else(by_text) {
                Some(i) if !line.is_empty() => return Ok(Some(i)),
                _ => writeln!(self.output, "  ! pick a number from 1 to {}", items.len())?,
            }
        }
    }
}

/// Answers from a prepared map, e.g. an `--answers` file.
///
/// A script cannot be re-prompted, so a rejected answer is a hard error.
pub struct ScriptedPrompter {
    answers: HashMap<String, String>,
}

impl ScriptedPrompter {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self { answers }
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let answers: HashMap<String, String> = serde_yaml::from_str(data)?;
        Ok(Self::new(answers))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &Question, _: (usize, usize), error: Option<&str>) -> Result<Reply> {
        if let Some(reason) = error {
            return Err(RulesError::InvalidAnswer {
                question: question.id.to_string(),
                reason: reason.to_string(),
            });
        }
        self.answers
            .get(question.id)
            .map(|a| Reply::Answer(a.clone()))
            .ok_or_else(|| RulesError::MissingAnswer(question.id.to_string()))
    }

    fn select(&mut self, prompt: &str, _: &[String]) -> Result<Option<usize>> {
        Err(RulesError::Prompt(format!(
            "'{prompt}' needs an interactive answer"
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn team_script() -> ScriptedPrompter {
        ScriptedPrompter::new(
            [
                ("stack", "TypeScript+React"),
                ("autonomy", "balanced"),
                ("code_style", "readability"),
                ("testing", "Test alongside"),
                ("git", "conventional"),
                ("documentation", "minimal"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        )
    }

    #[test]
    fn skips_questions_outside_scope() {
        let q = Questionnaire::new(Scope::Team);
        assert_eq!(q.current().unwrap().id, "stack");
        let q = Questionnaire::new(Scope::Global);
        assert_eq!(q.current().unwrap().id, "communication");
    }

    #[test]
    fn invalid_answer_does_not_advance() {
        let mut q = Questionnaire::new(Scope::Team);
        let before = q.state();
        assert!(q.answer("cobol on punch cards").is_ok());
        assert_ne!(q.state(), before);
        let at_autonomy = q.state();
        assert!(q.answer("whatever").is_err());
        assert_eq!(q.state(), at_autonomy);
    }

    #[test]
    fn completes_with_exactly_applicable_ids() {
        for scope in Scope::all() {
            let mut q = Questionnaire::new(*scope);
            while let Some(question) = q.current() {
                let first = question.choices.iter().find(|c| !c.free_text).unwrap();
                q.answer(first.key).unwrap();
            }
            assert_eq!(q.state(), State::Answered);
            let set = q.finish().unwrap();
            let mut expected = questions::applicable_ids(*scope);
            expected.sort_unstable();
            assert_eq!(set.ids().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn abort_discards_everything() {
        let mut q = Questionnaire::new(Scope::Dev);
        q.answer("rust").unwrap();
        q.abort();
        assert_eq!(q.state(), State::Aborted);
        assert!(q.answer("concise").is_err());
        assert!(q.finish().is_none());
    }

    #[test]
    fn scripted_run_completes() {
        let set = Questionnaire::run(Scope::Team, &mut team_script())
            .unwrap()
            .unwrap();
        assert_eq!(set.get("testing"), Some(&Answer::Choice("alongside")));
        assert!(set.get("planning").is_none());
    }

    #[test]
    fn scripted_run_rejects_bad_and_missing_answers() {
        let mut script = team_script();
        script.answers.insert("testing".into(), "never".into());
        let err = Questionnaire::run(Scope::Team, &mut script).unwrap_err();
        assert!(matches!(err, RulesError::InvalidAnswer { ref question, .. } if question == "testing"));

        let mut script = team_script();
        script.answers.remove("git");
        let err = Questionnaire::run(Scope::Team, &mut script).unwrap_err();
        assert!(matches!(err, RulesError::MissingAnswer(ref id) if id == "git"));
    }

    #[test]
    fn line_prompter_reprompts_then_accepts() {
        // dev scope: stack, communication, autonomy, planning, task_tracking, verification, local_env
        let input = "nonsense-for-free-text\n9\n1\n1\n2\n1\n1\n1\n";
        let mut out = Vec::new();
        let mut prompter = LinePrompter::new(Cursor::new(input), &mut out);
        let set = Questionnaire::run(Scope::Dev, &mut prompter).unwrap().unwrap();
        assert_eq!(set.ids().count(), 7);
        assert_eq!(set.get("communication"), Some(&Answer::Choice("concise")));
        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("! expected one of"));
    }

    #[test]
    fn line_prompter_eof_aborts() {
        let mut out = Vec::new();
        let mut prompter = LinePrompter::new(Cursor::new("rust\n"), &mut out);
        assert!(Questionnaire::run(Scope::Dev, &mut prompter).unwrap().is_none());
    }

    #[test]
    fn line_select_accepts_number_or_prefix() {
        let items = vec!["Overwrite".to_string(), "Merge".to_string(), "Abort".to_string()];
        let mut out = Vec::new();
        let mut p = LinePrompter::new(Cursor::new("7\nme\n"), &mut out);
        assert_eq!(p.select("?", &items).unwrap(), Some(1));
        let mut p = LinePrompter::new(Cursor::new("3\n"), &mut out);
        assert_eq!(p.select("?", &items).unwrap(), Some(2));
        let mut p = LinePrompter::new(Cursor::new("q\n"), &mut out);
        assert_eq!(p.select("?", &items).unwrap(), None);
    }
}
