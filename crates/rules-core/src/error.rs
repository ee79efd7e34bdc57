use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown agent '{0}': run with --list-agents to see supported targets")]
    UnknownAgent(String),

    #[error("invalid scope '{0}': expected global, team, or dev")]
    InvalidScope(String),

    #[error("invalid answer for '{question}': {reason}")]
    InvalidAnswer { question: String, reason: String },

    #[error("no answer provided for question '{0}'")]
    MissingAnswer(String),

    #[error("document too large: {actual} exceeds the {limit} limit by {over_by} after condensation")]
    DocumentTooLarge {
        limit: String,
        actual: usize,
        over_by: usize,
    },

    #[error("home directory not found: set HOME or AGENTIC_RULES_HOME")]
    HomeNotFound,

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RulesError {
    /// Process exit status for this failure. Success and user abort exit 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            RulesError::UnknownAgent(_) => 2,
            RulesError::DocumentTooLarge { .. } => 3,
            RulesError::Io(_) => 4,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, RulesError>;
